// Copyright (C) 2023 gigablaster

// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.

// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU General Public License for more details.

// You should have received a copy of the GNU General Public License
// along with this program.  If not, see <http://www.gnu.org/licenses/>.

bitflags::bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct TextureUsages: u8 {
        const SAMPLED         = 1 << 0;
        const STORAGE         = 1 << 1;
        const COLOR_ATTACHMENT = 1 << 2;
        const DEPTH_ATTACHMENT = 1 << 3;
        const TRANSFER_SRC    = 1 << 4;
        const TRANSFER_DST    = 1 << 5;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TextureFormat {
    Rgba8Unorm,
    Rgba8Srgb,
    Rgba16Float,
    Bc1Unorm,
    Bc3Unorm,
    Bc5Unorm,
    Bc7Unorm,
    D32Float,
    D24UnormS8Uint,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TextureType {
    Tex2d,
    Tex2dArray,
    TexCube,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MemUsage {
    GpuOnly,
    CpuToGpu,
    GpuToCpu,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Swizzle {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

/// One structural description of a texture resource — two `TextureDesc`s
/// comparing equal always describe the same GPU texture, matching the
/// `Descriptor -> Weak<Handle>` cache contract every resource cache shares.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TextureDesc {
    pub width: u32,
    pub height: u32,
    pub depth: u32,
    pub mips: u32,
    pub array_slices: u32,
    pub format: TextureFormat,
    pub tex_type: TextureType,
    pub usages: TextureUsages,
    pub mem_usage: MemUsage,
    pub swizzle: Swizzle,
}
