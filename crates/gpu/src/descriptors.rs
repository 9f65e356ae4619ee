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

//! Structural descriptors for the resources the GPU caches key on. All of
//! these are plain data with value equality — two descriptors that compare
//! equal always describe the same backend resource, which is what lets a
//! cache miss/create/insert dance replace an ad-hoc factory.

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DescriptorBindingKind {
    UniformBuffer,
    StorageBuffer,
    CombinedImageSampler,
    StorageImage,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DescriptorBindingDesc {
    pub binding: u32,
    pub kind: DescriptorBindingKind,
    pub count: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DescSetLayoutDesc {
    pub bindings: Vec<DescriptorBindingDesc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CompareOp {
    Never,
    Less,
    Equal,
    LessOrEqual,
    Greater,
    NotEqual,
    GreaterOrEqual,
    Always,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CullMode {
    None,
    Front,
    Back,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BlendMode {
    Opaque,
    AlphaBlend,
    Additive,
}

/// The fixed-function + shader-binding state a graphics pipeline needs to
/// exist. Two draws that resolve to the same state share one pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PsoGraphicsState {
    pub vertex_program: u64,
    pub fragment_program: u64,
    pub vertex_attribute_mask: u32,
    pub depth_test: bool,
    pub depth_write: bool,
    pub depth_compare: CompareOp,
    pub cull_mode: CullMode,
    pub blend_mode: BlendMode,
    pub render_pass: RenderPassDesc,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PsoComputeState {
    pub compute_program: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LoadOp {
    Load,
    Clear,
    DontCare,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StoreOp {
    Store,
    DontCare,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AttachmentDesc {
    pub format: crate::texture::TextureFormat,
    pub load_op: LoadOp,
    pub store_op: StoreOp,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RenderPassDesc {
    pub color_attachments: Vec<AttachmentDesc>,
    pub depth_attachment: Option<AttachmentDesc>,
}
