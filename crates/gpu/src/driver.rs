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

//! The narrow external driver abstraction: exactly the operation list
//! called out for the GPU boundary, generalized from the teacher's
//! concrete `ash`-backed `vulkan::Device` to a driver-agnostic trait since
//! a real backend is out of scope here — callers (the resource caches,
//! a renderer) program against this, never against a concrete API.

use forge_reflect::Status;

use crate::descriptors::{DescSetLayoutDesc, PsoComputeState, PsoGraphicsState, RenderPassDesc};
use crate::texture::TextureDesc;

/// Opaque handles the driver hands back. A real backend would wrap a
/// native handle (`vk::Image`, `VkBuffer`, ...); here they're just tokens
/// the resource caches and draw calls pass back to the same driver.
pub type TextureHandle = u64;
pub type BufferHandle = u64;
pub type SamplerHandle = u64;
pub type ProgramHandle = u64;
pub type PipelineHandle = u64;
pub type DescSetLayoutHandle = u64;
pub type DescSetHandle = u64;
pub type RenderPassHandle = u64;
pub type FramebufferHandle = u64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BufferDesc {
    pub size: u64,
    pub usages: BufferUsages,
    pub mem_usage: crate::texture::MemUsage,
}

bitflags::bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct BufferUsages: u8 {
        const VERTEX   = 1 << 0;
        const INDEX    = 1 << 1;
        const UNIFORM  = 1 << 2;
        const STORAGE  = 1 << 3;
        const TRANSFER_SRC = 1 << 4;
        const TRANSFER_DST = 1 << 5;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SamplerDesc {
    pub min_filter_linear: bool,
    pub mag_filter_linear: bool,
    pub mip_filter_linear: bool,
    pub repeat_wrap: bool,
}

#[derive(Debug, Clone, Copy)]
pub struct DrawCall {
    pub pipeline: PipelineHandle,
    pub descriptor_sets: [Option<DescSetHandle>; 4],
    pub vertex_buffer: Option<BufferHandle>,
    pub index_buffer: Option<BufferHandle>,
    pub first_index: u32,
    pub index_count: u32,
    pub instance_count: u32,
}

#[derive(Debug, Clone, Copy)]
pub struct DispatchCall {
    pub pipeline: PipelineHandle,
    pub descriptor_sets: [Option<DescSetHandle>; 4],
    pub group_count: [u32; 3],
}

/// Everything the reflection/caching layers above this crate need from a
/// real graphics backend. Deliberately narrow: no swapchain, no surface,
/// no window-system integration — those live with whatever embeds this
/// pipeline, not with asset/shader processing.
pub trait GpuDriver: Send + Sync {
    fn create_texture(&self, desc: &TextureDesc) -> Result<TextureHandle, Status>;
    fn destroy_texture(&self, handle: TextureHandle);
    fn upload_texture_region(&self, handle: TextureHandle, mip: u32, array_slice: u32, data: &[u8]) -> Result<(), Status>;

    fn create_buffer(&self, desc: &BufferDesc) -> Result<BufferHandle, Status>;
    fn destroy_buffer(&self, handle: BufferHandle);
    fn map_buffer(&self, handle: BufferHandle) -> Result<*mut u8, Status>;
    fn unmap_buffer(&self, handle: BufferHandle);

    fn create_sampler(&self, desc: &SamplerDesc) -> Result<SamplerHandle, Status>;
    fn destroy_sampler(&self, handle: SamplerHandle);

    fn create_program(&self, bytecode: &[u8]) -> Result<ProgramHandle, Status>;
    fn destroy_program(&self, handle: ProgramHandle);

    fn create_graphics_pipeline(&self, state: &PsoGraphicsState) -> Result<PipelineHandle, Status>;
    fn create_compute_pipeline(&self, state: &PsoComputeState) -> Result<PipelineHandle, Status>;
    fn destroy_pipeline(&self, handle: PipelineHandle);

    fn create_descriptor_set_layout(&self, desc: &DescSetLayoutDesc) -> Result<DescSetLayoutHandle, Status>;
    fn destroy_descriptor_set_layout(&self, handle: DescSetLayoutHandle);
    fn create_descriptor_set(&self, layout: DescSetLayoutHandle) -> Result<DescSetHandle, Status>;
    fn destroy_descriptor_set(&self, handle: DescSetHandle);

    fn create_render_pass(&self, desc: &RenderPassDesc) -> Result<RenderPassHandle, Status>;
    fn destroy_render_pass(&self, handle: RenderPassHandle);
    fn create_framebuffer(&self, render_pass: RenderPassHandle, attachments: &[TextureHandle]) -> Result<FramebufferHandle, Status>;
    fn destroy_framebuffer(&self, handle: FramebufferHandle);

    fn draw(&self, call: &DrawCall) -> Result<(), Status>;
    fn dispatch(&self, call: &DispatchCall) -> Result<(), Status>;
    fn submit(&self) -> Result<(), Status>;
}
