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

//! C9 — GPU resource caches and the narrow external driver trait.
//! Every cache shares the same shape (`Descriptor -> Weak<Handle>`, short
//! critical section, caller does the create-and-insert); the caches never
//! initiate creation themselves.
//!
//! Grounded in the teacher's `dess-backend::pipeline_cache`/`descriptors.rs`,
//! generalized from a concrete `ash`-backed Vulkan cache to a driver-agnostic
//! one since a real backend is out of scope.

mod cache;
mod descriptors;
mod driver;
mod texture;

pub use cache::ResourceCache;
pub use descriptors::{
    AttachmentDesc, BlendMode, CompareOp, CullMode, DescSetLayoutDesc, DescriptorBindingDesc, DescriptorBindingKind,
    LoadOp, PsoComputeState, PsoGraphicsState, RenderPassDesc, StoreOp,
};
pub use driver::{
    BufferDesc, BufferHandle, BufferUsages, DescSetHandle, DescSetLayoutHandle, DispatchCall, DrawCall,
    FramebufferHandle, GpuDriver, PipelineHandle, ProgramHandle, RenderPassHandle, SamplerDesc, SamplerHandle,
    TextureHandle,
};
pub use texture::{MemUsage, Swizzle, TextureDesc, TextureFormat, TextureType, TextureUsages};

/// The five caches spec'd for the GPU boundary, bundled for convenient
/// ownership by whatever owns the driver (typically the render thread).
/// Handles are driver-defined tokens (`u64` here); the cache layer never
/// looks inside them.
#[derive(Default)]
pub struct GpuCaches {
    pub descriptor_set_layouts: ResourceCache<DescSetLayoutDesc, DescSetLayoutHandle>,
    pub graphics_pipelines: ResourceCache<PsoGraphicsState, PipelineHandle>,
    pub compute_pipelines: ResourceCache<PsoComputeState, PipelineHandle>,
    pub textures: ResourceCache<TextureDesc, TextureHandle>,
    pub render_passes: ResourceCache<RenderPassDesc, RenderPassHandle>,
}

impl GpuCaches {
    pub fn new() -> Self {
        Self::default()
    }
}
