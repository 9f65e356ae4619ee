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

//! Phase 4 inputs: turning a resolved [`ShaderPermutation`] into source text
//! a `ShaderCompiler` can turn into a [`GfxShaderProgram`]. `SourceBuilder`
//! mirrors the original engine's `GlslBuilder` layout-directive emission;
//! the concrete compiler here is a deterministic, dependency-free stand-in
//! for the real SPIR-V toolchain the backend would eventually call.

use std::fmt::Write as _;

use forge_reflect::Status;

use crate::reflection::{ShaderBindingKind, ShaderQualifiers, ShaderReflection};
use crate::permutation::ShaderPermutation;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShaderModule {
    Vertex,
    Fragment,
    Compute,
}

impl ShaderModule {
    fn glsl_define(self) -> &'static str {
        match self {
            ShaderModule::Vertex => "VERTEX",
            ShaderModule::Fragment => "FRAGMENT",
            ShaderModule::Compute => "COMPUTE",
        }
    }
}

/// Everything a `ShaderCompiler` needs to produce one module's program:
/// the merged reflection, which permutation is selected, which module is
/// being built, and the already-assembled source text for that module.
#[derive(Debug, Clone)]
pub struct ShaderCompilerRequest<'a> {
    pub shader_name: &'a str,
    pub module: ShaderModule,
    pub permutation: ShaderPermutation,
    pub source: &'a str,
}

/// An opaque compiled artifact. Real backends would hold SPIR-V words or a
/// driver module handle here; this stand-in keeps the pipeline testable end
/// to end without depending on a native toolchain.
#[derive(Debug, Clone)]
pub struct GfxShaderProgram {
    pub shader_name: String,
    pub module: ShaderModule,
    pub permutation: ShaderPermutation,
    pub bytecode: Vec<u8>,
}

pub trait ShaderCompiler: Send + Sync {
    fn compile(&self, request: &ShaderCompilerRequest) -> Result<GfxShaderProgram, Status>;
}

/// Builds GLSL-flavored source text: `#version`/module defines, one
/// `layout(...)` line per space binding, a vertex-input block when
/// building the vertex module, and `#define` lines for every set option
/// bit — in the same emission order as the original builder.
#[derive(Debug, Default)]
pub struct SourceBuilder {
    text: String,
}

impl SourceBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_version(&mut self, version: u32, core_profile: bool) -> &mut Self {
        let _ = write!(self.text, "#version {version}");
        if core_profile {
            self.text.push_str(" core");
        }
        self.text.push_str("\n\n");
        self
    }

    pub fn set_module(&mut self, module: ShaderModule) -> &mut Self {
        let _ = writeln!(self.text, "#define {}", module.glsl_define());
        self
    }

    pub fn add_define(&mut self, name: &str, value: Option<&str>) -> &mut Self {
        match value {
            Some(v) => {
                let _ = writeln!(self.text, "#define {name} {v}");
            }
            None => {
                let _ = writeln!(self.text, "#define {name}");
            }
        }
        self
    }

    pub fn add_vertex_input(&mut self, location: u32, ty: &str, name: &str) -> &mut Self {
        let _ = writeln!(self.text, "layout (location={location}) in {ty} {name};");
        self
    }

    fn binding_layout(&mut self, space: u16, slot: u16, qualifiers: ShaderQualifiers) {
        let _ = write!(self.text, "layout (set={space}, binding={slot}");
        if qualifiers.contains(ShaderQualifiers::STD140) {
            self.text.push_str(", std140");
        }
        if qualifiers.contains(ShaderQualifiers::STD430) {
            self.text.push_str(", std430");
        }
        if qualifiers.contains(ShaderQualifiers::RGBA16F) {
            self.text.push_str(", rgba16f");
        }
        self.text.push(')');
    }

    pub fn add_sampler_binding(&mut self, space: u16, slot: u16, kind: ShaderBindingKind, name: &str) -> &mut Self {
        let glsl_type = match kind {
            ShaderBindingKind::Sampler2d => "sampler2D",
            ShaderBindingKind::Sampler2dArray => "sampler2DArray",
            ShaderBindingKind::SamplerCube => "samplerCube",
            _ => "sampler2D",
        };
        self.binding_layout(space, slot, ShaderQualifiers::empty());
        let _ = writeln!(self.text, " uniform {glsl_type} {name};");
        self
    }

    pub fn add_image_binding(&mut self, space: u16, slot: u16, qualifiers: ShaderQualifiers, name: &str) -> &mut Self {
        self.binding_layout(space, slot, qualifiers);
        self.text.push_str(" uniform ");
        if qualifiers.contains(ShaderQualifiers::READONLY) {
            self.text.push_str("readonly ");
        }
        if qualifiers.contains(ShaderQualifiers::WRITEONLY) {
            self.text.push_str("writeonly ");
        }
        let _ = writeln!(self.text, "image2D {name};");
        self
    }

    pub fn begin_uniform_binding(&mut self, space: u16, slot: u16, qualifiers: ShaderQualifiers, name: &str) -> &mut Self {
        self.binding_layout(space, slot, qualifiers);
        let _ = writeln!(self.text, " uniform {name} {{");
        self
    }

    pub fn end_block(&mut self) -> &mut Self {
        self.text.push_str("};\n");
        self
    }

    pub fn add_field(&mut self, type_name: &str, field_name: &str, num_elements: Option<u32>) -> &mut Self {
        match num_elements {
            Some(n) => {
                let _ = writeln!(self.text, "    {type_name} {field_name}[{n}];");
            }
            None => {
                let _ = writeln!(self.text, "    {type_name} {field_name};");
            }
        }
        self
    }

    pub fn add_source(&mut self, source: &str) -> &mut Self {
        self.text.push_str(source);
        self.text.push('\n');
        self
    }

    pub fn emit(self) -> String {
        self.text
    }
}

/// Assembles the layout/binding prologue for one space of a reflection,
/// ahead of the raw module source text.
pub fn build_space_prologue(builder: &mut SourceBuilder, reflection: &ShaderReflection) {
    for space in &reflection.spaces {
        for (slot, binding) in space.bindings.iter().enumerate() {
            match binding.kind {
                ShaderBindingKind::Sampler2d | ShaderBindingKind::Sampler2dArray | ShaderBindingKind::SamplerCube => {
                    builder.add_sampler_binding(space.index, slot as u16, binding.kind, &binding.name);
                }
                ShaderBindingKind::StorageImage => {
                    builder.add_image_binding(space.index, slot as u16, binding.qualifiers, &binding.name);
                }
                ShaderBindingKind::UniformBuffer | ShaderBindingKind::InlineUniformBuffer | ShaderBindingKind::StorageBuffer => {
                    builder.begin_uniform_binding(space.index, slot as u16, binding.qualifiers, &binding.type_name);
                    builder.end_block();
                }
            }
        }
    }
}

/// A deterministic, dependency-free stand-in for a real SPIR-V/driver
/// compiler: "compiling" just hashes the assembled source together with
/// the permutation key, so repeated requests for the same inputs always
/// produce the same bytecode and distinct permutations never collide.
#[derive(Debug, Default)]
pub struct NullShaderCompiler;

impl ShaderCompiler for NullShaderCompiler {
    fn compile(&self, request: &ShaderCompilerRequest) -> Result<GfxShaderProgram, Status> {
        use std::hash::{Hash, Hasher};
        let mut hasher = rustc_hash::FxHasher::default();
        request.shader_name.hash(&mut hasher);
        request.source.hash(&mut hasher);
        request.permutation.hash(&mut hasher);
        let digest = hasher.finish();

        Ok(GfxShaderProgram {
            shader_name: request.shader_name.to_string(),
            module: request.module,
            permutation: request.permutation,
            bytecode: digest.to_le_bytes().to_vec(),
        })
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn source_builder_emits_version_and_module_define() {
        let mut builder = SourceBuilder::new();
        builder.set_version(450, true).set_module(ShaderModule::Vertex);
        let text = builder.emit();
        assert!(text.starts_with("#version 450 core"));
        assert!(text.contains("#define VERTEX"));
    }

    #[test]
    fn null_compiler_is_deterministic() {
        let request = ShaderCompilerRequest {
            shader_name: "lit",
            module: ShaderModule::Fragment,
            permutation: ShaderPermutation {
                technique_idx: 0,
                pass_idx: 0,
                option_bitmask: 0,
                vertex_attribute_mask: 0,
            },
            source: "void main() {}",
        };
        let compiler = NullShaderCompiler;
        let a = compiler.compile(&request).unwrap();
        let b = compiler.compile(&request).unwrap();
        assert_eq!(a.bytecode, b.bytecode);
    }

    #[test]
    fn null_compiler_distinguishes_permutations() {
        let mut request = ShaderCompilerRequest {
            shader_name: "lit",
            module: ShaderModule::Fragment,
            permutation: ShaderPermutation {
                technique_idx: 0,
                pass_idx: 0,
                option_bitmask: 0,
                vertex_attribute_mask: 0,
            },
            source: "void main() {}",
        };
        let compiler = NullShaderCompiler;
        let a = compiler.compile(&request).unwrap();
        request.permutation.option_bitmask = 1;
        let b = compiler.compile(&request).unwrap();
        assert_ne!(a.bytecode, b.bytecode);
    }
}
