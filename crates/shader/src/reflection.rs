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

//! Phase 1 of `.shader` processing: expanding an already `extends`-merged
//! [`ShaderFile`] into a [`ShaderReflection`] — spaces and binding slots,
//! per-pass option bit allocation, and the flattened parameter table.
//! Grounded in the original engine's `grc/shader_reflection.hpp`.

use std::collections::HashMap;

use forge_assets::ShaderFile;
use forge_reflect::{Status, StatusCode};

bitflags::bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct ShaderQualifiers: u8 {
        const READONLY    = 1 << 0;
        const WRITEONLY   = 1 << 1;
        const STD140      = 1 << 2;
        const STD430      = 1 << 3;
        const RGBA16F     = 1 << 4;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShaderBindingKind {
    UniformBuffer,
    InlineUniformBuffer,
    StorageBuffer,
    StorageImage,
    Sampler2d,
    Sampler2dArray,
    SamplerCube,
}

fn is_opaque_type(ty: &str) -> bool {
    matches!(ty, "sampler2d" | "sampler2dArray" | "samplerCube" | "image2d")
}

fn binding_kind_for(ty: &str) -> ShaderBindingKind {
    match ty {
        "sampler2d" => ShaderBindingKind::Sampler2d,
        "sampler2dArray" => ShaderBindingKind::Sampler2dArray,
        "samplerCube" => ShaderBindingKind::SamplerCube,
        "image2d" => ShaderBindingKind::StorageImage,
        _ => ShaderBindingKind::UniformBuffer,
    }
}

/// Raw byte size of one scalar/vector/matrix element, std140-rounded. Custom
/// struct types aren't modeled — every `type` string in a `.shader` param
/// names a builtin.
fn type_byte_size(ty: &str) -> u32 {
    match ty {
        "float" | "int" | "bool" => 4,
        "vec2" | "ivec2" | "bvec2" => 8,
        "vec3" | "ivec3" | "bvec3" => 12,
        "vec4" | "ivec4" | "bvec4" => 16,
        "mat2" => 16,
        "mat3" => 48,
        "mat4" => 64,
        _ => 4,
    }
}

#[derive(Debug, Clone)]
pub struct ShaderBinding {
    pub name: String,
    pub type_name: String,
    pub kind: ShaderBindingKind,
    pub qualifiers: ShaderQualifiers,
    pub default_value: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShaderSpaceType {
    Default,
    Frame,
    Material,
    Draw,
}

impl ShaderSpaceType {
    fn parse(s: &str) -> Result<Self, Status> {
        match s {
            "default" => Ok(ShaderSpaceType::Default),
            "frame" => Ok(ShaderSpaceType::Frame),
            "material" => Ok(ShaderSpaceType::Material),
            "draw" => Ok(ShaderSpaceType::Draw),
            _ => Err(Status::new(StatusCode::InvalidData, format!("unknown shader space '{s}'"))),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ShaderSpace {
    pub space_type: ShaderSpaceType,
    pub index: u16,
    pub bindings: Vec<ShaderBinding>,
}

#[derive(Debug, Clone)]
pub struct ShaderOption {
    pub name: String,
    pub base_variant: String,
    pub variants: Vec<String>,
}

impl ShaderOption {
    pub fn variant_index(&self, variant: &str) -> Option<usize> {
        self.variants.iter().position(|v| v == variant)
    }
}

pub const MAX_OPTION_BITS: usize = 64;

#[derive(Debug, Clone)]
pub struct ShaderPass {
    pub name: String,
    pub options: Vec<ShaderOption>,
    /// `bit index -> (option name, variant name)`, the mapping a permutation
    /// mask is decoded against.
    pub option_bits: Vec<(String, String)>,
    pub tags: HashMap<String, String>,
}

#[derive(Debug, Clone)]
pub struct ShaderTechnique {
    pub name: String,
    pub passes: Vec<ShaderPass>,
    pub tags: HashMap<String, String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ShaderParamId(i16);

impl ShaderParamId {
    pub const INVALID: ShaderParamId = ShaderParamId(-1);

    pub fn is_valid(self) -> bool {
        self.0 != -1
    }

    pub fn index(self) -> Option<usize> {
        self.is_valid().then_some(self.0 as usize)
    }
}

#[derive(Debug, Clone)]
pub struct ShaderParamInfo {
    pub name: String,
    pub type_name: String,
    pub space: u16,
    pub binding: u16,
    /// Index of the owning uniform buffer within its space, or `-1` for an
    /// opaque (sampler/image) param that has no buffer backing.
    pub buffer: i32,
    pub offset: i32,
    pub elem_count: u32,
    pub byte_size: u32,
    pub default_value: Option<String>,
    pub ui_name: Option<String>,
    pub ui_hint: Option<String>,
}

/// The fully expanded description of a shader: every space/binding/param
/// slot indexed, every pass's option bits allocated. Produced once per
/// `extends`-merged [`ShaderFile`] and cheap to keep around for the
/// lifetime of the shader asset.
#[derive(Debug, Clone)]
pub struct ShaderReflection {
    pub name: String,
    pub spaces: Vec<ShaderSpace>,
    pub techniques: Vec<ShaderTechnique>,
    pub params_id: HashMap<String, ShaderParamId>,
    pub params_info: Vec<ShaderParamInfo>,
}

impl ShaderReflection {
    pub fn technique(&self, name: &str) -> Option<&ShaderTechnique> {
        self.techniques.iter().find(|t| t.name == name)
    }

    pub fn param_id(&self, name: &str) -> ShaderParamId {
        self.params_id.get(name).copied().unwrap_or(ShaderParamId::INVALID)
    }

    pub fn param_info(&self, id: ShaderParamId) -> Option<&ShaderParamInfo> {
        id.index().and_then(|i| self.params_info.get(i))
    }
}

impl ShaderTechnique {
    pub fn pass(&self, name: &str) -> Option<&ShaderPass> {
        self.passes.iter().find(|p| p.name == name)
    }
}

fn to_options(file_options: &[forge_assets::ShaderFileOption]) -> Vec<ShaderOption> {
    file_options
        .iter()
        .map(|o| ShaderOption {
            name: o.name.clone(),
            base_variant: o.variants.first().cloned().unwrap_or_default(),
            variants: o.variants.clone(),
        })
        .collect()
}

fn union_options(technique: &[ShaderOption], pass: &[ShaderOption]) -> Vec<ShaderOption> {
    let mut out = technique.to_vec();
    for option in pass {
        if let Some(existing) = out.iter_mut().find(|o| o.name == option.name) {
            *existing = option.clone();
        } else {
            out.push(option.clone());
        }
    }
    out
}

fn allocate_option_bits(options: &[ShaderOption]) -> Result<Vec<(String, String)>, Status> {
    let mut bits = Vec::new();
    for option in options {
        for variant in &option.variants {
            if *variant == option.base_variant {
                continue;
            }
            bits.push((option.name.clone(), variant.clone()));
        }
    }
    if bits.len() > MAX_OPTION_BITS {
        return Err(Status::new(
            StatusCode::InvalidData,
            format!("pass exceeds the {MAX_OPTION_BITS}-bit option budget ({} bits needed)", bits.len()),
        ));
    }
    Ok(bits)
}

/// Expands an `extends`-merged [`ShaderFile`] into its full reflection —
/// phase 1, steps 2 through 4 of the pipeline (step 1, the `extends` merge
/// itself, is [`ShaderFile::merge_extends`], run before this by the loader
/// since it needs the base asset already resolved).
pub fn build_reflection(file: &ShaderFile) -> Result<ShaderReflection, Status> {
    let mut spaces: Vec<ShaderSpace> = Vec::new();
    let mut space_index_by_type: HashMap<ShaderSpaceType, usize> = HashMap::new();
    let mut params_info = Vec::new();
    let mut params_id = HashMap::new();

    for block in &file.param_blocks {
        let space_type = ShaderSpaceType::parse(block.space.as_deref().unwrap_or("default"))?;
        let space_idx = *space_index_by_type.entry(space_type).or_insert_with(|| {
            spaces.push(ShaderSpace {
                space_type,
                index: spaces.len() as u16,
                bindings: Vec::new(),
            });
            spaces.len() - 1
        });

        let scalar_params: Vec<_> = block.params.iter().filter(|p| !is_opaque_type(&p.ty)).collect();
        if !scalar_params.is_empty() {
            let buffer_binding = spaces[space_idx].bindings.len() as u16;
            spaces[space_idx].bindings.push(ShaderBinding {
                name: block.name.clone(),
                type_name: format!("{}Block", block.name),
                kind: ShaderBindingKind::UniformBuffer,
                qualifiers: ShaderQualifiers::STD140,
                default_value: None,
            });
            let buffer_index = params_info.iter().filter(|p: &&ShaderParamInfo| p.buffer >= 0).count() as i32;
            let mut offset = 0u32;
            for param in scalar_params {
                let byte_size = type_byte_size(&param.ty) * param.elements;
                let qualified_name = format!("{}.{}", block.name, param.name);
                let id = ShaderParamId(params_info.len() as i16);
                params_info.push(ShaderParamInfo {
                    name: qualified_name.clone(),
                    type_name: param.ty.clone(),
                    space: space_idx as u16,
                    binding: buffer_binding,
                    buffer: buffer_index,
                    offset: offset as i32,
                    elem_count: param.elements,
                    byte_size,
                    default_value: param.value.clone(),
                    ui_name: param.ui_name.clone(),
                    ui_hint: param.ui_hint.clone(),
                });
                params_id.insert(qualified_name, id);
                offset += byte_size;
            }
        }

        for param in block.params.iter().filter(|p| is_opaque_type(&p.ty)) {
            let binding_idx = spaces[space_idx].bindings.len() as u16;
            spaces[space_idx].bindings.push(ShaderBinding {
                name: param.name.clone(),
                type_name: param.ty.clone(),
                kind: binding_kind_for(&param.ty),
                qualifiers: ShaderQualifiers::empty(),
                default_value: param.value.clone(),
            });
            let qualified_name = format!("{}.{}", block.name, param.name);
            let id = ShaderParamId(params_info.len() as i16);
            params_info.push(ShaderParamInfo {
                name: qualified_name.clone(),
                type_name: param.ty.clone(),
                space: space_idx as u16,
                binding: binding_idx,
                buffer: -1,
                offset: -1,
                elem_count: param.elements,
                byte_size: 0,
                default_value: param.value.clone(),
                ui_name: param.ui_name.clone(),
                ui_hint: param.ui_hint.clone(),
            });
            params_id.insert(qualified_name, id);
        }
    }

    let mut techniques = Vec::with_capacity(file.techniques.len());
    for technique in &file.techniques {
        let technique_options = to_options(&technique.options);
        let mut passes = Vec::with_capacity(technique.passes.len());
        for pass in &technique.passes {
            let pass_options = union_options(&technique_options, &to_options(&pass.options));
            let option_bits = allocate_option_bits(&pass_options)?;
            passes.push(ShaderPass {
                name: pass.name.clone(),
                options: pass_options,
                option_bits,
                tags: pass.tags.clone(),
            });
        }
        techniques.push(ShaderTechnique {
            name: technique.name.clone(),
            passes,
            tags: technique.tags.clone(),
        });
    }

    Ok(ShaderReflection {
        name: file.name.clone(),
        spaces,
        techniques,
        params_id,
        params_info,
    })
}

#[cfg(test)]
mod test {
    use forge_assets::{ShaderFileOption, ShaderFileParam, ShaderFileParamBlock, ShaderFilePass, ShaderFileTechnique};

    use super::*;

    fn sample_file() -> ShaderFile {
        ShaderFile {
            name: "lit".into(),
            extends: None,
            param_blocks: vec![ShaderFileParamBlock {
                name: "material".into(),
                space: Some("material".into()),
                params: vec![
                    ShaderFileParam {
                        name: "albedo".into(),
                        ty: "vec4".into(),
                        elements: 1,
                        value: None,
                        ui_name: None,
                        ui_hint: None,
                    },
                    ShaderFileParam {
                        name: "albedo_tex".into(),
                        ty: "sampler2d".into(),
                        elements: 1,
                        value: None,
                        ui_name: None,
                        ui_hint: None,
                    },
                ],
            }],
            techniques: vec![ShaderFileTechnique {
                name: "default".into(),
                options: vec![ShaderFileOption {
                    name: "LIGHTING".into(),
                    variants: vec!["none".into(), "basic".into(), "pbr".into()],
                }],
                passes: vec![ShaderFilePass {
                    name: "forward".into(),
                    options: vec![ShaderFileOption {
                        name: "SHADOWS".into(),
                        variants: vec!["off".into(), "on".into()],
                    }],
                    tags: HashMap::new(),
                }],
                tags: HashMap::new(),
            }],
            sources: Vec::new(),
        }
    }

    #[test]
    fn builds_one_space_with_a_buffer_and_a_sampler() {
        let reflection = build_reflection(&sample_file()).unwrap();
        assert_eq!(1, reflection.spaces.len());
        assert_eq!(ShaderSpaceType::Material, reflection.spaces[0].space_type);
        assert_eq!(2, reflection.spaces[0].bindings.len());
        assert!(reflection.param_id("material.albedo").is_valid());
    }

    #[test]
    fn unions_technique_and_pass_options_and_allocates_bits() {
        let reflection = build_reflection(&sample_file()).unwrap();
        let pass = reflection.technique("default").unwrap().pass("forward").unwrap();
        // LIGHTING has 2 non-base variants (basic, pbr), SHADOWS has 1 (on).
        assert_eq!(3, pass.option_bits.len());
    }

    #[test]
    fn rejects_passes_over_the_option_bit_budget() {
        let mut file = sample_file();
        let huge_variants: Vec<String> = (0..70).map(|i| format!("v{i}")).collect();
        file.techniques[0].passes[0].options.push(ShaderFileOption {
            name: "HUGE".into(),
            variants: huge_variants,
        });
        let err = build_reflection(&file).unwrap_err();
        assert_eq!(StatusCode::InvalidData, err.code());
    }
}
