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

//! Phase 2: resolving a requested `(technique, pass, option selections,
//! vertex attributes)` tuple against a [`ShaderReflection`] into the
//! compact, hashable key a compiled-program cache is keyed on.

use forge_reflect::{Status, StatusCode};

use crate::reflection::ShaderReflection;

/// Identifies one concrete variant of a shader: which technique, which
/// pass within it, which non-base option variants are selected (as a
/// bitmask over the pass's `option_bits`), and which vertex attributes
/// the draw call supplies. Two permutations with the same fields always
/// compile to the same program, so this is the cache key `ShaderCache`
/// indexes on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ShaderPermutation {
    pub technique_idx: u16,
    pub pass_idx: u16,
    pub option_bitmask: u64,
    pub vertex_attribute_mask: u32,
}

impl ShaderReflection {
    /// Resolves a permutation from names rather than indices. Option names
    /// that don't exist on the pass, or variant names that don't exist on
    /// the option, are silently left at their base variant — matching the
    /// `.shader` convention that omitted options mean "use the default".
    pub fn resolve_permutation(
        &self,
        technique_name: &str,
        pass_name: &str,
        options: &[(&str, &str)],
        vertex_attribute_mask: u32,
    ) -> Result<ShaderPermutation, Status> {
        let technique_idx = self
            .techniques
            .iter()
            .position(|t| t.name == technique_name)
            .ok_or_else(|| Status::new(StatusCode::NoAsset, format!("no such technique '{technique_name}'")))?;
        let technique = &self.techniques[technique_idx];
        let pass_idx = technique
            .passes
            .iter()
            .position(|p| p.name == pass_name)
            .ok_or_else(|| Status::new(StatusCode::NoAsset, format!("no such pass '{pass_name}'")))?;
        let pass = &technique.passes[pass_idx];

        let mut option_bitmask = 0u64;
        for (option_name, variant_name) in options {
            if let Some(bit) = pass
                .option_bits
                .iter()
                .position(|(name, variant)| name == option_name && variant == variant_name)
            {
                option_bitmask |= 1u64 << bit;
            }
        }

        Ok(ShaderPermutation {
            technique_idx: technique_idx as u16,
            pass_idx: pass_idx as u16,
            option_bitmask,
            vertex_attribute_mask,
        })
    }
}

#[cfg(test)]
mod test {
    use std::collections::HashMap;

    use forge_assets::{ShaderFile, ShaderFileOption, ShaderFileParamBlock, ShaderFilePass, ShaderFileTechnique};

    use super::*;
    use crate::reflection::build_reflection;

    fn sample() -> ShaderReflection {
        let file = ShaderFile {
            name: "lit".into(),
            extends: None,
            param_blocks: Vec::<ShaderFileParamBlock>::new(),
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
        };
        build_reflection(&file).unwrap()
    }

    #[test]
    fn selecting_non_base_variants_sets_exactly_those_bits() {
        let reflection = sample();
        let permutation = reflection
            .resolve_permutation("default", "forward", &[("LIGHTING", "pbr"), ("SHADOWS", "on")], 0)
            .unwrap();
        assert_eq!(0b11, permutation.option_bitmask);
    }

    #[test]
    fn base_variants_never_set_a_bit() {
        let reflection = sample();
        let permutation = reflection
            .resolve_permutation("default", "forward", &[("LIGHTING", "none"), ("SHADOWS", "off")], 0)
            .unwrap();
        assert_eq!(0, permutation.option_bitmask);
    }

    #[test]
    fn unknown_option_names_are_ignored() {
        let reflection = sample();
        let permutation = reflection
            .resolve_permutation("default", "forward", &[("NOT_AN_OPTION", "x")], 0)
            .unwrap();
        assert_eq!(0, permutation.option_bitmask);
    }
}
