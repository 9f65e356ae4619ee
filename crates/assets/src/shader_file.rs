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

//! The serializable, YAML-shaped description of one `.shader` file, shared
//! between the importer that parses it and the reflection builder that
//! expands it — grounded in the original engine's `grc/shader_file.hpp`.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

fn one_element() -> u32 {
    1
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShaderFileOption {
    pub name: String,
    pub variants: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShaderFileParam {
    pub name: String,
    #[serde(rename = "type")]
    pub ty: String,
    #[serde(default = "one_element")]
    pub elements: u32,
    #[serde(default)]
    pub value: Option<String>,
    #[serde(default)]
    pub ui_name: Option<String>,
    #[serde(default)]
    pub ui_hint: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShaderFileParamBlock {
    pub name: String,
    /// One of `default`, `frame`, `material`, `draw` — the descriptor-set
    /// space this block binds into. Unset blocks fall back to `default`.
    #[serde(default)]
    pub space: Option<String>,
    #[serde(default)]
    pub params: Vec<ShaderFileParam>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ShaderFilePass {
    pub name: String,
    #[serde(default)]
    pub options: Vec<ShaderFileOption>,
    #[serde(default)]
    pub tags: HashMap<String, String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ShaderFileTechnique {
    pub name: String,
    #[serde(default)]
    pub options: Vec<ShaderFileOption>,
    #[serde(default)]
    pub passes: Vec<ShaderFilePass>,
    #[serde(default)]
    pub tags: HashMap<String, String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShaderFileSource {
    pub file: String,
    /// `vertex`, `fragment`, or `compute`.
    pub module: String,
}

/// Deserialized straight off the `.shader` YAML. Nothing here is resolved
/// yet — `extends` still names a sibling asset, and options/params are not
/// unioned across techniques and passes. That expansion into a
/// `ShaderReflection` happens once the base (if any) is loaded, since only
/// the loader's dependency graph can guarantee it's available.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ShaderFile {
    pub name: String,
    #[serde(default)]
    pub extends: Option<String>,
    #[serde(default)]
    pub param_blocks: Vec<ShaderFileParamBlock>,
    #[serde(default)]
    pub techniques: Vec<ShaderFileTechnique>,
    #[serde(default)]
    pub sources: Vec<ShaderFileSource>,
}

fn union_by<T: Clone>(base: &[T], child: &[T], name_of: impl Fn(&T) -> &str) -> Vec<T> {
    let mut out: Vec<T> = Vec::new();
    for item in base.iter().chain(child.iter()) {
        match out.iter_mut().find(|o| name_of(o) == name_of(item)) {
            Some(existing) => *existing = item.clone(),
            None => out.push(item.clone()),
        }
    }
    out
}

impl ShaderFile {
    /// Implements phase 1 step 1 of the reflection build: union
    /// `param_blocks`, `techniques` and `sources` with a resolved `extends`
    /// base, with the child's entries overriding the base's by name.
    pub fn merge_extends(base: &ShaderFile, child: &ShaderFile) -> ShaderFile {
        ShaderFile {
            name: child.name.clone(),
            extends: child.extends.clone(),
            param_blocks: union_by(&base.param_blocks, &child.param_blocks, |b| b.name.as_str()),
            techniques: union_by(&base.techniques, &child.techniques, |t| t.name.as_str()),
            sources: union_by(&base.sources, &child.sources, |s| s.file.as_str()),
        }
    }
}
