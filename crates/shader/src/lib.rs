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

//! C8 — shader reflection, permutation resolution, and program compilation
//! and caching. Four phases: expanding an `extends`-merged `.shader`
//! description into a [`ShaderReflection`] (phase 1), resolving a requested
//! technique/pass/option selection into a [`ShaderPermutation`] (phase 2),
//! and compiling + caching the resulting program per platform (phases 3/4).
//!
//! Grounded in the original engine's `grc/shader_reflection.hpp`,
//! `grc/shader.cpp` and `runtime/glsl/glsl_builder.{hpp,cpp}`.

mod cache;
mod compiler;
mod permutation;
mod reflection;

pub use cache::{status_from_async_failure, ShaderCache, ShaderCompileInputs, ShaderPlatform};
pub use compiler::{
    build_space_prologue, GfxShaderProgram, NullShaderCompiler, ShaderCompiler, ShaderCompilerRequest, ShaderModule,
    SourceBuilder,
};
pub use permutation::ShaderPermutation;
pub use reflection::{
    build_reflection, ShaderBinding, ShaderBindingKind, ShaderOption, ShaderParamId, ShaderParamInfo, ShaderPass,
    ShaderQualifiers, ShaderReflection, ShaderSpace, ShaderSpaceType, ShaderTechnique, MAX_OPTION_BITS,
};
