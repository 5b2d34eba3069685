// Copyright 2025 eraflo
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Shader source loading. Compilation is left to the renderer.

use std::fs;
use std::path::Path;
use tessel_core::asset::{Asset, DecodeError};

/// The pipeline stage of a shader, inferred from its file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShaderStage {
    /// `.vert`
    Vertex,
    /// `.frag`
    Fragment,
    /// `.comp`
    Compute,
    /// Any other extension, e.g. a `.wgsl` module holding several entry points.
    Unknown,
}

impl ShaderStage {
    /// Infers the stage from the extension of `path`.
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("vert") => Self::Vertex,
            Some("frag") => Self::Fragment,
            Some("comp") => Self::Compute,
            _ => Self::Unknown,
        }
    }
}

/// The UTF-8 source of a shader.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShaderSource {
    stage: ShaderStage,
    source: String,
}

impl ShaderSource {
    /// The stage this shader targets.
    pub fn stage(&self) -> ShaderStage {
        self.stage
    }

    /// The source text.
    pub fn as_text(&self) -> &str {
        &self.source
    }
}

impl Asset for ShaderSource {
    const KIND: &'static str = "shader";

    fn decode(full_path: &Path) -> Result<Self, DecodeError> {
        let source = fs::read_to_string(full_path)?;
        if source.trim().is_empty() {
            return Err(format!("shader {} is empty", full_path.display()).into());
        }

        Ok(Self {
            stage: ShaderStage::from_path(full_path),
            source,
        })
    }
}
