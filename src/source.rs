//! Shader stages and the source text pair a program is built from.

use std::fmt;
use std::path::{Path, PathBuf};

use crate::error::ShaderError;

/// One programmable pipeline stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShaderStage {
    /// Runs once per vertex.
    Vertex,
    /// Runs once per fragment.
    Fragment,
}

impl ShaderStage {
    /// The GL enum passed to `glCreateShader`.
    pub const fn gl_enum(self) -> u32 {
        // GL_VERTEX_SHADER / GL_FRAGMENT_SHADER
        match self {
            Self::Vertex => 0x8B31,
            Self::Fragment => 0x8B30,
        }
    }
}

impl fmt::Display for ShaderStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Vertex => "VERTEX",
            Self::Fragment => "FRAGMENT",
        })
    }
}

/// Vertex and fragment source text for one program.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShaderSource {
    /// GLSL for the vertex stage.
    pub vertex: String,
    /// GLSL for the fragment stage.
    pub fragment: String,
}

impl ShaderSource {
    /// Wrap source text already in memory.
    pub fn new(vertex: impl Into<String>, fragment: impl Into<String>) -> Self {
        Self {
            vertex: vertex.into(),
            fragment: fragment.into(),
        }
    }

    /// Read both stages from disk.
    ///
    /// Relative paths are joined onto `root` when one is given.
    ///
    /// # Errors
    ///
    /// Returns [`ShaderError::SourceUnreadable`] for the first file that
    /// cannot be read (vertex is tried first).
    pub fn load(
        vertex_path: impl AsRef<Path>,
        fragment_path: impl AsRef<Path>,
        root: Option<&Path>,
    ) -> Result<Self, ShaderError> {
        let vertex_path = resolve(vertex_path.as_ref(), root);
        let fragment_path = resolve(fragment_path.as_ref(), root);
        log::debug!(
            "loading shader sources: vertex={}, fragment={}",
            vertex_path.display(),
            fragment_path.display()
        );

        let vertex = read_stage(ShaderStage::Vertex, vertex_path)?;
        let fragment = read_stage(ShaderStage::Fragment, fragment_path)?;
        Ok(Self { vertex, fragment })
    }

    /// Source text for `stage`.
    pub fn stage(&self, stage: ShaderStage) -> &str {
        match stage {
            ShaderStage::Vertex => &self.vertex,
            ShaderStage::Fragment => &self.fragment,
        }
    }
}

fn resolve(path: &Path, root: Option<&Path>) -> PathBuf {
    match root {
        Some(root) if path.is_relative() => root.join(path),
        _ => path.to_path_buf(),
    }
}

fn read_stage(stage: ShaderStage, path: PathBuf) -> Result<String, ShaderError> {
    std::fs::read_to_string(&path).map_err(|source| ShaderError::SourceUnreadable {
        stage,
        path,
        source,
    })
}
