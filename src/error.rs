//! Errors produced while building a shader program.

use std::path::PathBuf;

use crate::source::ShaderStage;

/// Separator line printed after every diagnostic block.
pub const DIAGNOSTIC_SEPARATOR: &str =
    " -- --------------------------------------------------- -- ";

/// Everything that can go wrong between reading shader sources and holding a
/// linked program.
#[derive(Debug, thiserror::Error)]
pub enum ShaderError {
    /// A source file could not be opened or read. Compilation is never
    /// attempted after this.
    #[error("failed to read {stage} shader source {}: {source}", .path.display())]
    SourceUnreadable {
        /// Which stage the file was meant for.
        stage: ShaderStage,
        /// The resolved path that failed.
        path: PathBuf,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The driver rejected a stage's source.
    #[error("{stage} shader failed to compile: {log}")]
    CompileFailed {
        /// The stage that failed.
        stage: ShaderStage,
        /// The driver's info log, possibly truncated.
        log: String,
    },

    /// The stages compiled (or were attempted) but the program did not link.
    #[error("shader program failed to link: {log}")]
    LinkFailed {
        /// The driver's program info log, possibly truncated.
        log: String,
    },

    /// The driver could not allocate a shader or program object.
    #[error("failed to create {object}: {reason}")]
    Backend {
        /// `"shader"` or `"program"`.
        object: &'static str,
        /// Driver-provided reason.
        reason: String,
    },
}

impl ShaderError {
    /// Render the error in the classic `ERROR::<CATEGORY>::<REASON>` block
    /// format, followed by the driver log and a separator line.
    pub fn diagnostic(&self) -> String {
        match self {
            Self::SourceUnreadable { stage, path, source } => format!(
                "ERROR::SHADER::FILE_NOT_SUCCESSFULLY_READ of type: {stage}\n{}: {source}\n{DIAGNOSTIC_SEPARATOR}",
                path.display()
            ),
            Self::CompileFailed { stage, log } => format!(
                "ERROR::SHADER::COMPILATION_FAILED of type: {stage}\n{log}\n{DIAGNOSTIC_SEPARATOR}"
            ),
            Self::LinkFailed { log } => format!(
                "ERROR::PROGRAM::LINKING_FAILED of type: PROGRAM\n{log}\n{DIAGNOSTIC_SEPARATOR}"
            ),
            Self::Backend { object, reason } => format!(
                "ERROR::BACKEND::CREATE_FAILED of type: {object}\n{reason}\n{DIAGNOSTIC_SEPARATOR}"
            ),
        }
    }

    /// The stage a compile or read failure belongs to.
    pub fn stage(&self) -> Option<ShaderStage> {
        match self {
            Self::SourceUnreadable { stage, .. } | Self::CompileFailed { stage, .. } => {
                Some(*stage)
            }
            Self::LinkFailed { .. } | Self::Backend { .. } => None,
        }
    }
}

/// Shorten a driver log to at most `max_len` bytes without splitting a
/// character.
pub(crate) fn truncate_log(mut log: String, max_len: usize) -> String {
    if log.len() > max_len {
        let mut end = max_len;
        while !log.is_char_boundary(end) {
            end -= 1;
        }
        log.truncate(end);
    }
    log
}
