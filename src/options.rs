//! Construction options for [`ShaderProgram`](crate::ShaderProgram).

use std::path::PathBuf;

/// Environment variable consulted by [`ShaderOptions::from_env`].
pub const SHADER_DIR_ENV: &str = "GL_SHADER_DIR";

/// Size of the info-log buffer the classic helpers used.
pub const DEFAULT_MAX_LOG_LEN: usize = 1024;

/// What construction does when a stage fails to compile or the program fails
/// to link.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CompilePolicy {
    /// Return the first compile or link failure as an error and free every
    /// object created so far.
    #[default]
    Strict,
    /// Log each failure, keep going, and hand back a program that may not
    /// work. Failures are kept on
    /// [`ShaderProgram::diagnostics`](crate::ShaderProgram::diagnostics).
    ///
    /// Unreadable source files are still a hard error in this mode.
    Permissive,
}

/// Options for building a shader program.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShaderOptions {
    /// Failure policy for compile and link errors.
    pub policy: CompilePolicy,
    /// Driver info logs are cut to this many bytes.
    pub max_log_len: usize,
    /// Base directory for relative source paths.
    pub source_root: Option<PathBuf>,
}

impl Default for ShaderOptions {
    fn default() -> Self {
        Self {
            policy: CompilePolicy::Strict,
            max_log_len: DEFAULT_MAX_LOG_LEN,
            source_root: None,
        }
    }
}

impl ShaderOptions {
    /// Defaults, but log-and-continue on compile and link failures.
    pub fn permissive() -> Self {
        Self::default().with_policy(CompilePolicy::Permissive)
    }

    /// Defaults, with `source_root` taken from `GL_SHADER_DIR` if it is set
    /// and non-empty.
    pub fn from_env() -> Self {
        let root = std::env::var_os(SHADER_DIR_ENV)
            .filter(|v| !v.is_empty())
            .map(PathBuf::from);
        Self {
            source_root: root,
            ..Self::default()
        }
    }

    /// Set the failure policy.
    #[must_use]
    pub fn with_policy(mut self, policy: CompilePolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Set the maximum info log length.
    #[must_use]
    pub fn with_max_log_len(mut self, max_log_len: usize) -> Self {
        self.max_log_len = max_log_len;
        self
    }

    /// Set the directory relative source paths are resolved against.
    #[must_use]
    pub fn with_source_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.source_root = Some(root.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_strict() {
        let options = ShaderOptions::default();
        assert_eq!(options.policy, CompilePolicy::Strict);
        assert_eq!(options.max_log_len, DEFAULT_MAX_LOG_LEN);
        assert!(options.source_root.is_none());
    }

    #[test]
    fn builders_compose() {
        let options = ShaderOptions::permissive()
            .with_max_log_len(64)
            .with_source_root("assets/shaders");
        assert_eq!(options.policy, CompilePolicy::Permissive);
        assert_eq!(options.max_log_len, 64);
        assert_eq!(options.source_root, Some(PathBuf::from("assets/shaders")));
    }

    // The only test touching `GL_SHADER_DIR`, so no other test races it.
    #[test]
    fn from_env_reads_shader_dir_and_ignores_empty() {
        std::env::set_var(SHADER_DIR_ENV, "/opt/app/shaders");
        let options = ShaderOptions::from_env();
        assert_eq!(options.source_root, Some(PathBuf::from("/opt/app/shaders")));
        assert_eq!(options.policy, CompilePolicy::Strict);

        std::env::set_var(SHADER_DIR_ENV, "");
        assert_eq!(ShaderOptions::from_env().source_root, None);

        std::env::remove_var(SHADER_DIR_ENV);
        assert_eq!(ShaderOptions::from_env(), ShaderOptions::default());
    }
}
