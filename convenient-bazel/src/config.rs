//! Configuration for one bazel query round-trip

use serde::{Deserialize, Serialize};
use std::path::{Component, Path, PathBuf};

/// Configuration for driving `bazel query` against one workspace
///
/// Immutable once constructed; a [`crate::BazelClient`] owns exactly one
/// of these for the duration of a query.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BazelQueryConfig {
    /// Workspace directory the subprocess runs in (normalized)
    pub working_directory: PathBuf,
    /// Path to the bazel binary
    pub bazel_path: PathBuf,
    /// Startup options, passed verbatim before the `query` subcommand
    pub startup_options: Vec<String>,
    /// Command options, passed verbatim after the output-format flags
    pub command_options: Vec<String>,
    /// Pass `--keep_going` so partial analysis failures don't abort the query
    pub keep_going: bool,
    /// Echo subprocess stderr and phase timings
    pub verbose: bool,
    /// Isolate the query from user rc files (`--bazelrc=/dev/null`)
    pub debug: bool,
}

impl BazelQueryConfig {
    /// Create a configuration for the given workspace and bazel binary
    pub fn new(working_directory: impl Into<PathBuf>, bazel_path: impl Into<PathBuf>) -> Self {
        Self {
            working_directory: normalize(&working_directory.into()),
            bazel_path: bazel_path.into(),
            startup_options: Vec::new(),
            command_options: Vec::new(),
            keep_going: false,
            verbose: false,
            debug: false,
        }
    }

    /// Set startup options from a whitespace-separated token string
    pub fn with_startup_options(mut self, options: &str) -> Self {
        self.startup_options = split_tokens(options);
        self
    }

    /// Set command options from a whitespace-separated token string
    pub fn with_command_options(mut self, options: &str) -> Self {
        self.command_options = split_tokens(options);
        self
    }

    /// Tolerate partial query failures (`--keep_going`)
    pub fn with_keep_going(mut self, keep_going: bool) -> Self {
        self.keep_going = keep_going;
        self
    }

    /// Echo subprocess stderr and phase timings
    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    /// Run the query against an isolated bazel configuration
    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }
}

fn split_tokens(options: &str) -> Vec<String> {
    options
        .split_whitespace()
        .map(|token| token.to_string())
        .collect()
}

/// Lexically normalize a path: drop `.` components, resolve `..` where possible
fn normalize(path: &Path) -> PathBuf {
    let mut normalized = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if !normalized.pop() {
                    normalized.push(component.as_os_str());
                }
            }
            other => normalized.push(other.as_os_str()),
        }
    }
    normalized
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_option_strings_on_whitespace() {
        let config = BazelQueryConfig::new("/workspace", "/usr/bin/bazel")
            .with_startup_options("--host_jvm_args=-Xmx4g  --batch")
            .with_command_options("--noimplicit_deps");

        assert_eq!(
            config.startup_options,
            vec!["--host_jvm_args=-Xmx4g", "--batch"]
        );
        assert_eq!(config.command_options, vec!["--noimplicit_deps"]);
    }

    #[test]
    fn normalizes_working_directory() {
        let config = BazelQueryConfig::new("/workspace/./sub/../sub", "bazel");
        assert_eq!(config.working_directory, PathBuf::from("/workspace/sub"));
    }

    #[test]
    fn empty_option_string_yields_no_tokens() {
        let config = BazelQueryConfig::new("/workspace", "bazel").with_startup_options("");
        assert!(config.startup_options.is_empty());
    }
}
