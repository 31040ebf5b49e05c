//! Compiled-in baseline configuration.
//!
//! The baseline is both the lowest-precedence layer of every resolution and
//! the answer to "show me the defaults". Building it never touches the file
//! system.

use crate::config::types::{Backend, Config};
use std::collections::BTreeMap;

/// File name of every on-disk config layer.
pub const CONFIG_FILE_NAME: &str = "config.json";

/// Directory under the user's config directory holding the global file.
pub const GLOBAL_DIR_NAME: &str = "cage";

/// Directory under the repository root holding the repository file.
pub const REPO_DIR_NAME: &str = ".cage";

/// Environment variable overriding the global config directory.
pub const CONFIG_DIR_ENV: &str = "CAGE_CONFIG_DIR";

/// Returns the default backend.
pub fn default_backend() -> Backend {
    Backend::Docker
}

/// Returns the compiled-in configuration.
pub fn default_config() -> Config {
    Config::default()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            backend: default_backend(),
            tool: String::new(),
            mounts_ro: Vec::new(),
            mounts_rw: Vec::new(),
            env: Vec::new(),
            pre_run_hooks: Vec::new(),
            post_build_hooks: Vec::new(),
            tools: BTreeMap::new(),
            repos: BTreeMap::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = default_config();
        assert_eq!(config.backend, Backend::Docker);
        assert_eq!(config.tool(), None);
        assert!(config.mounts_ro.is_empty());
        assert!(config.env.is_empty());
        assert!(config.tools.is_empty());
        assert!(config.repos.is_empty());
    }

    #[test]
    fn test_default_config_is_stable() {
        assert_eq!(default_config(), default_config());
    }
}
