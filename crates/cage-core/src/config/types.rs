//! Configuration type definitions for CAGE.
//!
//! These are the *resolved* structures: the single effective configuration
//! produced by folding every layer together. Consumers (the container
//! launcher, the mount-wait script generator) only ever see these types.
//!
//! # Example Configuration
//!
//! ```jsonc
//! {
//!   // Container backend used to run tools
//!   "backend": "docker",
//!   "tool": "claude",
//!   "mounts_ro": ["~/.gitconfig"],
//!   "mounts_rw": ["~/.cache/cage"],
//!   "env": ["TERM", "ANTHROPIC_API_KEY"],
//!   "pre_run_hooks": ["git fetch --quiet"],
//!   "post_build_hooks": [],
//!   "tools": {
//!     "claude": { "mounts_rw": ["~/.claude"] }
//!   },
//!   "repos": {
//!     "website": { "tool": "codex", "env": ["NODE_ENV"] }
//!   }
//! }
//! ```

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Container backend used to launch tools.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
    #[default]
    Docker,
    Ssh,
}

impl Backend {
    pub const ALL: [Backend; 2] = [Backend::Docker, Backend::Ssh];

    pub fn as_str(&self) -> &'static str {
        match self {
            Backend::Docker => "docker",
            Backend::Ssh => "ssh",
        }
    }
}

impl fmt::Display for Backend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a backend name is not recognized.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown backend '{0}'")]
pub struct UnknownBackend(pub String);

impl FromStr for Backend {
    type Err = UnknownBackend;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Backend::ALL
            .into_iter()
            .find(|backend| backend.as_str() == s)
            .ok_or_else(|| UnknownBackend(s.to_string()))
    }
}

/// The effective configuration after resolving every layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    pub backend: Backend,

    /// Default tool to run. Empty means unset and renders as `null`.
    #[serde(with = "empty_as_null")]
    pub tool: String,

    pub mounts_ro: Vec<String>,
    pub mounts_rw: Vec<String>,
    pub env: Vec<String>,
    pub pre_run_hooks: Vec<String>,
    pub post_build_hooks: Vec<String>,

    /// Per-tool overlays, only for names that appear in at least one layer.
    pub tools: BTreeMap<String, ToolConfig>,

    /// Per-repository overlays, only for names that appear in at least one layer.
    pub repos: BTreeMap<String, RepoConfig>,
}

impl Config {
    /// The configured default tool, if any.
    pub fn tool(&self) -> Option<&str> {
        non_empty(&self.tool)
    }
}

/// Resolved overlay for a single tool.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ToolConfig {
    pub mounts_ro: Vec<String>,
    pub mounts_rw: Vec<String>,
    pub env: Vec<String>,
    pub pre_run_hooks: Vec<String>,
    pub post_build_hooks: Vec<String>,
}

/// Resolved overlay for a single repository.
///
/// `tool` is resolved only across the repository's own entries; it never
/// falls back to the top-level `tool`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RepoConfig {
    #[serde(with = "empty_as_null")]
    pub tool: String,
    pub mounts_ro: Vec<String>,
    pub mounts_rw: Vec<String>,
    pub env: Vec<String>,
    pub pre_run_hooks: Vec<String>,
    pub post_build_hooks: Vec<String>,
}

impl RepoConfig {
    /// The repository's tool override, if any.
    pub fn tool(&self) -> Option<&str> {
        non_empty(&self.tool)
    }
}

fn non_empty(value: &str) -> Option<&str> {
    if value.is_empty() { None } else { Some(value) }
}

/// Serde adapter mapping an empty string to `null` and back.
mod empty_as_null {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &str, serializer: S) -> Result<S::Ok, S::Error> {
        if value.is_empty() {
            serializer.serialize_none()
        } else {
            serializer.serialize_str(value)
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
        Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backend_from_str() {
        assert_eq!("docker".parse::<Backend>().unwrap(), Backend::Docker);
        assert_eq!("ssh".parse::<Backend>().unwrap(), Backend::Ssh);

        let err = "podman".parse::<Backend>().unwrap_err();
        assert_eq!(err, UnknownBackend("podman".to_string()));
    }

    #[test]
    fn test_backend_is_case_sensitive() {
        assert!("Docker".parse::<Backend>().is_err());
    }

    #[test]
    fn test_backend_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&Backend::Ssh).unwrap(), r#""ssh""#);
        assert_eq!(Backend::Docker.to_string(), "docker");
    }

    #[test]
    fn test_unset_tool_serializes_as_null() {
        let json = serde_json::to_value(Config::default()).unwrap();
        assert!(json["tool"].is_null());

        let parsed: RepoConfig = serde_json::from_str(
            r#"{"tool": null, "mounts_ro": [], "mounts_rw": [], "env": [],
                "pre_run_hooks": [], "post_build_hooks": []}"#,
        )
        .unwrap();
        assert_eq!(parsed.tool, "");
    }

    #[test]
    fn test_empty_tool_is_unset() {
        let repo = RepoConfig::default();
        assert_eq!(repo.tool(), None);

        let repo = RepoConfig {
            tool: "codex".to_string(),
            ..RepoConfig::default()
        };
        assert_eq!(repo.tool(), Some("codex"));
    }
}
