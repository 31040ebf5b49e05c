//! # Configuration System
//!
//! Layered JSON configuration for CAGE with per-value provenance.
//!
//! ## Configuration Hierarchy
//!
//! Configuration is resolved from the following layers (later layers override earlier ones):
//! 1. **Compiled-in defaults** - Built-in baseline values
//! 2. **Global config** - `~/.config/cage/config.json` (user preferences)
//! 3. **Repository config** - `./.cage/config.json` (repository-specific overrides)
//!
//! Scalars take the value of the highest layer that sets them. Mount and
//! environment lists are unioned across layers; hook lists are concatenated.
//! `tools.<name>` and `repos.<name>` overlays are resolved the same way, but
//! only across the entries for that exact name.
//!
//! ## Usage Example
//!
//! ```jsonc
//! // ~/.config/cage/config.json
//! {
//!   "backend": "docker",
//!   "tool": "claude",
//!   "env": ["TERM"],
//!   "tools": {
//!     "claude": { "mounts_rw": ["~/.claude"] }
//!   }
//! }
//! ```
//!
//! ## Loading Configuration
//!
//! ```rust,no_run
//! use cage_core::config::ConfigLoader;
//!
//! fn example() -> Result<(), Box<dyn std::error::Error>> {
//!     let (config, provenance) = ConfigLoader::discover().load_all_with_sources()?;
//!     println!("backend {} from {}", config.backend, provenance.backend);
//!     Ok(())
//! }
//! ```

pub mod defaults;
pub mod errors;
pub mod jsonc;
pub mod layers;
pub mod loading;
pub mod provenance;
pub mod render;
pub mod resolve;
pub mod types;

// Public API exports
pub use defaults::default_config;
pub use errors::ConfigError;
pub use layers::{Layer, LayerFields, ListFields, RepoFields};
pub use loading::{ConfigLoader, ConfigPaths, LayerStatus, SourceKind, SourceStatus};
pub use provenance::{Origin, Provenance, RepoProvenance, Sourced, SourcedList, ToolProvenance};
pub use render::{render_defaults, render_with_sources};
pub use types::{Backend, Config, RepoConfig, ToolConfig, UnknownBackend};

/// Resolve the discovered layers into the effective configuration and its
/// provenance.
///
/// See [`ConfigLoader::load_all_with_sources`] for details.
pub fn load_all_with_sources() -> Result<(Config, Provenance), ConfigError> {
    ConfigLoader::discover().load_all_with_sources()
}
