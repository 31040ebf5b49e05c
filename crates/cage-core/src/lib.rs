//! cage-core: Core library for running CLI tools inside containers
//!
//! This library resolves CAGE's layered configuration: a compiled-in
//! baseline, a global file and a repository file are folded into one
//! effective [`Config`] plus a parallel [`Provenance`] tree recording which
//! layer contributed every value. It is used by the `cage` CLI.
//!
//! # Main Entry Points
//!
//! - [`config`] - Layer reading, resolution, provenance and rendering
//! - [`launch`] - Per-invocation launch profiles built from a resolved config

pub mod config;
pub mod errors;
pub mod events;
pub mod launch;
pub mod logging;

// Re-export commonly used types at crate root for convenience
pub use config::{
    Backend, Config, ConfigError, ConfigLoader, ConfigPaths, Origin, Provenance, RepoConfig,
    ToolConfig, default_config,
};
pub use errors::{CageError, CageResult};
pub use launch::{LaunchError, LaunchProfile};

// Re-export logging initialization
pub use logging::init_logging;
