//! Configuration loading: locating layers and resolving them.
//!
//! # Configuration Hierarchy
//!
//! Layers are folded in the following order (later layers override earlier ones):
//! 1. **Compiled-in defaults** - see [`default_config`]
//! 2. **Global config** - `<config_dir>/cage/config.json` (or `$CAGE_CONFIG_DIR/config.json`)
//! 3. **Repository config** - `<repo_root>/.cage/config.json`
//!
//! Per-tool and per-repository overlays live inside those files under
//! `tools.<name>` and `repos.<name>`.

use crate::config::defaults::{
    CONFIG_DIR_ENV, CONFIG_FILE_NAME, GLOBAL_DIR_NAME, REPO_DIR_NAME, default_config,
};
use crate::config::errors::ConfigError;
use crate::config::layers::{Layer, read_layer};
use crate::config::provenance::Provenance;
use crate::config::resolve::fold_layers;
use crate::config::types::Config;
use serde::Serialize;
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Where the on-disk layers live.
///
/// Passed explicitly into [`ConfigLoader`] so that resolution never depends
/// on hidden process-wide state.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ConfigPaths {
    pub global_file: Option<PathBuf>,
    pub repo_file: Option<PathBuf>,
    /// Used only to shorten displayed origins.
    pub home_dir: Option<PathBuf>,
}

impl ConfigPaths {
    /// Discover paths from the environment and the current directory.
    pub fn discover() -> Self {
        let global_dir = match std::env::var(CONFIG_DIR_ENV) {
            Ok(dir) if !dir.is_empty() => Some(PathBuf::from(dir)),
            _ => dirs::config_dir().map(|dir| dir.join(GLOBAL_DIR_NAME)),
        };
        let repo_root = match std::env::current_dir() {
            Ok(dir) => Some(dir),
            Err(e) => {
                debug!(event = "core.config.current_dir_unavailable", error = %e);
                None
            }
        };
        Self::new(global_dir, repo_root).with_home_dir(dirs::home_dir())
    }

    /// Build paths from an explicit global config directory and repository root.
    pub fn new(global_dir: Option<PathBuf>, repo_root: Option<PathBuf>) -> Self {
        Self {
            global_file: global_dir.map(|dir| dir.join(CONFIG_FILE_NAME)),
            repo_file: repo_root.map(|root| root.join(REPO_DIR_NAME).join(CONFIG_FILE_NAME)),
            home_dir: None,
        }
    }

    pub fn with_home_dir(mut self, home_dir: Option<PathBuf>) -> Self {
        self.home_dir = home_dir;
        self
    }
}

/// Which layer a source occupies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    Default,
    Global,
    Repo,
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SourceKind::Default => write!(f, "default"),
            SourceKind::Global => write!(f, "global"),
            SourceKind::Repo => write!(f, "repo"),
        }
    }
}

/// Whether a source currently contributes a layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LayerStatus {
    /// Compiled into the binary, always present.
    Builtin,
    Present,
    Missing,
}

impl fmt::Display for LayerStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LayerStatus::Builtin => write!(f, "builtin"),
            LayerStatus::Present => write!(f, "present"),
            LayerStatus::Missing => write!(f, "missing"),
        }
    }
}

/// One entry of [`ConfigLoader::sources`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SourceStatus {
    pub kind: SourceKind,
    pub path: Option<PathBuf>,
    pub status: LayerStatus,
}

/// Resolves configuration from the layers named by a [`ConfigPaths`].
#[derive(Debug, Clone)]
pub struct ConfigLoader {
    paths: ConfigPaths,
}

impl ConfigLoader {
    pub fn new(paths: ConfigPaths) -> Self {
        Self { paths }
    }

    /// A loader for the discovered global and repository files.
    pub fn discover() -> Self {
        Self::new(ConfigPaths::discover())
    }

    pub fn paths(&self) -> &ConfigPaths {
        &self.paths
    }

    /// Read every layer, lowest precedence first.
    ///
    /// The baseline is always first. Missing files contribute nothing; any
    /// other failure aborts the whole read.
    pub fn read_layers(&self) -> Result<Vec<Layer>, ConfigError> {
        let mut layers = vec![Layer::baseline(&default_config())];

        for path in self.file_paths() {
            if let Some(layer) = read_layer(path)? {
                layers.push(layer);
            }
        }

        Ok(layers)
    }

    /// Resolve the effective configuration together with its provenance.
    ///
    /// # Errors
    ///
    /// Returns an error if any existing file cannot be read or decoded.
    /// Missing files are not errors. No partial result is ever returned.
    pub fn load_all_with_sources(&self) -> Result<(Config, Provenance), ConfigError> {
        let layers = self.read_layers()?;
        let (config, provenance) = fold_layers(&default_config(), &layers);

        info!(
            event = "core.config.resolve_completed",
            layers = layers.len(),
            backend = %config.backend,
            tools = config.tools.len(),
            repos = config.repos.len()
        );

        Ok((config, provenance))
    }

    /// Resolve the effective configuration, discarding provenance.
    pub fn load(&self) -> Result<Config, ConfigError> {
        self.load_all_with_sources().map(|(config, _)| config)
    }

    /// List every layer source and whether it is present. Never parses.
    pub fn sources(&self) -> Vec<SourceStatus> {
        let mut sources = vec![SourceStatus {
            kind: SourceKind::Default,
            path: None,
            status: LayerStatus::Builtin,
        }];
        let files = [
            (SourceKind::Global, &self.paths.global_file),
            (SourceKind::Repo, &self.paths.repo_file),
        ];
        for (kind, path) in files {
            let status = match path {
                Some(path) if path.exists() => LayerStatus::Present,
                _ => LayerStatus::Missing,
            };
            sources.push(SourceStatus {
                kind,
                path: path.clone(),
                status,
            });
        }
        sources
    }

    fn file_paths(&self) -> impl Iterator<Item = &Path> {
        [&self.paths.global_file, &self.paths.repo_file]
            .into_iter()
            .filter_map(|path| path.as_deref())
    }
}
