//! Provenance: where every resolved value came from.
//!
//! [`Provenance`] mirrors [`Config`] field for field. Scalars carry a single
//! [`Origin`]; lists carry a [`SourcedList`], an ordered sequence of
//! `(value, origin)` pairs with one entry per distinct value.

use crate::config::types::{Config, RepoConfig, ToolConfig};
use serde::{Serialize, Serializer};
use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};

/// The layer a value came from.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Origin {
    /// The compiled-in baseline.
    Default,
    /// A configuration file on disk.
    File(PathBuf),
}

impl Origin {
    pub fn is_default(&self) -> bool {
        matches!(self, Origin::Default)
    }

    pub fn path(&self) -> Option<&Path> {
        match self {
            Origin::Default => None,
            Origin::File(path) => Some(path),
        }
    }

    /// Label used by the display renderer: `default`, or the file path with
    /// the home directory shortened to `~`.
    pub fn display_relative_to(&self, home: Option<&Path>) -> String {
        match self {
            Origin::Default => "default".to_string(),
            Origin::File(path) => match home.and_then(|home| path.strip_prefix(home).ok()) {
                Some(rest) if rest.as_os_str().is_empty() => "~".to_string(),
                Some(rest) => format!("~/{}", rest.display()),
                None => path.display().to_string(),
            },
        }
    }
}

impl fmt::Display for Origin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Origin::Default => f.write_str("default"),
            Origin::File(path) => write!(f, "{}", path.display()),
        }
    }
}

impl Serialize for Origin {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// A list value paired with the layer that first introduced it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Sourced {
    pub value: String,
    pub origin: Origin,
}

/// Ordered `(value, origin)` pairs for one list field.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
#[serde(transparent)]
pub struct SourcedList(Vec<Sourced>);

impl SourcedList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records `value` unless it is already attributed.
    ///
    /// Returns `true` when the value was newly recorded.
    pub fn record(&mut self, value: &str, origin: &Origin) -> bool {
        if self.contains(value) {
            return false;
        }
        self.0.push(Sourced {
            value: value.to_string(),
            origin: origin.clone(),
        });
        true
    }

    pub fn contains(&self, value: &str) -> bool {
        self.0.iter().any(|entry| entry.value == value)
    }

    /// Origin of the first layer that introduced `value`.
    pub fn origin_of(&self, value: &str) -> Option<&Origin> {
        self.0
            .iter()
            .find(|entry| entry.value == value)
            .map(|entry| &entry.origin)
    }

    pub fn values(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(|entry| entry.value.as_str())
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Sourced> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    fn all_default(values: &[String]) -> Self {
        let mut list = Self::new();
        for value in values {
            list.record(value, &Origin::Default);
        }
        list
    }
}

impl<'a> IntoIterator for &'a SourcedList {
    type Item = &'a Sourced;
    type IntoIter = std::slice::Iter<'a, Sourced>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Provenance of a resolved [`Config`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Provenance {
    pub backend: Origin,
    pub tool: Origin,
    pub mounts_ro: SourcedList,
    pub mounts_rw: SourcedList,
    pub env: SourcedList,
    pub pre_run_hooks: SourcedList,
    pub post_build_hooks: SourcedList,
    pub tools: BTreeMap<String, ToolProvenance>,
    pub repos: BTreeMap<String, RepoProvenance>,
}

/// Provenance of a resolved [`ToolConfig`].
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct ToolProvenance {
    pub mounts_ro: SourcedList,
    pub mounts_rw: SourcedList,
    pub env: SourcedList,
    pub pre_run_hooks: SourcedList,
    pub post_build_hooks: SourcedList,
}

/// Provenance of a resolved [`RepoConfig`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RepoProvenance {
    pub tool: Origin,
    pub mounts_ro: SourcedList,
    pub mounts_rw: SourcedList,
    pub env: SourcedList,
    pub pre_run_hooks: SourcedList,
    pub post_build_hooks: SourcedList,
}

impl Provenance {
    /// Provenance of a configuration that came entirely from the baseline.
    pub fn all_default(config: &Config) -> Self {
        Self {
            backend: Origin::Default,
            tool: Origin::Default,
            mounts_ro: SourcedList::all_default(&config.mounts_ro),
            mounts_rw: SourcedList::all_default(&config.mounts_rw),
            env: SourcedList::all_default(&config.env),
            pre_run_hooks: SourcedList::all_default(&config.pre_run_hooks),
            post_build_hooks: SourcedList::all_default(&config.post_build_hooks),
            tools: config
                .tools
                .iter()
                .map(|(name, tool)| (name.clone(), ToolProvenance::all_default(tool)))
                .collect(),
            repos: config
                .repos
                .iter()
                .map(|(name, repo)| (name.clone(), RepoProvenance::all_default(repo)))
                .collect(),
        }
    }

    /// Iterates over every origin recorded anywhere in the tree.
    pub fn origins(&self) -> impl Iterator<Item = &Origin> {
        let top = [&self.backend, &self.tool].into_iter().chain(
            [
                &self.mounts_ro,
                &self.mounts_rw,
                &self.env,
                &self.pre_run_hooks,
                &self.post_build_hooks,
            ]
            .into_iter()
            .flat_map(|list| list.iter().map(|entry| &entry.origin)),
        );
        let tools = self.tools.values().flat_map(ToolProvenance::origins);
        let repos = self.repos.values().flat_map(|repo| {
            std::iter::once(&repo.tool).chain(
                [
                    &repo.mounts_ro,
                    &repo.mounts_rw,
                    &repo.env,
                    &repo.pre_run_hooks,
                    &repo.post_build_hooks,
                ]
                .into_iter()
                .flat_map(|list| list.iter().map(|entry| &entry.origin)),
            )
        });
        top.chain(tools).chain(repos)
    }
}

impl ToolProvenance {
    fn all_default(tool: &ToolConfig) -> Self {
        Self {
            mounts_ro: SourcedList::all_default(&tool.mounts_ro),
            mounts_rw: SourcedList::all_default(&tool.mounts_rw),
            env: SourcedList::all_default(&tool.env),
            pre_run_hooks: SourcedList::all_default(&tool.pre_run_hooks),
            post_build_hooks: SourcedList::all_default(&tool.post_build_hooks),
        }
    }

    fn origins(&self) -> impl Iterator<Item = &Origin> {
        [
            &self.mounts_ro,
            &self.mounts_rw,
            &self.env,
            &self.pre_run_hooks,
            &self.post_build_hooks,
        ]
        .into_iter()
        .flat_map(|list| list.iter().map(|entry| &entry.origin))
    }
}

impl RepoProvenance {
    fn all_default(repo: &RepoConfig) -> Self {
        Self {
            tool: Origin::Default,
            mounts_ro: SourcedList::all_default(&repo.mounts_ro),
            mounts_rw: SourcedList::all_default(&repo.mounts_rw),
            env: SourcedList::all_default(&repo.env),
            pre_run_hooks: SourcedList::all_default(&repo.pre_run_hooks),
            post_build_hooks: SourcedList::all_default(&repo.post_build_hooks),
        }
    }
}
