//! Folding layers into one [`Config`] and its [`Provenance`].
//!
//! Layers are always given lowest precedence first:
//! default < global file < repository file.
//!
//! - Scalars: the highest layer that sets the field wins.
//! - Set-like lists (`mounts_ro`, `mounts_rw`, `env`): union in first-seen
//!   order, each value attributed to the first layer that introduced it.
//! - Hook lists: concatenated in layer order with duplicates kept; each
//!   distinct command is attributed once, to its first layer.
//! - `tools` / `repos`: resolved per name, over only the entries each layer
//!   has for that name.

use crate::config::layers::{Layer, ListFields};
use crate::config::provenance::{Origin, Provenance, RepoProvenance, SourcedList, ToolProvenance};
use crate::config::types::{Config, RepoConfig, ToolConfig};
use std::collections::{BTreeMap, BTreeSet};

/// How a list field combines values from several layers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListKind {
    /// Each value appears once.
    Set,
    /// Order and repetition are significant.
    Sequence,
}

/// Pick the value of a scalar field.
///
/// `contributions` yields each layer's value (`None` when the layer does
/// not set the field), lowest precedence first. Falls back to `fallback`
/// attributed to [`Origin::Default`].
pub fn resolve_scalar<'a, T, I>(contributions: I, fallback: T) -> (T, Origin)
where
    T: Clone + 'a,
    I: IntoIterator<Item = (&'a Origin, Option<&'a T>)>,
{
    contributions
        .into_iter()
        .filter_map(|(origin, value)| value.map(|value| (value.clone(), origin.clone())))
        .last()
        .unwrap_or((fallback, Origin::Default))
}

/// Accumulate a list field across layers.
pub fn accumulate<'a, I>(kind: ListKind, contributions: I) -> (Vec<String>, SourcedList)
where
    I: IntoIterator<Item = (&'a Origin, &'a [String])>,
{
    let mut values = Vec::new();
    let mut sources = SourcedList::new();

    for (origin, items) in contributions {
        for item in items {
            let first_seen = sources.record(item, origin);
            if first_seen || kind == ListKind::Sequence {
                values.push(item.clone());
            }
        }
    }

    (values, sources)
}

/// The five list fields resolved over one stack of [`ListFields`].
struct ResolvedLists {
    values: ToolConfig,
    sources: ToolProvenance,
}

fn resolve_lists<'a>(stack: &[(&'a Origin, &'a ListFields)]) -> ResolvedLists {
    fn field<'a>(
        stack: &[(&'a Origin, &'a ListFields)],
        kind: ListKind,
        select: fn(&ListFields) -> &Vec<String>,
    ) -> (Vec<String>, SourcedList) {
        accumulate(
            kind,
            stack
                .iter()
                .map(|(origin, lists)| (*origin, select(lists).as_slice())),
        )
    }

    let (mounts_ro, mounts_ro_src) = field(stack, ListKind::Set, |l| &l.mounts_ro);
    let (mounts_rw, mounts_rw_src) = field(stack, ListKind::Set, |l| &l.mounts_rw);
    let (env, env_src) = field(stack, ListKind::Set, |l| &l.env);
    let (pre_run_hooks, pre_run_src) = field(stack, ListKind::Sequence, |l| &l.pre_run_hooks);
    let (post_build_hooks, post_build_src) =
        field(stack, ListKind::Sequence, |l| &l.post_build_hooks);

    ResolvedLists {
        values: ToolConfig {
            mounts_ro,
            mounts_rw,
            env,
            pre_run_hooks,
            post_build_hooks,
        },
        sources: ToolProvenance {
            mounts_ro: mounts_ro_src,
            mounts_rw: mounts_rw_src,
            env: env_src,
            pre_run_hooks: pre_run_src,
            post_build_hooks: post_build_src,
        },
    }
}

fn resolve_tools(layers: &[Layer]) -> (BTreeMap<String, ToolConfig>, BTreeMap<String, ToolProvenance>) {
    let names: BTreeSet<&String> = layers.iter().flat_map(|l| l.fields.tools.keys()).collect();

    let mut values = BTreeMap::new();
    let mut sources = BTreeMap::new();
    for name in names {
        let stack: Vec<_> = layers
            .iter()
            .filter_map(|l| l.fields.tools.get(name).map(|entry| (&l.origin, entry)))
            .collect();
        let resolved = resolve_lists(&stack);
        values.insert(name.clone(), resolved.values);
        sources.insert(name.clone(), resolved.sources);
    }
    (values, sources)
}

fn resolve_repos(layers: &[Layer]) -> (BTreeMap<String, RepoConfig>, BTreeMap<String, RepoProvenance>) {
    let names: BTreeSet<&String> = layers.iter().flat_map(|l| l.fields.repos.keys()).collect();

    let mut values = BTreeMap::new();
    let mut sources = BTreeMap::new();
    for name in names {
        let entries: Vec<_> = layers
            .iter()
            .filter_map(|l| l.fields.repos.get(name).map(|entry| (&l.origin, entry)))
            .collect();

        // Independent of the top-level `tool`: unset means "default".
        let (tool, tool_origin) = resolve_scalar(
            entries
                .iter()
                .map(|(origin, entry)| (*origin, entry.tool.as_ref())),
            String::new(),
        );
        let stack: Vec<_> = entries
            .iter()
            .map(|(origin, entry)| (*origin, &entry.lists))
            .collect();
        let ResolvedLists {
            values: lists,
            sources: list_sources,
        } = resolve_lists(&stack);

        values.insert(
            name.clone(),
            RepoConfig {
                tool,
                mounts_ro: lists.mounts_ro,
                mounts_rw: lists.mounts_rw,
                env: lists.env,
                pre_run_hooks: lists.pre_run_hooks,
                post_build_hooks: lists.post_build_hooks,
            },
        );
        sources.insert(
            name.clone(),
            RepoProvenance {
                tool: tool_origin,
                mounts_ro: list_sources.mounts_ro,
                mounts_rw: list_sources.mounts_rw,
                env: list_sources.env,
                pre_run_hooks: list_sources.pre_run_hooks,
                post_build_hooks: list_sources.post_build_hooks,
            },
        );
    }
    (values, sources)
}

/// Fold `layers` (lowest precedence first) into a config and its provenance.
///
/// `baseline` supplies scalar fallbacks when no layer sets a field.
pub fn fold_layers(baseline: &Config, layers: &[Layer]) -> (Config, Provenance) {
    let (backend, backend_origin) = resolve_scalar(
        layers
            .iter()
            .map(|l| (&l.origin, l.fields.backend.as_ref())),
        baseline.backend,
    );
    let (tool, tool_origin) = resolve_scalar(
        layers.iter().map(|l| (&l.origin, l.fields.tool.as_ref())),
        baseline.tool.clone(),
    );

    let stack: Vec<_> = layers.iter().map(|l| (&l.origin, &l.fields.lists)).collect();
    let ResolvedLists {
        values: lists,
        sources: list_sources,
    } = resolve_lists(&stack);

    let (tools, tool_sources) = resolve_tools(layers);
    let (repos, repo_sources) = resolve_repos(layers);

    let config = Config {
        backend,
        tool,
        mounts_ro: lists.mounts_ro,
        mounts_rw: lists.mounts_rw,
        env: lists.env,
        pre_run_hooks: lists.pre_run_hooks,
        post_build_hooks: lists.post_build_hooks,
        tools,
        repos,
    };
    let provenance = Provenance {
        backend: backend_origin,
        tool: tool_origin,
        mounts_ro: list_sources.mounts_ro,
        mounts_rw: list_sources.mounts_rw,
        env: list_sources.env,
        pre_run_hooks: list_sources.pre_run_hooks,
        post_build_hooks: list_sources.post_build_hooks,
        tools: tool_sources,
        repos: repo_sources,
    };
    (config, provenance)
}
