//! Plain-text rendering of a resolved configuration.
//!
//! The output is a JSON-with-comments document in which every scalar and
//! every list element is followed by `// <origin>`. It can be fed back to
//! the layer reader unchanged.

use crate::config::provenance::{Origin, Provenance, SourcedList};
use crate::config::types::Config;
use std::path::Path;

enum Node {
    Scalar { json: String, origin: String },
    List(Vec<(String, String)>),
    Object(Vec<(String, Node)>),
}

/// Render `config` annotated with the origins in `provenance`.
///
/// File origins under `home` are shown as `~/...`.
pub fn render_with_sources(config: &Config, provenance: &Provenance, home: Option<&Path>) -> String {
    let labels = Labels { home };

    let mut members = vec![
        (
            "backend".to_string(),
            labels.scalar(quote(config.backend.as_str()), &provenance.backend),
        ),
        (
            "tool".to_string(),
            labels.scalar(nullable(&config.tool), &provenance.tool),
        ),
    ];
    members.extend(labels.lists([
        ("mounts_ro", &config.mounts_ro, &provenance.mounts_ro),
        ("mounts_rw", &config.mounts_rw, &provenance.mounts_rw),
        ("env", &config.env, &provenance.env),
        ("pre_run_hooks", &config.pre_run_hooks, &provenance.pre_run_hooks),
        ("post_build_hooks", &config.post_build_hooks, &provenance.post_build_hooks),
    ]));

    let tools = config
        .tools
        .iter()
        .map(|(name, tool)| {
            let sources = provenance.tools.get(name).cloned().unwrap_or_default();
            let node = Node::Object(labels.lists([
                ("mounts_ro", &tool.mounts_ro, &sources.mounts_ro),
                ("mounts_rw", &tool.mounts_rw, &sources.mounts_rw),
                ("env", &tool.env, &sources.env),
                ("pre_run_hooks", &tool.pre_run_hooks, &sources.pre_run_hooks),
                ("post_build_hooks", &tool.post_build_hooks, &sources.post_build_hooks),
            ]));
            (name.clone(), node)
        })
        .collect();
    members.push(("tools".to_string(), Node::Object(tools)));

    let repos = config
        .repos
        .iter()
        .map(|(name, repo)| {
            let node = match provenance.repos.get(name) {
                Some(sources) => {
                    let mut fields = vec![(
                        "tool".to_string(),
                        labels.scalar(nullable(&repo.tool), &sources.tool),
                    )];
                    fields.extend(labels.lists([
                        ("mounts_ro", &repo.mounts_ro, &sources.mounts_ro),
                        ("mounts_rw", &repo.mounts_rw, &sources.mounts_rw),
                        ("env", &repo.env, &sources.env),
                        ("pre_run_hooks", &repo.pre_run_hooks, &sources.pre_run_hooks),
                        ("post_build_hooks", &repo.post_build_hooks, &sources.post_build_hooks),
                    ]));
                    Node::Object(fields)
                }
                None => Node::Object(Vec::new()),
            };
            (name.clone(), node)
        })
        .collect();
    members.push(("repos".to_string(), Node::Object(repos)));

    let mut out = String::new();
    write_node(&mut out, None, &Node::Object(members), 0, false);
    out
}

/// Render the compiled-in configuration; every origin is `default`.
pub fn render_defaults(config: &Config) -> String {
    render_with_sources(config, &Provenance::all_default(config), None)
}

struct Labels<'a> {
    home: Option<&'a Path>,
}

impl Labels<'_> {
    fn scalar(&self, json: String, origin: &Origin) -> Node {
        Node::Scalar {
            json,
            origin: origin.display_relative_to(self.home),
        }
    }

    fn lists<'c, const N: usize>(
        &self,
        fields: [(&str, &'c Vec<String>, &'c SourcedList); N],
    ) -> Vec<(String, Node)> {
        fields
            .into_iter()
            .map(|(key, values, sources)| (key.to_string(), self.list(values, sources)))
            .collect()
    }

    fn list(&self, values: &[String], sources: &SourcedList) -> Node {
        Node::List(
            values
                .iter()
                .map(|value| {
                    let origin = sources
                        .origin_of(value)
                        .map(|origin| origin.display_relative_to(self.home))
                        .unwrap_or_else(|| Origin::Default.to_string());
                    (quote(value), origin)
                })
                .collect(),
        )
    }
}

fn write_node(out: &mut String, key: Option<&str>, node: &Node, depth: usize, comma: bool) {
    let pad = "  ".repeat(depth);
    let prefix = match key {
        Some(key) => format!("{pad}{}: ", quote(key)),
        None => pad.clone(),
    };
    let comma = if comma { "," } else { "" };

    match node {
        Node::Scalar { json, origin } => {
            out.push_str(&format!("{prefix}{json}{comma} // {origin}\n"));
        }
        Node::List(items) if items.is_empty() => {
            out.push_str(&format!("{prefix}[]{comma}\n"));
        }
        Node::List(items) => {
            out.push_str(&format!("{prefix}[\n"));
            for (idx, (json, origin)) in items.iter().enumerate() {
                let item_comma = if idx + 1 < items.len() { "," } else { "" };
                out.push_str(&format!("{pad}  {json}{item_comma} // {origin}\n"));
            }
            out.push_str(&format!("{pad}]{comma}\n"));
        }
        Node::Object(members) if members.is_empty() => {
            out.push_str(&format!("{prefix}{{}}{comma}\n"));
        }
        Node::Object(members) => {
            out.push_str(&format!("{prefix}{{\n"));
            for (idx, (member_key, member)) in members.iter().enumerate() {
                write_node(out, Some(member_key), member, depth + 1, idx + 1 < members.len());
            }
            out.push_str(&format!("{pad}}}{comma}\n"));
        }
    }
}

fn quote(value: &str) -> String {
    serde_json::Value::from(value).to_string()
}

fn nullable(value: &str) -> String {
    if value.is_empty() {
        "null".to_string()
    } else {
        quote(value)
    }
}
