//! Layer reading.
//!
//! A [`Layer`] is one configuration source (the compiled-in baseline or a
//! file) with its fields decoded into a partial configuration. Scalars that
//! a layer does not set are `None`; lists it does not mention are empty.

use crate::config::errors::ConfigError;
use crate::config::jsonc;
use crate::config::provenance::Origin;
use crate::config::types::{Backend, Config, RepoConfig, ToolConfig};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fs;
use std::io::ErrorKind;
use std::path::Path;
use tracing::{debug, warn};

const LIST_KEYS: [&str; 5] = [
    "mounts_ro",
    "mounts_rw",
    "env",
    "pre_run_hooks",
    "post_build_hooks",
];

/// One configuration source, immutable once read.
#[derive(Debug, Clone, PartialEq)]
pub struct Layer {
    pub origin: Origin,
    pub fields: LayerFields,
}

/// The partial configuration carried by a layer.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct LayerFields {
    pub backend: Option<Backend>,
    pub tool: Option<String>,
    pub lists: ListFields,
    pub tools: BTreeMap<String, ListFields>,
    pub repos: BTreeMap<String, RepoFields>,
}

/// List fields shared by the top level and both overlay kinds.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ListFields {
    pub mounts_ro: Vec<String>,
    pub mounts_rw: Vec<String>,
    pub env: Vec<String>,
    pub pre_run_hooks: Vec<String>,
    pub post_build_hooks: Vec<String>,
}

/// A repository overlay as written in one layer.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RepoFields {
    pub tool: Option<String>,
    pub lists: ListFields,
}

impl Layer {
    /// The baseline layer built from the compiled-in configuration.
    pub fn baseline(config: &Config) -> Self {
        Self {
            origin: Origin::Default,
            fields: LayerFields::from_config(config),
        }
    }
}

impl LayerFields {
    fn from_config(config: &Config) -> Self {
        Self {
            backend: Some(config.backend),
            tool: set_scalar(&config.tool),
            lists: ListFields {
                mounts_ro: config.mounts_ro.clone(),
                mounts_rw: config.mounts_rw.clone(),
                env: config.env.clone(),
                pre_run_hooks: config.pre_run_hooks.clone(),
                post_build_hooks: config.post_build_hooks.clone(),
            },
            tools: config
                .tools
                .iter()
                .map(|(name, tool)| (name.clone(), ListFields::from_tool(tool)))
                .collect(),
            repos: config
                .repos
                .iter()
                .map(|(name, repo)| (name.clone(), RepoFields::from_repo(repo)))
                .collect(),
        }
    }
}

impl ListFields {
    fn from_tool(tool: &ToolConfig) -> Self {
        Self {
            mounts_ro: tool.mounts_ro.clone(),
            mounts_rw: tool.mounts_rw.clone(),
            env: tool.env.clone(),
            pre_run_hooks: tool.pre_run_hooks.clone(),
            post_build_hooks: tool.post_build_hooks.clone(),
        }
    }
}

impl RepoFields {
    fn from_repo(repo: &RepoConfig) -> Self {
        Self {
            tool: set_scalar(&repo.tool),
            lists: ListFields {
                mounts_ro: repo.mounts_ro.clone(),
                mounts_rw: repo.mounts_rw.clone(),
                env: repo.env.clone(),
                pre_run_hooks: repo.pre_run_hooks.clone(),
                post_build_hooks: repo.post_build_hooks.clone(),
            },
        }
    }
}

fn set_scalar(value: &str) -> Option<String> {
    (!value.is_empty()).then(|| value.to_string())
}

/// Read the layer stored at `path`.
///
/// Returns `Ok(None)` when the file does not exist. Any other I/O failure,
/// a syntax error, or a field of the wrong shape is fatal.
pub fn read_layer(path: &Path) -> Result<Option<Layer>, ConfigError> {
    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            debug!(event = "core.config.layer_missing", path = %path.display());
            return Ok(None);
        }
        Err(e) if e.kind() == ErrorKind::InvalidData => {
            return Err(ConfigError::ParseError {
                path: path.to_path_buf(),
                line: None,
                column: None,
                message: e.to_string(),
            });
        }
        Err(source) => {
            return Err(ConfigError::ReadError {
                path: path.to_path_buf(),
                source,
            });
        }
    };

    let layer = parse_layer(path, &content)?;
    debug!(
        event = "core.config.layer_loaded",
        path = %path.display(),
        tools = layer.fields.tools.len(),
        repos = layer.fields.repos.len()
    );
    Ok(Some(layer))
}

/// Decode file content into a layer attributed to `path`.
pub fn parse_layer(path: &Path, content: &str) -> Result<Layer, ConfigError> {
    let document = jsonc::parse_document(path, content)?;
    let decoder = Decoder { path };
    let fields = decoder.layer_fields(&document)?;
    Ok(Layer {
        origin: Origin::File(path.to_path_buf()),
        fields,
    })
}

/// Shape checks for one file, carrying the path for error reporting.
struct Decoder<'a> {
    path: &'a Path,
}

impl Decoder<'_> {
    fn layer_fields(&self, document: &Value) -> Result<LayerFields, ConfigError> {
        let object = self.object(document, "<root>")?;
        let mut fields = LayerFields::default();

        for (key, value) in object {
            match key.as_str() {
                "backend" => fields.backend = self.backend(value)?,
                "tool" => fields.tool = self.optional_string(value, "tool")?,
                "tools" => {
                    for (name, overlay) in self.object(value, "tools")? {
                        let field = format!("tools.{name}");
                        let overlay = self.object(overlay, &field)?;
                        let lists = self.list_fields(overlay, &field, &[])?;
                        fields.tools.insert(name.clone(), lists);
                    }
                }
                "repos" => {
                    for (name, overlay) in self.object(value, "repos")? {
                        let field = format!("repos.{name}");
                        let overlay = self.object(overlay, &field)?;
                        let tool = match overlay.get("tool") {
                            Some(value) => self.optional_string(value, &format!("{field}.tool"))?,
                            None => None,
                        };
                        let lists = self.list_fields(overlay, &field, &["tool"])?;
                        fields.repos.insert(name.clone(), RepoFields { tool, lists });
                    }
                }
                key if LIST_KEYS.contains(&key) => {}
                other => self.ignore_unknown(other),
            }
        }

        fields.lists = self.list_fields(object, "", &["backend", "tool", "tools", "repos"])?;
        Ok(fields)
    }

    /// Decode the list keys of `object`, warning about anything that is
    /// neither a list key nor listed in `also_known`.
    fn list_fields(
        &self,
        object: &Map<String, Value>,
        prefix: &str,
        also_known: &[&str],
    ) -> Result<ListFields, ConfigError> {
        let mut lists = ListFields::default();
        for (key, value) in object {
            let field = if prefix.is_empty() {
                key.clone()
            } else {
                format!("{prefix}.{key}")
            };
            let slot = match key.as_str() {
                "mounts_ro" => &mut lists.mounts_ro,
                "mounts_rw" => &mut lists.mounts_rw,
                "env" => &mut lists.env,
                "pre_run_hooks" => &mut lists.pre_run_hooks,
                "post_build_hooks" => &mut lists.post_build_hooks,
                key if also_known.contains(&key) => continue,
                _ => {
                    // The top level reports its own unknown keys.
                    if !prefix.is_empty() {
                        self.ignore_unknown(&field);
                    }
                    continue;
                }
            };
            *slot = self.string_list(value, &field)?;
        }
        Ok(lists)
    }

    fn backend(&self, value: &Value) -> Result<Option<Backend>, ConfigError> {
        let Some(name) = self.optional_string(value, "backend")? else {
            return Ok(None);
        };
        name.parse()
            .map(Some)
            .map_err(|_| ConfigError::InvalidBackend {
                path: self.path.to_path_buf(),
                value: name,
            })
    }

    /// A string scalar where `null` and `""` both mean "not set".
    fn optional_string(&self, value: &Value, field: &str) -> Result<Option<String>, ConfigError> {
        match value {
            Value::Null => Ok(None),
            Value::String(s) if s.is_empty() => Ok(None),
            Value::String(s) => Ok(Some(s.clone())),
            _ => Err(self.invalid(field, "a string or null")),
        }
    }

    fn string_list(&self, value: &Value, field: &str) -> Result<Vec<String>, ConfigError> {
        let Value::Array(items) = value else {
            return Err(self.invalid(field, "an array of strings"));
        };
        items
            .iter()
            .enumerate()
            .map(|(idx, item)| match item {
                Value::String(s) => Ok(s.clone()),
                _ => Err(self.invalid(&format!("{field}[{idx}]"), "a string")),
            })
            .collect()
    }

    fn object<'v>(&self, value: &'v Value, field: &str) -> Result<&'v Map<String, Value>, ConfigError> {
        value.as_object().ok_or_else(|| self.invalid(field, "an object"))
    }

    fn invalid(&self, field: &str, expected: &'static str) -> ConfigError {
        ConfigError::InvalidFieldValue {
            path: self.path.to_path_buf(),
            field: field.to_string(),
            expected,
        }
    }

    fn ignore_unknown(&self, key: &str) {
        warn!(
            event = "core.config.unknown_key_ignored",
            path = %self.path.display(),
            key = key
        );
    }
}
