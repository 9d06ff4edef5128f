//! Structured-format writers.
//!
//! A [`LoaderFactory`] turns a document node into the bytes of a YAML, JSON or TOML
//! file. Writers prune `null` mapping entries first, so an absent optional field is
//! never written as `null`/`~`, then write the file atomically.

use std::fmt;
use std::fs;
use std::io::Write;
use std::path::Path;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tempfile::NamedTempFile;
use tracing::debug;

use crate::error::{FactoryResult, SerializationError};

/// Layout of a YAML document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NodeStyle {
    /// Indented, one entry per line.
    #[default]
    Block,
    /// A single-line flow mapping.
    Flow,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct YamlOptions {
    pub node_style: NodeStyle,
    pub header: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JsonOptions {
    pub indent: usize,
}

impl Default for JsonOptions {
    fn default() -> Self {
        Self { indent: 2 }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TomlOptions {
    pub header: Option<String>,
}

/// Format selector used by the build description.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum Format {
    #[default]
    Yaml,
    Json,
    Toml,
}

/// A configured writer for one structured format.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoaderFactory {
    Yaml(YamlOptions),
    Json(JsonOptions),
    Toml(TomlOptions),
}

impl Default for LoaderFactory {
    fn default() -> Self {
        Self::Yaml(YamlOptions::default())
    }
}

impl From<Format> for LoaderFactory {
    fn from(format: Format) -> Self {
        match format {
            Format::Yaml => Self::yaml(),
            Format::Json => Self::json(),
            Format::Toml => Self::toml(),
        }
    }
}

impl LoaderFactory {
    pub fn yaml() -> Self {
        Self::yaml_with(|_| {})
    }

    pub fn json() -> Self {
        Self::json_with(|_| {})
    }

    pub fn toml() -> Self {
        Self::toml_with(|_| {})
    }

    /// YAML writer with customized options.
    pub fn yaml_with(configure: impl FnOnce(&mut YamlOptions)) -> Self {
        let mut options = YamlOptions::default();
        configure(&mut options);
        Self::Yaml(options)
    }

    pub fn json_with(configure: impl FnOnce(&mut JsonOptions)) -> Self {
        let mut options = JsonOptions::default();
        configure(&mut options);
        Self::Json(options)
    }

    pub fn toml_with(configure: impl FnOnce(&mut TomlOptions)) -> Self {
        let mut options = TomlOptions::default();
        configure(&mut options);
        Self::Toml(options)
    }

    pub fn format(&self) -> Format {
        match self {
            Self::Yaml(_) => Format::Yaml,
            Self::Json(_) => Format::Json,
            Self::Toml(_) => Format::Toml,
        }
    }

    /// Render `node` to text in this format.
    pub fn render(&self, node: &Value) -> FactoryResult<String> {
        let node = prune_nulls(node.clone());
        let text = match self {
            Self::Yaml(options) => {
                let body = match options.node_style {
                    NodeStyle::Block => serde_yaml::to_string(&node).map_err(SerializationError::from)?,
                    NodeStyle::Flow => format!("{}\n", serde_json::to_string(&node)?),
                };
                with_header(options.header.as_deref(), body)
            }
            Self::Json(options) => {
                let indent = " ".repeat(options.indent);
                let formatter = serde_json::ser::PrettyFormatter::with_indent(indent.as_bytes());
                let mut buf = Vec::new();
                let mut serializer = serde_json::Serializer::with_formatter(&mut buf, formatter);
                node.serialize(&mut serializer)?;
                buf.push(b'\n');
                String::from_utf8_lossy(&buf).into_owned()
            }
            Self::Toml(options) => {
                let body = toml::to_string(&node).map_err(SerializationError::from)?;
                with_header(options.header.as_deref(), body)
            }
        };
        Ok(text)
    }

    /// Render `node` and write it to `path`, creating parent directories.
    pub fn write(&self, node: &Value, path: &Path) -> FactoryResult<()> {
        let text = self.render(node)?;
        write_atomic(path, &text)?;
        debug!(path = %path.display(), format = %self.format(), "wrote file");
        Ok(())
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Yaml => "yaml",
            Self::Json => "json",
            Self::Toml => "toml",
        })
    }
}

fn with_header(header: Option<&str>, body: String) -> String {
    match header {
        Some(header) => {
            let mut out = String::new();
            for line in header.lines() {
                out.push_str("# ");
                out.push_str(line);
                out.push('\n');
            }
            out.push('\n');
            out.push_str(&body);
            out
        }
        None => body,
    }
}

/// Remove `null` entries from every mapping in `node`.
pub fn prune_nulls(node: Value) -> Value {
    match node {
        Value::Object(map) => Value::Object(
            map.into_iter()
                .filter(|(_, v)| !v.is_null())
                .map(|(k, v)| (k, prune_nulls(v)))
                .collect(),
        ),
        Value::Array(items) => Value::Array(items.into_iter().map(prune_nulls).collect()),
        other => other,
    }
}

/// Deep-merge `overlay` into `base`. Tables merge recursively, anything else in
/// `overlay` replaces the entry in `base`.
pub fn merge(base: &mut Map<String, Value>, overlay: Map<String, Value>) {
    for (key, value) in overlay {
        match (base.get_mut(&key), value) {
            (Some(Value::Object(existing)), Value::Object(incoming)) => merge(existing, incoming),
            (_, value) => {
                base.insert(key, value);
            }
        }
    }
}

/// Write `contents` to `path` through a temporary file in the same directory.
pub fn write_atomic(path: &Path, contents: &str) -> std::io::Result<()> {
    let parent = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    fs::create_dir_all(parent)?;
    let mut file = NamedTempFile::new_in(parent)?;
    file.write_all(contents.as_bytes())?;
    file.persist(path).map_err(|e| e.error)?;
    Ok(())
}
