//! Resource factory abstractions.
//!
//! The hierarchy is three layers deep, each layer a blanket implementation of the
//! one above it:
//!
//! - [`ResourceFactory`]: anything that can generate output into a directory.
//! - [`SingleFileResourceFactory`]: generates exactly one file at a relative path and
//!   enforces the [`DuplicatesMode`] collision policy.
//! - [`NodeResourceFactory`]: builds a document node and hands it to a
//!   [`LoaderFactory`] writer.
//!
//! [`SimpleFactory`] is the general-purpose node factory: a path, a format and a
//! [`ValueProvider`].

use std::fmt;
use std::path::{Path, PathBuf};

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, warn};

use crate::error::{FactoryError, FactoryResult, ValidationError};
use crate::format::{JsonOptions, LoaderFactory, TomlOptions, YamlOptions};
use crate::value::ValueProvider;

/// A unit of work that writes output into a directory.
pub trait ResourceFactory: fmt::Display + fmt::Debug + Send + Sync {
    /// Generate output under `output_dir`.
    fn generate(&self, output_dir: &Path) -> FactoryResult<()>;
}

/// A value that knows which factory renders it.
pub trait ResourceFactoryProvider {
    /// Bind this value to its canonical path and format.
    fn resource_factory(self) -> Box<dyn ResourceFactory>;
}

/// What a single-file factory does when its target file already exists.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, JsonSchema,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DuplicatesMode {
    /// Overwrite the existing file.
    Ignore,
    /// Fail with [`FactoryError::PathCollision`].
    #[default]
    Fail,
}

/// A factory producing exactly one file.
pub trait SingleFileResourceFactory: fmt::Display + fmt::Debug + Send + Sync {
    /// Path of the output file relative to the output directory.
    fn path(&self) -> Option<&Path>;

    fn duplicates_mode(&self) -> DuplicatesMode {
        DuplicatesMode::Fail
    }

    /// Create or overwrite `output_file`.
    fn generate_file(&self, output_file: &Path) -> FactoryResult<()>;
}

impl<T: SingleFileResourceFactory> ResourceFactory for T {
    fn generate(&self, output_dir: &Path) -> FactoryResult<()> {
        let path = self.path().ok_or_else(|| ValidationError::missing("path"))?;
        let output_file = output_dir.join(path);
        if output_file.exists() {
            match self.duplicates_mode() {
                DuplicatesMode::Fail => {
                    return Err(FactoryError::PathCollision { path: output_file });
                }
                DuplicatesMode::Ignore => {
                    warn!(path = %output_file.display(), "overwriting existing file");
                }
            }
        }
        debug!(factory = %self, "generating");
        self.generate_file(&output_file)
    }
}

/// A single-file factory that renders a document node through a format writer.
pub trait NodeResourceFactory: fmt::Display + fmt::Debug + Send + Sync {
    fn path(&self) -> Option<&Path>;

    fn duplicates_mode(&self) -> DuplicatesMode;

    fn loader(&self) -> &LoaderFactory;

    /// Build the root node. Validation errors surface here unwrapped.
    fn root_node(&self) -> FactoryResult<Value>;
}

impl<T: NodeResourceFactory> SingleFileResourceFactory for T {
    fn path(&self) -> Option<&Path> {
        NodeResourceFactory::path(self)
    }

    fn duplicates_mode(&self) -> DuplicatesMode {
        NodeResourceFactory::duplicates_mode(self)
    }

    fn generate_file(&self, output_file: &Path) -> FactoryResult<()> {
        let node = self.root_node()?;
        self.loader().write(&node, output_file)
    }
}

/// General-purpose factory writing one value to one file.
///
/// ```rust
/// use resource_factory_api::factory::{ResourceFactory, SimpleFactory};
/// use resource_factory_api::value::ConstantValueProvider;
///
/// let mut factory = SimpleFactory::default();
/// factory
///     .set_path("config/defaults.json")
///     .json()
///     .set_value(ConstantValueProvider(serde_json::json!({"enabled": true})));
///
/// let dir = tempfile::tempdir().unwrap();
/// factory.generate(dir.path()).unwrap();
/// assert!(dir.path().join("config/defaults.json").exists());
/// ```
#[derive(Default)]
pub struct SimpleFactory {
    path: Option<PathBuf>,
    duplicates_mode: DuplicatesMode,
    loader: LoaderFactory,
    value: Option<Box<dyn ValueProvider>>,
}

impl SimpleFactory {
    pub fn new(
        path: impl Into<PathBuf>,
        loader: LoaderFactory,
        value: impl ValueProvider + 'static,
    ) -> Self {
        Self {
            path: Some(path.into()),
            duplicates_mode: DuplicatesMode::default(),
            loader,
            value: Some(Box::new(value)),
        }
    }

    pub fn set_path(&mut self, path: impl Into<PathBuf>) -> &mut Self {
        self.path = Some(path.into());
        self
    }

    pub fn set_duplicates_mode(&mut self, mode: DuplicatesMode) -> &mut Self {
        self.duplicates_mode = mode;
        self
    }

    pub fn set_loader(&mut self, loader: LoaderFactory) -> &mut Self {
        self.loader = loader;
        self
    }

    pub fn set_value(&mut self, value: impl ValueProvider + 'static) -> &mut Self {
        self.value = Some(Box::new(value));
        self
    }

    pub fn yaml(&mut self) -> &mut Self {
        self.set_loader(LoaderFactory::yaml())
    }

    pub fn yaml_with(&mut self, configure: impl FnOnce(&mut YamlOptions)) -> &mut Self {
        self.set_loader(LoaderFactory::yaml_with(configure))
    }

    pub fn json(&mut self) -> &mut Self {
        self.set_loader(LoaderFactory::json())
    }

    pub fn json_with(&mut self, configure: impl FnOnce(&mut JsonOptions)) -> &mut Self {
        self.set_loader(LoaderFactory::json_with(configure))
    }

    pub fn toml(&mut self) -> &mut Self {
        self.set_loader(LoaderFactory::toml())
    }

    pub fn toml_with(&mut self, configure: impl FnOnce(&mut TomlOptions)) -> &mut Self {
        self.set_loader(LoaderFactory::toml_with(configure))
    }
}

impl<P, V> From<(P, V)> for SimpleFactory
where
    P: Into<PathBuf>,
    V: ValueProvider + 'static,
{
    fn from((path, value): (P, V)) -> Self {
        Self::new(path, LoaderFactory::default(), value)
    }
}

impl NodeResourceFactory for SimpleFactory {
    fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    fn duplicates_mode(&self) -> DuplicatesMode {
        self.duplicates_mode
    }

    fn loader(&self) -> &LoaderFactory {
        &self.loader
    }

    fn root_node(&self) -> FactoryResult<Value> {
        match &self.value {
            Some(value) => value.as_config_serializable(),
            None => Err(ValidationError::missing("value").into()),
        }
    }
}

impl fmt::Display for SimpleFactory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let path = self
            .path
            .as_deref()
            .map_or_else(|| "<unset>".to_string(), |p| p.display().to_string());
        let value = self
            .value
            .as_ref()
            .map_or_else(|| "<unset>".to_string(), |v| v.describe());
        write!(
            f,
            "SimpleResourceFactory(path={}, format={}, value={})",
            path,
            self.loader.format(),
            value
        )
    }
}

impl fmt::Debug for SimpleFactory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SimpleFactory")
            .field("path", &self.path)
            .field("duplicates_mode", &self.duplicates_mode)
            .field("loader", &self.loader)
            .field("value", &self.value.as_ref().map(|v| v.describe()))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::ConstantValueProvider;
    use serde_json::json;
    use std::fs;

    #[derive(Debug)]
    struct TextFactory(&'static str);

    impl fmt::Display for TextFactory {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            write!(f, "TextFactory({})", self.0)
        }
    }

    impl SingleFileResourceFactory for TextFactory {
        fn path(&self) -> Option<&Path> {
            Some(Path::new("notes.txt"))
        }

        fn generate_file(&self, output_file: &Path) -> FactoryResult<()> {
            fs::write(output_file, self.0)?;
            Ok(())
        }
    }

    fn yaml_factory(value: Value) -> SimpleFactory {
        SimpleFactory::new("x.yml", LoaderFactory::yaml(), ConstantValueProvider(value))
    }

    #[test]
    fn writes_value_through_loader() {
        let dir = tempfile::tempdir().unwrap();
        yaml_factory(json!({"a": "b"})).generate(dir.path()).unwrap();
        assert_eq!(fs::read_to_string(dir.path().join("x.yml")).unwrap(), "a: b\n");
    }

    #[test]
    fn existing_file_fails_by_default() {
        let dir = tempfile::tempdir().unwrap();
        yaml_factory(json!({"a": 1})).generate(dir.path()).unwrap();
        let err = yaml_factory(json!({"a": 2})).generate(dir.path()).unwrap_err();
        assert!(matches!(err, FactoryError::PathCollision { ref path } if path.ends_with("x.yml")));
        assert!(err.to_string().contains("did another factory create it?"));
    }

    #[test]
    fn ignore_mode_overwrites() {
        let dir = tempfile::tempdir().unwrap();
        yaml_factory(json!({"a": 1})).generate(dir.path()).unwrap();
        let mut second = yaml_factory(json!({"a": 2}));
        second.set_duplicates_mode(DuplicatesMode::Ignore);
        second.generate(dir.path()).unwrap();
        assert_eq!(fs::read_to_string(dir.path().join("x.yml")).unwrap(), "a: 2\n");
    }

    #[test]
    fn missing_path_is_a_validation_error() {
        let dir = tempfile::tempdir().unwrap();
        let mut factory = SimpleFactory::default();
        factory.set_value(ConstantValueProvider(json!({})));
        let err = factory.generate(dir.path()).unwrap_err();
        assert!(matches!(
            err,
            FactoryError::Validation(ValidationError::MissingField { .. })
        ));
    }

    #[test]
    fn plain_single_file_factories_get_collision_checks() {
        let dir = tempfile::tempdir().unwrap();
        TextFactory("one").generate(dir.path()).unwrap();
        assert!(TextFactory("two").generate(dir.path()).is_err());
        assert_eq!(fs::read_to_string(dir.path().join("notes.txt")).unwrap(), "one");
    }

    #[test]
    fn display_names_path_format_and_value() {
        let mut factory = SimpleFactory::from(("data/a.json", ConstantValueProvider(json!([1]))));
        factory.json();
        assert_eq!(
            factory.to_string(),
            "SimpleResourceFactory(path=data/a.json, format=json, value=[1])"
        );
    }

    #[test]
    fn duplicates_mode_reads_upper_case() {
        let mode: DuplicatesMode = serde_yaml::from_str("IGNORE").unwrap();
        assert_eq!(mode, DuplicatesMode::Ignore);
    }
}
