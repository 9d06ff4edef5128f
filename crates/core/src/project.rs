//! Project metadata conventions.
//!
//! Manifests default their name, version and description from the project being
//! built. Models are constructed without those defaults and receive them in a
//! second phase, right before their first read, so anything the user configured
//! explicitly always wins.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use resource_factory_api::{
    FactoryResult, LoaderFactory, ResourceFactory, ResourceFactoryProvider, SimpleFactory,
    ValueProvider,
};

use crate::manifests::Manifest;

/// Ambient metadata of the project a manifest describes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ProjectMeta {
    pub name: String,
    pub version: Option<String>,
    pub description: Option<String>,
}

impl ProjectMeta {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = Some(version.into());
        self
    }

    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

/// Implemented by models that take defaults from [`ProjectMeta`].
pub trait ProjectMetaConventions {
    /// Fill every still-unset conventional field from `meta`.
    fn set_conventions_from_project_meta(&mut self, meta: &ProjectMeta);
}

/// Set `field` to `value` unless it already holds something.
pub(crate) fn convention(field: &mut Option<String>, value: Option<&String>) {
    if field.is_none() {
        *field = value.cloned();
    }
}

/// A manifest bound to the project metadata its defaults come from.
///
/// Conventions are applied to a copy of the model each time the document is
/// rendered, never to the configured model itself.
#[derive(Debug, Clone)]
pub struct Conventional<M> {
    model: M,
    meta: Option<ProjectMeta>,
}

impl<M: Manifest> Conventional<M> {
    pub fn new(model: M, meta: Option<ProjectMeta>) -> Self {
        Self { model, meta }
    }

    pub fn model(&self) -> &M {
        &self.model
    }

    /// The model with conventions applied.
    pub fn resolved(&self) -> M {
        let mut model = self.model.clone();
        if let Some(meta) = &self.meta {
            model.set_conventions_from_project_meta(meta);
        }
        model
    }
}

impl<M: Manifest> ValueProvider for Conventional<M> {
    fn as_config_serializable(&self) -> FactoryResult<Value> {
        self.resolved().project()
    }

    fn describe(&self) -> String {
        self.resolved().describe()
    }
}

impl<M: Manifest> ResourceFactoryProvider for Conventional<M> {
    fn resource_factory(self) -> Box<dyn ResourceFactory> {
        let loader: LoaderFactory = M::loader();
        Box::new(SimpleFactory::new(M::FILE_NAME, loader, self))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn convention_only_fills_unset_fields() {
        let mut explicit = Some("mine".to_string());
        convention(&mut explicit, Some(&"project".to_string()));
        assert_eq!(explicit.as_deref(), Some("mine"));

        let mut unset = None;
        convention(&mut unset, Some(&"project".to_string()));
        assert_eq!(unset.as_deref(), Some("project"));

        let mut still_unset: Option<String> = None;
        convention(&mut still_unset, None);
        assert_eq!(still_unset, None);
    }

    #[test]
    fn project_meta_reads_from_yaml() {
        let meta: ProjectMeta =
            serde_yaml::from_str("name: test\nversion: '1.0'\ndescription: A test\n").unwrap();
        assert_eq!(
            meta,
            ProjectMeta::new("test")
                .with_version("1.0")
                .with_description("A test")
        );
    }
}
