//! BungeeCord `bungee.yml`.

use std::collections::BTreeSet;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use resource_factory_api::validate::{require, validate_required};
use resource_factory_api::{validate_all, FactoryResult, LoaderFactory, NullIfEmpty};

use super::bukkit::PLUGIN_NAME;
use super::{describe_named, to_node, Manifest};
use crate::project::{convention, ProjectMeta, ProjectMetaConventions};

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields, default)]
pub struct BungeeCordPluginYaml {
    pub name: Option<String>,
    pub main: Option<String>,
    pub version: Option<String>,
    pub description: Option<String>,
    pub author: Option<String>,
    pub depends: BTreeSet<String>,
    pub soft_depends: BTreeSet<String>,
}

impl ProjectMetaConventions for BungeeCordPluginYaml {
    fn set_conventions_from_project_meta(&mut self, meta: &ProjectMeta) {
        convention(&mut self.name, Some(&meta.name));
        convention(&mut self.version, meta.version.as_ref());
        convention(&mut self.description, meta.description.as_ref());
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct Serializable {
    name: String,
    main: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    version: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    author: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    depends: Option<BTreeSet<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    soft_depends: Option<BTreeSet<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    description: Option<String>,
}

impl Manifest for BungeeCordPluginYaml {
    const FILE_NAME: &'static str = "bungee.yml";

    fn loader() -> LoaderFactory {
        LoaderFactory::yaml()
    }

    fn project(&self) -> FactoryResult<Value> {
        validate_all(&self.depends, &PLUGIN_NAME, "BungeeCord plugin name (of dependency)")?;
        validate_all(
            &self.soft_depends,
            &PLUGIN_NAME,
            "BungeeCord plugin name (of soft dependency)",
        )?;
        to_node(&Serializable {
            name: validate_required(
                self.name.as_deref(),
                &PLUGIN_NAME,
                "name",
                "BungeeCord plugin name",
            )?,
            main: require(&self.main, "main")?,
            version: self.version.clone(),
            author: self.author.clone(),
            depends: self.depends.null_if_empty(),
            soft_depends: self.soft_depends.null_if_empty(),
            description: self.description.clone(),
        })
    }

    fn describe(&self) -> String {
        describe_named("BungeeCordPluginYaml", self.name.as_deref())
    }
}
