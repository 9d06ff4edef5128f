//! Paper `paper-plugin.yml`.

use std::collections::BTreeMap;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use resource_factory_api::validate::{require, validate_opt, validate_required};
use resource_factory_api::{
    validate_all, FactoryResult, LoaderFactory, NullIfEmpty, Pattern, WriteOnly,
};

use super::bukkit::PLUGIN_NAME;
use super::permission::{serializable_permissions, Permission, PermissionDefault, SerializablePermission};
use super::{describe_named, to_node, Manifest};
use crate::project::{convention, ProjectMeta, ProjectMetaConventions};

static PLUGIN_CLASS: Pattern = Pattern::excluding_prefix(
    r"^([a-zA-Z_$][a-zA-Z\d_$]*\.)*[a-zA-Z_$][a-zA-Z\d_$]*$",
    "io.papermc.",
);

/// When a dependency loads relative to the declaring plugin.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Load {
    #[serde(alias = "before")]
    Before,
    #[serde(alias = "after")]
    After,
    #[default]
    #[serde(alias = "omit")]
    Omit,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields, default)]
pub struct Dependency {
    pub load: Load,
    pub required: bool,
    pub join_classpath: bool,
}

impl Default for Dependency {
    fn default() -> Self {
        Self {
            load: Load::Omit,
            required: true,
            join_classpath: true,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields, default)]
pub struct Dependencies {
    pub bootstrap: BTreeMap<String, Dependency>,
    pub server: BTreeMap<String, Dependency>,
}

impl Dependencies {
    /// Register or update a bootstrap dependency.
    pub fn bootstrap(&mut self, name: &str) -> &mut Dependency {
        self.bootstrap.entry(name.to_string()).or_default()
    }

    /// Register or update a server dependency.
    pub fn server(&mut self, name: &str) -> &mut Dependency {
        self.server.entry(name.to_string()).or_default()
    }
}

/// A Paper `paper-plugin.yml` configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields, default)]
pub struct PaperPluginYaml {
    pub api_version: Option<String>,
    pub name: Option<String>,
    pub version: Option<String>,
    pub main: Option<String>,
    pub loader: Option<String>,
    pub bootstrapper: Option<String>,
    pub description: Option<String>,
    pub author: Option<String>,
    pub authors: Vec<String>,
    pub website: Option<String>,
    pub prefix: Option<String>,
    pub default_permission: Option<PermissionDefault>,
    pub folia_supported: Option<bool>,
    pub dependencies: Dependencies,
    pub permissions: BTreeMap<String, Permission>,
}

impl PaperPluginYaml {
    pub fn dependencies(&mut self, configure: impl FnOnce(&mut Dependencies)) -> &mut Self {
        configure(&mut self.dependencies);
        self
    }

    pub fn permission(&mut self, name: &str, configure: impl FnOnce(&mut Permission)) -> &mut Self {
        configure(self.permissions.entry(name.to_string()).or_default());
        self
    }
}

impl ProjectMetaConventions for PaperPluginYaml {
    fn set_conventions_from_project_meta(&mut self, meta: &ProjectMeta) {
        convention(&mut self.name, Some(&meta.name));
        convention(&mut self.version, meta.version.as_ref());
        convention(&mut self.description, meta.description.as_ref());
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "kebab-case")]
struct SerializableDependency {
    load: Load,
    required: bool,
    join_classpath: bool,
}

#[derive(Debug, Serialize)]
struct SerializableDependencies {
    #[serde(skip_serializing_if = "Option::is_none")]
    bootstrap: Option<BTreeMap<String, SerializableDependency>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    server: Option<BTreeMap<String, SerializableDependency>>,
}

impl SerializableDependencies {
    fn new(dependencies: &Dependencies) -> FactoryResult<Option<Self>> {
        validate_all(
            dependencies.bootstrap.keys(),
            &PLUGIN_NAME,
            "Paper plugin name (of bootstrap dependency)",
        )?;
        validate_all(
            dependencies.server.keys(),
            &PLUGIN_NAME,
            "Paper plugin name (of server dependency)",
        )?;

        let project = |deps: &BTreeMap<String, Dependency>| {
            deps.null_if_empty().map(|deps| {
                deps.iter()
                    .map(|(name, dep)| {
                        let dep = SerializableDependency {
                            load: dep.load,
                            required: dep.required,
                            join_classpath: dep.join_classpath,
                        };
                        (name.clone(), dep)
                    })
                    .collect::<BTreeMap<_, _>>()
            })
        };
        let bootstrap = project(&dependencies.bootstrap);
        let server = project(&dependencies.server);
        if bootstrap.is_none() && server.is_none() {
            return Ok(None);
        }
        Ok(Some(Self { bootstrap, server }))
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "kebab-case")]
struct Serializable {
    api_version: String,
    name: String,
    version: String,
    main: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    loader: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    bootstrapper: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    author: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    authors: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    website: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    prefix: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    default_permission: Option<WriteOnly<PermissionDefault>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    folia_supported: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    dependencies: Option<SerializableDependencies>,
    #[serde(skip_serializing_if = "Option::is_none")]
    permissions: Option<BTreeMap<String, SerializablePermission>>,
}

impl Serializable {
    fn new(yaml: &PaperPluginYaml) -> FactoryResult<Self> {
        Ok(Self {
            api_version: require(&yaml.api_version, "apiVersion")?,
            name: validate_required(yaml.name.as_deref(), &PLUGIN_NAME, "name", "Paper plugin name")?,
            version: require(&yaml.version, "version")?,
            main: validate_required(
                yaml.main.as_deref(),
                &PLUGIN_CLASS,
                "main",
                "Paper plugin main class name",
            )?,
            loader: validate_opt(
                yaml.loader.as_deref(),
                &PLUGIN_CLASS,
                "Paper plugin loader class name",
            )?,
            bootstrapper: validate_opt(
                yaml.bootstrapper.as_deref(),
                &PLUGIN_CLASS,
                "Paper plugin bootstrapper class name",
            )?,
            description: yaml.description.clone(),
            author: yaml.author.clone(),
            authors: yaml.authors.null_if_empty(),
            website: yaml.website.clone(),
            prefix: yaml.prefix.clone(),
            default_permission: WriteOnly::from_opt(&yaml.default_permission),
            folia_supported: yaml.folia_supported,
            dependencies: SerializableDependencies::new(&yaml.dependencies)?,
            permissions: serializable_permissions(&yaml.permissions),
        })
    }
}

impl Manifest for PaperPluginYaml {
    const FILE_NAME: &'static str = "paper-plugin.yml";

    fn loader() -> LoaderFactory {
        LoaderFactory::yaml()
    }

    fn project(&self) -> FactoryResult<Value> {
        to_node(&Serializable::new(self)?)
    }

    fn describe(&self) -> String {
        describe_named("PaperPluginYaml", self.name.as_deref())
    }
}
