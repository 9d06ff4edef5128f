//! NeoForge `META-INF/neoforge.mods.toml`.
//!
//! Mods are keyed by mod id and written as an array of tables in id order. Each
//! mod's dependencies are collected into the root `dependencies` table. `custom`
//! entries, on the root and on each mod, are merged into the enclosing table before
//! its declared fields, so a declared field always wins over a custom one.

use std::collections::BTreeMap;

use schemars::JsonSchema;
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

use resource_factory_api::format::merge;
use resource_factory_api::validate::{require, validate, validate_opt};
use resource_factory_api::{
    CustomValue, CustomValues, FactoryResult, LoaderFactory, NullIfEmpty, Pattern,
    ValidationError,
};

use super::{to_node, Manifest};
use crate::project::{convention, ProjectMeta, ProjectMetaConventions};

static MOD_ID: Pattern = Pattern::new(r"^[a-z0-9_]{2,64}$");
static NAMESPACE: Pattern = Pattern::new(r"^[a-z0-9_.-]{2,64}$");

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all(serialize = "lowercase", deserialize = "SCREAMING_SNAKE_CASE"))]
pub enum DependencyType {
    #[serde(alias = "required")]
    Required,
    #[serde(alias = "optional")]
    Optional,
    #[serde(alias = "incompatible")]
    Incompatible,
    #[serde(alias = "discouraged")]
    Discouraged,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DependencyOrdering {
    #[serde(alias = "before")]
    Before,
    #[serde(alias = "after")]
    After,
    #[serde(alias = "none")]
    None,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DependencySide {
    #[serde(alias = "client")]
    Client,
    #[serde(alias = "server")]
    Server,
    #[serde(alias = "both")]
    Both,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields, default)]
pub struct Dependency {
    pub mod_id: String,
    #[serde(rename = "type")]
    pub kind: Option<DependencyType>,
    pub reason: Option<String>,
    pub version_range: Option<String>,
    pub ordering: Option<DependencyOrdering>,
    pub side: Option<DependencySide>,
    pub referral_url: Option<String>,
}

impl Dependency {
    pub fn before(&mut self) -> &mut Self {
        self.ordering = Some(DependencyOrdering::Before);
        self
    }

    pub fn after(&mut self) -> &mut Self {
        self.ordering = Some(DependencyOrdering::After);
        self
    }

    pub fn client(&mut self) -> &mut Self {
        self.side = Some(DependencySide::Client);
        self
    }

    pub fn server(&mut self) -> &mut Self {
        self.side = Some(DependencySide::Server);
        self
    }
}

#[derive(Debug, Clone, Default, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields, default)]
pub struct Mod {
    pub namespace: Option<String>,
    pub version: Option<String>,
    pub display_name: Option<String>,
    pub description: Option<String>,
    pub logo_file: Option<String>,
    pub logo_blur: Option<bool>,
    pub update_json_url: Option<String>,
    pub features: BTreeMap<String, String>,
    #[schemars(with = "BTreeMap<String, Value>")]
    pub mod_properties: CustomValues,
    #[schemars(with = "BTreeMap<String, Value>")]
    pub custom: CustomValues,
    pub mod_url: Option<String>,
    pub credits: Option<String>,
    pub authors: Option<String>,
    pub display_url: Option<String>,
    pub enum_extensions: Option<String>,
    pub feature_flags: Option<String>,
    pub dependencies: Vec<Dependency>,
}

impl Mod {
    /// Add a dependency of the given type and configure it.
    pub fn dependency(
        &mut self,
        kind: DependencyType,
        mod_id: &str,
        version_range: Option<&str>,
        configure: impl FnOnce(&mut Dependency),
    ) -> &mut Self {
        let mut dependency = Dependency {
            mod_id: mod_id.to_string(),
            kind: Some(kind),
            version_range: version_range.map(str::to_string),
            ..Dependency::default()
        };
        configure(&mut dependency);
        self.dependencies.push(dependency);
        self
    }

    pub fn required(&mut self, mod_id: &str, version_range: Option<&str>) -> &mut Self {
        self.dependency(DependencyType::Required, mod_id, version_range, |_| {})
    }

    pub fn optional(&mut self, mod_id: &str, version_range: Option<&str>) -> &mut Self {
        self.dependency(DependencyType::Optional, mod_id, version_range, |_| {})
    }

    pub fn incompatible(&mut self, mod_id: &str, version_range: Option<&str>) -> &mut Self {
        self.dependency(DependencyType::Incompatible, mod_id, version_range, |_| {})
    }

    pub fn discouraged(&mut self, mod_id: &str, version_range: Option<&str>) -> &mut Self {
        self.dependency(DependencyType::Discouraged, mod_id, version_range, |_| {})
    }

    pub fn mod_property(&mut self, key: &str, value: CustomValue) -> &mut Self {
        self.mod_properties.insert(key, value);
        self
    }

    pub fn custom(&mut self, key: &str, value: CustomValue) -> &mut Self {
        self.custom.insert(key, value);
        self
    }
}

impl ProjectMetaConventions for Mod {
    fn set_conventions_from_project_meta(&mut self, meta: &ProjectMeta) {
        convention(&mut self.display_name, Some(&meta.name));
        convention(&mut self.version, meta.version.as_ref());
        convention(&mut self.description, meta.description.as_ref());
    }
}

/// A mod whose id and display metadata default from the project.
#[derive(Debug, Clone, Default, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ConventionMod {
    pub id: Option<String>,
    #[serde(flatten)]
    pub config: Mod,
}

/// `id` next to the fields of [`Mod`], which keep rejecting unknown keys.
impl<'de> Deserialize<'de> for ConventionMod {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let mut fields = Map::<String, Value>::deserialize(deserializer)?;
        let id = match fields.remove("id") {
            None | Some(Value::Null) => None,
            Some(Value::String(id)) => Some(id),
            Some(other) => {
                return Err(D::Error::custom(format!(
                    "invalid conventionMod id {other}, expected a string"
                )))
            }
        };
        let config = Mod::deserialize(Value::Object(fields)).map_err(D::Error::custom)?;
        Ok(Self { id, config })
    }
}

/// Derive a mod id from a project name: lower-cased, with `-`, ` ` and `.` as `_`.
pub fn mod_id_from_project_name(name: &str) -> String {
    name.to_lowercase().replace(['-', ' ', '.'], "_")
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct AccessTransformer {
    pub file: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct Mixin {
    pub config: String,
}

/// A NeoForge `neoforge.mods.toml` configuration.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields, default)]
pub struct NeoForgeModsToml {
    pub mod_loader: String,
    pub loader_version: String,
    pub license: Option<String>,
    pub show_as_resource_pack: Option<bool>,
    pub show_as_data_pack: Option<bool>,
    pub services: Vec<String>,
    pub issue_tracker_url: Option<String>,
    pub mods: BTreeMap<String, Mod>,
    pub convention_mod: Option<ConventionMod>,
    pub access_transformers: Vec<AccessTransformer>,
    pub mixins: Vec<Mixin>,
    #[schemars(with = "BTreeMap<String, Value>")]
    pub custom: CustomValues,
}

impl Default for NeoForgeModsToml {
    fn default() -> Self {
        Self {
            mod_loader: "javafml".to_string(),
            loader_version: "[1,)".to_string(),
            license: None,
            show_as_resource_pack: None,
            show_as_data_pack: None,
            services: Vec::new(),
            issue_tracker_url: None,
            mods: BTreeMap::new(),
            convention_mod: None,
            access_transformers: Vec::new(),
            mixins: Vec::new(),
            custom: CustomValues::default(),
        }
    }
}

impl NeoForgeModsToml {
    pub fn apache2_license(&mut self) -> &mut Self {
        self.license = Some("Apache-2.0".to_string());
        self
    }

    pub fn mit_license(&mut self) -> &mut Self {
        self.license = Some("MIT".to_string());
        self
    }

    /// Register or update the mod `id`.
    pub fn add_mod(&mut self, id: &str, configure: impl FnOnce(&mut Mod)) -> &mut Self {
        configure(self.mods.entry(id.to_string()).or_default());
        self
    }

    /// Declare the project's own mod.
    ///
    /// Without an explicit `id`, the id is derived from the project name when
    /// conventions are applied.
    pub fn convention_mod(&mut self, id: Option<&str>, configure: impl FnOnce(&mut Mod)) -> &mut Self {
        let convention_mod = self.convention_mod.get_or_insert_with(ConventionMod::default);
        if let Some(id) = id {
            convention_mod.id = Some(id.to_string());
        }
        configure(&mut convention_mod.config);
        self
    }

    pub fn access_transformers(&mut self, files: &[&str]) -> &mut Self {
        self.access_transformers.extend(files.iter().map(|file| AccessTransformer {
            file: (*file).to_string(),
        }));
        self
    }

    pub fn mixins(&mut self, configs: &[&str]) -> &mut Self {
        self.mixins.extend(configs.iter().map(|config| Mixin {
            config: (*config).to_string(),
        }));
        self
    }

    pub fn custom(&mut self, key: &str, value: CustomValue) -> &mut Self {
        self.custom.insert(key, value);
        self
    }

    /// Fold the convention mod into `mods[id]`.
    ///
    /// Fields set in the convention block replace those of an existing entry; project
    /// metadata only fills what is still unset afterwards.
    fn merge_convention_mod(
        &mut self,
        convention_mod: ConventionMod,
        id: String,
        meta: Option<&ProjectMeta>,
    ) {
        let target = self.mods.entry(id).or_default();
        overlay(target, convention_mod.config);
        if let Some(meta) = meta {
            target.set_conventions_from_project_meta(meta);
        }
    }

    /// Fold the convention mod in without project metadata, which requires an explicit id.
    fn settle_convention_mod(&mut self) -> FactoryResult<()> {
        let Some(convention_mod) = self.convention_mod.take() else {
            return Ok(());
        };
        let id = convention_mod
            .id
            .clone()
            .ok_or_else(|| ValidationError::missing("conventionMod.id"))?;
        self.merge_convention_mod(convention_mod, id, None);
        Ok(())
    }
}

fn overlay(target: &mut Mod, source: Mod) {
    fn set<T>(target: &mut Option<T>, source: Option<T>) {
        if source.is_some() {
            *target = source;
        }
    }

    set(&mut target.namespace, source.namespace);
    set(&mut target.version, source.version);
    set(&mut target.display_name, source.display_name);
    set(&mut target.description, source.description);
    set(&mut target.logo_file, source.logo_file);
    set(&mut target.logo_blur, source.logo_blur);
    set(&mut target.update_json_url, source.update_json_url);
    target.features.extend(source.features);
    for (key, value) in source.mod_properties.iter() {
        target.mod_properties.insert(key, value.clone());
    }
    for (key, value) in source.custom.iter() {
        target.custom.insert(key, value.clone());
    }
    set(&mut target.mod_url, source.mod_url);
    set(&mut target.credits, source.credits);
    set(&mut target.authors, source.authors);
    set(&mut target.display_url, source.display_url);
    set(&mut target.enum_extensions, source.enum_extensions);
    set(&mut target.feature_flags, source.feature_flags);
    target.dependencies.extend(source.dependencies);
}

impl ProjectMetaConventions for NeoForgeModsToml {
    fn set_conventions_from_project_meta(&mut self, meta: &ProjectMeta) {
        if let Some(convention_mod) = self.convention_mod.take() {
            let id = convention_mod
                .id
                .clone()
                .unwrap_or_else(|| mod_id_from_project_name(&meta.name));
            self.merge_convention_mod(convention_mod, id, Some(meta));
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
struct SerializableDependency {
    mod_id: String,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    kind: Option<DependencyType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    reason: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    version_range: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    ordering: Option<DependencyOrdering>,
    #[serde(skip_serializing_if = "Option::is_none")]
    side: Option<DependencySide>,
    #[serde(skip_serializing_if = "Option::is_none")]
    referral_url: Option<String>,
}

impl SerializableDependency {
    fn new(dependency: &Dependency) -> FactoryResult<Self> {
        Ok(Self {
            mod_id: validate(&dependency.mod_id, &MOD_ID, "NeoForge mod id")?.to_string(),
            kind: dependency.kind,
            reason: dependency.reason.clone(),
            version_range: dependency.version_range.clone(),
            ordering: dependency.ordering,
            side: dependency.side,
            referral_url: dependency.referral_url.clone(),
        })
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SerializableMod {
    mod_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    namespace: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    version: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    display_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    logo_file: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    logo_blur: Option<bool>,
    #[serde(rename = "updateJSONURL", skip_serializing_if = "Option::is_none")]
    update_json_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    features: Option<BTreeMap<String, String>>,
    #[serde(rename = "modproperties", skip_serializing_if = "Option::is_none")]
    mod_properties: Option<Map<String, Value>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    mod_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    credits: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    authors: Option<String>,
    #[serde(rename = "displayURL", skip_serializing_if = "Option::is_none")]
    display_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    enum_extensions: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    feature_flags: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct Serializable {
    mod_loader: String,
    loader_version: String,
    license: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    show_as_resource_pack: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    show_as_data_pack: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    services: Option<Vec<String>>,
    #[serde(rename = "issueTrackerURL", skip_serializing_if = "Option::is_none")]
    issue_tracker_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    mods: Option<Vec<Value>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    access_transformers: Option<Vec<AccessTransformer>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    mixins: Option<Vec<Mixin>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    dependencies: Option<BTreeMap<String, Vec<SerializableDependency>>>,
}

/// Render `declared` on top of the resolved `custom` entries.
fn with_custom(custom: &CustomValues, declared: Value) -> FactoryResult<Value> {
    let Some(mut table) = custom.resolve()? else {
        return Ok(declared);
    };
    if let Value::Object(declared) = declared {
        merge(&mut table, declared);
    }
    Ok(Value::Object(table))
}

fn project_mod(id: &str, config: &Mod) -> FactoryResult<Value> {
    let projection = SerializableMod {
        mod_id: validate(id, &MOD_ID, "NeoForge mod id")?.to_string(),
        namespace: validate_opt(config.namespace.as_deref(), &NAMESPACE, "NeoForge mod namespace")?,
        version: config.version.clone(),
        display_name: config.display_name.clone(),
        description: config.description.clone(),
        logo_file: config.logo_file.clone(),
        logo_blur: config.logo_blur,
        update_json_url: config.update_json_url.clone(),
        features: config.features.null_if_empty(),
        mod_properties: config.mod_properties.resolve()?,
        mod_url: config.mod_url.clone(),
        credits: config.credits.clone(),
        authors: config.authors.clone(),
        display_url: config.display_url.clone(),
        enum_extensions: config.enum_extensions.clone(),
        feature_flags: config.feature_flags.clone(),
    };
    with_custom(&config.custom, to_node(&projection)?)
}

impl Manifest for NeoForgeModsToml {
    const FILE_NAME: &'static str = "META-INF/neoforge.mods.toml";

    fn loader() -> LoaderFactory {
        LoaderFactory::toml()
    }

    fn project(&self) -> FactoryResult<Value> {
        let mut toml = self.clone();
        toml.settle_convention_mod()?;

        let mods = toml
            .mods
            .iter()
            .map(|(id, config)| project_mod(id, config))
            .collect::<FactoryResult<Vec<_>>>()?;

        let mut dependencies = BTreeMap::new();
        for (id, config) in &toml.mods {
            if config.dependencies.is_empty() {
                continue;
            }
            let projected = config
                .dependencies
                .iter()
                .map(SerializableDependency::new)
                .collect::<FactoryResult<Vec<_>>>()?;
            dependencies.insert(id.clone(), projected);
        }

        let projection = Serializable {
            mod_loader: toml.mod_loader.clone(),
            loader_version: toml.loader_version.clone(),
            license: require(&toml.license, "license")?,
            show_as_resource_pack: toml.show_as_resource_pack,
            show_as_data_pack: toml.show_as_data_pack,
            services: toml.services.null_if_empty(),
            issue_tracker_url: toml.issue_tracker_url.clone(),
            mods: mods.null_if_empty(),
            access_transformers: toml.access_transformers.null_if_empty(),
            mixins: toml.mixins.null_if_empty(),
            dependencies: dependencies.null_if_empty(),
        };
        with_custom(&toml.custom, to_node(&projection)?)
    }

    fn describe(&self) -> String {
        let ids: Vec<&str> = self.mods.keys().map(String::as_str).collect();
        format!("NeoForgeModsToml(mods=[{}])", ids.join(", "))
    }
}
