//! Fabric `fabric.mod.json`.
//!
//! Field names are written verbatim. `environment` and `icon` have output-only
//! encodings, and `custom` carries arbitrary [`CustomValue`]s.

use std::collections::BTreeMap;

use schemars::JsonSchema;
use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};
use serde_json::{Map, Value};

use resource_factory_api::validate::{require, validate_required};
use resource_factory_api::{
    validate_all, CustomValue, CustomValues, FactoryResult, LoaderFactory, NullIfEmpty, Pattern,
    WriteOnly, WriteOnlyEncoding,
};

use super::{to_node, Manifest};
use crate::project::{convention, ProjectMeta, ProjectMetaConventions};

static MOD_ID: Pattern = Pattern::new(r"^[a-z][a-z0-9_-]{1,63}$");
static ICON_KEY: Pattern = Pattern::new(r"^[1-9][0-9]*$");

/// Physical side a mod or mixin applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, JsonSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Environment {
    #[serde(alias = "client")]
    Client,
    #[serde(alias = "server")]
    Server,
    #[serde(alias = "*", alias = "any")]
    Any,
}

impl WriteOnlyEncoding for Environment {
    const TYPE_NAME: &'static str = "Environment";

    fn encode<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(match self {
            Self::Client => "client",
            Self::Server => "server",
            Self::Any => "*",
        })
    }
}

/// A single icon path, or icon paths keyed by pixel size.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, JsonSchema)]
#[serde(untagged)]
pub enum Icon {
    SingleIcon(String),
    IconMap(BTreeMap<String, String>),
}

impl WriteOnlyEncoding for Icon {
    const TYPE_NAME: &'static str = "Icon";

    fn encode<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::SingleIcon(path) => serializer.serialize_str(path),
            Self::IconMap(icons) => {
                let mut map = serializer.serialize_map(Some(icons.len()))?;
                for (size, path) in icons {
                    map.serialize_entry(size, path)?;
                }
                map.end()
            }
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct Entrypoint {
    #[serde(rename = "type")]
    pub kind: String,
    pub value: String,
    #[serde(default)]
    pub adapter: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct MixinConfig {
    pub config: String,
    #[serde(default)]
    pub environment: Option<Environment>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields, default)]
pub struct ContactInformation {
    pub email: Option<String>,
    pub irc: Option<String>,
    pub homepage: Option<String>,
    pub issues: Option<String>,
    pub sources: Option<String>,
    pub extra: BTreeMap<String, String>,
}

impl ContactInformation {
    fn as_map(&self) -> Option<Map<String, Value>> {
        let mut map = Map::new();
        let known = [
            ("email", &self.email),
            ("irc", &self.irc),
            ("homepage", &self.homepage),
            ("issues", &self.issues),
            ("sources", &self.sources),
        ];
        for (key, value) in known {
            if let Some(value) = value {
                map.insert(key.to_string(), Value::String(value.clone()));
            }
        }
        for (key, value) in &self.extra {
            map.insert(key.clone(), Value::String(value.clone()));
        }
        map.null_if_empty()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct Person {
    pub name: String,
    #[serde(default)]
    pub contact: ContactInformation,
}

/// A Fabric `fabric.mod.json` configuration.
#[derive(Debug, Clone, Default, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields, default)]
pub struct FabricModJson {
    pub id: Option<String>,
    pub version: Option<String>,
    pub environment: Option<Environment>,
    pub entrypoints: Vec<Entrypoint>,
    pub language_adapters: BTreeMap<String, String>,
    pub mixins: Vec<MixinConfig>,
    pub access_widener: Option<String>,
    pub depends: BTreeMap<String, Vec<String>>,
    pub recommends: BTreeMap<String, Vec<String>>,
    pub suggests: BTreeMap<String, Vec<String>>,
    pub conflicts: BTreeMap<String, Vec<String>>,
    pub breaks: BTreeMap<String, Vec<String>>,
    pub name: Option<String>,
    pub description: Option<String>,
    pub authors: Vec<Person>,
    pub contributors: Vec<Person>,
    pub contact: ContactInformation,
    pub license: Vec<String>,
    pub icon: Option<Icon>,
    #[schemars(with = "BTreeMap<String, Value>")]
    pub custom: CustomValues,
}

impl FabricModJson {
    pub fn entrypoint(
        &mut self,
        kind: &str,
        value: &str,
        configure: impl FnOnce(&mut Entrypoint),
    ) -> &mut Self {
        let mut entrypoint = Entrypoint {
            kind: kind.to_string(),
            value: value.to_string(),
            adapter: None,
        };
        configure(&mut entrypoint);
        self.entrypoints.push(entrypoint);
        self
    }

    pub fn main_entrypoint(&mut self, value: &str) -> &mut Self {
        self.entrypoint("main", value, |_| {})
    }

    pub fn client_entrypoint(&mut self, value: &str) -> &mut Self {
        self.entrypoint("client", value, |_| {})
    }

    pub fn server_entrypoint(&mut self, value: &str) -> &mut Self {
        self.entrypoint("server", value, |_| {})
    }

    pub fn mixin(&mut self, config: &str, configure: impl FnOnce(&mut MixinConfig)) -> &mut Self {
        let mut mixin = MixinConfig {
            config: config.to_string(),
            environment: None,
        };
        configure(&mut mixin);
        self.mixins.push(mixin);
        self
    }

    pub fn depends(&mut self, mod_id: &str, version_ranges: &[&str]) -> &mut Self {
        self.depends.insert(mod_id.to_string(), to_strings(version_ranges));
        self
    }

    pub fn recommends(&mut self, mod_id: &str, version_ranges: &[&str]) -> &mut Self {
        self.recommends.insert(mod_id.to_string(), to_strings(version_ranges));
        self
    }

    pub fn suggests(&mut self, mod_id: &str, version_ranges: &[&str]) -> &mut Self {
        self.suggests.insert(mod_id.to_string(), to_strings(version_ranges));
        self
    }

    pub fn conflicts(&mut self, mod_id: &str, version_ranges: &[&str]) -> &mut Self {
        self.conflicts.insert(mod_id.to_string(), to_strings(version_ranges));
        self
    }

    pub fn breaks(&mut self, mod_id: &str, version_ranges: &[&str]) -> &mut Self {
        self.breaks.insert(mod_id.to_string(), to_strings(version_ranges));
        self
    }

    pub fn author(&mut self, name: &str, configure: impl FnOnce(&mut Person)) -> &mut Self {
        self.authors.push(person(name, configure));
        self
    }

    pub fn contributor(&mut self, name: &str, configure: impl FnOnce(&mut Person)) -> &mut Self {
        self.contributors.push(person(name, configure));
        self
    }

    pub fn license(&mut self, licenses: &[&str]) -> &mut Self {
        self.license.extend(to_strings(licenses));
        self
    }

    pub fn apache2_license(&mut self) -> &mut Self {
        self.license(&["Apache-2.0"])
    }

    pub fn mit_license(&mut self) -> &mut Self {
        self.license(&["MIT"])
    }

    pub fn icon(&mut self, path: &str) -> &mut Self {
        self.icon = Some(Icon::SingleIcon(path.to_string()));
        self
    }

    /// Icons keyed by size, e.g. `[("16", "icon16.png"), ("32", "icon32.png")]`.
    pub fn icons(&mut self, icons: &[(&str, &str)]) -> &mut Self {
        self.icon = Some(Icon::IconMap(
            icons
                .iter()
                .map(|(size, path)| ((*size).to_string(), (*path).to_string()))
                .collect(),
        ));
        self
    }

    pub fn custom(&mut self, key: &str, value: CustomValue) -> &mut Self {
        self.custom.insert(key, value);
        self
    }
}

fn to_strings(values: &[&str]) -> Vec<String> {
    values.iter().map(|v| (*v).to_string()).collect()
}

fn person(name: &str, configure: impl FnOnce(&mut Person)) -> Person {
    let mut person = Person {
        name: name.to_string(),
        contact: ContactInformation::default(),
    };
    configure(&mut person);
    person
}

impl ProjectMetaConventions for FabricModJson {
    fn set_conventions_from_project_meta(&mut self, meta: &ProjectMeta) {
        convention(&mut self.id, Some(&meta.name));
        convention(&mut self.name, Some(&meta.name));
        convention(&mut self.version, meta.version.as_ref());
        convention(&mut self.description, meta.description.as_ref());
    }
}

#[derive(Debug, Serialize)]
struct SerializableEntrypoint {
    #[serde(skip_serializing_if = "Option::is_none")]
    adapter: Option<String>,
    value: String,
}

#[derive(Debug, Serialize)]
struct SerializableMixinConfig {
    config: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    environment: Option<WriteOnly<Environment>>,
}

#[derive(Debug, Serialize)]
struct SerializablePerson {
    name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    contact: Option<Map<String, Value>>,
}

impl From<&Person> for SerializablePerson {
    fn from(person: &Person) -> Self {
        Self {
            name: person.name.clone(),
            contact: person.contact.as_map(),
        }
    }
}

type VersionRanges = BTreeMap<String, Vec<String>>;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct Serializable {
    schema_version: u32,
    id: String,
    version: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    environment: Option<WriteOnly<Environment>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    entrypoints: Option<Map<String, Value>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    language_adapters: Option<BTreeMap<String, String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    mixins: Option<Vec<SerializableMixinConfig>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    access_widener: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    depends: Option<VersionRanges>,
    #[serde(skip_serializing_if = "Option::is_none")]
    recommends: Option<VersionRanges>,
    #[serde(skip_serializing_if = "Option::is_none")]
    suggests: Option<VersionRanges>,
    #[serde(skip_serializing_if = "Option::is_none")]
    conflicts: Option<VersionRanges>,
    #[serde(skip_serializing_if = "Option::is_none")]
    breaks: Option<VersionRanges>,
    #[serde(skip_serializing_if = "Option::is_none")]
    name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    authors: Option<Vec<SerializablePerson>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    contributors: Option<Vec<SerializablePerson>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    contact: Option<Map<String, Value>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    license: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    icon: Option<WriteOnly<Icon>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    custom: Option<Map<String, Value>>,
}

/// Validate the mod ids of a version-range map, then normalize it.
fn mod_ranges(ranges: &VersionRanges, description: &str) -> FactoryResult<Option<VersionRanges>> {
    validate_all(ranges.keys(), &MOD_ID, description)?;
    Ok(ranges.null_if_empty())
}

/// Group entrypoints by type, keeping the order in which types first appear.
fn group_entrypoints(entrypoints: &[Entrypoint]) -> FactoryResult<Option<Map<String, Value>>> {
    let mut grouped = Map::new();
    for entrypoint in entrypoints {
        let node = serde_json::to_value(SerializableEntrypoint {
            adapter: entrypoint.adapter.clone(),
            value: entrypoint.value.clone(),
        })?;
        if let Value::Array(group) = grouped
            .entry(entrypoint.kind.clone())
            .or_insert_with(|| Value::Array(Vec::new()))
        {
            group.push(node);
        }
    }
    Ok(grouped.null_if_empty())
}

impl Serializable {
    fn new(fmj: &FabricModJson) -> FactoryResult<Self> {
        if let Some(Icon::IconMap(icons)) = &fmj.icon {
            validate_all(icons.keys(), &ICON_KEY, "Icon key")?;
        }

        Ok(Self {
            schema_version: 1,
            id: validate_required(fmj.id.as_deref(), &MOD_ID, "id", "Fabric mod id")?,
            version: require(&fmj.version, "version")?,
            environment: WriteOnly::from_opt(&fmj.environment),
            entrypoints: group_entrypoints(&fmj.entrypoints)?,
            language_adapters: fmj.language_adapters.null_if_empty(),
            mixins: fmj.mixins.null_if_empty().map(|mixins| {
                mixins
                    .iter()
                    .map(|mixin| SerializableMixinConfig {
                        config: mixin.config.clone(),
                        environment: WriteOnly::from_opt(&mixin.environment),
                    })
                    .collect()
            }),
            access_widener: fmj.access_widener.clone(),
            depends: mod_ranges(&fmj.depends, "Fabric mod id (of depends)")?,
            recommends: mod_ranges(&fmj.recommends, "Fabric mod id (of recommends)")?,
            suggests: mod_ranges(&fmj.suggests, "Fabric mod id (of suggests)")?,
            conflicts: mod_ranges(&fmj.conflicts, "Fabric mod id (of conflicts)")?,
            breaks: mod_ranges(&fmj.breaks, "Fabric mod id (of breaks)")?,
            name: fmj.name.clone(),
            description: fmj.description.clone(),
            authors: fmj
                .authors
                .null_if_empty()
                .map(|people| people.iter().map(SerializablePerson::from).collect()),
            contributors: fmj
                .contributors
                .null_if_empty()
                .map(|people| people.iter().map(SerializablePerson::from).collect()),
            contact: fmj.contact.as_map(),
            license: fmj.license.null_if_empty(),
            icon: WriteOnly::from_opt(&fmj.icon),
            custom: fmj.custom.resolve()?,
        })
    }
}

impl Manifest for FabricModJson {
    const FILE_NAME: &'static str = "fabric.mod.json";

    fn loader() -> LoaderFactory {
        LoaderFactory::json()
    }

    fn project(&self) -> FactoryResult<Value> {
        to_node(&Serializable::new(self)?)
    }

    fn describe(&self) -> String {
        format!("FabricModJson(id={})", self.id.as_deref().unwrap_or("<unset>"))
    }
}
