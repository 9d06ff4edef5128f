//! Bukkit `plugin.yml`.

use std::collections::BTreeMap;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use resource_factory_api::validate::{require, validate_opt, validate_required};
use resource_factory_api::{
    validate_all, FactoryResult, LoaderFactory, NullIfEmpty, Pattern, WriteOnly,
};

use super::permission::{serializable_permissions, Permission, PermissionDefault, SerializablePermission};
use super::{describe_named, to_node, Manifest};
use crate::project::{convention, ProjectMeta, ProjectMetaConventions};

pub(crate) static PLUGIN_NAME: Pattern = Pattern::new(r"^[A-Za-z0-9_.-]+$");
static PLUGIN_CLASS: Pattern = Pattern::excluding_prefix(
    r"^([a-zA-Z_$][a-zA-Z\d_$]*\.)*[a-zA-Z_$][a-zA-Z\d_$]*$",
    "org.bukkit.",
);
static LIBRARY: Pattern = Pattern::new(r"([^: ]+):([^: ]+)(:([^: ]*)(:([^: ]+))?)?:([^: ]+)");

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PluginLoadOrder {
    #[serde(alias = "startup")]
    Startup,
    #[serde(alias = "postworld")]
    Postworld,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields, default)]
pub struct Command {
    pub description: Option<String>,
    pub aliases: Vec<String>,
    pub permission: Option<String>,
    pub permission_message: Option<String>,
    pub usage: Option<String>,
}

/// A Bukkit `plugin.yml` configuration.
///
/// See <https://docs.papermc.io/paper/dev/plugin-yml> for the meaning of each field.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields, default)]
pub struct BukkitPluginYaml {
    pub api_version: Option<String>,
    pub name: Option<String>,
    pub version: Option<String>,
    pub main: Option<String>,
    pub description: Option<String>,
    pub load: Option<PluginLoadOrder>,
    pub author: Option<String>,
    pub authors: Vec<String>,
    pub website: Option<String>,
    pub depend: Vec<String>,
    pub soft_depend: Vec<String>,
    pub load_before: Vec<String>,
    pub prefix: Option<String>,
    pub default_permission: Option<PermissionDefault>,
    pub provides: Vec<String>,
    pub libraries: Vec<String>,
    pub commands: BTreeMap<String, Command>,
    pub permissions: BTreeMap<String, Permission>,
    pub folia_supported: Option<bool>,
    pub paper_plugin_loader: Option<String>,
    pub paper_skip_libraries: Option<bool>,
}

impl BukkitPluginYaml {
    /// Register or update the command `name`.
    pub fn command(&mut self, name: &str, configure: impl FnOnce(&mut Command)) -> &mut Self {
        configure(self.commands.entry(name.to_string()).or_default());
        self
    }

    /// Register or update the permission `name`.
    pub fn permission(&mut self, name: &str, configure: impl FnOnce(&mut Permission)) -> &mut Self {
        configure(self.permissions.entry(name.to_string()).or_default());
        self
    }
}

impl ProjectMetaConventions for BukkitPluginYaml {
    fn set_conventions_from_project_meta(&mut self, meta: &ProjectMeta) {
        convention(&mut self.name, Some(&meta.name));
        convention(&mut self.version, meta.version.as_ref());
        convention(&mut self.description, meta.description.as_ref());
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "kebab-case")]
struct SerializableCommand {
    #[serde(skip_serializing_if = "Option::is_none")]
    description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    aliases: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    permission: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    permission_message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    usage: Option<String>,
}

impl From<&Command> for SerializableCommand {
    fn from(command: &Command) -> Self {
        Self {
            description: command.description.clone(),
            aliases: command.aliases.null_if_empty(),
            permission: command.permission.clone(),
            permission_message: command.permission_message.clone(),
            usage: command.usage.clone(),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "kebab-case")]
struct Serializable {
    #[serde(skip_serializing_if = "Option::is_none")]
    api_version: Option<String>,
    name: String,
    version: String,
    main: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    load: Option<PluginLoadOrder>,
    #[serde(skip_serializing_if = "Option::is_none")]
    author: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    authors: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    website: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    depend: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    softdepend: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    loadbefore: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    prefix: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    default_permission: Option<WriteOnly<PermissionDefault>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    provides: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    libraries: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    commands: Option<BTreeMap<String, SerializableCommand>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    permissions: Option<BTreeMap<String, SerializablePermission>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    folia_supported: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    paper_plugin_loader: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    paper_skip_libraries: Option<bool>,
}

impl Serializable {
    fn new(yaml: &BukkitPluginYaml) -> FactoryResult<Self> {
        validate_all(&yaml.depend, &PLUGIN_NAME, "Bukkit plugin name (of depend)")?;
        validate_all(&yaml.soft_depend, &PLUGIN_NAME, "Bukkit plugin name (of softDepend)")?;
        validate_all(&yaml.load_before, &PLUGIN_NAME, "Bukkit plugin name (of loadBefore)")?;
        validate_all(&yaml.libraries, &LIBRARY, "Bukkit plugin library")?;

        Ok(Self {
            api_version: yaml.api_version.clone(),
            name: validate_required(yaml.name.as_deref(), &PLUGIN_NAME, "name", "Bukkit plugin name")?,
            version: require(&yaml.version, "version")?,
            main: validate_required(
                yaml.main.as_deref(),
                &PLUGIN_CLASS,
                "main",
                "Bukkit plugin main class name",
            )?,
            description: yaml.description.clone(),
            load: yaml.load,
            author: yaml.author.clone(),
            authors: yaml.authors.null_if_empty(),
            website: yaml.website.clone(),
            depend: yaml.depend.null_if_empty(),
            softdepend: yaml.soft_depend.null_if_empty(),
            loadbefore: yaml.load_before.null_if_empty(),
            prefix: yaml.prefix.clone(),
            default_permission: WriteOnly::from_opt(&yaml.default_permission),
            provides: yaml.provides.null_if_empty(),
            libraries: yaml.libraries.null_if_empty(),
            commands: yaml.commands.null_if_empty().map(|commands| {
                commands
                    .iter()
                    .map(|(name, command)| (name.clone(), SerializableCommand::from(command)))
                    .collect()
            }),
            permissions: serializable_permissions(&yaml.permissions),
            folia_supported: yaml.folia_supported,
            paper_plugin_loader: validate_opt(
                yaml.paper_plugin_loader.as_deref(),
                &PLUGIN_CLASS,
                "Paper plugin loader class name",
            )?,
            paper_skip_libraries: yaml.paper_skip_libraries,
        })
    }
}

impl Manifest for BukkitPluginYaml {
    const FILE_NAME: &'static str = "plugin.yml";

    fn loader() -> LoaderFactory {
        LoaderFactory::yaml()
    }

    fn project(&self) -> FactoryResult<Value> {
        to_node(&Serializable::new(self)?)
    }

    fn describe(&self) -> String {
        describe_named("BukkitPluginYaml", self.name.as_deref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::execution::ExecuteResourceFactories;
    use resource_factory_api::{FactoryError, ValidationError};
    use std::fs;

    fn minimal() -> BukkitPluginYaml {
        BukkitPluginYaml {
            name: Some("test".into()),
            main: Some("test".into()),
            ..BukkitPluginYaml::default()
        }
    }

    #[test]
    fn minimal_plugin_yml_with_project_version() {
        let out = tempfile::tempdir().unwrap();
        let meta = ProjectMeta::new("ignored").with_version("1.0");
        let run = ExecuteResourceFactories::new(
            vec![minimal().into_conventional_factory(meta)],
            out.path().join("resources"),
        );
        run.run().unwrap();

        let text = fs::read_to_string(out.path().join("resources/plugin.yml")).unwrap();
        assert_eq!(text, "name: test\nversion: '1.0'\nmain: test\n");
    }

    #[test]
    fn invalid_name_references_pattern() {
        let yaml = BukkitPluginYaml {
            name: Some("bad name!".into()),
            version: Some("1.0".into()),
            ..minimal()
        };
        let err = yaml.project().unwrap_err();
        let message = err.to_string();
        assert!(matches!(err, FactoryError::Validation(ValidationError::InvalidValue { .. })));
        assert!(message.contains("Bukkit plugin name"), "{message}");
        assert!(message.contains("^[A-Za-z0-9_.-]+$"), "{message}");
    }

    #[test]
    fn missing_version_is_reported() {
        let err = minimal().project().unwrap_err();
        assert!(err.to_string().contains("version"));
    }

    #[test]
    fn main_class_in_bukkit_namespace_is_rejected() {
        let yaml = BukkitPluginYaml {
            version: Some("1".into()),
            main: Some("org.bukkit.Main".into()),
            ..minimal()
        };
        assert!(yaml.project().is_err());
    }

    #[test]
    fn full_projection_uses_dashed_keys() {
        let mut yaml = BukkitPluginYaml {
            api_version: Some("1.20".into()),
            version: Some("1.0".into()),
            main: Some("com.example.Main".into()),
            soft_depend: vec!["Vault".into()],
            default_permission: Some(PermissionDefault::Op),
            libraries: vec!["com.example:lib:1.0".into()],
            folia_supported: Some(true),
            ..minimal()
        };
        yaml.command("test", |c| {
            c.aliases = vec!["t".into()];
            c.permission_message = Some("no".into());
        });
        yaml.permission("test.admin", |p| {
            p.default = Some(PermissionDefault::NotOp);
        });

        let node = yaml.project().unwrap();
        assert_eq!(node["api-version"], "1.20");
        assert_eq!(node["softdepend"][0], "Vault");
        assert_eq!(node["default-permission"], "op");
        assert_eq!(node["folia-supported"], true);
        assert_eq!(node["commands"]["test"]["permission-message"], "no");
        assert_eq!(node["permissions"]["test.admin"]["default"], "not op");
        assert!(node.get("depend").is_none());
    }

    #[test]
    fn invalid_dependency_names_the_field() {
        let yaml = BukkitPluginYaml {
            version: Some("1".into()),
            depend: vec!["ok".into(), "not ok".into()],
            ..minimal()
        };
        let message = yaml.project().unwrap_err().to_string();
        assert!(message.contains("(of depend)"), "{message}");
    }

    #[test]
    fn reads_from_build_description() {
        let yaml: BukkitPluginYaml = serde_yaml::from_str(
            "name: test\nmain: com.example.Main\nsoftDepend: [Vault]\ndefaultPermission: NOT_OP\n\
             commands:\n  hello:\n    usage: /hello\n",
        )
        .unwrap();
        assert_eq!(yaml.soft_depend, vec!["Vault"]);
        assert_eq!(yaml.default_permission, Some(PermissionDefault::NotOp));
        assert_eq!(yaml.commands["hello"].usage.as_deref(), Some("/hello"));
    }

    #[test]
    fn patterns_compile() {
        PLUGIN_NAME.compile().unwrap();
        PLUGIN_CLASS.compile().unwrap();
        LIBRARY.compile().unwrap();
    }
}
