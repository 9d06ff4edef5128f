use std::collections::BTreeMap;
use std::fs;
use std::path::{Component, Path, PathBuf};

use schemars::JsonSchema;
use serde::Deserialize;
use serde_json::Value;

use resource_factory_api::{
    ConstantValueProvider, DuplicatesMode, Format, LoaderFactory, SimpleFactory,
};

use crate::manifests::{
    BukkitPluginYaml, BungeeCordPluginYaml, FabricModJson, NeoForgeModsToml, PaperPluginYaml,
    VelocityPluginJson,
};
use crate::project::ProjectMeta;
use crate::types::{BuildError, BuildResult};

/// Name of the source set the platform manifests are registered on.
pub const MAIN_SOURCE_SET: &str = "main";

/// A build description, usually `resource-factory.yml`.
#[derive(Debug, Clone, Default, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct BuildConfig {
    pub project: Option<ProjectMeta>,
    /// Directory source set outputs are generated under, relative to the description.
    pub output_root: Option<PathBuf>,
    pub paper_plugin_yaml: Option<PaperPluginYaml>,
    pub bukkit_plugin_yaml: Option<BukkitPluginYaml>,
    pub bungee_plugin_yaml: Option<BungeeCordPluginYaml>,
    pub velocity_plugin_json: Option<VelocityPluginJson>,
    pub fabric_mod_json: Option<FabricModJson>,
    pub neo_forge_mods_toml: Option<NeoForgeModsToml>,
    #[serde(default)]
    pub source_sets: BTreeMap<String, SourceSetConfig>,
}

impl BuildConfig {
    pub fn has_manifests(&self) -> bool {
        self.paper_plugin_yaml.is_some()
            || self.bukkit_plugin_yaml.is_some()
            || self.bungee_plugin_yaml.is_some()
            || self.velocity_plugin_json.is_some()
            || self.fabric_mod_json.is_some()
            || self.neo_forge_mods_toml.is_some()
    }

    /// Declared source sets, plus `main` when any platform manifest is configured.
    pub fn source_set_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.source_sets.keys().cloned().collect();
        if self.has_manifests() && !self.source_sets.contains_key(MAIN_SOURCE_SET) {
            names.push(MAIN_SOURCE_SET.to_string());
            names.sort();
        }
        names
    }

    /// Check that every ad hoc factory writes inside its source set's output directory.
    pub fn validate(&self) -> BuildResult<()> {
        for (name, source_set) in &self.source_sets {
            for factory in &source_set.factories {
                let escapes = factory.path.as_os_str().is_empty()
                    || factory.path.components().any(|component| {
                        matches!(
                            component,
                            Component::ParentDir | Component::RootDir | Component::Prefix(_)
                        )
                    });
                if escapes {
                    return Err(BuildError::Config(format!(
                        "Factory path '{}' in source set '{}' must be relative and stay inside the output directory",
                        factory.path.display(),
                        name
                    )));
                }
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct SourceSetConfig {
    #[serde(default)]
    pub factories: Vec<FactoryConfig>,
}

/// An ad hoc file: a value written at a path in one format.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct FactoryConfig {
    pub path: PathBuf,
    /// Defaults to the format matching the path's extension, then YAML.
    pub format: Option<Format>,
    #[serde(default)]
    pub duplicates_mode: DuplicatesMode,
    pub value: Value,
}

impl FactoryConfig {
    pub fn resolved_format(&self) -> Format {
        self.format
            .or_else(|| format_for_extension(&self.path))
            .unwrap_or_default()
    }

    pub fn to_factory(&self) -> SimpleFactory {
        let mut factory = SimpleFactory::new(
            self.path.clone(),
            LoaderFactory::from(self.resolved_format()),
            ConstantValueProvider(self.value.clone()),
        );
        factory.set_duplicates_mode(self.duplicates_mode);
        factory
    }
}

fn format_for_extension(path: &Path) -> Option<Format> {
    match path.extension()?.to_str()? {
        "yml" | "yaml" => Some(Format::Yaml),
        "json" => Some(Format::Json),
        "toml" => Some(Format::Toml),
        _ => None,
    }
}

pub fn parse_build_config(yaml_str: &str) -> BuildResult<BuildConfig> {
    let config: BuildConfig = serde_yaml::from_str(yaml_str)?;
    config.validate()?;
    Ok(config)
}

pub fn parse_build_config_toml(toml_str: &str) -> BuildResult<BuildConfig> {
    let config: BuildConfig = toml::from_str(toml_str)?;
    config.validate()?;
    Ok(config)
}

/// Read a description, choosing the parser by extension (`.toml`, otherwise YAML).
pub fn load_build_config(path: &Path) -> BuildResult<BuildConfig> {
    let contents = fs::read_to_string(path).map_err(|e| {
        BuildError::Config(format!("Failed to read {}: {}", path.display(), e))
    })?;
    match path.extension().and_then(|ext| ext.to_str()) {
        Some("toml") => parse_build_config_toml(&contents),
        _ => parse_build_config(&contents),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::manifests::PermissionDefault;

    #[test]
    fn parses_yaml_description() {
        let config = parse_build_config(
            r#"
project:
  name: example
  version: "1.0"
bukkitPluginYaml:
  main: com.example.Main
  defaultPermission: NOT_OP
  commands:
    hello:
      aliases: [hi]
neoForgeModsToml:
  license: MIT
  conventionMod:
    logoFile: logo.png
sourceSets:
  test:
    factories:
      - path: data/config.json
        value: { enabled: true }
        duplicatesMode: IGNORE
"#,
        )
        .unwrap();

        let bukkit = config.bukkit_plugin_yaml.as_ref().unwrap();
        assert_eq!(bukkit.default_permission, Some(PermissionDefault::NotOp));
        assert_eq!(bukkit.commands["hello"].aliases, vec!["hi".to_string()]);
        let neoforge = config.neo_forge_mods_toml.as_ref().unwrap();
        let convention_mod = neoforge.convention_mod.as_ref().unwrap();
        assert_eq!(convention_mod.config.logo_file.as_deref(), Some("logo.png"));
        assert_eq!(config.source_set_names(), vec!["main", "test"]);

        let factory = &config.source_sets["test"].factories[0];
        assert_eq!(factory.resolved_format(), Format::Json);
        assert_eq!(factory.duplicates_mode, DuplicatesMode::Ignore);
    }

    #[test]
    fn parses_toml_description() {
        let config = parse_build_config_toml(
            r#"
[project]
name = "example"

[velocityPluginJson]
main = "com.example.Velocity"

[[sourceSets.main.factories]]
path = "x.cfg"
format = "toml"
value = { a = 1 }
"#,
        )
        .unwrap();
        assert!(config.velocity_plugin_json.is_some());
        assert_eq!(config.source_set_names(), vec!["main"]);
        assert_eq!(config.source_sets["main"].factories[0].resolved_format(), Format::Toml);
    }

    #[test]
    fn unknown_fields_are_rejected() {
        assert!(parse_build_config("project:\n  name: x\nunknown: 1\n").is_err());
        assert!(parse_build_config("bukkitPluginYaml:\n  nmae: x\n").is_err());
    }

    #[test]
    fn factory_paths_must_stay_in_the_output_directory() {
        for path in ["../outside.yml", "data/../../outside.yml", "/etc/outside.yml", "''"] {
            let description =
                format!("sourceSets:\n  main:\n    factories:\n      - path: {path}\n        value: 1\n");
            let err = parse_build_config(&description).unwrap_err();
            assert!(matches!(err, BuildError::Config(_)), "{path}: {err:?}");
            assert!(err.to_string().contains("source set 'main'"), "{err}");
        }

        let err = parse_build_config_toml(
            "[[sourceSets.test.factories]]\npath = \"../x.toml\"\nvalue = 1\n",
        )
        .unwrap_err();
        assert!(err.to_string().contains("../x.toml"), "{err}");

        assert!(parse_build_config(
            "sourceSets:\n  main:\n    factories:\n      - path: ./data/inside.yml\n        value: 1\n"
        )
        .is_ok());
    }

    #[test]
    fn format_defaults_to_yaml_for_unknown_extensions() {
        let factory: FactoryConfig =
            serde_yaml::from_str("path: config.properties\nvalue: 1\n").unwrap();
        assert_eq!(factory.resolved_format(), Format::Yaml);
        assert_eq!(factory.to_factory().to_string(), "SimpleResourceFactory(path=config.properties, format=yaml, value=1)");
    }
}
