//! High-level interface over a build description.
//!
//! [`ResourceFactoryManager`] loads a [`BuildConfig`], turns every source set into a
//! [`ResourceFactoryExtension`] and runs them through [`ExecuteResourceFactories`].
//! Platform manifests from the description are registered on the `main` source set,
//! ahead of that source set's ad hoc factories.
//!
//! ```rust,no_run
//! use resource_factory_core::manager::{ResourceFactoryManager, ResourceFactoryManagerConfig};
//! use std::path::PathBuf;
//!
//! # fn example() -> resource_factory_core::types::BuildResult<()> {
//! let manager = ResourceFactoryManager::new(ResourceFactoryManagerConfig {
//!     config_path: PathBuf::from("resource-factory.yml"),
//!     output_root: None,
//! })?;
//!
//! for plan in manager.plan()? {
//!     println!("{}: {} factories", plan.name, plan.factories.len());
//! }
//! manager.generate(&[])?;
//! # Ok(())
//! # }
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::configs::build::{load_build_config, BuildConfig, MAIN_SOURCE_SET};
use crate::execution::ExecuteResourceFactories;
use crate::extension::ResourceFactoryExtension;
use crate::results::{GenerateResult, SourceSetPlan};
use crate::types::{BuildError, BuildResult};

/// Default output root, relative to the description's directory.
pub const DEFAULT_OUTPUT_ROOT: &str = "build/generated/resourceFactory";

/// Configuration for initializing a manager
pub struct ResourceFactoryManagerConfig {
    pub config_path: PathBuf,
    /// Overrides the description's `outputRoot`.
    pub output_root: Option<PathBuf>,
}

pub struct ResourceFactoryManager {
    pub build_config: BuildConfig,
    pub output_root: PathBuf,
}

impl ResourceFactoryManager {
    /// Load the description at `config.config_path`.
    pub fn new(config: ResourceFactoryManagerConfig) -> BuildResult<Self> {
        let build_config = load_build_config(&config.config_path)?;
        let base_dir = config
            .config_path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default();
        Ok(Self::from_build_config(build_config, &base_dir, config.output_root))
    }

    /// Use an already parsed description whose relative paths resolve against `base_dir`.
    pub fn from_build_config(
        build_config: BuildConfig,
        base_dir: &Path,
        output_root: Option<PathBuf>,
    ) -> Self {
        let output_root = output_root.unwrap_or_else(|| {
            let configured = build_config
                .output_root
                .clone()
                .unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT_ROOT));
            base_dir.join(configured)
        });
        Self {
            build_config,
            output_root,
        }
    }

    pub fn source_sets(&self) -> Vec<String> {
        self.build_config.source_set_names()
    }

    pub fn output_dir(&self, source_set: &str) -> PathBuf {
        self.output_root.join(source_set)
    }

    /// Build the extension for `source_set` with every factory registered.
    pub fn extension(&self, source_set: &str) -> BuildResult<ResourceFactoryExtension> {
        if !self.source_sets().iter().any(|name| name == source_set) {
            return Err(BuildError::Config(format!(
                "Source set '{}' not found",
                source_set
            )));
        }

        let config = &self.build_config;
        let mut extension = ResourceFactoryExtension::new(config.project.clone());
        if source_set == MAIN_SOURCE_SET {
            if let Some(model) = &config.paper_plugin_yaml {
                extension.add_manifest(model.clone());
            }
            if let Some(model) = &config.bukkit_plugin_yaml {
                extension.add_manifest(model.clone());
            }
            if let Some(model) = &config.bungee_plugin_yaml {
                extension.add_manifest(model.clone());
            }
            if let Some(model) = &config.velocity_plugin_json {
                extension.add_manifest(model.clone());
            }
            if let Some(model) = &config.fabric_mod_json {
                extension.add_manifest(model.clone());
            }
            if let Some(model) = &config.neo_forge_mods_toml {
                extension.add_manifest(model.clone());
            }
        }
        if let Some(source_set_config) = config.source_sets.get(source_set) {
            for factory in &source_set_config.factories {
                extension.factory(factory.to_factory());
            }
        }
        Ok(extension)
    }

    /// List the factories of every source set without running them.
    pub fn plan(&self) -> BuildResult<Vec<SourceSetPlan>> {
        self.source_sets()
            .into_iter()
            .map(|name| {
                let extension = self.extension(&name)?;
                Ok(SourceSetPlan {
                    output_dir: self.output_dir(&name),
                    factories: extension
                        .registered_factories()
                        .iter()
                        .map(ToString::to_string)
                        .collect(),
                    name,
                })
            })
            .collect()
    }

    /// Run the selected source sets, or all of them when `source_sets` is empty.
    pub fn generate(&self, source_sets: &[String]) -> BuildResult<Vec<GenerateResult>> {
        let selected = if source_sets.is_empty() {
            self.source_sets()
        } else {
            source_sets.to_vec()
        };

        let mut results = Vec::with_capacity(selected.len());
        for name in selected {
            let extension = self.extension(&name)?;
            let output_dir = self.output_dir(&name);
            debug!("Generating source set '{}' into {}", name, output_dir.display());
            ExecuteResourceFactories::new(extension.into_factories(), &output_dir).run()?;

            let mut files = Vec::new();
            collect_files(&output_dir, &output_dir, &mut files)?;
            files.sort();
            results.push(GenerateResult {
                source_set: name,
                output_dir,
                files,
            });
        }
        Ok(results)
    }
}

fn collect_files(root: &Path, dir: &Path, files: &mut Vec<PathBuf>) -> BuildResult<()> {
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        if path.is_dir() {
            collect_files(root, &path, files)?;
        } else if let Ok(relative) = path.strip_prefix(root) {
            files.push(relative.to_path_buf());
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use resource_factory_api::FactoryError;

    const DESCRIPTION: &str = r#"
project:
  name: example
  version: "1.0"
bukkitPluginYaml:
  main: com.example.Main
velocityPluginJson:
  main: com.example.Velocity
sourceSets:
  main:
    factories:
      - path: data/extra.json
        value: [1, 2]
  test:
    factories:
      - path: fixtures/a.yml
        value: { a: 1 }
"#;

    fn manager(dir: &Path, description: &str) -> ResourceFactoryManager {
        let config_path = dir.join("resource-factory.yml");
        fs::write(&config_path, description).unwrap();
        ResourceFactoryManager::new(ResourceFactoryManagerConfig {
            config_path,
            output_root: None,
        })
        .unwrap()
    }

    #[test]
    fn plan_lists_manifests_before_ad_hoc_factories() {
        let dir = tempfile::tempdir().unwrap();
        let plans = manager(dir.path(), DESCRIPTION).plan().unwrap();

        assert_eq!(plans.len(), 2);
        assert_eq!(plans[0].name, "main");
        assert_eq!(
            plans[0].output_dir,
            dir.path().join("build/generated/resourceFactory/main")
        );
        assert_eq!(plans[0].factories.len(), 3);
        assert!(plans[0].factories[0].contains("BukkitPluginYaml(name=example)"));
        assert!(plans[0].factories[1].contains("velocity-plugin.json"));
        assert!(plans[0].factories[2].contains("data/extra.json"));
        assert_eq!(plans[1].factories.len(), 1);
    }

    #[test]
    fn generate_writes_every_source_set() {
        let dir = tempfile::tempdir().unwrap();
        let results = manager(dir.path(), DESCRIPTION).generate(&[]).unwrap();

        assert_eq!(
            results[0].files,
            vec![
                PathBuf::from("data/extra.json"),
                PathBuf::from("plugin.yml"),
                PathBuf::from("velocity-plugin.json"),
            ]
        );
        assert_eq!(results[1].files, vec![PathBuf::from("fixtures/a.yml")]);
        let plugin_yml = fs::read_to_string(results[0].output_dir.join("plugin.yml")).unwrap();
        assert_eq!(plugin_yml, "name: example\nversion: '1.0'\nmain: com.example.Main\n");
    }

    #[test]
    fn generate_selected_source_set_with_output_override() {
        let dir = tempfile::tempdir().unwrap();
        let config_path = dir.path().join("resource-factory.yml");
        fs::write(&config_path, DESCRIPTION).unwrap();
        let manager = ResourceFactoryManager::new(ResourceFactoryManagerConfig {
            config_path,
            output_root: Some(dir.path().join("out")),
        })
        .unwrap();

        let results = manager.generate(&["test".to_string()]).unwrap();
        assert_eq!(results.len(), 1);
        assert!(dir.path().join("out/test/fixtures/a.yml").is_file());
        assert!(!dir.path().join("out/main").exists());
    }

    #[test]
    fn unknown_source_set_is_a_config_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = manager(dir.path(), DESCRIPTION)
            .generate(&["missing".to_string()])
            .unwrap_err();
        assert!(matches!(err, BuildError::Config(_)));
    }

    #[test]
    fn duplicate_paths_fail_with_listing() {
        let dir = tempfile::tempdir().unwrap();
        let description = r#"
bukkitPluginYaml:
  name: example
  version: "1.0"
  main: com.example.Main
sourceSets:
  main:
    factories:
      - path: plugin.yml
        value: {}
"#;
        let err = manager(dir.path(), description).generate(&[]).unwrap_err();
        let BuildError::Factory(err) = err else {
            panic!("expected a factory error, got {err:?}");
        };
        assert!(matches!(err, FactoryError::Batch { index: 1, .. }));
        assert!(err.to_string().contains(" 0. SimpleResourceFactory(path=plugin.yml"));
    }
}
