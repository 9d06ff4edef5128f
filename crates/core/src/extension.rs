//! The registration surface build code talks to.
//!
//! A [`ResourceFactoryExtension`] collects factories for one source set. Manifest
//! registrations bind the extension's [`ProjectMeta`] so conventional defaults are
//! applied when the file is rendered.
//!
//! ```rust
//! use resource_factory_core::extension::ResourceFactoryExtension;
//! use resource_factory_core::project::ProjectMeta;
//!
//! let mut resources = ResourceFactoryExtension::new(Some(ProjectMeta::new("example").with_version("1.0")));
//! resources.bukkit_plugin_yaml(|yaml| yaml.main = Some("com.example.Main".into()));
//! assert_eq!(resources.registered_factories().len(), 1);
//! ```

use resource_factory_api::ResourceFactory;

use crate::manifests::{
    BukkitPluginYaml, BungeeCordPluginYaml, FabricModJson, Manifest, NeoForgeModsToml,
    PaperPluginYaml, VelocityPluginJson,
};
use crate::project::ProjectMeta;

#[derive(Debug, Default)]
pub struct ResourceFactoryExtension {
    project: Option<ProjectMeta>,
    factories: Vec<Box<dyn ResourceFactory>>,
}

impl ResourceFactoryExtension {
    pub fn new(project: Option<ProjectMeta>) -> Self {
        Self {
            project,
            factories: Vec::new(),
        }
    }

    pub fn project(&self) -> Option<&ProjectMeta> {
        self.project.as_ref()
    }

    /// Register a factory.
    pub fn factory(&mut self, factory: impl ResourceFactory + 'static) -> &mut Self {
        self.factories.push(Box::new(factory));
        self
    }

    /// Register already-boxed factories, keeping their order.
    pub fn factories(&mut self, factories: impl IntoIterator<Item = Box<dyn ResourceFactory>>) -> &mut Self {
        self.factories.extend(factories);
        self
    }

    pub fn registered_factories(&self) -> &[Box<dyn ResourceFactory>] {
        &self.factories
    }

    pub fn into_factories(self) -> Vec<Box<dyn ResourceFactory>> {
        self.factories
    }

    /// Register a default-constructed factory of type `T` after configuring it.
    pub fn create_factory<T>(&mut self, configure: impl FnOnce(&mut T)) -> &mut Self
    where
        T: ResourceFactory + Default + 'static,
    {
        let mut factory = T::default();
        configure(&mut factory);
        self.factory(factory)
    }

    /// Register a factory of type `T` built from constructor arguments.
    pub fn create_factory_with<T, A>(&mut self, args: A, configure: impl FnOnce(&mut T)) -> &mut Self
    where
        T: ResourceFactory + From<A> + 'static,
    {
        let mut factory = T::from(args);
        configure(&mut factory);
        self.factory(factory)
    }

    /// Register a manifest model as it is.
    pub fn add_manifest<M: Manifest>(&mut self, model: M) -> &mut Self {
        let factory = match &self.project {
            Some(meta) => model.into_conventional_factory(meta.clone()),
            None => model.into_resource_factory(),
        };
        self.factories.push(factory);
        self
    }

    /// Configure a fresh manifest model and register it. Returns the configured model.
    pub fn manifest<M>(&mut self, configure: impl FnOnce(&mut M)) -> M
    where
        M: Manifest + Default,
    {
        let mut model = M::default();
        configure(&mut model);
        self.add_manifest(model.clone());
        model
    }

    pub fn paper_plugin_yaml(&mut self, configure: impl FnOnce(&mut PaperPluginYaml)) -> PaperPluginYaml {
        self.manifest(configure)
    }

    pub fn bukkit_plugin_yaml(&mut self, configure: impl FnOnce(&mut BukkitPluginYaml)) -> BukkitPluginYaml {
        self.manifest(configure)
    }

    pub fn bungee_plugin_yaml(
        &mut self,
        configure: impl FnOnce(&mut BungeeCordPluginYaml),
    ) -> BungeeCordPluginYaml {
        self.manifest(configure)
    }

    pub fn velocity_plugin_json(
        &mut self,
        configure: impl FnOnce(&mut VelocityPluginJson),
    ) -> VelocityPluginJson {
        self.manifest(configure)
    }

    pub fn fabric_mod_json(&mut self, configure: impl FnOnce(&mut FabricModJson)) -> FabricModJson {
        self.manifest(configure)
    }

    pub fn neoforge_mods_toml(
        &mut self,
        configure: impl FnOnce(&mut NeoForgeModsToml),
    ) -> NeoForgeModsToml {
        self.manifest(configure)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::execution::ExecuteResourceFactories;
    use resource_factory_api::{
        simple_custom_value_list, ConstantValueProvider, DuplicatesMode, SimpleFactory,
    };
    use serde_json::{json, Value};
    use std::fs;

    fn extension() -> ResourceFactoryExtension {
        ResourceFactoryExtension::new(Some(
            ProjectMeta::new("example-mod")
                .with_version("1.2.3")
                .with_description("An example"),
        ))
    }

    #[test]
    fn registers_every_platform_in_order() {
        let mut resources = extension();
        resources.paper_plugin_yaml(|y| {
            y.api_version = Some("1.20".into());
            y.main = Some("com.example.Paper".into());
        });
        resources.bukkit_plugin_yaml(|y| y.main = Some("com.example.Bukkit".into()));
        resources.bungee_plugin_yaml(|y| y.main = Some("com.example.Bungee".into()));
        resources.velocity_plugin_json(|j| j.main = Some("com.example.Velocity".into()));
        resources.fabric_mod_json(|j| {
            j.main_entrypoint("com.example.Fabric");
        });
        resources.neoforge_mods_toml(|t| {
            t.mit_license().convention_mod(None, |_| {});
        });

        let listing: Vec<String> = resources
            .registered_factories()
            .iter()
            .map(ToString::to_string)
            .collect();
        assert_eq!(listing.len(), 6);
        assert!(listing[0].contains("path=paper-plugin.yml"));
        assert!(listing[5].contains("path=META-INF/neoforge.mods.toml"));

        let out = tempfile::tempdir().unwrap();
        ExecuteResourceFactories::new(resources.into_factories(), out.path())
            .run()
            .unwrap();

        let fabric: Value =
            serde_json::from_str(&fs::read_to_string(out.path().join("fabric.mod.json")).unwrap())
                .unwrap();
        assert_eq!(fabric["id"], "example-mod");
        assert_eq!(fabric["version"], "1.2.3");

        let neoforge: toml::Value = toml::from_str(
            &fs::read_to_string(out.path().join("META-INF/neoforge.mods.toml")).unwrap(),
        )
        .unwrap();
        assert_eq!(neoforge["mods"][0]["modId"].as_str(), Some("example_mod"));

        let bungee: serde_yaml::Value =
            serde_yaml::from_str(&fs::read_to_string(out.path().join("bungee.yml")).unwrap())
                .unwrap();
        assert_eq!(bungee["description"].as_str(), Some("An example"));
    }

    #[test]
    fn returned_model_is_a_copy() {
        let mut resources = extension();
        let mut model = resources.bukkit_plugin_yaml(|y| y.main = Some("com.example.Main".into()));
        model.main = Some("com.example.Changed".into());

        let out = tempfile::tempdir().unwrap();
        ExecuteResourceFactories::new(resources.into_factories(), out.path())
            .run()
            .unwrap();
        let text = fs::read_to_string(out.path().join("plugin.yml")).unwrap();
        assert!(text.contains("main: com.example.Main\n"), "{text}");
    }

    #[test]
    fn creates_ad_hoc_factories() {
        let mut resources = ResourceFactoryExtension::default();
        resources
            .create_factory::<SimpleFactory>(|f| {
                f.set_path("data/defaults.json")
                    .json()
                    .set_value(simple_custom_value_list(vec!["a", "b"]));
            })
            .create_factory_with::<SimpleFactory, _>(
                ("data/defaults.json", ConstantValueProvider(json!({"x": 1}))),
                |f| {
                    f.json().set_duplicates_mode(DuplicatesMode::Ignore);
                },
            );

        let out = tempfile::tempdir().unwrap();
        ExecuteResourceFactories::new(resources.into_factories(), out.path())
            .run()
            .unwrap();
        let text = fs::read_to_string(out.path().join("data/defaults.json")).unwrap();
        assert_eq!(text, "{\n  \"x\": 1\n}\n");
    }
}
