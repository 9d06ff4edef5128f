//! Manifest models for each supported platform.
//!
//! Every model is plain configuration data: it can be filled in through the Rust
//! API or deserialized from a build description. Rendering goes through
//! [`Manifest::project`], which validates pattern-constrained fields, checks
//! required fields and collapses empty collections before building the document
//! node for the platform's writer.

use serde::Serialize;
use serde_json::Value;

use resource_factory_api::{FactoryResult, LoaderFactory, ResourceFactory, ResourceFactoryProvider};

use crate::project::{Conventional, ProjectMeta, ProjectMetaConventions};

pub mod bukkit;
pub mod bungeecord;
pub mod fabric;
pub mod neoforge;
pub mod paper;
pub mod permission;
pub mod velocity;

pub use bukkit::BukkitPluginYaml;
pub use bungeecord::BungeeCordPluginYaml;
pub use fabric::FabricModJson;
pub use neoforge::NeoForgeModsToml;
pub use paper::PaperPluginYaml;
pub use permission::{Permission, PermissionDefault};
pub use velocity::VelocityPluginJson;

/// A platform manifest model.
pub trait Manifest: ProjectMetaConventions + Clone + std::fmt::Debug + Send + Sync + 'static {
    /// Output path relative to the output directory.
    const FILE_NAME: &'static str;

    /// The writer for this platform's format.
    fn loader() -> LoaderFactory;

    /// Validate and build the document node.
    fn project(&self) -> FactoryResult<Value>;

    /// Short description used in factory listings.
    fn describe(&self) -> String;

    /// Bind this model to its factory, without project conventions.
    fn into_resource_factory(self) -> Box<dyn ResourceFactory> {
        Conventional::new(self, None).resource_factory()
    }

    /// Bind this model to its factory, applying conventions from `meta` at render time.
    fn into_conventional_factory(self, meta: ProjectMeta) -> Box<dyn ResourceFactory> {
        Conventional::new(self, Some(meta)).resource_factory()
    }
}

pub(crate) fn to_node<T: Serialize>(projection: &T) -> FactoryResult<Value> {
    Ok(serde_json::to_value(projection)?)
}

pub(crate) fn describe_named(kind: &str, name: Option<&str>) -> String {
    format!("{kind}(name={})", name.unwrap_or("<unset>"))
}
