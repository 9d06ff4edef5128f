//! Resource Factory Core Library
//!
//! Manifest generators for Minecraft server plugins and mod loaders, built on the
//! factory abstractions of `resource_factory_api`.
//!
//! ## Architecture
//!
//! - [`manifests`] - Paper, Bukkit, BungeeCord, Velocity, Fabric and NeoForge models
//! - [`project`] - Project metadata and the conventions manifests take from it
//! - [`extension`] - Registration surface collecting factories for a source set
//! - [`execution`] - Batch executor with collision detection and diagnostics
//! - [`configs`] - Declarative build description (`resource-factory.yml`)
//! - [`manager`] - Loads a description and plans or generates its source sets
//! - [`results`] - Result types for manager operations
//! - [`types`] - Common error types and type aliases
//!
//! ## Usage
//!
//! ```rust
//! use resource_factory_core::execution::ExecuteResourceFactories;
//! use resource_factory_core::extension::ResourceFactoryExtension;
//! use resource_factory_core::project::ProjectMeta;
//!
//! let mut resources = ResourceFactoryExtension::new(Some(ProjectMeta::new("example").with_version("1.0")));
//! resources.paper_plugin_yaml(|yaml| {
//!     yaml.api_version = Some("1.20".into());
//!     yaml.main = Some("com.example.ExamplePlugin".into());
//! });
//!
//! let out = tempfile::tempdir().unwrap();
//! ExecuteResourceFactories::new(resources.into_factories(), out.path()).run().unwrap();
//! assert!(out.path().join("paper-plugin.yml").exists());
//! ```

pub mod configs;
pub mod execution;
pub mod extension;
pub mod manager;
pub mod manifests;
pub mod project;
pub mod results;
pub mod types;

pub use types::{BuildError, BuildResult};
pub use manager::{ResourceFactoryManager, ResourceFactoryManagerConfig};
