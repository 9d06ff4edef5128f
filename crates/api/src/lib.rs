//! Resource Factory API
//!
//! Building blocks for generating structured resource files (YAML, JSON, TOML) from
//! typed values at build time. Manifest generators and ad hoc factories are both
//! built from the pieces in this crate.
//!
//! ## Modules
//!
//! - [`factory`] - [`ResourceFactory`] and the single-file/node refinements, plus [`SimpleFactory`]
//! - [`format`] - Format writers selected through [`LoaderFactory`]
//! - [`value`] - [`ValueProvider`], the source of a factory's root node
//! - [`custom`] - [`CustomValue`] for attaching arbitrary data to documents
//! - [`validate`] - [`Pattern`] constraints on identifiers
//! - [`normalize`] - Collapsing empty collections to absent values
//! - [`encoding`] - Output-only value encodings
//! - [`error`] - [`FactoryError`] and friends
//!
//! ## Example
//!
//! ```rust
//! use resource_factory_api::{ConstantValueProvider, ResourceFactory, SimpleFactory};
//!
//! let mut factory = SimpleFactory::default();
//! factory
//!     .set_path("x.yml")
//!     .set_value(ConstantValueProvider(serde_json::json!({"greeting": "hello"})));
//!
//! let out = tempfile::tempdir().unwrap();
//! factory.generate(out.path()).unwrap();
//! let text = std::fs::read_to_string(out.path().join("x.yml")).unwrap();
//! assert_eq!(text, "greeting: hello\n");
//! ```

pub mod custom;
pub mod encoding;
pub mod error;
pub mod factory;
pub mod format;
pub mod normalize;
pub mod validate;
pub mod value;

pub use custom::{
    complex_custom_value, simple_custom_value, simple_custom_value_list,
    simple_custom_value_map, typed_complex_custom_value, typed_simple_custom_value, CustomValue,
    CustomValues, TypeHint, TypeHinted,
};
pub use encoding::{WriteOnly, WriteOnlyEncoding};
pub use error::{FactoryError, FactoryResult, SerializationError, ValidationError};
pub use factory::{
    DuplicatesMode, NodeResourceFactory, ResourceFactory, ResourceFactoryProvider,
    SimpleFactory, SingleFileResourceFactory,
};
pub use format::{Format, JsonOptions, LoaderFactory, NodeStyle, TomlOptions, YamlOptions};
pub use normalize::NullIfEmpty;
pub use validate::{validate, validate_all, Pattern};
pub use value::{ConstantValueProvider, ValueProvider};
