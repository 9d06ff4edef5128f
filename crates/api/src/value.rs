//! Values that can be rendered into a document node.

use serde_json::Value;

use crate::custom::CustomValue;
use crate::error::FactoryResult;

/// Something that produces the root node of a generated document.
///
/// Manifest models implement this by building their validated projection, so
/// validation happens when the node is requested, not when the model is configured.
pub trait ValueProvider: Send + Sync {
    /// Build the serializable node.
    fn as_config_serializable(&self) -> FactoryResult<Value>;

    /// Short description used in factory listings.
    fn describe(&self) -> String;
}

/// A provider returning a fixed node.
#[derive(Debug, Clone, PartialEq)]
pub struct ConstantValueProvider(pub Value);

impl ValueProvider for ConstantValueProvider {
    fn as_config_serializable(&self) -> FactoryResult<Value> {
        Ok(self.0.clone())
    }

    fn describe(&self) -> String {
        self.0.to_string()
    }
}

impl ValueProvider for CustomValue {
    fn as_config_serializable(&self) -> FactoryResult<Value> {
        self.resolve_checked("<root>")
    }

    fn describe(&self) -> String {
        CustomValue::describe(self)
    }
}
