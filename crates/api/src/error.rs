//! Error types shared by every resource factory.
//!
//! The taxonomy is flat on purpose: every failure in this subsystem is fatal for
//! the build that triggered it, so the only job of these types is to carry enough
//! context for a user to find the misconfiguration.
//!
//! - [`ValidationError`] - a field failed its pattern or a required field is missing
//! - [`SerializationError`] - a format writer or value encoder rejected the data
//! - [`FactoryError`] - the umbrella type returned by every factory operation

use std::path::PathBuf;

use thiserror::Error;

/// A configured value does not satisfy the model's constraints.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// The value does not fully match the required pattern.
    #[error("Invalid {description} '{value}', must match pattern '{pattern}'.")]
    InvalidValue {
        description: String,
        value: String,
        pattern: String,
    },

    /// A required field was never set.
    #[error("Missing required value for {field}")]
    MissingField { field: String },

    /// A constraint's regular expression does not compile.
    #[error("Invalid pattern '{pattern}': {message}")]
    InvalidPattern { pattern: String, message: String },
}

impl ValidationError {
    /// Shorthand for [`ValidationError::MissingField`].
    pub fn missing(field: impl Into<String>) -> Self {
        Self::MissingField {
            field: field.into(),
        }
    }
}

/// A value could not be turned into the bytes of an output file.
#[derive(Debug, Error)]
pub enum SerializationError {
    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML serialization error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("TOML serialization error: {0}")]
    Toml(#[from] toml::ser::Error),

    /// Attempted to read a type that only has an output encoding.
    #[error("{type_name} can only be serialized, deserialization is not supported")]
    WriteOnly { type_name: &'static str },

    /// A custom value resolved to a shape that contradicts its type hint.
    #[error("Cannot map custom value '{key}': expected {expected}, found {found}")]
    UnmappableCustomValue {
        key: String,
        expected: String,
        found: String,
    },
}

/// The error type returned by resource factories and the batch executor.
#[derive(Debug, Error)]
pub enum FactoryError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("File '{}' already exists, did another factory create it?", path.display())]
    PathCollision { path: PathBuf },

    #[error(transparent)]
    Serialization(#[from] SerializationError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// A factory inside a batch failed; carries the full batch listing.
    #[error("Exception executing factory {index} {factory}: {message}\nFactories:\n{listing}")]
    Batch {
        index: usize,
        factory: String,
        message: String,
        listing: String,
        #[source]
        source: Box<FactoryError>,
    },
}

impl FactoryError {
    /// The innermost error, looking through batch wrappers.
    pub fn root_cause(&self) -> &FactoryError {
        match self {
            Self::Batch { source, .. } => source.root_cause(),
            other => other,
        }
    }
}

impl From<serde_json::Error> for FactoryError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(SerializationError::Json(err))
    }
}

/// Result type alias for factory operations
pub type FactoryResult<T> = Result<T, FactoryError>;
