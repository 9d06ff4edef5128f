use resource_factory_api::FactoryError;
use thiserror::Error;

/// The main error type for build operations
#[derive(Debug, Error)]
pub enum BuildError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML parsing error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("TOML parsing error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error(transparent)]
    Factory(#[from] FactoryError),
}

/// Result type alias for build operations
pub type BuildResult<T> = Result<T, BuildError>;
