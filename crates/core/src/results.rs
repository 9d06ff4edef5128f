//! Result types returned by [`crate::manager::ResourceFactoryManager`].

use std::path::PathBuf;

/// The factories registered on one source set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceSetPlan {
    pub name: String,
    pub output_dir: PathBuf,
    /// Factory descriptions in execution order.
    pub factories: Vec<String>,
}

/// Files written for one source set, relative to its output directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerateResult {
    pub source_set: String,
    pub output_dir: PathBuf,
    pub files: Vec<PathBuf>,
}
