//! Batch execution of resource factories.
//!
//! A batch owns its output directory: the directory is wiped and recreated before
//! the first factory runs, then every factory generates into it in list order. The
//! first failure stops the batch and is reported together with the full factory
//! listing, which is usually what is needed to find a duplicate registration.

use std::fmt::Write as _;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use resource_factory_api::{FactoryError, FactoryResult, ResourceFactory};

/// An ordered list of factories bound to one output directory.
#[derive(Debug)]
pub struct ExecuteResourceFactories {
    factories: Vec<Box<dyn ResourceFactory>>,
    output_dir: PathBuf,
}

impl ExecuteResourceFactories {
    pub fn new(factories: Vec<Box<dyn ResourceFactory>>, output_dir: impl Into<PathBuf>) -> Self {
        Self {
            factories,
            output_dir: output_dir.into(),
        }
    }

    pub fn factories(&self) -> &[Box<dyn ResourceFactory>] {
        &self.factories
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Reset the output directory and run every factory into it.
    pub fn run(&self) -> FactoryResult<()> {
        info!(
            "Generating {} resource(s) into {}",
            self.factories.len(),
            self.output_dir.display()
        );
        reset_dir(&self.output_dir)?;

        for (index, factory) in self.factories.iter().enumerate() {
            debug!("Running factory {index} {factory}");
            if let Err(err) = factory.generate(&self.output_dir) {
                return Err(FactoryError::Batch {
                    index,
                    factory: factory.to_string(),
                    message: err.to_string(),
                    listing: listing(&self.factories),
                    source: Box::new(err),
                });
            }
        }

        info!("Generated resources in {}", self.output_dir.display());
        Ok(())
    }
}

fn reset_dir(dir: &Path) -> io::Result<()> {
    match fs::remove_dir_all(dir) {
        Ok(()) => {}
        Err(err) if err.kind() == io::ErrorKind::NotFound => {}
        Err(err) => return Err(err),
    }
    fs::create_dir_all(dir)
}

/// One ` <index>. <factory>` line per factory.
pub fn listing(factories: &[Box<dyn ResourceFactory>]) -> String {
    let mut out = String::new();
    for (index, factory) in factories.iter().enumerate() {
        let _ = writeln!(out, " {index}. {factory}");
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use resource_factory_api::{ConstantValueProvider, DuplicatesMode, SimpleFactory};
    use serde_json::json;
    use std::collections::BTreeMap;

    fn yaml_factory(path: &str, value: serde_json::Value) -> SimpleFactory {
        let mut factory = SimpleFactory::default();
        factory.set_path(path).set_value(ConstantValueProvider(value));
        factory
    }

    fn snapshot(dir: &Path) -> BTreeMap<PathBuf, Vec<u8>> {
        let mut files = BTreeMap::new();
        let mut pending = vec![dir.to_path_buf()];
        while let Some(current) = pending.pop() {
            for entry in fs::read_dir(&current).unwrap() {
                let path = entry.unwrap().path();
                if path.is_dir() {
                    pending.push(path);
                } else {
                    let relative = path.strip_prefix(dir).unwrap().to_path_buf();
                    files.insert(relative, fs::read(&path).unwrap());
                }
            }
        }
        files
    }

    #[test]
    fn collision_fails_at_second_index() {
        let out = tempfile::tempdir().unwrap();
        let batch = ExecuteResourceFactories::new(
            vec![
                Box::new(yaml_factory("x.yml", json!({"a": 1}))),
                Box::new(yaml_factory("x.yml", json!({"b": 2}))),
            ],
            out.path(),
        );

        let err = batch.run().unwrap_err();
        let message = err.to_string();
        assert!(matches!(err, FactoryError::Batch { index: 1, .. }));
        assert!(matches!(err.root_cause(), FactoryError::PathCollision { .. }));
        assert!(message.starts_with("Exception executing factory 1 SimpleResourceFactory(path=x.yml"));
        assert!(message.contains("already exists"), "{message}");
        assert!(message.contains("Factories:\n 0. SimpleResourceFactory(path=x.yml"), "{message}");
        assert!(message.contains("\n 1. SimpleResourceFactory(path=x.yml"), "{message}");
        // The first factory's output survives the failed batch.
        assert_eq!(fs::read_to_string(out.path().join("x.yml")).unwrap(), "a: 1\n");
    }

    #[test]
    fn ignore_mode_overwrites() {
        let out = tempfile::tempdir().unwrap();
        let mut second = yaml_factory("x.yml", json!({"b": 2}));
        second.set_duplicates_mode(DuplicatesMode::Ignore);
        ExecuteResourceFactories::new(
            vec![Box::new(yaml_factory("x.yml", json!({"a": 1}))), Box::new(second)],
            out.path(),
        )
        .run()
        .unwrap();

        assert_eq!(fs::read_to_string(out.path().join("x.yml")).unwrap(), "b: 2\n");
    }

    #[test]
    fn repeated_runs_are_identical() {
        let out = tempfile::tempdir().unwrap();
        let dir = out.path().join("generated");
        let batch = ExecuteResourceFactories::new(
            vec![
                Box::new(yaml_factory("a.yml", json!({"list": [1, 2]}))),
                Box::new(yaml_factory("nested/b.yml", json!({"key": "value"}))),
            ],
            &dir,
        );

        batch.run().unwrap();
        let first = snapshot(&dir);
        // Stale files from outside the batch are removed by the reset.
        fs::write(dir.join("stale.txt"), "stale").unwrap();
        batch.run().unwrap();
        assert_eq!(first, snapshot(&dir));
        assert_eq!(first.len(), 2);
    }

    #[test]
    fn missing_output_dir_is_created() {
        let out = tempfile::tempdir().unwrap();
        let dir = out.path().join("does/not/exist");
        ExecuteResourceFactories::new(Vec::new(), &dir).run().unwrap();
        assert!(dir.is_dir());
    }
}
