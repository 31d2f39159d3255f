//! Resource discovery: where candidate resources come from.
//!
//! Providers produce unclassified [`Resource`]s; the locator decides which
//! of them are usable. Discovery order is deterministic so downstream
//! precedence ties resolve the same way on every run.

use std::path::PathBuf;
use std::sync::Arc;

use regex::Regex;

use crate::{error::Error, options::validate_collection, resource::Resource};

/// A source of candidate localization resources.
pub trait ResourceProvider: Send + Sync {
    /// Enumerates candidate resources in a stable order.
    fn resources(&self) -> Result<Vec<Resource>, Error>;
}

/// Discovers resources by scanning one directory, non-recursively.
#[derive(Debug, Clone)]
pub struct FileResourceProvider {
    directory: PathBuf,
}

impl FileResourceProvider {
    /// The directory must exist up front; a missing directory is caller
    /// misconfiguration, not an empty source.
    pub fn new(directory: impl Into<PathBuf>) -> Result<Self, Error> {
        let directory = directory.into();
        if !directory.is_dir() {
            return Err(Error::configuration_error(format!(
                "file resources directory does not exist: {}",
                directory.display()
            )));
        }
        Ok(FileResourceProvider { directory })
    }

    pub fn directory(&self) -> &std::path::Path {
        &self.directory
    }
}

impl ResourceProvider for FileResourceProvider {
    fn resources(&self) -> Result<Vec<Resource>, Error> {
        let mut paths = Vec::new();
        for entry in std::fs::read_dir(&self.directory).map_err(Error::Io)? {
            let entry = entry.map_err(Error::Io)?;
            let path = entry.path();
            if path.is_file() {
                paths.push(path);
            }
        }
        // read_dir order is platform-dependent; sort by path for stable
        // discovery order.
        paths.sort();
        Ok(paths.into_iter().map(Resource::file).collect())
    }
}

/// Discovers resources among registered in-memory blobs, filtered by
/// caller-supplied regex patterns over resource names.
#[derive(Debug)]
pub struct EmbeddedResourceProvider {
    patterns: Vec<Regex>,
    registered: Vec<(String, Arc<[u8]>)>,
}

impl EmbeddedResourceProvider {
    /// Compiles the name patterns. Blank or duplicate patterns, and patterns
    /// that fail to compile, are rejected.
    pub fn new(patterns: &[String]) -> Result<Self, Error> {
        validate_collection("embedded resource patterns", patterns)?;
        let mut compiled = Vec::with_capacity(patterns.len());
        for pattern in patterns {
            let regex = Regex::new(pattern).map_err(|err| {
                Error::configuration_error(format!(
                    "invalid embedded resource pattern {:?}: {}",
                    pattern, err
                ))
            })?;
            compiled.push(regex);
        }
        Ok(EmbeddedResourceProvider {
            patterns: compiled,
            registered: Vec::new(),
        })
    }

    /// Registers a named blob. Registration order is the discovery order.
    pub fn register(&mut self, name: impl Into<String>, bytes: impl Into<Arc<[u8]>>) -> &mut Self {
        self.registered.push((name.into(), bytes.into()));
        self
    }

    fn matches(&self, name: &str) -> bool {
        self.patterns.iter().any(|regex| regex.is_match(name))
    }
}

impl ResourceProvider for EmbeddedResourceProvider {
    fn resources(&self) -> Result<Vec<Resource>, Error> {
        Ok(self
            .registered
            .iter()
            .filter(|(name, _)| self.matches(name))
            .map(|(name, bytes)| Resource::embedded(name.clone(), bytes.clone()))
            .collect())
    }
}
