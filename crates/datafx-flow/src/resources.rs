//! Resource lookup for layouts and icons

use std::collections::HashMap;
use std::path::PathBuf;

use datafx_core::prelude::*;

use crate::config::ViewConfiguration;

/// Locates named resources (layouts, icons)
pub trait ResourceLoader {
    fn exists(&self, name: &str) -> bool;

    fn load(&self, name: &str) -> Result<String>;
}

/// Reads resources from files below a base directory
#[derive(Debug, Clone)]
pub struct FsResourceLoader {
    base: PathBuf,
}

impl FsResourceLoader {
    pub fn new(base: impl Into<PathBuf>) -> Self {
        Self { base: base.into() }
    }

    pub fn from_configuration(config: &ViewConfiguration) -> Self {
        Self::new(config.resource_dir.clone())
    }

    fn path(&self, name: &str) -> PathBuf {
        self.base.join(name.trim_start_matches('/'))
    }
}

impl ResourceLoader for FsResourceLoader {
    fn exists(&self, name: &str) -> bool {
        self.path(name).is_file()
    }

    fn load(&self, name: &str) -> Result<String> {
        let path = self.path(name);
        std::fs::read_to_string(&path).map_err(|e| {
            Error::layout(name, format!("can't read {}: {}", path.display(), e))
        })
    }
}

/// In-memory resources, mostly for tests and embedded layouts
#[derive(Debug, Clone, Default)]
pub struct StaticResources {
    entries: HashMap<String, String>,
}

impl StaticResources {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, name: impl Into<String>, content: impl Into<String>) -> Self {
        self.insert(name, content);
        self
    }

    pub fn insert(&mut self, name: impl Into<String>, content: impl Into<String>) {
        self.entries.insert(name.into(), content.into());
    }
}

impl ResourceLoader for StaticResources {
    fn exists(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    fn load(&self, name: &str) -> Result<String> {
        self.entries
            .get(name)
            .cloned()
            .ok_or_else(|| Error::layout(name, "resource not found"))
    }
}
