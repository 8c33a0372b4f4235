//! Module source providers.
//!
//! The bundler never touches the filesystem itself; it asks a
//! [`ModuleSource`] for the text behind a dotted module name.

use crate::errors::{MinifyError, Result};
use rustc_hash::FxHashMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// Source text of one module plus where it came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadedModule {
    pub path: PathBuf,
    pub source: String,
}

pub trait ModuleSource {
    /// Load the module named `name` (e.g. `net.http`).
    fn load(&self, name: &str) -> Result<LoadedModule>;
}

/// `a.b.c` with extension `lua` becomes `a/b/c.lua`.
pub fn module_path(name: &str, extension: &str) -> PathBuf {
    let mut path: PathBuf = name.split('.').collect();
    path.set_extension(extension);
    path
}

/// Resolves module names against a directory on disk.
#[derive(Debug, Clone)]
pub struct FsModuleSource {
    root: PathBuf,
    extension: String,
}

impl FsModuleSource {
    pub fn new(root: impl Into<PathBuf>, extension: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            extension: extension.into(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn path_for(&self, name: &str) -> PathBuf {
        self.root.join(module_path(name, &self.extension))
    }
}

impl ModuleSource for FsModuleSource {
    fn load(&self, name: &str) -> Result<LoadedModule> {
        let path = self.path_for(name);
        match std::fs::read_to_string(&path) {
            Ok(source) => Ok(LoadedModule { path, source }),
            Err(e) if e.kind() == ErrorKind::NotFound => Err(MinifyError::ModuleNotFound {
                name: name.to_string(),
                path,
            }),
            Err(e) => Err(MinifyError::Io(e)),
        }
    }
}

/// In-memory modules, keyed by dotted name.
#[derive(Debug, Clone)]
pub struct MemoryModuleSource {
    modules: FxHashMap<String, String>,
    extension: String,
}

impl MemoryModuleSource {
    pub fn new() -> Self {
        Self {
            modules: FxHashMap::default(),
            extension: "lua".to_string(),
        }
    }

    pub fn with_module(mut self, name: impl Into<String>, source: impl Into<String>) -> Self {
        self.insert(name, source);
        self
    }

    pub fn insert(&mut self, name: impl Into<String>, source: impl Into<String>) {
        self.modules.insert(name.into(), source.into());
    }
}

impl Default for MemoryModuleSource {
    fn default() -> Self {
        Self::new()
    }
}

impl ModuleSource for MemoryModuleSource {
    fn load(&self, name: &str) -> Result<LoadedModule> {
        let path = module_path(name, &self.extension);
        match self.modules.get(name) {
            Some(source) => Ok(LoadedModule {
                path,
                source: source.clone(),
            }),
            None => Err(MinifyError::ModuleNotFound {
                name: name.to_string(),
                path,
            }),
        }
    }
}
