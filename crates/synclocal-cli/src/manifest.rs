//! Resource manifest
//!
//! ```toml
//! [[file]]
//! name = "config"
//! source = "./a.txt"
//! destination = "./b.txt"
//! file_mode = "0640"
//!
//! [[url]]
//! name = "download"
//! url = "https://example.com/x"
//! filename = "./x"
//! headers = { Authorization = "Bearer ..." }
//! ```
//!
//! Relative paths are resolved against the manifest's directory.

use serde::Deserialize;
use std::collections::HashSet;
use std::path::{Path, PathBuf};

use synclocal_core::{FileTarget, UrlTarget};
use synclocal_fs::{ConfigStore, NormalizedPath};

use crate::error::{CliError, Result};

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct FileEntry {
    pub name: String,
    #[serde(flatten)]
    pub target: FileTarget,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct UrlEntry {
    pub name: String,
    #[serde(flatten)]
    pub target: UrlTarget,
}

/// Parsed manifest
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct Manifest {
    #[serde(default, rename = "file")]
    pub files: Vec<FileEntry>,
    #[serde(default, rename = "url")]
    pub urls: Vec<UrlEntry>,
}

/// One manifest entry of either kind
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Entry {
    File(FileTarget),
    Url(UrlTarget),
}

impl Manifest {
    /// Load a manifest, validate names and resolve relative paths.
    ///
    /// The format is chosen by extension.
    pub fn load(path: &Path) -> Result<Self> {
        let mut manifest: Manifest = ConfigStore::new().load(&NormalizedPath::new(path))?;
        manifest.validate(path)?;

        let base = path.parent().unwrap_or(Path::new(""));
        manifest.resolve_paths(base);
        Ok(manifest)
    }

    fn validate(&self, path: &Path) -> Result<()> {
        let mut seen = HashSet::new();
        let names = self
            .files
            .iter()
            .map(|f| &f.name)
            .chain(self.urls.iter().map(|u| &u.name));
        for name in names {
            if name.is_empty() {
                return Err(CliError::invalid_manifest(
                    path,
                    "resource names must not be empty",
                ));
            }
            if !seen.insert(name.as_str()) {
                return Err(CliError::invalid_manifest(
                    path,
                    format!("Duplicate resource name '{}'", name),
                ));
            }
        }
        Ok(())
    }

    fn resolve_paths(&mut self, base: &Path) {
        let resolve = |p: &PathBuf| -> PathBuf {
            if p.is_absolute() {
                p.clone()
            } else {
                base.join(p)
            }
        };
        for entry in &mut self.files {
            entry.target.source = resolve(&entry.target.source);
            entry.target.destination = resolve(&entry.target.destination);
        }
        for entry in &mut self.urls {
            entry.target.filename = resolve(&entry.target.filename);
        }
    }

    /// All entries, files first, in manifest order.
    pub fn entries(&self) -> Vec<(String, Entry)> {
        self.files
            .iter()
            .map(|f| (f.name.clone(), Entry::File(f.target.clone())))
            .chain(
                self.urls
                    .iter()
                    .map(|u| (u.name.clone(), Entry::Url(u.target.clone()))),
            )
            .collect()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.files.iter().any(|f| f.name == name) || self.urls.iter().any(|u| u.name == name)
    }

    pub fn len(&self) -> usize {
        self.files.len() + self.urls.len()
    }
}
