//! State store
//!
//! Resource identities and computed attributes persist between runs in a
//! JSON file. Reads take a shared advisory lock; writes go through a temp
//! file and rename under an exclusive lock.

use chrono::{DateTime, Utc};
use fs2::FileExt;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use synclocal_fs::{NormalizedPath, ResourceId, io};

use crate::local::FileTarget;
use crate::remote::UrlTarget;
use crate::resource::{FileState, UrlState};
use crate::{Error, Result};

/// Current state file format version
pub const STATE_VERSION: &str = "1";

/// Default state file name, placed next to the manifest
pub const DEFAULT_STATE_FILE: &str = "synclocal.state.json";

/// Configuration and state of one resource, tagged by kind
///
/// The configuration is kept so the next plan can tell which fields changed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum ResourceState {
    File { target: FileTarget, state: FileState },
    Url { target: UrlTarget, state: UrlState },
}

impl ResourceState {
    pub fn id(&self) -> &ResourceId {
        match self {
            Self::File { state, .. } => &state.id,
            Self::Url { state, .. } => &state.id,
        }
    }

    pub fn content_sha256(&self) -> &str {
        match self {
            Self::File { state, .. } => &state.content_sha256,
            Self::Url { state, .. } => &state.content_sha256,
        }
    }

    /// `"file"` or `"url"`
    pub fn kind(&self) -> &'static str {
        match self {
            Self::File { .. } => "file",
            Self::Url { .. } => "url",
        }
    }
}

/// A stored resource with the time it was last synced
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateEntry {
    pub resource: ResourceState,
    pub synced_at: DateTime<Utc>,
}

impl StateEntry {
    pub fn new(resource: ResourceState) -> Self {
        Self {
            resource,
            synced_at: Utc::now(),
        }
    }
}

/// All stored resources, keyed by manifest name
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateFile {
    version: String,
    #[serde(default)]
    resources: BTreeMap<String, StateEntry>,
}

impl Default for StateFile {
    fn default() -> Self {
        Self::new()
    }
}

impl StateFile {
    /// Create an empty state
    pub fn new() -> Self {
        Self {
            version: STATE_VERSION.to_string(),
            resources: BTreeMap::new(),
        }
    }

    /// Load state with a shared lock. A missing file is an empty state.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or locked, does not parse,
    /// or has an unknown version.
    pub fn load(path: &Path) -> Result<Self> {
        let file = match File::open(path) {
            Ok(file) => file,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Self::new()),
            Err(e) => return Err(synclocal_fs::Error::io(path, e).into()),
        };
        FileExt::lock_shared(&file).map_err(|_| synclocal_fs::Error::LockFailed {
            path: path.to_path_buf(),
        })?;

        // Read through the locked handle
        let mut content = String::new();
        (&file).read_to_string(&mut content)?;
        let state: StateFile = serde_json::from_str(&content)?;

        if state.version != STATE_VERSION {
            return Err(Error::State {
                message: format!(
                    "unsupported state version {:?} in {}",
                    state.version,
                    path.display()
                ),
            });
        }
        Ok(state)
    }

    /// Save state atomically.
    pub fn save(&self, path: &Path) -> Result<()> {
        let mut content = serde_json::to_string_pretty(self)?;
        content.push('\n');
        io::write_atomic(&NormalizedPath::new(path), content.as_bytes())?;
        Ok(())
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn get(&self, name: &str) -> Option<&StateEntry> {
        self.resources.get(name)
    }

    /// Record a resource, stamping it with the current time.
    pub fn insert(&mut self, name: impl Into<String>, resource: ResourceState) {
        self.resources.insert(name.into(), StateEntry::new(resource));
    }

    pub fn remove(&mut self, name: &str) -> Option<StateEntry> {
        self.resources.remove(name)
    }

    /// Stored resources in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &StateEntry)> {
        self.resources.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn names(&self) -> Vec<String> {
        self.resources.keys().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.resources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.resources.is_empty()
    }
}
