//! Resource lifecycle
//!
//! [`FileResource`] and [`UrlResource`] wrap the two engines with the
//! Create/Read/Update/Delete contract a lifecycle driver expects: typed
//! configuration in, a state record with a [`ResourceId`] and computed
//! attributes out.

use serde::{Deserialize, Serialize};
use tracing::debug;

use synclocal_fs::{FileMode, ResourceId};

use crate::backing;
use crate::local::{FileTarget, LocalCopyEngine};
use crate::remote::{CachedMetadata, FetchOutcome, RemoteFetchEngine, UrlTarget};
use crate::Result;

/// Planned action for one resource
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Change {
    /// No prior state: the resource will be created
    Create,
    /// Nothing to do
    NoOp,
    /// Converge in place
    Update,
    /// Destroy and create again
    Replace,
}

impl std::fmt::Display for Change {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Create => write!(f, "create"),
            Self::NoOp => write!(f, "no-op"),
            Self::Update => write!(f, "update"),
            Self::Replace => write!(f, "replace"),
        }
    }
}

/// Stored state of a local file resource
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileState {
    pub id: ResourceId,
    pub content_sha256: String,
}

/// Stored state of a URL resource
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UrlState {
    pub id: ResourceId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub etag: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_modified: Option<String>,
    pub content_sha256: String,
}

impl UrlState {
    /// Validators to send with the next request.
    pub fn cached_metadata(&self) -> CachedMetadata {
        CachedMetadata::new(self.etag.clone(), self.last_modified.clone())
    }
}

/// A destination kept in sync with a local source file.
#[derive(Debug, Clone, Copy, Default)]
pub struct FileResource {
    engine: LocalCopyEngine,
}

impl FileResource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy the source into place and assign the identity.
    pub fn create(&self, target: &FileTarget) -> Result<FileState> {
        let outcome = self.engine.ensure_copy(target)?;
        let id = ResourceId::from_file(&target.destination)?;
        Ok(FileState {
            id,
            content_sha256: outcome.content_sha256,
        })
    }

    /// Refresh the fingerprint from disk.
    ///
    /// Returns `None` when the backing file is gone and the resource should
    /// be forgotten.
    pub fn read(&self, state: &FileState) -> Result<Option<FileState>> {
        let Some(content_sha256) = backing::fingerprint(&state.id)? else {
            debug!(id = %state.id, "Backing file missing, clearing identity");
            return Ok(None);
        };
        Ok(Some(FileState {
            id: state.id.clone(),
            content_sha256,
        }))
    }

    /// Converge in place, then read back.
    pub fn update(&self, target: &FileTarget, state: &FileState) -> Result<Option<FileState>> {
        self.engine.ensure_copy(target)?;
        self.read(state)
    }

    pub fn delete(&self, state: &FileState) -> Result<()> {
        backing::delete(&state.id)
    }

    /// Decide what applying `target` would do.
    ///
    /// A new destination means a new identity, so it replaces the resource.
    /// Drift between source and destination, or a new source or mode, is an
    /// in-place update.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the source does not exist.
    pub fn plan(&self, prior: Option<(&FileTarget, &FileState)>, target: &FileTarget) -> Result<Change> {
        let Some((prior, _)) = prior else {
            return Ok(Change::Create);
        };
        if prior.destination != target.destination {
            return Ok(Change::Replace);
        }
        if self.engine.needs_copy(target)?
            || prior.source != target.source
            || prior.file_mode != target.file_mode
        {
            return Ok(Change::Update);
        }
        Ok(Change::NoOp)
    }
}

/// A destination downloaded from a URL.
///
/// There is no in-place update: every configuration change replaces the
/// resource.
#[derive(Debug, Clone)]
pub struct UrlResource {
    engine: RemoteFetchEngine,
}

impl UrlResource {
    pub fn new(engine: RemoteFetchEngine) -> Self {
        Self { engine }
    }

    /// Download the URL and assign the identity.
    pub fn create(&self, target: &UrlTarget) -> Result<UrlState> {
        let id = ResourceId::from_file(&target.filename)?;
        match self.engine.fetch(target, &CachedMetadata::default())? {
            FetchOutcome::Downloaded {
                metadata,
                content_sha256,
                ..
            } => Ok(UrlState {
                id,
                etag: metadata.etag().map(str::to_string),
                last_modified: metadata.last_modified().map(str::to_string),
                content_sha256,
            }),
            // Unconditional request answered with 304: keep what is on disk
            FetchOutcome::NotModified => {
                let content_sha256 = backing::fingerprint(&id)?.unwrap_or_default();
                Ok(UrlState {
                    id,
                    etag: None,
                    last_modified: None,
                    content_sha256,
                })
            }
        }
    }

    /// Check that the backing file still exists. No request is made.
    pub fn read(&self, state: &UrlState) -> Result<Option<UrlState>> {
        if !backing::exists(&state.id)? {
            debug!(id = %state.id, "Backing file missing, clearing identity");
            return Ok(None);
        }
        Ok(Some(state.clone()))
    }

    /// Conditional re-download using the stored validators.
    ///
    /// A 304 returns the state unchanged; a 200 replaces the file, the
    /// validators and the fingerprint.
    pub fn refresh(&self, target: &UrlTarget, state: &UrlState) -> Result<UrlState> {
        match self.engine.fetch(target, &state.cached_metadata())? {
            FetchOutcome::NotModified => Ok(state.clone()),
            FetchOutcome::Downloaded {
                metadata,
                content_sha256,
                ..
            } => Ok(UrlState {
                id: state.id.clone(),
                etag: metadata.etag().map(str::to_string),
                last_modified: metadata.last_modified().map(str::to_string),
                content_sha256,
            }),
        }
    }

    pub fn delete(&self, state: &UrlState) -> Result<()> {
        backing::delete(&state.id)
    }

    /// Decide what applying `target` would do.
    ///
    /// Every field determines the identity, so any change replaces the
    /// resource. An invalid mode is reported here rather than at apply time.
    pub fn plan(&self, prior: Option<(&UrlTarget, &UrlState)>, target: &UrlTarget) -> Result<Change> {
        FileMode::parse_optional(target.file_mode.as_deref())?;
        match prior {
            None => Ok(Change::Create),
            Some((prior, _)) if prior != target => Ok(Change::Replace),
            Some(_) => Ok(Change::NoOp),
        }
    }

    /// The engine, for metadata probes.
    pub fn engine(&self) -> &RemoteFetchEngine {
        &self.engine
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use synclocal_fs::compute_content_checksum;
    use synclocal_test_utils::TestWorkspace;

    fn file_target(ws: &TestWorkspace) -> FileTarget {
        FileTarget::new(ws.path("source"), ws.path("dest"))
    }

    #[test]
    fn change_display() {
        assert_eq!(Change::NoOp.to_string(), "no-op");
        assert_eq!(Change::Replace.to_string(), "replace");
    }

    #[test]
    fn file_create_sets_identity_and_fingerprint() {
        let ws = TestWorkspace::new();
        ws.write("source", "foo");

        let state = FileResource::new().create(&file_target(&ws)).unwrap();

        assert!(state.id.as_str().starts_with("file://"));
        assert!(state.id.as_str().ends_with("/dest"));
        assert_eq!(state.content_sha256, compute_content_checksum(b"foo"));
    }

    #[test]
    fn file_read_clears_missing_resource() {
        let ws = TestWorkspace::new();
        ws.write("source", "foo");
        let resource = FileResource::new();
        let state = resource.create(&file_target(&ws)).unwrap();

        std::fs::remove_file(ws.path("dest")).unwrap();

        assert_eq!(resource.read(&state).unwrap(), None);
    }

    #[test]
    fn file_plan_classifies_changes() {
        let ws = TestWorkspace::new();
        ws.write("source", "foo");
        let resource = FileResource::new();
        let target = file_target(&ws);

        assert_eq!(resource.plan(None, &target).unwrap(), Change::Create);

        let state = resource.create(&target).unwrap();
        let prior = Some((&target, &state));
        assert_eq!(resource.plan(prior, &target).unwrap(), Change::NoOp);

        let moved = FileTarget::new(ws.path("source"), ws.path("elsewhere"));
        assert_eq!(resource.plan(prior, &moved).unwrap(), Change::Replace);

        let remoded = target.clone().with_mode("0600");
        assert_eq!(resource.plan(prior, &remoded).unwrap(), Change::Update);

        ws.write("dest", "drifted");
        assert_eq!(resource.plan(prior, &target).unwrap(), Change::Update);
    }

    #[test]
    fn url_plan_replaces_on_any_change() {
        let resource = UrlResource::new(RemoteFetchEngine::new().unwrap());
        let target = UrlTarget::new("https://example.com/a", "/tmp/a");
        let state = UrlState {
            id: ResourceId::from("file:///tmp/a"),
            etag: None,
            last_modified: None,
            content_sha256: String::new(),
        };
        let prior = Some((&target, &state));

        assert_eq!(resource.plan(None, &target).unwrap(), Change::Create);
        assert_eq!(resource.plan(prior, &target).unwrap(), Change::NoOp);
        assert_eq!(
            resource
                .plan(prior, &target.clone().with_header("X-Key", "1"))
                .unwrap(),
            Change::Replace
        );
        assert_eq!(
            resource.plan(prior, &target.clone().with_mode("0644")).unwrap(),
            Change::Replace
        );
        assert!(resource.plan(prior, &target.clone().with_mode("abc")).is_err());
    }
}
