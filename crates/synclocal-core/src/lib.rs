//! Conditional sync engines for synclocal
//!
//! This crate keeps a local file in sync with either another local file or
//! an HTTP(S) URL:
//!
//! - **Local Copy Engine**: fingerprint comparison, copy on change, permission
//!   reconciliation
//! - **Remote Fetch Engine**: conditional GET with cached validators,
//!   single-pass download and fingerprint, response classification
//! - **Resources**: Create/Read/Update/Delete and change planning over typed
//!   configuration and state
//! - **State store**: persisted identities and computed attributes
//!
//! # Architecture
//!
//! ```text
//!              synclocal-cli
//!                   |
//!             synclocal-core
//!        resource / state / diagnostics
//!          |                     |
//!     local engine         remote engine
//!          \                     /
//!              synclocal-fs
//!   identity / fingerprint / mode / writes
//! ```

pub mod backing;
pub mod diagnostics;
pub mod error;
pub mod local;
pub mod remote;
pub mod resource;
pub mod state;

pub use diagnostics::{Diagnostic, Severity, has_error};
pub use error::{Error, HttpFailure, Result};
pub use local::{CopyOutcome, FileTarget, LocalCopyEngine};
pub use remote::{CachedMetadata, FetchOutcome, ProbeOutcome, RemoteFetchEngine, UrlTarget};
pub use resource::{Change, FileResource, FileState, UrlResource, UrlState};
pub use state::{ResourceState, StateEntry, StateFile};
