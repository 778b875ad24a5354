//! Filesystem primitives for synclocal
//!
//! Provides normalized paths, `file://` resource identities, SHA-256 content
//! fingerprints, permission modes and the write operations the sync engines
//! rely on.

pub mod checksum;
pub mod config;
pub mod error;
pub mod identity;
pub mod io;
pub mod mode;
pub mod path;

pub use checksum::{HashingReader, compute_content_checksum, compute_file_checksum};
pub use config::{ConfigStore, Format};
pub use error::{Error, Result};
pub use identity::ResourceId;
pub use mode::FileMode;
pub use path::NormalizedPath;
