//! Shared test utilities for the synclocal workspace.
//!
//! This crate provides standardised test fixtures to eliminate duplication
//! across crate test suites. It is a dev-dependency only, never published.
//!
//! # Modules
//!
//! - [`workspace`]: [`TestWorkspace`] scratch directory with source and
//!   destination file helpers

pub mod workspace;

pub use workspace::TestWorkspace;
