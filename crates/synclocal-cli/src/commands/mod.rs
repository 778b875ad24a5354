//! Command implementations for synclocal-cli

pub mod apply;
pub mod destroy;
pub mod plan;
pub mod refresh;

pub use apply::run_apply;
pub use destroy::run_destroy;
pub use plan::run_plan;
pub use refresh::run_refresh;

use colored::Colorize;
use std::path::{Path, PathBuf};

use synclocal_core::{
    Diagnostic, FileResource, RemoteFetchEngine, ResourceState, Severity, UrlResource,
};
use synclocal_core::state::DEFAULT_STATE_FILE;

use crate::error::{CliError, Result};

/// Paths a command works on
#[derive(Debug, Clone)]
pub struct Context {
    pub manifest: PathBuf,
    pub state: PathBuf,
}

impl Context {
    /// Use `state` if given, else the default state file next to the manifest.
    pub fn new(manifest: PathBuf, state: Option<PathBuf>) -> Self {
        let state = state.unwrap_or_else(|| {
            manifest
                .parent()
                .unwrap_or(Path::new(""))
                .join(DEFAULT_STATE_FILE)
        });
        Self { manifest, state }
    }
}

/// Both resource kinds, ready to use
pub struct Resources {
    pub file: FileResource,
    pub url: UrlResource,
}

impl Resources {
    pub fn new() -> Result<Self> {
        Ok(Self {
            file: FileResource::new(),
            url: UrlResource::new(RemoteFetchEngine::new()?),
        })
    }

    /// Delete the file behind a stored resource.
    pub fn delete(&self, resource: &ResourceState) -> synclocal_core::Result<()> {
        match resource {
            ResourceState::File { state, .. } => self.file.delete(state),
            ResourceState::Url { state, .. } => self.url.delete(state),
        }
    }
}

/// Render one diagnostic: `severity: summary`, detail lines indented.
pub fn format_diagnostic(diag: &Diagnostic) -> String {
    let mut out = format!("{}: {}", diag.severity, diag.summary);
    if let Some(detail) = &diag.detail {
        for line in detail.lines() {
            out.push_str("\n    ");
            out.push_str(line);
        }
    }
    out
}

/// Print the diagnostics for a failed resource to stderr.
pub fn report_error(name: &str, err: &synclocal_core::Error) {
    for diag in err.to_diagnostics() {
        let rendered = format_diagnostic(&diag);
        let (label, rest) = rendered
            .split_once(": ")
            .unwrap_or((rendered.as_str(), ""));
        let label = match diag.severity {
            Severity::Warning => label.yellow().bold(),
            Severity::Error => label.red().bold(),
        };
        eprintln!("{}: [{}] {}", label, name.cyan(), rest);
    }
}

/// Turn a failure count into the command's result.
pub fn finish(failures: usize) -> Result<()> {
    match failures {
        0 => Ok(()),
        count => Err(CliError::ResourcesFailed { count }),
    }
}
