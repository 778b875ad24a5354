//! CLI argument parsing using clap derive

use clap::{Parser, Subcommand};
use clap_complete::Shell;
use std::path::PathBuf;

/// synclocal - Keep local files in sync with local sources and URLs
#[derive(Parser, Debug)]
#[command(name = "synclocal")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Manifest describing the resources to sync (TOML, JSON or YAML)
    #[arg(
        short,
        long,
        global = true,
        env = "SYNCLOCAL_MANIFEST",
        default_value = "synclocal.toml"
    )]
    pub manifest: PathBuf,

    /// State file [default: synclocal.state.json next to the manifest]
    #[arg(short, long, global = true, env = "SYNCLOCAL_STATE")]
    pub state: Option<PathBuf>,

    /// The command to run
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available commands
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Commands {
    /// Show what apply would change
    Plan {
        /// Ask URL servers whether their content changed (HEAD request)
        #[arg(long)]
        probe: bool,
    },

    /// Sync every resource in the manifest
    ///
    /// Resources that were removed from the manifest are deleted.
    Apply,

    /// Reconcile stored state with the files on disk
    Refresh,

    /// Delete every synced file and clear the state
    Destroy,

    /// Generate shell completions
    ///
    /// Examples:
    ///   synclocal completions bash > ~/.local/share/bash-completion/completions/synclocal
    ///   synclocal completions zsh > ~/.zfunc/_synclocal
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}
