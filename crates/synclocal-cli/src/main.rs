//! synclocal CLI
//!
//! Keeps local files in sync with local sources and URLs, as described by a
//! manifest, remembering what it synced in a state file.

mod cli;
mod commands;
mod error;
mod logging;
mod manifest;

use clap::{CommandFactory, Parser};
use colored::Colorize;

use cli::{Cli, Commands};
use commands::Context;
use error::Result;

fn main() {
    if let Err(e) = run() {
        eprintln!("{}: {}", "error".red().bold(), e);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();
    logging::init(cli.verbose);
    tracing::debug!("Verbose mode enabled");

    let ctx = Context::new(cli.manifest, cli.state);
    match cli.command {
        Some(cmd) => execute_command(&ctx, cmd),
        None => {
            // No command provided - show help hint
            println!("{} Sync local files from files and URLs", "synclocal".green().bold());
            println!();
            println!("Run {} for available commands.", "synclocal --help".cyan());
            Ok(())
        }
    }
}

fn execute_command(ctx: &Context, cmd: Commands) -> Result<()> {
    match cmd {
        Commands::Plan { probe } => commands::run_plan(ctx, probe),
        Commands::Apply => commands::run_apply(ctx),
        Commands::Refresh => commands::run_refresh(ctx),
        Commands::Destroy => commands::run_destroy(ctx),
        Commands::Completions { shell } => {
            clap_complete::generate(
                shell,
                &mut Cli::command(),
                "synclocal",
                &mut std::io::stdout(),
            );
            Ok(())
        }
    }
}
