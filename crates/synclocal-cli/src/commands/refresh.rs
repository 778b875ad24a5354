//! Refresh command: reconcile stored state with the files on disk

use colored::Colorize;

use synclocal_core::{ResourceState, StateFile};

use super::{Context, Resources, finish, report_error};
use crate::error::Result;

/// Run the refresh command
///
/// Reads every stored resource back from disk. Resources whose file is gone
/// are dropped from the state; no network requests are made.
pub fn run_refresh(ctx: &Context) -> Result<()> {
    let mut state = StateFile::load(&ctx.state)?;
    let resources = Resources::new()?;

    println!(
        "{} Refreshing {} resource(s)...",
        "=>".blue().bold(),
        state.len()
    );

    let mut failures = 0;
    for name in state.names() {
        let Some(entry) = state.get(&name).cloned() else {
            continue;
        };
        match read(&resources, &entry.resource) {
            Ok(Some(current)) if current == entry.resource => {
                println!("   {} {}", "=".dimmed(), name);
            }
            Ok(Some(current)) => {
                println!("   {} {} (content changed on disk)", "~".yellow().bold(), name);
                state.insert(name, current);
            }
            Ok(None) => {
                println!("   {} {} (file is gone)", "-".red().bold(), name);
                state.remove(&name);
            }
            Err(e) => {
                report_error(&name, &e);
                failures += 1;
            }
        }
    }

    state.save(&ctx.state)?;
    finish(failures)
}

fn read(
    resources: &Resources,
    resource: &ResourceState,
) -> synclocal_core::Result<Option<ResourceState>> {
    Ok(match resource {
        ResourceState::File { target, state } => {
            resources
                .file
                .read(state)?
                .map(|state| ResourceState::File {
                    target: target.clone(),
                    state,
                })
        }
        ResourceState::Url { target, state } => {
            resources
                .url
                .read(state)?
                .map(|state| ResourceState::Url {
                    target: target.clone(),
                    state,
                })
        }
    })
}
