//! Destroy command: delete every synced file

use colored::Colorize;

use synclocal_core::StateFile;

use super::{Context, Resources, finish, report_error};
use crate::error::Result;

/// Run the destroy command
///
/// Files that are already gone count as deleted. Entries that fail to
/// delete stay in the state so a later run can retry them.
pub fn run_destroy(ctx: &Context) -> Result<()> {
    let mut state = StateFile::load(&ctx.state)?;
    let resources = Resources::new()?;

    println!(
        "{} Destroying {} resource(s)...",
        "=>".blue().bold(),
        state.len()
    );

    let mut failures = 0;
    for name in state.names() {
        let Some(entry) = state.get(&name).cloned() else {
            continue;
        };
        match resources.delete(&entry.resource) {
            Ok(()) => {
                state.remove(&name);
                println!("   {} {}", "-".red().bold(), name);
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
