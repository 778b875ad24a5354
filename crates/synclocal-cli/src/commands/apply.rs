//! Apply command: converge every manifest entry

use colored::Colorize;

use synclocal_core::{Change, ResourceState, StateFile};

use super::plan::{marker, plan_entry};
use super::{Context, Resources, finish, report_error};
use crate::error::Result;
use crate::manifest::{Entry, Manifest};

/// Outcome of applying one entry
#[derive(Debug)]
enum Applied {
    Unchanged,
    Stored(Change, ResourceState),
}

/// Run the apply command
///
/// Each entry is planned and applied independently; a failing entry is
/// reported and the rest continue. State is saved for every entry that
/// succeeded, then resources missing from the manifest are deleted.
pub fn run_apply(ctx: &Context) -> Result<()> {
    let manifest = Manifest::load(&ctx.manifest)?;
    let mut state = StateFile::load(&ctx.state)?;
    let resources = Resources::new()?;

    println!(
        "{} Applying {} resource(s)...",
        "=>".blue().bold(),
        manifest.len()
    );

    let mut changed = 0;
    let mut failures = 0;
    for (name, entry) in manifest.entries() {
        let prior = state.get(&name).map(|e| e.resource.clone());
        match apply_entry(&resources, prior.as_ref(), &entry) {
            Ok(Applied::Unchanged) => {
                println!("   {} {}", marker(Change::NoOp), name);
            }
            Ok(Applied::Stored(change, resource)) => {
                println!(
                    "   {} {} ({})",
                    marker(change),
                    name,
                    short_sha(resource.content_sha256()).dimmed()
                );
                state.insert(name, resource);
                changed += 1;
            }
            Err(e) => {
                report_error(&name, &e);
                failures += 1;
            }
        }
    }

    for name in state.names() {
        if manifest.contains(&name) {
            continue;
        }
        let Some(entry) = state.get(&name).cloned() else {
            continue;
        };
        match resources.delete(&entry.resource) {
            Ok(()) => {
                state.remove(&name);
                println!("   {} {} (deleted)", "-".red().bold(), name);
                changed += 1;
            }
            Err(e) => {
                report_error(&name, &e);
                failures += 1;
            }
        }
    }

    state.save(&ctx.state)?;

    println!();
    if failures == 0 {
        println!(
            "{} Apply complete: {} changed.",
            "OK".green().bold(),
            changed
        );
    } else {
        println!(
            "{} Apply finished with errors: {} changed, {} failed.",
            "ERROR".red().bold(),
            changed,
            failures
        );
    }
    finish(failures)
}

fn apply_entry(
    resources: &Resources,
    prior: Option<&ResourceState>,
    entry: &Entry,
) -> synclocal_core::Result<Applied> {
    let change = plan_entry(resources, prior, entry)?;
    match (change, entry, prior) {
        // Remote freshness is only known after a conditional request
        (Change::NoOp, Entry::Url(target), Some(ResourceState::Url { state, .. })) => {
            let refreshed = resources.url.refresh(target, state)?;
            if &refreshed == state {
                return Ok(Applied::Unchanged);
            }
            Ok(Applied::Stored(
                Change::Update,
                ResourceState::Url {
                    target: target.clone(),
                    state: refreshed,
                },
            ))
        }
        (Change::NoOp, _, _) => Ok(Applied::Unchanged),
        (Change::Update, Entry::File(target), Some(ResourceState::File { state, .. })) => {
            match resources.file.update(target, state)? {
                Some(updated) => Ok(Applied::Stored(
                    Change::Update,
                    ResourceState::File {
                        target: target.clone(),
                        state: updated,
                    },
                )),
                None => Ok(Applied::Stored(Change::Create, create(resources, entry)?)),
            }
        }
        (Change::Replace, _, Some(old)) => {
            resources.delete(old)?;
            Ok(Applied::Stored(Change::Replace, create(resources, entry)?))
        }
        (change, _, _) => Ok(Applied::Stored(change, create(resources, entry)?)),
    }
}

fn create(resources: &Resources, entry: &Entry) -> synclocal_core::Result<ResourceState> {
    Ok(match entry {
        Entry::File(target) => ResourceState::File {
            target: target.clone(),
            state: resources.file.create(target)?,
        },
        Entry::Url(target) => ResourceState::Url {
            target: target.clone(),
            state: resources.url.create(target)?,
        },
    })
}

fn short_sha(sha: &str) -> &str {
    sha.get(..12).unwrap_or(sha)
}
