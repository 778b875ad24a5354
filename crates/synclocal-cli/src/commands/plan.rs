//! Plan command: show what apply would change

use colored::{ColoredString, Colorize};

use synclocal_core::{Change, ProbeOutcome, ResourceState, StateFile};

use super::{Context, Resources, finish, report_error};
use crate::error::Result;
use crate::manifest::{Entry, Manifest};

/// Run the plan command
///
/// Compares the manifest with the stored state. With `probe`, unchanged URL
/// resources are checked against the server with a HEAD request.
pub fn run_plan(ctx: &Context, probe: bool) -> Result<()> {
    let manifest = Manifest::load(&ctx.manifest)?;
    let state = StateFile::load(&ctx.state)?;
    let resources = Resources::new()?;

    println!(
        "{} Planning {} resource(s)...",
        "=>".blue().bold(),
        manifest.len()
    );

    let mut counts = [0usize; 4];
    let mut failures = 0;
    for (name, entry) in manifest.entries() {
        let prior = state.get(&name).map(|e| &e.resource);
        let change = match plan_entry(&resources, prior, &entry) {
            Ok(change) => change,
            Err(e) => {
                report_error(&name, &e);
                failures += 1;
                continue;
            }
        };

        let note = match (probe, change, &entry, prior) {
            (true, Change::NoOp, Entry::Url(target), Some(ResourceState::Url { state, .. })) => {
                match resources.url.engine().probe(target, &state.cached_metadata()) {
                    Ok(ProbeOutcome::Unchanged) => Some("remote unchanged"),
                    Ok(ProbeOutcome::Changed { .. }) => {
                        counts[2] += 1;
                        Some("remote changed, will download")
                    }
                    Err(e) => {
                        report_error(&name, &e);
                        failures += 1;
                        continue;
                    }
                }
            }
            _ => None,
        };

        match change {
            Change::Create => counts[0] += 1,
            Change::Replace => counts[1] += 1,
            Change::Update => counts[2] += 1,
            Change::NoOp => {}
        }
        match note {
            Some(note) => println!("   {} {} ({}, {})", marker(change), name, change, note.dimmed()),
            None => println!("   {} {} ({})", marker(change), name, change),
        }
    }

    for (name, entry) in state.iter() {
        if !manifest.contains(name) {
            counts[3] += 1;
            println!(
                "   {} {} ({}, no longer in manifest)",
                "-".red().bold(),
                name,
                entry.resource.kind()
            );
        }
    }

    println!();
    println!(
        "Plan: {} to create, {} to replace, {} to update, {} to delete.",
        counts[0], counts[1], counts[2], counts[3]
    );
    finish(failures)
}

/// Plan one manifest entry against its stored state.
///
/// A name that changed kind is replaced. A URL resource whose file
/// disappeared is created again.
pub(crate) fn plan_entry(
    resources: &Resources,
    prior: Option<&ResourceState>,
    entry: &Entry,
) -> synclocal_core::Result<Change> {
    match (entry, prior) {
        (Entry::File(target), None) => resources.file.plan(None, target),
        (Entry::File(target), Some(ResourceState::File { target: old, state })) => {
            resources.file.plan(Some((old, state)), target)
        }
        (Entry::Url(target), None) => resources.url.plan(None, target),
        (Entry::Url(target), Some(ResourceState::Url { target: old, state })) => {
            let change = resources.url.plan(Some((old, state)), target)?;
            if change == Change::NoOp && resources.url.read(state)?.is_none() {
                return Ok(Change::Create);
            }
            Ok(change)
        }
        (_, Some(_)) => Ok(Change::Replace),
    }
}

/// Marker printed in front of a planned change.
pub(crate) fn marker(change: Change) -> ColoredString {
    match change {
        Change::Create => "+".green().bold(),
        Change::Update => "~".yellow().bold(),
        Change::Replace => "-/+".red().bold(),
        Change::NoOp => "=".dimmed(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use synclocal_core::{FileTarget, UrlState, UrlTarget};
    use synclocal_fs::ResourceId;
    use synclocal_test_utils::TestWorkspace;

    #[test]
    fn new_entry_is_created() {
        let ws = TestWorkspace::new();
        ws.write("source", "foo");
        let resources = Resources::new().unwrap();
        let entry = Entry::File(FileTarget::new(ws.path("source"), ws.path("dest")));

        assert_eq!(plan_entry(&resources, None, &entry).unwrap(), Change::Create);
    }

    #[test]
    fn kind_change_is_replaced() {
        let ws = TestWorkspace::new();
        let resources = Resources::new().unwrap();
        let prior = ResourceState::Url {
            target: UrlTarget::new("https://example.com/x", ws.path("dest")),
            state: UrlState {
                id: ResourceId::from_file(ws.path("dest")).unwrap(),
                etag: None,
                last_modified: None,
                content_sha256: String::new(),
            },
        };
        let entry = Entry::File(FileTarget::new(ws.path("source"), ws.path("dest")));

        assert_eq!(
            plan_entry(&resources, Some(&prior), &entry).unwrap(),
            Change::Replace
        );
    }

    #[test]
    fn url_with_missing_file_is_created_again() {
        let ws = TestWorkspace::new();
        let resources = Resources::new().unwrap();
        let target = UrlTarget::new("https://example.com/x", ws.path("dest"));
        let prior = ResourceState::Url {
            target: target.clone(),
            state: UrlState {
                id: ResourceId::from_file(ws.path("dest")).unwrap(),
                etag: Some("\"v1\"".into()),
                last_modified: None,
                content_sha256: String::new(),
            },
        };

        let entry = Entry::Url(target);
        assert_eq!(
            plan_entry(&resources, Some(&prior), &entry).unwrap(),
            Change::Create
        );

        ws.write("dest", "content");
        assert_eq!(
            plan_entry(&resources, Some(&prior), &entry).unwrap(),
            Change::NoOp
        );
    }
}
