//! Local Copy Engine and file resource lifecycle

use pretty_assertions::assert_eq;
use rstest::rstest;
use synclocal_core::{Change, Error, FileResource, FileTarget, LocalCopyEngine};
use synclocal_fs::{ResourceId, compute_content_checksum};
use synclocal_test_utils::TestWorkspace;

const FOO_SHA256: &str = "2c26b46b68ffc68ff99b453c1d30413413422d706483bfa0f98a5e886266e7ae";

fn target(ws: &TestWorkspace) -> FileTarget {
    FileTarget::new(ws.path("source"), ws.path("dest"))
}

#[test]
fn create_copies_and_fingerprints() {
    let ws = TestWorkspace::new();
    ws.write("source", "foo");

    let state = FileResource::new().create(&target(&ws)).unwrap();

    ws.assert_file_eq("dest", "foo");
    assert_eq!(state.content_sha256, FOO_SHA256);
    assert_eq!(state.id, ResourceId::from_file(ws.path("dest")).unwrap());
}

#[test]
fn create_is_idempotent() {
    let ws = TestWorkspace::new();
    ws.write("source", "foo");
    let resource = FileResource::new();

    let first = resource.create(&target(&ws)).unwrap();
    let second = resource.create(&target(&ws)).unwrap();

    assert_eq!(first, second);
}

#[test]
fn identical_content_is_not_rewritten() {
    let ws = TestWorkspace::new();
    ws.write("source", "foo");
    ws.write("dest", "foo");
    let before = std::fs::metadata(ws.path("dest")).unwrap().modified().unwrap();

    let outcome = LocalCopyEngine::new().ensure_copy(&target(&ws)).unwrap();

    assert!(!outcome.copied);
    let after = std::fs::metadata(ws.path("dest")).unwrap().modified().unwrap();
    assert_eq!(before, after);
}

#[test]
fn drift_is_detected_and_repaired() {
    let ws = TestWorkspace::new();
    ws.write("source", "foo");
    let resource = FileResource::new();
    let t = target(&ws);
    let state = resource.create(&t).unwrap();

    ws.write("dest", "edited by hand");
    assert_eq!(resource.plan(Some((&t, &state)), &t).unwrap(), Change::Update);

    let updated = resource.update(&t, &state).unwrap().unwrap();
    ws.assert_file_eq("dest", "foo");
    assert_eq!(updated.content_sha256, FOO_SHA256);
    assert_eq!(resource.plan(Some((&t, &updated)), &t).unwrap(), Change::NoOp);
}

#[test]
fn source_change_propagates() {
    let ws = TestWorkspace::new();
    ws.write("source", "foo");
    let resource = FileResource::new();
    let t = target(&ws);
    let state = resource.create(&t).unwrap();

    ws.write("source", "bar");
    let updated = resource.update(&t, &state).unwrap().unwrap();

    ws.assert_file_eq("dest", "bar");
    assert_eq!(updated.content_sha256, compute_content_checksum(b"bar"));
}

#[test]
fn repointed_source_updates_in_place() {
    let ws = TestWorkspace::new();
    ws.write("source", "foo");
    ws.write("other", "other content");
    let resource = FileResource::new();
    let t = target(&ws);
    let state = resource.create(&t).unwrap();

    let repointed = FileTarget::new(ws.path("other"), ws.path("dest"));
    assert_eq!(
        resource.plan(Some((&t, &state)), &repointed).unwrap(),
        Change::Update
    );
    let updated = resource.update(&repointed, &state).unwrap().unwrap();
    assert_eq!(updated.id, state.id);
    ws.assert_file_eq("dest", "other content");
}

#[test]
fn read_reports_external_edits() {
    let ws = TestWorkspace::new();
    ws.write("source", "foo");
    let resource = FileResource::new();
    let state = resource.create(&target(&ws)).unwrap();

    ws.write("dest", "bar");
    let read = resource.read(&state).unwrap().unwrap();

    assert_eq!(read.content_sha256, compute_content_checksum(b"bar"));
}

#[test]
fn delete_removes_file_and_tolerates_absence() {
    let ws = TestWorkspace::new();
    ws.write("source", "foo");
    let resource = FileResource::new();
    let state = resource.create(&target(&ws)).unwrap();

    resource.delete(&state).unwrap();
    ws.assert_file_not_exists("dest");
    ws.assert_file_exists("source");

    resource.delete(&state).unwrap();
}

#[test]
fn plan_with_missing_source_is_not_found() {
    let ws = TestWorkspace::new();
    ws.write("source", "foo");
    let resource = FileResource::new();
    let t = target(&ws);
    let state = resource.create(&t).unwrap();

    std::fs::remove_file(ws.path("source")).unwrap();

    let err = resource.plan(Some((&t, &state)), &t).unwrap_err();
    assert!(err.is_not_found());
}

#[rstest]
#[case("")]
#[case("abc")]
#[case("0999")]
#[case("+644")]
fn invalid_mode_is_rejected(#[case] mode: &str) {
    let ws = TestWorkspace::new();
    ws.write("source", "foo");

    let err = FileResource::new()
        .create(&target(&ws).with_mode(mode))
        .unwrap_err();

    assert!(matches!(err, Error::Fs(synclocal_fs::Error::InvalidMode { .. })));
    assert!(err.to_string().contains("file_mode is not a valid octal number"));
    ws.assert_file_not_exists("dest");
}

#[cfg(unix)]
mod unix {
    use super::*;
    use pretty_assertions::assert_eq;

    #[rstest]
    #[case("0600", 0o600)]
    #[case("644", 0o644)]
    #[case("0755", 0o755)]
    fn explicit_mode_is_applied(#[case] mode: &str, #[case] expected: u32) {
        let ws = TestWorkspace::new();
        ws.write("source", "foo");

        FileResource::new()
            .create(&target(&ws).with_mode(mode))
            .unwrap();

        assert_eq!(ws.mode("dest"), expected);
    }

    #[test]
    fn mode_drift_is_reconciled_without_copy() {
        let ws = TestWorkspace::new();
        ws.write("source", "foo");
        let engine = LocalCopyEngine::new();
        let t = target(&ws).with_mode("0640");
        engine.ensure_copy(&t).unwrap();

        ws.set_mode("dest", 0o666);
        assert!(engine.ensure_mode(&t).unwrap());
        assert_eq!(ws.mode("dest"), 0o640);
        assert!(!engine.ensure_mode(&t).unwrap());
    }

    #[test]
    fn destination_follows_source_mode_changes() {
        let ws = TestWorkspace::new();
        ws.write("source", "foo");
        ws.set_mode("source", 0o644);
        let engine = LocalCopyEngine::new();
        engine.ensure_copy(&target(&ws)).unwrap();

        ws.set_mode("source", 0o600);
        let outcome = engine.ensure_copy(&target(&ws)).unwrap();

        assert!(outcome.mode_changed);
        assert_eq!(ws.mode("dest"), 0o600);
    }

    #[test]
    fn zero_mode_mirrors_source() {
        let ws = TestWorkspace::new();
        ws.write("source", "foo");
        ws.set_mode("source", 0o640);

        FileResource::new()
            .create(&target(&ws).with_mode("0"))
            .unwrap();

        assert_eq!(ws.mode("dest"), 0o640);
    }
}
