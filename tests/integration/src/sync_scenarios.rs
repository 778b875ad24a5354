//! End-to-end sync scenarios
//!
//! These tests drive both resource kinds through a full lifecycle with the
//! state persisted between steps, the way a driver runs them across
//! separate invocations.

use pretty_assertions::assert_eq;
use std::path::Path;
use synclocal_core::{
    Change, FileResource, FileTarget, RemoteFetchEngine, ResourceState, StateFile, UrlResource,
    UrlTarget,
};
use synclocal_fs::{ResourceId, compute_content_checksum, compute_file_checksum};
use synclocal_test_utils::TestWorkspace;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn reload(state: &StateFile, path: &Path) -> StateFile {
    state.save(path).unwrap();
    StateFile::load(path).unwrap()
}

fn stored_file(state: &StateFile, name: &str) -> (FileTarget, synclocal_core::FileState) {
    match &state.get(name).unwrap().resource {
        ResourceState::File { target, state } => (target.clone(), state.clone()),
        other => panic!("expected a file resource, got {other:?}"),
    }
}

#[test]
fn local_file_lifecycle_across_runs() {
    let ws = TestWorkspace::new();
    ws.write("source", "foo");
    let state_path = ws.path("synclocal.state.json");
    let resource = FileResource::new();
    let target = FileTarget::new(ws.path("source"), ws.path("./dest"));

    // Run 1: create
    let mut state = StateFile::load(&state_path).unwrap();
    assert_eq!(resource.plan(None, &target).unwrap(), Change::Create);
    let created = resource.create(&target).unwrap();
    assert_eq!(created.id, ResourceId::from_file(ws.path("dest")).unwrap());
    state.insert(
        "config",
        ResourceState::File {
            target: target.clone(),
            state: created,
        },
    );
    let state = reload(&state, &state_path);

    // Run 2: nothing changed
    let (prior_target, prior_state) = stored_file(&state, "config");
    assert_eq!(
        resource
            .plan(Some((&prior_target, &prior_state)), &target)
            .unwrap(),
        Change::NoOp
    );

    // Run 3: the fingerprint always matches the bytes on disk
    ws.write("source", "bar");
    let updated = resource
        .update(&target, &prior_state)
        .unwrap()
        .unwrap();
    assert_eq!(
        updated.content_sha256,
        compute_file_checksum(&ws.path("dest")).unwrap()
    );

    // Run 4: destroy, twice
    resource.delete(&updated).unwrap();
    resource.delete(&updated).unwrap();
    ws.assert_file_not_exists("dest");
    ws.assert_file_exists("source");
}

#[tokio::test(flavor = "multi_thread")]
async fn url_lifecycle_uses_cached_validators_across_runs() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/data.txt"))
        .and(header("If-None-Match", "\"v1\""))
        .respond_with(ResponseTemplate::new(304))
        .with_priority(1)
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/data.txt"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string("hello")
                .insert_header("ETag", "\"v1\"")
                .insert_header("Last-Modified", "Wed, 21 Oct 2015 07:28:00 GMT"),
        )
        .expect(1)
        .mount(&server)
        .await;

    let ws = TestWorkspace::new();
    let state_path = ws.path("synclocal.state.json");
    let target = UrlTarget::new(format!("{}/data.txt", server.uri()), ws.path("data.txt"));

    let (first, second) = tokio::task::spawn_blocking(move || {
        let resource = UrlResource::new(RemoteFetchEngine::new().unwrap());

        // Run 1: download and persist
        let created = resource.create(&target).unwrap();
        let mut state = StateFile::new();
        state.insert(
            "data",
            ResourceState::Url {
                target: target.clone(),
                state: created.clone(),
            },
        );
        let state = reload(&state, &state_path);

        // Run 2: conditional request from the persisted etag
        let ResourceState::Url { state: stored, .. } = &state.get("data").unwrap().resource else {
            panic!("expected a url resource");
        };
        assert_eq!(
            resource.plan(Some((&target, stored)), &target).unwrap(),
            Change::NoOp
        );
        let refreshed = resource.refresh(&target, stored).unwrap();
        (created, refreshed)
    })
    .await
    .unwrap();

    assert_eq!(first.content_sha256, compute_content_checksum(b"hello"));
    assert_eq!(first.etag.as_deref(), Some("\"v1\""));
    assert_eq!(
        first.last_modified.as_deref(),
        Some("Wed, 21 Oct 2015 07:28:00 GMT")
    );
    assert_eq!(second, first);
    ws.assert_file_eq("data.txt", "hello");
}

#[tokio::test(flavor = "multi_thread")]
async fn url_errors_surface_as_diagnostics() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/private"))
        .respond_with(ResponseTemplate::new(403).set_body_string("expired token"))
        .mount(&server)
        .await;

    let ws = TestWorkspace::new();
    let target = UrlTarget::new(format!("{}/private", server.uri()), ws.path("private"));

    let err = tokio::task::spawn_blocking(move || {
        UrlResource::new(RemoteFetchEngine::new().unwrap()).create(&target)
    })
    .await
    .unwrap()
    .unwrap_err();

    let diags = err.to_diagnostics();
    assert_eq!(diags.len(), 1);
    assert!(diags[0].summary.contains("rejected your auth credentials"));
    assert_eq!(diags[0].detail.as_deref(), Some("expired token"));
    ws.assert_file_not_exists("private");
}
