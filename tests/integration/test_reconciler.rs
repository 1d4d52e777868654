mod support;

use siteforge::core::manifest::{Manifest, INDEX_FILE, LICENSE_FILE, README_FILE};
use siteforge::core::reconciler::{DeploymentReconciler, SoftFailure};
use siteforge::core::types::Strategy;
use siteforge_types::Attachment;
use std::sync::Arc;
use support::{clone_for_inspection, remote_head, worktree_entries, FailingPagesHost, LocalHost};
use tempfile::TempDir;

fn site_manifest() -> Manifest {
    let mut manifest = Manifest::new();
    manifest.insert(README_FILE, "# demo\n");
    manifest.insert(LICENSE_FILE, "MIT License\n");
    manifest.insert("extra.html", "<p>extra page</p>");
    let index = manifest.derive_index();
    manifest.insert(INDEX_FILE, index);
    manifest
}

#[tokio::test]
async fn create_fresh_publishes_manifest_to_new_remote() {
    let host_root = TempDir::new().unwrap();
    let host = LocalHost::new(host_root.path());
    let bare = host.bare_path("demo-auto");
    let reconciler = DeploymentReconciler::new(Arc::new(LocalHost::new(host_root.path())));

    let manifest = site_manifest();
    let outcome = reconciler
        .reconcile("demo-auto", &manifest, &[], Strategy::CreateFresh)
        .await
        .unwrap();

    assert_eq!(outcome.target, "demo-auto");
    assert!(outcome.repo_url.contains("demo-auto"));
    assert!(outcome.pages_url.contains("demo-auto"));
    assert_eq!(outcome.revision.len(), 40);
    assert_eq!(outcome.revision, remote_head(&bare));
    assert!(outcome.soft_failures.is_empty());

    let clone = clone_for_inspection(&bare);
    assert_eq!(
        worktree_entries(clone.path()),
        vec!["LICENSE", "README.md", "extra.html", "index.html"]
    );
}

#[tokio::test]
async fn create_fresh_tolerates_preexisting_remote() {
    let host_root = TempDir::new().unwrap();
    let reconciler = DeploymentReconciler::new(Arc::new(LocalHost::new(host_root.path())));
    let manifest = site_manifest();

    // Repeated round-1 calls must stay idempotent at the existence level:
    // the second create overwrites rather than failing.
    reconciler
        .reconcile("demo-auto", &manifest, &[], Strategy::CreateFresh)
        .await
        .unwrap();
    let outcome = reconciler
        .reconcile("demo-auto", &manifest, &[], Strategy::CreateFresh)
        .await
        .unwrap();
    assert_eq!(outcome.revision.len(), 40);
}

#[tokio::test]
async fn replace_in_place_wipes_and_rewrites_the_tree() {
    let host_root = TempDir::new().unwrap();
    let host = LocalHost::new(host_root.path());
    let bare = host.bare_path("demo-auto");
    let reconciler = DeploymentReconciler::new(Arc::new(LocalHost::new(host_root.path())));

    let first = site_manifest();
    let first_outcome = reconciler
        .reconcile("demo-auto", &first, &[], Strategy::CreateFresh)
        .await
        .unwrap();

    // The regenerated site drops extra.html and adds about.html.
    let mut second = Manifest::new();
    second.insert(README_FILE, "# demo v2\n");
    second.insert(LICENSE_FILE, "MIT License\n");
    second.insert("about.html", "<p>about</p>");
    let index = second.derive_index();
    second.insert(INDEX_FILE, index);

    let second_outcome = reconciler
        .reconcile("demo-auto", &second, &[], Strategy::ReplaceInPlace)
        .await
        .unwrap();
    assert_ne!(first_outcome.revision, second_outcome.revision);

    let clone = clone_for_inspection(&bare);
    assert_eq!(
        worktree_entries(clone.path()),
        vec!["LICENSE", "README.md", "about.html", "index.html"]
    );
    let readme = std::fs::read_to_string(clone.path().join(README_FILE)).unwrap();
    assert!(readme.contains("demo v2"));
}

#[tokio::test]
async fn replace_in_place_with_unchanged_manifest_creates_no_revision() {
    let host_root = TempDir::new().unwrap();
    let reconciler = DeploymentReconciler::new(Arc::new(LocalHost::new(host_root.path())));
    let manifest = site_manifest();

    reconciler
        .reconcile("demo-auto", &manifest, &[], Strategy::CreateFresh)
        .await
        .unwrap();
    let first = reconciler
        .reconcile("demo-auto", &manifest, &[], Strategy::ReplaceInPlace)
        .await
        .unwrap();
    let second = reconciler
        .reconcile("demo-auto", &manifest, &[], Strategy::ReplaceInPlace)
        .await
        .unwrap();

    // Content-identical regeneration skips the commit and push entirely.
    assert_eq!(first.revision, second.revision);
}

#[tokio::test]
async fn replace_in_place_fails_when_remote_is_missing() {
    let host_root = TempDir::new().unwrap();
    let reconciler = DeploymentReconciler::new(Arc::new(LocalHost::new(host_root.path())));
    let manifest = site_manifest();

    let result = reconciler
        .reconcile("never-created-auto", &manifest, &[], Strategy::ReplaceInPlace)
        .await;
    assert!(result.is_err());
}

#[tokio::test]
async fn malformed_attachment_is_dropped_without_aborting() {
    let host_root = TempDir::new().unwrap();
    let host = LocalHost::new(host_root.path());
    let bare = host.bare_path("demo-auto");
    let reconciler = DeploymentReconciler::new(Arc::new(LocalHost::new(host_root.path())));

    let attachments = vec![
        Attachment {
            name: "data/payload.txt".to_string(),
            payload: "data:text/plain;base64,aGVsbG8=".to_string(),
        },
        Attachment {
            name: "broken.bin".to_string(),
            payload: "data:application/octet-stream;base64,%%%".to_string(),
        },
    ];

    let outcome = reconciler
        .reconcile("demo-auto", &site_manifest(), &attachments, Strategy::CreateFresh)
        .await
        .unwrap();

    assert_eq!(outcome.soft_failures.len(), 1);
    assert!(matches!(
        outcome.soft_failures[0],
        SoftFailure::AttachmentSkipped { .. }
    ));

    let clone = clone_for_inspection(&bare);
    assert_eq!(
        std::fs::read_to_string(clone.path().join("data/payload.txt")).unwrap(),
        "hello"
    );
    assert!(!clone.path().join("broken.bin").exists());
}

#[tokio::test]
async fn pages_enable_failure_is_soft() {
    let host_root = TempDir::new().unwrap();
    let host = FailingPagesHost {
        inner: LocalHost::new(host_root.path()),
    };
    let reconciler = DeploymentReconciler::new(Arc::new(host));

    let outcome = reconciler
        .reconcile("demo-auto", &site_manifest(), &[], Strategy::CreateFresh)
        .await
        .unwrap();

    assert_eq!(outcome.soft_failures.len(), 1);
    assert!(matches!(
        outcome.soft_failures[0],
        SoftFailure::PagesEnableFailed { .. }
    ));
    assert_eq!(outcome.revision.len(), 40);
}
