//! Integration tests for the index synchronizer.

use std::fs;
use std::path::{Path, PathBuf};

use nuttyfi32_bsp_release::config::PackagerConfig;
use nuttyfi32_bsp_release::manifest::PackageIndex;
use nuttyfi32_bsp_release::manifest::sync::{CleanupPolicy, SyncError, Synchronizer};
use sha2::{Digest, Sha256};
use tempfile::TempDir;

const FIXTURE: &str = include_str!("fixtures/package_nuttyfi32_index.json");

fn synchronizer() -> Synchronizer {
    Synchronizer::new(PackagerConfig::default().sync_settings())
}

fn write_manifest(dir: &Path) -> PathBuf {
    let path = dir.join("package_nuttyfi32_index.json");
    fs::write(&path, FIXTURE).unwrap();
    path
}

fn write_artifact(dir: &Path, name: &str, bytes: &[u8]) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, bytes).unwrap();
    path
}

fn sha256_upper(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    hex::encode_upper(hasher.finalize())
}

fn parse_manifest(path: &Path) -> PackageIndex {
    PackageIndex::parse(&fs::read(path).unwrap()).unwrap()
}

#[tokio::test]
async fn new_version_gets_a_fresh_entry() {
    let dir = TempDir::new().unwrap();
    let manifest = write_manifest(dir.path());
    let bytes = b"fresh build content";
    let artifact = write_artifact(dir.path(), "nuttyfi32-1.1.0.zip", bytes);

    let report = synchronizer().run(&artifact, &manifest).await.unwrap();
    assert!(report.created_entry);

    let index = parse_manifest(&manifest);
    let platforms = &index.packages[0].platforms;
    assert_eq!(platforms.len(), 2);
    // The existing entry keeps its position; the new one is appended.
    assert_eq!(platforms[0].version, "1.0.0");
    let entry = &platforms[1];
    assert_eq!(entry.version, "1.1.0");
    assert_eq!(entry.size, bytes.len() as u64);
    assert_eq!(entry.checksum.to_string(), format!("SHA-256:{}", sha256_upper(bytes)));
    assert_eq!(entry.archive_file_name, "nuttyfi32-1.1.0.zip");
    assert_eq!(
        entry.url,
        "https://github.com/itsbhupendrasingh/nuttyfi32/releases/download/1.1.0/nuttyfi32-1.1.0.zip"
    );
    // Template fields carry over from the sibling entry.
    assert_eq!(entry.boards, platforms[0].boards);
    assert_eq!(entry.tools_dependencies, platforms[0].tools_dependencies);
}

#[tokio::test]
async fn existing_entry_is_rewritten_in_place() {
    let dir = TempDir::new().unwrap();
    let manifest = write_manifest(dir.path());
    let bytes = b"rebuilt 1.0.0 content";
    let artifact = write_artifact(dir.path(), "nuttyfi32-1.0.0.zip", bytes);

    let report = synchronizer().run(&artifact, &manifest).await.unwrap();
    assert!(!report.created_entry);

    let index = parse_manifest(&manifest);
    let platforms = &index.packages[0].platforms;
    assert_eq!(platforms.len(), 1);
    let entry = &platforms[0];
    assert_eq!(entry.version, "1.0.0");
    assert_eq!(entry.size, bytes.len() as u64);
    assert_eq!(entry.checksum.to_string(), format!("SHA-256:{}", sha256_upper(bytes)));
    // Identity fields survive the rewrite.
    assert_eq!(entry.name, "nuttyfi32");
    assert_eq!(entry.architecture, "esp32");
    assert_eq!(entry.boards[0].name, "nuttyfi32 Dev Module");
}

#[tokio::test]
async fn second_run_is_byte_identical() {
    let dir = TempDir::new().unwrap();
    let manifest = write_manifest(dir.path());
    let artifact = write_artifact(dir.path(), "nuttyfi32-1.0.0.zip", b"same build");

    synchronizer().run(&artifact, &manifest).await.unwrap();
    let first = fs::read(&manifest).unwrap();

    synchronizer().run(&artifact, &manifest).await.unwrap();
    let second = fs::read(&manifest).unwrap();

    assert_eq!(first, second);
}

#[tokio::test]
async fn stale_archives_are_deleted() {
    let dir = TempDir::new().unwrap();
    let manifest_dir = TempDir::new().unwrap();
    let manifest = write_manifest(manifest_dir.path());

    let artifact = write_artifact(dir.path(), "nuttyfi32-1.0.0.zip", b"current");
    write_artifact(dir.path(), "nuttyfi32-0.9.0.zip", b"old");
    write_artifact(dir.path(), "nuttyfi32-0.9.1.zip", b"older still");
    // Neither the vendor archive nor unrelated files match the pattern.
    write_artifact(dir.path(), "esp32-1.0.6.zip", b"vendor");
    write_artifact(dir.path(), "notes.txt", b"keep me");

    let report = synchronizer().run(&artifact, &manifest).await.unwrap();
    assert_eq!(report.removed.len(), 2);

    assert!(artifact.exists());
    assert!(!dir.path().join("nuttyfi32-0.9.0.zip").exists());
    assert!(!dir.path().join("nuttyfi32-0.9.1.zip").exists());
    assert!(dir.path().join("esp32-1.0.6.zip").exists());
    assert!(dir.path().join("notes.txt").exists());
}

#[tokio::test]
async fn keep_all_policy_retains_old_archives() {
    let dir = TempDir::new().unwrap();
    let manifest = write_manifest(dir.path());
    let artifact = write_artifact(dir.path(), "nuttyfi32-1.1.0.zip", b"current");
    write_artifact(dir.path(), "nuttyfi32-1.0.0.zip", b"previous");

    let mut settings = PackagerConfig::default().sync_settings();
    settings.cleanup = CleanupPolicy::All;
    let report = Synchronizer::new(settings)
        .run(&artifact, &manifest)
        .await
        .unwrap();

    assert!(report.removed.is_empty());
    assert!(dir.path().join("nuttyfi32-1.0.0.zip").exists());
}

#[tokio::test]
async fn missing_artifact_is_fatal_and_leaves_manifest_untouched() {
    let dir = TempDir::new().unwrap();
    let manifest = write_manifest(dir.path());
    let before = fs::read(&manifest).unwrap();

    let err = synchronizer()
        .run(&dir.path().join("nuttyfi32-9.9.9.zip"), &manifest)
        .await
        .unwrap_err();

    assert!(matches!(err, SyncError::ArtifactNotFound { .. }));
    assert_eq!(err.exit_code(), 2);
    assert_eq!(fs::read(&manifest).unwrap(), before);
}

#[tokio::test]
async fn empty_artifact_counts_as_missing() {
    let dir = TempDir::new().unwrap();
    let manifest = write_manifest(dir.path());
    let artifact = write_artifact(dir.path(), "nuttyfi32-1.0.0.zip", b"");

    let err = synchronizer().run(&artifact, &manifest).await.unwrap_err();
    assert!(matches!(err, SyncError::ArtifactNotFound { .. }));
}

#[tokio::test]
async fn unversioned_artifact_name_is_rejected() {
    let dir = TempDir::new().unwrap();
    let manifest = write_manifest(dir.path());
    let artifact = write_artifact(dir.path(), "nuttyfi32-latest.zip", b"bytes");

    let err = synchronizer().run(&artifact, &manifest).await.unwrap_err();
    assert!(matches!(err, SyncError::ArtifactName { .. }));
    assert_eq!(err.exit_code(), 2);
}

#[tokio::test]
async fn corrupt_manifest_fails_before_any_side_effect() {
    let dir = TempDir::new().unwrap();
    let manifest = dir.path().join("package_nuttyfi32_index.json");
    fs::write(&manifest, b"{ this is not json").unwrap();
    let before = fs::read(&manifest).unwrap();

    let artifact = write_artifact(dir.path(), "nuttyfi32-1.0.0.zip", b"bytes");
    let stale = write_artifact(dir.path(), "nuttyfi32-0.9.0.zip", b"old");

    let err = synchronizer().run(&artifact, &manifest).await.unwrap_err();
    assert!(matches!(err, SyncError::ManifestParse { .. }));
    assert_eq!(err.exit_code(), 3);
    // The document is untouched and no stale file was deleted.
    assert_eq!(fs::read(&manifest).unwrap(), before);
    assert!(stale.exists());
}

#[tokio::test]
async fn missing_manifest_is_a_parse_class_failure() {
    let dir = TempDir::new().unwrap();
    let artifact = write_artifact(dir.path(), "nuttyfi32-1.0.0.zip", b"bytes");

    let err = synchronizer()
        .run(&artifact, &dir.path().join("no_such_index.json"))
        .await
        .unwrap_err();
    assert!(matches!(err, SyncError::ManifestRead { .. }));
    assert_eq!(err.exit_code(), 3);
}

#[tokio::test]
async fn no_temporary_files_are_left_behind() {
    let dir = TempDir::new().unwrap();
    let manifest_dir = TempDir::new().unwrap();
    let manifest = write_manifest(manifest_dir.path());
    let artifact = write_artifact(dir.path(), "nuttyfi32-1.0.0.zip", b"bytes");

    synchronizer().run(&artifact, &manifest).await.unwrap();

    let entries: Vec<_> = fs::read_dir(manifest_dir.path())
        .unwrap()
        .map(|e| e.unwrap().file_name())
        .collect();
    assert_eq!(entries, vec!["package_nuttyfi32_index.json"]);
}

#[tokio::test]
async fn absent_package_is_scaffolded() {
    let dir = TempDir::new().unwrap();
    let manifest = dir.path().join("index.json");
    fs::write(&manifest, br#"{ "packages": [] }"#).unwrap();
    let artifact = write_artifact(dir.path(), "nuttyfi32-1.0.0.zip", b"bytes");

    let report = synchronizer().run(&artifact, &manifest).await.unwrap();
    assert!(report.created_entry);

    let index = parse_manifest(&manifest);
    assert_eq!(index.packages.len(), 1);
    let package = &index.packages[0];
    assert_eq!(package.name, "nuttyfi32");
    assert_eq!(package.maintainer, "Community");
    let entry = &package.platforms[0];
    assert_eq!(entry.architecture, "esp32");
    assert_eq!(entry.category, "ESP32");
    assert_eq!(entry.boards[0].name, "nuttyfi32 Dev Module");
    assert!(entry.tools_dependencies.is_empty());
}

#[tokio::test]
async fn explicit_artifact_dir_overrides_the_scan_location() {
    let artifact_home = TempDir::new().unwrap();
    let scan_dir = TempDir::new().unwrap();
    let manifest = write_manifest(artifact_home.path());
    let artifact = write_artifact(artifact_home.path(), "nuttyfi32-1.1.0.zip", b"current");
    let sibling_stale = write_artifact(artifact_home.path(), "nuttyfi32-1.0.0.zip", b"old");
    let scanned_stale = write_artifact(scan_dir.path(), "nuttyfi32-0.5.0.zip", b"ancient");

    let mut settings = PackagerConfig::default().sync_settings();
    settings.artifact_dir = Some(scan_dir.path().to_path_buf());
    Synchronizer::new(settings)
        .run(&artifact, &manifest)
        .await
        .unwrap();

    // Only the configured directory is scanned.
    assert!(sibling_stale.exists());
    assert!(!scanned_stale.exists());
}
