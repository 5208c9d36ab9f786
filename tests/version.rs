//! Version resolution behaviour.

use std::path::Path;
use std::process::Command;

use gin_release::version::{parse_version_field, resolve};

fn git(dir: &Path, args: &[&str]) {
    let status = Command::new("git")
        .args(args)
        .current_dir(dir)
        .env("GIT_AUTHOR_NAME", "test")
        .env("GIT_AUTHOR_EMAIL", "test@example.com")
        .env("GIT_COMMITTER_NAME", "test")
        .env("GIT_COMMITTER_EMAIL", "test@example.com")
        .status()
        .expect("git is available");
    assert!(status.success(), "git {args:?} failed");
}

fn commit(dir: &Path, marker: &str) {
    std::fs::write(dir.join("file.txt"), marker).unwrap();
    git(dir, &["add", "."]);
    git(dir, &["commit", "-q", "--no-gpg-sign", "-m", marker]);
}

#[test]
fn version_field_is_parsed_from_key_value_text() {
    assert_eq!(
        parse_version_field("version=2.3.4-dev\nbuild=00042\n"),
        Some("2.3.4-dev".to_string())
    );
    assert_eq!(
        parse_version_field("build=7\nversion = v1.0 \n"),
        Some("v1.0".to_string())
    );
    assert_eq!(parse_version_field("build=7\n"), None);
    assert_eq!(parse_version_field("version=\n"), None);
    assert_eq!(parse_version_field(""), None);
}

#[tokio::test]
async fn build_number_grows_with_history() {
    let repo = tempfile::tempdir().unwrap();
    git(repo.path(), &["init", "-q"]);
    commit(repo.path(), "one");

    let version_file = repo.path().join("version");
    std::fs::write(&version_file, "version=1.0.0\n").unwrap();

    let first = resolve(&version_file, repo.path()).await.unwrap();
    assert_eq!(first.version, "1.0.0");
    assert!(first.build >= 1);
    assert!(first.commit.len() >= 7);

    commit(repo.path(), "two");
    let second = resolve(&version_file, repo.path()).await.unwrap();

    assert!(second.build > first.build);
    assert_ne!(second.commit, first.commit);
}

#[tokio::test]
async fn missing_metadata_file_is_fatal() {
    let repo = tempfile::tempdir().unwrap();
    let result = resolve(&repo.path().join("version"), repo.path()).await;
    assert!(result.is_err());
}

#[tokio::test]
async fn metadata_without_version_field_is_fatal() {
    let repo = tempfile::tempdir().unwrap();
    let version_file = repo.path().join("version");
    std::fs::write(&version_file, "build=00042\n").unwrap();

    let result = resolve(&version_file, repo.path()).await;
    assert!(result.is_err());
}
