//! Configuration loading behaviour.

use gin_release::config::ReleaseConfig;
use gin_release::package::platform::Platform;

#[test]
fn defaults_describe_the_gin_release_layout() {
    let config = ReleaseConfig::default();
    assert_eq!(config.product, "gin-cli");
    assert_eq!(config.binary, "gin");
    assert!(config.targets.iter().any(|t| t == "linux/amd64"));
    assert!(config.debian.enabled);
    assert!(config.debian.prefix.starts_with('/'));
}

#[test]
fn file_values_override_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("release.toml");
    std::fs::write(
        &path,
        r#"
product = "gin-cli"
targets = ["linux/amd64"]

[debian]
enabled = false
maintainer = "Someone Else <else@example.org>"
"#,
    )
    .unwrap();

    let config = ReleaseConfig::load(Some(&path)).unwrap();
    assert_eq!(config.targets, vec!["linux/amd64"]);
    assert!(!config.debian.enabled);
    assert_eq!(config.debian.maintainer, "Someone Else <else@example.org>");
    // untouched sections keep their defaults
    assert_eq!(config.binary, "gin");
    assert!(!config.companions.git_windows.is_empty());
}

#[test]
fn unknown_targets_fail_at_load_time() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("release.toml");
    std::fs::write(&path, "targets = [\"plan9/amd64\"]\n").unwrap();

    assert!(ReleaseConfig::load(Some(&path)).is_err());
}

#[test]
fn parsed_targets_carry_typed_platforms() {
    let config = ReleaseConfig::default();
    let targets = config.parsed_targets().unwrap();
    assert!(targets.iter().any(|t| t.platform == Platform::Linux));
    assert!(targets.iter().any(|t| t.platform == Platform::Windows));
    assert!(targets.iter().any(|t| t.platform == Platform::MacOs));
}
