//! Config loading error messages and layout integration tests.

use std::fs;
use std::path::PathBuf;

use assert_fs::prelude::*;
use predicates::prelude::predicate;
use rstest::rstest;
use sitepub_core::{config::CONFIG_FILE, state, ConfigError, Layout, PipelineConfig};

// ---------------------------------------------------------------------------
// 1. Load error messages
// ---------------------------------------------------------------------------

#[test]
fn corrupt_yaml_returns_parse_error_with_path() {
    let root = assert_fs::TempDir::new().expect("tempdir");
    root.child(CONFIG_FILE)
        .write_str(": : corrupt : yaml : !!!\n  - broken: [unclosed")
        .expect("write");

    let err = PipelineConfig::load_from_root(root.path()).unwrap_err();
    assert!(matches!(err, ConfigError::Parse { .. }), "got: {err}");
    assert!(err.to_string().contains(CONFIG_FILE), "got: {err}");
}

#[test]
fn wrong_type_yaml_returns_parse_error() {
    let root = assert_fs::TempDir::new().expect("tempdir");
    root.child(CONFIG_FILE)
        .write_str("- this is a list, not a mapping\n")
        .expect("write");

    let err = PipelineConfig::load_from_root(root.path()).unwrap_err();
    assert!(matches!(err, ConfigError::Parse { .. }), "got: {err}");
}

#[test]
fn explicit_config_path_must_exist() {
    let root = assert_fs::TempDir::new().expect("tempdir");
    let missing = root.child("missing.yaml");

    let err = PipelineConfig::load_required(missing.path()).unwrap_err();
    assert!(matches!(err, ConfigError::Missing { .. }), "got: {err}");
    assert!(err.to_string().contains("missing.yaml"), "got: {err}");

    assert_eq!(
        PipelineConfig::load_at(missing.path()).unwrap(),
        PipelineConfig::default()
    );
}

#[rstest]
#[case::empty_runtime("container:\n  runtime: \"\"\n")]
#[case::relative_mount("container:\n  mount_point: repo\n")]
#[case::empty_test_command("site:\n  test_command: \"  \"\n")]
#[case::absolute_content_path("publish:\n  content_path: /srv/site\n")]
#[case::absolute_excluded("publish:\n  excluded:\n    - /documentation/sdks/pydoc\n")]
fn invalid_values_are_rejected(#[case] yaml: &str) {
    let root = assert_fs::TempDir::new().expect("tempdir");
    root.child(CONFIG_FILE).write_str(yaml).expect("write");

    let err = PipelineConfig::load_from_root(root.path()).unwrap_err();
    assert!(matches!(err, ConfigError::Invalid(_)), "got: {err}");
}

// ---------------------------------------------------------------------------
// 2. Layout + state files
// ---------------------------------------------------------------------------

#[test]
fn custom_build_dir_moves_every_state_file() {
    let root = assert_fs::TempDir::new().expect("tempdir");
    root.child(CONFIG_FILE)
        .write_str("site:\n  build_dir: out/site\n")
        .expect("write");

    let config = PipelineConfig::load_from_root(root.path()).expect("load");
    let layout = Layout::new(root.path(), &config);
    assert_eq!(layout.build_dir, root.path().join("out/site"));

    state::save_at(&layout.receipt_path(), &vec!["x".to_string()]).expect("save");
    root.child("out/site/.sitepub/publish-receipt.json")
        .assert(predicate::path::exists());
    root.child("out/site/.sitepub/publish-receipt.json.tmp")
        .assert(predicate::path::missing());
}

#[test]
fn artifact_index_path_is_inside_generated_content() {
    let layout = Layout::new(PathBuf::from("/p"), &PipelineConfig::default());
    let artifact = layout.artifact();
    assert_eq!(
        artifact.index_path(),
        PathBuf::from("/p/build/website/generated-content/index.html")
    );
    assert!(!artifact.exists());
}

#[test]
fn config_file_roundtrips_through_yaml() {
    let root = assert_fs::TempDir::new().expect("tempdir");
    let mut config = PipelineConfig::default();
    config.publish.remote_url = Some("https://example.org/site.git".to_string());
    config.container.keepalive = vec!["tail".into(), "-f".into(), "/dev/null".into()];

    let yaml = serde_yaml::to_string(&config).expect("serialize");
    fs::write(root.path().join(CONFIG_FILE), yaml).expect("write");

    let loaded = PipelineConfig::load_from_root(root.path()).expect("load");
    assert_eq!(loaded, config);
}
