use super::*;

#[test]
fn test_verbosity_from_count() {
    assert_eq!(VerbosityLevel::from_count(0), VerbosityLevel::Normal);
    assert_eq!(VerbosityLevel::from_count(1), VerbosityLevel::Verbose);
    assert_eq!(VerbosityLevel::from_count(2), VerbosityLevel::Debug);
    assert_eq!(VerbosityLevel::from_count(3), VerbosityLevel::Trace);
    assert_eq!(VerbosityLevel::from_count(9), VerbosityLevel::Trace);
}

#[test]
fn test_verbosity_filters() {
    assert_eq!(VerbosityLevel::Normal.filter(), "warn");
    assert_eq!(VerbosityLevel::Verbose.filter(), "info");
    assert_eq!(VerbosityLevel::Debug.filter(), "debug");
    assert_eq!(VerbosityLevel::Trace.filter(), "trace");
}

#[test]
fn test_explicit_path_wins() {
    let dir = tempfile::tempdir().unwrap();
    let default = dir.path().join("config.yaml");
    std::fs::write(&default, "").unwrap();

    let explicit = PathBuf::from("/tmp/other.yaml");
    assert_eq!(
        resolve_config_path(Some(explicit.clone()), Some(&default)),
        Some(explicit)
    );
}

#[test]
fn test_existing_default_is_used() {
    let dir = tempfile::tempdir().unwrap();
    let default = dir.path().join("config.yaml");
    std::fs::write(&default, "").unwrap();

    assert_eq!(resolve_config_path(None, Some(&default)), Some(default));
}

#[test]
fn test_missing_default_means_no_file() {
    let dir = tempfile::tempdir().unwrap();
    let default = dir.path().join("config.yaml");

    assert_eq!(resolve_config_path(None, Some(&default)), None);
    assert_eq!(resolve_config_path(None, None), None);
}

#[test]
fn test_build_with_explicit_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("replica.yaml");
    std::fs::write(&path, "network:\n  timeout: 12\n").unwrap();

    let ctx = AppContext::build(Some(path.clone())).unwrap();
    assert_eq!(ctx.config_path, Some(path));
    assert_eq!(ctx.replicator.client_config().timeout_seconds, 12);
}

#[test]
fn test_build_with_missing_explicit_file_fails() {
    let err = AppContext::build(Some(PathBuf::from("/nonexistent/replica.yaml"))).unwrap_err();
    assert!(err.contains("Failed to load configuration"));
}
