use super::*;

#[test]
fn test_repository_path_parses_namespace_and_name() {
    let path = RepositoryPath::from_str("team/app").unwrap();
    assert_eq!(path.namespace(), "team");
    assert_eq!(path.name(), "app");
    assert_eq!(path.to_string(), "team/app");
}

#[test]
fn test_repository_path_trims_whitespace() {
    let path = RepositoryPath::from_str("  library/alpine ").unwrap();
    assert_eq!(path.to_string(), "library/alpine");
}

#[test]
fn test_repository_path_without_separator_fails() {
    let err = RepositoryPath::from_str("app").unwrap_err();
    assert!(matches!(err, RegistryError::Validation { .. }));
}

#[test]
fn test_repository_path_with_two_separators_fails() {
    assert!(RepositoryPath::from_str("a/b/c").is_err());
}

#[test]
fn test_repository_path_with_empty_half_fails() {
    assert!(RepositoryPath::from_str("/app").is_err());
    assert!(RepositoryPath::from_str("team/").is_err());
}
