use super::*;
use std::io::Write;

#[test]
fn test_default_config() {
    let config = Config::default();

    assert_eq!(config.network.timeout, 30);
    assert_eq!(config.network.max_idle_per_host, 10);
    assert!(!config.network.insecure);

    assert!(!config.standard.retry_server_errors);

    assert_eq!(config.namespace.prefix, "");
    assert_eq!(config.namespace.api_prefix, "dockyard/v2");
    assert_eq!(config.namespace.token_header, "X-Auth-Token");
    assert!(!config.namespace.retry_server_errors);

    assert!(config.identity.is_none());
}

#[test]
fn test_from_str_empty_yaml() {
    let config = Config::from_yaml_str("").unwrap();
    assert_eq!(config, Config::default());
}

#[test]
fn test_from_str_partial_yaml() {
    let yaml = r#"
network:
  timeout: 60
namespace:
  prefix: "hw-"
"#;
    let config = Config::from_yaml_str(yaml).unwrap();

    assert_eq!(config.network.timeout, 60);
    assert_eq!(config.namespace.prefix, "hw-");

    assert_eq!(config.network.max_idle_per_host, 10);
    assert_eq!(config.namespace.api_prefix, "dockyard/v2");
    assert!(config.identity.is_none());
}

#[test]
fn test_from_str_full_yaml() {
    let yaml = r#"
network:
  timeout: 10
  max_idle_per_host: 4
  insecure: true
standard:
  retry_server_errors: true
namespace:
  prefix: "hw-"
  domain: acme
  api_prefix: "registry/v3"
  token_header: "X-Subject-Token"
  retry_server_errors: true
identity:
  endpoint: "https://iam.example.com/v3/auth/tokens"
  user: replicator
  password: secret
  domain: acme
  project: cn-north-1
"#;
    let config = Config::from_yaml_str(yaml).unwrap();

    assert_eq!(config.network.timeout, 10);
    assert_eq!(config.network.max_idle_per_host, 4);
    assert!(config.network.insecure);
    assert!(config.standard.retry_server_errors);
    assert_eq!(config.namespace.domain, "acme");
    assert_eq!(config.namespace.api_prefix, "registry/v3");
    assert_eq!(config.namespace.token_header, "X-Subject-Token");
    assert!(config.namespace.retry_server_errors);

    let identity = config.identity.unwrap();
    assert_eq!(identity.endpoint, "https://iam.example.com/v3/auth/tokens");
    assert_eq!(identity.user, "replicator");
    assert_eq!(identity.project, "cn-north-1");
}

#[test]
fn test_from_str_invalid_yaml() {
    assert!(Config::from_yaml_str("network: { timeout: soon }").is_err());
}

#[test]
fn test_from_str_unknown_field() {
    assert!(Config::from_yaml_str("unknown_field: true").is_ok());
}

#[test]
fn test_client_config_from_network_section() {
    let config = Config::from_yaml_str("network: { timeout: 5, insecure: true }").unwrap();
    let client = config.client_config();

    assert_eq!(client.timeout_seconds, 5);
    assert_eq!(client.max_idle_per_host, 10);
    assert!(client.insecure);
}

#[test]
fn test_dialect_built_from_sections() {
    let yaml = r#"
standard:
  retry_server_errors: true
namespace:
  prefix: "hw-"
  domain: acme
"#;
    let config = Config::from_yaml_str(yaml).unwrap();

    let standard = config.dialect(DialectKind::Standard);
    assert_eq!(standard.name(), "standard");
    assert!(standard.retry_policy().retry_server_errors);

    let namespace = config.dialect(DialectKind::Namespace);
    assert_eq!(namespace.name(), "namespace");
    assert_eq!(namespace.repository_name("team/app"), "hw-team/app");
    assert!(!namespace.retry_policy().retry_server_errors);
}

#[test]
fn test_load_without_path_returns_defaults() {
    assert_eq!(Config::load(None).unwrap(), Config::default());
}

#[test]
fn test_load_from_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.yaml");
    let mut file = std::fs::File::create(&path).unwrap();
    writeln!(file, "namespace:\n  domain: acme\n  prefix: \"hw-\"").unwrap();

    let config = Config::load(Some(&path)).unwrap();
    assert_eq!(config.namespace.domain, "acme");
    assert_eq!(config.namespace.prefix, "hw-");
}

#[test]
fn test_load_missing_file_is_config_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("missing.yaml");

    let err = Config::load(Some(&path)).unwrap_err();
    match err {
        RegistryError::Config { path: Some(p), .. } => assert!(p.ends_with("missing.yaml")),
        other => panic!("unexpected error: {:?}", other),
    }
}
