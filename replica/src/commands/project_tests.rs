use super::*;
use libreplica::{Config, DialectKind};
use mockito::Matcher;
use serde_json::json;

fn registry(url: &str, dialect: DialectKind) -> RegistryArgs {
    RegistryArgs {
        url: url.to_string(),
        dialect,
        username: Some("admin".to_string()),
        password: Some("Harbor12345".to_string()),
        insecure: false,
    }
}

#[tokio::test]
async fn test_create_project_created() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/api/projects/")
        .match_body(Matcher::Json(json!({ "project_name": "team", "public": 1 })))
        .with_status(201)
        .create_async()
        .await;

    let ctx = AppContext::with_config(Config::default());
    let outcome = create_project(
        &ctx,
        "team",
        Visibility::Public,
        &registry(&server.url(), DialectKind::Standard),
    )
    .await
    .unwrap();

    assert_eq!(outcome, ProjectOutcome::Created);
    mock.assert_async().await;
}

#[tokio::test]
async fn test_create_project_conflict_is_already_exists() {
    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("POST", "/api/projects/")
        .with_status(409)
        .create_async()
        .await;

    let ctx = AppContext::with_config(Config::default());
    let outcome = create_project(
        &ctx,
        "team",
        Visibility::Private,
        &registry(&server.url(), DialectKind::Standard),
    )
    .await
    .unwrap();

    assert_eq!(outcome, ProjectOutcome::AlreadyExists);
}

#[tokio::test]
async fn test_create_project_failure_keeps_status() {
    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("POST", "/api/projects/")
        .with_status(401)
        .with_body("unauthorized")
        .create_async()
        .await;

    let ctx = AppContext::with_config(Config::default());
    let err = create_project(
        &ctx,
        "team",
        Visibility::Private,
        &registry(&server.url(), DialectKind::Standard),
    )
    .await
    .unwrap_err();

    assert_eq!(err.status_code(), Some(401));
}

#[tokio::test]
async fn test_namespace_dialect_without_identity_is_config_error() {
    let ctx = AppContext::with_config(Config::default());
    let err = create_project(
        &ctx,
        "team",
        Visibility::Private,
        &registry("http://localhost:5000", DialectKind::Namespace),
    )
    .await
    .unwrap_err();

    assert!(matches!(err, RegistryError::Config { .. }));
}
