use super::*;
use chrono::Duration;
use mockito::Matcher;

fn identity(endpoint: String) -> IdentityConfig {
    IdentityConfig {
        endpoint,
        user: "replicator".to_string(),
        password: "secret".to_string(),
        domain: "example".to_string(),
        project: "cn-north-1".to_string(),
    }
}

const TOKEN_BODY: &str = r#"{"token":{"expires_at":"2099-01-01T00:00:00.000000Z","methods":["password"]}}"#;

#[tokio::test]
async fn test_generate_fetches_on_first_use() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/v3/auth/tokens")
        .match_body(Matcher::PartialJson(json!({
            "auth": {
                "identity": {
                    "methods": ["password"],
                    "password": { "user": { "name": "replicator", "domain": { "name": "example" } } }
                },
                "scope": { "project": { "name": "cn-north-1" } }
            }
        })))
        .with_status(201)
        .with_header("X-Subject-Token", "fresh-token")
        .with_body(TOKEN_BODY)
        .expect(1)
        .create_async()
        .await;

    let manager = TokenManager::new(
        identity(format!("{}/v3/auth/tokens", server.url())),
        ReqwestClient::new(),
    );

    assert_eq!(manager.generate().await.as_deref(), Some("fresh-token"));
    // Second call is served from the cache.
    assert_eq!(manager.generate().await.as_deref(), Some("fresh-token"));

    mock.assert_async().await;
    let token = manager.current().await.unwrap();
    assert_eq!(token.expires_at.to_rfc3339(), "2099-01-01T00:00:00+00:00");
}

#[tokio::test]
async fn test_valid_token_is_not_refreshed() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/v3/auth/tokens")
        .expect(0)
        .create_async()
        .await;

    let manager = TokenManager::new(
        identity(format!("{}/v3/auth/tokens", server.url())),
        ReqwestClient::new(),
    )
    .with_token(AuthToken {
        value: "cached".to_string(),
        expires_at: Utc::now() + Duration::hours(1),
    });

    assert_eq!(manager.generate().await.as_deref(), Some("cached"));
    mock.assert_async().await;
}

#[tokio::test]
async fn test_expired_token_refreshes_exactly_once() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/v3/auth/tokens")
        .with_status(201)
        .with_header("X-Subject-Token", "renewed")
        .with_body(TOKEN_BODY)
        .expect(1)
        .create_async()
        .await;

    let manager = TokenManager::new(
        identity(format!("{}/v3/auth/tokens", server.url())),
        ReqwestClient::new(),
    )
    .with_token(AuthToken {
        value: "stale".to_string(),
        expires_at: Utc::now() - Duration::minutes(5),
    });

    assert_eq!(manager.generate().await.as_deref(), Some("renewed"));
    mock.assert_async().await;
}

#[tokio::test]
async fn test_failed_refresh_returns_none() {
    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("POST", "/v3/auth/tokens")
        .with_status(401)
        .with_body("bad credentials")
        .create_async()
        .await;

    let manager = TokenManager::new(
        identity(format!("{}/v3/auth/tokens", server.url())),
        ReqwestClient::new(),
    );

    assert_eq!(manager.generate().await, None);
    assert!(manager.current().await.is_none());
}

#[tokio::test]
async fn test_missing_subject_header_is_an_error() {
    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("POST", "/v3/auth/tokens")
        .with_status(201)
        .with_body(TOKEN_BODY)
        .create_async()
        .await;

    let manager = TokenManager::new(
        identity(format!("{}/v3/auth/tokens", server.url())),
        ReqwestClient::new(),
    );

    let err = manager.prime().await.unwrap_err();
    assert!(matches!(err, RegistryError::Validation { .. }));
    assert_eq!(manager.generate().await, None);
}

#[tokio::test]
async fn test_prime_populates_cache() {
    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("POST", "/v3/auth/tokens")
        .with_status(201)
        .with_header("X-Subject-Token", "boot")
        .with_body(TOKEN_BODY)
        .create_async()
        .await;

    let manager = TokenManager::new(
        identity(format!("{}/v3/auth/tokens", server.url())),
        ReqwestClient::new(),
    );
    manager.prime().await.unwrap();

    assert_eq!(manager.current().await.unwrap().value, "boot");
}

#[test]
fn test_identity_debug_redacts_password() {
    let rendered = format!("{:?}", identity("http://iam".to_string()));
    assert!(!rendered.contains("secret"));
    assert!(rendered.contains("replicator"));
}

#[test]
fn test_token_expiry_boundary() {
    let now = Utc::now();
    let token = AuthToken {
        value: "t".to_string(),
        expires_at: now,
    };
    assert!(token.is_expired_at(now));
    assert!(!token.is_expired_at(now - Duration::seconds(1)));
}
