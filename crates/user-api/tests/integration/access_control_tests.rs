//! Integration tests for bearer authentication and role checks.

use reqwest::StatusCode;
use user_api_test_utils::{
    TestApiServer, TestTokenBuilder, ADMIN_EMAIL, SEED_PASSWORD, USER_EMAIL, USER_ID,
};

// ============================================================================
// Authentication
// ============================================================================

#[tokio::test]
async fn test_missing_authorization_header() -> Result<(), anyhow::Error> {
    // Arrange
    let server = TestApiServer::spawn().await?;

    // Act
    let response = server
        .client()
        .get(format!("{}/users", server.url()))
        .send()
        .await?;

    // Assert
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let body: serde_json::Value = response.json().await?;
    assert_eq!(
        body["error"].as_str(),
        Some("Missing or invalid Authorization header")
    );

    Ok(())
}

#[tokio::test]
async fn test_non_bearer_scheme() -> Result<(), anyhow::Error> {
    // Arrange
    let server = TestApiServer::spawn().await?;

    // Act
    let response = server
        .client()
        .get(format!("{}/users", server.url()))
        .basic_auth(USER_EMAIL, Some(SEED_PASSWORD))
        .send()
        .await?;

    // Assert
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let body: serde_json::Value = response.json().await?;
    assert_eq!(
        body["error"].as_str(),
        Some("Missing or invalid Authorization header")
    );

    Ok(())
}

#[tokio::test]
async fn test_rejected_tokens() -> Result<(), anyhow::Error> {
    // Arrange
    let server = TestApiServer::spawn().await?;
    let cases = [
        ("garbage", "not-a-jwt".to_string()),
        ("expired", TestTokenBuilder::new().expires_in(-5).build()),
        (
            "foreign secret",
            TestTokenBuilder::new().signed_with("attacker").as_admin().build(),
        ),
        (
            "other algorithm",
            TestTokenBuilder::new()
                .with_algorithm(jsonwebtoken::Algorithm::HS512)
                .build(),
        ),
        ("oversized", "a".repeat(common::jwt::MAX_JWT_SIZE_BYTES + 1)),
    ];

    for (label, token) in cases {
        // Act
        let response = server
            .client()
            .get(format!("{}/users", server.url()))
            .bearer_auth(&token)
            .send()
            .await?;

        // Assert
        assert_eq!(
            response.status(),
            StatusCode::UNAUTHORIZED,
            "{label} token should be rejected"
        );
        let body: serde_json::Value = response.json().await?;
        assert_eq!(body["error"].as_str(), Some("Invalid or expired token"));
    }

    Ok(())
}

#[tokio::test]
async fn test_unauthenticated_writes_never_reach_directory() -> Result<(), anyhow::Error> {
    // Arrange
    let server = TestApiServer::spawn().await?;

    // Act
    let create = server
        .client()
        .post(format!("{}/users", server.url()))
        .json(&serde_json::json!({ "email": "sneaky@example.com", "name": "Sneaky" }))
        .send()
        .await?;
    let update = server
        .client()
        .put(format!("{}/users/{}", server.url(), USER_ID))
        .bearer_auth("bogus")
        .json(&serde_json::json!({ "role": "admin" }))
        .send()
        .await?;

    // Assert
    assert_eq!(create.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(update.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(server.state().users.len().await, 2);
    let user = server.state().users.get(USER_ID).await?;
    assert_eq!(user.role, user_api::models::Role::User);

    Ok(())
}

#[tokio::test]
async fn test_hand_built_token_is_accepted() -> Result<(), anyhow::Error> {
    // Arrange: tokens are self-contained, no store lookup on verification
    let server = TestApiServer::spawn().await?;
    let token = TestTokenBuilder::new()
        .for_email("not-in-directory@example.com")
        .build();

    // Act
    let response = server
        .client()
        .get(format!("{}/users", server.url()))
        .bearer_auth(&token)
        .send()
        .await?;

    // Assert
    assert_eq!(response.status(), StatusCode::OK);

    Ok(())
}

// ============================================================================
// Roles
// ============================================================================

#[tokio::test]
async fn test_non_admin_delete_is_forbidden() -> Result<(), anyhow::Error> {
    // Arrange
    let server = TestApiServer::spawn().await?;
    let token = server.login_token(USER_EMAIL, SEED_PASSWORD).await?;

    // Act
    let response = server
        .client()
        .delete(format!("{}/users/1", server.url()))
        .bearer_auth(&token)
        .send()
        .await?;

    // Assert
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    let body: serde_json::Value = response.json().await?;
    assert_eq!(body["error"].as_str(), Some("Forbidden: admin role required"));
    assert!(server.state().users.get(1).await.is_ok(), "record must remain");

    Ok(())
}

#[tokio::test]
async fn test_non_admin_delete_of_missing_id_is_forbidden() -> Result<(), anyhow::Error> {
    // Arrange
    let server = TestApiServer::spawn().await?;
    let token = server.login_token(USER_EMAIL, SEED_PASSWORD).await?;

    // Act
    let response = server
        .client()
        .delete(format!("{}/users/999", server.url()))
        .bearer_auth(&token)
        .send()
        .await?;

    // Assert
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    Ok(())
}

#[tokio::test]
async fn test_non_admin_can_grant_admin_role() -> Result<(), anyhow::Error> {
    // Arrange: update carries no role-escalation guard
    let server = TestApiServer::spawn().await?;
    let token = server.login_token(USER_EMAIL, SEED_PASSWORD).await?;

    // Act
    let response = server
        .client()
        .put(format!("{}/users/{}", server.url(), USER_ID))
        .bearer_auth(&token)
        .json(&serde_json::json!({ "role": "admin" }))
        .send()
        .await?;

    // Assert
    assert_eq!(response.status(), StatusCode::OK);
    let body: serde_json::Value = response.json().await?;
    assert_eq!(body["role"].as_str(), Some("admin"));

    Ok(())
}

#[tokio::test]
async fn test_token_role_is_fixed_until_reissued() -> Result<(), anyhow::Error> {
    // Arrange: the record is promoted, but the old token still says "user"
    let server = TestApiServer::spawn().await?;
    let token = server.login_token(USER_EMAIL, SEED_PASSWORD).await?;
    let promote = server
        .client()
        .put(format!("{}/users/{}", server.url(), USER_ID))
        .bearer_auth(&token)
        .json(&serde_json::json!({ "role": "admin" }))
        .send()
        .await?;
    assert_eq!(promote.status(), StatusCode::OK);

    // Act
    let response = server
        .client()
        .delete(format!("{}/users/1", server.url()))
        .bearer_auth(&token)
        .send()
        .await?;

    // Assert
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    Ok(())
}

#[tokio::test]
async fn test_admin_delete_succeeds() -> Result<(), anyhow::Error> {
    // Arrange
    let server = TestApiServer::spawn().await?;
    let token = server.login_token(ADMIN_EMAIL, SEED_PASSWORD).await?;

    // Act
    let response = server
        .client()
        .delete(format!("{}/users/{}", server.url(), USER_ID))
        .bearer_auth(&token)
        .send()
        .await?;

    // Assert
    assert_eq!(response.status(), StatusCode::NO_CONTENT);
    assert_eq!(server.state().users.len().await, 1);

    Ok(())
}

// ============================================================================
// Fallback
// ============================================================================

#[tokio::test]
async fn test_unknown_route_is_not_found() -> Result<(), anyhow::Error> {
    // Arrange
    let server = TestApiServer::spawn().await?;

    // Act
    let response = server
        .client()
        .get(format!("{}/does-not-exist", server.url()))
        .send()
        .await?;

    // Assert
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body: serde_json::Value = response.json().await?;
    assert_eq!(body, serde_json::json!({ "error": "Route not found" }));

    Ok(())
}

#[tokio::test]
async fn test_unknown_method_on_known_path_is_not_found() -> Result<(), anyhow::Error> {
    // Arrange
    let server = TestApiServer::spawn().await?;
    let token = server.login_token(USER_EMAIL, SEED_PASSWORD).await?;

    // Act
    let response = server
        .client()
        .patch(format!("{}/users", server.url()))
        .bearer_auth(&token)
        .send()
        .await?;

    // Assert
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body: serde_json::Value = response.json().await?;
    assert_eq!(body["error"].as_str(), Some("Route not found"));

    Ok(())
}
