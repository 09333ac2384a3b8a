//! Integration tests for login and refresh.

use reqwest::StatusCode;
use std::time::Duration;
use user_api_test_utils::{
    TestApiServer, TestTokenBuilder, TokenAssertions, ADMIN_EMAIL, SEED_PASSWORD,
    TEST_TOKEN_TTL_SECONDS, USER_EMAIL,
};

// ============================================================================
// Login
// ============================================================================

#[tokio::test]
async fn test_login_returns_bearer_token() -> Result<(), anyhow::Error> {
    // Arrange
    let server = TestApiServer::spawn().await?;

    // Act
    let response = server
        .client()
        .post(format!("{}/auth/login", server.url()))
        .json(&serde_json::json!({ "email": ADMIN_EMAIL, "password": SEED_PASSWORD }))
        .send()
        .await?;

    // Assert
    assert_eq!(response.status(), StatusCode::OK);

    let body: serde_json::Value = response.json().await?;
    assert_eq!(body["token_type"].as_str(), Some("Bearer"));
    assert_eq!(body["expires_in"].as_u64(), Some(TEST_TOKEN_TTL_SECONDS));

    let token = body["token"].as_str().unwrap_or_default().to_string();
    token
        .assert_valid_jwt()
        .assert_for_email(ADMIN_EMAIL)
        .assert_role("admin")
        .assert_expires_in(TEST_TOKEN_TTL_SECONDS);

    Ok(())
}

#[tokio::test]
async fn test_login_token_accepted_on_protected_route() -> Result<(), anyhow::Error> {
    // Arrange
    let server = TestApiServer::spawn().await?;
    let token = server.login_token(USER_EMAIL, SEED_PASSWORD).await?;

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

#[tokio::test]
async fn test_login_wrong_password() -> Result<(), anyhow::Error> {
    // Arrange
    let server = TestApiServer::spawn().await?;

    // Act
    let response = server
        .client()
        .post(format!("{}/auth/login", server.url()))
        .json(&serde_json::json!({ "email": ADMIN_EMAIL, "password": "wrong" }))
        .send()
        .await?;

    // Assert
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let body: serde_json::Value = response.json().await?;
    assert_eq!(body["error"].as_str(), Some("Invalid credentials"));

    Ok(())
}

#[tokio::test]
async fn test_login_unknown_email_same_response() -> Result<(), anyhow::Error> {
    // Arrange
    let server = TestApiServer::spawn().await?;

    // Act
    let response = server
        .client()
        .post(format!("{}/auth/login", server.url()))
        .json(&serde_json::json!({ "email": "ghost@example.com", "password": SEED_PASSWORD }))
        .send()
        .await?;

    // Assert
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let body: serde_json::Value = response.json().await?;
    assert_eq!(body["error"].as_str(), Some("Invalid credentials"));

    Ok(())
}

#[tokio::test]
async fn test_login_empty_body_is_unauthorized() -> Result<(), anyhow::Error> {
    // Arrange
    let server = TestApiServer::spawn().await?;

    // Act
    let response = server
        .client()
        .post(format!("{}/auth/login", server.url()))
        .json(&serde_json::json!({}))
        .send()
        .await?;

    // Assert
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    Ok(())
}

#[tokio::test]
async fn test_login_malformed_json_is_bad_request() -> Result<(), anyhow::Error> {
    // Arrange
    let server = TestApiServer::spawn().await?;

    // Act
    let response = server
        .client()
        .post(format!("{}/auth/login", server.url()))
        .header("content-type", "application/json")
        .body("{\"email\": ")
        .send()
        .await?;

    // Assert
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: serde_json::Value = response.json().await?;
    assert!(body["error"].is_string(), "error body should be JSON: {body}");

    Ok(())
}

#[tokio::test]
async fn test_login_without_body_is_unauthorized() -> Result<(), anyhow::Error> {
    // Arrange
    let server = TestApiServer::spawn().await?;

    // Act
    let empty = server
        .client()
        .post(format!("{}/auth/login", server.url()))
        .send()
        .await?;
    let form = server
        .client()
        .post(format!("{}/auth/login", server.url()))
        .header("content-type", "application/x-www-form-urlencoded")
        .body("email=admin%40example.com&password=secret")
        .send()
        .await?;

    // Assert
    for response in [empty, form] {
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        let body: serde_json::Value = response.json().await?;
        assert_eq!(body["error"].as_str(), Some("Invalid credentials"));
    }

    Ok(())
}

// ============================================================================
// Expiry
// ============================================================================

#[tokio::test]
async fn test_override_token_expires_after_one_second() -> Result<(), anyhow::Error> {
    // Arrange
    let server = TestApiServer::spawn().await?;
    let response = server.login(USER_EMAIL, SEED_PASSWORD, Some(1)).await?;
    assert_eq!(response.expires_in, 1);
    response.token.assert_lifetime(1);

    // Act: usable immediately
    let immediate = server
        .client()
        .get(format!("{}/users", server.url()))
        .bearer_auth(&response.token)
        .send()
        .await?;

    // Rejected once the lifetime has passed
    tokio::time::sleep(Duration::from_millis(1200)).await;
    let later = server
        .client()
        .get(format!("{}/users", server.url()))
        .bearer_auth(&response.token)
        .send()
        .await?;

    // Assert
    assert_eq!(immediate.status(), StatusCode::OK);
    assert_eq!(later.status(), StatusCode::UNAUTHORIZED);
    let body: serde_json::Value = later.json().await?;
    assert_eq!(body["error"].as_str(), Some("Invalid or expired token"));

    Ok(())
}

#[tokio::test]
async fn test_default_lifetime_token_expires() -> Result<(), anyhow::Error> {
    // Arrange: server whose configured lifetime is one second
    let server = TestApiServer::spawn_with_ttl(1).await?;
    let token = server.login_token(ADMIN_EMAIL, SEED_PASSWORD).await?;

    // Act
    tokio::time::sleep(Duration::from_millis(1200)).await;
    let response = server
        .client()
        .get(format!("{}/users", server.url()))
        .bearer_auth(&token)
        .send()
        .await?;

    // Assert
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    Ok(())
}

#[tokio::test]
async fn test_zero_override_uses_default_lifetime() -> Result<(), anyhow::Error> {
    // Arrange
    let server = TestApiServer::spawn().await?;

    // Act
    let response = server.login(USER_EMAIL, SEED_PASSWORD, Some(0)).await?;

    // Assert
    assert_eq!(response.expires_in, TEST_TOKEN_TTL_SECONDS);
    response.token.assert_expires_in(TEST_TOKEN_TTL_SECONDS);

    Ok(())
}

// ============================================================================
// Refresh
// ============================================================================

#[tokio::test]
async fn test_refresh_issues_new_token_with_same_identity() -> Result<(), anyhow::Error> {
    // Arrange
    let server = TestApiServer::spawn().await?;
    let short = server.login(USER_EMAIL, SEED_PASSWORD, Some(30)).await?;

    // Act
    let response = server
        .client()
        .post(format!("{}/auth/refresh", server.url()))
        .bearer_auth(&short.token)
        .send()
        .await?;

    // Assert
    assert_eq!(response.status(), StatusCode::OK);
    let body: serde_json::Value = response.json().await?;
    assert_eq!(body["token_type"].as_str(), Some("Bearer"));
    assert_eq!(body["expires_in"].as_u64(), Some(TEST_TOKEN_TTL_SECONDS));

    let refreshed = body["token"].as_str().unwrap_or_default().to_string();
    refreshed
        .assert_valid_jwt()
        .assert_for_email(USER_EMAIL)
        .assert_role("user")
        .assert_expires_in(TEST_TOKEN_TTL_SECONDS);

    Ok(())
}

#[tokio::test]
async fn test_refresh_without_token_is_unauthorized() -> Result<(), anyhow::Error> {
    // Arrange
    let server = TestApiServer::spawn().await?;

    // Act
    let response = server
        .client()
        .post(format!("{}/auth/refresh", server.url()))
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
async fn test_refresh_with_expired_token_is_unauthorized() -> Result<(), anyhow::Error> {
    // Arrange
    let server = TestApiServer::spawn().await?;
    let expired = TestTokenBuilder::new().expires_in(-30).build();

    // Act
    let response = server
        .client()
        .post(format!("{}/auth/refresh", server.url()))
        .bearer_auth(&expired)
        .send()
        .await?;

    // Assert
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let body: serde_json::Value = response.json().await?;
    assert_eq!(body["error"].as_str(), Some("Invalid or expired token"));

    Ok(())
}
