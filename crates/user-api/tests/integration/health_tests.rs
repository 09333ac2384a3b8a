//! Integration tests for the operational endpoints.

use reqwest::StatusCode;
use user_api_test_utils::TestApiServer;

#[tokio::test]
async fn test_health_endpoint_returns_ok() -> Result<(), anyhow::Error> {
    // Arrange
    let server = TestApiServer::spawn().await?;

    // Act
    let response = server
        .client()
        .get(format!("{}/health", server.url()))
        .send()
        .await?;

    // Assert
    assert_eq!(
        response.status(),
        StatusCode::OK,
        "Health check should return 200 OK"
    );

    let body: serde_json::Value = response.json().await?;
    assert_eq!(body["status"].as_str(), Some("ok"));
    assert!(
        body["uptime"].as_f64().is_some_and(|uptime| uptime >= 0.0),
        "uptime should be a non-negative number, got {}",
        body["uptime"]
    );
    let timestamp = body["timestamp"].as_str().unwrap_or_default();
    assert!(
        chrono::DateTime::parse_from_rfc3339(timestamp).is_ok(),
        "timestamp should be RFC 3339, got {timestamp:?}"
    );

    Ok(())
}

#[tokio::test]
async fn test_health_needs_no_token() -> Result<(), anyhow::Error> {
    // Arrange
    let server = TestApiServer::spawn().await?;

    // Act
    let response = server
        .client()
        .get(format!("{}/health", server.url()))
        .bearer_auth("garbage")
        .send()
        .await?;

    // Assert
    assert_eq!(response.status(), StatusCode::OK);

    Ok(())
}

#[tokio::test]
async fn test_metrics_endpoint_returns_prometheus_text() -> Result<(), anyhow::Error> {
    // Arrange
    let server = TestApiServer::spawn().await?;

    // Act
    let response = server
        .client()
        .get(format!("{}/metrics", server.url()))
        .send()
        .await?;

    // Assert
    assert_eq!(response.status(), StatusCode::OK);
    // Body content depends on which server in this process installed the
    // global recorder; only the status is stable
    let _ = response.text().await?;

    Ok(())
}
