mod common;

use common::ensure_server;

#[tokio::test]
async fn root_describes_the_api() -> anyhow::Result<()> {
    let server = ensure_server().await?;
    let body: serde_json::Value = reqwest::get(&server.base_url).await?.json().await?;

    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["name"], "Tracker API");
    assert!(body["data"]["endpoints"]["issue"].is_string());
    Ok(())
}

#[tokio::test]
async fn health_answers_even_without_a_database() -> anyhow::Result<()> {
    let server = ensure_server().await?;
    let resp = reqwest::get(format!("{}/health", server.base_url)).await?;

    // 200 with a database, 503 without; both are valid health answers
    assert!(
        resp.status() == reqwest::StatusCode::OK
            || resp.status() == reqwest::StatusCode::SERVICE_UNAVAILABLE
    );
    Ok(())
}

#[tokio::test]
async fn protected_routes_reject_missing_tokens() -> anyhow::Result<()> {
    let server = ensure_server().await?;
    let resp = reqwest::get(format!("{}/api/issue/TRK-1", server.base_url)).await?;
    assert_eq!(resp.status(), reqwest::StatusCode::UNAUTHORIZED);

    let body: serde_json::Value = resp.json().await?;
    assert_eq!(body["code"], "UNAUTHORIZED");
    Ok(())
}

#[tokio::test]
async fn garbage_bearer_token_is_rejected() -> anyhow::Result<()> {
    let server = ensure_server().await?;
    let client = reqwest::Client::new();
    let resp = client
        .get(format!("{}/api/priority", server.base_url))
        .header("Authorization", "Bearer not-a-jwt")
        .send()
        .await?;
    assert_eq!(resp.status(), reqwest::StatusCode::UNAUTHORIZED);
    Ok(())
}
