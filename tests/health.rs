mod common;

use axum::{
    Router,
    body::{Body, to_bytes},
    extract::State,
    http::{Request, StatusCode},
};
use scrap_market_api::routes::{create_api_router, health::health_check};
use tower::ServiceExt;

use common::setup_state;

#[tokio::test]
async fn health_check_returns_ok() -> anyhow::Result<()> {
    let state = setup_state().await?;
    let response = health_check(State(state)).await;
    assert_eq!(response.0.message, "Health check");

    let data = response.0.data.expect("health data");
    assert_eq!(data.status, "ok");
    assert_eq!(data.database, "up");
    Ok(())
}

#[tokio::test]
async fn booking_requires_a_buyer_token() -> anyhow::Result<()> {
    let state = setup_state().await?;
    let app = Router::new().nest("/api", create_api_router()).with_state(state);

    let request = Request::post(format!("/api/listings/{}/book", uuid::Uuid::new_v4()))
        .header("content-type", "application/json")
        .body(Body::from(r#"{"scheduled_pickup_at":"2026-11-20T10:30"}"#))?;
    let response = app.oneshot(request).await?;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let body = to_bytes(response.into_body(), usize::MAX).await?;
    let json: serde_json::Value = serde_json::from_slice(&body)?;
    assert_eq!(json["message"], "Buyer access required.");
    assert_eq!(json["data"]["login"], "/api/auth/buyer/login");
    Ok(())
}

#[tokio::test]
async fn categories_are_public_and_seeded() -> anyhow::Result<()> {
    let state = setup_state().await?;
    let app = Router::new().nest("/api", create_api_router()).with_state(state);

    let response = app
        .oneshot(Request::get("/api/categories").body(Body::empty())?)
        .await?;
    assert_eq!(response.status(), StatusCode::OK);

    let body = to_bytes(response.into_body(), usize::MAX).await?;
    let json: serde_json::Value = serde_json::from_slice(&body)?;
    let names: Vec<&str> = json["data"]
        .as_array()
        .expect("category list")
        .iter()
        .filter_map(|c| c["name"].as_str())
        .collect();
    assert_eq!(names, vec!["E-waste", "Glass", "Metal", "Paper", "Plastic"]);
    Ok(())
}
