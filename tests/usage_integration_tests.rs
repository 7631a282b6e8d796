//! Integration tests for the usage snapshot API and the counter store.

use axum::{
    body::Body,
    http::{Request, StatusCode},
};
use http_body_util::BodyExt;
use rust_decimal::Decimal;
use serde_json::Value;
use tower::ServiceExt;
use usage_meter::{
    database::{DatabaseManager, UsageCounter, entities::{Plan, UserUsageRecord}},
    error::AppError,
    server::Server,
    test_utils::{TestServerBuilder, seed_usage_row, seed_usage_row_with_counters},
};

async fn create_test_server() -> Server {
    TestServerBuilder::new().build().await
}

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn test_get_usage_returns_snapshot() {
    let server = create_test_server().await;
    seed_usage_row_with_counters(
        &server.database,
        "user_1",
        Plan::Pro,
        7,
        2,
        Decimal::new(125, 1), // 12.5 minutes
        4,
    )
    .await;

    let app = server.create_app();
    let request = Request::builder()
        .uri("/api/usage")
        .header("x-user-id", "user_1")
        .header("x-user-email-verified", "true")
        .body(Body::empty())
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["user_id"], "user_1");
    assert_eq!(body["plan"], "pro");
    assert_eq!(body["chat_used_today"], 7);
    assert_eq!(body["videos_generated_this_week"], 2);
    assert_eq!(body["voice_minutes_this_week"], "12.5");
    assert_eq!(body["images_generated_this_week"], 4);
    assert_eq!(body["email_verified"], true);
    assert!(body["plan_expires_at"].is_null());
}

#[tokio::test]
async fn test_get_usage_surfaces_plan_expiry() {
    let server = create_test_server().await;
    let expires_at = chrono::Utc::now() + chrono::Duration::days(14);
    let record =
        UserUsageRecord::new("user_expiring", Plan::Pro).with_plan_expires_at(expires_at);
    server.database.usage().upsert(&record).await.unwrap();

    let app = server.create_app();
    let request = Request::builder()
        .uri("/api/usage")
        .header("x-user-id", "user_expiring")
        .body(Body::empty())
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["plan"], "pro");
    assert!(!body["plan_expires_at"].is_null());
}

#[tokio::test]
async fn test_get_usage_unknown_user_is_404() {
    let server = create_test_server().await;
    let app = server.create_app();

    let request = Request::builder()
        .uri("/api/usage")
        .header("x-user-id", "user_missing")
        .body(Body::empty())
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    // An error object, never a fabricated zero-usage snapshot
    let body = body_json(response).await;
    assert!(body.get("error").is_some());
    assert!(body.get("chat_used_today").is_none());
}

#[tokio::test]
async fn test_get_usage_without_identity_is_401() {
    let server = create_test_server().await;
    let app = server.create_app();

    let request = Request::builder()
        .uri("/api/usage")
        .body(Body::empty())
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_increment_accumulates() {
    let server = create_test_server().await;
    seed_usage_row(&server.database, "user_inc", Plan::Free).await;

    server
        .metering
        .increment("user_inc", UsageCounter::ChatUsedToday, 1)
        .await
        .unwrap();
    server
        .metering
        .increment("user_inc", UsageCounter::ChatUsedToday, 3)
        .await
        .unwrap();
    server
        .metering
        .increment("user_inc", UsageCounter::VideosThisWeek, 1)
        .await
        .unwrap();

    let snapshot = server.metering.usage_snapshot("user_inc").await.unwrap();
    assert_eq!(snapshot.chat_used_today, 4);
    assert_eq!(snapshot.videos_generated_this_week, 1);
    assert_eq!(snapshot.images_generated_this_week, 0);
}

#[tokio::test]
async fn test_concurrent_increments_lose_no_updates() {
    let server = create_test_server().await;
    seed_usage_row_with_counters(
        &server.database,
        "user_concurrent",
        Plan::Pro,
        5,
        0,
        Decimal::ZERO,
        0,
    )
    .await;

    let n = 25;
    let mut handles = Vec::new();
    for _ in 0..n {
        let metering = server.metering.clone();
        handles.push(tokio::spawn(async move {
            metering
                .increment("user_concurrent", UsageCounter::ChatUsedToday, 1)
                .await
        }));
    }
    for handle in handles {
        handle.await.unwrap().unwrap();
    }

    let snapshot = server
        .metering
        .usage_snapshot("user_concurrent")
        .await
        .unwrap();
    assert_eq!(snapshot.chat_used_today, 5 + n);
}

#[tokio::test]
async fn test_voice_minutes_accumulate_fractionally() {
    let server = create_test_server().await;
    seed_usage_row(&server.database, "user_voice", Plan::Pro).await;

    server
        .metering
        .add_voice_minutes("user_voice", Decimal::new(15, 1)) // 1.5
        .await
        .unwrap();
    server
        .metering
        .add_voice_minutes("user_voice", Decimal::new(275, 2)) // 2.75
        .await
        .unwrap();

    let snapshot = server.metering.usage_snapshot("user_voice").await.unwrap();
    assert_eq!(snapshot.voice_minutes_this_week, Decimal::new(425, 2));
}

#[tokio::test]
async fn test_increment_unknown_user_is_not_found() {
    let server = create_test_server().await;

    let err = server
        .metering
        .increment("user_ghost", UsageCounter::ChatUsedToday, 1)
        .await
        .unwrap_err();

    assert!(matches!(err, AppError::NotFound(_)));
}

#[tokio::test]
async fn test_increment_rejects_non_positive_amounts() {
    let server = create_test_server().await;
    seed_usage_row(&server.database, "user_neg", Plan::Free).await;

    let err = server
        .metering
        .increment("user_neg", UsageCounter::ChatUsedToday, 0)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::InvalidEntry(_)));

    let err = server
        .metering
        .increment("user_neg", UsageCounter::ChatUsedToday, -5)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::InvalidEntry(_)));

    // Counter untouched
    let snapshot = server.metering.usage_snapshot("user_neg").await.unwrap();
    assert_eq!(snapshot.chat_used_today, 0);
}

#[tokio::test]
async fn test_delete_removes_usage_row() {
    let server = create_test_server().await;
    seed_usage_row(&server.database, "user_gone", Plan::Free).await;

    let deleted = server.database.usage().delete("user_gone").await.unwrap();
    assert!(deleted);

    let err = server
        .metering
        .usage_snapshot("user_gone")
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));

    // Deleting again is a no-op
    let deleted = server.database.usage().delete("user_gone").await.unwrap();
    assert!(!deleted);
}

#[tokio::test]
async fn test_upsert_refreshes_plan_without_touching_counters() {
    let server = create_test_server().await;
    seed_usage_row(&server.database, "user_plan", Plan::Free).await;

    server
        .metering
        .increment("user_plan", UsageCounter::ChatUsedToday, 9)
        .await
        .unwrap();

    // Billing re-upserts the row on upgrade
    seed_usage_row(&server.database, "user_plan", Plan::Business).await;

    let snapshot = server.metering.usage_snapshot("user_plan").await.unwrap();
    assert_eq!(snapshot.plan, Plan::Business);
    assert_eq!(snapshot.chat_used_today, 9);
}
