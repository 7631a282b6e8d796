//! Integration tests for the externally triggered reset endpoints.

use axum::{
    body::Body,
    http::{Method, Request, StatusCode},
};
use http_body_util::BodyExt;
use rust_decimal::Decimal;
use serde_json::Value;
use tower::ServiceExt;
use usage_meter::{
    database::entities::Plan,
    server::Server,
    test_utils::{TestServerBuilder, seed_usage_row_with_counters},
};

async fn create_test_server() -> Server {
    TestServerBuilder::new()
        .with_cron_secret("reset-secret".to_string())
        .build()
        .await
}

async fn seed_three_users(server: &Server) {
    seed_usage_row_with_counters(
        &server.database,
        "user_1",
        Plan::Free,
        10,
        1,
        Decimal::new(55, 1),
        2,
    )
    .await;
    seed_usage_row_with_counters(
        &server.database,
        "user_2",
        Plan::Pro,
        3,
        0,
        Decimal::ZERO,
        0,
    )
    .await;
    seed_usage_row_with_counters(
        &server.database,
        "user_3",
        Plan::Business,
        0,
        7,
        Decimal::new(120, 0),
        9,
    )
    .await;
}

fn trigger(uri: &str, secret: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().uri(uri).method(Method::POST);
    if let Some(secret) = secret {
        builder = builder.header("Authorization", format!("Bearer {secret}"));
    }
    builder.body(Body::empty()).unwrap()
}

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn test_reset_without_secret_is_401() {
    let server = create_test_server().await;
    let app = server.create_app();

    let response = app
        .oneshot(trigger("/cron/reset-daily", None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_reset_with_wrong_secret_is_401() {
    let server = create_test_server().await;
    let app = server.create_app();

    let response = app
        .oneshot(trigger("/cron/reset-weekly", Some("wrong-secret")))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_unconfigured_secret_fails_closed() {
    let server = TestServerBuilder::new()
        .with_cron_secret(String::new())
        .build()
        .await;
    let app = server.create_app();

    let response = app
        .oneshot(trigger("/cron/reset-daily", Some("")))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_reset_daily_zeroes_chat_counters_only() {
    let server = create_test_server().await;
    seed_three_users(&server).await;

    let app = server.create_app();
    let response = app
        .oneshot(trigger("/cron/reset-daily", Some("reset-secret")))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["success"], true);
    assert_eq!(body["count"], 3);
    assert!(body.get("timestamp").is_some());

    for user_id in ["user_1", "user_2", "user_3"] {
        let snapshot = server.metering.usage_snapshot(user_id).await.unwrap();
        assert_eq!(snapshot.chat_used_today, 0, "chat reset for {user_id}");
    }

    // Weekly counters untouched
    let user_1 = server.metering.usage_snapshot("user_1").await.unwrap();
    assert_eq!(user_1.videos_generated_this_week, 1);
    assert_eq!(user_1.voice_minutes_this_week, Decimal::new(55, 1));
    assert_eq!(user_1.images_generated_this_week, 2);
}

#[tokio::test]
async fn test_reset_weekly_zeroes_all_weekly_counters() {
    let server = create_test_server().await;
    seed_three_users(&server).await;

    let app = server.create_app();
    let response = app
        .oneshot(trigger("/cron/reset-weekly", Some("reset-secret")))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["success"], true);
    assert_eq!(body["count"], 3);

    for user_id in ["user_1", "user_2", "user_3"] {
        let snapshot = server.metering.usage_snapshot(user_id).await.unwrap();
        assert_eq!(snapshot.videos_generated_this_week, 0);
        assert_eq!(snapshot.voice_minutes_this_week, Decimal::ZERO);
        assert_eq!(snapshot.images_generated_this_week, 0);
    }

    // Daily counter untouched
    let user_1 = server.metering.usage_snapshot("user_1").await.unwrap();
    assert_eq!(user_1.chat_used_today, 10);
}

#[tokio::test]
async fn test_reset_daily_twice_is_idempotent() {
    let server = create_test_server().await;
    seed_three_users(&server).await;

    let first = server
        .create_app()
        .oneshot(trigger("/cron/reset-daily", Some("reset-secret")))
        .await
        .unwrap();
    assert_eq!(first.status(), StatusCode::OK);
    let first_body = body_json(first).await;
    assert_eq!(first_body["count"], 3);

    // Second run within the same boundary: still succeeds, re-zeroes the
    // already-zero counters, and reports a well-defined count
    let second = server
        .create_app()
        .oneshot(trigger("/cron/reset-daily", Some("reset-secret")))
        .await
        .unwrap();
    assert_eq!(second.status(), StatusCode::OK);
    let second_body = body_json(second).await;
    assert_eq!(second_body["success"], true);
    assert_eq!(second_body["count"], 3);

    for user_id in ["user_1", "user_2", "user_3"] {
        let snapshot = server.metering.usage_snapshot(user_id).await.unwrap();
        assert_eq!(snapshot.chat_used_today, 0);
    }
}

#[tokio::test]
async fn test_reset_has_no_date_guard() {
    // The reset functions own "zero everything now", never "is it time":
    // direct service calls reset unconditionally no matter the wall clock.
    let server = create_test_server().await;
    seed_three_users(&server).await;

    let count = server.metering.reset_weekly_usage().await.unwrap();
    assert_eq!(count, 3);

    let snapshot = server.metering.usage_snapshot("user_3").await.unwrap();
    assert_eq!(snapshot.videos_generated_this_week, 0);

    // And again, immediately, with no boundary in between
    let count = server.metering.reset_weekly_usage().await.unwrap();
    assert_eq!(count, 3);
}

#[tokio::test]
async fn test_reset_on_empty_store_reports_zero() {
    let server = create_test_server().await;

    let app = server.create_app();
    let response = app
        .oneshot(trigger("/cron/reset-daily", Some("reset-secret")))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["success"], true);
    assert_eq!(body["count"], 0);
}
