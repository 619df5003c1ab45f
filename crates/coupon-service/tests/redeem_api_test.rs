//! POST /redeem-coupon HTTP 接口测试
//!
//! 通过 tower oneshot 直接驱动 Router，底层使用内存存储。

use std::sync::Arc;

use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode},
};
use chrono::{Duration, Utc};
use coupon_redemption::{
    AppState, MemoryCouponStore, RedemptionPolicy, RedemptionValidator, Reward, build_router,
};
use serde_json::{Value, json};
use tower::ServiceExt;

fn create_test_app() -> (Router, Arc<MemoryCouponStore>) {
    let now = Utc::now();
    let store = Arc::new(MemoryCouponStore::new());
    store.insert_reward(Reward {
        id: 1,
        name: "Daily Bonus".to_string(),
        start_date: now - Duration::days(1),
        end_date: now + Duration::days(1),
        per_day_limit: 3,
        total_limit: 21,
    });
    store.insert_reward(Reward {
        id: 2,
        name: "Expired".to_string(),
        start_date: now - Duration::days(10),
        end_date: now - Duration::days(5),
        per_day_limit: 3,
        total_limit: 21,
    });

    let validator = Arc::new(RedemptionValidator::new(
        store.clone(),
        RedemptionPolicy::default(),
    ));
    (build_router(AppState::new(validator, None)), store)
}

fn redeem_request(body: String) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/redeem-coupon")
        .header("content-type", "application/json")
        .body(Body::from(body))
        .unwrap()
}

async fn send(app: Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, serde_json::from_slice(&body).unwrap_or(Value::Null))
}

async fn redeem(app: Router, player_id: i64, reward_id: i64) -> (StatusCode, Value) {
    let body = json!({ "playerId": player_id, "rewardId": reward_id }).to_string();
    send(app, redeem_request(body)).await
}

#[tokio::test]
async fn test_redeem_coupon_success() {
    let (app, store) = create_test_app();

    let (status, json) = redeem(app, 1, 1).await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(json["success"], true);
    assert_eq!(json["data"]["rewardId"], 1);
    assert!(json["data"]["id"].is_i64());
    assert!(json["data"]["value"].as_str().unwrap().starts_with("CP"));
    assert_eq!(store.player_coupons().len(), 1);
}

#[tokio::test]
async fn test_redeem_coupon_twice_rejected() {
    let (app, _store) = create_test_app();

    let (status, _) = redeem(app.clone(), 1, 1).await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, json) = redeem(app, 1, 1).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["success"], false);
    assert_eq!(json["code"], "ALREADY_REDEEMED");
    assert_eq!(json["message"], "Coupon already redeemed");
}

#[tokio::test]
async fn test_redeem_invalid_reward() {
    let (app, _store) = create_test_app();

    let (status, json) = redeem(app.clone(), 1, 2).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["message"], "Invalid reward or reward date");

    let (status, json) = redeem(app, 1, 999).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["code"], "INVALID_REWARD");
}

#[tokio::test]
async fn test_redeem_total_limit() {
    let (app, store) = create_test_app();
    let earlier = Utc::now() - Duration::seconds(1);
    for reward_id in 100..121 {
        store.seed_redemption(1, reward_id, earlier);
    }

    let (status, json) = redeem(app, 1, 1).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["code"], "TOTAL_LIMIT_EXCEEDED");
    assert_eq!(json["message"], "Player exceeded coupon total limits");
}

#[tokio::test]
async fn test_redeem_daily_limit() {
    let (app, store) = create_test_app();
    let now = Utc::now();
    for reward_id in 100..103 {
        store.seed_redemption(1, reward_id, now);
    }

    let (status, json) = redeem(app, 1, 1).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["code"], "DAILY_LIMIT_EXCEEDED");
    assert_eq!(json["message"], "Player exceeded coupon per day limits");
}

#[tokio::test]
async fn test_malformed_requests_rejected() {
    let bodies = [
        r#"{"playerId": 1}"#.to_string(),
        r#"{"playerId": "abc", "rewardId": 1}"#.to_string(),
        r#"{"playerId": 1.5, "rewardId": 1}"#.to_string(),
        r#"{"playerId": 0, "rewardId": 1}"#.to_string(),
        r#"{"playerId": 1, "rewardId": -3}"#.to_string(),
        "not json".to_string(),
    ];

    for body in bodies {
        let (app, store) = create_test_app();
        let (status, json) = send(app, redeem_request(body.clone())).await;

        assert_eq!(status, StatusCode::BAD_REQUEST, "body: {}", body);
        assert_eq!(json["code"], "VALIDATION_ERROR", "body: {}", body);
        assert!(store.coupons().is_empty());
    }
}

#[tokio::test]
async fn test_missing_content_type_rejected() {
    let (app, _store) = create_test_app();
    let request = Request::builder()
        .method("POST")
        .uri("/redeem-coupon")
        .body(Body::from(r#"{"playerId": 1, "rewardId": 1}"#))
        .unwrap();

    let (status, json) = send(app, request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["code"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn test_request_id_echoed() {
    let (app, _store) = create_test_app();
    let request = Request::builder()
        .method("POST")
        .uri("/redeem-coupon")
        .header("content-type", "application/json")
        .header("x-request-id", "req-abc")
        .body(Body::from(r#"{"playerId": 3, "rewardId": 1}"#))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.headers()["x-request-id"], "req-abc");
}

#[tokio::test]
async fn test_health_and_readiness() {
    let (app, _store) = create_test_app();

    let request = Request::builder().uri("/health").body(Body::empty()).unwrap();
    let (status, json) = send(app.clone(), request).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["status"], "ok");

    let request = Request::builder().uri("/ready").body(Body::empty()).unwrap();
    let (status, json) = send(app, request).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["checks"]["database"], "skipped");
}
