//! Smoke test for the health probe.
//!
//! Uses a lazy pool: the health route never touches the database, so no
//! live server is needed.

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use http_body_util::BodyExt;
use sqlx::postgres::PgPoolOptions;
use tower::ServiceExt;

use taskpulse_api::auth::jwt::JwtConfig;
use taskpulse_api::config::ServerConfig;
use taskpulse_api::state::AppState;

fn test_state() -> AppState {
    let pool = PgPoolOptions::new().connect_lazy("postgres://localhost/taskpulse_test");

    AppState {
        pool: pool.expect("lazy pool creation should not fail"),
        config: Arc::new(ServerConfig {
            host: "127.0.0.1".to_string(),
            port: 0,
            cors_origins: vec!["http://localhost:5173".to_string()],
            request_timeout_secs: 30,
            jwt: JwtConfig {
                secret: "integration-test-secret".to_string(),
                token_expiry_days: 7,
            },
            admin_invite_token: None,
        }),
    }
}

#[tokio::test]
async fn health_endpoint_reports_ok() {
    let app = taskpulse_api::routes::health::router().with_state(test_state());

    let response = app
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(json["status"], "ok");
}
