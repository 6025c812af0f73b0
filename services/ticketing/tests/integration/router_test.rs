use std::sync::Arc;

use axum::http::StatusCode;
use axum_test::TestServer;
use sea_orm::DatabaseConnection;
use serde_json::{Value, json};
use uuid::Uuid;

use boxoffice_core::middleware::REQUEST_ID_HEADER;
use boxoffice_testing::auth::MockAuth;
use boxoffice_testing::clock::ManualClock;
use boxoffice_testing::fixture;
use boxoffice_ticketing::config::HoldPolicy;
use boxoffice_ticketing::router::build_router;
use boxoffice_ticketing::state::AppState;

/// A router with no database behind it; only paths that reject before
/// reaching storage are exercised here.
fn server() -> TestServer {
    let state = AppState {
        db: DatabaseConnection::Disconnected,
        clock: Arc::new(ManualClock::at(fixture::t0())),
        policy: HoldPolicy::default(),
    };
    TestServer::new(build_router(state)).unwrap()
}

fn with_auth(auth: &MockAuth, req: axum_test::TestRequest) -> axum_test::TestRequest {
    auth.header_pairs()
        .into_iter()
        .fold(req, |req, (name, value)| req.add_header(name, value))
}

#[tokio::test]
async fn should_answer_liveness_probe() {
    server().get("/healthz").await.assert_status_ok();
}

#[tokio::test]
async fn should_stamp_request_id_on_responses() {
    let response = server().get("/healthz").await;
    let id = response.header(REQUEST_ID_HEADER);
    assert!(id.to_str().unwrap().parse::<Uuid>().is_ok());
}

#[tokio::test]
async fn should_reject_missing_identity_with_401() {
    let server = server();
    let response = server
        .post("/orders/quote")
        .json(&json!({ "event_id": Uuid::new_v4(), "items": [] }))
        .await;
    response.assert_status(StatusCode::UNAUTHORIZED);

    let response = server
        .post(&format!("/tickets/{}/check-in", Uuid::new_v4()))
        .await;
    response.assert_status(StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn should_reserve_staff_routes_for_staff() {
    let server = server();
    let auth = MockAuth::buyer(Uuid::new_v4());
    let order_id = Uuid::new_v4();

    let cases = [
        server
            .post(&format!("/orders/{order_id}/confirmation"))
            .json(&json!({ "payment_outcome": "completed" })),
        server.post(&format!("/orders/{order_id}/refund")),
        server.post(&format!("/tickets/{}/check-in", Uuid::new_v4())),
    ];
    for req in cases {
        let response = with_auth(&auth, req).await;
        response.assert_status(StatusCode::FORBIDDEN);
        let body: Value = response.json();
        assert_eq!(body["kind"], "FORBIDDEN");
    }
}

#[tokio::test]
async fn should_reject_out_of_range_hold_minutes() {
    let server = server();
    let auth = MockAuth::buyer(Uuid::new_v4());

    let req = server
        .post(&format!("/events/{}/seat-holds", Uuid::new_v4()))
        .json(&json!({ "seat_ids": [Uuid::new_v4()], "hold_minutes": 0 }));
    let response = with_auth(&auth, req).await;

    response.assert_status(StatusCode::BAD_REQUEST);
    let body: Value = response.json();
    assert_eq!(body["kind"], "MISSING_DATA");
}
