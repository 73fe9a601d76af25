//! Shared test helpers for API integration tests.
#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use http_body_util::BodyExt;
use overseer_core::clock::Clock;
use overseer_engine::application::config::DispatcherConfig;
use overseer_engine::application::dispatcher::{DispatcherPorts, EventDispatcher};
use overseer_engine::domain::registry::HandlerRegistry;
use overseer_engine::handlers::new_game::NewGameHandler;
use overseer_lock::application::config::LockConfig;
use overseer_lock::application::ticket_lock::InMemoryTicketLock;
use overseer_test_support::{FixedClock, GameFixture, RecordingEventDurability};
use tower::ServiceExt;

use overseer_api::routes;
use overseer_api::state::AppState;

/// Fixed timestamp used across all integration tests.
fn fixed_clock() -> Arc<dyn Clock> {
    Arc::new(FixedClock(
        chrono::TimeZone::with_ymd_and_hms(&chrono::Utc, 2026, 1, 15, 10, 0, 0).unwrap(),
    ))
}

/// A running app plus the doubles behind it.
pub struct TestApp {
    pub fixture: GameFixture,
    pub durability: Arc<RecordingEventDurability>,
    pub dispatcher: Arc<EventDispatcher>,
    pub router: Router,
}

/// Build the full app router over in-memory doubles seeded with `fixture`.
/// Uses the same route structure and handler registry as `main.rs`.
pub fn build_test_app(fixture: GameFixture) -> TestApp {
    let clock = fixed_clock();
    let games = Arc::new(fixture.games());
    let durability = Arc::new(RecordingEventDurability::new(clock.now()));
    let ports = DispatcherPorts {
        games: games.clone(),
        actors: Arc::new(fixture.actors()),
        durability: durability.clone(),
        locks: Arc::new(InMemoryTicketLock::new(
            clock.clone(),
            LockConfig::new(Duration::from_millis(2), Duration::from_millis(10)),
        )),
        clock,
    };
    let dispatcher = Arc::new(EventDispatcher::new(
        HandlerRegistry::new(vec![Arc::new(NewGameHandler::new(games))]),
        ports,
        DispatcherConfig::default(),
    ));
    let router = routes::router(AppState::new(Arc::clone(&dispatcher)));

    TestApp {
        fixture,
        durability,
        dispatcher,
        router,
    }
}

/// Send a POST request with a JSON body and the given headers and return the
/// response.
pub async fn post_json(
    app: Router,
    uri: &str,
    headers: &[(&str, &str)],
    body: &serde_json::Value,
) -> (StatusCode, serde_json::Value) {
    let mut request = Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json");
    for (name, value) in headers {
        request = request.header(*name, *value);
    }
    let request = request
        .body(Body::from(serde_json::to_vec(body).unwrap()))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let body_bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json: serde_json::Value = serde_json::from_slice(&body_bytes).unwrap();

    (status, json)
}

/// Send a GET request and return the response.
pub async fn get_json(app: Router, uri: &str) -> (StatusCode, serde_json::Value) {
    let request = Request::builder()
        .method("GET")
        .uri(uri)
        .body(Body::empty())
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let body_bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json: serde_json::Value = serde_json::from_slice(&body_bytes).unwrap();

    (status, json)
}
