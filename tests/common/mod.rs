#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use axum::{
    body::{to_bytes, Body},
    http::{Request, StatusCode},
    Router,
};
use chrono::{DateTime, Duration, FixedOffset, TimeZone, Utc};
use jsonwebtoken::{encode, EncodingKey, Header};
use serde_json::Value as JsonValue;
use timeclock_backend::{
    database::MemoryStore,
    middleware::auth::Claims,
    routes,
    utils::time::{Clock, ReportingZone},
    AppState,
};
use tower::ServiceExt;

pub const JWT_SECRET: &str = "test_secret_key";
pub const SIGNATURE: &str = "data:image/png;base64,iVBORw0KGgoAAAANSUhEUgAAAAE=";

/// Manually advanced clock shared between the test and the app.
#[derive(Clone)]
pub struct TestClock(Arc<Mutex<DateTime<Utc>>>);

impl TestClock {
    pub fn at(start: DateTime<Utc>) -> Self {
        Self(Arc::new(Mutex::new(start)))
    }

    pub fn advance(&self, by: Duration) {
        let mut now = self.0.lock().unwrap();
        *now = *now + by;
    }

    pub fn set(&self, to: DateTime<Utc>) {
        *self.0.lock().unwrap() = to;
    }
}

impl Clock for TestClock {
    fn now(&self) -> DateTime<Utc> {
        *self.0.lock().unwrap()
    }
}

pub struct TestApp {
    pub router: Router,
    pub store: MemoryStore,
    pub clock: TestClock,
}

/// Wednesday 2026-10-14 09:00 UTC; the week began Sunday 2026-10-11.
pub fn wednesday_morning() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 10, 14, 9, 0, 0).unwrap()
}

pub fn setup_app() -> TestApp {
    setup_app_with_rps(1_000)
}

pub fn setup_app_with_rps(rps: u32) -> TestApp {
    let store = MemoryStore::new();
    let clock = TestClock::at(wednesday_morning());
    let state = AppState::new(
        Arc::new(store.clone()),
        Arc::new(clock.clone()),
        ReportingZone::Fixed(FixedOffset::east_opt(0).unwrap()),
        JWT_SECRET,
    );
    TestApp {
        router: routes::router(state, rps),
        store,
        clock,
    }
}

pub fn token(sub: &str, role: Option<&str>) -> String {
    let claims = Claims {
        sub: sub.to_string(),
        exp: (Utc::now().timestamp() + 3600) as usize,
        role: role.map(str::to_string),
        email: Some(format!("{}@example.com", sub)),
        first_name: Some(sub.to_uppercase()),
        last_name: Some("Tester".to_string()),
        profile_image_url: None,
    };
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(JWT_SECRET.as_bytes()),
    )
    .unwrap()
}

pub async fn send(
    app: &TestApp,
    method: &str,
    uri: &str,
    bearer: Option<&str>,
    body: Option<JsonValue>,
) -> (StatusCode, JsonValue) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = bearer {
        builder = builder.header("authorization", format!("Bearer {}", token));
    }
    let req = match body {
        Some(json) => builder
            .header("content-type", "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };
    let resp = app.router.clone().oneshot(req).await.unwrap();
    let status = resp.status();
    let bytes = to_bytes(resp.into_body(), 4 * 1024 * 1024).await.unwrap();
    let json = if bytes.is_empty() {
        JsonValue::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(JsonValue::Null)
    };
    (status, json)
}
