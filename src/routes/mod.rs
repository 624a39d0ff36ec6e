pub mod analytics;
pub mod docs;
pub mod health;
pub mod time_entries;
pub mod users;

use axum::{
    extract::DefaultBodyLimit,
    middleware::from_fn_with_state,
    routing::{get, post, put},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::middleware::{
    auth::require_bearer_auth,
    rate_limit::{rps_middleware, RateLimiter},
};
use crate::AppState;

/// Two signature images fit comfortably.
const MAX_BODY_BYTES: usize = 2 * 1024 * 1024;

/// Builds the full HTTP surface. Everything under `/api` except the
/// OpenAPI document requires a bearer token.
pub fn router(state: AppState, api_rps: u32) -> Router {
    let api = Router::new()
        .route("/api/time-entries", get(time_entries::list_all_entries))
        .route("/api/time-entries/clock-in", post(time_entries::clock_in))
        .route("/api/time-entries/active", get(time_entries::get_active_entry))
        .route("/api/time-entries/user", get(time_entries::list_user_entries))
        .route(
            "/api/time-entries/:id/clock-out",
            put(time_entries::clock_out),
        )
        .route("/api/analytics/user-stats", get(analytics::user_stats))
        .route("/api/analytics/system-stats", get(analytics::system_stats))
        .route("/api/analytics/employees", get(analytics::employee_summaries))
        .route("/api/auth/user", get(users::current_user))
        .route("/api/users/profile", put(users::update_profile))
        .route("/api/users", get(users::list_users))
        .layer(from_fn_with_state(RateLimiter::new(api_rps), rps_middleware))
        .layer(from_fn_with_state(state.clone(), require_bearer_auth));

    Router::new()
        .route("/health", get(health::health))
        .route("/api/openapi.json", get(docs::openapi_json))
        .merge(api)
        .with_state(state)
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}
