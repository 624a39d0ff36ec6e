use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Json},
};
use uuid::Uuid;

use crate::{
    dto::time_entry_dto::{ClockOutPayload, HistoryQuery, TimeEntryResponse},
    error::Result,
    middleware::auth::AuthUser,
    models::user::UpsertUser,
    AppState,
};

fn to_responses(entries: Vec<crate::models::time_entry::TimeEntry>) -> Vec<TimeEntryResponse> {
    entries.into_iter().map(TimeEntryResponse::from).collect()
}

#[utoipa::path(
    post,
    path = "/api/time-entries/clock-in",
    responses(
        (status = 201, description = "Clocked in", body = TimeEntryResponse),
        (status = 409, description = "Already clocked in")
    ),
    security(("bearer" = []))
)]
#[axum::debug_handler]
pub async fn clock_in(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<impl IntoResponse> {
    state
        .user_service
        .sync(UpsertUser::from(&user.claims))
        .await?;
    let entry = state.time_entry_service.clock_in(&user.id).await?;
    Ok((StatusCode::CREATED, Json(TimeEntryResponse::from(entry))))
}

#[utoipa::path(
    put,
    path = "/api/time-entries/{id}/clock-out",
    params(
        ("id" = Uuid, Path, description = "Time entry ID")
    ),
    request_body = ClockOutPayload,
    responses(
        (status = 200, description = "Clocked out", body = TimeEntryResponse),
        (status = 400, description = "Malformed signature"),
        (status = 404, description = "Entry not found or not owned by caller"),
        (status = 409, description = "Entry already completed")
    ),
    security(("bearer" = []))
)]
#[axum::debug_handler]
pub async fn clock_out(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<ClockOutPayload>,
) -> Result<impl IntoResponse> {
    let entry = state
        .time_entry_service
        .clock_out(id, &user.id, payload.into())
        .await?;
    Ok(Json(TimeEntryResponse::from(entry)))
}

#[utoipa::path(
    get,
    path = "/api/time-entries/active",
    responses(
        (status = 200, description = "Active entry, or null when clocked out", body = TimeEntryResponse)
    ),
    security(("bearer" = []))
)]
#[axum::debug_handler]
pub async fn get_active_entry(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<impl IntoResponse> {
    let entry = state.time_entry_service.active_entry(&user.id).await?;
    Ok(Json(entry.map(TimeEntryResponse::from)))
}

#[utoipa::path(
    get,
    path = "/api/time-entries/user",
    params(HistoryQuery),
    responses(
        (status = 200, description = "Caller's entries, newest first", body = [TimeEntryResponse])
    ),
    security(("bearer" = []))
)]
#[axum::debug_handler]
pub async fn list_user_entries(
    State(state): State<AppState>,
    user: AuthUser,
    Query(query): Query<HistoryQuery>,
) -> Result<impl IntoResponse> {
    let entries = state
        .time_entry_service
        .user_history(&user.id, query.limit)
        .await?;
    Ok(Json(to_responses(entries)))
}

#[utoipa::path(
    get,
    path = "/api/time-entries",
    responses(
        (status = 200, description = "All entries, newest first", body = [TimeEntryResponse]),
        (status = 403, description = "Caller is not an administrator")
    ),
    security(("bearer" = []))
)]
#[axum::debug_handler]
pub async fn list_all_entries(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<impl IntoResponse> {
    user.require_admin()?;
    let entries = state.time_entry_service.all_entries().await?;
    Ok(Json(to_responses(entries)))
}
