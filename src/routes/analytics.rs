use axum::{
    extract::State,
    response::{IntoResponse, Json},
};

use crate::{
    dto::analytics_dto::{EmployeeSummaryResponse, SystemStatsResponse, UserStatsResponse},
    error::Result,
    middleware::auth::AuthUser,
    AppState,
};

#[utoipa::path(
    get,
    path = "/api/analytics/user-stats",
    responses(
        (status = 200, description = "Caller's weekly and monthly totals", body = UserStatsResponse)
    ),
    security(("bearer" = []))
)]
#[axum::debug_handler]
pub async fn user_stats(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<impl IntoResponse> {
    let totals = state.analytics_service.user_totals(&user.id).await?;
    Ok(Json(UserStatsResponse::from(totals)))
}

#[utoipa::path(
    get,
    path = "/api/analytics/system-stats",
    responses(
        (status = 200, description = "System-wide aggregates", body = SystemStatsResponse),
        (status = 403, description = "Caller is not an administrator")
    ),
    security(("bearer" = []))
)]
#[axum::debug_handler]
pub async fn system_stats(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<impl IntoResponse> {
    user.require_admin()?;
    let stats = state.analytics_service.system_stats().await?;
    Ok(Json(SystemStatsResponse::from(stats)))
}

#[utoipa::path(
    get,
    path = "/api/analytics/employees",
    responses(
        (status = 200, description = "Per-employee today/week totals", body = [EmployeeSummaryResponse]),
        (status = 403, description = "Caller is not an administrator")
    ),
    security(("bearer" = []))
)]
#[axum::debug_handler]
pub async fn employee_summaries(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<impl IntoResponse> {
    user.require_admin()?;
    let summaries = state.analytics_service.employee_summaries().await?;
    let body: Vec<EmployeeSummaryResponse> = summaries.into_iter().map(Into::into).collect();
    Ok(Json(body))
}
