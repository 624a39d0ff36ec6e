use axum::{
    extract::State,
    response::{IntoResponse, Json},
};
use validator::Validate;

use crate::{
    dto::user_dto::{UpdateProfilePayload, UserResponse},
    error::Result,
    middleware::auth::AuthUser,
    models::user::UpsertUser,
    AppState,
};

#[utoipa::path(
    get,
    path = "/api/auth/user",
    responses(
        (status = 200, description = "Caller's user record, synced from the token", body = UserResponse)
    ),
    security(("bearer" = []))
)]
#[axum::debug_handler]
pub async fn current_user(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<impl IntoResponse> {
    let record = state
        .user_service
        .sync(UpsertUser::from(&user.claims))
        .await?;
    Ok(Json(UserResponse::from(record)))
}

#[utoipa::path(
    put,
    path = "/api/users/profile",
    request_body = UpdateProfilePayload,
    responses(
        (status = 200, description = "Profile updated", body = UserResponse),
        (status = 400, description = "Invalid payload"),
        (status = 404, description = "User not found")
    ),
    security(("bearer" = []))
)]
#[axum::debug_handler]
pub async fn update_profile(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<UpdateProfilePayload>,
) -> Result<impl IntoResponse> {
    payload.validate()?;
    let record = state
        .user_service
        .update_profile(&user.id, payload.into())
        .await?;
    Ok(Json(UserResponse::from(record)))
}

#[utoipa::path(
    get,
    path = "/api/users",
    responses(
        (status = 200, description = "Active employees", body = [UserResponse]),
        (status = 403, description = "Caller is not an administrator")
    ),
    security(("bearer" = []))
)]
#[axum::debug_handler]
pub async fn list_users(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<impl IntoResponse> {
    user.require_admin()?;
    let users = state.user_service.list_active().await?;
    let body: Vec<UserResponse> = users.into_iter().map(Into::into).collect();
    Ok(Json(body))
}
