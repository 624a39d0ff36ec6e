use axum::{response::IntoResponse, Json};
use utoipa::{
    openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    Modify, OpenApi,
};

use crate::dto::{
    analytics_dto::{EmployeeSummaryResponse, SystemStatsResponse, UserStatsResponse},
    time_entry_dto::{ClockOutPayload, TimeEntryResponse},
    user_dto::{UpdateProfilePayload, UserResponse},
};
use crate::models::time_entry::EntryStatus;

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::routes::time_entries::clock_in,
        crate::routes::time_entries::clock_out,
        crate::routes::time_entries::get_active_entry,
        crate::routes::time_entries::list_user_entries,
        crate::routes::time_entries::list_all_entries,
        crate::routes::analytics::user_stats,
        crate::routes::analytics::system_stats,
        crate::routes::analytics::employee_summaries,
        crate::routes::users::current_user,
        crate::routes::users::update_profile,
        crate::routes::users::list_users,
    ),
    components(schemas(
        EntryStatus,
        TimeEntryResponse,
        ClockOutPayload,
        UserStatsResponse,
        SystemStatsResponse,
        EmployeeSummaryResponse,
        UserResponse,
        UpdateProfilePayload,
    )),
    modifiers(&BearerAuth),
    tags((name = "timeclock", description = "Employee time tracking"))
)]
pub struct ApiDoc;

struct BearerAuth;

impl Modify for BearerAuth {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}

pub async fn openapi_json() -> impl IntoResponse {
    Json(ApiDoc::openapi())
}
