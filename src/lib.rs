pub mod config;
pub mod database;
pub mod dto;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod utils;

use std::sync::Arc;

use jsonwebtoken::DecodingKey;

use crate::database::Store;
use crate::services::{
    analytics_service::AnalyticsService, time_entry_service::TimeEntryService,
    user_service::UserService,
};
use crate::utils::time::{Clock, ReportingZone};

#[derive(Clone)]
pub struct AppState {
    pub time_entry_service: TimeEntryService,
    pub analytics_service: AnalyticsService,
    pub user_service: UserService,
    pub decoding_key: DecodingKey,
}

impl AppState {
    pub fn new(
        store: Arc<dyn Store>,
        clock: Arc<dyn Clock>,
        zone: ReportingZone,
        jwt_secret: &str,
    ) -> Self {
        let time_entry_service = TimeEntryService::new(store.clone(), clock.clone());
        let analytics_service = AnalyticsService::new(store.clone(), clock.clone(), zone);
        let user_service = UserService::new(store, clock);

        Self {
            time_entry_service,
            analytics_service,
            user_service,
            decoding_key: DecodingKey::from_secret(jwt_secret.as_bytes()),
        }
    }
}
