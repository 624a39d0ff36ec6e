pub mod analytics_service;
pub mod time_entry_service;
pub mod user_service;
