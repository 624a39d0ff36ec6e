pub mod analytics_dto;
pub mod time_entry_dto;
pub mod user_dto;
