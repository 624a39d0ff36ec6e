use crate::error::{Error, Result};
use crate::utils::time::ReportingZone;
use chrono::FixedOffset;
use dotenvy::dotenv;
use std::env;
use std::sync::OnceLock;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Pretty,
    Json,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub server_address: String,
    pub database_url: String,
    pub jwt_secret: String,
    pub api_rps: u32,
    pub db_max_connections: u32,
    pub reporting_zone: ReportingZone,
    pub log_format: LogFormat,
}

pub static CONFIG: OnceLock<Config> = OnceLock::new();

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenv().ok();

        let reporting_zone = match env::var("REPORTING_UTC_OFFSET") {
            Ok(raw) if !raw.trim().is_empty() => {
                let offset: FixedOffset = raw.trim().parse().map_err(|e| {
                    Error::Config(format!("Invalid value for REPORTING_UTC_OFFSET: {}", e))
                })?;
                ReportingZone::Fixed(offset)
            }
            _ => ReportingZone::Local,
        };

        let log_format = match env::var("LOG_FORMAT").as_deref() {
            Ok("json") => LogFormat::Json,
            Ok("pretty") | Err(_) => LogFormat::Pretty,
            Ok(other) => {
                return Err(Error::Config(format!(
                    "Invalid value for LOG_FORMAT: {} (expected json or pretty)",
                    other
                )))
            }
        };

        Ok(Self {
            server_address: get_env_or("SERVER_ADDRESS", "0.0.0.0:8080"),
            database_url: get_env("DATABASE_URL")?,
            jwt_secret: get_env("JWT_SECRET")?,
            api_rps: get_env_parse_or("API_RPS", 20)?,
            db_max_connections: get_env_parse_or("DB_MAX_CONNECTIONS", 20)?,
            reporting_zone,
            log_format,
        })
    }
}

fn get_env(name: &str) -> Result<String> {
    env::var(name).map_err(|_| Error::Config(format!("Missing environment variable: {}", name)))
}

fn get_env_or(name: &str, default: &str) -> String {
    env::var(name).unwrap_or_else(|_| default.to_string())
}

fn get_env_parse_or<T>(name: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match env::var(name) {
        Ok(raw) => raw
            .parse()
            .map_err(|e| Error::Config(format!("Invalid value for {}: {}", name, e))),
        Err(_) => Ok(default),
    }
}

pub fn init_config() -> Result<()> {
    let config = Config::from_env()?;
    CONFIG
        .set(config)
        .map_err(|_| Error::Config("Configuration has already been initialized".to_string()))?;
    Ok(())
}

pub fn get_config() -> &'static Config {
    CONFIG
        .get()
        .expect("Configuration has not been initialized")
}
