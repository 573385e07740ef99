use std::env;

use anyhow::Context;
use chrono_tz::Tz;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub host: String,
    pub port: u16,
    pub jwt_secret: String,
    /// Zone used to interpret pickup times submitted without an offset.
    pub timezone: Tz,
    pub db_max_connections: u32,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = env::var("DATABASE_URL")?;
        let jwt_secret = env::var("JWT_SECRET").context("JWT_SECRET is not set")?;
        let host = env::var("APP_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = env::var("APP_PORT")
            .ok()
            .and_then(|p| p.parse::<u16>().ok())
            .unwrap_or(3000);
        let timezone = env::var("APP_TIMEZONE")
            .unwrap_or_else(|_| "Asia/Kolkata".to_string())
            .parse::<Tz>()
            .map_err(|e| anyhow::anyhow!("invalid APP_TIMEZONE: {e}"))?;
        let db_max_connections = env::var("DB_MAX_CONNECTIONS")
            .ok()
            .and_then(|n| n.parse::<u32>().ok())
            .unwrap_or(10);
        Ok(Self {
            port,
            database_url,
            host,
            jwt_secret,
            timezone,
            db_max_connections,
        })
    }
}
