use std::sync::Arc;

use chrono_tz::Tz;
use sea_orm::DatabaseConnection;

use crate::config::AppConfig;

#[derive(Clone)]
pub struct AppState {
    pub orm: DatabaseConnection,
    pub auth: Arc<AuthSettings>,
    pub timezone: Tz,
}

#[derive(Debug)]
pub struct AuthSettings {
    pub jwt_secret: String,
    pub token_ttl_hours: i64,
}

impl AppState {
    pub fn new(orm: DatabaseConnection, config: &AppConfig) -> Self {
        Self {
            orm,
            auth: Arc::new(AuthSettings {
                jwt_secret: config.jwt_secret.clone(),
                token_ttl_hours: 24,
            }),
            timezone: config.timezone,
        }
    }
}
