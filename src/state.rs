use std::sync::Arc;

use anyhow::Context;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;

use crate::{
    auth::{
        jwt::JwtKeys,
        repo::{PgUserStore, UserStore},
    },
    config::AppConfig,
    rate_limit::RateLimiter,
    reminders::repo::{PgReminderStore, ReminderStore},
};

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub jwt: JwtKeys,
    pub users: Arc<dyn UserStore>,
    pub reminders: Arc<dyn ReminderStore>,
    pub auth_limiter: RateLimiter,
}

impl AppState {
    /// Connects the pool and wires the Postgres stores.
    pub async fn init(config: AppConfig) -> anyhow::Result<(Self, PgPool)> {
        let db = PgPoolOptions::new()
            .max_connections(config.db_max_connections)
            .connect(&config.database_url)
            .await
            .context("connect to database")?;

        let state = Self::from_parts(
            Arc::new(config),
            Arc::new(PgUserStore::new(db.clone())),
            Arc::new(PgReminderStore::new(db.clone())),
        );
        Ok((state, db))
    }

    pub fn from_parts(
        config: Arc<AppConfig>,
        users: Arc<dyn UserStore>,
        reminders: Arc<dyn ReminderStore>,
    ) -> Self {
        Self {
            jwt: JwtKeys::new(&config.jwt),
            auth_limiter: RateLimiter::new(&config.auth_rate_limit),
            config,
            users,
            reminders,
        }
    }
}
