mod app;
mod auth;
mod config;
mod error;
mod rate_limit;
mod reminders;
mod response;
mod state;
#[cfg(test)]
mod test_support;

use crate::{
    config::{AppConfig, Environment},
    state::AppState,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let production = std::env::var("APP_ENV")
        .ok()
        .and_then(|v| Environment::parse(&v).ok())
        .is_some_and(Environment::is_production);
    let env_filter = std::env::var("RUST_LOG")
        .unwrap_or_else(|_| "reminders=debug,axum=info,tower_http=info".to_string());
    let json_logs = std::env::var("LOG_FORMAT")
        .map(|v| v == "json")
        .unwrap_or(production);

    if json_logs {
        tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_target(false)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(env_filter).init();
    }

    let config = AppConfig::from_env()?;
    auth::password::warm_up();
    let (app_state, db) = AppState::init(config).await?;

    sqlx::migrate!("./migrations").run(&db).await?;
    tracing::info!("migrations applied");

    let app = app::build_app(app_state.clone());
    app::serve(app, &app_state.config).await
}
