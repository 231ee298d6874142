mod admin;
mod app;
mod auth;
mod config;
mod dishes;
mod error;
mod ingredients;
mod markets;
mod meal_plans;
mod params;
mod profile;
mod shopping;
mod state;
mod stock;
mod storage;

use crate::{auth::repo_types::User, state::AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let env_filter = std::env::var("RUST_LOG")
        .unwrap_or_else(|_| "smartmeal=debug,axum=info,tower_http=info".to_string());
    let json_logs = std::env::var("LOG_FORMAT")
        .map(|v| v == "json")
        .unwrap_or(false);

    if json_logs {
        tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_target(false)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(env_filter).init();
    }

    let app_state = AppState::init().await?;

    if let Err(e) = sqlx::migrate!("./migrations").run(&app_state.db).await {
        tracing::warn!(error = %e, "migration failed; continuing");
    }

    if let Some(email) = app_state.config.bootstrap_admin_email.as_deref() {
        match User::promote_by_email(&app_state.db, email).await {
            Ok(true) => tracing::info!(%email, "bootstrap admin granted"),
            Ok(false) => tracing::warn!(%email, "bootstrap admin account does not exist yet"),
            Err(e) => tracing::error!(error = %e, "bootstrap admin promotion failed"),
        }
    }

    app::serve(app::build_app(app_state)).await
}
