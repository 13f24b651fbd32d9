mod ai;
mod app;
mod chat;
mod config;
mod conversations;
mod db;
mod error;
mod exercises;
mod extractors;
mod responses;
mod state;
mod users;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let env_filter = std::env::var("RUST_LOG")
        .unwrap_or_else(|_| "fitchat=debug,axum=info,tower_http=info".to_string());
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

    let app_state = state::AppState::init().await?;

    // Run migrations if present
    if let Err(e) = sqlx::migrate!("./migrations").run(app_state.db.pool()).await {
        tracing::warn!(error = %e, "migration failed; continuing");
    }

    let router = app::build_app(app_state.clone());
    let served = app::serve(router, &app_state).await;

    app_state.db.close().await;
    tracing::info!("database pool closed");
    served
}
