mod accounts;
mod app;
mod auth;
mod config;
mod daemon;
mod db;
mod error;
mod events;
mod flash;
mod mail;
mod sessions;
mod state;
mod views;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let env_filter = std::env::var("RUST_LOG")
        .unwrap_or_else(|_| "reseller_panel=debug,axum=info,tower_http=info".to_string());
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

    let config = config::AppConfig::from_env()?;
    let db = db::connect(&config).await?;
    db::migrate(&db).await;
    let session_store = sessions::postgres_store(&db).await?;

    let state = state::AppState::init(config, db)?;
    let app = app::build_app(state, session_store);
    app::serve(app).await
}
