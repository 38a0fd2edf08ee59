//! Browser sessions for the panel, stored in Postgres.

use anyhow::Context;
use sqlx::PgPool;
use tower_sessions::{Expiry, SessionManagerLayer, SessionStore};
use tower_sessions_sqlx_store::PostgresStore;

use crate::config::AppConfig;

pub const SESSION_COOKIE_NAME: &str = "reseller_panel_session";

const SESSION_EXPIRY_MINUTES: i64 = 24 * 60;

/// Session store backed by the panel database; creates its table on first use.
pub async fn postgres_store(db: &PgPool) -> anyhow::Result<PostgresStore> {
    let store = PostgresStore::new(db.clone());
    store.migrate().await.context("create session table")?;
    Ok(store)
}

pub fn session_layer<S>(store: S, config: &AppConfig) -> SessionManagerLayer<S>
where
    S: SessionStore + Clone,
{
    let is_secure = config.panel_base_url.starts_with("https://");

    SessionManagerLayer::new(store)
        .with_name(SESSION_COOKIE_NAME)
        .with_expiry(Expiry::OnInactivity(time::Duration::minutes(
            SESSION_EXPIRY_MINUTES,
        )))
        .with_secure(is_secure)
        .with_same_site(tower_sessions::cookie::SameSite::Strict)
        .with_http_only(true)
        .with_path("/")
}
