use std::sync::Arc;

use sqlx::PgPool;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use signalminer_core::cache::SignalCache;
use signalminer_core::fetcher::SignalFetcher;

mod dashboard;
mod routes;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let settings = signalminer_core::config::Settings::from_env()?;
    let _sentry_guard = init_sentry(&settings);

    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env())
        .with(tracing_subscriber::fmt::layer())
        .with(sentry_tracing::layer())
        .init();

    let pool: Option<PgPool> = match settings.database_url.as_deref() {
        Some(db_url) => match signalminer_core::storage::connect(db_url).await {
            Ok(pool) => Some(pool),
            Err(e) => {
                sentry_anyhow::capture_anyhow(&e);
                tracing::error!(error = %e, "database unavailable; history disabled");
                None
            }
        },
        None => {
            tracing::info!("DATABASE_URL not set; history disabled");
            None
        }
    };

    let state = routes::AppState {
        fetcher: SignalFetcher::from_settings(&settings),
        cache: Arc::new(SignalCache::new(settings.cache_ttl)),
        pool,
    };

    let addr = std::net::SocketAddr::from(([0, 0, 0, 0], settings.port));
    tracing::info!(
        %addr,
        live = state.fetcher.has_client(),
        cache_ttl_secs = state.cache.ttl().as_secs(),
        history = state.pool.is_some(),
        "dashboard listening"
    );

    let app = routes::router(state);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
}

fn init_sentry(settings: &signalminer_core::config::Settings) -> Option<sentry::ClientInitGuard> {
    let dsn = settings.sentry_dsn.as_deref()?;
    Some(sentry::init((
        dsn,
        sentry::ClientOptions {
            release: sentry::release_name!(),
            ..Default::default()
        },
    )))
}
