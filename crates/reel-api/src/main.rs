use std::sync::Arc;

use reel_api::config::Config;
use reel_api::routes;
use reel_api::state::AppState;
use reel_query::QueryBuilder;
#[cfg(unix)]
use reel_store::MemoryStore;
use tracing_subscriber::EnvFilter;

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("failed to listen for ctrl-c: {e}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{SignalKind, signal};
        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!("failed to register SIGTERM handler: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {}
        _ = terminate => {}
    }
    tracing::info!("shutdown signal received");
}

/// Reload the data file on every SIGHUP.
#[cfg(unix)]
async fn reload_on_hangup(store: Arc<MemoryStore>, config: Config) {
    use tokio::signal::unix::{SignalKind, signal};
    let mut hangup = match signal(SignalKind::hangup()) {
        Ok(s) => s,
        Err(e) => {
            tracing::error!("failed to register SIGHUP handler: {e}");
            return;
        }
    };
    while hangup.recv().await.is_some() {
        let store = store.clone();
        let config = config.clone();
        match tokio::task::spawn_blocking(move || reel_api::reload_store(&store, &config)).await {
            Ok(Ok(_)) => {}
            Ok(Err(e)) => tracing::error!("reload failed; keeping current collection: {e}"),
            Err(e) => tracing::error!("reload task failed: {e}"),
        }
    }
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = Config::from_env().unwrap_or_else(|e| {
        tracing::error!("{e}");
        std::process::exit(1);
    });

    let store = reel_api::open_store(&config).unwrap_or_else(|e| {
        tracing::error!("failed to load collection: {e}");
        std::process::exit(1);
    });

    let store = Arc::new(store);
    #[cfg(unix)]
    tokio::spawn(reload_on_hangup(store.clone(), config.clone()));

    let state = AppState::new(store, QueryBuilder::new(config.max_limit));
    let app = routes::router().with_state(state);

    let listener = tokio::net::TcpListener::bind(config.api_addr)
        .await
        .unwrap_or_else(|e| {
            tracing::error!("failed to bind {}: {e}", config.api_addr);
            std::process::exit(1);
        });

    tracing::info!(
        max_limit = config.max_limit,
        "reel-api listening on {}",
        config.api_addr
    );
    if let Err(e) = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
    {
        tracing::error!("server error: {e}");
        std::process::exit(1);
    }
    tracing::info!("shutdown complete");
}
