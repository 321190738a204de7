use axum_extra::extract::cookie::Key;
use frontdoor_access::MemorySessionStore;
use frontdoor_server::{
    app,
    auth::{AppState, OidcClient},
    config::ServerConfig,
    error::StartupError,
};
use rootcause::Report;
use std::net::SocketAddr;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Report<StartupError>> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration from environment
    let config = ServerConfig::from_env().map_err(|e| StartupError::Configuration {
        details: e.to_string(),
    })?;
    tracing::info!(port = config.port, environment = ?config.environment, "Loaded configuration");

    let key = session_key(&config)?;

    // Initialize OIDC client
    tracing::info!(issuer = %config.oidc.domain, "Discovering OIDC provider...");
    let provider = OidcClient::discover(config.provider_descriptor(), config.oidc.timeout)
        .await
        .map_err(|e| StartupError::ProviderDiscovery {
            details: e.to_string(),
        })?;

    let state = AppState::new(config, Arc::new(provider), MemorySessionStore::shared(), key);

    spawn_cleanup(state.clone());

    let addr = SocketAddr::from(([0, 0, 0, 0], state.config.port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|e| StartupError::Bind {
            address: addr.to_string(),
            details: e.to_string(),
        })?;

    tracing::info!("listening on http://{}", addr);

    axum::serve(listener, app::router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| StartupError::Serve {
            details: e.to_string(),
        })?;

    tracing::info!("server stopped");
    Ok(())
}

/// Builds the private cookie key from `SESSION_SECRET`, or a throwaway one.
fn session_key(config: &ServerConfig) -> Result<Key, Report<StartupError>> {
    match &config.session.secret {
        Some(secret) => Ok(Key::try_from(secret.as_bytes()).map_err(|e| {
            StartupError::InvalidSessionSecret {
                details: format!("{e} (need at least 64 bytes)"),
            }
        })?),
        None => {
            tracing::warn!("SESSION_SECRET not set; sessions will not survive a restart");
            Ok(Key::generate())
        }
    }
}

/// Spawns the periodic sweep of expired sessions, sign-ins and tokens.
fn spawn_cleanup(state: AppState) {
    let period = state.config.session.cleanup_interval;
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(period);
        loop {
            interval.tick().await;
            let sessions = state.sessions.purge_expired().await;
            let pending = state.pending.purge_expired().await;
            let tokens = state.csrf.purge_expired().await;
            if sessions + pending + tokens > 0 {
                tracing::debug!(
                    deleted_sessions = sessions,
                    deleted_pending = pending,
                    deleted_tokens = tokens,
                    "Periodic cleanup"
                );
            }
        }
    });
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutdown signal received");
}
