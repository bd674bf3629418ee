use std::sync::Arc;

use anyhow::Context;
use sea_orm::Database;
use tokio::net::TcpListener;
use tokio::signal;
use tracing::info;

use beos_auth_types::bearer::JwtSecret;
use beos_core::config::Config;
use beos_core::tracing::init_tracing;

use beos_api::config::ApiConfig;
use beos_api::infra::identity::GoTrueClient;
use beos_api::infra::realtime::RealtimeHub;
use beos_api::router::build_router;
use beos_api::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = ApiConfig::from_env().context("failed to load configuration")?;
    init_tracing(config.log_format);

    let db = Database::connect(&config.database_url)
        .await
        .context("failed to connect to database")?;

    let state = AppState {
        db: Arc::new(db),
        identity: GoTrueClient::new(&config.supabase_url, &config.supabase_key)
            .context("failed to build identity client")?,
        realtime: RealtimeHub::new(),
        jwt_secret: JwtSecret::new(config.jwt_secret.as_str()),
    };

    let router = build_router(state, &config.cors_origin_list());
    let addr = format!("0.0.0.0:{}", config.api_port);
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;

    info!("api listening on {addr}");
    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    info!("api shut down");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
        info!("received Ctrl+C, shutting down");
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
                info!("received terminate signal, shutting down");
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
