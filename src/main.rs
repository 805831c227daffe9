use anyhow::{Context, Result};
use axum::Router;
use std::{io::ErrorKind, sync::Arc};
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

use room_booking::{
    config::AppConfig,
    handlers::{AppState, admin_handlers::AdminAuth},
    notify::{LogNotifier, Notifier, TelegramNotifier},
    routes,
    services::ReservationService,
    store::{MemoryReservationStore, ReservationStore, SqliteReservationStore},
    validation::{AdmissionPipeline, ScheduleTable},
};

#[tokio::main]
async fn main() -> Result<()> {
    // --- Logging setup ---
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    // --- Parse config + migrate flag ---
    let (cfg, migrate) = AppConfig::from_env_and_args()?;

    tracing::info!("Starting room-booking with config: {:?}", cfg);

    // --- Initialize reservation store ---
    let store: Arc<dyn ReservationStore> = match &cfg.database_url {
        Some(db_url) => {
            tracing::debug!("Connecting using raw URL => {}", db_url);
            let sqlite = SqliteReservationStore::connect(db_url).await?;
            sqlite
                .migrate()
                .await
                .context("applying reservation schema")?;

            // --- Handle migration mode ---
            if migrate {
                tracing::info!("Database migration complete.");
                return Ok(()); // exit after migration
            }
            Arc::new(sqlite)
        }
        None => {
            if migrate {
                anyhow::bail!("--migrate needs a database url");
            }
            tracing::warn!("No database url configured; reservations are kept in memory");
            Arc::new(MemoryReservationStore::new())
        }
    };

    // --- Admission rules ---
    let schedule = match &cfg.schedule_file {
        Some(path) => {
            tracing::info!("Loading room schedule from {}", path.display());
            ScheduleTable::from_json_file(path)?
        }
        None => ScheduleTable::default(),
    };
    let pipeline = Arc::new(AdmissionPipeline::new(Arc::new(schedule)));

    let notifier: Arc<dyn Notifier> = match &cfg.telegram {
        Some(tg) => {
            tracing::info!("Telegram notifications enabled for chat {}", tg.chat_id);
            Arc::new(TelegramNotifier::new(tg.bot_token.clone(), tg.chat_id)?)
        }
        None => Arc::new(LogNotifier),
    };

    // --- Initialize core service ---
    let service = ReservationService::new(store, pipeline, notifier)
        .with_store_timeout(cfg.store_timeout);
    if cfg.admin_password.is_none() {
        tracing::warn!("No admin password configured; admin login is disabled");
    }
    let admin = AdminAuth::new(cfg.admin_password.clone());

    // --- Build router ---
    let app: Router = routes::routes::routes().with_state(AppState::new(service, admin));

    // --- Start server ---
    let addr = cfg.addr();
    let listener = match TcpListener::bind(&addr).await {
        Ok(listener) => listener,
        Err(err)
            if err.kind() == ErrorKind::PermissionDenied
                && matches!(cfg.host.as_str(), "0.0.0.0" | "::") =>
        {
            let fallback_addr = format!("127.0.0.1:{}", cfg.port);
            tracing::warn!(
                "Permission denied binding to {} ({}). Falling back to {}",
                addr,
                err,
                fallback_addr
            );
            TcpListener::bind(&fallback_addr).await?
        }
        Err(err) => return Err(err).with_context(|| format!("binding {}", addr)),
    };

    tracing::info!("Server listening on http://{}", listener.local_addr()?);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}

/// Resolves on Ctrl-C, or SIGTERM on unix.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::warn!("failed to listen for Ctrl-C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::warn!("failed to listen for SIGTERM: {}", e);
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
    tracing::info!("Shutdown signal received");
}
