//! Overseer API server entry point.

use std::sync::Arc;

use overseer_api::config::ServerConfig;
use overseer_api::error::AppError;
use overseer_api::routes;
use overseer_api::state::AppState;
use overseer_core::clock::SystemClock;
use overseer_engine::application::dispatcher::{DispatcherPorts, EventDispatcher};
use overseer_engine::domain::registry::HandlerRegistry;
use overseer_engine::handlers::new_game::NewGameHandler;
use overseer_store::pg_directory::PgDirectory;
use overseer_store::pg_event_store::PgEventStore;
use overseer_store::pg_ticket_lock::PgTicketLock;
use sqlx::postgres::PgPoolOptions;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), AppError> {
    // Initialize tracing subscriber.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .json()
        .init();

    tracing::info!("Starting Overseer API server");

    let config = ServerConfig::from_env()?;

    // Create database connection pool and bring the schema up to date.
    let pool = PgPoolOptions::new()
        .max_connections(config.db_max_connections)
        .connect(&config.database_url)
        .await?;
    sqlx::migrate!("../../migrations").run(&pool).await?;

    // Wire the dispatcher.
    let clock = Arc::new(SystemClock);
    let directory = Arc::new(PgDirectory::new(pool.clone()));
    let registry = HandlerRegistry::new(vec![Arc::new(NewGameHandler::new(directory.clone()))]);
    let ports = DispatcherPorts {
        games: directory.clone(),
        actors: directory,
        durability: Arc::new(PgEventStore::new(pool.clone(), clock.clone())),
        locks: Arc::new(PgTicketLock::new(pool, config.lock)),
        clock,
    };
    let dispatcher = Arc::new(EventDispatcher::new(registry, ports, config.dispatcher));
    tracing::info!(handlers = ?dispatcher.handler_names(), "dispatcher ready");

    // TODO: Replace CorsLayer::permissive() with restricted origins for production.
    let app = routes::router(AppState::new(Arc::clone(&dispatcher)))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr = config.addr()?;
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(dispatcher))
        .await?;

    Ok(())
}

/// Resolves on Ctrl-C after cancelling every in-flight lock wait.
async fn shutdown_signal(dispatcher: Arc<EventDispatcher>) {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %err, "failed to listen for shutdown signal");
    }
    dispatcher.shutdown();
}
