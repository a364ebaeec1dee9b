use axum::{ServiceExt, extract::Request};
use clap::Parser;
use mytodo::VERSION;
use mytodo::db;
use mytodo::server::config::ServerConfig;
use mytodo::web::{AppState, create_axum_router};
use std::net::SocketAddr;
use std::sync::Arc;
use tower::Layer;
use tower_http::normalize_path::NormalizePathLayer;
use tracing::{error, info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(author, version = VERSION, about, long_about = None)]
struct Args {
    /// Path to the configuration file
    #[arg(short, long)]
    config: Option<String>,
}

fn init_logging(log_dir: &str) -> WorkerGuard {
    // Log to a file: JSON format, daily rotation
    let file_appender = rolling::daily(log_dir, "server.log");
    let (file_writer, guard) = tracing_appender::non_blocking(file_appender);
    let file_layer = fmt::layer()
        .with_writer(file_writer)
        .with_ansi(false)
        .json();

    let stdout_layer = fmt::layer().with_writer(std::io::stdout);

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,sea_orm=warn,sqlx::query=warn"));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(file_layer)
        .with(stdout_layer)
        .init();

    guard
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!(error = %e, "Failed to listen for the shutdown signal.");
        return;
    }
    info!("Shutdown signal received.");
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let args = Args::parse();

    let server_config = ServerConfig::load(args.config.as_deref())
        .map_err(|e| format!("Failed to load server configuration: {e}"))?;

    let _log_guard = init_logging(&server_config.log_dir);
    info!("Starting server, version: {}", VERSION);

    let db_pool = db::connect(&server_config.database_url).await.map_err(|e| {
        error!(error = %e, "Failed to create database connection.");
        e
    })?;
    db::migrate(&db_pool).await?;

    if server_config.openai_api_key.is_empty() {
        warn!("OPENAI_API_KEY is not set; /todoai requests will fail.");
    }

    let app_state = Arc::new(AppState::from_database(
        db_pool,
        &server_config.jwt_secret,
        &server_config.openai_api_key,
    ));
    let router = create_axum_router(app_state);
    let app = NormalizePathLayer::trim_trailing_slash().layer(router);

    let addr = SocketAddr::from(([0, 0, 0, 0], server_config.server_port));
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(address = %addr, "HTTP server listening");

    axum::serve(listener, ServiceExt::<Request>::into_make_service(app))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped.");
    Ok(())
}
