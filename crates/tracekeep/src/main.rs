//! Tracekeep server
//!
//! Serves the traceability event API over a SQLite database.

use clap::Parser;
use tracekeep_rest::{ServerConfig, create_app_with_config, init_logging};
use tracing::info;

#[cfg(feature = "sqlite")]
use tracekeep_persistence::backends::sqlite::{SqliteBackend, SqliteBackendConfig};

/// Creates and initializes a SQLite backend from the server configuration.
#[cfg(feature = "sqlite")]
fn create_sqlite_backend(config: &ServerConfig) -> anyhow::Result<SqliteBackend> {
    let db_path = config.database_url.as_deref().unwrap_or(":memory:");
    info!(database = %db_path, "Initializing SQLite backend");

    let backend_config = SqliteBackendConfig {
        tenancy: config.tenancy(),
        ..Default::default()
    };

    let backend = SqliteBackend::with_config(db_path, backend_config)?;
    backend.init_schema()?;

    Ok(backend)
}

/// Starts the Axum HTTP server.
async fn serve(app: axum::Router, config: &ServerConfig) -> anyhow::Result<()> {
    let addr = config.socket_addr();
    info!(address = %addr, "Server listening");
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = ServerConfig::parse();
    init_logging(&config.log_level);

    if let Err(errors) = config.validate() {
        for error in &errors {
            eprintln!("Configuration error: {}", error);
        }
        std::process::exit(1);
    }

    info!(
        port = config.port,
        host = %config.host,
        tenant_policy = %config.tenant_policy,
        header_fallback = config.header_fallback,
        "Starting Tracekeep"
    );

    start_sqlite(config).await
}

/// Starts the server with the SQLite backend.
#[cfg(feature = "sqlite")]
async fn start_sqlite(config: ServerConfig) -> anyhow::Result<()> {
    let backend = create_sqlite_backend(&config)?;
    let app = create_app_with_config(backend, config.clone());
    serve(app, &config).await
}

/// Fallback when the sqlite feature is not enabled.
#[cfg(not(feature = "sqlite"))]
async fn start_sqlite(_config: ServerConfig) -> anyhow::Result<()> {
    anyhow::bail!(
        "The sqlite backend requires the 'sqlite' feature. \
         Build with: cargo build -p tracekeep --features sqlite"
    )
}
