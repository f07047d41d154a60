//! Server configuration for the Tracekeep REST API.
//!
//! Supports programmatic configuration, command line flags and environment
//! variable overrides.
//!
//! # Environment Variables
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `TRACEKEEP_PORT` | 8080 | Server port |
//! | `TRACEKEEP_HOST` | 127.0.0.1 | Host to bind |
//! | `TRACEKEEP_LOG_LEVEL` | info | Log level |
//! | `TRACEKEEP_MAX_BODY_SIZE` | 1048576 | Max request body (bytes) |
//! | `TRACEKEEP_REQUEST_TIMEOUT` | 30 | Request timeout (seconds) |
//! | `TRACEKEEP_ENABLE_CORS` | true | Enable CORS |
//! | `TRACEKEEP_CORS_ORIGINS` | * | Allowed origins |
//! | `TRACEKEEP_CORS_METHODS` | GET,POST,OPTIONS | Allowed methods |
//! | `TRACEKEEP_CORS_HEADERS` | Content-Type,Authorization,Accept,X-Tenant-ID | Allowed headers |
//! | `TRACEKEEP_DATABASE_URL` | (in-memory) | SQLite database path |
//! | `TRACEKEEP_TENANT_POLICY` | fail-open | Behaviour when no tenant resolves |
//! | `TRACEKEEP_HEADER_FALLBACK` | true | Consult `X-Tenant-ID` when the session has no tenant |
//!
//! # Example
//!
//! ```rust
//! use tracekeep_rest::ServerConfig;
//! use tracekeep_persistence::strategy::TenantResolutionPolicy;
//!
//! let config = ServerConfig {
//!     port: 3000,
//!     tenant_policy: TenantResolutionPolicy::FailClosed,
//!     ..Default::default()
//! };
//! assert!(config.validate().is_ok());
//! ```

use clap::Parser;
use tracekeep_persistence::strategy::{SharedSchemaConfig, TenantResolutionPolicy};

/// Server configuration for the Tracekeep REST API.
#[derive(Debug, Clone, Parser)]
#[command(name = "tracekeep")]
#[command(about = "Tenant-scoped traceability event service")]
pub struct ServerConfig {
    /// Port to listen on.
    #[arg(short, long, env = "TRACEKEEP_PORT", default_value = "8080")]
    pub port: u16,

    /// Host address to bind to.
    #[arg(long, env = "TRACEKEEP_HOST", default_value = "127.0.0.1")]
    pub host: String,

    /// Log level (error, warn, info, debug, trace).
    #[arg(long, env = "TRACEKEEP_LOG_LEVEL", default_value = "info")]
    pub log_level: String,

    /// Maximum request body size in bytes.
    #[arg(long, env = "TRACEKEEP_MAX_BODY_SIZE", default_value = "1048576")]
    pub max_body_size: usize,

    /// Request timeout in seconds.
    #[arg(long, env = "TRACEKEEP_REQUEST_TIMEOUT", default_value = "30")]
    pub request_timeout: u64,

    /// Enable CORS.
    #[arg(long, env = "TRACEKEEP_ENABLE_CORS", default_value = "true")]
    pub enable_cors: bool,

    /// Allowed CORS origins (comma-separated, or * for all).
    #[arg(long, env = "TRACEKEEP_CORS_ORIGINS", default_value = "*")]
    pub cors_origins: String,

    /// Allowed CORS methods (comma-separated, or * for all).
    #[arg(long, env = "TRACEKEEP_CORS_METHODS", default_value = "GET,POST,OPTIONS")]
    pub cors_methods: String,

    /// Allowed CORS headers (comma-separated, or * for all).
    #[arg(
        long,
        env = "TRACEKEEP_CORS_HEADERS",
        default_value = "Content-Type,Authorization,Accept,X-Tenant-ID"
    )]
    pub cors_headers: String,

    /// SQLite database path. An in-memory database is used when unset.
    #[arg(long, env = "TRACEKEEP_DATABASE_URL")]
    pub database_url: Option<String>,

    /// What to do when neither the session nor the header names a tenant.
    #[arg(long, env = "TRACEKEEP_TENANT_POLICY", default_value = "fail-open")]
    pub tenant_policy: TenantResolutionPolicy,

    /// Consult the X-Tenant-ID header when the session carries no tenant.
    #[arg(
        long,
        env = "TRACEKEEP_HEADER_FALLBACK",
        default_value = "true",
        action = clap::ArgAction::Set
    )]
    pub header_fallback: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: 8080,
            host: "127.0.0.1".to_string(),
            log_level: "info".to_string(),
            max_body_size: 1024 * 1024, // 1MB
            request_timeout: 30,
            enable_cors: true,
            cors_origins: "*".to_string(),
            cors_methods: "GET,POST,OPTIONS".to_string(),
            cors_headers: "Content-Type,Authorization,Accept,X-Tenant-ID".to_string(),
            database_url: None,
            tenant_policy: TenantResolutionPolicy::FailOpen,
            header_fallback: true,
        }
    }
}

impl ServerConfig {
    /// Creates a new ServerConfig from environment variables.
    pub fn from_env() -> Self {
        Self::try_parse().unwrap_or_default()
    }

    /// Returns the socket address to bind to.
    pub fn socket_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Returns the tenant scoping configuration for the storage backend.
    pub fn tenancy(&self) -> SharedSchemaConfig {
        SharedSchemaConfig {
            policy: self.tenant_policy,
            header_fallback: self.header_fallback,
            ..SharedSchemaConfig::default()
        }
    }

    /// Validates the configuration and returns errors if any.
    pub fn validate(&self) -> Result<(), Vec<String>> {
        let mut errors = Vec::new();

        if self.port == 0 {
            errors.push("Port cannot be 0".to_string());
        }

        if self.max_body_size == 0 {
            errors.push("Max body size cannot be 0".to_string());
        }

        if self.request_timeout == 0 {
            errors.push("Request timeout cannot be 0".to_string());
        }

        if self
            .database_url
            .as_deref()
            .is_some_and(|url| url.trim().is_empty())
        {
            errors.push("Database URL cannot be blank".to_string());
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    /// Creates a configuration suitable for testing.
    ///
    /// Uses ephemeral port 0 and disables CORS.
    pub fn for_testing() -> Self {
        Self {
            port: 0,
            log_level: "debug".to_string(),
            request_timeout: 5,
            enable_cors: false,
            cors_methods: "*".to_string(),
            cors_headers: "*".to_string(),
            ..Self::default()
        }
    }
}
