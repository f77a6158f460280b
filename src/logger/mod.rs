//! Logger module
//!
//! Thin façade over `tracing` for the server:
//! - Subscriber setup from the logging config
//! - Server lifecycle logging
//! - Access logging
//! - Error, warning and security-event logging

use std::net::SocketAddr;
use std::time::Duration;

use hyper::{Method, StatusCode};
use tracing_subscriber::EnvFilter;

use crate::config::Config;

/// Install the global subscriber.
///
/// `RUST_LOG` wins over `logging.level` when set. Should be called once at
/// application startup.
pub fn init(config: &Config) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.logging.level))?;
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_level(true)
        .try_init()
}

pub fn log_server_start(addr: &SocketAddr, config: &Config) {
    tracing::info!("======================================");
    tracing::info!("Server started, listening on http://{addr}");
    tracing::info!("Content directory: {}", config.content.dir);
    tracing::info!("Content cache TTL: {}s", config.content.cache_ttl_secs);
    for mount in &config.static_mounts {
        tracing::info!("Static mount: {}/* -> {}", mount.url_prefix, mount.root);
    }
    if let Some(workers) = config.server.workers {
        tracing::info!("Worker threads: {workers}");
    }
    tracing::info!("======================================");
}

pub fn log_connection_accepted(peer_addr: &SocketAddr) {
    tracing::debug!("[Connection] Accepted from: {peer_addr}");
}

pub fn log_connection_error(err: &impl std::fmt::Debug) {
    tracing::error!("Failed to serve connection: {err:?}");
}

/// One access-log line per request
pub fn log_access(method: &Method, path: &str, status: StatusCode, body_bytes: u64, elapsed: Duration) {
    tracing::info!(
        target: "access",
        "{method} {path} {} {body_bytes}B {}us",
        status.as_u16(),
        elapsed.as_micros()
    );
}

pub fn log_error(message: &str) {
    tracing::error!("{message}");
}

pub fn log_warning(message: &str) {
    tracing::warn!("{message}");
}

/// Requests rejected at a security boundary are always logged
pub fn log_security_event(path: &str, reason: &str) {
    tracing::warn!(path, "Blocked request: {reason}");
}

pub fn log_cache_refresh(records: usize, generation: u64) {
    tracing::info!(records, generation, "Content cache refreshed");
}

pub fn log_shutdown() {
    tracing::info!("Shutdown requested, no longer accepting connections");
}
