// Configuration module entry point
// Loads the startup configuration and owns the shared application state

mod state;
mod types;

use std::net::SocketAddr;
use std::time::Duration;

// Re-export public types
pub use state::AppState;
pub use types::{
    Config, ContentConfig, LoggingConfig, PerformanceConfig, ServerConfig, SiteConfig,
    StaticMountConfig,
};

/// Config file used when no path is given on the command line
pub const DEFAULT_CONFIG_PATH: &str = "reginald";

impl Config {
    /// Load configuration from the default file path
    pub fn load() -> Result<Self, config::ConfigError> {
        Self::load_from(DEFAULT_CONFIG_PATH)
    }

    /// Load configuration from specified file path (extension optional)
    ///
    /// The file is optional; environment variables prefixed with `REGINALD`
    /// (`__` between section and key) override it.
    pub fn load_from(config_path: &str) -> Result<Self, config::ConfigError> {
        let settings = config::Config::builder()
            .add_source(config::File::with_name(config_path).required(false))
            .add_source(
                config::Environment::with_prefix("REGINALD")
                    .prefix_separator("_")
                    .separator("__"),
            )
            .set_default("server.host", "127.0.0.1")?
            .set_default("server.port", 7182)?
            .set_default("logging.level", "info")?
            .set_default("logging.access_log", true)?
            .set_default("performance.keep_alive_timeout", 75)?
            .set_default("performance.read_timeout", 30)?
            .set_default("performance.write_timeout", 30)?
            .set_default("content.dir", "posts")?
            .set_default("content.extension", "md")?
            .set_default("content.cache_ttl_secs", 60)?
            .set_default("site.title", "Reginald Blog")?
            .set_default("site.description", "")?
            .set_default("site.link", "http://localhost:7182")?
            .set_default("site.copyright", "")?
            .set_default("site.language", "en-us")?
            .build()?;

        settings.try_deserialize()
    }

    pub fn get_socket_addr(&self) -> Result<SocketAddr, String> {
        format!("{}:{}", self.server.host, self.server.port)
            .parse()
            .map_err(|e| format!("Invalid address: {e}"))
    }

    /// TTL of the content list cache
    pub const fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.content.cache_ttl_secs)
    }
}
