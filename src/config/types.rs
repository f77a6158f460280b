// Configuration types module
// Defines all configuration-related data structures

use serde::Deserialize;

/// Main configuration structure
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub logging: LoggingConfig,
    pub performance: PerformanceConfig,
    pub content: ContentConfig,
    pub site: SiteConfig,
    /// Static directories exposed under URL prefixes (matched in order)
    #[serde(default = "default_static_mounts")]
    pub static_mounts: Vec<StaticMountConfig>,
}

/// Server configuration
#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub workers: Option<usize>,
}

/// Logging configuration
#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    /// Default filter directive, overridden by `RUST_LOG`
    pub level: String,
    pub access_log: bool,
}

/// Performance configuration
#[derive(Debug, Deserialize, Clone)]
pub struct PerformanceConfig {
    pub keep_alive_timeout: u64,
    pub read_timeout: u64,
    pub write_timeout: u64,
    pub max_connections: Option<u64>,
}

/// Content directory and list cache configuration
#[derive(Debug, Deserialize, Clone)]
pub struct ContentConfig {
    pub dir: String,
    /// File extension (without dot) that marks a content file
    pub extension: String,
    pub cache_ttl_secs: u64,
}

/// Site metadata used by the layout and the feed
#[derive(Debug, Deserialize, Clone)]
pub struct SiteConfig {
    pub title: String,
    pub description: String,
    /// Absolute base URL, used for feed links
    pub link: String,
    pub copyright: String,
    pub language: String,
    /// Feed `<ttl>` in minutes
    #[serde(default)]
    pub feed_ttl: Option<u32>,
}

/// One static mount: URL prefix to filesystem directory
#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct StaticMountConfig {
    pub url_prefix: String,
    pub root: String,
    #[serde(default = "default_index_file")]
    pub index_file: String,
    /// Empty means every extension is served
    #[serde(default)]
    pub allowed_extensions: Vec<String>,
    #[serde(default = "default_cache_enabled")]
    pub cache: bool,
    #[serde(default = "default_cache_duration")]
    pub cache_duration_secs: u64,
}

#[allow(clippy::missing_const_for_fn)]
fn default_index_file() -> String {
    "index.html".to_string()
}

#[allow(clippy::missing_const_for_fn)]
fn default_cache_enabled() -> bool {
    true
}

#[allow(clippy::missing_const_for_fn)]
fn default_cache_duration() -> u64 {
    86_400
}

fn default_static_mounts() -> Vec<StaticMountConfig> {
    [("/css", "static/css"), ("/js", "static/js")]
        .into_iter()
        .map(|(url_prefix, root)| StaticMountConfig {
            url_prefix: url_prefix.to_string(),
            root: root.to_string(),
            index_file: default_index_file(),
            allowed_extensions: Vec::new(),
            cache: default_cache_enabled(),
            cache_duration_secs: default_cache_duration(),
        })
        .collect()
}
