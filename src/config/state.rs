// Application state module
// Everything a request handler needs, shared behind one Arc

use std::sync::Arc;
use tokio::sync::Notify;

use super::types::Config;
use crate::content::{ContentCache, ContentLoader};

/// Application state
pub struct AppState {
    pub config: Config,
    /// Listing cache over the content directory
    pub cache: ContentCache<ContentLoader>,
    /// Notified once when the server should stop accepting connections
    pub shutdown: Arc<Notify>,
}

impl AppState {
    pub fn new(config: &Config) -> Self {
        let loader = ContentLoader::new(&config.content.dir).with_extension(&config.content.extension);
        Self {
            config: config.clone(),
            cache: ContentCache::new(loader, config.cache_ttl()),
            shutdown: Arc::new(Notify::new()),
        }
    }

    /// Whether one line per request goes to the access log
    pub const fn access_log(&self) -> bool {
        self.config.logging.access_log
    }
}
