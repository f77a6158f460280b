//! Content loader
//!
//! Reads content records from a flat directory. A file that cannot be read or
//! parsed is logged and skipped; it never aborts the whole load.

use std::future::Future;
use std::path::{Path, PathBuf};

use tokio::fs;

use super::frontmatter::{self, FrontMatterError};
use super::record::{make_preview, ContentRecord};
use crate::logger;

/// Source of content records consumed by the cache
pub trait ContentSource: Send + Sync {
    /// Load every record, newest first
    fn load_all(&self) -> impl Future<Output = Vec<ContentRecord>> + Send;

    /// Load one record with its full body, `None` when absent or unreadable
    fn load_one(&self, identifier: &str) -> impl Future<Output = Option<ContentRecord>> + Send;
}

#[derive(Debug, thiserror::Error)]
enum LoadError {
    #[error("read failed: {0}")]
    Read(#[from] std::io::Error),
    #[error(transparent)]
    FrontMatter(#[from] FrontMatterError),
}

/// Directory-backed content loader
#[derive(Debug, Clone)]
pub struct ContentLoader {
    dir: PathBuf,
    extension: String,
}

impl ContentLoader {
    pub const DEFAULT_EXTENSION: &'static str = "md";

    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            extension: Self::DEFAULT_EXTENSION.to_string(),
        }
    }

    /// Use a different content extension (with or without the leading dot)
    #[must_use]
    pub fn with_extension(mut self, extension: &str) -> Self {
        self.extension = extension.trim_start_matches('.').to_string();
        self
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn is_content_name(&self, name: &str) -> bool {
        Path::new(name)
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e == self.extension)
    }

    /// A loadable identifier is a bare file name with the content extension
    fn is_valid_identifier(&self, identifier: &str) -> bool {
        !identifier.is_empty()
            && identifier != "."
            && identifier != ".."
            && !identifier.contains(['/', '\\', '\0'])
            && self.is_content_name(identifier)
    }

    async fn list_content_files(&self) -> std::io::Result<Vec<String>> {
        let mut entries = fs::read_dir(&self.dir).await?;
        let mut names = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            let Ok(name) = entry.file_name().into_string() else {
                continue;
            };
            if !self.is_content_name(&name) {
                continue;
            }
            match entry.file_type().await {
                Ok(ft) if ft.is_file() => names.push(name),
                Ok(_) => {}
                Err(e) => logger::log_warning(&format!("Cannot stat '{name}': {e}")),
            }
        }
        // read_dir order is platform dependent; ties in the date sort keep this order
        names.sort();
        Ok(names)
    }

    async fn read_record(&self, identifier: &str) -> Result<(ContentRecord, String), LoadError> {
        let text = fs::read_to_string(self.dir.join(identifier)).await?;
        let extracted = frontmatter::split(&text)?;
        let body = extracted.body.to_string();
        Ok((ContentRecord::from_metadata(identifier, extracted.metadata), body))
    }

    /// Load every content file in the directory.
    ///
    /// Records are ordered newest first; undated records come last and ties
    /// keep file-name order. A directory that cannot be listed yields an empty
    /// list.
    pub async fn load_all(&self) -> Vec<ContentRecord> {
        let names = match self.list_content_files().await {
            Ok(names) => names,
            Err(e) => {
                logger::log_error(&format!(
                    "Failed to list content directory '{}': {e}",
                    self.dir.display()
                ));
                return Vec::new();
            }
        };

        let mut records = Vec::with_capacity(names.len());
        for name in names {
            match self.read_record(&name).await {
                Ok((record, body)) => records.push(record.with_preview(make_preview(&body))),
                Err(e) => logger::log_error(&format!("Skipping content file '{name}': {e}")),
            }
        }

        sort_newest_first(&mut records);
        records
    }

    /// Load a single record with its raw body
    pub async fn load_one(&self, identifier: &str) -> Option<ContentRecord> {
        if !self.is_valid_identifier(identifier) {
            tracing::debug!(identifier, "Rejected content identifier");
            return None;
        }
        match self.read_record(identifier).await {
            Ok((record, body)) => Some(record.with_body(body)),
            Err(LoadError::Read(e)) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(identifier, "Content file not found");
                None
            }
            Err(e) => {
                logger::log_error(&format!("Failed to load content '{identifier}': {e}"));
                None
            }
        }
    }
}

impl ContentSource for ContentLoader {
    async fn load_all(&self) -> Vec<ContentRecord> {
        Self::load_all(self).await
    }

    async fn load_one(&self, identifier: &str) -> Option<ContentRecord> {
        Self::load_one(self, identifier).await
    }
}

/// Stable sort, descending by publish time, undated last
pub fn sort_newest_first(records: &mut [ContentRecord]) {
    // None < Some(_), so reversing the comparison sinks undated records
    records.sort_by(|a, b| b.publish_timestamp.cmp(&a.publish_timestamp));
}
