//! Static file serving module
//!
//! A [`StaticMount`] binds a URL prefix to a directory. Every resolved path
//! must stay inside the mount root: `..` segments (plain or percent-encoded),
//! absolute paths and symlinks pointing outside are rejected with 403.

use std::collections::HashSet;
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;

use hyper::body::Bytes;
use tokio::fs;

use crate::config::StaticMountConfig;
use crate::error::ServeError;
use crate::http::{self, cache, mime, CachePolicy};
use crate::routing::{HandlerResult, PatternError, RouteRequest, Router};

pub const DEFAULT_INDEX_FILE: &str = "index.html";
pub const DEFAULT_CACHE_DURATION_SECS: u64 = 86_400;

/// One URL prefix to filesystem directory binding
#[derive(Debug, Clone)]
pub struct StaticMount {
    url_prefix: String,
    root: PathBuf,
    index_file: String,
    /// Lower-case, without the leading dot; empty means unrestricted
    allowed_extensions: HashSet<String>,
    caching_enabled: bool,
    cache_duration_secs: u64,
}

impl StaticMount {
    pub fn new(url_prefix: &str, root: impl Into<PathBuf>) -> Self {
        Self {
            url_prefix: url_prefix.trim_end_matches('/').to_string(),
            root: root.into(),
            index_file: DEFAULT_INDEX_FILE.to_string(),
            allowed_extensions: HashSet::new(),
            caching_enabled: true,
            cache_duration_secs: DEFAULT_CACHE_DURATION_SECS,
        }
    }

    pub fn from_config(config: &StaticMountConfig) -> Self {
        Self::new(&config.url_prefix, &config.root)
            .with_index_file(&config.index_file)
            .with_allowed_extensions(config.allowed_extensions.iter().map(String::as_str))
            .with_caching(config.cache, config.cache_duration_secs)
    }

    #[must_use]
    pub fn with_index_file(mut self, index_file: &str) -> Self {
        self.index_file = index_file.to_string();
        self
    }

    /// Restrict served files to these extensions (`"css"` or `".css"`)
    #[must_use]
    pub fn with_allowed_extensions<'a>(mut self, extensions: impl IntoIterator<Item = &'a str>) -> Self {
        self.allowed_extensions = extensions
            .into_iter()
            .map(|e| e.trim_start_matches('.').to_ascii_lowercase())
            .collect();
        self
    }

    #[must_use]
    pub const fn with_caching(mut self, enabled: bool, duration_secs: u64) -> Self {
        self.caching_enabled = enabled;
        self.cache_duration_secs = duration_secs;
        self
    }

    pub fn url_prefix(&self) -> &str {
        &self.url_prefix
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Pattern this mount is registered under, e.g. `/css/*`
    pub fn route_pattern(&self) -> String {
        format!("{}/*", self.url_prefix)
    }

    /// Register `GET {url_prefix}/*` on the router
    pub fn mount(self, router: &mut Router) -> Result<(), PatternError> {
        let pattern = self.route_pattern();
        let mount = Arc::new(self);
        router.get(&pattern, move |req: RouteRequest| {
            let mount = Arc::clone(&mount);
            async move { mount.serve(&req).await }
        })?;
        Ok(())
    }

    /// Serve the file named by the request's first wildcard capture
    pub async fn serve(&self, req: &RouteRequest) -> HandlerResult {
        let relative = req.params.wildcard(0)?;
        let file = self.resolve(&relative).await?;

        let data = fs::read(&file)
            .await
            .map_err(|e| ServeError::io(&file, e))?;
        let content_type = mime::get_content_type(file.extension().and_then(|e| e.to_str()));

        if !self.caching_enabled {
            return Ok(http::build_file_response(Bytes::from(data), content_type, None, None));
        }

        let policy = CachePolicy::Public(self.cache_duration_secs);
        let etag = cache::generate_etag(&data);
        if cache::check_etag_match(req.if_none_match.as_deref(), &etag) {
            return Ok(http::build_304_response(&etag, Some(policy)));
        }
        Ok(http::build_file_response(
            Bytes::from(data),
            content_type,
            Some(&etag),
            Some(policy),
        ))
    }

    /// Map a decoded relative path to a file inside the mount.
    ///
    /// An empty path means the index file; a directory means its index file.
    pub async fn resolve(&self, relative: &str) -> Result<PathBuf, ServeError> {
        let relative = if relative.is_empty() {
            self.index_file.as_str()
        } else {
            relative
        };

        let candidate = self.sandbox(relative)?;
        if candidate.extension().is_some() {
            self.check_extension(&candidate)?;
        }

        let meta = fs::metadata(&candidate)
            .await
            .map_err(|_| ServeError::NotFound)?;
        let file = if meta.is_dir() {
            let index = candidate.join(&self.index_file);
            match fs::metadata(&index).await {
                Ok(m) if m.is_file() => index,
                _ => return Err(ServeError::NotFound),
            }
        } else {
            candidate
        };
        self.check_extension(&file)?;

        // Symlinks may still point outside the mount
        let root = fs::canonicalize(&self.root)
            .await
            .map_err(|_| ServeError::NotFound)?;
        let canonical = fs::canonicalize(&file)
            .await
            .map_err(|_| ServeError::NotFound)?;
        if !canonical.starts_with(&root) {
            return Err(ServeError::forbidden(format!(
                "'{}' resolves outside mount '{}'",
                relative,
                self.url_prefix
            )));
        }
        // The served type follows the target, so the target must be allowed too
        self.check_extension(&canonical)?;
        Ok(canonical)
    }

    /// Lexically join `relative` onto the root, refusing to climb above it
    fn sandbox(&self, relative: &str) -> Result<PathBuf, ServeError> {
        if relative.contains('\0') {
            return Err(ServeError::forbidden("NUL byte in path"));
        }

        let mut parts: Vec<&std::ffi::OsStr> = Vec::new();
        for component in Path::new(relative).components() {
            match component {
                Component::Normal(part) => parts.push(part),
                Component::CurDir => {}
                Component::ParentDir => {
                    if parts.pop().is_none() {
                        return Err(ServeError::forbidden(format!(
                            "'{relative}' escapes mount '{}'",
                            self.url_prefix
                        )));
                    }
                }
                Component::RootDir | Component::Prefix(_) => {
                    return Err(ServeError::forbidden(format!(
                        "absolute path '{relative}' in mount '{}'",
                        self.url_prefix
                    )));
                }
            }
        }

        let path = parts.iter().fold(self.root.clone(), |acc, part| acc.join(part));
        if !path.starts_with(&self.root) {
            return Err(ServeError::forbidden(format!("'{relative}' escapes mount")));
        }
        Ok(path)
    }

    fn check_extension(&self, path: &Path) -> Result<(), ServeError> {
        if self.allowed_extensions.is_empty() {
            return Ok(());
        }
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase);
        match ext {
            Some(ext) if self.allowed_extensions.contains(&ext) => Ok(()),
            _ => Err(ServeError::forbidden(format!(
                "extension of '{}' not allowed in mount '{}'",
                path.display(),
                self.url_prefix
            ))),
        }
    }
}
