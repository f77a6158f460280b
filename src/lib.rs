//! Reginald: a small HTTP server for a file-backed blog.
//!
//! - [`routing`]: first-match routing over method + path patterns
//! - [`handler`]: site pages and sandboxed static file mounts
//! - [`content`]: front-matter loader and the TTL listing cache
//! - [`server`]: listener, accept loop, connections and signals

pub mod config;
pub mod content;
pub mod error;
pub mod handler;
pub mod http;
pub mod logger;
pub mod render;
pub mod routing;
pub mod server;
