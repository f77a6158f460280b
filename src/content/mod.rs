//! Content module
//!
//! Loads posts from a directory of front-matter files and keeps the listing in
//! a TTL cache.

pub mod cache;
pub mod frontmatter;
pub mod loader;
pub mod record;

pub use cache::{CacheSnapshot, ContentCache, DEFAULT_TTL};
pub use loader::{ContentLoader, ContentSource};
pub use record::ContentRecord;
