//! Rendering module
//!
//! Pure functions that turn content records into HTML pages and the RSS feed.
//! Nothing here touches the cache or the filesystem.

pub mod feed;
pub mod layout;
pub mod markdown;

pub use feed::{generate_feed, FeedOptions};
pub use layout::{escape_html, index_page, not_found_page, post_page};
pub use markdown::render_markdown;
