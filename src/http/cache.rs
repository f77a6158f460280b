//! HTTP cache validation
//!
//! Strong `ETag`s for static files, `If-None-Match` evaluation and the
//! `Cache-Control` values the server emits.

use std::collections::hash_map::DefaultHasher;
use std::hash::Hasher;

/// Strong `ETag` from the content length and a hash of the bytes, e.g.
/// `"1f4-9a3c0e12b7d4f001"`
pub fn generate_etag(content: &[u8]) -> String {
    let mut hasher = DefaultHasher::new();
    hasher.write(content);
    format!("\"{:x}-{:x}\"", content.len(), hasher.finish())
}

/// Opaque tag with any weak prefix removed
fn opaque_tag(tag: &str) -> &str {
    let tag = tag.trim();
    tag.strip_prefix("W/").unwrap_or(tag)
}

/// Whether `If-None-Match` matches `etag`, i.e. a 304 may be sent.
///
/// Uses weak comparison: `W/"x"` matches `"x"`. Accepts a comma-separated
/// list and `*`.
pub fn check_etag_match(if_none_match: Option<&str>, etag: &str) -> bool {
    let Some(header) = if_none_match else {
        return false;
    };
    if header.trim() == "*" {
        return true;
    }
    let ours = opaque_tag(etag);
    header.split(',').any(|candidate| opaque_tag(candidate) == ours)
}

/// `Cache-Control` policy attached to a response
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CachePolicy {
    /// Cacheable by anyone for the given number of seconds
    Public(u64),
    /// Must be revalidated on every use
    NoCache,
}

impl CachePolicy {
    pub fn to_header_value(self) -> String {
        match self {
            Self::Public(max_age) => format!("public, max-age={max_age}"),
            Self::NoCache => "no-cache".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_etag_is_quoted_and_stable() {
        let etag = generate_etag(b"same content");
        assert!(etag.starts_with("\"c-") && etag.ends_with('"'));
        assert_eq!(etag, generate_etag(b"same content"));
        assert_ne!(etag, generate_etag(b"other content"));
    }

    #[test]
    fn test_if_none_match() {
        let etag = "\"abc123\"";
        assert!(check_etag_match(Some("\"abc123\""), etag));
        assert!(check_etag_match(Some("W/\"abc123\""), etag));
        assert!(check_etag_match(Some("\"xyz\",  \"abc123\""), etag));
        assert!(check_etag_match(Some(" * "), etag));
        assert!(!check_etag_match(Some("\"abc\""), etag));
        assert!(!check_etag_match(Some(""), etag));
        assert!(!check_etag_match(None, etag));
    }

    #[test]
    fn test_cache_policy_header() {
        assert_eq!(
            CachePolicy::Public(86_400).to_header_value(),
            "public, max-age=86400"
        );
        assert_eq!(CachePolicy::NoCache.to_header_value(), "no-cache");
    }
}
