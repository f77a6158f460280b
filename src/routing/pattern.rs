//! Route pattern module
//!
//! Path patterns with literal segments, named parameters (`:slug`) and
//! wildcards (`*`). A trailing `*` swallows the rest of the path, including
//! further slashes; a `*` anywhere else stands for exactly one segment.

use std::fmt;

use crate::error::ServeError;

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Param(String),
    Wildcard,
    CatchAll,
}

/// Invalid route pattern
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PatternError {
    #[error("pattern '{0}' must start with '/'")]
    MissingLeadingSlash(String),
    #[error("pattern '{0}' has a parameter without a name")]
    EmptyParamName(String),
    #[error("pattern '{pattern}' declares ':{name}' more than once")]
    DuplicateParam { pattern: String, name: String },
}

/// Parsed route pattern
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pattern {
    source: String,
    segments: Vec<Segment>,
}

impl Pattern {
    pub fn parse(pattern: &str) -> Result<Self, PatternError> {
        let Some(rest) = pattern.strip_prefix('/') else {
            return Err(PatternError::MissingLeadingSlash(pattern.to_string()));
        };

        let raw: Vec<&str> = rest.split('/').collect();
        let last = raw.len() - 1;
        let mut segments = Vec::with_capacity(raw.len());
        let mut names: Vec<&str> = Vec::new();

        for (idx, seg) in raw.iter().enumerate() {
            let segment = if *seg == "*" {
                if idx == last {
                    Segment::CatchAll
                } else {
                    Segment::Wildcard
                }
            } else if let Some(name) = seg.strip_prefix(':') {
                if name.is_empty() {
                    return Err(PatternError::EmptyParamName(pattern.to_string()));
                }
                if names.contains(&name) {
                    return Err(PatternError::DuplicateParam {
                        pattern: pattern.to_string(),
                        name: name.to_string(),
                    });
                }
                names.push(name);
                Segment::Param(name.to_string())
            } else {
                Segment::Literal((*seg).to_string())
            };
            segments.push(segment);
        }

        Ok(Self {
            source: pattern.to_string(),
            segments,
        })
    }

    pub fn as_str(&self) -> &str {
        &self.source
    }

    /// Match a request path, returning the captured parameters
    pub fn matches(&self, path: &str) -> Option<PathParams> {
        let rest = path.strip_prefix('/')?;
        let mut params = PathParams::default();
        let mut remaining = Some(rest);

        for segment in &self.segments {
            // `None` means the path ran out of segments
            let current = remaining?;
            if *segment == Segment::CatchAll {
                params.wildcards.push(current.to_string());
                return Some(params);
            }

            let (head, tail) = match current.split_once('/') {
                Some((head, tail)) => (head, Some(tail)),
                None => (current, None),
            };
            match segment {
                Segment::Literal(lit) if lit == head => {}
                Segment::Param(name) if !head.is_empty() => {
                    params.named.push((name.clone(), head.to_string()));
                }
                Segment::Wildcard => params.wildcards.push(head.to_string()),
                _ => return None,
            }
            remaining = tail;
        }

        // Every path segment must be consumed
        remaining.is_none().then_some(params)
    }
}

impl fmt::Display for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}

/// Parameters captured by a pattern match.
///
/// Values are kept exactly as they appeared in the request path and are
/// percent-decoded on access.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PathParams {
    named: Vec<(String, String)>,
    wildcards: Vec<String>,
}

impl PathParams {
    /// Raw value of a named parameter
    pub fn raw(&self, name: &str) -> Option<&str> {
        self.named
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    /// Raw wildcard captures, in pattern order
    pub fn raw_wildcards(&self) -> &[String] {
        &self.wildcards
    }

    /// Decoded value of a named parameter; missing or undecodable is a bad request
    pub fn param(&self, name: &str) -> Result<String, ServeError> {
        let raw = self
            .raw(name)
            .ok_or_else(|| ServeError::bad_request(format!("missing path parameter '{name}'")))?;
        percent_decode(raw)
    }

    /// Decoded wildcard capture by index
    pub fn wildcard(&self, index: usize) -> Result<String, ServeError> {
        let raw = self
            .wildcards
            .get(index)
            .ok_or_else(|| ServeError::bad_request(format!("missing wildcard segment {index}")))?;
        percent_decode(raw)
    }
}

/// Decode `%XX` escapes; the result must be valid UTF-8
pub fn percent_decode(raw: &str) -> Result<String, ServeError> {
    let bytes = raw.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%' {
            let hi = bytes.get(i + 1).and_then(|b| hex_value(*b));
            let lo = bytes.get(i + 2).and_then(|b| hex_value(*b));
            match (hi, lo) {
                (Some(hi), Some(lo)) => {
                    out.push((hi << 4) | lo);
                    i += 3;
                }
                _ => return Err(ServeError::bad_request(format!("invalid percent-encoding in '{raw}'"))),
            }
        } else {
            out.push(bytes[i]);
            i += 1;
        }
    }
    String::from_utf8(out)
        .map_err(|_| ServeError::bad_request(format!("path segment '{raw}' is not valid UTF-8")))
}

/// Encode `raw` as a single path segment.
///
/// Everything outside the RFC 3986 unreserved set is escaped, so `/`, `%`,
/// `?` and `#` survive the trip through a URL and [`percent_decode`] gives
/// back `raw` exactly.
pub fn percent_encode(raw: &str) -> String {
    const HEX: &[u8; 16] = b"0123456789ABCDEF";
    let mut out = String::with_capacity(raw.len());
    for &b in raw.as_bytes() {
        if b.is_ascii_alphanumeric() || matches!(b, b'-' | b'.' | b'_' | b'~') {
            out.push(char::from(b));
        } else {
            out.push('%');
            out.push(char::from(HEX[usize::from(b >> 4)]));
            out.push(char::from(HEX[usize::from(b & 0x0f)]));
        }
    }
    out
}

const fn hex_value(b: u8) -> Option<u8> {
    match b {
        b'0'..=b'9' => Some(b - b'0'),
        b'a'..=b'f' => Some(b - b'a' + 10),
        b'A'..=b'F' => Some(b - b'A' + 10),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pat(p: &str) -> Pattern {
        Pattern::parse(p).unwrap()
    }

    #[test]
    fn test_parse_errors() {
        assert!(matches!(
            Pattern::parse("post/:slug"),
            Err(PatternError::MissingLeadingSlash(_))
        ));
        assert!(matches!(
            Pattern::parse("/post/:"),
            Err(PatternError::EmptyParamName(_))
        ));
        assert!(matches!(
            Pattern::parse("/:a/:a"),
            Err(PatternError::DuplicateParam { .. })
        ));
    }

    #[test]
    fn test_root_and_literals() {
        assert!(pat("/").matches("/").is_some());
        assert!(pat("/").matches("/x").is_none());
        assert!(pat("/rss.xml").matches("/rss.xml").is_some());
        assert!(pat("/rss.xml").matches("/rss.xml/").is_none());
        assert!(pat("/admin/refresh-cache").matches("/admin/refresh-cache").is_some());
        assert!(pat("/admin/refresh-cache").matches("/admin").is_none());
        assert!(pat("/a").matches("a").is_none());
    }

    #[test]
    fn test_named_param() {
        let params = pat("/post/:slug").matches("/post/hello.md").unwrap();
        assert_eq!(params.raw("slug"), Some("hello.md"));
        assert_eq!(params.param("slug").unwrap(), "hello.md");

        assert!(pat("/post/:slug").matches("/post/").is_none());
        assert!(pat("/post/:slug").matches("/post").is_none());
        assert!(pat("/post/:slug").matches("/post/a/b").is_none());
        assert!(pat("/:slug").matches("/").is_none());
    }

    #[test]
    fn test_catch_all() {
        let p = pat("/css/*");
        assert_eq!(p.matches("/css/").unwrap().raw_wildcards(), ["".to_string()]);
        assert_eq!(
            p.matches("/css/a/b.css").unwrap().raw_wildcards(),
            ["a/b.css".to_string()]
        );
        assert!(p.matches("/css").is_none());
        assert!(p.matches("/cssx/a").is_none());
    }

    #[test]
    fn test_inner_wildcards_are_indexed() {
        let params = pat("/files/*/raw/*").matches("/files/v1/raw/a/b").unwrap();
        assert_eq!(params.wildcard(0).unwrap(), "v1");
        assert_eq!(params.wildcard(1).unwrap(), "a/b");
        assert!(params.wildcard(2).is_err());
    }

    #[test]
    fn test_decoding() {
        let params = pat("/post/:slug").matches("/post/hello%20world.md").unwrap();
        assert_eq!(params.param("slug").unwrap(), "hello world.md");
        assert!(matches!(params.param("other"), Err(ServeError::BadRequest(_))));

        assert_eq!(percent_decode("%2e%2E%2f").unwrap(), "../");
        assert_eq!(percent_decode("caf%C3%A9").unwrap(), "café");
        assert!(percent_decode("%zz").is_err());
        assert!(percent_decode("%4").is_err());
        assert!(percent_decode("%ff").is_err());
    }

    #[test]
    fn test_encode_is_inverse_of_decode() {
        assert_eq!(percent_encode("hello-world_1.md"), "hello-world_1.md");
        assert_eq!(percent_encode("100%.md"), "100%25.md");
        assert_eq!(percent_encode("c#.md"), "c%23.md");
        assert_eq!(percent_encode("what?.md"), "what%3F.md");
        assert_eq!(percent_encode("a/b c.md"), "a%2Fb%20c.md");
        assert_eq!(percent_encode("café.md"), "caf%C3%A9.md");

        for raw in ["100%.md", "c#.md", "what?.md", "a/b c.md", "café.md", "%2e%2e"] {
            let path = format!("/post/{}", percent_encode(raw));
            let params = pat("/post/:slug").matches(&path).unwrap();
            assert_eq!(params.param("slug").unwrap(), raw);
        }
    }
}
