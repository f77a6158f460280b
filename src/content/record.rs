//! Content record model

use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde_json::Value;

/// Maximum preview length in characters
pub const PREVIEW_LENGTH: usize = 150;

/// Marker appended to a truncated preview
pub const PREVIEW_ELLIPSIS: &str = "...";

/// One loaded unit of content: front-matter metadata plus body or preview
#[derive(Debug, Clone, PartialEq)]
pub struct ContentRecord {
    /// Source file name, exactly as it appears on disk
    pub identifier: String,
    pub title: Option<String>,
    pub publish_timestamp: Option<DateTime<Utc>>,
    pub author: Option<String>,
    pub description: Option<String>,
    /// Raw, unrendered body (single-record reads only)
    pub body: Option<String>,
    /// Short plain-text excerpt (listing reads only)
    pub preview: Option<String>,
    /// Front-matter keys without a dedicated field
    pub extra: BTreeMap<String, Value>,
}

impl ContentRecord {
    /// Build a record from a file name and its parsed front matter.
    ///
    /// Well-known keys (`title`, `publish_date`, `author`, `description`) are
    /// lifted into fields; everything else lands in `extra`.
    pub fn from_metadata(identifier: impl Into<String>, mut metadata: BTreeMap<String, Value>) -> Self {
        let identifier = identifier.into();
        let title = take_string(&mut metadata, "title");
        let author = take_string(&mut metadata, "author");
        let description = take_string(&mut metadata, "description");
        let publish_timestamp = metadata.remove("publish_date").and_then(|value| {
            let parsed = value_as_text(&value).as_deref().and_then(parse_timestamp);
            if parsed.is_none() {
                tracing::warn!(%identifier, %value, "Unrecognised publish_date, treating post as undated");
            }
            parsed
        });

        Self {
            identifier,
            title,
            publish_timestamp,
            author,
            description,
            body: None,
            preview: None,
            extra: metadata,
        }
    }

    #[must_use]
    pub fn with_body(mut self, body: String) -> Self {
        self.body = Some(body);
        self
    }

    #[must_use]
    pub fn with_preview(mut self, preview: String) -> Self {
        self.preview = Some(preview);
        self
    }

    /// Title to display, falling back to the identifier
    pub fn display_title(&self) -> &str {
        self.title.as_deref().unwrap_or(&self.identifier)
    }
}

fn take_string(metadata: &mut BTreeMap<String, Value>, key: &str) -> Option<String> {
    metadata.remove(key).and_then(|value| value_as_text(&value))
}

fn value_as_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// Parse a front-matter date.
///
/// Accepts RFC 3339 and the naive forms `YYYY-MM-DD`, `YYYY-MM-DD HH:MM:SS`
/// and `YYYY-MM-DDTHH:MM:SS`, which are taken as UTC.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    for format in ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(naive.and_utc());
        }
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

/// Derive the listing preview from a raw body.
///
/// Drops a leftover `---` block, strips markdown punctuation (`#`, `*`,
/// backtick, brackets), trims, and truncates to [`PREVIEW_LENGTH`] characters
/// with [`PREVIEW_ELLIPSIS`] appended when something was cut.
pub fn make_preview(body: &str) -> String {
    let without_block = strip_delimited_block(body);
    let stripped: String = without_block
        .chars()
        .filter(|c| !matches!(c, '#' | '*' | '`' | '[' | ']'))
        .collect();
    let trimmed = stripped.trim();

    let mut chars = trimmed.chars();
    let mut preview: String = chars.by_ref().take(PREVIEW_LENGTH).collect();
    if chars.next().is_some() {
        preview.push_str(PREVIEW_ELLIPSIS);
    }
    preview
}

/// Remove the first `---` ... `---` span, if both markers are present
fn strip_delimited_block(body: &str) -> std::borrow::Cow<'_, str> {
    const MARK: &str = "---";
    let Some(start) = body.find(MARK) else {
        return body.into();
    };
    let after_open = start + MARK.len();
    match body[after_open..].find(MARK) {
        Some(offset) => {
            let end = after_open + offset + MARK.len();
            format!("{}{}", &body[..start], &body[end..]).into()
        }
        None => body.into(),
    }
}
