//! Front-matter extraction
//!
//! Splits a content file into its metadata block and body. Supported forms:
//!
//! | Opening line       | Closing line | Format |
//! |--------------------|--------------|--------|
//! | `---` or `---yaml` | `---`        | YAML   |
//! | `+++`              | `+++`        | TOML   |
//! | `---toml`          | `---`        | TOML   |
//! | `---json`          | `---`        | JSON   |

use std::collections::BTreeMap;

use serde_json::Value;

/// Metadata keyed by front-matter field name
pub type Metadata = BTreeMap<String, Value>;

/// Why a file's front matter could not be extracted
#[derive(Debug, thiserror::Error)]
pub enum FrontMatterError {
    #[error("file does not start with a front-matter delimiter")]
    Missing,

    #[error("front matter opened with '{0}' is never closed")]
    Unterminated(&'static str),

    #[error("front matter is not a key/value mapping")]
    NotAMapping,

    #[error("invalid YAML front matter: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("invalid TOML front matter: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("invalid JSON front matter: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Format {
    Yaml,
    Toml,
    Json,
}

/// Parsed front matter plus the remaining body text
#[derive(Debug, Clone, PartialEq)]
pub struct Extracted<'a> {
    pub metadata: Metadata,
    pub body: &'a str,
}

/// Split `text` into metadata and body.
pub fn split(text: &str) -> Result<Extracted<'_>, FrontMatterError> {
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);
    let (first_line, rest) = next_line(text);

    let (format, closing) = match first_line.trim_end() {
        "---" | "---yaml" => (Format::Yaml, "---"),
        "---toml" => (Format::Toml, "---"),
        "---json" => (Format::Json, "---"),
        "+++" => (Format::Toml, "+++"),
        _ => return Err(FrontMatterError::Missing),
    };

    let mut offset = 0;
    let mut remaining = rest;
    loop {
        if remaining.is_empty() {
            return Err(FrontMatterError::Unterminated(closing));
        }
        let (line, tail) = next_line(remaining);
        if line.trim_end() == closing {
            let raw = &rest[..offset];
            let metadata = parse_block(format, raw)?;
            return Ok(Extracted {
                metadata,
                body: tail,
            });
        }
        offset += remaining.len() - tail.len();
        remaining = tail;
    }
}

/// Return the first line (without its terminator) and everything after it
fn next_line(text: &str) -> (&str, &str) {
    match text.find('\n') {
        Some(idx) => {
            let line = &text[..idx];
            (line.strip_suffix('\r').unwrap_or(line), &text[idx + 1..])
        }
        None => (text, ""),
    }
}

fn parse_block(format: Format, raw: &str) -> Result<Metadata, FrontMatterError> {
    if raw.trim().is_empty() {
        return Ok(Metadata::new());
    }
    let value = match format {
        Format::Yaml => serde_yaml::from_str::<Value>(raw)?,
        Format::Json => serde_json::from_str::<Value>(raw)?,
        Format::Toml => toml_to_json(toml::Value::Table(raw.parse::<toml::Table>()?)),
    };
    match value {
        Value::Object(map) => Ok(map.into_iter().collect()),
        Value::Null => Ok(Metadata::new()),
        _ => Err(FrontMatterError::NotAMapping),
    }
}

/// Convert a TOML value, rendering datetimes as their string form
fn toml_to_json(value: toml::Value) -> Value {
    match value {
        toml::Value::String(s) => Value::String(s),
        toml::Value::Integer(i) => Value::from(i),
        toml::Value::Float(f) => Value::from(f),
        toml::Value::Boolean(b) => Value::Bool(b),
        toml::Value::Datetime(dt) => Value::String(dt.to_string()),
        toml::Value::Array(items) => Value::Array(items.into_iter().map(toml_to_json).collect()),
        toml::Value::Table(table) => Value::Object(
            table
                .into_iter()
                .map(|(k, v)| (k, toml_to_json(v)))
                .collect(),
        ),
    }
}
