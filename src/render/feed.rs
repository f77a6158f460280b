//! RSS 2.0 feed generation
//!
//! Only dated records become items, newest first. Item links point at the
//! post route under the site's base link.

use chrono::{DateTime, Utc};

use crate::config::SiteConfig;
use crate::content::ContentRecord;
use crate::render::layout::post_path;

pub const GENERATOR: &str = "Reginald Blog";

/// Channel-level feed settings
#[derive(Debug, Clone)]
pub struct FeedOptions<'a> {
    pub title: &'a str,
    pub description: &'a str,
    /// Base URL without trailing slash
    pub link: &'a str,
    pub language: &'a str,
    pub copyright: Option<&'a str>,
    pub managing_editor: Option<&'a str>,
    pub last_build_date: DateTime<Utc>,
    /// Minutes a reader may cache the feed
    pub ttl: Option<u32>,
}

impl<'a> FeedOptions<'a> {
    pub fn from_site(site: &'a SiteConfig, last_build_date: DateTime<Utc>) -> Self {
        Self {
            title: &site.title,
            description: &site.description,
            link: site.link.trim_end_matches('/'),
            language: &site.language,
            copyright: Some(site.copyright.as_str()).filter(|c| !c.is_empty()),
            managing_editor: None,
            last_build_date,
            ttl: site.feed_ttl,
        }
    }
}

/// Escape the five XML special characters
pub fn escape_xml(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#x27;")
}

fn optional_element(name: &str, value: Option<&str>) -> String {
    value.map_or_else(String::new, |v| {
        format!("\n    <{name}>{}</{name}>", escape_xml(v))
    })
}

fn item(record: &ContentRecord, published: DateTime<Utc>, options: &FeedOptions<'_>) -> String {
    let link = format!("{}{}", options.link, post_path(&record.identifier));
    let description = record
        .description
        .as_deref()
        .or(record.preview.as_deref())
        .unwrap_or_default();
    let author = record
        .author
        .as_deref()
        .or(options.managing_editor)
        .filter(|a| !a.is_empty());

    let mut out = format!(
        "\n    <item>\
         \n      <title>{}</title>\
         \n      <description>{}</description>\
         \n      <link>{}</link>\
         \n      <pubDate>{}</pubDate>\
         \n      <guid isPermaLink=\"true\">{}</guid>",
        escape_xml(record.title.as_deref().unwrap_or("Untitled")),
        escape_xml(description),
        escape_xml(&link),
        published.to_rfc2822(),
        escape_xml(&link),
    );
    if let Some(author) = author {
        out.push_str(&format!("\n      <author>{}</author>", escape_xml(author)));
    }
    out.push_str("\n    </item>");
    out
}

/// Build the feed document for `records`
pub fn generate_feed(records: &[ContentRecord], options: &FeedOptions<'_>) -> String {
    let mut dated: Vec<(&ContentRecord, DateTime<Utc>)> = records
        .iter()
        .filter_map(|r| r.publish_timestamp.map(|ts| (r, ts)))
        .collect();
    dated.sort_by(|a, b| b.1.cmp(&a.1));

    let mut out = format!(
        "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\
         \n<rss version=\"2.0\">\
         \n  <channel>\
         \n    <title>{}</title>\
         \n    <description>{}</description>\
         \n    <link>{}</link>\
         \n    <language>{}</language>\
         \n    <lastBuildDate>{}</lastBuildDate>\
         \n    <generator>{GENERATOR}</generator>",
        escape_xml(options.title),
        escape_xml(options.description),
        escape_xml(options.link),
        escape_xml(options.language),
        options.last_build_date.to_rfc2822(),
    );
    out.push_str(&optional_element("copyright", options.copyright));
    out.push_str(&optional_element("managingEditor", options.managing_editor));
    if let Some(ttl) = options.ttl {
        out.push_str(&format!("\n    <ttl>{ttl}</ttl>"));
    }
    for (record, published) in dated {
        out.push_str(&item(record, published, options));
    }
    out.push_str("\n  </channel>\n</rss>\n");
    out
}
