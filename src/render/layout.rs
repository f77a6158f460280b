//! HTML page layout
//!
//! Every page shares one shell: head with Open Graph tags, the site
//! navigation, the page content and a copyright footer.

use crate::config::SiteConfig;
use crate::content::ContentRecord;
use crate::routing::percent_encode;

/// Stylesheet every page links to, served from the `/css` mount
pub const STYLESHEET: &str = "/css/styles.css";

/// Data for one rendered page
#[derive(Debug, Clone, Copy)]
pub struct LayoutData<'a> {
    pub title: &'a str,
    pub description: &'a str,
    /// Pre-rendered HTML, inserted as is
    pub content: &'a str,
    pub copyright: &'a str,
    /// Canonical URL, omitted from the head when empty
    pub url: &'a str,
}

/// Escape text for use in HTML bodies and attribute values
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            _ => out.push(c),
        }
    }
    out
}

pub fn layout(data: &LayoutData<'_>) -> String {
    let title = escape_html(data.title);
    let description = escape_html(data.description);
    let og_url = if data.url.is_empty() {
        String::new()
    } else {
        format!(
            "\n    <meta property=\"og:url\" content=\"{}\">",
            escape_html(data.url)
        )
    };

    format!(
        r#"<!DOCTYPE html>
<html>
  <head>
    <title>{title}</title>
    <meta name="viewport" content="width=device-width, initial-scale=1">
    <meta charset="utf-8">
    <meta property="og:title" content="{title}">
    <meta property="og:description" content="{description}">
    <meta property="og:type" content="website">{og_url}
    <meta name="twitter:card" content="summary">
    <meta name="twitter:title" content="{title}">
    <meta name="twitter:description" content="{description}">
    <link rel="alternate" type="application/rss+xml" title="{title}" href="/rss.xml">
    <link rel="stylesheet" href="{STYLESHEET}"/>
  </head>
  <body>
    <main style="flex-grow:1">
      <nav><a href="/">Home</a> <a href="/rss.xml">RSS</a></nav>
      {content}
    </main>
    <footer>
      {copyright}
    </footer>
  </body>
</html>
"#,
        content = data.content,
        copyright = escape_html(data.copyright),
    )
}

/// Post URL path for a record identifier, encoded as one path segment
pub fn post_path(identifier: &str) -> String {
    format!("/post/{}", percent_encode(identifier))
}

fn format_date(record: &ContentRecord) -> Option<(String, String)> {
    record
        .publish_timestamp
        .map(|ts| (ts.to_rfc3339(), ts.format("%Y-%m-%d").to_string()))
}

/// Listing of every post: linked title, date and preview
pub fn index_page(site: &SiteConfig, records: &[ContentRecord]) -> String {
    let mut content = String::from(r#"<div class="flex column gap-16 center">"#);
    if records.is_empty() {
        content.push_str("\n<p>No posts yet.</p>");
    }
    for record in records {
        content.push_str("\n<article class=\"post-summary\">");
        content.push_str(&format!(
            "\n  <a href=\"{}\">{}</a>",
            escape_html(&post_path(&record.identifier)),
            escape_html(record.display_title())
        ));
        if let Some((datetime, date)) = format_date(record) {
            content.push_str(&format!("\n  <time datetime=\"{datetime}\">{date}</time>"));
        }
        if let Some(preview) = record.preview.as_deref().filter(|p| !p.is_empty()) {
            content.push_str(&format!("\n  <p>{}</p>", escape_html(preview)));
        }
        content.push_str("\n</article>");
    }
    content.push_str("\n</div>");

    layout(&LayoutData {
        title: &site.title,
        description: &site.description,
        content: &content,
        copyright: &site.copyright,
        url: &site.link,
    })
}

/// A single post; `body_html` is the already rendered markdown
pub fn post_page(site: &SiteConfig, record: &ContentRecord, body_html: &str) -> String {
    let mut header = format!("<h1>{}</h1>", escape_html(record.display_title()));
    if let Some((datetime, date)) = format_date(record) {
        header.push_str(&format!("\n    <time datetime=\"{datetime}\">{date}</time>"));
    }
    if let Some(author) = &record.author {
        header.push_str(&format!(
            "\n    <div class=\"author\">By {}</div>",
            escape_html(author)
        ));
    }

    let content = format!(
        r#"<article class="blog-post">
  <header>
    {header}
  </header>
  <div class="post-content markdown-body">
    {body_html}
  </div>
</article>"#
    );

    let title = format!("{} | {}", record.display_title(), site.title);
    let description = record
        .description
        .as_deref()
        .unwrap_or(&site.description);
    let url = format!(
        "{}{}",
        site.link.trim_end_matches('/'),
        post_path(&record.identifier)
    );
    layout(&LayoutData {
        title: &title,
        description,
        content: &content,
        copyright: &site.copyright,
        url: &url,
    })
}

/// Page shown when a post identifier does not resolve
pub fn not_found_page(site: &SiteConfig, slug: &str) -> String {
    let content = format!(
        r#"<div class="error"><h1>Post Not Found</h1><p>The post "{}" could not be found.</p><p><a href="/">Return to home</a></p></div>"#,
        escape_html(slug)
    );
    let title = format!("Post Not Found | {}", site.title);
    layout(&LayoutData {
        title: &title,
        description: &site.description,
        content: &content,
        copyright: &site.copyright,
        url: "",
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use std::collections::BTreeMap;

    fn site() -> SiteConfig {
        SiteConfig {
            title: "Notes".to_string(),
            description: "A blog".to_string(),
            link: "https://example.com/".to_string(),
            copyright: "(c) 2025 Someone".to_string(),
            language: "en-us".to_string(),
            feed_ttl: None,
        }
    }

    fn record(identifier: &str, title: Option<&str>) -> ContentRecord {
        let mut record = ContentRecord::from_metadata(identifier, BTreeMap::new());
        record.title = title.map(str::to_string);
        record
    }

    #[test]
    fn test_escape_html() {
        assert_eq!(
            escape_html(r#"<a href="x">Tom & 'Jerry'</a>"#),
            "&lt;a href=&quot;x&quot;&gt;Tom &amp; &#x27;Jerry&#x27;&lt;/a&gt;"
        );
        assert_eq!(escape_html("plain"), "plain");
    }

    #[test]
    fn test_index_page_lists_posts() {
        let mut dated = record("a.md", Some("First <post>"));
        dated.publish_timestamp = Some(chrono::Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap());
        let dated = dated.with_preview("Hello world".to_string());
        let undated = record("b.md", None);

        let html = index_page(&site(), &[dated, undated]);
        assert!(html.contains(r#"<a href="/post/a.md">First &lt;post&gt;</a>"#));
        assert!(html.contains(r#"<time datetime="2024-06-01T00:00:00+00:00">2024-06-01</time>"#));
        assert!(html.contains("<p>Hello world</p>"));
        // untitled records fall back to the identifier
        assert!(html.contains(r#"<a href="/post/b.md">b.md</a>"#));
        assert!(html.contains("<title>Notes</title>"));
        assert!(html.contains("(c) 2025 Someone"));
    }

    #[test]
    fn test_empty_index() {
        assert!(index_page(&site(), &[]).contains("No posts yet."));
    }

    #[test]
    fn test_post_page() {
        let mut post = record("hello.md", Some("Hello"));
        post.author = Some("Ada".to_string());
        let html = post_page(&site(), &post, "<p>body</p>");
        assert!(html.contains("<title>Hello | Notes</title>"));
        assert!(html.contains("<h1>Hello</h1>"));
        assert!(html.contains("By Ada"));
        assert!(html.contains("<p>body</p>"));
        assert!(html.contains(r#"content="https://example.com/post/hello.md""#));
    }

    #[test]
    fn test_post_path_encodes_identifier() {
        assert_eq!(post_path("hello.md"), "/post/hello.md");
        assert_eq!(post_path("hello world.md"), "/post/hello%20world.md");
        assert_eq!(post_path("c#.md"), "/post/c%23.md");

        let html = post_page(&site(), &record("what?.md", None), "");
        assert!(html.contains(r#"content="https://example.com/post/what%3F.md""#));
    }

    #[test]
    fn test_not_found_page_escapes_slug() {
        let html = not_found_page(&site(), "<script>");
        assert!(html.contains("Post Not Found | Notes"));
        assert!(html.contains("&lt;script&gt;"));
        assert!(!html.contains("\"<script>\""));
    }
}
