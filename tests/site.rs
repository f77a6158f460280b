// End-to-end tests of the site routes through the router

use std::fs;
use std::path::Path;
use std::sync::Arc;

use http_body_util::BodyExt;
use hyper::{HeaderMap, Method, StatusCode};
use reginald::config::{AppState, Config, StaticMountConfig};
use reginald::handler::register_routes;
use reginald::routing::{RouteRequest, Router};
use tempfile::TempDir;

struct Site {
    _dir: TempDir,
    posts: std::path::PathBuf,
    state: Arc<AppState>,
    router: Router,
}

fn write_post(dir: &Path, name: &str, title: &str, date: Option<&str>, body: &str) {
    let date = date.map_or_else(String::new, |d| format!("publish_date: {d}\n"));
    fs::write(
        dir.join(name),
        format!("---\ntitle: \"{title}\"\n{date}author: Ada\n---\n{body}"),
    )
    .unwrap();
}

fn site() -> Site {
    let dir = TempDir::new().unwrap();
    let posts = dir.path().join("posts");
    let css = dir.path().join("static/css");
    fs::create_dir_all(&posts).unwrap();
    fs::create_dir_all(&css).unwrap();
    fs::write(dir.path().join("static/secret.txt"), "hidden").unwrap();
    fs::write(css.join("styles.css"), "main{}").unwrap();

    write_post(&posts, "older.md", "Older", Some("2023-01-01"), "Old news");
    write_post(&posts, "newer.md", "Newer", Some("2024-06-01"), "# Fresh\n\nHello *there*");
    write_post(&posts, "draft.md", "Draft", None, "Not yet");
    write_post(&posts, "hello world.md", "Spaced", Some("2022-05-05"), "spaces");
    fs::write(posts.join("broken.md"), "no front matter here").unwrap();
    fs::write(posts.join("notes.txt"), "---\ntitle: Ignored\n---\n").unwrap();

    let mut config = Config::load_from("does-not-exist/reginald").unwrap();
    config.content.dir = posts.to_string_lossy().into_owned();
    config.site.title = "Test Blog".to_string();
    config.site.link = "https://blog.example".to_string();
    config.static_mounts = vec![StaticMountConfig {
        url_prefix: "/css".to_string(),
        root: css.to_string_lossy().into_owned(),
        index_file: "index.html".to_string(),
        allowed_extensions: vec!["css".to_string()],
        cache: true,
        cache_duration_secs: 3600,
    }];

    let state = Arc::new(AppState::new(&config));
    let mut router = Router::new();
    register_routes(&mut router, &state).unwrap();
    Site {
        _dir: dir,
        posts,
        state,
        router,
    }
}

async fn get(router: &Router, path: &str) -> (StatusCode, HeaderMap, String) {
    let resp = router.handle(RouteRequest::new(Method::GET, path)).await;
    let status = resp.status();
    let headers = resp.headers().clone();
    let body = resp.into_body().collect().await.unwrap().to_bytes();
    (status, headers, String::from_utf8_lossy(&body).into_owned())
}

#[test]
fn route_registration_order() {
    let site = site();
    let patterns: Vec<&str> = site
        .router
        .bindings()
        .iter()
        .map(|b| b.pattern().as_str())
        .collect();
    assert_eq!(
        patterns,
        ["/", "/post/:slug", "/rss.xml", "/admin/refresh-cache", "/css/*"]
    );
}

#[tokio::test]
async fn index_lists_posts_newest_first() {
    let site = site();
    let (status, headers, body) = get(&site.router, "/").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(headers["Content-Type"], "text/html; charset=utf-8");

    let newer = body.find("/post/newer.md").unwrap();
    let older = body.find("/post/older.md").unwrap();
    let draft = body.find("/post/draft.md").unwrap();
    assert!(newer < older && older < draft);
    assert!(!body.contains("broken.md"));
    assert!(!body.contains("Ignored"));
    assert!(body.contains("Hello there"));
}

#[tokio::test]
async fn post_is_rendered() {
    let site = site();
    let (status, _, body) = get(&site.router, "/post/newer.md").await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("<title>Newer | Test Blog</title>"));
    assert!(body.contains("<h1>Fresh</h1>"));
    assert!(body.contains("Hello <em>there</em>"));
    assert!(body.contains("By Ada"));
}

#[tokio::test]
async fn post_slug_is_percent_decoded() {
    let site = site();
    let (status, _, body) = get(&site.router, "/post/hello%20world.md").await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("Spaced"));
}

#[tokio::test]
async fn every_index_link_reaches_its_post() {
    let site = site();
    for name in ["100%.md", "c#.md", "what?.md"] {
        write_post(&site.posts, name, name, Some("2021-01-01"), "odd name");
    }

    let (_, _, index) = get(&site.router, "/").await;
    let hrefs: Vec<&str> = index
        .split("href=\"")
        .skip(1)
        .filter_map(|rest| rest.split('"').next())
        .filter(|href| href.starts_with("/post/"))
        .collect();
    assert_eq!(hrefs.len(), 7);
    assert!(hrefs.contains(&"/post/100%25.md"));
    assert!(hrefs.contains(&"/post/c%23.md"));
    assert!(hrefs.contains(&"/post/what%3F.md"));

    for href in hrefs {
        // nothing after the path may be lost to a query or fragment
        assert!(!href.contains(['?', '#']), "{href}");
        let (status, _, _) = get(&site.router, href).await;
        assert_eq!(status, StatusCode::OK, "{href}");
    }
}

#[tokio::test]
async fn missing_post_gets_not_found_page() {
    let site = site();
    for path in ["/post/nope.md", "/post/broken.md", "/post/notes.txt", "/post/..%2fsecret.txt"] {
        let (status, headers, body) = get(&site.router, path).await;
        assert_eq!(status, StatusCode::NOT_FOUND, "{path}");
        assert_eq!(headers["Content-Type"], "text/html; charset=utf-8");
        assert!(body.contains("Post Not Found"), "{path}");
    }
}

#[tokio::test]
async fn post_lookup_does_not_populate_listing() {
    let site = site();
    let _ = get(&site.router, "/post/newer.md").await;
    assert!(site.state.cache.current().is_none());
}

#[tokio::test]
async fn rss_feed_has_dated_posts() {
    let site = site();
    let (status, headers, body) = get(&site.router, "/rss.xml").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(headers["Content-Type"], "application/rss+xml; charset=utf-8");
    assert_eq!(body.matches("<item>").count(), 3);
    assert!(body.contains("<link>https://blog.example/post/newer.md</link>"));
    assert!(body.contains("<link>https://blog.example/post/hello%20world.md</link>"));
    assert!(!body.contains("draft.md"));
}

#[tokio::test]
async fn refresh_cache_reports_counts() {
    let site = site();
    let (status, headers, body) = get(&site.router, "/admin/refresh-cache").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(headers["Content-Type"], "application/json");
    let json: serde_json::Value = serde_json::from_str(&body).unwrap();
    assert_eq!(json["status"], "ok");
    assert_eq!(json["records"], 4);
    let first_generation = json["generation"].as_u64().unwrap();

    write_post(&site.posts, "latest.md", "Latest", Some("2025-01-01"), "new");
    let (_, _, body) = get(&site.router, "/admin/refresh-cache").await;
    let json: serde_json::Value = serde_json::from_str(&body).unwrap();
    assert_eq!(json["records"], 5);
    assert!(json["generation"].as_u64().unwrap() > first_generation);

    // the forced refresh is visible to the listing without waiting for the TTL
    let (_, _, index) = get(&site.router, "/").await;
    assert!(index.find("/post/latest.md").unwrap() < index.find("/post/newer.md").unwrap());
}

#[tokio::test]
async fn static_mount_is_served_and_sandboxed() {
    let site = site();
    let (status, headers, body) = get(&site.router, "/css/styles.css").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "main{}");
    assert_eq!(headers["Content-Type"], "text/css");
    assert_eq!(headers["Cache-Control"], "public, max-age=3600");

    let (status, _, body) = get(&site.router, "/css/../secret.txt").await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert!(!body.contains("hidden"));

    let (status, _, _) = get(&site.router, "/css/%2e%2e/secret.txt").await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn unknown_routes_and_methods_are_404() {
    let site = site();
    assert_eq!(get(&site.router, "/missing").await.0, StatusCode::NOT_FOUND);
    assert_eq!(get(&site.router, "/css").await.0, StatusCode::NOT_FOUND);

    let resp = site.router.handle(RouteRequest::new(Method::POST, "/")).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}
