//! Site routes
//!
//! The blog's pages on top of the content cache. Routes are registered in a
//! fixed order ahead of the static mounts, so a mount can never shadow them.

use std::sync::Arc;

use hyper::StatusCode;
use serde_json::json;

use super::static_files::StaticMount;
use crate::config::AppState;
use crate::http;
use crate::render::{self, FeedOptions};
use crate::routing::{HandlerResult, PatternError, RouteRequest, Router};

/// Register the site routes followed by one route per configured static mount
pub fn register_routes(router: &mut Router, state: &Arc<AppState>) -> Result<(), PatternError> {
    let s = Arc::clone(state);
    router.get("/", move |_req: RouteRequest| index(Arc::clone(&s)))?;

    let s = Arc::clone(state);
    router.get("/post/:slug", move |req: RouteRequest| post(Arc::clone(&s), req))?;

    let s = Arc::clone(state);
    router.get("/rss.xml", move |_req: RouteRequest| rss(Arc::clone(&s)))?;

    let s = Arc::clone(state);
    router.get("/admin/refresh-cache", move |_req: RouteRequest| {
        refresh_cache(Arc::clone(&s))
    })?;

    for mount in &state.config.static_mounts {
        StaticMount::from_config(mount).mount(router)?;
    }
    Ok(())
}

/// `GET /`
pub async fn index(state: Arc<AppState>) -> HandlerResult {
    let snapshot = state.cache.get(false).await;
    let page = render::index_page(&state.config.site, snapshot.records());
    Ok(http::build_html_response(StatusCode::OK, page))
}

/// `GET /post/:slug`; a missing post gets the HTML not-found page
pub async fn post(state: Arc<AppState>, req: RouteRequest) -> HandlerResult {
    let slug = req.params.param("slug")?;
    let site = &state.config.site;

    let Some(record) = state.cache.get_one(&slug).await else {
        return Ok(http::build_html_response(
            StatusCode::NOT_FOUND,
            render::not_found_page(site, &slug),
        ));
    };
    let body = render::render_markdown(record.body.as_deref().unwrap_or_default());
    Ok(http::build_html_response(
        StatusCode::OK,
        render::post_page(site, &record, &body),
    ))
}

/// `GET /rss.xml`
pub async fn rss(state: Arc<AppState>) -> HandlerResult {
    let snapshot = state.cache.get(false).await;
    let options = FeedOptions::from_site(&state.config.site, chrono::Utc::now());
    let xml = render::generate_feed(snapshot.records(), &options);
    Ok(http::build_text_response(
        StatusCode::OK,
        "application/rss+xml; charset=utf-8",
        xml,
    ))
}

/// `GET /admin/refresh-cache`: reload the listing now
pub async fn refresh_cache(state: Arc<AppState>) -> HandlerResult {
    let snapshot = state.cache.refresh().await;
    Ok(http::build_json_response(&json!({
        "status": "ok",
        "records": snapshot.len(),
        "generation": snapshot.generation(),
    })))
}
