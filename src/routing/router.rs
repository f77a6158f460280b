//! Request router
//!
//! Bindings are kept in registration order and the first binding whose method
//! and pattern both match wins. There is no specificity ranking: a broad
//! pattern registered early shadows a narrower one registered later, and of two
//! identical bindings only the first is ever reached.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use http_body_util::Full;
use hyper::body::Bytes;
use hyper::{Method, Response};

use super::pattern::{PathParams, Pattern, PatternError};
use crate::error::ServeError;
use crate::http;
use crate::logger;

pub type HttpResponse = Response<Full<Bytes>>;
pub type HandlerResult = Result<HttpResponse, ServeError>;
pub type HandlerFuture = Pin<Box<dyn Future<Output = HandlerResult> + Send>>;
pub type Handler = Arc<dyn Fn(RouteRequest) -> HandlerFuture + Send + Sync>;

/// What a handler gets to see of the request
#[derive(Debug, Clone)]
pub struct RouteRequest {
    pub method: Method,
    /// Raw (still percent-encoded) request path
    pub path: String,
    /// Filled in by the router from the matched pattern
    pub params: PathParams,
    pub if_none_match: Option<String>,
}

impl RouteRequest {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            params: PathParams::default(),
            if_none_match: None,
        }
    }

    #[must_use]
    pub fn with_if_none_match(mut self, etag: Option<String>) -> Self {
        self.if_none_match = etag;
        self
    }
}

/// One registered endpoint
pub struct RouteBinding {
    method: Method,
    pattern: Pattern,
    handler: Handler,
}

impl RouteBinding {
    pub const fn method(&self) -> &Method {
        &self.method
    }

    pub const fn pattern(&self) -> &Pattern {
        &self.pattern
    }

    pub fn call(&self, request: RouteRequest) -> HandlerFuture {
        (self.handler)(request)
    }
}

impl std::fmt::Debug for RouteBinding {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RouteBinding")
            .field("method", &self.method)
            .field("pattern", &self.pattern.as_str())
            .finish_non_exhaustive()
    }
}

/// Result of a successful dispatch
#[derive(Debug)]
pub struct RouteMatch<'a> {
    /// Position of the binding in registration order
    pub index: usize,
    pub binding: &'a RouteBinding,
    pub params: PathParams,
}

/// Ordered list of route bindings
#[derive(Debug, Default)]
pub struct Router {
    bindings: Vec<RouteBinding>,
}

impl Router {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a binding. Duplicates are accepted; the earlier one shadows.
    pub fn register<F, Fut>(
        &mut self,
        method: Method,
        pattern: &str,
        handler: F,
    ) -> Result<&mut Self, PatternError>
    where
        F: Fn(RouteRequest) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = HandlerResult> + Send + 'static,
    {
        let pattern = Pattern::parse(pattern)?;
        let handler: Handler = Arc::new(move |req: RouteRequest| -> HandlerFuture { Box::pin(handler(req)) });
        self.bindings.push(RouteBinding {
            method,
            pattern,
            handler,
        });
        Ok(self)
    }

    /// Register a GET binding
    pub fn get<F, Fut>(&mut self, pattern: &str, handler: F) -> Result<&mut Self, PatternError>
    where
        F: Fn(RouteRequest) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = HandlerResult> + Send + 'static,
    {
        self.register(Method::GET, pattern, handler)
    }

    /// Register a POST binding
    pub fn post<F, Fut>(&mut self, pattern: &str, handler: F) -> Result<&mut Self, PatternError>
    where
        F: Fn(RouteRequest) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = HandlerResult> + Send + 'static,
    {
        self.register(Method::POST, pattern, handler)
    }

    pub fn bindings(&self) -> &[RouteBinding] {
        &self.bindings
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    /// Find the first binding matching `method` and `path`; `None` is "not found"
    pub fn dispatch(&self, method: &Method, path: &str) -> Option<RouteMatch<'_>> {
        self.bindings
            .iter()
            .enumerate()
            .filter(|(_, binding)| binding.method == *method)
            .find_map(|(index, binding)| {
                binding.pattern.matches(path).map(|params| RouteMatch {
                    index,
                    binding,
                    params,
                })
            })
    }

    /// Dispatch and run the handler, converting every outcome into a response
    pub async fn handle(&self, mut request: RouteRequest) -> HttpResponse {
        let Some(matched) = self.dispatch(&request.method, &request.path) else {
            tracing::debug!(method = %request.method, path = %request.path, "No route matched");
            return http::build_404_response();
        };

        let path = request.path.clone();
        request.params = matched.params;
        match matched.binding.call(request).await {
            Ok(response) => response,
            Err(err) => error_response(&path, &err),
        }
    }
}

/// Convert a handler error into its response, logging by severity
fn error_response(path: &str, err: &ServeError) -> HttpResponse {
    match err {
        ServeError::NotFound => tracing::debug!(path, "Not found"),
        ServeError::Forbidden(reason) => logger::log_security_event(path, reason),
        ServeError::BadRequest(reason) => logger::log_warning(&format!("Bad request '{path}': {reason}")),
        ServeError::Io { .. } => logger::log_error(&format!("Failed to serve '{path}': {err}")),
    }
    http::build_error_response(err.status())
}

#[cfg(test)]
mod tests {
    use super::*;
    use http_body_util::BodyExt;
    use hyper::StatusCode;

    fn text(body: &'static str) -> impl Fn(RouteRequest) -> std::future::Ready<HandlerResult> {
        move |_| std::future::ready(Ok(Response::new(Full::new(Bytes::from(body)))))
    }

    async fn body_of(resp: HttpResponse) -> String {
        let bytes = resp.into_body().collect().await.unwrap().to_bytes();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[test]
    fn test_first_match_wins() {
        let mut router = Router::new();
        router
            .get("/:slug", text("param"))
            .unwrap()
            .get("/about", text("literal"))
            .unwrap();

        let matched = router.dispatch(&Method::GET, "/about").unwrap();
        assert_eq!(matched.index, 0);
        assert_eq!(matched.binding.pattern().as_str(), "/:slug");
    }

    #[test]
    fn test_duplicate_bindings_always_yield_first() {
        let mut router = Router::new();
        router.get("/post/:slug", text("first")).unwrap();
        router.get("/post/:slug", text("second")).unwrap();

        for _ in 0..5 {
            let matched = router.dispatch(&Method::GET, "/post/a.md").unwrap();
            assert_eq!(matched.index, 0);
        }
    }

    #[test]
    fn test_method_must_match() {
        let mut router = Router::new();
        router.post("/items", text("post")).unwrap();
        router.get("/items", text("get")).unwrap();

        assert_eq!(router.dispatch(&Method::GET, "/items").unwrap().index, 1);
        assert_eq!(router.dispatch(&Method::POST, "/items").unwrap().index, 0);
        assert!(router.dispatch(&Method::DELETE, "/items").is_none());
        assert!(router.dispatch(&Method::GET, "/nothing").is_none());
    }

    #[test]
    fn test_register_rejects_bad_pattern() {
        let mut router = Router::new();
        assert!(router.get("no-slash", text("x")).is_err());
        assert!(router.is_empty());
        router.register(Method::PUT, "/x", text("x")).unwrap();
        assert_eq!(router.len(), 1);
        assert_eq!(router.bindings()[0].method(), &Method::PUT);
    }

    async fn echo_slug(req: RouteRequest) -> HandlerResult {
        let slug = req.params.param("slug")?;
        Ok(Response::new(Full::new(Bytes::from(slug))))
    }

    async fn forbidden(_: RouteRequest) -> HandlerResult {
        Err(ServeError::forbidden("nope"))
    }

    async fn missing(_: RouteRequest) -> HandlerResult {
        Err(ServeError::NotFound)
    }

    async fn absent_param(req: RouteRequest) -> HandlerResult {
        req.params.param("absent")?;
        Ok(Response::new(Full::new(Bytes::new())))
    }

    async fn broken_read(_: RouteRequest) -> HandlerResult {
        Err(ServeError::io("x", std::io::Error::other("disk gone")))
    }

    #[tokio::test]
    async fn test_handle_runs_matched_handler() {
        let mut router = Router::new();
        router.get("/post/:slug", echo_slug).unwrap();

        let resp = router
            .handle(RouteRequest::new(Method::GET, "/post/hello%20there.md"))
            .await;
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(body_of(resp).await, "hello there.md");
    }

    #[tokio::test]
    async fn test_handle_unmatched_is_404() {
        let router = Router::new();
        let resp = router.handle(RouteRequest::new(Method::GET, "/")).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_handler_errors_become_responses() {
        let mut router = Router::new();
        router
            .get("/forbidden", forbidden)
            .unwrap()
            .get("/missing", missing)
            .unwrap()
            .get("/param", absent_param)
            .unwrap()
            .get("/io", broken_read)
            .unwrap();

        let cases = [
            ("/forbidden", StatusCode::FORBIDDEN),
            ("/missing", StatusCode::NOT_FOUND),
            ("/param", StatusCode::BAD_REQUEST),
            ("/io", StatusCode::INTERNAL_SERVER_ERROR),
        ];
        for (path, status) in cases {
            let resp = router.handle(RouteRequest::new(Method::GET, path)).await;
            assert_eq!(resp.status(), status, "{path}");
        }
    }
}
