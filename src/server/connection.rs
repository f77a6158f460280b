// Connection handling module
// Accepts a TCP connection and serves HTTP/1.1 on it through the router

use std::convert::Infallible;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use hyper::body::{Body, Incoming};
use hyper::header::IF_NONE_MATCH;
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper::Request;
use hyper_util::rt::TokioIo;

use crate::config::AppState;
use crate::logger;
use crate::routing::{HttpResponse, RouteRequest, Router};

/// Accept a connection unless the connection limit is reached.
///
/// The counter is incremented before the limit check so concurrent accepts
/// cannot both slip under it.
pub fn accept_connection(
    stream: tokio::net::TcpStream,
    peer_addr: std::net::SocketAddr,
    router: &Arc<Router>,
    state: &Arc<AppState>,
    conn_counter: &Arc<AtomicUsize>,
) {
    let prev_count = conn_counter.fetch_add(1, Ordering::SeqCst);
    if let Some(max_conn) = state.config.performance.max_connections {
        if prev_count >= usize::try_from(max_conn).unwrap_or(usize::MAX) {
            conn_counter.fetch_sub(1, Ordering::SeqCst);
            logger::log_warning(&format!(
                "Max connections reached: {prev_count}/{max_conn}. Connection from {peer_addr} rejected."
            ));
            drop(stream);
            return;
        }
    }

    logger::log_connection_accepted(&peer_addr);
    if let Err(e) = stream.set_nodelay(true) {
        tracing::debug!("Failed to set TCP_NODELAY for {peer_addr}: {e}");
    }
    handle_connection(
        stream,
        Arc::clone(router),
        Arc::clone(state),
        Arc::clone(conn_counter),
    );
}

/// Serve one connection on its own task.
///
/// The whole connection, keep-alive included, is bounded by
/// `max(read_timeout, write_timeout)`. The counter is released when the task
/// ends however the connection finished.
fn handle_connection(
    stream: tokio::net::TcpStream,
    router: Arc<Router>,
    state: Arc<AppState>,
    conn_counter: Arc<AtomicUsize>,
) {
    tokio::spawn(async move {
        let io = TokioIo::new(stream);
        let performance = &state.config.performance;
        let timeout_duration = Duration::from_secs(std::cmp::max(
            performance.read_timeout,
            performance.write_timeout,
        ));

        let mut builder = http1::Builder::new();
        builder.keep_alive(performance.keep_alive_timeout > 0);

        let access_log = state.access_log();
        let conn = builder.serve_connection(
            io,
            service_fn(move |req| serve_request(req, Arc::clone(&router), access_log)),
        );

        match tokio::time::timeout(timeout_duration, conn).await {
            Ok(Ok(())) => {}
            Ok(Err(err)) => logger::log_connection_error(&err),
            Err(_) => tracing::debug!(
                "Connection closed after {}s timeout",
                timeout_duration.as_secs()
            ),
        }

        conn_counter.fetch_sub(1, Ordering::SeqCst);
    });
}

/// Translate a hyper request for the router; handler failures are already
/// responses by the time they get here
async fn serve_request(
    req: Request<Incoming>,
    router: Arc<Router>,
    access_log: bool,
) -> Result<HttpResponse, Infallible> {
    let start = Instant::now();
    let route_request = to_route_request(&req);
    let method = route_request.method.clone();
    let path = route_request.path.clone();

    let response = router.handle(route_request).await;

    if access_log {
        let body_bytes = response.body().size_hint().exact().unwrap_or(0);
        logger::log_access(&method, &path, response.status(), body_bytes, start.elapsed());
    }
    Ok(response)
}

fn to_route_request<B>(req: &Request<B>) -> RouteRequest {
    let if_none_match = req
        .headers()
        .get(IF_NONE_MATCH)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    RouteRequest::new(req.method().clone(), req.uri().path()).with_if_none_match(if_none_match)
}
