use std::sync::Arc;

use reginald::config::{AppState, Config};
use reginald::routing::Router;
use reginald::{handler, logger, server};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // First argument, if any, is the config file path
    let cfg = match std::env::args().nth(1) {
        Some(path) => Config::load_from(&path)?,
        None => Config::load()?,
    };
    logger::init(&cfg).map_err(|e| e.to_string())?;

    // Create Tokio runtime, thread count from the workers setting
    let mut runtime_builder = tokio::runtime::Builder::new_multi_thread();
    runtime_builder.enable_all();
    if let Some(workers) = cfg.server.workers {
        runtime_builder.worker_threads(workers);
    }
    let runtime = runtime_builder.build()?;

    runtime.block_on(async_main(cfg))
}

async fn async_main(cfg: Config) -> Result<(), Box<dyn std::error::Error>> {
    let addr = cfg.get_socket_addr()?;
    let listener = server::create_listener(addr)?;

    let state = Arc::new(AppState::new(&cfg));
    let mut router = Router::new();
    handler::register_routes(&mut router, &state)?;
    let router = Arc::new(router);

    server::signal::start_signal_handler(Arc::clone(&state))?;

    // Warm the listing so the first visitor does not pay for the load
    let snapshot = state.cache.get(false).await;
    if snapshot.is_empty() {
        logger::log_warning(&format!(
            "No content found in '{}' (extension .{})",
            cfg.content.dir, cfg.content.extension
        ));
    }

    logger::log_server_start(&addr, &cfg);
    server::start_server_loop(listener, router, state).await;
    Ok(())
}
