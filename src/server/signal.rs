// Signal handling module
//
// Supported signals:
// - SIGHUP:  Reload the content listing
// - SIGTERM: Graceful shutdown
// - SIGINT:  Graceful shutdown (Ctrl+C)

use std::sync::Arc;

use crate::config::AppState;

#[cfg(unix)]
fn reload_content(state: &Arc<AppState>) {
    tracing::info!("[SIGNAL] SIGHUP received, refreshing content cache");
    let state = Arc::clone(state);
    tokio::spawn(async move {
        state.cache.refresh().await;
    });
}

fn request_shutdown(state: &AppState, name: &str) {
    tracing::info!("[SIGNAL] {name} received, initiating graceful shutdown");
    state.shutdown.notify_one();
}

/// Start the signal listener task (Unix).
///
/// | Signal  | Action                  |
/// |---------|-------------------------|
/// | SIGHUP  | Refresh content cache   |
/// | SIGTERM | Graceful stop           |
/// | SIGINT  | Graceful stop           |
///
/// # Errors
///
/// Fails if a signal handler cannot be registered.
#[cfg(unix)]
pub fn start_signal_handler(state: Arc<AppState>) -> std::io::Result<()> {
    use tokio::signal::unix::{signal, SignalKind};

    let mut sighup = signal(SignalKind::hangup())?;
    let mut sigterm = signal(SignalKind::terminate())?;
    let mut sigint = signal(SignalKind::interrupt())?;
    tracing::info!(
        "[SIGNAL] Handlers registered (pid {}): HUP refreshes content, TERM/INT stop",
        std::process::id()
    );

    tokio::spawn(async move {
        loop {
            tokio::select! {
                _ = sighup.recv() => reload_content(&state),
                _ = sigterm.recv() => {
                    request_shutdown(&state, "SIGTERM");
                    break;
                }
                _ = sigint.recv() => {
                    request_shutdown(&state, "SIGINT");
                    break;
                }
            }
        }
    });
    Ok(())
}

/// Non-Unix fallback: only Ctrl+C is handled
#[cfg(not(unix))]
pub fn start_signal_handler(state: Arc<AppState>) -> std::io::Result<()> {
    tokio::spawn(async move {
        if let Ok(()) = tokio::signal::ctrl_c().await {
            request_shutdown(&state, "Ctrl+C");
        }
    });
    Ok(())
}
