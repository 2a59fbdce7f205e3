//! Accept loop and worker dispatch.

pub mod dispatcher;
pub mod listener;

use std::sync::Arc;

use anyhow::Context;
use tracing::{error, info};

use crate::config::Config;
use crate::router::AppState;
use dispatcher::{ConnectionTask, WorkerPool};
use listener::Listener;

/// Binds the listening socket and serves until a fatal accept failure.
pub async fn serve(cfg: &Config, state: Arc<AppState>) -> anyhow::Result<()> {
    let listener = Listener::bind(cfg.server.port, cfg.server.family)
        .context("could not create the listening socket")?;
    run(listener, cfg.server.pool_size, state).await
}

/// The accept loop over an already-bound listener, split out so the
/// hosting process (or a test) can bind first and learn the port.
///
/// Any accept failure ends the whole server: the error is logged and
/// returned, and no further connections are served.
pub async fn run(
    listener: Listener,
    pool_size: usize,
    state: Arc<AppState>,
) -> anyhow::Result<()> {
    let pool = WorkerPool::new(pool_size);
    info!(
        addr = %listener.local_addr()?,
        workers = pool.size(),
        "accepting connections"
    );

    loop {
        let (stream, endpoint) = match listener.accept().await {
            Ok(accepted) => accepted,
            Err(e) => {
                error!(error = %e, "accept failed, shutting down");
                return Err(e);
            }
        };

        pool.submit(ConnectionTask {
            stream,
            endpoint,
            state: Arc::clone(&state),
        })
        .await?;
    }
}
