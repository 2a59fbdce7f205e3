use std::sync::Arc;

use beacon::config::Config;
use beacon::index::SearchIndex;
use beacon::router::AppState;
use beacon::server;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_target(false)
        .with_level(true)
        .init();

    let cfg = Config::load()?;

    let index = SearchIndex::build(&cfg.search.static_dir, &cfg.search.index_sources)?;
    let state = Arc::new(AppState {
        static_dir: cfg.search.static_dir.clone(),
        index,
    });

    tokio::select! {
        res = server::serve(&cfg, state) => {
            res?;
        }

        _ = tokio::signal::ctrl_c() => {
            tracing::info!("Shutdown signal received");
        }
    }

    Ok(())
}
