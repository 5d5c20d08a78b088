//! Cache builder daemon.
//!
//! Maintains on-disk dump files of cluster resource metadata (pods,
//! services, deployments, statefulsets, daemonsets, configmaps, nodes,
//! namespaces) for a shell completion frontend. Watches every kind
//! concurrently, batches writes behind a debounce window, and hot-swaps the
//! whole watch set when the selected kube context changes.

mod backoff;
mod config;
mod error;
mod session;
mod store;
mod supervisor;
mod watcher;

#[cfg(test)]
mod test_utils;

#[cfg(test)]
mod backoff_test;
#[cfg(test)]
mod store_test;
#[cfg(test)]
mod watcher_test;

use config::Config;
use supervisor::Supervisor;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    info!("Starting cache builder");
    let config = Config::from_env()?;
    info!("Configuration:");
    info!("  Cache directory: {:?}", config.cache_dir);
    info!("  Excluded namespaces: {:?}", config.excluded_namespaces);
    info!("  Excluded resources: {:?}", config.excluded_resources);
    info!("  Debounce window: {:?}", config.time_between_full_dump);

    let cancel = CancellationToken::new();
    tokio::spawn(handle_signals(cancel.clone()));

    Supervisor::new(config).run(cancel).await?;
    info!("Cache builder terminated");
    Ok(())
}

/// Cancels the root token on SIGINT or SIGTERM.
async fn handle_signals(cancel: CancellationToken) {
    use tokio::signal::unix::{signal, SignalKind};

    let mut sigterm = match signal(SignalKind::terminate()) {
        Ok(sig) => sig,
        Err(e) => {
            error!("Could not install SIGTERM handler: {}", e);
            return;
        }
    };
    tokio::select! {
        _ = tokio::signal::ctrl_c() => info!("Caught SIGINT; terminating"),
        _ = sigterm.recv() => info!("Caught SIGTERM; terminating"),
    }
    cancel.cancel();
}
