//! Cluster-context supervision.
//!
//! The supervisor polls the kubeconfig's selected context on a short fixed
//! interval. When the identity behind it changes, it stops the active
//! session, waits for every loop to reach a stop, and starts a new session
//! against the new cluster with the same configuration. Exactly one session
//! is active at any time.

use std::time::Duration;

use kube::config::{KubeConfigOptions, Kubeconfig};
use kube::{Client, Config as KubeConfig};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::error::CacheError;
use crate::session::WatchSession;

/// How often the selected cluster context is re-read.
const CONTEXT_POLL_PERIOD: Duration = Duration::from_secs(5);

/// Identity of the currently selected cluster connection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClusterIdentity {
    /// Kube context name; also keys the per-cluster dump directory.
    pub context: String,
    /// API server URL behind the context.
    pub server: String,
}

impl ClusterIdentity {
    /// Resolves the selected context and its API server from a kubeconfig.
    pub fn from_kubeconfig(kubeconfig: &Kubeconfig) -> Result<Self, CacheError> {
        let context = kubeconfig
            .current_context
            .clone()
            .ok_or(CacheError::NoCurrentContext)?;
        let named = kubeconfig
            .contexts
            .iter()
            .find(|c| c.name == context)
            .ok_or_else(|| CacheError::ContextNotFound(context.clone()))?;
        let cluster_name = named
            .context
            .as_ref()
            .map(|c| c.cluster.clone())
            .unwrap_or_default();
        let server = kubeconfig
            .clusters
            .iter()
            .find(|c| c.name == cluster_name)
            .and_then(|c| c.cluster.as_ref())
            .and_then(|c| c.server.clone())
            .unwrap_or_default();
        Ok(Self { context, server })
    }

    /// Reads the identity from the kubeconfig on disk.
    fn current() -> Result<Self, CacheError> {
        let kubeconfig = Kubeconfig::read()?;
        Self::from_kubeconfig(&kubeconfig)
    }
}

/// Builds a client bound to the identity's context.
async fn client_for(identity: &ClusterIdentity) -> Result<Client, CacheError> {
    let options = KubeConfigOptions {
        context: Some(identity.context.clone()),
        ..KubeConfigOptions::default()
    };
    let kube_config = KubeConfig::from_kubeconfig(&options).await?;
    Ok(Client::try_from(kube_config)?)
}

/// Supervises exactly one active watch session, hot-swapping it when the
/// selected cluster context changes.
#[derive(Debug)]
pub struct Supervisor {
    config: Config,
}

impl Supervisor {
    /// Creates a supervisor with the daemon configuration.
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    /// Runs until the token is cancelled. A failed session start is fatal;
    /// outer process supervision handles restarts.
    pub async fn run(&self, cancel: CancellationToken) -> Result<(), CacheError> {
        let mut identity = ClusterIdentity::current()?;
        let mut session = self.start_session(&identity, &cancel).await?;
        let mut ticker = tokio::time::interval(CONTEXT_POLL_PERIOD);

        loop {
            tokio::select! {
                () = cancel.cancelled() => {
                    session.stop().await;
                    return Ok(());
                }
                _ = ticker.tick() => match ClusterIdentity::current() {
                    Ok(current) if current != identity => {
                        info!(
                            "Detected cluster change {} != {}",
                            current.server, identity.server
                        );
                        // The old session stops fully before the new one
                        // starts; two sessions are never active at once.
                        session.stop().await;
                        session = self.start_session(&current, &cancel).await?;
                        identity = current;
                    }
                    Ok(_) => debug!("Cluster identity unchanged: {}", identity.server),
                    Err(e) => warn!("Could not read kubeconfig, keeping current session: {}", e),
                }
            }
        }
    }

    async fn start_session(
        &self,
        identity: &ClusterIdentity,
        cancel: &CancellationToken,
    ) -> Result<WatchSession, CacheError> {
        let client = client_for(identity).await?;
        WatchSession::start(client, &self.config, identity.context.clone(), cancel).await
    }
}
