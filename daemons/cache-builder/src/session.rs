//! Watch session lifecycle.
//!
//! A [`WatchSession`] owns the full set of kind watch loops bound to one
//! cluster connection. `start` discovers the live namespaces, bootstraps
//! every kind (initial list plus one forced full dump) and spawns the
//! long-running loops; when it returns, every kind has a complete dump on
//! disk. `stop` cancels the session token and waits for every loop to
//! finish.

use std::collections::BTreeSet;
use std::fmt::Debug;
use std::hash::Hash;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use k8s_openapi::api::core::v1::Namespace;
use k8s_openapi::NamespaceResourceScope;
use kube::api::ListParams;
use kube::{Api, Client};
use resources::{
    ConfigMapRecord, CtorContext, DaemonSetRecord, DeploymentRecord, NamespaceRecord, NodeRecord,
    PodRecord, Record, ServiceRecord, StatefulSetRecord,
};
use serde::de::DeserializeOwned;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::config::Config;
use crate::error::CacheError;
use crate::store::ResourceStore;
use crate::watcher::{list_and_store, run_poll_loop, run_stream_loop, ScopedApi, WatchConfig};

/// The full set of active kind watch loops for one cluster connection.
#[derive(Debug)]
pub struct WatchSession {
    cluster: String,
    cancel: CancellationToken,
    tasks: Vec<JoinHandle<()>>,
}

impl WatchSession {
    /// Starts the watch set against one cluster. Namespace discovery or any
    /// kind's initial list failing is fatal to the whole start attempt.
    pub async fn start(
        client: Client,
        config: &Config,
        cluster: String,
        parent: &CancellationToken,
    ) -> Result<Self, CacheError> {
        info!("Start cache build on cluster {}", cluster);
        let namespaces = discover_namespaces(&client, &config.excluded_namespaces).await?;
        info!("Discovered {} namespaces", namespaces.len());

        let launcher = KindLauncher {
            client,
            config,
            ctx: CtorContext {
                cluster: cluster.clone(),
                role_blacklist: config.role_blacklist.clone(),
            },
            namespaces,
            cluster_dir: config.cache_dir.join(&cluster),
            cancel: parent.child_token(),
        };

        let (pods, services, deployments, statefulsets, daemonsets, configmaps, nodes, namespaces) =
            futures::try_join!(
                launcher.streamed::<PodRecord>(),
                launcher.streamed::<ServiceRecord>(),
                launcher.streamed::<DeploymentRecord>(),
                launcher.streamed::<StatefulSetRecord>(),
                launcher.streamed::<DaemonSetRecord>(),
                launcher.streamed::<ConfigMapRecord>(),
                launcher.polled::<NodeRecord>(config.node_polling_period),
                launcher.polled::<NamespaceRecord>(config.namespace_polling_period),
            )?;

        let tasks = [
            pods,
            services,
            deployments,
            statefulsets,
            daemonsets,
            configmaps,
            nodes,
            namespaces,
        ]
        .into_iter()
        .flatten()
        .collect();

        Ok(Self {
            cluster,
            cancel: launcher.cancel,
            tasks,
        })
    }

    /// Cluster this session is bound to.
    pub fn cluster(&self) -> &str {
        &self.cluster
    }

    /// Cancels every kind loop and waits until all of them have stopped.
    pub async fn stop(self) {
        info!("Stopping watch session for cluster {}", self.cluster);
        self.cancel.cancel();
        for task in self.tasks {
            if let Err(e) = task.await {
                warn!("Watch task ended abnormally: {}", e);
            }
        }
        info!("Watch session for cluster {} stopped", self.cluster);
    }
}

/// Shared parameters for launching one kind's loop.
struct KindLauncher<'a> {
    client: Client,
    config: &'a Config,
    ctx: CtorContext,
    namespaces: Vec<String>,
    cluster_dir: PathBuf,
    cancel: CancellationToken,
}

impl KindLauncher<'_> {
    /// Bootstraps and spawns the event-driven loop for one namespaced kind.
    /// Returns `None` when the kind is excluded by configuration.
    async fn streamed<R>(&self) -> Result<Option<JoinHandle<()>>, CacheError>
    where
        R: Record,
        R::Object: kube::Resource<Scope = NamespaceResourceScope>
            + Clone
            + DeserializeOwned
            + Debug
            + Send
            + Sync
            + 'static,
        <R::Object as kube::Resource>::DynamicType: Default + Eq + Hash + Clone,
    {
        if self.config.excluded_resources.contains(R::KIND) {
            info!("Resource {} is excluded from the cache", R::KIND);
            return Ok(None);
        }
        // Cluster-wide watch unless namespaces are excluded; then one watch
        // per discovered, non-excluded namespace.
        let apis: Vec<ScopedApi<R::Object>> = if self.config.excluded_namespaces.is_empty() {
            vec![(None, Api::all(self.client.clone()))]
        } else {
            self.namespaces
                .iter()
                .map(|ns| (Some(ns.clone()), Api::namespaced(self.client.clone(), ns)))
                .collect()
        };
        let watch_config = WatchConfig {
            excluded_namespaces: self.config.excluded_namespaces.clone(),
            poll_period: None,
        };
        let store = self.bootstrap::<R>(&apis, &watch_config).await?;
        Ok(Some(tokio::spawn(run_stream_loop(
            apis,
            store,
            self.ctx.clone(),
            watch_config,
            self.cancel.clone(),
        ))))
    }

    /// Bootstraps and spawns the polled loop for one cluster-scoped kind.
    async fn polled<R>(&self, poll_period: Duration) -> Result<Option<JoinHandle<()>>, CacheError>
    where
        R: Record,
        R::Object: kube::Resource + Clone + DeserializeOwned + Debug + Send + Sync + 'static,
        <R::Object as kube::Resource>::DynamicType: Default,
    {
        if self.config.excluded_resources.contains(R::KIND) {
            info!("Resource {} is excluded from the cache", R::KIND);
            return Ok(None);
        }
        let apis: Vec<ScopedApi<R::Object>> = vec![(None, Api::all(self.client.clone()))];
        let watch_config = WatchConfig {
            excluded_namespaces: self.config.excluded_namespaces.clone(),
            poll_period: Some(poll_period),
        };
        let store = self.bootstrap::<R>(&apis, &watch_config).await?;
        Ok(Some(tokio::spawn(run_poll_loop(
            apis,
            store,
            self.ctx.clone(),
            watch_config,
            self.cancel.clone(),
        ))))
    }

    /// Initial list plus one forced full dump, so the cache is never empty
    /// or partial after a successful session start.
    async fn bootstrap<R>(
        &self,
        apis: &[ScopedApi<R::Object>],
        watch_config: &WatchConfig,
    ) -> Result<Arc<ResourceStore<R>>, CacheError>
    where
        R: Record,
        R::Object: Clone + DeserializeOwned + Debug,
    {
        let store = Arc::new(ResourceStore::<R>::new(
            &self.cluster_dir,
            self.config.time_between_full_dump,
        ));
        let count = list_and_store(apis, &store, &self.ctx, watch_config).await?;
        store.flush_now()?;
        info!("Wrote initial dump of {} {}", count, R::KIND);
        Ok(store)
    }
}

/// Lists the live namespaces, minus the excluded ones.
async fn discover_namespaces(
    client: &Client,
    excluded: &BTreeSet<String>,
) -> Result<Vec<String>, CacheError> {
    let api: Api<Namespace> = Api::all(client.clone());
    let list = api.list(&ListParams::default()).await?;
    Ok(list
        .into_iter()
        .filter_map(|ns| ns.metadata.name)
        .filter(|name| !excluded.contains(name))
        .collect())
}
