//! Per-kind watch loops.
//!
//! One loop runs per resource kind, independent of all others. Event-capable
//! kinds consume `kube_runtime::watcher` streams; the watcher's `Init` /
//! `InitApply` / `InitDone` phases are its relists, and a sweep on
//! `InitDone` prunes records that vanished while a stream was down. Slowly
//! changing kinds (nodes, namespaces) relist on a fixed period instead.
//!
//! Stream errors never terminate a loop: they log a warning and back off
//! before the stream re-establishes. Only cancellation stops a loop.

use std::collections::{BTreeSet, HashMap};
use std::fmt::Debug;
use std::hash::Hash;
use std::sync::Arc;
use std::time::Duration;

use futures::stream::{self, StreamExt};
use kube::api::ListParams;
use kube::Api;
use kube_runtime::watcher;
use kube_runtime::watcher::Event;
use resources::{CtorContext, Record, RecordKey};
use serde::de::DeserializeOwned;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, trace, warn};

use crate::backoff::FibonacciBackoff;
use crate::error::CacheError;
use crate::store::ResourceStore;

/// How often a loop checks whether a debounced flush is due.
const FLUSH_CHECK_PERIOD: Duration = Duration::from_secs(5);

/// Stream retry backoff bounds, in seconds.
const STREAM_RETRY_MIN_SECS: u64 = 1;
const STREAM_RETRY_MAX_SECS: u64 = 30;

/// Fallback relist period when a polled kind carries no explicit one.
const DEFAULT_POLL_PERIOD: Duration = Duration::from_secs(300);

/// One API handle per watch scope: `None` for a cluster-wide handle, or the
/// namespace name for a per-namespace handle.
pub type ScopedApi<K> = (Option<String>, Api<K>);

/// Per-kind watch parameters, derived once per session from the global
/// exclusion lists and the discovered namespace list.
#[derive(Debug, Clone)]
pub struct WatchConfig {
    /// Namespaces whose objects are filtered out of this kind.
    pub excluded_namespaces: BTreeSet<String>,
    /// Relist period for polled kinds; `None` for event-driven kinds.
    pub poll_period: Option<Duration>,
}

/// Tracks, per stream scope, the keys reported by an in-flight relist so
/// that `InitDone` can sweep records the relist did not mention.
#[derive(Debug, Default)]
pub(crate) struct InitTracker {
    pending: HashMap<Option<String>, BTreeSet<RecordKey>>,
}

/// Lists every object in scope and reconciles the store against the result:
/// upserts all listed objects and sweeps keys the list no longer contains.
/// Returns the number of listed objects.
pub(crate) async fn list_and_store<R>(
    apis: &[ScopedApi<R::Object>],
    store: &ResourceStore<R>,
    ctx: &CtorContext,
    watch_config: &WatchConfig,
) -> Result<usize, CacheError>
where
    R: Record,
    R::Object: Clone + DeserializeOwned + Debug,
{
    let mut total = 0;
    for (scope, api) in apis {
        let objects = api.list(&ListParams::default()).await?;
        let mut seen = BTreeSet::new();
        for obj in &objects {
            if let Some(record) = build_record::<R>(obj, ctx, &watch_config.excluded_namespaces) {
                seen.insert(record.key());
                store.upsert(record);
                total += 1;
            }
        }
        store.sweep(scope.as_deref(), &seen);
    }
    Ok(total)
}

/// Runs the event-driven loop for one kind until cancellation.
pub(crate) async fn run_stream_loop<R>(
    apis: Vec<ScopedApi<R::Object>>,
    store: Arc<ResourceStore<R>>,
    ctx: CtorContext,
    watch_config: WatchConfig,
    cancel: CancellationToken,
) where
    R: Record,
    R::Object: kube::Resource + Clone + DeserializeOwned + Debug + Send + Sync + 'static,
    <R::Object as kube::Resource>::DynamicType: Default + Eq + Hash + Clone,
{
    let mut streams = stream::select_all(apis.into_iter().map(|(scope, api)| {
        watcher(api, watcher::Config::default())
            .map(move |event| (scope.clone(), event))
            .boxed()
    }));
    let mut init = InitTracker::default();
    let mut backoff = FibonacciBackoff::new(STREAM_RETRY_MIN_SECS, STREAM_RETRY_MAX_SECS);
    let mut flush_tick = tokio::time::interval(FLUSH_CHECK_PERIOD);

    info!("Starting {} watch loop", R::KIND);
    loop {
        tokio::select! {
            () = cancel.cancelled() => break,
            _ = flush_tick.tick() => flush(&store),
            item = streams.next() => match item {
                None => break,
                Some((scope, Ok(event))) => {
                    if matches!(event, Event::InitDone) {
                        backoff.reset();
                    }
                    apply_event(
                        &store,
                        &ctx,
                        &watch_config.excluded_namespaces,
                        scope.as_deref(),
                        &mut init,
                        event,
                    );
                }
                Some((_, Err(e))) => {
                    let delay = backoff.next_backoff();
                    warn!("Watch stream error for {}: {}; retrying in {:?}", R::KIND, e, delay);
                    tokio::select! {
                        () = cancel.cancelled() => break,
                        () = tokio::time::sleep(delay) => {}
                    }
                }
            }
        }
    }
    info!("Stopped {} watch loop", R::KIND);
}

/// Runs the relist-on-interval loop for a polled kind until cancellation.
pub(crate) async fn run_poll_loop<R>(
    apis: Vec<ScopedApi<R::Object>>,
    store: Arc<ResourceStore<R>>,
    ctx: CtorContext,
    watch_config: WatchConfig,
    cancel: CancellationToken,
) where
    R: Record,
    R::Object: Clone + DeserializeOwned + Debug + Send + Sync + 'static,
{
    let poll_period = watch_config.poll_period.unwrap_or(DEFAULT_POLL_PERIOD);
    let mut poll_tick = tokio::time::interval(poll_period);
    poll_tick.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
    let mut flush_tick = tokio::time::interval(FLUSH_CHECK_PERIOD);

    info!("Starting {} poll loop, period {:?}", R::KIND, poll_period);
    loop {
        tokio::select! {
            () = cancel.cancelled() => break,
            _ = poll_tick.tick() => {
                match list_and_store(&apis, &store, &ctx, &watch_config).await {
                    Ok(count) => trace!("Polled {} {} objects", count, R::KIND),
                    // A failed poll is transient; the baseline from the last
                    // successful list stays in place.
                    Err(e) => warn!("Poll of {} failed: {}", R::KIND, e),
                }
            }
            _ = flush_tick.tick() => flush(&store),
        }
    }
    info!("Stopped {} poll loop", R::KIND);
}

/// Applies one watcher event to the store, in arrival order.
pub(crate) fn apply_event<R: Record>(
    store: &ResourceStore<R>,
    ctx: &CtorContext,
    excluded_namespaces: &BTreeSet<String>,
    scope: Option<&str>,
    init: &mut InitTracker,
    event: Event<R::Object>,
) {
    match event {
        Event::Init => {
            init.pending.insert(scope.map(str::to_string), BTreeSet::new());
        }
        Event::InitApply(obj) => {
            if let Some(record) = build_record::<R>(&obj, ctx, excluded_namespaces) {
                if let Some(seen) = init.pending.get_mut(&scope.map(str::to_string)) {
                    seen.insert(record.key());
                }
                store.upsert(record);
            }
        }
        Event::InitDone => {
            if let Some(seen) = init.pending.remove(&scope.map(str::to_string)) {
                let removed = store.sweep(scope, &seen);
                if removed > 0 {
                    debug!("Relist of {} pruned {} stale records", R::KIND, removed);
                }
            }
        }
        Event::Apply(obj) => {
            if let Some(record) = build_record::<R>(&obj, ctx, excluded_namespaces) {
                store.upsert(record);
            }
        }
        Event::Delete(obj) => {
            if let Some(record) = build_record::<R>(&obj, ctx, excluded_namespaces) {
                store.remove(&record.key());
            }
        }
    }
}

/// Normalizes a raw object, skipping malformed objects and excluded
/// namespaces. One bad object must not stop the kind's loop.
fn build_record<R: Record>(
    obj: &R::Object,
    ctx: &CtorContext,
    excluded_namespaces: &BTreeSet<String>,
) -> Option<R> {
    match R::from_object(obj, ctx) {
        Ok(record) => {
            (!excluded_namespaces.contains(&record.meta().namespace)).then_some(record)
        }
        Err(e) => {
            warn!("Skipping malformed {} object: {}", R::KIND, e);
            None
        }
    }
}

/// Debounced flush with the I/O-failure policy: warn and retry next tick.
fn flush<R: Record>(store: &ResourceStore<R>) {
    if let Err(e) = store.flush_if_due() {
        warn!("Failed to write {} dump, will retry: {}", R::KIND, e);
    }
}
