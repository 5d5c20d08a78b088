//! Daemon configuration.
//!
//! One immutable [`Config`] value is built from the environment before any
//! session exists and threaded down explicitly: session, watch scopes, kind
//! loops. Nothing reads the environment after startup.

use std::collections::BTreeSet;
use std::env;
use std::path::PathBuf;
use std::time::Duration;

use crate::error::CacheError;

/// Static daemon configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Root directory for per-cluster dump files.
    pub cache_dir: PathBuf,
    /// Namespaces whose objects never enter the cache.
    pub excluded_namespaces: BTreeSet<String>,
    /// Resource kinds (dump file stems) disabled entirely.
    pub excluded_resources: BTreeSet<String>,
    /// Node roles hidden from the node dump line.
    pub role_blacklist: BTreeSet<String>,
    /// Relist period for nodes.
    pub node_polling_period: Duration,
    /// Relist period for namespaces.
    pub namespace_polling_period: Duration,
    /// Debounce window between successive full dumps of one kind.
    pub time_between_full_dump: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            cache_dir: PathBuf::from("/tmp/kube_fzf_cache"),
            excluded_namespaces: BTreeSet::new(),
            excluded_resources: BTreeSet::new(),
            role_blacklist: BTreeSet::new(),
            node_polling_period: Duration::from_secs(300),
            namespace_polling_period: Duration::from_secs(600),
            time_between_full_dump: Duration::from_secs(60),
        }
    }
}

impl Config {
    /// Loads the configuration from environment variables, falling back to
    /// the defaults above. Unparseable durations are fatal.
    pub fn from_env() -> Result<Self, CacheError> {
        let defaults = Self::default();
        Ok(Self {
            cache_dir: env::var("CACHE_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.cache_dir),
            excluded_namespaces: parse_list(env::var("EXCLUDED_NAMESPACES").ok().as_deref()),
            excluded_resources: parse_list(env::var("EXCLUDED_RESOURCES").ok().as_deref()),
            role_blacklist: parse_list(env::var("ROLE_BLACKLIST").ok().as_deref()),
            node_polling_period: parse_duration_secs(
                "NODE_POLLING_PERIOD_SECS",
                env::var("NODE_POLLING_PERIOD_SECS").ok().as_deref(),
                defaults.node_polling_period,
            )?,
            namespace_polling_period: parse_duration_secs(
                "NAMESPACE_POLLING_PERIOD_SECS",
                env::var("NAMESPACE_POLLING_PERIOD_SECS").ok().as_deref(),
                defaults.namespace_polling_period,
            )?,
            time_between_full_dump: parse_duration_secs(
                "TIME_BETWEEN_FULL_DUMP_SECS",
                env::var("TIME_BETWEEN_FULL_DUMP_SECS").ok().as_deref(),
                defaults.time_between_full_dump,
            )?,
        })
    }
}

/// Splits a space- or comma-separated list variable into a set.
pub(crate) fn parse_list(raw: Option<&str>) -> BTreeSet<String> {
    raw.map(|value| {
        value
            .split([' ', ','])
            .filter(|item| !item.is_empty())
            .map(str::to_string)
            .collect()
    })
    .unwrap_or_default()
}

/// Parses a duration variable given in whole seconds.
pub(crate) fn parse_duration_secs(
    name: &str,
    raw: Option<&str>,
    default: Duration,
) -> Result<Duration, CacheError> {
    match raw {
        None => Ok(default),
        Some(value) => value
            .trim()
            .parse::<u64>()
            .map(Duration::from_secs)
            .map_err(|e| {
                CacheError::InvalidConfig(format!("{name} must be whole seconds, got {value}: {e}"))
            }),
    }
}
