//! Shared record metadata and label normalization.
//!
//! Every record embeds a [`ResourceMeta`] built from the object's
//! `ObjectMeta` plus the per-cluster [`CtorContext`]. Labels are normalized
//! once at construction: operational labels are stripped and values are
//! sanitized so one record always stays on one dump line.

use std::collections::{BTreeMap, BTreeSet};

use chrono::{DateTime, Utc};
use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;
use thiserror::Error;

/// Labels managed by controllers that churn without changing what the
/// completion line displays. Stripped at construction time.
pub const EXCLUDED_LABELS: &[&str] = &[
    "pod-template-hash",
    "controller-revision-hash",
    "pod-template-generation",
    "statefulset.kubernetes.io/pod-name",
];

/// Errors raised while building a record from a raw object.
#[derive(Debug, Error)]
pub enum RecordError {
    /// The object carries no name in its metadata.
    #[error("object has no name in metadata")]
    MissingName,
}

/// Immutable per-cluster construction parameters, built once per session
/// and threaded into every record construction.
#[derive(Debug, Clone, Default)]
pub struct CtorContext {
    /// Human-readable cluster name (the kube context name).
    pub cluster: String,
    /// Node roles hidden from the node dump line.
    pub role_blacklist: BTreeSet<String>,
}

/// Fields common to all record kinds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceMeta {
    /// Cluster the object was observed on.
    pub cluster: String,
    /// Namespace, empty for cluster-scoped kinds.
    pub namespace: String,
    /// Object name.
    pub name: String,
    /// Normalized label set: operational labels stripped, values sanitized.
    pub labels: BTreeMap<String, String>,
    /// Creation timestamp, rendered as an age at dump time.
    pub created: Option<DateTime<Utc>>,
}

impl ResourceMeta {
    /// Builds the common metadata from an object's `ObjectMeta`.
    pub fn from_object_meta(meta: &ObjectMeta, ctx: &CtorContext) -> Result<Self, RecordError> {
        let name = meta.name.clone().ok_or(RecordError::MissingName)?;
        let namespace = meta.namespace.clone().unwrap_or_default();
        let labels = meta.labels.as_ref().map(normalize_labels).unwrap_or_default();
        let created = meta.creation_timestamp.as_ref().map(|t| t.0);
        Ok(Self {
            cluster: ctx.cluster.clone(),
            namespace,
            name,
            labels,
            created,
        })
    }

    /// Renders the label column: `k1=v1,k2=v2`, or the empty string when the
    /// object carries no labels.
    pub fn label_column(&self) -> String {
        join_pairs(&self.labels)
    }

    /// Renders the object's age relative to now.
    pub fn age(&self) -> String {
        format_age(self.created, Utc::now())
    }
}

/// Drops operational labels and sanitizes the remaining values.
pub fn normalize_labels(labels: &BTreeMap<String, String>) -> BTreeMap<String, String> {
    labels
        .iter()
        .filter(|(k, _)| !EXCLUDED_LABELS.contains(&k.as_str()))
        .map(|(k, v)| (k.clone(), sanitize_value(v)))
        .collect()
}

/// Replaces whitespace in a label value so it cannot break the
/// one-record-per-line framing of the dump files.
pub fn sanitize_value(value: &str) -> String {
    value
        .chars()
        .map(|c| if c.is_whitespace() { '_' } else { c })
        .collect()
}

/// Joins a label map into `k=v` pairs separated by commas, sorted by key.
pub fn join_pairs(map: &BTreeMap<String, String>) -> String {
    let pairs: Vec<String> = map.iter().map(|(k, v)| format!("{k}={v}")).collect();
    pairs.join(",")
}

/// Derives selector expressions from a label selector's match labels,
/// excluding operational labels, sorted by key.
pub fn selector_expressions(match_labels: Option<&BTreeMap<String, String>>) -> Vec<String> {
    match_labels
        .map(|m| {
            m.iter()
                .filter(|(k, _)| !EXCLUDED_LABELS.contains(&k.as_str()))
                .map(|(k, v)| format!("{}={}", k, sanitize_value(v)))
                .collect()
        })
        .unwrap_or_default()
}

/// Renders `None` in place of an empty mid-line column so the column count
/// stays stable when splitting on whitespace.
pub fn or_none(value: String) -> String {
    if value.is_empty() { "None".to_string() } else { value }
}

/// Formats an age the way kubectl does: the largest single unit.
pub fn format_age(created: Option<DateTime<Utc>>, now: DateTime<Utc>) -> String {
    let Some(created) = created else {
        return "None".to_string();
    };
    let elapsed = now.signed_duration_since(created);
    let secs = elapsed.num_seconds().max(0);
    if secs >= 86_400 {
        format!("{}d", secs / 86_400)
    } else if secs >= 3_600 {
        format!("{}h", secs / 3_600)
    } else if secs >= 60 {
        format!("{}m", secs / 60)
    } else {
        format!("{secs}s")
    }
}
