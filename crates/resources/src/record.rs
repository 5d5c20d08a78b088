//! The record capability set shared by every resource kind.

use std::fmt;

use crate::meta::{CtorContext, RecordError, ResourceMeta};

/// Unique key of a record within one cluster and kind.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RecordKey {
    /// Namespace, empty for cluster-scoped kinds.
    pub namespace: String,
    /// Object name.
    pub name: String,
}

impl RecordKey {
    /// Builds a key from a namespace and name.
    pub fn new(namespace: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            name: name.into(),
        }
    }
}

impl fmt::Display for RecordKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.namespace.is_empty() {
            write!(f, "{}", self.name)
        } else {
            write!(f, "{}/{}", self.namespace, self.name)
        }
    }
}

/// One normalized view of a cluster object, implemented per kind.
///
/// Records are replaced wholesale on update, never field-patched.
/// `has_changed` compares only the fields surfaced in the dump line so that
/// unrelated status churn never dirties the on-disk cache.
pub trait Record: fmt::Debug + Clone + Send + Sync + 'static {
    /// The raw control-plane object this record is built from.
    type Object: Clone + Send + Sync + 'static;

    /// Dump file stem for the kind, e.g. `pods`.
    const KIND: &'static str;

    /// Column header emitted at the top of every full dump.
    const HEADER: &'static str;

    /// Builds a record from a raw object. Fails only on malformed input.
    fn from_object(obj: &Self::Object, ctx: &CtorContext) -> Result<Self, RecordError>
    where
        Self: Sized;

    /// Common metadata shared by all kinds.
    fn meta(&self) -> &ResourceMeta;

    /// Semantic comparison over displayed fields. Must be false for two
    /// records built from the same object state.
    fn has_changed(&self, previous: &Self) -> bool;

    /// Renders the record as one space-separated dump line matching
    /// [`Self::HEADER`].
    fn to_line(&self) -> String;

    /// Store key of this record.
    fn key(&self) -> RecordKey {
        let meta = self.meta();
        RecordKey::new(meta.namespace.clone(), meta.name.clone())
    }
}
