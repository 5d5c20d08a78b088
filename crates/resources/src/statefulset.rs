//! StatefulSet records.

use k8s_openapi::api::apps::v1::StatefulSet;

use crate::meta::{or_none, selector_expressions, CtorContext, RecordError, ResourceMeta};
use crate::record::Record;

/// Summary of a statefulset: replica progress and its label selector.
#[derive(Debug, Clone)]
pub struct StatefulSetRecord {
    /// Common metadata.
    pub meta: ResourceMeta,
    /// Replicas created by the current revision.
    pub current_replicas: i32,
    /// Replicas observed by the controller.
    pub replicas: i32,
    /// Selector expressions derived from the label selector.
    pub selectors: Vec<String>,
}

impl Record for StatefulSetRecord {
    type Object = StatefulSet;

    const KIND: &'static str = "statefulsets";
    const HEADER: &'static str = "Cluster Namespace Name Replicas Selector Age Labels";

    fn from_object(obj: &StatefulSet, ctx: &CtorContext) -> Result<Self, RecordError> {
        let meta = ResourceMeta::from_object_meta(&obj.metadata, ctx)?;
        let status = obj.status.as_ref();
        let current_replicas = status.and_then(|s| s.current_replicas).unwrap_or(0);
        let replicas = status.map(|s| s.replicas).unwrap_or(0);
        let selectors = selector_expressions(
            obj.spec
                .as_ref()
                .and_then(|s| s.selector.match_labels.as_ref()),
        );
        Ok(Self {
            meta,
            current_replicas,
            replicas,
            selectors,
        })
    }

    fn meta(&self) -> &ResourceMeta {
        &self.meta
    }

    fn has_changed(&self, previous: &Self) -> bool {
        self.current_replicas != previous.current_replicas
            || self.replicas != previous.replicas
            || self.selectors != previous.selectors
            || self.meta.labels != previous.meta.labels
    }

    fn to_line(&self) -> String {
        format!(
            "{} {} {} {}/{} {} {} {}",
            self.meta.cluster,
            self.meta.namespace,
            self.meta.name,
            self.current_replicas,
            self.replicas,
            or_none(self.selectors.join(",")),
            self.meta.age(),
            self.meta.label_column(),
        )
    }
}
