//! DaemonSet records.

use k8s_openapi::api::apps::v1::DaemonSet;

use crate::meta::{CtorContext, RecordError, ResourceMeta};
use crate::record::Record;

/// Summary of a daemonset: ready versus desired scheduled pods.
#[derive(Debug, Clone)]
pub struct DaemonSetRecord {
    /// Common metadata.
    pub meta: ResourceMeta,
    /// Pods ready on their nodes.
    pub ready: i32,
    /// Nodes that should run the daemon pod.
    pub desired: i32,
}

impl Record for DaemonSetRecord {
    type Object = DaemonSet;

    const KIND: &'static str = "daemonsets";
    const HEADER: &'static str = "Cluster Namespace Name Replicas Age Labels";

    fn from_object(obj: &DaemonSet, ctx: &CtorContext) -> Result<Self, RecordError> {
        let meta = ResourceMeta::from_object_meta(&obj.metadata, ctx)?;
        let status = obj.status.as_ref();
        let ready = status.map(|s| s.number_ready).unwrap_or(0);
        let desired = status.map(|s| s.desired_number_scheduled).unwrap_or(0);
        Ok(Self { meta, ready, desired })
    }

    fn meta(&self) -> &ResourceMeta {
        &self.meta
    }

    fn has_changed(&self, previous: &Self) -> bool {
        self.ready != previous.ready
            || self.desired != previous.desired
            || self.meta.labels != previous.meta.labels
    }

    fn to_line(&self) -> String {
        format!(
            "{} {} {} {}/{} {} {}",
            self.meta.cluster,
            self.meta.namespace,
            self.meta.name,
            self.ready,
            self.desired,
            self.meta.age(),
            self.meta.label_column(),
        )
    }
}
