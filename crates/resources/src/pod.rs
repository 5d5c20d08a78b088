//! Pod records.

use k8s_openapi::api::core::v1::Pod;

use crate::meta::{or_none, CtorContext, RecordError, ResourceMeta};
use crate::record::Record;

/// Summary of a pod: scheduling target, phase and container names.
#[derive(Debug, Clone)]
pub struct PodRecord {
    /// Common metadata.
    pub meta: ResourceMeta,
    /// Node the pod is scheduled on, empty while pending.
    pub node_name: String,
    /// Lifecycle phase reported by the kubelet.
    pub phase: String,
    /// Container names, in spec order.
    pub containers: Vec<String>,
}

impl Record for PodRecord {
    type Object = Pod;

    const KIND: &'static str = "pods";
    const HEADER: &'static str = "Cluster Namespace Name NodeName Phase Containers Age Labels";

    fn from_object(obj: &Pod, ctx: &CtorContext) -> Result<Self, RecordError> {
        let meta = ResourceMeta::from_object_meta(&obj.metadata, ctx)?;
        let node_name = obj
            .spec
            .as_ref()
            .and_then(|s| s.node_name.clone())
            .unwrap_or_default();
        let phase = obj
            .status
            .as_ref()
            .and_then(|s| s.phase.clone())
            .unwrap_or_else(|| "Unknown".to_string());
        let containers = obj
            .spec
            .as_ref()
            .map(|s| s.containers.iter().map(|c| c.name.clone()).collect())
            .unwrap_or_default();
        Ok(Self {
            meta,
            node_name,
            phase,
            containers,
        })
    }

    fn meta(&self) -> &ResourceMeta {
        &self.meta
    }

    fn has_changed(&self, previous: &Self) -> bool {
        self.node_name != previous.node_name
            || self.phase != previous.phase
            || self.containers != previous.containers
            || self.meta.labels != previous.meta.labels
    }

    fn to_line(&self) -> String {
        format!(
            "{} {} {} {} {} {} {} {}",
            self.meta.cluster,
            self.meta.namespace,
            self.meta.name,
            or_none(self.node_name.clone()),
            self.phase,
            or_none(self.containers.join(",")),
            self.meta.age(),
            self.meta.label_column(),
        )
    }
}
