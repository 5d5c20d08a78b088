//! Deployment records.

use k8s_openapi::api::apps::v1::Deployment;

use crate::meta::{CtorContext, RecordError, ResourceMeta};
use crate::record::Record;

/// Summary of a deployment: ready versus desired replicas.
#[derive(Debug, Clone)]
pub struct DeploymentRecord {
    /// Common metadata.
    pub meta: ResourceMeta,
    /// Replicas currently ready.
    pub ready_replicas: i32,
    /// Replicas requested by the spec.
    pub desired_replicas: i32,
}

impl Record for DeploymentRecord {
    type Object = Deployment;

    const KIND: &'static str = "deployments";
    const HEADER: &'static str = "Cluster Namespace Name Replicas Age Labels";

    fn from_object(obj: &Deployment, ctx: &CtorContext) -> Result<Self, RecordError> {
        let meta = ResourceMeta::from_object_meta(&obj.metadata, ctx)?;
        let ready_replicas = obj
            .status
            .as_ref()
            .and_then(|s| s.ready_replicas)
            .unwrap_or(0);
        let desired_replicas = obj
            .spec
            .as_ref()
            .and_then(|s| s.replicas)
            .unwrap_or(0);
        Ok(Self {
            meta,
            ready_replicas,
            desired_replicas,
        })
    }

    fn meta(&self) -> &ResourceMeta {
        &self.meta
    }

    fn has_changed(&self, previous: &Self) -> bool {
        self.ready_replicas != previous.ready_replicas
            || self.desired_replicas != previous.desired_replicas
            || self.meta.labels != previous.meta.labels
    }

    fn to_line(&self) -> String {
        format!(
            "{} {} {} {}/{} {} {}",
            self.meta.cluster,
            self.meta.namespace,
            self.meta.name,
            self.ready_replicas,
            self.desired_replicas,
            self.meta.age(),
            self.meta.label_column(),
        )
    }
}
