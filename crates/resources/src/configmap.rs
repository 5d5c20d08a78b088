//! ConfigMap records.

use k8s_openapi::api::core::v1::ConfigMap;

use crate::meta::{CtorContext, RecordError, ResourceMeta};
use crate::record::Record;

/// Summary of a configmap. Only the common metadata is surfaced.
#[derive(Debug, Clone)]
pub struct ConfigMapRecord {
    /// Common metadata.
    pub meta: ResourceMeta,
}

impl Record for ConfigMapRecord {
    type Object = ConfigMap;

    const KIND: &'static str = "configmaps";
    const HEADER: &'static str = "Cluster Namespace Name Age Labels";

    fn from_object(obj: &ConfigMap, ctx: &CtorContext) -> Result<Self, RecordError> {
        let meta = ResourceMeta::from_object_meta(&obj.metadata, ctx)?;
        Ok(Self { meta })
    }

    fn meta(&self) -> &ResourceMeta {
        &self.meta
    }

    fn has_changed(&self, previous: &Self) -> bool {
        self.meta.labels != previous.meta.labels
    }

    fn to_line(&self) -> String {
        format!(
            "{} {} {} {} {}",
            self.meta.cluster,
            self.meta.namespace,
            self.meta.name,
            self.meta.age(),
            self.meta.label_column(),
        )
    }
}
