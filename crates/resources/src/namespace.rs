//! Namespace records.

use k8s_openapi::api::core::v1::Namespace;

use crate::meta::{CtorContext, RecordError, ResourceMeta};
use crate::record::Record;

/// Summary of a namespace. Only the common metadata is surfaced.
#[derive(Debug, Clone)]
pub struct NamespaceRecord {
    /// Common metadata, namespace always empty.
    pub meta: ResourceMeta,
}

impl Record for NamespaceRecord {
    type Object = Namespace;

    const KIND: &'static str = "namespaces";
    const HEADER: &'static str = "Cluster Name Age Labels";

    fn from_object(obj: &Namespace, ctx: &CtorContext) -> Result<Self, RecordError> {
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
            "{} {} {} {}",
            self.meta.cluster,
            self.meta.name,
            self.meta.age(),
            self.meta.label_column(),
        )
    }
}
