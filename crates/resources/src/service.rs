//! Service records.

use k8s_openapi::api::core::v1::Service;

use crate::meta::{or_none, CtorContext, RecordError, ResourceMeta};
use crate::record::Record;

/// Summary of a service: type, cluster IP and exposed ports.
#[derive(Debug, Clone)]
pub struct ServiceRecord {
    /// Common metadata.
    pub meta: ResourceMeta,
    /// Service type, `ClusterIP` when unset.
    pub service_type: String,
    /// Cluster IP, may be `None` for headless services.
    pub cluster_ip: String,
    /// Exposed ports as `port/protocol`.
    pub ports: Vec<String>,
}

impl Record for ServiceRecord {
    type Object = Service;

    const KIND: &'static str = "services";
    const HEADER: &'static str = "Cluster Namespace Name Type ClusterIp Ports Age Labels";

    fn from_object(obj: &Service, ctx: &CtorContext) -> Result<Self, RecordError> {
        let meta = ResourceMeta::from_object_meta(&obj.metadata, ctx)?;
        let spec = obj.spec.as_ref();
        let service_type = spec
            .and_then(|s| s.type_.clone())
            .unwrap_or_else(|| "ClusterIP".to_string());
        let cluster_ip = spec.and_then(|s| s.cluster_ip.clone()).unwrap_or_default();
        let ports = spec
            .and_then(|s| s.ports.as_ref())
            .map(|ports| {
                ports
                    .iter()
                    .map(|p| {
                        format!("{}/{}", p.port, p.protocol.as_deref().unwrap_or("TCP"))
                    })
                    .collect()
            })
            .unwrap_or_default();
        Ok(Self {
            meta,
            service_type,
            cluster_ip,
            ports,
        })
    }

    fn meta(&self) -> &ResourceMeta {
        &self.meta
    }

    fn has_changed(&self, previous: &Self) -> bool {
        self.service_type != previous.service_type
            || self.cluster_ip != previous.cluster_ip
            || self.ports != previous.ports
            || self.meta.labels != previous.meta.labels
    }

    fn to_line(&self) -> String {
        format!(
            "{} {} {} {} {} {} {} {}",
            self.meta.cluster,
            self.meta.namespace,
            self.meta.name,
            self.service_type,
            or_none(self.cluster_ip.clone()),
            or_none(self.ports.join(",")),
            self.meta.age(),
            self.meta.label_column(),
        )
    }
}
