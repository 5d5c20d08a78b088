//! Node records.

use k8s_openapi::api::core::v1::Node;

use crate::meta::{or_none, CtorContext, RecordError, ResourceMeta};
use crate::record::Record;

/// Node role labels carry the role as the key suffix.
const ROLE_LABEL_PREFIX: &str = "node-role.kubernetes.io/";

/// Instance type labels, newest first.
const INSTANCE_TYPE_LABELS: &[&str] = &[
    "node.kubernetes.io/instance-type",
    "beta.kubernetes.io/instance-type",
];

/// Summary of a node: roles (minus the blacklist) and instance type.
#[derive(Debug, Clone)]
pub struct NodeRecord {
    /// Common metadata, namespace always empty.
    pub meta: ResourceMeta,
    /// Node roles, sorted, with blacklisted roles removed.
    pub roles: Vec<String>,
    /// Cloud instance type, when labeled.
    pub instance_type: Option<String>,
}

impl Record for NodeRecord {
    type Object = Node;

    const KIND: &'static str = "nodes";
    const HEADER: &'static str = "Cluster Name Roles InstanceType Age Labels";

    fn from_object(obj: &Node, ctx: &CtorContext) -> Result<Self, RecordError> {
        let meta = ResourceMeta::from_object_meta(&obj.metadata, ctx)?;
        let roles = meta
            .labels
            .keys()
            .filter_map(|k| k.strip_prefix(ROLE_LABEL_PREFIX))
            .filter(|role| !role.is_empty() && !ctx.role_blacklist.contains(*role))
            .map(str::to_string)
            .collect();
        let instance_type = INSTANCE_TYPE_LABELS
            .iter()
            .find_map(|label| meta.labels.get(*label).cloned());
        Ok(Self {
            meta,
            roles,
            instance_type,
        })
    }

    fn meta(&self) -> &ResourceMeta {
        &self.meta
    }

    fn has_changed(&self, previous: &Self) -> bool {
        self.roles != previous.roles
            || self.instance_type != previous.instance_type
            || self.meta.labels != previous.meta.labels
    }

    fn to_line(&self) -> String {
        format!(
            "{} {} {} {} {} {}",
            self.meta.cluster,
            self.meta.name,
            or_none(self.roles.join(",")),
            self.instance_type.as_deref().unwrap_or("None"),
            self.meta.age(),
            self.meta.label_column(),
        )
    }
}
