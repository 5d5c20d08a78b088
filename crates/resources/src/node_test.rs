//! Unit tests for node records.

#[cfg(test)]
mod tests {
    use super::super::*;
    use serde_json::json;
    use std::collections::BTreeSet;

    fn node(ctx: &CtorContext) -> NodeRecord {
        let obj: k8s_openapi::api::core::v1::Node = serde_json::from_value(json!({
            "metadata": {
                "name": "node-1",
                "labels": {
                    "node-role.kubernetes.io/control-plane": "",
                    "node-role.kubernetes.io/etcd": "",
                    "node.kubernetes.io/instance-type": "m5.large"
                }
            }
        }))
        .unwrap_or_else(|e| panic!("valid node: {e}"));
        NodeRecord::from_object(&obj, ctx).unwrap_or_else(|e| panic!("valid record: {e}"))
    }

    #[test]
    fn test_roles_and_instance_type() {
        let ctx = CtorContext {
            cluster: "kind".to_string(),
            ..CtorContext::default()
        };
        let record = node(&ctx);
        assert_eq!(
            record.roles,
            vec!["control-plane".to_string(), "etcd".to_string()]
        );
        assert_eq!(record.instance_type.as_deref(), Some("m5.large"));
        // Cluster-scoped: key has no namespace.
        assert_eq!(record.key(), RecordKey::new("", "node-1"));
    }

    #[test]
    fn test_role_blacklist_hides_roles() {
        let ctx = CtorContext {
            cluster: "kind".to_string(),
            role_blacklist: BTreeSet::from(["etcd".to_string()]),
        };
        let record = node(&ctx);
        assert_eq!(record.roles, vec!["control-plane".to_string()]);
        let line = record.to_line();
        let columns: Vec<&str> = line.split(' ').collect();
        assert_eq!(columns[2], "control-plane");
    }

    #[test]
    fn test_role_change_is_detected() {
        let ctx = CtorContext {
            cluster: "kind".to_string(),
            ..CtorContext::default()
        };
        let before = node(&ctx);
        let mut after = before.clone();
        after.roles = vec!["worker".to_string()];
        assert!(after.has_changed(&before));
        assert!(!before.has_changed(&before));
    }

    #[test]
    fn test_unlabeled_node_renders_placeholders() {
        let obj: k8s_openapi::api::core::v1::Node = serde_json::from_value(json!({
            "metadata": {"name": "node-2"}
        }))
        .unwrap_or_else(|e| panic!("valid node: {e}"));
        let ctx = CtorContext {
            cluster: "kind".to_string(),
            ..CtorContext::default()
        };
        let record =
            NodeRecord::from_object(&obj, &ctx).unwrap_or_else(|e| panic!("valid record: {e}"));
        let line = record.to_line();
        let columns: Vec<&str> = line.split(' ').collect();
        assert_eq!(columns.len(), NodeRecord::HEADER.split(' ').count());
        assert_eq!(columns[2], "None");
        assert_eq!(columns[3], "None");
    }
}
