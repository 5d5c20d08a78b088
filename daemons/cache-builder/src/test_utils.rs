//! Shared fixtures for cache-builder unit tests.

use std::collections::BTreeMap;

use resources::{CtorContext, Record, RecordError, RecordKey, ResourceMeta};

/// Minimal raw object standing in for a control-plane object.
#[derive(Debug, Clone)]
pub(crate) struct TestObject {
    pub namespace: String,
    pub name: String,
    pub value: i32,
}

pub(crate) fn test_object(namespace: &str, name: &str, value: i32) -> TestObject {
    TestObject {
        namespace: namespace.to_string(),
        name: name.to_string(),
        value,
    }
}

/// Minimal record with one displayed field.
#[derive(Debug, Clone)]
pub(crate) struct TestRecord {
    pub meta: ResourceMeta,
    pub value: i32,
}

impl Record for TestRecord {
    type Object = TestObject;

    const KIND: &'static str = "tests";
    const HEADER: &'static str = "Cluster Namespace Name Value";

    fn from_object(obj: &TestObject, ctx: &CtorContext) -> Result<Self, RecordError> {
        if obj.name.is_empty() {
            return Err(RecordError::MissingName);
        }
        Ok(Self {
            meta: ResourceMeta {
                cluster: ctx.cluster.clone(),
                namespace: obj.namespace.clone(),
                name: obj.name.clone(),
                labels: BTreeMap::new(),
                created: None,
            },
            value: obj.value,
        })
    }

    fn meta(&self) -> &ResourceMeta {
        &self.meta
    }

    fn has_changed(&self, previous: &Self) -> bool {
        self.value != previous.value || self.meta.labels != previous.meta.labels
    }

    fn to_line(&self) -> String {
        format!(
            "{} {} {} {}",
            self.meta.cluster, self.meta.namespace, self.meta.name, self.value
        )
    }
}

pub(crate) fn ctx() -> CtorContext {
    CtorContext {
        cluster: "kind".to_string(),
        ..CtorContext::default()
    }
}

pub(crate) fn record(namespace: &str, name: &str, value: i32) -> TestRecord {
    TestRecord::from_object(&test_object(namespace, name, value), &ctx())
        .unwrap_or_else(|e| panic!("valid test object: {e}"))
}

pub(crate) fn key(namespace: &str, name: &str) -> RecordKey {
    RecordKey::new(namespace, name)
}
