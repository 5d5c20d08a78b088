//! Unit tests for watch event application.

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;
    use std::time::Duration;

    use kube_runtime::watcher::Event;

    use crate::store::ResourceStore;
    use crate::test_utils::{ctx, key, record, test_object, TestObject, TestRecord};
    use crate::watcher::{apply_event, InitTracker};

    fn store() -> (tempfile::TempDir, ResourceStore<TestRecord>) {
        let dir = tempfile::tempdir().unwrap_or_else(|e| panic!("tempdir: {e}"));
        let store = ResourceStore::new(&dir.path().join("kind"), Duration::from_secs(60));
        (dir, store)
    }

    fn apply(
        store: &ResourceStore<TestRecord>,
        excluded: &BTreeSet<String>,
        scope: Option<&str>,
        init: &mut InitTracker,
        event: Event<TestObject>,
    ) {
        apply_event(store, &ctx(), excluded, scope, init, event);
    }

    #[test]
    fn test_apply_and_delete() {
        let (_dir, store) = store();
        let excluded = BTreeSet::new();
        let mut init = InitTracker::default();

        apply(&store, &excluded, None, &mut init, Event::Apply(test_object("default", "web-0", 1)));
        assert_eq!(store.keys(), vec![key("default", "web-0")]);

        apply(&store, &excluded, None, &mut init, Event::Delete(test_object("default", "web-0", 1)));
        assert!(store.is_empty());
    }

    #[test]
    fn test_relist_prunes_records_the_list_omits() {
        let (_dir, store) = store();
        let excluded = BTreeSet::new();
        let mut init = InitTracker::default();

        // Baseline from before the stream dropped.
        store.upsert(record("default", "stale", 1));
        store.upsert(record("default", "kept", 1));

        apply(&store, &excluded, None, &mut init, Event::Init);
        apply(&store, &excluded, None, &mut init, Event::InitApply(test_object("default", "kept", 1)));
        apply(&store, &excluded, None, &mut init, Event::InitApply(test_object("default", "fresh", 1)));
        apply(&store, &excluded, None, &mut init, Event::InitDone);

        assert_eq!(store.keys(), vec![key("default", "fresh"), key("default", "kept")]);
    }

    #[test]
    fn test_scoped_relist_leaves_other_namespaces_alone() {
        let (_dir, store) = store();
        let excluded = BTreeSet::new();
        let mut init = InitTracker::default();

        store.upsert(record("a", "gone", 1));
        store.upsert(record("b", "other", 1));

        apply(&store, &excluded, Some("a"), &mut init, Event::Init);
        apply(&store, &excluded, Some("a"), &mut init, Event::InitApply(test_object("a", "new", 1)));
        apply(&store, &excluded, Some("a"), &mut init, Event::InitDone);

        // "gone" vanished from namespace a; namespace b is another stream's
        // scope and must not be swept.
        assert_eq!(store.keys(), vec![key("a", "new"), key("b", "other")]);
    }

    #[test]
    fn test_excluded_namespace_never_enters_the_store() {
        let (_dir, store) = store();
        let excluded = BTreeSet::from(["kube-system".to_string()]);
        let mut init = InitTracker::default();

        apply(&store, &excluded, None, &mut init, Event::Apply(test_object("kube-system", "dns", 1)));
        assert!(store.is_empty());
    }

    #[test]
    fn test_malformed_object_is_skipped_not_fatal() {
        let (_dir, store) = store();
        let excluded = BTreeSet::new();
        let mut init = InitTracker::default();

        // Empty name fails record construction; the loop must carry on.
        apply(&store, &excluded, None, &mut init, Event::Apply(test_object("default", "", 1)));
        apply(&store, &excluded, None, &mut init, Event::Apply(test_object("default", "ok", 1)));
        assert_eq!(store.keys(), vec![key("default", "ok")]);
    }

    #[test]
    fn test_duplicate_apply_dirty_marks_once() {
        let (_dir, store) = store();
        let excluded = BTreeSet::new();
        let mut init = InitTracker::default();

        apply(&store, &excluded, None, &mut init, Event::Apply(test_object("default", "web", 3)));
        apply(&store, &excluded, None, &mut init, Event::Apply(test_object("default", "web", 3)));
        assert_eq!(store.dirty_len(), 1);

        // An actual change is picked up in arrival order.
        apply(&store, &excluded, None, &mut init, Event::Apply(test_object("default", "web", 2)));
        assert_eq!(store.len(), 1);
    }
}
