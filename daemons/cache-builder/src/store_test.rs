//! Unit tests for the per-kind record store.

#[cfg(test)]
mod tests {
    use std::collections::{BTreeMap, BTreeSet};
    use std::fs;
    use std::time::Duration;

    use crate::store::ResourceStore;
    use crate::test_utils::{key, record, TestRecord};
    use resources::{Record, RecordKey};

    fn store(debounce: Duration) -> (tempfile::TempDir, ResourceStore<TestRecord>) {
        let dir = tempfile::tempdir().unwrap_or_else(|e| panic!("tempdir: {e}"));
        let store = ResourceStore::new(&dir.path().join("kind"), debounce);
        (dir, store)
    }

    #[test]
    fn test_upsert_marks_dirty_once_for_unchanged_records() {
        let (_dir, store) = store(Duration::from_secs(60));
        assert!(store.upsert(record("default", "web", 1)));
        assert_eq!(store.dirty_len(), 1);
        // Re-observing the same state is a no-op, not a second dirty mark.
        assert!(!store.upsert(record("default", "web", 1)));
        assert_eq!(store.dirty_len(), 1);
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_upsert_replaces_on_change() {
        let (_dir, store) = store(Duration::from_secs(60));
        store.upsert(record("default", "web", 1));
        assert!(store.upsert(record("default", "web", 2)));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_remove_marks_dirty_only_when_present() {
        let (_dir, store) = store(Duration::from_secs(60));
        store.upsert(record("default", "web", 1));
        assert!(store.remove(&key("default", "web")));
        assert!(!store.remove(&key("default", "web")));
        assert!(store.is_empty());
    }

    #[test]
    fn test_sweep_respects_namespace_scope() {
        let (_dir, store) = store(Duration::from_secs(60));
        store.upsert(record("a", "one", 1));
        store.upsert(record("a", "two", 1));
        store.upsert(record("b", "three", 1));
        let seen = BTreeSet::from([key("a", "one")]);
        assert_eq!(store.sweep(Some("a"), &seen), 1);
        assert_eq!(store.keys(), vec![key("a", "one"), key("b", "three")]);
        // Unscoped sweep covers everything.
        assert_eq!(store.sweep(None, &BTreeSet::new()), 2);
        assert!(store.is_empty());
    }

    #[test]
    fn test_dump_has_header_and_sorted_records() {
        let (_dir, store) = store(Duration::from_secs(60));
        store.upsert(record("b", "zeta", 2));
        store.upsert(record("a", "alpha", 1));
        store.upsert(record("a", "omega", 3));
        store.remove(&key("a", "omega"));
        store.flush_now().unwrap_or_else(|e| panic!("flush: {e}"));

        let content =
            fs::read_to_string(store.dest()).unwrap_or_else(|e| panic!("read dump: {e}"));
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(
            lines,
            vec![
                TestRecord::HEADER,
                "kind a alpha 1",
                "kind b zeta 2",
            ]
        );
    }

    #[test]
    fn test_flush_if_due_honors_debounce_window() {
        let (_dir, store) = store(Duration::from_secs(3600));
        // Nothing dirty, nothing to do.
        assert!(!store.flush_if_due().unwrap_or_else(|e| panic!("flush: {e}")));

        store.upsert(record("default", "web", 1));
        // First dump is always due.
        assert!(store.flush_if_due().unwrap_or_else(|e| panic!("flush: {e}")));
        assert_eq!(store.dirty_len(), 0);

        // New change inside the window stays buffered.
        store.upsert(record("default", "web", 2));
        assert!(!store.flush_if_due().unwrap_or_else(|e| panic!("flush: {e}")));
        assert_eq!(store.dirty_len(), 1);
    }

    #[test]
    fn test_flush_if_due_with_zero_window_writes_every_change() {
        let (_dir, store) = store(Duration::ZERO);
        store.upsert(record("default", "web", 1));
        assert!(store.flush_if_due().unwrap_or_else(|e| panic!("flush: {e}")));
        store.upsert(record("default", "web", 2));
        assert!(store.flush_if_due().unwrap_or_else(|e| panic!("flush: {e}")));

        let content =
            fs::read_to_string(store.dest()).unwrap_or_else(|e| panic!("read dump: {e}"));
        assert!(content.contains("kind default web 2"));
    }

    #[test]
    fn test_store_matches_reference_map_for_event_sequence() {
        let (_dir, store) = store(Duration::from_secs(60));
        let mut reference: BTreeMap<RecordKey, i32> = BTreeMap::new();

        let ops: &[(&str, &str, &str, i32)] = &[
            ("upsert", "default", "web-0", 1),
            ("upsert", "default", "web-1", 1),
            ("upsert", "default", "web-0", 2),
            ("remove", "default", "web-1", 0),
            ("upsert", "kube", "dns", 1),
            ("remove", "default", "missing", 0),
        ];
        for (op, namespace, name, value) in ops {
            match *op {
                "upsert" => {
                    store.upsert(record(namespace, name, *value));
                    reference.insert(key(namespace, name), *value);
                }
                _ => {
                    store.remove(&key(namespace, name));
                    reference.remove(&key(namespace, name));
                }
            }
        }
        let expected: Vec<RecordKey> = reference.keys().cloned().collect();
        assert_eq!(store.keys(), expected);
    }
}
