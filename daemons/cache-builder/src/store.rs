//! Per-kind record store and dump files.
//!
//! A [`ResourceStore`] owns the authoritative in-process view of one kind's
//! cache: the current records keyed by (namespace, name), the set of keys
//! dirtied since the last dump, and the last dump time. Each kind has its
//! own store and mutex, so kinds never contend with each other, and each
//! dump file has exactly one writer.
//!
//! Dumps are full-file rewrites through a temp file and an atomic rename:
//! the completion frontend always reads one consistent, complete file per
//! kind, never a partial write.

use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

use resources::{Record, RecordKey};
use tempfile::NamedTempFile;
use tracing::trace;

/// Mutable store state, guarded by the store mutex.
#[derive(Debug)]
struct StoreState<R> {
    records: BTreeMap<RecordKey, R>,
    dirty: BTreeSet<RecordKey>,
    last_dump: Option<Instant>,
}

/// In-process cache of one kind's records and its on-disk dump file.
#[derive(Debug)]
pub struct ResourceStore<R: Record> {
    dest: PathBuf,
    time_between_full_dump: Duration,
    state: Mutex<StoreState<R>>,
}

impl<R: Record> ResourceStore<R> {
    /// Creates an empty store dumping to `<cluster_dir>/<kind>`.
    pub fn new(cluster_dir: &Path, time_between_full_dump: Duration) -> Self {
        Self {
            dest: cluster_dir.join(R::KIND),
            time_between_full_dump,
            state: Mutex::new(StoreState {
                records: BTreeMap::new(),
                dirty: BTreeSet::new(),
                last_dump: None,
            }),
        }
    }

    /// Inserts or replaces a record. Dirty-marks only when the record is new
    /// or `has_changed` reports a difference in displayed fields; unchanged
    /// replacements are no-ops. Returns whether the store was dirtied.
    pub fn upsert(&self, record: R) -> bool {
        let key = record.key();
        let mut state = self.lock();
        match state.records.get(&key) {
            Some(existing) if !record.has_changed(existing) => false,
            _ => {
                state.records.insert(key.clone(), record);
                state.dirty.insert(key);
                true
            }
        }
    }

    /// Removes a record by key, dirty-marking if it was present.
    pub fn remove(&self, key: &RecordKey) -> bool {
        let mut state = self.lock();
        if state.records.remove(key).is_some() {
            state.dirty.insert(key.clone());
            true
        } else {
            false
        }
    }

    /// Removes every record inside `scope` (a namespace, or everything when
    /// `None`) whose key a relist did not report. Returns the removal count.
    pub fn sweep(&self, scope: Option<&str>, seen: &BTreeSet<RecordKey>) -> usize {
        let mut state = self.lock();
        let stale: Vec<RecordKey> = state
            .records
            .keys()
            .filter(|key| scope.is_none_or(|ns| key.namespace == ns))
            .filter(|key| !seen.contains(*key))
            .cloned()
            .collect();
        for key in &stale {
            state.records.remove(key);
            state.dirty.insert(key.clone());
        }
        stale.len()
    }

    /// Writes a full dump if anything is dirty and the debounce window has
    /// elapsed since the last dump. Returns whether a dump was written.
    /// On write failure the dirty set and timestamp are left untouched so
    /// the next tick retries.
    pub fn flush_if_due(&self) -> io::Result<bool> {
        let mut state = self.lock();
        if state.dirty.is_empty() {
            return Ok(false);
        }
        if let Some(last) = state.last_dump {
            if last.elapsed() < self.time_between_full_dump {
                return Ok(false);
            }
        }
        self.dump(&mut state)?;
        Ok(true)
    }

    /// Writes a full dump unconditionally (session start).
    pub fn flush_now(&self) -> io::Result<()> {
        let mut state = self.lock();
        self.dump(&mut state)
    }

    /// Dump file path for this kind.
    pub fn dest(&self) -> &Path {
        &self.dest
    }

    /// Number of live records.
    pub fn len(&self) -> usize {
        self.lock().records.len()
    }

    /// Whether the store holds no records.
    pub fn is_empty(&self) -> bool {
        self.lock().records.is_empty()
    }

    #[cfg(test)]
    pub(crate) fn keys(&self) -> Vec<RecordKey> {
        self.lock().records.keys().cloned().collect()
    }

    #[cfg(test)]
    pub(crate) fn dirty_len(&self) -> usize {
        self.lock().dirty.len()
    }

    /// Writes header plus all records, sorted by key, then atomically
    /// replaces the dump file. Clears dirtiness only on success.
    fn dump(&self, state: &mut StoreState<R>) -> io::Result<()> {
        let parent = self.dest.parent().unwrap_or_else(|| Path::new("."));
        fs::create_dir_all(parent)?;
        let mut tmp = NamedTempFile::new_in(parent)?;
        writeln!(tmp, "{}", R::HEADER)?;
        for record in state.records.values() {
            writeln!(tmp, "{}", record.to_line())?;
        }
        tmp.persist(&self.dest).map_err(|e| e.error)?;
        state.dirty.clear();
        state.last_dump = Some(Instant::now());
        trace!(
            "Wrote full dump of {} {} records to {:?}",
            state.records.len(),
            R::KIND,
            self.dest
        );
        Ok(())
    }

    fn lock(&self) -> MutexGuard<'_, StoreState<R>> {
        // A panicked loop must not wedge the whole kind.
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
