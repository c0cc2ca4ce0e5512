//! Bounded in-memory event history
//!
//! Records are kept oldest first. Eviction removes the oldest record that is not a
//! running timed span, so the store can temporarily hold more than its capacity while
//! spans are in flight.

use std::collections::VecDeque;

use crate::level::Level;
use crate::record::{EventRecord, RecordId};

/// Insertion-ordered store of retained events
#[derive(Debug, Default)]
pub struct HistoryStore {
    records: VecDeque<EventRecord>,
    /// Last id handed out; ids start at 1 and only grow
    last_id: u64,
}

impl HistoryStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Push a record as the newest entry and return its id
    pub fn append(&mut self, mut record: EventRecord) -> RecordId {
        self.last_id += 1;
        let id = RecordId(self.last_id);
        record.id = id;
        self.records.push_back(record);
        id
    }

    fn position(&self, id: RecordId) -> Option<usize> {
        // Ids are assigned in insertion order, so the deque stays sorted by id
        self.records.binary_search_by_key(&id, |r| r.id).ok()
    }

    /// Look up a record by id
    pub fn get(&self, id: RecordId) -> Option<&EventRecord> {
        self.position(id).map(|i| &self.records[i])
    }

    /// Look up a record by id for mutation
    pub fn get_mut(&mut self, id: RecordId) -> Option<&mut EventRecord> {
        let index = self.position(id)?;
        self.records.get_mut(index)
    }

    /// Remove a record by id
    pub fn remove(&mut self, id: RecordId) -> Option<EventRecord> {
        let index = self.position(id)?;
        self.records.remove(index)
    }

    /// Drop the oldest removable records until at most `capacity` remain
    ///
    /// Returns the number of records removed.
    pub fn evict_excess(&mut self, capacity: usize) -> usize {
        let mut removed = 0;
        while self.records.len() > capacity {
            match self.records.iter().position(|r| !r.is_running()) {
                Some(index) => {
                    self.records.remove(index);
                    removed += 1;
                }
                None => break,
            }
        }
        removed
    }

    /// Snapshot of every record at or above `min_level`, oldest first
    pub fn query_from(&self, min_level: Level) -> Vec<EventRecord> {
        self.records
            .iter()
            .filter(|r| r.level >= min_level)
            .cloned()
            .collect()
    }

    /// Number of retained records
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Check if the store is empty
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Number of timed spans still running
    pub fn running_count(&self) -> usize {
        self.records.iter().filter(|r| r.is_running()).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Local;

    fn normal(level: Level, text: &str) -> EventRecord {
        EventRecord::new(level, text, Local::now())
    }

    fn texts(records: &[EventRecord]) -> Vec<String> {
        records.iter().map(|r| r.text.clone()).collect()
    }

    #[test]
    fn test_append_and_get() {
        let mut store = HistoryStore::new();
        let a = store.append(normal(Level::Info, "a"));
        let b = store.append(normal(Level::Info, "b"));

        assert!(a < b);
        assert_eq!(store.get(a).unwrap().text, "a");
        assert_eq!(store.get(b).unwrap().id, b);
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn test_evict_oldest_first() {
        let mut store = HistoryStore::new();
        for text in ["a", "b", "c", "d"] {
            store.append(normal(Level::Info, text));
        }

        assert_eq!(store.evict_excess(2), 2);
        assert_eq!(texts(&store.query_from(Level::Trace)), ["c", "d"]);
    }

    #[test]
    fn test_evict_skips_running_records() {
        let mut store = HistoryStore::new();
        let running = store.append(EventRecord::timed(Level::Info, Local::now()));
        store.append(normal(Level::Info, "a"));
        store.append(normal(Level::Info, "b"));

        store.evict_excess(1);

        assert_eq!(store.len(), 1);
        assert!(store.get(running).is_some());
    }

    #[test]
    fn test_evict_stops_when_only_running_left() {
        let mut store = HistoryStore::new();
        store.append(EventRecord::timed(Level::Info, Local::now()));
        store.append(EventRecord::timed(Level::Debug, Local::now()));

        assert_eq!(store.evict_excess(0), 0);
        assert_eq!(store.len(), 2);
        assert_eq!(store.running_count(), 2);
    }

    #[test]
    fn test_removed_id_is_gone() {
        let mut store = HistoryStore::new();
        let a = store.append(normal(Level::Info, "a"));
        let b = store.append(normal(Level::Info, "b"));

        assert_eq!(store.remove(a).unwrap().text, "a");
        assert!(store.get(a).is_none());
        assert_eq!(store.get(b).unwrap().text, "b");
    }

    #[test]
    fn test_query_from_filters_and_copies() {
        let mut store = HistoryStore::new();
        store.append(normal(Level::Debug, "debug"));
        let warn = store.append(normal(Level::Warn, "warn"));
        store.append(normal(Level::Error, "error"));

        let snapshot = store.query_from(Level::Warn);
        store.get_mut(warn).unwrap().text.push_str(" changed");

        assert_eq!(texts(&snapshot), ["warn", "error"]);
    }
}
