//! Fixed-capacity ring buffer shared by the alert and message logs

use serde::{Serialize, Serializer};
use std::collections::VecDeque;

/// Append-only log that evicts its oldest entry once `capacity` is reached
#[derive(Debug, Clone)]
pub struct BoundedLog<T> {
    entries: VecDeque<T>,
    capacity: usize,
}

impl<T> BoundedLog<T> {
    /// Create an empty log holding at most `capacity` entries
    pub fn with_capacity(capacity: usize) -> Self {
        Self { entries: VecDeque::with_capacity(capacity), capacity: capacity.max(1) }
    }

    /// Append an entry, returning the evicted oldest entry if the log was full
    pub fn push(&mut self, entry: T) -> Option<T> {
        let evicted =
            if self.entries.len() >= self.capacity { self.entries.pop_front() } else { None };
        self.entries.push_back(entry);
        evicted
    }

    /// Entries from oldest to newest
    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.entries.iter()
    }

    /// Number of stored entries
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if the log is empty
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Maximum number of entries kept
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Drop every entry
    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

impl<T: Clone> BoundedLog<T> {
    /// Copy of all entries from oldest to newest
    pub fn to_vec(&self) -> Vec<T> {
        self.entries.iter().cloned().collect()
    }
}

impl<T: Serialize> Serialize for BoundedLog<T> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_seq(self.entries.iter())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_evicts_oldest_first() {
        let mut log = BoundedLog::with_capacity(3);
        for i in 0..3 {
            assert_eq!(log.push(i), None);
        }
        assert_eq!(log.push(3), Some(0));
        assert_eq!(log.push(4), Some(1));
        assert_eq!(log.to_vec(), vec![2, 3, 4]);
        assert_eq!(log.len(), 3);
    }

    #[test]
    fn test_never_exceeds_capacity() {
        let mut log = BoundedLog::with_capacity(100);
        for i in 0..1_000 {
            log.push(i);
            assert!(log.len() <= log.capacity());
        }
        assert_eq!(log.iter().next(), Some(&900));
    }

    #[test]
    fn test_clear_and_serialize() {
        let mut log = BoundedLog::with_capacity(2);
        log.push("a");
        log.push("b");
        assert_eq!(serde_json::to_string(&log).unwrap(), r#"["a","b"]"#);
        log.clear();
        assert!(log.is_empty());
    }

    #[test]
    fn test_zero_capacity_keeps_one_entry() {
        let mut log = BoundedLog::with_capacity(0);
        log.push(1);
        log.push(2);
        assert_eq!(log.to_vec(), vec![2]);
    }
}
