//! Ordered, idempotent message storage for the secondary role.
//!
//! Stores replicated messages in a sparse `id -> content` map plus a sorted
//! list of known ids, so lookups of the contiguous prefix don't require
//! scanning the whole map on every read.

use std::collections::HashMap;
use std::sync::Mutex;

/// Idempotent, ordered storage for a secondary's replica of the log.
pub struct OrderedStorage {
    inner: Mutex<Inner>,
}

struct Inner {
    messages: HashMap<u64, String>,
    sorted_ids: Vec<u64>,
}

impl OrderedStorage {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(Inner {
                messages: HashMap::new(),
                sorted_ids: Vec::new(),
            }),
        }
    }

    /// Records `content` at `id`. Returns `true` if `id` was not already
    /// present, `false` if this was a duplicate delivery. Callers should
    /// treat both outcomes as success: the unbounded sender retries until
    /// it sees `Ack { success: true }`, and a duplicate is no less durable
    /// than a first arrival.
    pub fn add(&self, id: u64, content: String) -> bool {
        let mut inner = self.inner.lock().unwrap();
        if inner.messages.contains_key(&id) {
            return false;
        }
        inner.messages.insert(id, content);
        let pos = inner.sorted_ids.partition_point(|&existing| existing < id);
        inner.sorted_ids.insert(pos, id);
        true
    }

    /// Returns messages in id order, starting at 1, stopping at the first
    /// gap. A secondary that is still catching up on id 5 must not expose
    /// ids 6 and 7 just because they arrived first over an unordered
    /// transport.
    pub fn get_all(&self) -> Vec<String> {
        let inner = self.inner.lock().unwrap();
        let mut result = Vec::new();
        let mut expected = 1u64;
        for &id in &inner.sorted_ids {
            if id != expected {
                break;
            }
            if let Some(content) = inner.messages.get(&id) {
                result.push(content.clone());
            }
            expected += 1;
        }
        result
    }
}

impl Default for OrderedStorage {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn contiguous_prefix_only() {
        let storage = OrderedStorage::new();
        storage.add(1, "a".to_string());
        storage.add(3, "c".to_string());
        assert_eq!(storage.get_all(), vec!["a".to_string()]);

        storage.add(2, "b".to_string());
        assert_eq!(
            storage.get_all(),
            vec!["a".to_string(), "b".to_string(), "c".to_string()]
        );
    }

    #[test]
    fn duplicate_add_reports_false_and_does_not_overwrite() {
        let storage = OrderedStorage::new();
        assert!(storage.add(1, "first".to_string()));
        assert!(!storage.add(1, "second".to_string()));
        assert_eq!(storage.get_all(), vec!["first".to_string()]);
    }

    #[test]
    fn out_of_order_arrival_is_sorted() {
        let storage = OrderedStorage::new();
        for id in [5, 3, 1, 4, 2] {
            storage.add(id, format!("m{id}"));
        }
        assert_eq!(
            storage.get_all(),
            vec![
                "m1".to_string(),
                "m2".to_string(),
                "m3".to_string(),
                "m4".to_string(),
                "m5".to_string()
            ]
        );
    }

    #[test]
    fn empty_storage_yields_empty_prefix() {
        let storage = OrderedStorage::new();
        assert!(storage.get_all().is_empty());
    }
}
