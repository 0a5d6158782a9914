//! The primary's local log: sequence allocation and durable-before-ack storage.
//!
//! Sequence ids are dense, 1-based, and assigned under a single mutex before
//! any network fan-out begins, so two concurrent appends can never race for
//! the same id and the local copy is always ahead of (or equal to) what any
//! secondary has seen.

use std::sync::Mutex;

pub struct LocalLog {
    inner: Mutex<Inner>,
}

struct Inner {
    messages: Vec<String>,
}

impl LocalLog {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(Inner {
                messages: Vec::new(),
            }),
        }
    }

    /// Assigns the next sequence id to `content`, appends it locally, and
    /// returns the assigned id. Appending is synchronous and infallible;
    /// replication happens afterward, outside this lock.
    pub fn allocate_and_append(&self, content: String) -> u64 {
        let mut inner = self.inner.lock().unwrap();
        inner.messages.push(content);
        inner.messages.len() as u64
    }

    /// A full, in-order snapshot of the log.
    pub fn snapshot(&self) -> Vec<String> {
        self.inner.lock().unwrap().messages.clone()
    }
}

impl Default for LocalLog {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_are_dense_and_one_based() {
        let log = LocalLog::new();
        assert_eq!(log.allocate_and_append("a".to_string()), 1);
        assert_eq!(log.allocate_and_append("b".to_string()), 2);
        assert_eq!(log.snapshot(), vec!["a".to_string(), "b".to_string()]);
    }
}
