//! Open-event table shared by all correlators.
//!
//! A table maps a correlation key to the begin events still waiting for
//! their end event. What happens when a second begin arrives for a key
//! that is already open depends on the table's [`CollisionPolicy`].

use std::collections::{HashMap, VecDeque};
use std::hash::Hash;

/// How a begin event for an already-open key is handled
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CollisionPolicy {
    /// Keep only the newest open event; the older one is handed back
    ReplaceOlder,
    /// Keep every open event; ends close them oldest first
    Queue,
}

/// Pending begin events keyed by correlation key
#[derive(Debug)]
pub struct OpenTable<K, V> {
    policy: CollisionPolicy,
    entries: HashMap<K, VecDeque<V>>,
}

impl<K: Eq + Hash, V> OpenTable<K, V> {
    pub fn new(policy: CollisionPolicy) -> Self {
        Self {
            policy,
            entries: HashMap::new(),
        }
    }

    /// Record a begin event
    ///
    /// Returns the displaced older event under `ReplaceOlder`, never under `Queue`.
    pub fn open(&mut self, key: K, value: V) -> Option<V> {
        let queue = self.entries.entry(key).or_default();
        let displaced = match self.policy {
            CollisionPolicy::ReplaceOlder => queue.pop_front(),
            CollisionPolicy::Queue => None,
        };
        queue.push_back(value);
        displaced
    }

    /// Take the oldest open event for `key`, if any
    pub fn close(&mut self, key: &K) -> Option<V> {
        let queue = self.entries.get_mut(key)?;
        let value = queue.pop_front();
        if queue.is_empty() {
            self.entries.remove(key);
        }
        value
    }

    /// Number of open events across all keys
    pub fn len(&self) -> usize {
        self.entries.values().map(VecDeque::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
