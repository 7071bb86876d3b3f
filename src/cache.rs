use std::collections::HashMap;
use std::hash::Hash;
use std::time::{Duration, Instant};

/// Time-boxed memo of `(value, fetched_at)` pairs. The caller supplies
/// `now`, so expiry is checked explicitly on every read.
#[derive(Debug)]
pub struct TtlCache<K, V> {
    ttl: Duration,
    entries: HashMap<K, (V, Instant)>,
}

impl<K, V> TtlCache<K, V>
where
    K: Eq + Hash,
    V: Clone,
{
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: HashMap::new(),
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Returns the cached value if it was fetched less than `ttl` before `now`.
    pub fn get(&self, key: &K, now: Instant) -> Option<V> {
        self.entries.get(key).and_then(|(value, fetched_at)| {
            if now.saturating_duration_since(*fetched_at) < self.ttl {
                Some(value.clone())
            } else {
                None
            }
        })
    }

    pub fn insert(&mut self, key: K, value: V, fetched_at: Instant) {
        self.entries.insert(key, (value, fetched_at));
    }

    pub fn invalidate(&mut self, key: &K) -> bool {
        self.entries.remove(key).is_some()
    }

    /// Drops every entry that has expired at `now`; returns how many.
    pub fn purge_expired(&mut self, now: Instant) -> usize {
        let before = self.entries.len();
        let ttl = self.ttl;
        self.entries
            .retain(|_, (_, fetched_at)| now.saturating_duration_since(*fetched_at) < ttl);
        before - self.entries.len()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
