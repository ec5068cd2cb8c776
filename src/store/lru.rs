// Copyright 2026 loadcache Project Authors
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use std::{hash::Hash, sync::Arc};

use equivalent::Equivalent;
use hashbrown::HashMap;
use serde::{Deserialize, Serialize};

use crate::{
    code::{Key, Value, Weighted},
    event::{Event, EventListener},
    store::{list::ArenaList, Entry, Store},
};

/// Lru store config.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LruConfig {
    /// Capacity in bytes. `0` means unbounded.
    pub capacity: usize,
}

/// An access-ordered bounded store.
///
/// Same contract as [`Fifo`](crate::Fifo) with a different reordering rule:
/// both lookups and insertions refresh an entry's position to youngest, so
/// capacity pressure evicts the least recently used entry.
pub struct Lru<K, V>
where
    K: Key,
    V: Value + Weighted,
{
    index: HashMap<K, usize>,
    queue: ArenaList<Entry<K, V>>,

    weight: usize,
    capacity: usize,

    listener: Option<Arc<dyn EventListener<Key = K, Value = V>>>,
}

impl<K, V> Lru<K, V>
where
    K: Key,
    V: Value + Weighted,
{
    /// Create a [`Lru`] store with the given config.
    pub fn new(config: LruConfig) -> Self {
        Self {
            index: HashMap::new(),
            queue: ArenaList::new(),
            weight: 0,
            capacity: config.capacity,
            listener: None,
        }
    }

    /// Attach an event listener called whenever an entry leaves the store.
    pub fn with_event_listener(
        mut self,
        listener: Arc<dyn EventListener<Key = K, Value = V>>,
    ) -> Self {
        self.listener = Some(listener);
        self
    }

    /// Evict least-recently-used-first until the store fits its capacity.
    ///
    /// A single entry heavier than the capacity is left alone; evicting it
    /// would not make room for anything.
    fn evict(&mut self) {
        while self.capacity > 0 && self.weight > self.capacity && self.queue.len() > 1 {
            if !self.pop_oldest(Event::Evict) {
                break;
            }
        }
    }

    fn pop_oldest(&mut self, reason: Event) -> bool {
        let Some(entry) = self.queue.pop_front() else {
            return false;
        };
        self.index.remove(&entry.key);
        self.weight -= entry.weight;

        tracing::trace!(key = ?entry.key, ?reason, "[lru]: entry leaves the store");
        if let Some(listener) = self.listener.as_ref() {
            listener.on_leave(reason, entry.key, entry.value);
        }
        true
    }
}

impl<K, V> Store<K, V> for Lru<K, V>
where
    K: Key,
    V: Value + Weighted,
{
    fn insert(&mut self, key: K, value: V) {
        let weight = value.weight();

        match self.index.get(&key) {
            Some(&index) => {
                let entry = self.queue.get_mut(index).expect("index out of sync");
                self.weight = self.weight - entry.weight + weight;
                entry.value = value;
                entry.weight = weight;
                self.queue.move_to_back(index);
            }
            None => {
                let index = self.queue.push_back(Entry {
                    key: key.clone(),
                    value,
                    weight,
                });
                self.index.insert(key, index);
                self.weight += weight;
            }
        }

        self.evict();
    }

    fn get<Q>(&mut self, key: &Q) -> Option<&V>
    where
        Q: Hash + Equivalent<K> + ?Sized,
    {
        let index = *self.index.get(key)?;
        // A hit makes the entry the youngest.
        self.queue.move_to_back(index);
        self.queue.get(index).map(|entry| &entry.value)
    }

    fn remove<Q>(&mut self, key: &Q)
    where
        Q: Hash + Equivalent<K> + ?Sized,
    {
        let Some(index) = self.index.remove(key) else {
            return;
        };
        let entry = self.queue.remove(index).expect("index out of sync");
        self.weight -= entry.weight;

        tracing::trace!(key = ?entry.key, "[lru]: entry removed");
        if let Some(listener) = self.listener.as_ref() {
            listener.on_leave(Event::Remove, entry.key, entry.value);
        }
    }

    fn remove_oldest(&mut self) {
        self.pop_oldest(Event::Evict);
    }

    fn len(&self) -> usize {
        self.queue.len()
    }

    fn weight(&self) -> usize {
        self.weight
    }

    fn capacity(&self) -> usize {
        self.capacity
    }
}

#[cfg(test)]
mod tests {
    use itertools::Itertools;
    use parking_lot::Mutex;

    use super::*;

    #[derive(Debug, Default)]
    struct Sink(Mutex<Vec<(Event, String, String)>>);

    impl EventListener for Sink {
        type Key = String;
        type Value = String;

        fn on_leave(&self, reason: Event, key: String, value: String) {
            self.0.lock().push((reason, key, value));
        }
    }

    fn store(capacity: usize) -> (Lru<String, String>, Arc<Sink>) {
        let sink = Arc::new(Sink::default());
        let lru = Lru::new(LruConfig { capacity }).with_event_listener(sink.clone());
        (lru, sink)
    }

    #[test]
    fn test_lookup_refreshes_position() {
        let (mut lru, sink) = store(0);
        lru.insert("k1".to_string(), "a".to_string());
        lru.insert("k2".to_string(), "b".to_string());
        lru.insert("k3".to_string(), "c".to_string());

        assert_eq!(lru.get("k1"), Some(&"a".to_string()));

        // "k2" is now the least recently used.
        lru.remove_oldest();
        lru.remove_oldest();
        lru.remove_oldest();

        let keys = sink.0.lock().iter().map(|(_, k, _)| k.clone()).collect_vec();
        assert_eq!(keys, vec!["k2", "k3", "k1"]);
    }

    #[test]
    fn test_capacity_evicts_least_recently_used() {
        let (mut lru, sink) = store(10);
        lru.insert("k1".to_string(), "aaaa".to_string());
        lru.insert("k2".to_string(), "bbbb".to_string());

        assert_eq!(lru.get("k1"), Some(&"aaaa".to_string()));

        lru.insert("k3".to_string(), "cccc".to_string());
        assert_eq!(lru.len(), 2);
        assert_eq!(lru.get("k2"), None);
        assert_eq!(lru.get("k1"), Some(&"aaaa".to_string()));

        assert_eq!(
            sink.0.lock().as_slice(),
            &[(Event::Evict, "k2".to_string(), "bbbb".to_string())]
        );
    }

    #[test]
    fn test_update_refreshes_recency() {
        let (mut lru, _sink) = store(0);
        lru.insert("k1".to_string(), "a".to_string());
        lru.insert("k2".to_string(), "b".to_string());
        lru.insert("k1".to_string(), "aa".to_string());
        assert_eq!(lru.len(), 2);
        assert_eq!(lru.weight(), 3);

        lru.remove_oldest();
        assert_eq!(lru.get("k2"), None);
        assert_eq!(lru.get("k1"), Some(&"aa".to_string()));
    }

    #[test]
    fn test_miss_does_not_reorder() {
        let (mut lru, sink) = store(0);
        lru.insert("k1".to_string(), "a".to_string());
        lru.insert("k2".to_string(), "b".to_string());

        assert_eq!(lru.get("nope"), None);

        lru.remove_oldest();
        let keys = sink.0.lock().iter().map(|(_, k, _)| k.clone()).collect_vec();
        assert_eq!(keys, vec!["k1"]);
    }
}
