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

/// Fifo store config.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FifoConfig {
    /// Capacity in bytes. `0` means unbounded.
    pub capacity: usize,
}

/// An insertion-ordered bounded store.
///
/// Entries are appended at the tail and evicted from the head, strictly in
/// insertion order. A lookup does not refresh an entry's position; only
/// re-inserting a key does.
pub struct Fifo<K, V>
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

impl<K, V> Fifo<K, V>
where
    K: Key,
    V: Value + Weighted,
{
    /// Create a [`Fifo`] store with the given config.
    pub fn new(config: FifoConfig) -> Self {
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

    /// Evict oldest-first until the store fits its capacity.
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

        tracing::trace!(key = ?entry.key, ?reason, "[fifo]: entry leaves the store");
        if let Some(listener) = self.listener.as_ref() {
            listener.on_leave(reason, entry.key, entry.value);
        }
        true
    }
}

impl<K, V> Store<K, V> for Fifo<K, V>
where
    K: Key,
    V: Value + Weighted,
{
    fn insert(&mut self, key: K, value: V) {
        let weight = value.weight();

        match self.index.get(&key) {
            Some(&index) => {
                // Update in place and refresh the insertion position.
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

        tracing::trace!(key = ?entry.key, "[fifo]: entry removed");
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
