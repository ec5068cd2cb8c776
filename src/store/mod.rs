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

use std::hash::Hash;

use equivalent::Equivalent;

use crate::code::{Key, Value, Weighted};

mod list;

pub mod fifo;
pub mod lru;

/// A capacity-bounded key/value store with a defined eviction order.
///
/// Implementations keep an ordered sequence of entries next to a key index;
/// the policy decides how the order reacts to insertions and lookups. The
/// byte weight of the live values (keys excluded) never exceeds the capacity
/// after [`Store::insert`] returns, unless a single entry alone is heavier
/// than the capacity.
///
/// A store is not concurrency-safe. All access must be serialized by the
/// caller; [`LoadCache`](crate::LoadCache) is the usual serialization
/// boundary.
pub trait Store<K, V>: Send + 'static
where
    K: Key,
    V: Value + Weighted,
{
    /// Insert `value` under `key`.
    ///
    /// An existing entry is updated in place, its byte accounting adjusted by
    /// the weight delta, and its position refreshed to youngest. Afterwards
    /// entries are evicted oldest-first until the store fits its capacity
    /// again; a single entry heavier than the capacity is admitted and stays
    /// alone.
    fn insert(&mut self, key: K, value: V);

    /// Look up the value stored under `key`.
    ///
    /// Whether a lookup refreshes the entry's position is up to the policy.
    fn get<Q>(&mut self, key: &Q) -> Option<&V>
    where
        Q: Hash + Equivalent<K> + ?Sized;

    /// Remove the entry stored under `key`, if any.
    fn remove<Q>(&mut self, key: &Q)
    where
        Q: Hash + Equivalent<K> + ?Sized;

    /// Remove the oldest entry, if any.
    fn remove_oldest(&mut self);

    /// Returns the count of live entries.
    fn len(&self) -> usize;

    /// Returns `true` if the store holds no entry.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns the byte weight of all live values.
    fn weight(&self) -> usize;

    /// Returns the capacity in bytes. `0` means unbounded.
    fn capacity(&self) -> usize;
}

/// A live entry owned by a store.
#[derive(Debug)]
pub(crate) struct Entry<K, V> {
    pub key: K,
    pub value: V,
    /// Weight captured at insertion; values are weighed once.
    pub weight: usize,
}
