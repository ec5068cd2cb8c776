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
use hashbrown::hash_map::{Entry as HashMapEntry, HashMap};
use parking_lot::{Condvar, Mutex};

/// A shared pending result that late arrivals attach to.
///
/// The leader publishes the result exactly once; every waiter observes the
/// same result. There is no timeout, a waiter blocks until completion.
#[derive(Debug)]
pub(crate) struct Flight<T> {
    result: Mutex<Option<T>>,
    condvar: Condvar,
}

impl<T> Flight<T>
where
    T: Clone,
{
    fn new() -> Self {
        Self {
            result: Mutex::new(None),
            condvar: Condvar::new(),
        }
    }

    /// Block until the flight completes and return its result.
    pub fn wait(&self) -> T {
        let mut result = self.result.lock();
        loop {
            if let Some(result) = result.as_ref() {
                return result.clone();
            }
            self.condvar.wait(&mut result);
        }
    }

    /// Publish the result and wake all waiters. Later completions are ignored.
    pub fn complete(&self, value: T) {
        let mut result = self.result.lock();
        if result.is_none() {
            *result = Some(value);
            self.condvar.notify_all();
        }
    }
}

/// Outcome of joining the registry for a key.
pub(crate) enum Lead<T> {
    /// No load was in flight; the caller must run it and complete the flight.
    Leader(Arc<Flight<T>>),
    /// Another caller's load is in flight; wait on it.
    Follower(Arc<Flight<T>>),
}

/// Per-key registry of in-flight loads.
///
/// Guarded externally together with the store it front-runs, so checking the
/// store and registering a flight is one atomic step.
pub(crate) struct InflightMap<K, T> {
    flights: HashMap<K, Arc<Flight<T>>>,
}

impl<K, T> Default for InflightMap<K, T> {
    fn default() -> Self {
        Self {
            flights: HashMap::new(),
        }
    }
}

impl<K, T> InflightMap<K, T>
where
    K: Hash + Eq,
    T: Clone,
{
    /// Register a flight for `key`, or join the one already in flight.
    pub fn lead_or_join<Q>(&mut self, key: &Q) -> Lead<T>
    where
        Q: Hash + Equivalent<K> + ?Sized + ToOwned<Owned = K>,
    {
        match self.flights.entry(key.to_owned()) {
            HashMapEntry::Vacant(v) => {
                let flight = Arc::new(Flight::new());
                v.insert(flight.clone());
                Lead::Leader(flight)
            }
            HashMapEntry::Occupied(o) => Lead::Follower(o.get().clone()),
        }
    }

    /// Drop the registration for `key`, if any.
    pub fn take<Q>(&mut self, key: &Q) -> Option<Arc<Flight<T>>>
    where
        Q: Hash + Equivalent<K> + ?Sized,
    {
        self.flights.remove(key)
    }
}
