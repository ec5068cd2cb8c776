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
use parking_lot::Mutex;

use crate::{
    code::{Key, Value, Weighted},
    inflight::{Flight, InflightMap, Lead},
    metrics::{Counters, Stats},
    store::{fifo::Fifo, lru::Lru, Store},
};

/// The authoritative, slower data source consulted on a cache miss.
///
/// Absence is signaled by `None`; there is no separate error channel.
pub trait Loader<K, V>: Fn(&K) -> Option<V> + Send + Sync + 'static {}
impl<K, V, T> Loader<K, V> for T where T: Fn(&K) -> Option<V> + Send + Sync + 'static {}

/// A concurrency-safe cache that populates a bounded store from a loader.
///
/// Lookups are served from the store when possible. On a miss the loader is
/// consulted, with concurrent misses for the same key coalesced into a single
/// loader invocation whose result fans out to every waiting caller; misses on
/// distinct keys load in parallel.
///
/// The store holds `Option<V>`: a loader's absent result is cached as `None`
/// and served from the store until the entry is removed or evicted, so a
/// loaded-and-absent key is distinguishable from a key that was never cached.
///
/// One lock guards the store, the in-flight registry, and their consistency;
/// the loader itself always runs with the lock released. Cloning is cheap and
/// clones share state.
///
/// # Example
///
/// ```
/// use loadcache::{Fifo, FifoConfig, LoadCache};
///
/// let cache = LoadCache::new(Fifo::new(FifoConfig::default()), |key: &String| {
///     (key == "k1").then(|| "v1".to_string())
/// });
///
/// assert_eq!(cache.get("k1"), Some("v1".to_string()));
/// assert_eq!(cache.stats().hits, 0);
/// assert_eq!(cache.get("k1"), Some("v1".to_string()));
/// assert_eq!(cache.stats().hits, 1);
/// assert_eq!(cache.get("k2"), None);
/// ```
pub struct LoadCache<K, V, S>
where
    K: Key,
    V: Value + Weighted + Clone,
    S: Store<K, Option<V>>,
{
    inner: Arc<Inner<K, V, S>>,
}

/// [`LoadCache`] over an insertion-ordered store.
pub type FifoLoadCache<K, V> = LoadCache<K, V, Fifo<K, Option<V>>>;
/// [`LoadCache`] over an access-ordered store.
pub type LruLoadCache<K, V> = LoadCache<K, V, Lru<K, Option<V>>>;

impl<K, V, S> Clone for LoadCache<K, V, S>
where
    K: Key,
    V: Value + Weighted + Clone,
    S: Store<K, Option<V>>,
{
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

struct Inner<K, V, S>
where
    K: Key,
    V: Value + Weighted + Clone,
    S: Store<K, Option<V>>,
{
    state: Mutex<State<K, V, S>>,
    loader: Box<dyn Loader<K, V>>,
    counters: Counters,
}

struct State<K, V, S>
where
    K: Key,
    V: Value + Weighted + Clone,
    S: Store<K, Option<V>>,
{
    store: S,
    inflights: InflightMap<K, Option<V>>,
}

impl<K, V, S> LoadCache<K, V, S>
where
    K: Key,
    V: Value + Weighted + Clone,
    S: Store<K, Option<V>>,
{
    /// Create a [`LoadCache`] over `store`, populated from `loader`.
    pub fn new(store: S, loader: impl Loader<K, V>) -> Self {
        Self {
            inner: Arc::new(Inner {
                state: Mutex::new(State {
                    store,
                    inflights: InflightMap::default(),
                }),
                loader: Box::new(loader),
                counters: Counters::default(),
            }),
        }
    }

    /// Look up `key`, consulting the loader on a miss.
    ///
    /// If a load for `key` is already in flight, the call attaches to it and
    /// blocks until the shared result is available instead of invoking the
    /// loader again. `None` means the loader does not know the key.
    pub fn get<Q>(&self, key: &Q) -> Option<V>
    where
        Q: Hash + Equivalent<K> + ?Sized + ToOwned<Owned = K>,
    {
        let mut state = self.inner.state.lock();

        if let Some(cached) = state.store.get(key) {
            let outcome = cached.clone();
            drop(state);
            tracing::trace!(present = outcome.is_some(), "[cache]: lookup served from store");
            return self.resolve(outcome);
        }

        // Checking the store and registering a flight happen under one lock,
        // so a key is either cached or has at most one load in flight.
        match state.inflights.lead_or_join(key) {
            Lead::Follower(flight) => {
                drop(state);
                tracing::trace!("[cache]: attaching to in-flight load");
                let outcome = flight.wait();
                self.resolve(outcome)
            }
            Lead::Leader(flight) => {
                drop(state);
                let guard = FlightGuard {
                    inner: &self.inner,
                    key: Some(key.to_owned()),
                    flight,
                };
                tracing::trace!(key = ?guard.key(), "[cache]: loading");
                self.inner.counters.record_load();
                let outcome = (self.inner.loader)(guard.key());
                guard.finish(outcome.clone());
                self.resolve(outcome)
            }
        }
    }

    /// Insert `value` under `key`, bypassing the loader.
    pub fn insert(&self, key: K, value: V) {
        self.inner.state.lock().store.insert(key, Some(value));
    }

    /// Remove the entry under `key`, if any.
    ///
    /// A subsequent [`LoadCache::get`] consults the loader again, including
    /// for a key that was cached absent.
    pub fn remove<Q>(&self, key: &Q)
    where
        Q: Hash + Equivalent<K> + ?Sized,
    {
        self.inner.state.lock().store.remove(key);
    }

    /// Returns the count of cached entries, absent entries included.
    pub fn len(&self) -> usize {
        self.inner.state.lock().store.len()
    }

    /// Returns `true` if the store holds no entry.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns the byte weight of the cached values.
    pub fn weight(&self) -> usize {
        self.inner.state.lock().store.weight()
    }

    /// Returns a snapshot of the cumulative counters.
    pub fn stats(&self) -> Stats {
        self.inner.counters.snapshot()
    }

    /// Count the outcome of a lookup and pass it through.
    fn resolve(&self, outcome: Option<V>) -> Option<V> {
        if outcome.is_some() {
            self.inner.counters.record_resolved();
        }
        outcome
    }
}

/// Completes the leader's flight even if the loader unwinds.
struct FlightGuard<'a, K, V, S>
where
    K: Key,
    V: Value + Weighted + Clone,
    S: Store<K, Option<V>>,
{
    inner: &'a Inner<K, V, S>,
    key: Option<K>,
    flight: Arc<Flight<Option<V>>>,
}

impl<K, V, S> FlightGuard<'_, K, V, S>
where
    K: Key,
    V: Value + Weighted + Clone,
    S: Store<K, Option<V>>,
{
    fn key(&self) -> &K {
        self.key.as_ref().expect("flight already finished")
    }

    /// Store the outcome, clear the registration, and fan out to waiters.
    fn finish(mut self, outcome: Option<V>) {
        let key = self.key.take().expect("flight already finished");

        let mut state = self.inner.state.lock();
        state.inflights.take(&key);
        state.store.insert(key, outcome.clone());
        drop(state);

        self.flight.complete(outcome);
    }
}

impl<K, V, S> Drop for FlightGuard<'_, K, V, S>
where
    K: Key,
    V: Value + Weighted + Clone,
    S: Store<K, Option<V>>,
{
    fn drop(&mut self) {
        // Reached with a live key only if the loader unwound. Clear the
        // registration and release the waiters with an absent result;
        // nothing is cached, so the next lookup retries the loader.
        let Some(key) = self.key.take() else {
            return;
        };
        let mut state = self.inner.state.lock();
        state.inflights.take(&key);
        drop(state);
        self.flight.complete(None);
    }
}

#[cfg(test)]
mod tests {
    use std::{
        collections::HashMap,
        sync::{
            atomic::{AtomicBool, AtomicUsize, Ordering},
            Barrier,
        },
        thread,
        time::Duration,
    };

    use super::*;
    use crate::store::{fifo::FifoConfig, lru::LruConfig};

    fn db() -> HashMap<String, String> {
        (1..=5).map(|i| (format!("k{i}"), format!("v{i}"))).collect()
    }

    #[test_log::test]
    fn test_hit_accounting() {
        let db = db();
        let loads = Arc::new(AtomicUsize::new(0));
        let cache = LoadCache::new(Lru::new(LruConfig { capacity: 0 }), {
            let db = db.clone();
            let loads = loads.clone();
            move |key: &String| {
                loads.fetch_add(1, Ordering::SeqCst);
                db.get(key).cloned()
            }
        });

        let handles = db
            .iter()
            .map(|(key, value)| {
                let cache = cache.clone();
                let key = key.clone();
                let value = value.clone();
                thread::spawn(move || {
                    assert_eq!(cache.get(&key), Some(value.clone()));
                    assert_eq!(cache.get(&key), Some(value));
                })
            })
            .collect::<Vec<_>>();
        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(cache.get("unknown"), None);
        assert_eq!(cache.get("unknown"), None);

        let stats = cache.stats();
        assert_eq!(stats.gets, 10);
        assert_eq!(stats.hits, 4);
        assert_eq!(stats.loads, 6);
        assert_eq!(loads.load(Ordering::SeqCst), 6);
    }

    #[test_log::test]
    fn test_concurrent_misses_coalesce() {
        let loads = Arc::new(AtomicUsize::new(0));
        let cache = LoadCache::new(Fifo::new(FifoConfig::default()), {
            let loads = loads.clone();
            move |_: &String| {
                loads.fetch_add(1, Ordering::SeqCst);
                thread::sleep(Duration::from_millis(100));
                Some("value".to_string())
            }
        });

        let barrier = Arc::new(Barrier::new(8));
        let handles = (0..8)
            .map(|_| {
                let cache = cache.clone();
                let barrier = barrier.clone();
                thread::spawn(move || {
                    barrier.wait();
                    cache.get("k")
                })
            })
            .collect::<Vec<_>>();
        for handle in handles {
            assert_eq!(handle.join().unwrap(), Some("value".to_string()));
        }

        assert_eq!(loads.load(Ordering::SeqCst), 1);
        let stats = cache.stats();
        assert_eq!(stats.gets, 8);
        assert_eq!(stats.loads, 1);
        assert_eq!(stats.hits, 7);
    }

    #[test]
    fn test_distinct_keys_load_in_parallel() {
        // Both loads rendezvous inside the loader; the test can only pass if
        // neither load holds the cache lock while running.
        let rendezvous = Arc::new(Barrier::new(2));
        let cache = LoadCache::new(Fifo::new(FifoConfig::default()), {
            let rendezvous = rendezvous.clone();
            move |key: &String| {
                rendezvous.wait();
                Some(key.to_uppercase())
            }
        });

        let handles = ["a", "b"]
            .into_iter()
            .map(|key| {
                let cache = cache.clone();
                thread::spawn(move || cache.get(key))
            })
            .collect::<Vec<_>>();

        let outcomes = handles
            .into_iter()
            .map(|handle| handle.join().unwrap())
            .collect::<Vec<_>>();
        assert!(outcomes.contains(&Some("A".to_string())));
        assert!(outcomes.contains(&Some("B".to_string())));
    }

    #[test]
    fn test_negative_caching() {
        let loads = Arc::new(AtomicUsize::new(0));
        let cache = LoadCache::new(Fifo::new(FifoConfig::default()), {
            let loads = loads.clone();
            move |_: &String| -> Option<String> {
                loads.fetch_add(1, Ordering::SeqCst);
                None
            }
        });

        // The absent result is cached; the loader is not asked again.
        assert_eq!(cache.get("missing"), None);
        assert_eq!(cache.get("missing"), None);
        assert_eq!(loads.load(Ordering::SeqCst), 1);
        assert_eq!(cache.len(), 1);
        assert_eq!(cache.weight(), 0);

        // Removal makes the next lookup retry.
        cache.remove("missing");
        assert_eq!(cache.get("missing"), None);
        assert_eq!(loads.load(Ordering::SeqCst), 2);

        let stats = cache.stats();
        assert_eq!(stats.gets, 0);
        assert_eq!(stats.hits, 0);
    }

    #[test]
    fn test_insert_bypasses_loader() {
        let loads = Arc::new(AtomicUsize::new(0));
        let cache = LoadCache::new(Fifo::new(FifoConfig::default()), {
            let loads = loads.clone();
            move |_: &String| -> Option<String> {
                loads.fetch_add(1, Ordering::SeqCst);
                None
            }
        });

        cache.insert("k".to_string(), "v".to_string());
        assert_eq!(cache.get("k"), Some("v".to_string()));
        assert_eq!(loads.load(Ordering::SeqCst), 0);

        let stats = cache.stats();
        assert_eq!(stats.gets, 1);
        assert_eq!(stats.hits, 1);
    }

    #[test]
    fn test_loader_panic_releases_waiters() {
        let armed = Arc::new(AtomicBool::new(true));
        let started = Arc::new(Barrier::new(2));
        let release = Arc::new(Barrier::new(2));
        let cache = LoadCache::new(Fifo::new(FifoConfig::default()), {
            let armed = armed.clone();
            let started = started.clone();
            let release = release.clone();
            move |_: &String| {
                if armed.swap(false, Ordering::SeqCst) {
                    started.wait();
                    release.wait();
                    panic!("loader failure");
                }
                Some("recovered".to_string())
            }
        });

        let leader = {
            let cache = cache.clone();
            thread::spawn(move || cache.get("boom"))
        };
        started.wait();

        let follower = {
            let cache = cache.clone();
            thread::spawn(move || cache.get("boom"))
        };
        // Let the follower attach to the flight before failing the load.
        thread::sleep(Duration::from_millis(100));
        release.wait();

        // The panic propagates to the initiator only; the follower observes
        // the absent outcome.
        assert!(leader.join().is_err());
        assert_eq!(follower.join().unwrap(), None);

        // The failure was not cached; the next lookup retries the loader.
        assert_eq!(cache.get("boom"), Some("recovered".to_string()));
        assert_eq!(cache.stats().loads, 2);
    }
}
