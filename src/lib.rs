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

//! An in-process bounded cache with pluggable eviction policies and
//! coalesced loading.
//!
//! The crate has two layers:
//!
//! - [`Store`]: a byte-bounded key/value store with a defined eviction order,
//!   implemented by interchangeable policies ([`Fifo`] evicts in insertion
//!   order, [`Lru`] in access order). Stores are single-threaded building
//!   blocks.
//! - [`LoadCache`]: a concurrency-safe front end over one store and one
//!   [`Loader`]. Concurrent lookups for the same missing key trigger at most
//!   one load; every caller receives the shared result. Hit and load rates
//!   are instrumented and exposed as [`Stats`].
//!
//! ```
//! use std::collections::HashMap;
//!
//! use loadcache::{LoadCache, Lru, LruConfig};
//!
//! let db: HashMap<String, String> =
//!     [("k1".to_string(), "v1".to_string())].into_iter().collect();
//!
//! let cache = LoadCache::new(Lru::new(LruConfig { capacity: 4096 }), move |key: &String| {
//!     db.get(key).cloned()
//! });
//!
//! assert_eq!(cache.get("k1"), Some("v1".to_string()));
//! assert_eq!(cache.get("k1"), Some("v1".to_string()));
//! assert_eq!(cache.stats().hits, 1);
//! ```

mod cache;
mod code;
mod event;
mod inflight;
mod metrics;
mod store;

pub use cache::{FifoLoadCache, LoadCache, Loader, LruLoadCache};
pub use code::{Key, Value, Weighted};
pub use event::{Event, EventListener};
pub use metrics::Stats;
pub use store::{
    fifo::{Fifo, FifoConfig},
    lru::{Lru, LruConfig},
    Store,
};
