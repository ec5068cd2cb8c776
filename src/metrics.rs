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

use std::{
    fmt::Display,
    sync::atomic::{AtomicU64, Ordering},
};

use serde::{Deserialize, Serialize};

/// Cumulative counters kept by a cache for its whole lifetime.
#[derive(Debug, Default)]
pub(crate) struct Counters {
    /// Lookups that resolved to a present value.
    gets: AtomicU64,
    /// Loader invocations.
    loads: AtomicU64,
}

impl Counters {
    /// Record a lookup that resolved to a present value, regardless of
    /// whether the store, a shared in-flight load, or an own load served it.
    pub fn record_resolved(&self) {
        self.gets.fetch_add(1, Ordering::Relaxed);
    }

    /// Record one loader invocation.
    pub fn record_load(&self) {
        self.loads.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> Stats {
        let gets = self.gets.load(Ordering::Relaxed);
        let loads = self.loads.load(Ordering::Relaxed);
        Stats {
            gets,
            loads,
            hits: gets.saturating_sub(loads),
        }
    }
}

/// An immutable snapshot of the cache counters.
///
/// `gets` counts lookups that resolved to a present value; lookups with an
/// absent outcome are not counted. `loads` counts loader invocations,
/// including those that came back absent. `hits` is derived as
/// `gets - loads` (saturating): a resolved lookup that did not have to run
/// the loader itself is a hit, and a load that comes back absent debits one
/// potential hit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stats {
    /// Lookups with a present outcome.
    pub gets: u64,
    /// Loader invocations.
    pub loads: u64,
    /// Lookups served without a loader invocation of their own.
    pub hits: u64,
}

impl Stats {
    /// Hit share of the counted lookups, in `[0.0, 1.0]`.
    pub fn hit_rate(&self) -> f64 {
        if self.gets == 0 {
            return 0.0;
        }
        self.hits as f64 / self.gets as f64
    }
}

impl Display for Stats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Stats {{ gets: {}, loads: {}, hits: {} }}",
            self.gets, self.loads, self.hits
        )
    }
}
