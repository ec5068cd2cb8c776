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

use crate::code::{Key, Value};

/// Reason an entry left a store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    /// Removed by capacity pressure or by an explicit oldest-entry removal.
    Evict,
    /// Removed by key.
    Remove,
}

/// Trait for a customized event listener.
///
/// The listener is called synchronously on the thread that triggered the
/// removal, with ownership of the removed entry. It must not call back into
/// the store that invoked it; no reentrancy guarantee is provided.
pub trait EventListener: Send + Sync + 'static {
    /// Associated key type.
    type Key: Key;
    /// Associated value type.
    type Value: Value;

    /// Called when an entry leaves the store with the reason.
    #[expect(unused_variables)]
    fn on_leave(&self, reason: Event, key: Self::Key, value: Self::Value) {}
}
