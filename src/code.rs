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

use std::{fmt::Debug, hash::Hash, sync::Arc};

/// Requirements for a cache key.
pub trait Key: Send + Sync + 'static + Hash + Eq + Clone + Debug {}
impl<T> Key for T where T: Send + Sync + 'static + Hash + Eq + Clone + Debug {}

/// Requirements for a cache value.
pub trait Value: Send + Sync + 'static {}
impl<T> Value for T where T: Send + Sync + 'static {}

/// Byte footprint of a stored value, used for capacity accounting.
///
/// The weight only needs to be stable between the insertion and the removal of
/// an entry; it is never used for equality or serialization. Keys are not
/// weighed.
pub trait Weighted {
    /// Weight of the value in bytes.
    fn weight(&self) -> usize;
}

macro_rules! impl_weighted_sized {
    ($( $type:ty, )*) => {
        $(
            impl Weighted for $type {
                fn weight(&self) -> usize {
                    std::mem::size_of::<Self>()
                }
            }
        )*
    };
}

impl_weighted_sized! {
    u8, u16, u32, u64, u128, usize,
    i8, i16, i32, i64, i128, isize,
    f32, f64,
    bool, char,
}

impl Weighted for () {
    fn weight(&self) -> usize {
        0
    }
}

impl Weighted for String {
    fn weight(&self) -> usize {
        self.len()
    }
}

impl Weighted for &'static str {
    fn weight(&self) -> usize {
        self.len()
    }
}

impl<T> Weighted for Vec<T>
where
    T: Weighted,
{
    fn weight(&self) -> usize {
        self.iter().map(Weighted::weight).sum()
    }
}

impl<T> Weighted for Box<T>
where
    T: Weighted,
{
    fn weight(&self) -> usize {
        self.as_ref().weight()
    }
}

impl<T> Weighted for Arc<T>
where
    T: Weighted,
{
    fn weight(&self) -> usize {
        self.as_ref().weight()
    }
}

/// `None` weighs nothing, which lets a store hold negative entries for free.
impl<T> Weighted for Option<T>
where
    T: Weighted,
{
    fn weight(&self) -> usize {
        self.as_ref().map(Weighted::weight).unwrap_or_default()
    }
}

impl<A, B> Weighted for (A, B)
where
    A: Weighted,
    B: Weighted,
{
    fn weight(&self) -> usize {
        self.0.weight() + self.1.weight()
    }
}
