// Copyright 2025 eraflo
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

use super::{Asset, AssetUid};
use std::fmt;
use std::ops::Deref;
use std::sync::{Arc, OnceLock};

/// A shared reference to a decoded payload.
///
/// Cloning is cheap: it only increments a reference count.
pub struct AssetRef<T: Asset>(Arc<T>);

impl<T: Asset> AssetRef<T> {
    fn new(asset: T) -> Self {
        Self(Arc::new(asset))
    }

    /// Returns `true` if both references point at the same payload.
    pub fn ptr_eq(this: &Self, other: &Self) -> bool {
        Arc::ptr_eq(&this.0, &other.0)
    }
}

impl<T: Asset> Clone for AssetRef<T> {
    fn clone(&self) -> Self {
        Self(self.0.clone())
    }
}

impl<T: Asset> Deref for AssetRef<T> {
    type Target = T;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl<T: Asset + fmt::Debug> fmt::Debug for AssetRef<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("AssetRef").field(&*self.0).finish()
    }
}

/// One slot of an [`AssetRepository`](super::AssetRepository).
///
/// The slot is created empty when a name is registered and filled exactly once
/// by a successful decode. Records are never removed.
pub struct AssetRecord<T: Asset> {
    uid: AssetUid<T>,
    payload: OnceLock<AssetRef<T>>,
}

impl<T: Asset> AssetRecord<T> {
    pub(crate) fn empty(uid: AssetUid<T>) -> Self {
        Self {
            uid,
            payload: OnceLock::new(),
        }
    }

    /// The identity this record was created under.
    pub fn uid(&self) -> AssetUid<T> {
        self.uid
    }

    /// The decoded payload, or `None` while the slot is still empty.
    pub fn payload(&self) -> Option<AssetRef<T>> {
        self.payload.get().cloned()
    }

    /// Returns `true` once a decode filled this slot.
    pub fn is_loaded(&self) -> bool {
        self.payload.get().is_some()
    }

    /// Stores the decoded payload. Returns `false` if the slot was already filled,
    /// in which case the new value is dropped.
    pub(crate) fn fill(&self, asset: T) -> bool {
        self.payload.set(AssetRef::new(asset)).is_ok()
    }
}

impl<T: Asset> fmt::Debug for AssetRecord<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AssetRecord")
            .field("uid", &self.uid)
            .field("loaded", &self.is_loaded())
            .finish()
    }
}
