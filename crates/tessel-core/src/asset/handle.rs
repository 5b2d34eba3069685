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

use super::status::LoadStatusCell;
use super::{Asset, AssetRef, AssetRepository, AssetUid, LoadStatus, LoadTicket};
use std::fmt;
use std::sync::atomic::{fence, Ordering};
use std::sync::{Arc, Weak};

/// A cheap, clonable capability to one asset slot.
///
/// A handle pairs the slot's [`AssetUid`] with the status cell the loader
/// publishes into. It never owns the payload: [`get`](Self::get) looks the payload
/// up in the repository that issued the handle.
///
/// Every clone shares the status cell but keeps its own local snapshot. The first
/// call to [`loaded`](Self::loaded) that sees `Finished` pays for an acquire fence
/// and caches `Ready` in that snapshot, so later polls on the same value are a
/// plain field read.
pub struct AssetHandle<T: Asset> {
    uid: AssetUid<T>,
    cell: Arc<LoadStatusCell>,
    local: LoadStatus,
    repository: Weak<AssetRepository<T>>,
}

impl<T: Asset> AssetHandle<T> {
    pub(crate) fn new(uid: AssetUid<T>, repository: Weak<AssetRepository<T>>) -> Self {
        Self {
            uid,
            cell: Arc::new(LoadStatusCell::new(LoadStatus::Empty)),
            local: LoadStatus::Empty,
            repository,
        }
    }

    /// The identity of the slot this handle refers to.
    pub fn uid(&self) -> AssetUid<T> {
        self.uid
    }

    /// Returns `true` once the payload can be read through [`get`](Self::get).
    ///
    /// The shared state is read with relaxed ordering. On `Finished` an acquire
    /// fence pairs with the loader's release store, which makes every write of the
    /// decode visible to this thread; the handle then remembers `Ready` locally.
    pub fn loaded(&mut self) -> bool {
        if self.local == LoadStatus::Ready {
            return true;
        }

        match self.cell.load_relaxed() {
            LoadStatus::Finished => {
                fence(Ordering::Acquire);
                self.local = LoadStatus::Ready;
                true
            }
            _ => false,
        }
    }

    /// The current state of the slot, as seen by this handle.
    pub fn status(&self) -> LoadStatus {
        if self.local == LoadStatus::Ready {
            LoadStatus::Ready
        } else {
            self.cell.load_relaxed()
        }
    }

    /// Returns `true` if the load settled in a failure state.
    pub fn has_failed(&self) -> bool {
        self.status().is_failure()
    }

    /// Returns the decoded payload.
    ///
    /// # Panics
    ///
    /// Panics if [`loaded`](Self::loaded) has not returned `true` on this handle
    /// value, or if the issuing repository was dropped.
    pub fn get(&self) -> AssetRef<T> {
        assert_eq!(
            self.local,
            LoadStatus::Ready,
            "{} asset {} read before `loaded()` returned true",
            T::KIND,
            self.uid
        );
        self.lookup().unwrap_or_else(|| {
            panic!(
                "{} asset {} is no longer backed by its repository",
                T::KIND,
                self.uid
            )
        })
    }

    /// Polls the handle and returns the payload if it is ready.
    pub fn try_get(&mut self) -> Option<AssetRef<T>> {
        if !self.loaded() {
            return None;
        }
        self.lookup()
    }

    /// A ticket that lets a loader queue mark progress on this slot.
    pub fn ticket(&self) -> LoadTicket {
        LoadTicket::new(self.cell.clone())
    }

    /// Returns `true` if both handles share one status cell, i.e. refer to one
    /// registration.
    pub fn same_slot(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.cell, &other.cell)
    }

    pub(crate) fn cell(&self) -> &LoadStatusCell {
        &self.cell
    }

    fn lookup(&self) -> Option<AssetRef<T>> {
        let repository = self.repository.upgrade()?;
        repository.try_get_asset(self.uid)?.payload()
    }
}

impl<T: Asset> Clone for AssetHandle<T> {
    fn clone(&self) -> Self {
        Self {
            uid: self.uid,
            cell: self.cell.clone(),
            local: self.local,
            repository: self.repository.clone(),
        }
    }
}

impl<T: Asset> fmt::Debug for AssetHandle<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AssetHandle")
            .field("kind", &T::KIND)
            .field("uid", &self.uid)
            .field("status", &self.status())
            .finish()
    }
}
