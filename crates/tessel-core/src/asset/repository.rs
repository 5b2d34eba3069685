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

//! A generic, type-safe storage for the assets of one kind.

use super::{Asset, AssetHandle, AssetRecord, AssetUid, LoadStatus};
use crate::error::{AssetError, Result};
use parking_lot::RwLock;
use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Weak};

/// Type-erased access to a repository, used by the loader queue to run a job
/// without knowing the asset kind.
pub trait AnyAssetRepository: Send + Sync {
    /// The [`Asset::KIND`] of the stored assets.
    fn kind(&self) -> &'static str;

    /// The directory the repository resolves names against.
    fn directory(&self) -> &Path;

    /// Loads the slot previously registered under `name`.
    fn load_named(&self, name: &str) -> Result<()>;
}

struct RepositoryState<T: Asset> {
    next_free: AssetUid<T>,
    lookup: BTreeMap<String, AssetHandle<T>>,
    /// Indexed by uid. Slot 0 is a placeholder so that uid 1 maps to index 1.
    records: Vec<Arc<AssetRecord<T>>>,
}

/// Owns every loaded or loading asset of kind `T`.
///
/// A repository is rooted at one directory. Registering a name allocates the next
/// [`AssetUid`] and an empty [`AssetRecord`] right away, so the slot is addressable
/// (and can be handed to the loader thread) before its bytes are decoded.
///
/// Repositories are always shared through an `Arc`: the handles they issue keep a
/// weak reference back to them.
///
/// Table access is serialized by an internal lock that is never held across a
/// decode, so two threads registering the same name always end up with one slot.
pub struct AssetRepository<T: Asset> {
    this: Weak<Self>,
    directory: PathBuf,
    state: RwLock<RepositoryState<T>>,
}

impl<T: Asset> AssetRepository<T> {
    /// Creates an empty repository resolving names against `directory`.
    ///
    /// The directory is not validated here; see `AssetManager::add_repository`.
    pub fn new(directory: impl Into<PathBuf>) -> Arc<Self> {
        let directory = directory.into();
        Arc::new_cyclic(|this| Self {
            this: this.clone(),
            directory,
            state: RwLock::new(RepositoryState {
                next_free: AssetUid::FIRST,
                lookup: BTreeMap::new(),
                records: vec![Arc::new(AssetRecord::empty(AssetUid::INVALID))],
            }),
        })
    }

    /// The directory names are resolved against.
    pub fn directory(&self) -> &Path {
        &self.directory
    }

    /// Returns `true` if `name` owns a slot, loaded or not.
    pub fn is_available(&self, name: &str) -> bool {
        self.state.read().lookup.contains_key(name)
    }

    /// Returns `true` if `uid` addresses an existing slot of this repository.
    pub fn is_uid_available(&self, uid: AssetUid<T>) -> bool {
        uid.valid() && uid.index() < self.state.read().records.len()
    }

    /// Returns the handle registered under `name`, without loading anything.
    pub fn lookup(&self, name: &str) -> Option<AssetHandle<T>> {
        self.state.read().lookup.get(name).cloned()
    }

    /// The number of registered names.
    pub fn len(&self) -> usize {
        self.state.read().lookup.len()
    }

    /// Returns `true` if no name was registered yet.
    pub fn is_empty(&self) -> bool {
        self.state.read().lookup.is_empty()
    }

    /// The identity the next successful registration will receive.
    pub fn next_free_uid(&self) -> AssetUid<T> {
        self.state.read().next_free
    }

    /// All registered names, in lexicographic order.
    pub fn names(&self) -> Vec<String> {
        self.state.read().lookup.keys().cloned().collect()
    }

    /// Returns a handle to `name`, loading it on the calling thread if needed.
    ///
    /// A registered name is a cache hit and never decodes again, unless its
    /// previous load failed: re-requesting a failed asset is how callers retry.
    pub fn require_asset(&self, name: &str) -> Result<AssetHandle<T>> {
        if let Some(handle) = self.lookup(name) {
            if handle.has_failed() {
                log::debug!("Retrying failed {} asset '{}'", T::KIND, name);
                self.load(&handle, name)?;
            }
            return Ok(handle);
        }

        let handle = match self.create_empty(name) {
            Ok(handle) => handle,
            // Another thread registered the name in between; its slot wins.
            Err(AssetError::AlreadyRegistered(_)) => {
                if let Some(handle) = self.lookup(name) {
                    return Ok(handle);
                }
                return Err(AssetError::AlreadyRegistered(name.to_owned()));
            }
            Err(e) => return Err(e),
        };

        self.load(&handle, name)?;
        Ok(handle)
    }

    /// Registers `name` and allocates its empty slot without decoding it.
    ///
    /// Fails if the name is already registered, if the identity space of this
    /// kind is exhausted, or if `directory/name` is not an existing regular file.
    /// A failed call leaves the repository untouched.
    pub fn create_empty(&self, name: &str) -> Result<AssetHandle<T>> {
        let full_path = self.directory.join(name);
        let mut state = self.state.write();

        if state.lookup.contains_key(name) {
            return Err(AssetError::AlreadyRegistered(name.to_owned()));
        }
        if state.next_free.is_saturated() {
            log::error!("No {} identities left for '{}'", T::KIND, name);
            return Err(AssetError::CapacityExhausted(T::KIND));
        }
        if !full_path.is_file() {
            log::error!("Asset not found! {}", full_path.display());
            return Err(AssetError::NotFound(full_path));
        }

        let uid = state.next_free;
        state.next_free = uid.successor();

        let handle = AssetHandle::new(uid, self.this.clone());
        state.records.push(Arc::new(AssetRecord::empty(uid)));
        debug_assert_eq!(state.records.len() - 1, uid.index());
        state.lookup.insert(name.to_owned(), handle.clone());

        log::trace!("Registered {} asset '{}' as {}", T::KIND, name, uid);
        Ok(handle)
    }

    /// Decodes `name` into the slot of `handle` and publishes the result.
    ///
    /// On success the payload is stored and `Finished` is published with release
    /// ordering; a handle that later observes it through
    /// [`AssetHandle::loaded`] sees the complete payload. A missing file settles
    /// the slot in `NotFound`, a decode error in `LoadingFailed`.
    ///
    /// # Panics
    ///
    /// Panics if `handle` was not issued by this repository.
    pub fn load(&self, handle: &AssetHandle<T>, name: &str) -> Result<()> {
        let record = self.get_asset(handle.uid());
        let full_path = self.directory.join(name);

        if !full_path.is_file() {
            log::warn!("Asset vanished before it could be loaded: {}", full_path.display());
            handle.cell().publish(LoadStatus::NotFound);
            return Err(AssetError::NotFound(full_path));
        }

        match T::decode(&full_path) {
            Ok(asset) => {
                if !record.fill(asset) {
                    log::warn!(
                        "{} asset '{}' was already loaded, keeping the first payload",
                        T::KIND,
                        name
                    );
                }
                handle.cell().publish(LoadStatus::Finished);
                log::debug!("Loaded {} asset '{}' ({})", T::KIND, name, handle.uid());
                Ok(())
            }
            Err(source) => {
                handle.cell().publish(LoadStatus::LoadingFailed);
                Err(AssetError::Decode {
                    path: full_path,
                    source,
                })
            }
        }
    }

    /// Returns the record stored under `uid`.
    ///
    /// # Panics
    ///
    /// Panics if `uid` is not available in this repository. Consumers only ever
    /// hold identities this repository handed out, so this is a logic error.
    pub fn get_asset(&self, uid: AssetUid<T>) -> Arc<AssetRecord<T>> {
        self.try_get_asset(uid).unwrap_or_else(|| {
            panic!(
                "{} asset {} is not available in {}",
                T::KIND,
                uid,
                self.directory.display()
            )
        })
    }

    /// Returns the record a handle refers to. See [`get_asset`](Self::get_asset).
    pub fn get_asset_for(&self, handle: &AssetHandle<T>) -> Arc<AssetRecord<T>> {
        self.get_asset(handle.uid())
    }

    /// Returns the record stored under `uid`, or `None` if it is not available.
    pub fn try_get_asset(&self, uid: AssetUid<T>) -> Option<Arc<AssetRecord<T>>> {
        if !uid.valid() {
            return None;
        }
        self.state.read().records.get(uid.index()).cloned()
    }

    #[cfg(test)]
    fn exhaust_identities_from(&self, raw: u16) {
        let mut state = self.state.write();
        while state.records.len() < usize::from(raw) {
            let filler = AssetUid::from_raw(state.records.len() as u16);
            state.records.push(Arc::new(AssetRecord::empty(filler)));
        }
        state.next_free = AssetUid::from_raw(raw);
    }
}

impl<T: Asset> fmt::Debug for AssetRepository<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AssetRepository")
            .field("kind", &T::KIND)
            .field("directory", &self.directory)
            .field("len", &self.len())
            .finish()
    }
}

impl<T: Asset> AnyAssetRepository for AssetRepository<T> {
    fn kind(&self) -> &'static str {
        T::KIND
    }

    fn directory(&self) -> &Path {
        &self.directory
    }

    fn load_named(&self, name: &str) -> Result<()> {
        let handle = self
            .lookup(name)
            .ok_or_else(|| AssetError::NotFound(self.directory.join(name)))?;
        self.load(&handle, name)
    }
}
