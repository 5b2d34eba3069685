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

//! The cross-kind entry point of the asset subsystem.
//!
//! An [`AssetManager`] holds one [`AssetRepository`] per asset type, keyed by
//! [`TypeId`], and owns the [`AsyncLoader`] that first-time requests are handed
//! to.

use crate::config::AssetManagerConfig;
use crate::loader::{AsyncLoader, LoadJob};
use parking_lot::RwLock;
use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tessel_core::asset::{
    AnyAssetRepository, Asset, AssetHandle, AssetRecord, AssetRepository, AssetUid,
};
use tessel_core::{AssetError, Result};

/// How [`AssetManager::require_asset`] treats a name that is not loaded yet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LoadMode {
    /// Hand the decode to the loader thread and return at once. Falls back to
    /// [`Immediate`](Self::Immediate) when the loader is not running.
    #[default]
    Deferred,
    /// Decode on the calling thread before returning.
    Immediate,
}

/// A registered repository, kept both typed (for the generic accessors) and
/// erased (for the loader queue).
struct RepositoryEntry {
    typed: Arc<dyn Any + Send + Sync>,
    erased: Arc<dyn AnyAssetRepository>,
}

impl RepositoryEntry {
    fn new<T: Asset>(repository: Arc<AssetRepository<T>>) -> Self {
        Self {
            typed: repository.clone(),
            erased: repository,
        }
    }

    fn downcast<T: Asset>(&self) -> Option<Arc<AssetRepository<T>>> {
        Arc::clone(&self.typed).downcast::<AssetRepository<T>>().ok()
    }
}

/// Owns the repositories of every asset kind and the background loader.
///
/// The manager is an ordinary value: share it through an `Arc` if several
/// threads need to request assets. Dropping it stops the loader and discards the
/// jobs still waiting in its queue.
pub struct AssetManager {
    // Declared first so the worker is joined before the repositories go away.
    loader: AsyncLoader,
    config: AssetManagerConfig,
    repositories: RwLock<HashMap<TypeId, RepositoryEntry>>,
}

impl AssetManager {
    /// Creates a manager from a configuration.
    ///
    /// Fails with [`AssetError::DirectoryNotFound`] if the configured root is not
    /// a directory. Starts the loader thread when `multithreaded` is set.
    pub fn new(config: AssetManagerConfig) -> Result<Self> {
        if !config.root.is_dir() {
            log::error!("Asset directory not found! {}", config.root.display());
            return Err(AssetError::DirectoryNotFound(config.root));
        }

        let manager = Self {
            loader: AsyncLoader::new(config.drain_order),
            config,
            repositories: RwLock::new(HashMap::new()),
        };

        if manager.config.multithreaded {
            manager.loader.start()?;
        }

        log::info!(
            "Asset manager rooted at {} (multithreaded: {})",
            manager.config.root.display(),
            manager.config.multithreaded
        );
        Ok(manager)
    }

    /// Shorthand for [`new`](Self::new) with default settings.
    pub fn create(root: impl Into<PathBuf>, multithreaded: bool) -> Result<Self> {
        Self::new(AssetManagerConfig::new(root).with_multithreaded(multithreaded))
    }

    /// The asset root.
    pub fn root(&self) -> &Path {
        &self.config.root
    }

    /// The settings this manager was created with.
    pub fn config(&self) -> &AssetManagerConfig {
        &self.config
    }

    /// Registers the repository for `T`, rooted at `root/subdirectory`.
    ///
    /// Registering a kind twice is not an error: the existing repository is
    /// returned and `subdirectory` is ignored.
    pub fn add_repository<T: Asset>(
        &self,
        subdirectory: impl AsRef<Path>,
    ) -> Result<Arc<AssetRepository<T>>> {
        let directory = self.config.root.join(subdirectory);
        if !directory.is_dir() {
            log::error!("Asset directory not found! {}", directory.display());
            return Err(AssetError::DirectoryNotFound(directory));
        }

        let mut repositories = self.repositories.write();
        if let Some(existing) = repositories
            .get(&TypeId::of::<T>())
            .and_then(RepositoryEntry::downcast::<T>)
        {
            log::warn!(
                "A {} repository is already registered at {}, keeping it",
                T::KIND,
                existing.directory().display()
            );
            return Ok(existing);
        }

        let repository = AssetRepository::<T>::new(directory);
        repositories.insert(TypeId::of::<T>(), RepositoryEntry::new(repository.clone()));
        log::info!(
            "Registered {} repository at {}",
            T::KIND,
            repository.directory().display()
        );
        Ok(repository)
    }

    /// Registers the repository for `T` in the subdirectory the configuration
    /// maps `T::KIND` to.
    pub fn add_configured_repository<T: Asset>(&self) -> Result<Arc<AssetRepository<T>>> {
        let subdirectory = self
            .config
            .subdirectory(T::KIND)
            .map(Path::to_path_buf)
            .ok_or_else(|| AssetError::UnknownKind(T::KIND.to_owned()))?;
        self.add_repository::<T>(subdirectory)
    }

    /// Returns a handle to the asset `name` of kind `T`.
    ///
    /// A name that is already registered is a cache hit and returns the same
    /// handle, whatever the mode. Otherwise the slot is allocated right away and,
    /// in [`LoadMode::Deferred`] with a running loader, the decode is queued: poll
    /// [`AssetHandle::loaded`] to find out when it completes.
    ///
    /// Synchronous loads report missing files and decode errors as an `Err`.
    /// Deferred loads report them through the handle's status.
    pub fn require_asset<T: Asset>(&self, name: &str, mode: LoadMode) -> Result<AssetHandle<T>> {
        let (repository, erased) = {
            let repositories = self.repositories.read();
            let entry = repositories
                .get(&TypeId::of::<T>())
                .ok_or(AssetError::RepositoryNotRegistered(T::KIND))?;
            let typed = entry
                .downcast::<T>()
                .ok_or(AssetError::RepositoryNotRegistered(T::KIND))?;
            (typed, Arc::clone(&entry.erased))
        };

        if mode == LoadMode::Immediate
            || !self.loader.is_running()
            || repository.is_available(name)
        {
            return repository.require_asset(name);
        }

        let handle = match repository.create_empty(name) {
            Ok(handle) => handle,
            Err(AssetError::AlreadyRegistered(_)) => return repository.require_asset(name),
            Err(e) => return Err(e),
        };

        self.enqueue_or_load(&repository, erased, &handle, name)?;
        Ok(handle)
    }

    /// Queues the decode of a freshly registered slot, or runs it right away if
    /// the loader refuses the job because it stopped in the meantime.
    pub(crate) fn enqueue_or_load<T: Asset>(
        &self,
        repository: &AssetRepository<T>,
        erased: Arc<dyn AnyAssetRepository>,
        handle: &AssetHandle<T>,
        name: &str,
    ) -> Result<()> {
        if let Err(job) = self.loader.enqueue(LoadJob::new(name, erased, handle.ticket())) {
            log::debug!(
                "Loader stopped before '{}' could be queued, loading it now",
                job.name()
            );
            repository.load(handle, name)?;
        }
        Ok(())
    }

    /// The repository registered for `T`, if any.
    pub fn get_repository<T: Asset>(&self) -> Option<Arc<AssetRepository<T>>> {
        self.repositories
            .read()
            .get(&TypeId::of::<T>())
            .and_then(RepositoryEntry::downcast::<T>)
    }

    /// The record stored under `uid`, or `None` if `T` has no repository or the
    /// repository has no such slot.
    pub fn get_asset_by_uid<T: Asset>(&self, uid: AssetUid<T>) -> Option<Arc<AssetRecord<T>>> {
        self.get_repository::<T>()?.try_get_asset(uid)
    }

    /// The kinds of every registered repository, sorted.
    pub fn kinds(&self) -> Vec<&'static str> {
        let mut kinds: Vec<_> = self
            .repositories
            .read()
            .values()
            .map(|entry| entry.erased.kind())
            .collect();
        kinds.sort_unstable();
        kinds
    }

    /// Starts the loader thread if it is not running.
    pub fn start_async_loader(&self) -> Result<()> {
        self.loader.start()
    }

    /// Stops the loader thread after its current job and discards the queue.
    /// Returns the number of discarded jobs; their handles stay `Queued`.
    pub fn stop_async_loader(&self) -> usize {
        self.loader.stop()
    }

    /// Returns `true` while the loader thread is accepting jobs.
    pub fn is_async_running(&self) -> bool {
        self.loader.is_running()
    }

    /// The number of jobs waiting for the loader thread.
    pub fn pending_jobs(&self) -> usize {
        self.loader.pending()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tessel_core::asset::{DecodeError, LoadStatus};
    use tempfile::tempdir;

    struct Blob(Vec<u8>);

    impl Asset for Blob {
        const KIND: &'static str = "blob";

        fn decode(full_path: &Path) -> std::result::Result<Self, DecodeError> {
            Ok(Blob(fs::read(full_path)?))
        }
    }

    struct Other;

    impl Asset for Other {
        const KIND: &'static str = "other";

        fn decode(_full_path: &Path) -> std::result::Result<Self, DecodeError> {
            Ok(Other)
        }
    }

    #[test]
    fn missing_root_is_rejected() {
        let dir = tempdir().unwrap();
        let err = AssetManager::create(dir.path().join("nope"), false)
            .err()
            .unwrap();
        assert!(matches!(err, AssetError::DirectoryNotFound(_)));
    }

    #[test]
    fn loader_follows_multithreaded_flag() {
        let dir = tempdir().unwrap();
        assert!(!AssetManager::create(dir.path(), false).unwrap().is_async_running());
        assert!(AssetManager::create(dir.path(), true).unwrap().is_async_running());
    }

    #[test]
    fn repository_lookup_is_typed() {
        let dir = tempdir().unwrap();
        fs::create_dir(dir.path().join("blobs")).unwrap();
        let manager = AssetManager::create(dir.path(), false).unwrap();

        let added = manager.add_repository::<Blob>("blobs").unwrap();
        let found = manager.get_repository::<Blob>().unwrap();
        assert!(Arc::ptr_eq(&added, &found));
        assert!(manager.get_repository::<Other>().is_none());
        assert_eq!(manager.kinds(), vec!["blob"]);
    }

    #[test]
    fn immediate_request_loads_on_caller() {
        let dir = tempdir().unwrap();
        fs::create_dir(dir.path().join("blobs")).unwrap();
        fs::write(dir.path().join("blobs/a.bin"), [1u8, 2, 3]).unwrap();
        let manager = AssetManager::create(dir.path(), true).unwrap();
        manager.add_repository::<Blob>("blobs").unwrap();

        let mut handle = manager
            .require_asset::<Blob>("a.bin", LoadMode::Immediate)
            .unwrap();
        assert!(handle.loaded());
        assert_eq!(handle.get().0, vec![1, 2, 3]);

        let record = manager.get_asset_by_uid(handle.uid()).unwrap();
        assert!(record.is_loaded());
        assert!(manager.get_asset_by_uid::<Other>(AssetUid::INVALID).is_none());
    }

    #[test]
    fn deferred_request_without_loader_is_synchronous() {
        let dir = tempdir().unwrap();
        fs::create_dir(dir.path().join("blobs")).unwrap();
        fs::write(dir.path().join("blobs/a.bin"), [7u8]).unwrap();
        let manager = AssetManager::create(dir.path(), false).unwrap();
        manager.add_repository::<Blob>("blobs").unwrap();

        let mut handle = manager.require_asset::<Blob>("a.bin", LoadMode::Deferred).unwrap();
        assert!(handle.loaded());
    }

    #[test]
    fn stopped_loader_queues_nothing() {
        let dir = tempdir().unwrap();
        fs::create_dir(dir.path().join("blobs")).unwrap();
        fs::write(dir.path().join("blobs/a.bin"), [7u8]).unwrap();
        let manager = AssetManager::create(dir.path(), true).unwrap();
        manager.add_repository::<Blob>("blobs").unwrap();
        manager.stop_async_loader();

        let handle = manager.require_asset::<Blob>("a.bin", LoadMode::Deferred).unwrap();
        assert_eq!(handle.status(), LoadStatus::Finished);
        assert_eq!(manager.pending_jobs(), 0);
    }

    #[test]
    fn refused_job_is_loaded_synchronously() {
        let dir = tempdir().unwrap();
        fs::create_dir(dir.path().join("blobs")).unwrap();
        fs::write(dir.path().join("blobs/late.bin"), [9u8]).unwrap();
        let manager = AssetManager::create(dir.path(), true).unwrap();
        let repository = manager.add_repository::<Blob>("blobs").unwrap();

        // Registration went through while the loader was up; it stops before the enqueue.
        let mut handle = repository.create_empty("late.bin").unwrap();
        manager.stop_async_loader();

        manager
            .enqueue_or_load(&repository, repository.clone(), &handle, "late.bin")
            .unwrap();
        assert_eq!(handle.status(), LoadStatus::Finished);
        assert_eq!(manager.pending_jobs(), 0);
        assert!(handle.loaded());
        assert_eq!(handle.get().0, vec![9]);
    }

    #[test]
    fn unconfigured_kind_is_unknown() {
        let dir = tempdir().unwrap();
        let manager = AssetManager::create(dir.path(), false).unwrap();
        let err = manager.add_configured_repository::<Blob>().unwrap_err();
        assert!(matches!(err, AssetError::UnknownKind(kind) if kind == "blob"));
    }

    #[test]
    fn configured_kind_uses_its_subdirectory() {
        let dir = tempdir().unwrap();
        fs::create_dir(dir.path().join("Blobs")).unwrap();
        let config = AssetManagerConfig::new(dir.path())
            .with_multithreaded(false)
            .with_repository("blob", "Blobs");
        let manager = AssetManager::new(config).unwrap();

        let repository = manager.add_configured_repository::<Blob>().unwrap();
        assert_eq!(repository.directory(), dir.path().join("Blobs"));
    }
}
