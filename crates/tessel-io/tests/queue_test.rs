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

//! Loader queue behavior, observed through assets whose decode blocks until
//! the test opens a gate.

use anyhow::Result;
use parking_lot::Mutex;
use std::fs;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};
use tempfile::tempdir;
use tessel_core::asset::{Asset, AssetHandle, DecodeError, LoadStatus};
use tessel_io::{AssetManager, AssetManagerConfig, DrainOrder, LoadMode};

// Each test gets its own asset type so the gates never cross.
macro_rules! gated_asset {
    ($name:ident, $kind:literal) => {
        struct $name;

        impl $name {
            fn gate() -> &'static AtomicBool {
                static GATE: AtomicBool = AtomicBool::new(false);
                &GATE
            }

            fn decoded() -> &'static Mutex<Vec<String>> {
                static DECODED: Mutex<Vec<String>> = Mutex::new(Vec::new());
                &DECODED
            }
        }

        impl Asset for $name {
            const KIND: &'static str = $kind;

            fn decode(full_path: &Path) -> Result<Self, DecodeError> {
                while !Self::gate().load(Ordering::SeqCst) {
                    thread::sleep(Duration::from_millis(1));
                }
                let name = full_path
                    .file_name()
                    .map(|name| name.to_string_lossy().into_owned())
                    .unwrap_or_default();
                Self::decoded().lock().push(name);
                Ok($name)
            }
        }
    };
}

gated_asset!(ShutdownGated, "shutdown-gated");
gated_asset!(LifoGated, "lifo-gated");
gated_asset!(FifoGated, "fifo-gated");

fn wait_until(what: &str, mut condition: impl FnMut() -> bool) {
    let deadline = Instant::now() + Duration::from_secs(5);
    while !condition() {
        assert!(Instant::now() < deadline, "timed out waiting for {what}");
        thread::sleep(Duration::from_millis(1));
    }
}

fn manager_with_files(
    order: DrainOrder,
    names: &[&str],
) -> Result<(tempfile::TempDir, AssetManager)> {
    let dir = tempdir()?;
    fs::create_dir(dir.path().join("Gated"))?;
    for name in names {
        fs::write(dir.path().join("Gated").join(name), "gated")?;
    }
    let config = AssetManagerConfig::new(dir.path()).with_drain_order(order);
    let manager = AssetManager::new(config)?;
    Ok((dir, manager))
}

/// Blocks the worker on `blocker`, queues `queued` behind it, and returns the
/// queued handles in request order.
fn jam_loader<T: Asset>(
    manager: &AssetManager,
    blocker: &str,
    queued: &[&str],
) -> Result<(AssetHandle<T>, Vec<AssetHandle<T>>)> {
    manager.add_repository::<T>("Gated")?;

    let first = manager.require_asset::<T>(blocker, LoadMode::Deferred)?;
    wait_until("the worker to pick up the first job", || {
        first.status() == LoadStatus::Loading
    });

    let handles = queued
        .iter()
        .map(|name| manager.require_asset::<T>(name, LoadMode::Deferred))
        .collect::<Result<Vec<_>, _>>()?;
    for handle in &handles {
        assert_eq!(handle.status(), LoadStatus::Queued);
    }
    assert_eq!(manager.pending_jobs(), queued.len());
    Ok((first, handles))
}

#[test]
fn test_stop_discards_queued_jobs() -> Result<()> {
    let (_dir, manager) =
        manager_with_files(DrainOrder::Lifo, &["first.p", "a.p", "b.p", "c.p"])?;
    let manager = Arc::new(manager);
    let (mut first, queued) =
        jam_loader::<ShutdownGated>(&manager, "first.p", &["a.p", "b.p", "c.p"])?;

    let stopper = {
        let manager = Arc::clone(&manager);
        thread::spawn(move || manager.stop_async_loader())
    };
    wait_until("the loader to refuse new work", || !manager.is_async_running());
    ShutdownGated::gate().store(true, Ordering::SeqCst);

    let abandoned = stopper.join().expect("stopping thread panicked");
    assert_eq!(abandoned, 3);
    assert_eq!(manager.pending_jobs(), 0);

    // The job in flight is finished, not interrupted.
    assert!(first.loaded());
    for handle in &queued {
        assert_eq!(handle.status(), LoadStatus::Queued);
    }
    assert_eq!(*ShutdownGated::decoded().lock(), vec!["first.p".to_owned()]);
    Ok(())
}

#[test]
fn test_lifo_drains_newest_first() -> Result<()> {
    let (_dir, manager) =
        manager_with_files(DrainOrder::default(), &["first.p", "a.p", "b.p", "c.p"])?;
    let (_, mut queued) = jam_loader::<LifoGated>(&manager, "first.p", &["a.p", "b.p", "c.p"])?;

    LifoGated::gate().store(true, Ordering::SeqCst);
    wait_until("every queued load", || queued.iter_mut().all(|h| h.loaded()));

    assert_eq!(*LifoGated::decoded().lock(), vec!["first.p", "c.p", "b.p", "a.p"]);
    Ok(())
}

#[test]
fn test_fifo_drains_in_request_order() -> Result<()> {
    let (_dir, manager) =
        manager_with_files(DrainOrder::Fifo, &["first.p", "a.p", "b.p", "c.p"])?;
    let (_, mut queued) = jam_loader::<FifoGated>(&manager, "first.p", &["a.p", "b.p", "c.p"])?;

    FifoGated::gate().store(true, Ordering::SeqCst);
    wait_until("every queued load", || queued.iter_mut().all(|h| h.loaded()));

    assert_eq!(*FifoGated::decoded().lock(), vec!["first.p", "a.p", "b.p", "c.p"]);
    Ok(())
}
