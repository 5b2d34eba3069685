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

// Tessel Sandbox
// Loads every file of the configured asset directories in the background and
// reports what settled.

use anyhow::{Context, Result};
use std::fs;
use std::path::Path;
use std::thread;
use std::time::{Duration, Instant};
use tessel_core::asset::{Asset, AssetHandle, LoadStatus};
use tessel_io::{AssetManager, AssetManagerConfig, LoadMode};
use tessel_lanes::{CpuSprite, ShaderSource};

const LOAD_TIMEOUT: Duration = Duration::from_secs(10);

/// Requests every regular file in the repository directory of `T`.
fn request_all<T: Asset>(manager: &AssetManager) -> Result<Vec<(String, AssetHandle<T>)>> {
    let repository = match manager.add_configured_repository::<T>() {
        Ok(repository) => repository,
        Err(e) => {
            log::warn!("Skipping {} assets: {}", T::KIND, e);
            return Ok(Vec::new());
        }
    };

    let mut names = Vec::new();
    for entry in fs::read_dir(repository.directory())? {
        let entry = entry?;
        if !entry.file_type()?.is_file() {
            continue;
        }
        let name = entry.file_name().to_string_lossy().into_owned();
        if name.starts_with('.') {
            continue;
        }
        names.push(name);
    }
    names.sort();

    let mut handles = Vec::with_capacity(names.len());
    for name in names {
        match manager.require_asset::<T>(&name, LoadMode::Deferred) {
            Ok(handle) => handles.push((name, handle)),
            Err(e) => log::error!("Could not request {} '{}': {}", T::KIND, name, e),
        }
    }
    Ok(handles)
}

/// Returns `true` once no handle is waiting anymore.
fn settled<T: Asset>(handles: &mut [(String, AssetHandle<T>)]) -> bool {
    handles
        .iter_mut()
        .all(|(_, handle)| handle.loaded() || handle.has_failed())
}

fn report<T: Asset>(handles: &[(String, AssetHandle<T>)], describe: impl Fn(&T) -> String) {
    for (name, handle) in handles {
        match handle.status() {
            LoadStatus::Ready => {
                log::info!("[{}] {} {}: {}", T::KIND, handle.uid(), name, describe(&*handle.get()))
            }
            status => log::warn!("[{}] {} {}: {:?}", T::KIND, handle.uid(), name, status),
        }
    }
}

fn main() -> Result<()> {
    use env_logger::{Builder, Env};

    Builder::from_env(Env::default().default_filter_or("info")).init();

    let config_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "Assets.toml".to_owned());
    let config = AssetManagerConfig::load_or_default(Path::new(&config_path))
        .with_context(|| format!("Failed to read {config_path}"))?;
    let manager = AssetManager::new(config).context("Failed to create the asset manager")?;

    let mut sprites = request_all::<CpuSprite>(&manager)?;
    let mut shaders = request_all::<ShaderSource>(&manager)?;
    log::info!(
        "Requested {} sprite(s) and {} shader(s), {} job(s) queued",
        sprites.len(),
        shaders.len(),
        manager.pending_jobs()
    );

    let started = Instant::now();
    let mut frames = 0u64;
    // Both lists are polled every frame.
    while !(settled(&mut sprites) & settled(&mut shaders)) {
        if started.elapsed() > LOAD_TIMEOUT {
            log::error!("Gave up waiting for assets after {:?}", LOAD_TIMEOUT);
            break;
        }
        frames += 1;
        thread::sleep(Duration::from_millis(16));
    }
    log::info!("Assets settled after {} frame(s) ({:?})", frames, started.elapsed());

    report(&sprites, |sprite: &CpuSprite| {
        format!("{}x{} RGBA8", sprite.width(), sprite.height())
    });
    report(&shaders, |shader: &ShaderSource| {
        format!("{:?} stage, {} byte(s)", shader.stage(), shader.as_text().len())
    });

    manager.stop_async_loader();
    Ok(())
}
