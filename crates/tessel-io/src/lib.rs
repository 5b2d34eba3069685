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

//! # Tessel IO
//!
//! The asset manager and its background loader.
//!
//! An [`AssetManager`] is rooted at one directory and holds a repository per
//! asset kind. First-time requests in [`LoadMode::Deferred`] allocate a slot at
//! once and hand the decode to a single loader thread; the returned handle is
//! polled until it reports `loaded()`.
//!
//! ```no_run
//! use tessel_io::{AssetManager, AssetManagerConfig, LoadMode};
//! # use std::path::Path;
//! # use tessel_core::asset::{Asset, DecodeError};
//! # struct Script(String);
//! # impl Asset for Script {
//! #     const KIND: &'static str = "script";
//! #     fn decode(path: &Path) -> Result<Self, DecodeError> {
//! #         Ok(Script(std::fs::read_to_string(path)?))
//! #     }
//! # }
//!
//! # fn main() -> tessel_core::Result<()> {
//! let manager = AssetManager::new(AssetManagerConfig::load_or_default("Assets.toml")?)?;
//! manager.add_repository::<Script>("Scripts")?;
//!
//! let mut handle = manager.require_asset::<Script>("intro.lua", LoadMode::Deferred)?;
//! while !handle.loaded() && !handle.has_failed() {
//!     std::thread::yield_now();
//! }
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]

pub mod config;
mod loader;
pub mod manager;

pub use config::{AssetManagerConfig, DrainOrder};
pub use loader::AsyncLoader;
pub use manager::{AssetManager, LoadMode};
