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

//! Provides the foundational traits and primitive types for Tessel's asset system.
//!
//! The key components are:
//! - The [`Asset`] trait: the per-kind decode contract.
//! - [`AssetUid`]: a per-kind slot identity.
//! - [`AssetHandle`]: the cross-thread value consumers poll until the payload is ready.
//! - [`AssetRepository`]: the storage and name table for one asset kind.
//!
//! The cross-kind manager and the background loader are built on top of these in
//! `tessel-io`.

mod handle;
mod record;
mod repository;
mod status;
mod uid;

pub use handle::*;
pub use record::*;
pub use repository::*;
pub use status::{LoadStatus, LoadTicket};
pub use uid::AssetUid;

use std::error::Error;
use std::path::Path;

/// The error type a decode operation may return. It must be thread-safe because
/// decodes run on the loader thread.
pub type DecodeError = Box<dyn Error + Send + Sync + 'static>;

/// A type that can be loaded from a file and managed by an [`AssetRepository`].
///
/// The supertraits are required because a payload is decoded on the loader
/// thread and then read from any number of consumer threads.
///
/// # Examples
///
/// ```
/// use std::path::Path;
/// use tessel_core::asset::{Asset, DecodeError};
///
/// struct Script {
///     source: String,
/// }
///
/// impl Asset for Script {
///     const KIND: &'static str = "script";
///
///     fn decode(full_path: &Path) -> Result<Self, DecodeError> {
///         Ok(Self {
///             source: std::fs::read_to_string(full_path)?,
///         })
///     }
/// }
/// ```
pub trait Asset: Sized + Send + Sync + 'static {
    /// A short, stable name for the kind, used in logs, errors and configuration.
    const KIND: &'static str;

    /// Decodes the file at `full_path` into an in-memory payload.
    ///
    /// This must behave as a pure function of the file contents: it may be
    /// invoked from the calling thread or from the loader thread.
    fn decode(full_path: &Path) -> Result<Self, DecodeError>;
}
