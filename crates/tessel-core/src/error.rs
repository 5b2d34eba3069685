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

//! Defines the error type shared by the asset repository, manager and loader.

use crate::asset::DecodeError;
use std::path::PathBuf;
use thiserror::Error;

/// Everything that can go wrong while registering or loading an asset.
///
/// None of these are fatal for the engine: they are reported to the immediate
/// caller, and a caller that wants a retry re-issues its request.
#[derive(Debug, Error)]
pub enum AssetError {
    /// The asset root or a kind's subdirectory is missing or not a directory.
    #[error("Asset directory not found: {}", .0.display())]
    DirectoryNotFound(PathBuf),

    /// No repository was registered for the requested asset kind.
    #[error("No asset repository registered for kind '{0}'")]
    RepositoryNotRegistered(&'static str),

    /// The configuration has no subdirectory entry for the asset kind.
    #[error("No repository configured for asset kind '{0}'")]
    UnknownKind(String),

    /// The requested file does not exist or is not a regular file.
    #[error("Asset not found: {}", .0.display())]
    NotFound(PathBuf),

    /// The name already owns a slot in the repository.
    #[error("Asset '{0}' is already registered")]
    AlreadyRegistered(String),

    /// The file exists but the kind's decode operation rejected it.
    #[error("Failed to decode asset '{}': {source}", .path.display())]
    Decode {
        /// The full path handed to the decoder.
        path: PathBuf,
        /// The error reported by the decoder.
        #[source]
        source: DecodeError,
    },

    /// Every identity of the asset kind has been handed out.
    #[error("Identity space exhausted for asset kind '{0}'")]
    CapacityExhausted(&'static str),

    /// The asset configuration could not be parsed.
    #[error("Asset config error: {0}")]
    Config(String),

    /// An I/O error outside of decoding, e.g. reading a config file or spawning the loader.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for asset operations.
pub type Result<T> = std::result::Result<T, AssetError>;
