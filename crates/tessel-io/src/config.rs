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

//! Configuration of an [`AssetManager`](crate::AssetManager), usually read from an
//! `Assets.toml` file.

use serde::Deserialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use tessel_core::{AssetError, Result};

/// The order in which the loader thread takes jobs off its queue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DrainOrder {
    /// The most recently requested asset is loaded first.
    ///
    /// Under a burst of requests the oldest ones wait until the burst ends.
    #[default]
    Lifo,
    /// Assets are loaded in request order.
    Fifo,
}

/// Settings of an asset manager.
///
/// ```toml
/// root = "assets"
/// multithreaded = true
/// drain_order = "lifo"
///
/// [repositories]
/// sprite = "Images"
/// shader = "Shaders"
/// ```
///
/// Every field is optional.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AssetManagerConfig {
    /// The asset root. Each kind lives in a subdirectory of it.
    pub root: PathBuf,
    /// Whether first-time requests are handed to the background loader.
    pub multithreaded: bool,
    /// The order in which the background loader drains its queue.
    pub drain_order: DrainOrder,
    /// Maps an asset kind (see `Asset::KIND`) to its subdirectory under `root`.
    pub repositories: BTreeMap<String, PathBuf>,
}

impl Default for AssetManagerConfig {
    /// An `assets` root next to the working directory, with background loading
    /// enabled and no repositories.
    fn default() -> Self {
        Self {
            root: PathBuf::from("assets"),
            multithreaded: true,
            drain_order: DrainOrder::default(),
            repositories: BTreeMap::new(),
        }
    }
}

impl AssetManagerConfig {
    /// Default settings with a custom root.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            ..Self::default()
        }
    }

    /// Parses a configuration from TOML text.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| AssetError::Config(e.to_string()))
    }

    /// Reads a configuration file. A relative `root` is resolved against the
    /// directory containing the file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)?;
        let mut config = Self::from_toml_str(&content)
            .map_err(|e| AssetError::Config(format!("{}: {e}", path.display())))?;

        if config.root.is_relative() {
            if let Some(parent) = path.parent() {
                config.root = parent.join(&config.root);
            }
        }
        Ok(config)
    }

    /// Like [`load`](Self::load), but falls back to the defaults if the file does
    /// not exist.
    pub fn load_or_default(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            log::info!("No asset config at {}, using defaults", path.display());
            return Ok(Self::default());
        }
        Self::load(path)
    }

    /// Replaces the asset root.
    pub fn with_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.root = root.into();
        self
    }

    /// Enables or disables the background loader.
    pub fn with_multithreaded(mut self, multithreaded: bool) -> Self {
        self.multithreaded = multithreaded;
        self
    }

    /// Sets the queue drain order.
    pub fn with_drain_order(mut self, drain_order: DrainOrder) -> Self {
        self.drain_order = drain_order;
        self
    }

    /// Maps an asset kind to a subdirectory.
    pub fn with_repository(mut self, kind: &str, subdirectory: impl Into<PathBuf>) -> Self {
        self.repositories.insert(kind.to_owned(), subdirectory.into());
        self
    }

    /// The subdirectory configured for `kind`, if any.
    pub fn subdirectory(&self, kind: &str) -> Option<&Path> {
        self.repositories.get(kind).map(PathBuf::as_path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_uses_defaults() {
        let config = AssetManagerConfig::from_toml_str("").unwrap();
        assert_eq!(config.root, PathBuf::from("assets"));
        assert!(config.multithreaded);
        assert_eq!(config.drain_order, DrainOrder::Lifo);
        assert!(config.repositories.is_empty());
    }

    #[test]
    fn full_document() {
        let config = AssetManagerConfig::from_toml_str(
            r#"
root = "content"
multithreaded = false
drain_order = "fifo"

[repositories]
sprite = "Images"
shader = "Shaders/spirv"
"#,
        )
        .unwrap();

        assert_eq!(config.root, PathBuf::from("content"));
        assert!(!config.multithreaded);
        assert_eq!(config.drain_order, DrainOrder::Fifo);
        assert_eq!(config.subdirectory("sprite"), Some(Path::new("Images")));
        assert_eq!(config.subdirectory("shader"), Some(Path::new("Shaders/spirv")));
        assert_eq!(config.subdirectory("audio"), None);
    }

    #[test]
    fn unknown_drain_order_is_a_config_error() {
        let err = AssetManagerConfig::from_toml_str(r#"drain_order = "random""#).unwrap_err();
        assert!(matches!(err, AssetError::Config(_)));
    }

    #[test]
    fn load_resolves_root_next_to_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("Assets.toml");
        fs::write(&path, "root = \"data\"\n").unwrap();

        let config = AssetManagerConfig::load(&path).unwrap();
        assert_eq!(config.root, dir.path().join("data"));
    }

    #[test]
    fn missing_file_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = AssetManagerConfig::load_or_default(dir.path().join("Assets.toml")).unwrap();
        assert_eq!(config.root, PathBuf::from("assets"));
    }

    #[test]
    fn builders() {
        let config = AssetManagerConfig::default()
            .with_root("root")
            .with_multithreaded(false)
            .with_drain_order(DrainOrder::Fifo)
            .with_repository("sprite", "Images");
        assert_eq!(config.root, PathBuf::from("root"));
        assert!(!config.multithreaded);
        assert_eq!(config.drain_order, DrainOrder::Fifo);
        assert_eq!(config.subdirectory("sprite"), Some(Path::new("Images")));
    }
}
