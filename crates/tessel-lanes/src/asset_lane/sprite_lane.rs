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

//! Sprite decoding.

use anyhow::Context;
use std::fmt;
use std::path::Path;
use tessel_core::asset::{Asset, DecodeError};

/// An image decoded into tightly packed RGBA8 rows, ready for upload.
#[derive(Clone, PartialEq, Eq)]
pub struct CpuSprite {
    width: u32,
    height: u32,
    pixels: Vec<u8>,
}

impl CpuSprite {
    /// Width in pixels.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Height in pixels.
    pub fn height(&self) -> u32 {
        self.height
    }

    /// The pixels, four bytes each, row by row from the top-left corner.
    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    /// The RGBA value of the pixel at (`x`, `y`), if it is inside the sprite.
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let offset = ((y as usize) * (self.width as usize) + x as usize) * 4;
        let mut rgba = [0; 4];
        rgba.copy_from_slice(&self.pixels[offset..offset + 4]);
        Some(rgba)
    }
}

impl fmt::Debug for CpuSprite {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CpuSprite")
            .field("width", &self.width)
            .field("height", &self.height)
            .finish_non_exhaustive()
    }
}

impl Asset for CpuSprite {
    const KIND: &'static str = "sprite";

    fn decode(full_path: &Path) -> Result<Self, DecodeError> {
        // Decode the image using the `image` crate
        let img = image::open(full_path)
            .with_context(|| format!("Failed to decode image {}", full_path.display()))?;

        // Convert to RGBA8 (keep in sRGB space)
        let rgba_img = img.to_rgba8();
        let (width, height) = rgba_img.dimensions();
        log::trace!("Decoded {}x{} sprite {}", width, height, full_path.display());

        Ok(CpuSprite {
            width,
            height,
            pixels: rgba_img.into_raw(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgba, RgbaImage};

    #[test]
    fn decodes_png_to_rgba8() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("dot.png");
        let mut img = RgbaImage::new(3, 2);
        img.put_pixel(2, 1, Rgba([10, 20, 30, 255]));
        img.save(&path).unwrap();

        let sprite = CpuSprite::decode(&path).unwrap();
        assert_eq!((sprite.width(), sprite.height()), (3, 2));
        assert_eq!(sprite.pixels().len(), 3 * 2 * 4);
        assert_eq!(sprite.pixel(2, 1), Some([10, 20, 30, 255]));
        assert_eq!(sprite.pixel(0, 0), Some([0, 0, 0, 0]));
        assert_eq!(sprite.pixel(3, 0), None);
    }

    #[test]
    fn garbage_is_a_decode_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("fake.png");
        std::fs::write(&path, b"definitely not a png").unwrap();

        let err = CpuSprite::decode(&path).unwrap_err();
        assert!(err.to_string().contains("fake.png"));
    }
}
