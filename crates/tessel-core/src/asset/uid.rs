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

use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::marker::PhantomData;

/// The underlying integer type of every [`AssetUid`].
pub(crate) type RawAssetUid = u16;

/// A per-kind identifier for one slot of an [`AssetRepository`](super::AssetRepository).
///
/// Identities are handed out by the repository that owns the slot, starting at 1
/// and increasing monotonically. The value 0 is reserved and means "unassigned".
///
/// The kind parameter `T` only exists at the type level: an `AssetUid<Sprite>`
/// cannot be compared with an `AssetUid<Shader>`, which is exactly the point.
/// The raw integer never leaves this crate.
pub struct AssetUid<T> {
    raw: RawAssetUid,
    _kind: PhantomData<fn() -> T>,
}

impl<T> AssetUid<T> {
    /// The reserved, unassigned identity.
    pub const INVALID: Self = Self::from_raw(0);

    /// The first identity a repository hands out.
    pub(crate) const FIRST: Self = Self::from_raw(1);

    pub(crate) const fn from_raw(raw: RawAssetUid) -> Self {
        Self {
            raw,
            _kind: PhantomData,
        }
    }

    /// Returns `true` unless this is the reserved invalid identity.
    pub fn valid(&self) -> bool {
        self.raw != 0
    }

    /// Resets this identity to the invalid value.
    pub fn invalidate(&mut self) {
        self.raw = 0;
    }

    /// The slot index inside the owning repository's record table.
    pub(crate) fn index(self) -> usize {
        usize::from(self.raw)
    }

    /// Returns `true` once the allocator can no longer move past this value.
    pub(crate) fn is_saturated(self) -> bool {
        self.raw == RawAssetUid::MAX
    }

    /// Returns the identity that follows this one, saturating at the maximum.
    pub(crate) fn successor(self) -> Self {
        Self::from_raw(self.raw.saturating_add(1))
    }
}

impl<T> Default for AssetUid<T> {
    fn default() -> Self {
        Self::INVALID
    }
}

impl<T> Clone for AssetUid<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for AssetUid<T> {}

impl<T> PartialEq for AssetUid<T> {
    fn eq(&self, other: &Self) -> bool {
        self.raw == other.raw
    }
}

impl<T> Eq for AssetUid<T> {}

impl<T> PartialOrd for AssetUid<T> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<T> Ord for AssetUid<T> {
    fn cmp(&self, other: &Self) -> Ordering {
        self.raw.cmp(&other.raw)
    }
}

impl<T> Hash for AssetUid<T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.raw.hash(state);
    }
}

impl<T> fmt::Debug for AssetUid<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "AssetUid({})", self.raw)
    }
}

impl<T> fmt::Display for AssetUid<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Texture;

    #[test]
    fn default_is_invalid() {
        let uid = AssetUid::<Texture>::default();
        assert!(!uid.valid());
        assert_eq!(uid, AssetUid::INVALID);
    }

    #[test]
    fn ordering_follows_raw_value() {
        let a = AssetUid::<Texture>::from_raw(3);
        let b = AssetUid::<Texture>::from_raw(7);
        assert!(a < b);
        assert!(b >= a);
        assert_ne!(a, b);
        assert_eq!(a.max(b), b);
    }

    #[test]
    fn invalidate_resets_to_zero() {
        let mut uid = AssetUid::<Texture>::FIRST;
        assert!(uid.valid());
        uid.invalidate();
        assert!(!uid.valid());
    }

    #[test]
    fn successor_saturates() {
        let last = AssetUid::<Texture>::from_raw(u16::MAX);
        assert!(last.is_saturated());
        assert_eq!(last.successor(), last);
        assert_eq!(AssetUid::<Texture>::FIRST.successor().index(), 2);
    }
}
