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

//! Load states and the shared cell the loader publishes them through.

use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;

/// The lifecycle of a single asset slot.
///
/// ```text
/// Empty -> Queued -> Loading -> LoadingFailed | NotFound | Finished -> Ready
/// ```
///
/// `Ready` is never stored in the shared cell. It only lives in a handle's local
/// snapshot, recording that this particular handle value already synchronized
/// with the loader.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum LoadStatus {
    /// The slot exists but no load was attempted yet.
    #[default]
    Empty = 0,
    /// The backing file vanished between registration and load.
    NotFound,
    /// A load job is waiting in the loader queue.
    Queued,
    /// The loader thread picked up the job.
    Loading,
    /// The decode operation reported an error.
    LoadingFailed,
    /// Decode succeeded and the payload was published.
    Finished,
    /// A handle observed `Finished` and performed the acquire side.
    Ready,
}

impl LoadStatus {
    fn from_u8(value: u8) -> Self {
        match value {
            0 => LoadStatus::Empty,
            1 => LoadStatus::NotFound,
            2 => LoadStatus::Queued,
            3 => LoadStatus::Loading,
            4 => LoadStatus::LoadingFailed,
            5 => LoadStatus::Finished,
            6 => LoadStatus::Ready,
            other => unreachable!("invalid load status discriminant {other}"),
        }
    }

    /// Returns `true` for the two terminal failure states.
    pub fn is_failure(self) -> bool {
        matches!(self, LoadStatus::NotFound | LoadStatus::LoadingFailed)
    }

    /// Returns `true` while a load is pending or running.
    pub fn is_pending(self) -> bool {
        matches!(self, LoadStatus::Queued | LoadStatus::Loading)
    }
}

/// The atomic cell shared by every copy of one handle.
///
/// Progress marks (`Queued`, `Loading`) are relaxed stores: they carry no data.
/// Terminal states are published with release ordering so that every write made
/// by the decode is visible to a reader that pairs the load with an acquire fence.
#[derive(Debug, Default)]
pub(crate) struct LoadStatusCell(AtomicU8);

impl LoadStatusCell {
    pub(crate) fn new(status: LoadStatus) -> Self {
        Self(AtomicU8::new(status as u8))
    }

    /// Relaxed read. Callers that go on to touch the payload must issue an
    /// acquire fence after observing `Finished`.
    pub(crate) fn load_relaxed(&self) -> LoadStatus {
        LoadStatus::from_u8(self.0.load(Ordering::Relaxed))
    }

    pub(crate) fn mark(&self, status: LoadStatus) {
        debug_assert_ne!(status, LoadStatus::Ready);
        self.0.store(status as u8, Ordering::Relaxed);
    }

    pub(crate) fn publish(&self, status: LoadStatus) {
        debug_assert_ne!(status, LoadStatus::Ready);
        self.0.store(status as u8, Ordering::Release);
    }
}

/// A restricted view on a handle's status cell, used by the loader queue.
///
/// A ticket can only move a slot forward through the progress states. Publishing
/// a terminal state is reserved to the repository that owns the payload.
#[derive(Debug, Clone)]
pub struct LoadTicket {
    cell: Arc<LoadStatusCell>,
}

impl LoadTicket {
    pub(crate) fn new(cell: Arc<LoadStatusCell>) -> Self {
        Self { cell }
    }

    /// Marks the slot as waiting in a queue.
    pub fn mark_queued(&self) {
        self.cell.mark(LoadStatus::Queued);
    }

    /// Marks the slot as picked up by a worker.
    pub fn mark_loading(&self) {
        self.cell.mark(LoadStatus::Loading);
    }

    /// The last status written to the shared cell.
    pub fn status(&self) -> LoadStatus {
        self.cell.load_relaxed()
    }
}
