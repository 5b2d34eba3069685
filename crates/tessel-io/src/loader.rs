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

//! The background loader: one worker thread draining a queue of load jobs.

use crate::config::DrainOrder;
use parking_lot::{Condvar, Mutex};
use std::collections::VecDeque;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use tessel_core::asset::{AnyAssetRepository, LoadTicket};
use tessel_core::Result;

/// One pending load: which repository, which slot, which file.
pub(crate) struct LoadJob {
    name: String,
    repository: Arc<dyn AnyAssetRepository>,
    ticket: LoadTicket,
}

impl LoadJob {
    pub(crate) fn new(
        name: &str,
        repository: Arc<dyn AnyAssetRepository>,
        ticket: LoadTicket,
    ) -> Self {
        Self {
            name: name.to_owned(),
            repository,
            ticket,
        }
    }

    pub(crate) fn name(&self) -> &str {
        &self.name
    }

    fn run(self) {
        self.ticket.mark_loading();
        let kind = self.repository.kind();

        match self.repository.load_named(&self.name) {
            Ok(()) => log::trace!("Loader finished {} asset '{}'", kind, self.name),
            Err(e) => log::warn!("Background load of {} asset failed: {}", kind, e),
        }
    }
}

struct QueueState {
    jobs: VecDeque<LoadJob>,
    running: bool,
}

struct LoadQueue {
    state: Mutex<QueueState>,
    wake: Condvar,
    order: DrainOrder,
}

impl LoadQueue {
    fn take(&self, state: &mut QueueState) -> Option<LoadJob> {
        match self.order {
            DrainOrder::Lifo => state.jobs.pop_back(),
            DrainOrder::Fifo => state.jobs.pop_front(),
        }
    }
}

/// Owns the loader thread and its work queue.
///
/// The thread sleeps on a condition variable until a job arrives or a stop is
/// requested. Jobs still queued when the loader stops are dropped, and the slots
/// they refer to stay `Queued` forever.
pub struct AsyncLoader {
    queue: Arc<LoadQueue>,
    worker: Mutex<Option<JoinHandle<()>>>,
}

impl AsyncLoader {
    /// Creates a stopped loader.
    pub fn new(order: DrainOrder) -> Self {
        Self {
            queue: Arc::new(LoadQueue {
                state: Mutex::new(QueueState {
                    jobs: VecDeque::new(),
                    running: false,
                }),
                wake: Condvar::new(),
                order,
            }),
            worker: Mutex::new(None),
        }
    }

    /// The order in which queued jobs are taken.
    pub fn drain_order(&self) -> DrainOrder {
        self.queue.order
    }

    /// Spawns the worker thread. Does nothing if it is already running.
    pub fn start(&self) -> Result<()> {
        let mut worker = self.worker.lock();
        if worker.is_some() {
            return Ok(());
        }

        self.queue.state.lock().running = true;
        let queue = Arc::clone(&self.queue);
        let spawned = thread::Builder::new()
            .name("tessel-asset-loader".to_owned())
            .spawn(move || worker_loop(&queue));

        match spawned {
            Ok(handle) => {
                *worker = Some(handle);
                log::info!(
                    "Asset loader thread started ({:?} drain order).",
                    self.queue.order
                );
                Ok(())
            }
            Err(e) => {
                self.queue.state.lock().running = false;
                Err(e.into())
            }
        }
    }

    /// Stops the worker, waits for the job in flight, and drops every job that
    /// was still queued. Returns the number of dropped jobs.
    pub fn stop(&self) -> usize {
        let mut worker = self.worker.lock();
        let Some(handle) = worker.take() else {
            return 0;
        };

        self.queue.state.lock().running = false;
        self.queue.wake.notify_all();

        if handle.join().is_err() {
            log::error!("Asset loader thread panicked.");
        }

        let abandoned = {
            let mut state = self.queue.state.lock();
            let count = state.jobs.len();
            state.jobs.clear();
            count
        };
        log::info!(
            "Asset loader thread stopped ({} queued job(s) abandoned).",
            abandoned
        );
        abandoned
    }

    /// Returns `true` between a `start` and the matching `stop`.
    pub fn is_running(&self) -> bool {
        self.queue.state.lock().running
    }

    /// The number of jobs waiting in the queue. The job in flight is not counted.
    pub fn pending(&self) -> usize {
        self.queue.state.lock().jobs.len()
    }

    /// Queues a job and wakes the worker. Hands the job back if the loader is
    /// not running.
    pub(crate) fn enqueue(&self, job: LoadJob) -> std::result::Result<(), LoadJob> {
        {
            let mut state = self.queue.state.lock();
            if !state.running {
                return Err(job);
            }
            job.ticket.mark_queued();
            state.jobs.push_back(job);
        }
        self.queue.wake.notify_one();
        Ok(())
    }
}

impl Drop for AsyncLoader {
    fn drop(&mut self) {
        self.stop();
    }
}

fn worker_loop(queue: &LoadQueue) {
    log::debug!("Asset loader thread waiting for jobs.");

    loop {
        let job = {
            let mut state = queue.state.lock();
            while state.running && state.jobs.is_empty() {
                queue.wake.wait(&mut state);
            }
            if !state.running {
                break;
            }
            queue.take(&mut state)
        };

        if let Some(job) = job {
            let name = job.name.clone();
            // A panicking decode must not take the loader down with it.
            if panic::catch_unwind(AssertUnwindSafe(|| job.run())).is_err() {
                log::error!("Decoding '{}' panicked on the loader thread.", name);
            }
        }
    }

    log::debug!("Asset loader thread exiting.");
}
