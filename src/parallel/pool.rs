use std::num::NonZeroUsize;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicUsize, Ordering};

use tracing::{debug, error};

use super::slots::ConcurrencySlots;

/// Outcome of one [`WorkerPool::run`] call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PoolReport {
    /// Units dispatched, one per work item.
    pub dispatched: usize,
    /// Units that panicked. Their slot was still released.
    pub panicked: usize,
}

/// Bounded fan-out over a list of work items.
///
/// Every item gets its own unit of work on a scoped thread. The dispatching
/// thread takes a [`ConcurrencySlot`](super::SlotGuard) before each spawn, so at
/// most `limit` units exist at any time and dispatch stalls while the pool is
/// saturated. `run` returns only after every unit has finished.
#[derive(Debug)]
pub struct WorkerPool {
    slots: ConcurrencySlots,
}

impl WorkerPool {
    pub fn new(limit: NonZeroUsize) -> Self {
        Self {
            slots: ConcurrencySlots::new(limit),
        }
    }

    pub fn limit(&self) -> usize {
        self.slots.limit()
    }

    /// Highest number of units that were running at the same time.
    pub fn peak_concurrency(&self) -> usize {
        self.slots.peak()
    }

    /// Run `unit` once per item, at most `limit` at a time, and wait for all of them.
    pub fn run<T, F>(&self, work_items: Vec<T>, unit: F) -> PoolReport
    where
        T: Send,
        F: Fn(T) + Sync,
    {
        let dispatched = work_items.len();
        if dispatched == 0 {
            return PoolReport::default();
        }

        let panicked = AtomicUsize::new(0);
        let unit = &unit;
        let panicked_ref = &panicked;

        let joined = crossbeam::thread::scope(|s| {
            for (index, work_item) in work_items.into_iter().enumerate() {
                let slot = self.slots.acquire();
                debug!(unit = index, in_use = self.slots.in_use(), "dispatching unit");

                s.spawn(move |_| {
                    let _slot = slot;
                    if panic::catch_unwind(AssertUnwindSafe(|| unit(work_item))).is_err() {
                        panicked_ref.fetch_add(1, Ordering::Relaxed);
                        error!(unit = index, "unit of work panicked");
                    }
                });
            }
        });

        // Units catch their own panics, so the scope only fails if that machinery does.
        if joined.is_err() {
            error!("worker scope reported a panic during join");
        }

        PoolReport {
            dispatched,
            panicked: panicked.load(Ordering::Relaxed),
        }
    }
}
