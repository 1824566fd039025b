use std::num::NonZeroUsize;
use std::sync::atomic::{AtomicUsize, Ordering};

use crossbeam::channel::{Receiver, Sender, bounded};

/// Counting admission primitive.
///
/// A bounded channel whose buffered messages are the occupied slots: acquiring
/// sends into it (blocking once `limit` messages are buffered), releasing receives
/// one message back out.
#[derive(Debug)]
pub struct ConcurrencySlots {
    occupied_tx: Sender<()>,
    occupied_rx: Receiver<()>,
    limit: usize,
    active: AtomicUsize,
    peak: AtomicUsize,
}

impl ConcurrencySlots {
    pub fn new(limit: NonZeroUsize) -> Self {
        let (occupied_tx, occupied_rx) = bounded(limit.get());
        Self {
            occupied_tx,
            occupied_rx,
            limit: limit.get(),
            active: AtomicUsize::new(0),
            peak: AtomicUsize::new(0),
        }
    }

    /// Block until a slot is free and take it. The slot is released when the
    /// returned guard is dropped.
    pub fn acquire(&self) -> SlotGuard<'_> {
        // Both channel ends live in `self`, so the channel never disconnects.
        let _ = self.occupied_tx.send(());
        let now = self.active.fetch_add(1, Ordering::AcqRel) + 1;
        self.peak.fetch_max(now, Ordering::AcqRel);
        SlotGuard { slots: self }
    }

    fn release(&self) {
        self.active.fetch_sub(1, Ordering::AcqRel);
        let _ = self.occupied_rx.try_recv();
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    /// Slots currently held.
    pub fn in_use(&self) -> usize {
        self.active.load(Ordering::Acquire)
    }

    /// Highest number of slots ever held at the same time.
    pub fn peak(&self) -> usize {
        self.peak.load(Ordering::Acquire)
    }
}

/// A held concurrency slot. Exactly one release happens on drop, on every exit path.
#[derive(Debug)]
pub struct SlotGuard<'a> {
    slots: &'a ConcurrencySlots,
}

impl Drop for SlotGuard<'_> {
    fn drop(&mut self) {
        self.slots.release();
    }
}
