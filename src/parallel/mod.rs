//! Bounded parallel execution
//!
//! This module provides the concurrency machinery of a batch run and nothing else.
//!
//! # Architecture Responsibilities
//!
//! ## What This Module Does:
//! - **Admission Control**: [`ConcurrencySlots`] caps how many units run at once
//! - **Fan-out and Join**: [`WorkerPool`] dispatches one unit per work item and waits for all of them
//! - **Progress Counting**: [`ProgressTracker`] counts completed units without lost updates
//!
//! ## What This Module Does NOT Do:
//! - **Domain Logic**: knows nothing about recordings, extractors or reports
//! - **Ordering**: completion order is whatever the OS scheduler produces
//!
//! ```text
//! ┌──────────────┐  acquire   ┌──────────────────┐  spawn   ┌──────────────┐
//! │  Dispatcher  │──────────▶ │ ConcurrencySlots │ ───────▶ │  Unit (file) │
//! │ (caller thd) │  (blocks   │   limit = N      │          │  runs, then  │
//! │              │  when full)│                  │ ◀─────── │  drops slot  │
//! └──────────────┘            └──────────────────┘ release  └──────────────┘
//!         │                                                        │
//!         └──────────────── scope join (barrier) ◀─────────────────┘
//! ```
//!
//! # Example
//!
//! ```rust
//! use std::num::NonZeroUsize;
//! use demoscan::parallel::{ProgressTracker, WorkerPool};
//!
//! let items = vec![1, 2, 3, 4, 5];
//! let progress = ProgressTracker::new(items.len());
//! let pool = WorkerPool::new(NonZeroUsize::new(2).unwrap());
//!
//! pool.run(items, |_item| {
//!     progress.increment();
//! });
//!
//! assert!(progress.is_complete());
//! assert!(pool.peak_concurrency() <= 2);
//! ```

pub mod pool;
pub mod progress;
pub mod slots;

pub use pool::{PoolReport, WorkerPool};
pub use progress::ProgressTracker;
pub use slots::{ConcurrencySlots, SlotGuard};
