use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, PoisonError};

/// Completed-unit counter shared by all workers of one run.
///
/// The total is fixed at construction. `increment` is a single atomic add, so
/// concurrent callers never lose an update and each caller sees a distinct count.
#[derive(Debug)]
pub struct ProgressTracker {
    completed: AtomicUsize,
    total: usize,
    announce: Mutex<()>,
}

impl ProgressTracker {
    pub fn new(total: usize) -> Self {
        Self {
            completed: AtomicUsize::new(0),
            total,
            announce: Mutex::new(()),
        }
    }

    /// Record one finished unit and hand `(completed, total)` to `announce`.
    ///
    /// Counting and announcing happen under one lock, so announcements arrive in
    /// counter order. The count is taken before `announce` runs and stays taken
    /// even if it panics.
    pub fn advance(&self, announce: impl FnOnce(usize, usize)) -> usize {
        let _ordered = self.announce.lock().unwrap_or_else(PoisonError::into_inner);
        let now = self.increment();
        announce(now, self.total);
        now
    }

    /// Record one finished unit and return the new completed count.
    pub fn increment(&self) -> usize {
        let now = self.completed.fetch_add(1, Ordering::AcqRel) + 1;
        debug_assert!(now <= self.total, "completed {now} of {} units", self.total);
        now
    }

    pub fn completed(&self) -> usize {
        self.completed.load(Ordering::Acquire)
    }

    pub fn total(&self) -> usize {
        self.total
    }

    pub fn is_complete(&self) -> bool {
        self.completed() == self.total
    }

    /// Human-readable `K/N files processed`.
    pub fn message(completed: usize, total: usize) -> String {
        format!("{completed}/{total} files processed")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[test]
    fn test_increment_returns_new_count() {
        let tracker = ProgressTracker::new(3);
        assert_eq!(tracker.increment(), 1);
        assert_eq!(tracker.increment(), 2);
        assert!(!tracker.is_complete());
        assert_eq!(tracker.increment(), 3);
        assert!(tracker.is_complete());
        assert_eq!(tracker.total(), 3);
    }

    #[test]
    fn test_concurrent_increments_are_exact() {
        let tracker = ProgressTracker::new(8 * 250);
        let observed = Mutex::new(Vec::new());

        crossbeam::thread::scope(|s| {
            for _ in 0..8 {
                s.spawn(|_| {
                    let mut local = Vec::with_capacity(250);
                    for _ in 0..250 {
                        local.push(tracker.increment());
                    }
                    observed.lock().unwrap().extend(local);
                });
            }
        })
        .unwrap();

        assert_eq!(tracker.completed(), 2000);
        let mut observed = observed.into_inner().unwrap();
        observed.sort();
        assert_eq!(observed, (1..=2000).collect::<Vec<_>>());
    }

    #[test]
    fn test_advance_announces_in_counter_order() {
        let tracker = ProgressTracker::new(4);
        let announced = Mutex::new(Vec::new());

        crossbeam::thread::scope(|s| {
            for _ in 0..4 {
                s.spawn(|_| {
                    tracker.advance(|completed, _total| {
                        // Slow down the first announcement so a racing worker would overtake it.
                        if completed == 1 {
                            std::thread::sleep(std::time::Duration::from_millis(50));
                        }
                        announced.lock().unwrap().push(completed);
                    });
                });
            }
        })
        .unwrap();

        assert_eq!(announced.into_inner().unwrap(), vec![1, 2, 3, 4]);
        assert!(tracker.is_complete());
    }

    #[test]
    fn test_advance_counts_even_if_announce_panics() {
        let tracker = ProgressTracker::new(2);
        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            tracker.advance(|_, _| panic!("announce failed"));
        }));
        assert!(result.is_err());
        assert_eq!(tracker.completed(), 1);
        assert_eq!(tracker.advance(|_, _| {}), 2);
    }

    #[test]
    fn test_message_format() {
        assert_eq!(ProgressTracker::message(2, 5), "2/5 files processed");
    }
}
