//! Rate limiting for interaction callbacks.

use std::time::{Duration, Instant};

/// Throttle with a guaranteed final delivery.
///
/// At most one value passes per `interval`; the first offer goes through
/// immediately, later offers inside the window are coalesced into a pending
/// slot. The gesture handler calls [`Throttle::flush`] when the gesture ends
/// so the final state is always delivered, even if it arrived mid-window.
///
/// Time is passed in explicitly, which keeps the type trivially testable in
/// a single-threaded harness.
#[derive(Debug)]
pub struct Throttle<T> {
    interval: Duration,
    last_emit: Option<Instant>,
    pending: Option<T>,
}

impl<T> Throttle<T> {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            last_emit: None,
            pending: None,
        }
    }

    /// Offer a value; returns it when the window permits, otherwise stores it
    /// as pending and returns `None`.
    pub fn offer(&mut self, value: T, now: Instant) -> Option<T> {
        match self.last_emit {
            Some(t) if now.duration_since(t) < self.interval => {
                self.pending = Some(value);
                None
            }
            _ => {
                self.last_emit = Some(now);
                self.pending = None;
                Some(value)
            }
        }
    }

    /// Deliver whatever is still pending, regardless of the window.
    pub fn flush(&mut self) -> Option<T> {
        self.pending.take()
    }

    pub fn has_pending(&self) -> bool {
        self.pending.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_and_final_are_delivered() {
        let mut t: Throttle<i32> = Throttle::new(Duration::from_millis(100));
        let t0 = Instant::now();
        assert_eq!(t.offer(1, t0), Some(1));
        // Rapid updates inside the window coalesce.
        assert_eq!(t.offer(2, t0 + Duration::from_millis(10)), None);
        assert_eq!(t.offer(3, t0 + Duration::from_millis(20)), None);
        // Drag ends mid-window: the final state still comes out.
        assert_eq!(t.flush(), Some(3));
        assert_eq!(t.flush(), None);
    }

    #[test]
    fn window_elapse_reopens_delivery() {
        let mut t: Throttle<i32> = Throttle::new(Duration::from_millis(100));
        let t0 = Instant::now();
        assert_eq!(t.offer(1, t0), Some(1));
        assert_eq!(t.offer(2, t0 + Duration::from_millis(50)), None);
        assert_eq!(t.offer(3, t0 + Duration::from_millis(150)), Some(3));
        // The coalesced value was superseded by the delivered one.
        assert!(!t.has_pending());
    }
}
