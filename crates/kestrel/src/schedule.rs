//! Trailing-edge coalescing of redraw requests.
//!
//! The scheduler never reads a clock itself; callers pass `now` so hosts can drive it from
//! their own event loop and tests can use synthetic instants.

use std::time::{Duration, Instant};

use crate::geom::{Size, size};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum RedrawReason {
    Resize,
    Render,
    Selection,
}

impl RedrawReason {
    pub const ALL: [RedrawReason; 3] = [
        RedrawReason::Resize,
        RedrawReason::Render,
        RedrawReason::Selection,
    ];

    /// Quiet period after the last request before the redraw fires.
    pub fn window(self) -> Duration {
        match self {
            RedrawReason::Resize => Duration::from_millis(100),
            RedrawReason::Render => Duration::from_millis(5),
            RedrawReason::Selection => Duration::from_millis(100),
        }
    }

    fn slot(self) -> usize {
        self as usize
    }
}

/// What fired in one poll.
#[derive(Debug, Clone, PartialEq)]
pub struct RedrawBatch {
    pub reasons: Vec<RedrawReason>,
    /// Latest observed container size, when a resize fired.
    pub size: Option<Size>,
}

impl RedrawBatch {
    pub fn contains(&self, reason: RedrawReason) -> bool {
        self.reasons.contains(&reason)
    }
}

#[derive(Debug, Clone, Default)]
pub struct RedrawScheduler {
    deadlines: [Option<Instant>; 3],
    observed: Option<Size>,
    cancelled: bool,
}

impl RedrawScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Schedules (or pushes back) a redraw for `reason`.
    pub fn request(&mut self, reason: RedrawReason, now: Instant) {
        if self.cancelled {
            return;
        }
        self.deadlines[reason.slot()] = Some(now + reason.window());
    }

    /// Records a container size. Sizes are floored to whole pixels and an unchanged size
    /// schedules nothing. Returns whether a resize was scheduled.
    pub fn observe_resize(&mut self, container: Size, now: Instant) -> bool {
        if self.cancelled {
            return false;
        }
        let floored = size(container.width.floor(), container.height.floor());
        if self.observed == Some(floored) {
            return false;
        }
        self.observed = Some(floored);
        self.request(RedrawReason::Resize, now);
        true
    }

    pub fn is_pending(&self) -> bool {
        self.deadlines.iter().any(Option::is_some)
    }

    /// Earliest instant at which [`poll`](Self::poll) will return a batch.
    pub fn next_deadline(&self) -> Option<Instant> {
        self.deadlines.iter().flatten().min().copied()
    }

    /// Fires every reason whose quiet period has elapsed.
    pub fn poll(&mut self, now: Instant) -> Option<RedrawBatch> {
        let mut reasons = Vec::new();
        for reason in RedrawReason::ALL {
            let slot = &mut self.deadlines[reason.slot()];
            if slot.is_some_and(|deadline| deadline <= now) {
                *slot = None;
                reasons.push(reason);
            }
        }
        if reasons.is_empty() {
            return None;
        }
        tracing::trace!(?reasons, "redraw");
        let size = reasons
            .contains(&RedrawReason::Resize)
            .then_some(self.observed)
            .flatten();
        Some(RedrawBatch { reasons, size })
    }

    /// Drops every pending redraw; later requests are ignored.
    pub fn cancel(&mut self) {
        self.deadlines = [None; 3];
        self.cancelled = true;
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bursts_collapse_into_one_trailing_redraw() {
        let t0 = Instant::now();
        let mut s = RedrawScheduler::new();
        for i in 0..10 {
            s.request(RedrawReason::Render, t0 + Duration::from_millis(i));
        }
        assert!(s.poll(t0 + Duration::from_millis(10)).is_none());
        let batch = s.poll(t0 + Duration::from_millis(14)).unwrap();
        assert_eq!(batch.reasons, vec![RedrawReason::Render]);
        assert!(s.poll(t0 + Duration::from_secs(1)).is_none());
    }

    #[test]
    fn unchanged_sizes_are_ignored_after_flooring() {
        let t0 = Instant::now();
        let mut s = RedrawScheduler::new();
        assert!(s.observe_resize(size(300.4, 200.9), t0));
        assert!(!s.observe_resize(size(300.9, 200.1), t0));
        let batch = s.poll(t0 + Duration::from_millis(100)).unwrap();
        assert_eq!(batch.size, Some(size(300.0, 200.0)));
    }
}
