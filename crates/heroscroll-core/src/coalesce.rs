#![forbid(unsafe_code)]

//! Per-frame wheel coalescing.
//!
//! Trackpads can deliver several wheel events per animation frame. The
//! [`WheelCoalescer`] merges runs of same-direction deltas into one
//! [`WheelBatch`] so the controller runs its arbitration once per run.
//!
//! A direction change closes the current batch: forward and backward
//! deltas never share a batch, so a batch never crosses the point where the
//! gate could flip between driving and re-engaging in opposite directions.
//! Zero deltas form their own direction class.

use crate::event::WheelEvent;

/// A run of same-direction wheel deltas.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WheelBatch {
    /// Raw delta of the first event in the run; arbitration uses it.
    pub first_dy: f64,
    /// Raw delta of the last event in the run.
    pub last_dy: f64,
    /// Sum of every raw delta in the run.
    pub total_dy: f64,
    /// Number of events merged.
    pub count: u32,
}

impl WheelBatch {
    #[must_use]
    pub const fn single(dy: f64) -> Self {
        Self {
            first_dy: dy,
            last_dy: dy,
            total_dy: dy,
            count: 1,
        }
    }

    /// Delta carried by every event after the first.
    #[inline]
    #[must_use]
    pub fn remainder_dy(&self) -> f64 {
        self.total_dy - self.first_dy
    }

    /// Delta carried by every event before the last.
    #[inline]
    #[must_use]
    pub fn leading_dy(&self) -> f64 {
        self.total_dy - self.last_dy
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Direction {
    Forward,
    Backward,
    Still,
}

impl Direction {
    fn of(dy: f64) -> Self {
        if dy > 0.0 {
            Self::Forward
        } else if dy < 0.0 {
            Self::Backward
        } else {
            Self::Still
        }
    }
}

/// Accumulates wheel deltas between frames.
#[derive(Debug, Clone, Default)]
pub struct WheelCoalescer {
    current: Option<(Direction, WheelBatch)>,
}

impl WheelCoalescer {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed one wheel event.
    ///
    /// Returns the previous batch when this event changes direction. Events
    /// that must never be consumed (pinch-zoom, non-finite) are not batched
    /// and return `None` without disturbing the current run.
    pub fn push(&mut self, wheel: &WheelEvent) -> Option<WheelBatch> {
        let dy = wheel.delta_y;
        if wheel.is_pinch_zoom() || !dy.is_finite() {
            return None;
        }
        let dir = Direction::of(dy);
        if let Some((current_dir, batch)) = &mut self.current
            && *current_dir == dir
        {
            batch.total_dy += dy;
            batch.last_dy = dy;
            batch.count += 1;
            return None;
        }
        self.current
            .replace((dir, WheelBatch::single(dy)))
            .map(|(_, batch)| batch)
    }

    /// Take the batch accumulated this frame.
    pub fn drain(&mut self) -> Option<WheelBatch> {
        self.current.take().map(|(_, batch)| batch)
    }

    #[must_use]
    pub fn has_events(&self) -> bool {
        self.current.is_some()
    }
}
