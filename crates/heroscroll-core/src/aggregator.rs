#![forbid(unsafe_code)]

//! Input aggregation: wheel and touch samples become intent deltas.
//!
//! [`InputAggregator`] is a small stateful processor. Wheel events map to a
//! delta directly; touch moves are measured against the previous touch sample
//! on the scroll axis, so a gesture only produces deltas between a `Start`
//! and the matching `End`/`Cancel`.
//!
//! # Invariants
//!
//! 1. A touch `Move` without a baseline produces no delta.
//! 2. `Start`, `End` and `Cancel` never produce a delta.
//! 3. Non-finite input never produces a delta.
//! 4. The aggregator never touches progress; it only reports intent.

use crate::event::{InputEvent, TouchEvent, TouchPhase, WheelEvent};

/// Which input channel produced a delta.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InputSource {
    Wheel,
    Touch,
}

/// Normalized, signed intent delta (positive = forward).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IntentDelta {
    /// Scaled delta in progress units.
    pub value: f64,
    /// Unscaled pixel delta the value was derived from.
    pub raw: f64,
    pub source: InputSource,
}

impl IntentDelta {
    #[must_use]
    pub const fn new(value: f64, raw: f64, source: InputSource) -> Self {
        Self { value, raw, source }
    }

    #[inline]
    #[must_use]
    pub fn is_forward(&self) -> bool {
        self.value > 0.0
    }

    #[inline]
    #[must_use]
    pub fn is_backward(&self) -> bool {
        self.value < 0.0
    }
}

/// Per-channel scale factors.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InputScale {
    /// Multiplier for wheel `delta_y`.
    pub wheel: f64,
    /// Multiplier for forward (finger moving up) touch deltas.
    pub touch_forward: f64,
    /// Multiplier for backward (finger moving down) touch deltas.
    pub touch_backward: f64,
}

impl InputScale {
    /// One touch scale for both directions.
    #[must_use]
    pub const fn uniform_touch(wheel: f64, touch: f64) -> Self {
        Self {
            wheel,
            touch_forward: touch,
            touch_backward: touch,
        }
    }
}

impl Default for InputScale {
    fn default() -> Self {
        Self {
            wheel: 0.0009,
            touch_forward: 0.005,
            touch_backward: 0.008,
        }
    }
}

/// Stateful wheel/touch normalizer.
#[derive(Debug, Clone)]
pub struct InputAggregator {
    scale: InputScale,
    last_touch: Option<f64>,
}

impl InputAggregator {
    #[must_use]
    pub fn new(scale: InputScale) -> Self {
        Self {
            scale,
            last_touch: None,
        }
    }

    /// Convert one raw event into an intent delta, if it carries one.
    ///
    /// Resize events and touch boundaries return `None`.
    pub fn process(&mut self, event: &InputEvent) -> Option<IntentDelta> {
        match event {
            InputEvent::Wheel(wheel) => self.on_wheel(wheel),
            InputEvent::Touch(touch) => self.on_touch(touch),
            InputEvent::Resize { .. } => None,
        }
    }

    /// Scale a raw wheel delta without any gesture bookkeeping.
    #[must_use]
    pub fn wheel_delta(&self, delta_y: f64) -> Option<IntentDelta> {
        if !delta_y.is_finite() {
            return None;
        }
        Some(IntentDelta::new(
            delta_y * self.scale.wheel,
            delta_y,
            InputSource::Wheel,
        ))
    }

    /// Baseline of the touch gesture in progress.
    #[inline]
    #[must_use]
    pub fn last_touch(&self) -> Option<f64> {
        self.last_touch
    }

    /// Forget any gesture in progress.
    pub fn reset(&mut self) {
        self.last_touch = None;
    }

    #[must_use]
    pub fn scale(&self) -> InputScale {
        self.scale
    }

    pub fn set_scale(&mut self, scale: InputScale) {
        self.scale = scale;
    }

    fn on_wheel(&self, wheel: &WheelEvent) -> Option<IntentDelta> {
        if wheel.is_pinch_zoom() {
            return None;
        }
        self.wheel_delta(wheel.delta_y)
    }

    fn on_touch(&mut self, touch: &TouchEvent) -> Option<IntentDelta> {
        match touch.phase {
            TouchPhase::Start => {
                self.last_touch = touch.y.is_finite().then_some(touch.y);
                None
            }
            TouchPhase::Move => {
                let last = self.last_touch?;
                if !touch.y.is_finite() {
                    return None;
                }
                // Finger moving up the screen is a forward scroll.
                let raw = last - touch.y;
                let factor = if raw < 0.0 {
                    self.scale.touch_backward
                } else {
                    self.scale.touch_forward
                };
                self.last_touch = Some(touch.y);
                Some(IntentDelta::new(raw * factor, raw, InputSource::Touch))
            }
            TouchPhase::End | TouchPhase::Cancel => {
                self.last_touch = None;
                None
            }
        }
    }
}

impl Default for InputAggregator {
    fn default() -> Self {
        Self::new(InputScale::default())
    }
}
