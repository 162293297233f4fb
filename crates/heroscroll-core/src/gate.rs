#![forbid(unsafe_code)]

//! Scroll arbitration: who owns an input event, the controller or the page.
//!
//! The gate sees each intent delta together with the progress state and
//! the element's visibility and picks one [`GateAction`]. Every action maps
//! to exactly one [`Disposition`]; consumed events must have their native
//! scroll suppressed by the host, passed-through events must not.
//!
//! # Decision table
//!
//! | released | complete | direction | action |
//! |----------|----------|-----------|--------|
//! | no  | no  | any      | `Drive` |
//! | no  | yes | forward  | per [`CompleteBehavior`]: `Hold` or `Release` |
//! | no  | yes | backward | `Drive` if visible, else `PassThrough` |
//! | no  | yes | zero     | `Hold` |
//! | yes | *   | backward | `Reengage` if visible (touch: past the dead zone), else `PassThrough` |
//! | yes | *   | forward/zero | `PassThrough` |
//!
//! # Invariants
//!
//! 1. `released` only rises through `Release` (or an explicit
//!    [`ArbitrationGate::release`]) and only falls through `Reengage` or
//!    [`ArbitrationGate::reset`].
//! 2. Only `Drive` feeds the delta into progress.

use crate::aggregator::{InputSource, IntentDelta};
use crate::config::CompleteBehavior;

/// Whether the host must suppress native scrolling for an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Disposition {
    /// The controller used the event; call `preventDefault`.
    Consume,
    /// Native scrolling handles the event.
    PassThrough,
}

impl Disposition {
    #[inline]
    #[must_use]
    pub const fn is_consumed(self) -> bool {
        matches!(self, Self::Consume)
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Consume => "consume",
            Self::PassThrough => "pass_through",
        }
    }
}

/// Per-event arbitration outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GateAction {
    /// Consume and feed the delta into progress.
    Drive,
    /// Consume without feeding (expanded, holding the page).
    Hold,
    /// Hand control to native scrolling for this pass.
    Release,
    /// Take control back from native scrolling. The event itself is
    /// consumed but not fed.
    Reengage,
    /// Leave the event to native scrolling.
    PassThrough,
}

impl GateAction {
    #[must_use]
    pub const fn disposition(self) -> Disposition {
        match self {
            Self::Drive | Self::Hold | Self::Reengage => Disposition::Consume,
            Self::Release | Self::PassThrough => Disposition::PassThrough,
        }
    }

    #[inline]
    #[must_use]
    pub const fn feeds_progress(self) -> bool {
        matches!(self, Self::Drive)
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Drive => "drive",
            Self::Hold => "hold",
            Self::Release => "release",
            Self::Reengage => "reengage",
            Self::PassThrough => "pass_through",
        }
    }
}

/// Everything the gate needs to know about one event.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GateInput {
    pub delta: IntentDelta,
    pub complete: bool,
    /// The element is far enough into view for backward input to take over.
    pub visible: bool,
    /// An auto-advance timer is outstanding.
    pub auto_advance_pending: bool,
}

/// Released flag plus the decision table.
#[derive(Debug, Clone, PartialEq)]
pub struct ArbitrationGate {
    released: bool,
    behavior: CompleteBehavior,
    touch_dead_zone: f64,
    /// Backward touch travel (px, negative) accumulated while released.
    touch_travel: f64,
}

impl ArbitrationGate {
    #[must_use]
    pub fn new(behavior: CompleteBehavior, touch_dead_zone: f64) -> Self {
        Self {
            released: false,
            behavior,
            touch_dead_zone,
            touch_travel: 0.0,
        }
    }

    #[inline]
    #[must_use]
    pub fn is_released(&self) -> bool {
        self.released
    }

    #[must_use]
    pub fn behavior(&self) -> CompleteBehavior {
        self.behavior
    }

    /// Decide the action for one event and update `released`.
    pub fn decide(&mut self, input: &GateInput) -> GateAction {
        let delta = input.delta;
        if self.released {
            return self.decide_released(input);
        }
        if !input.complete {
            return GateAction::Drive;
        }
        if delta.is_forward() {
            return match self.behavior {
                CompleteBehavior::Hold => GateAction::Hold,
                CompleteBehavior::AutoAdvance if input.auto_advance_pending => GateAction::Hold,
                CompleteBehavior::Release | CompleteBehavior::AutoAdvance => {
                    self.release();
                    GateAction::Release
                }
            };
        }
        if delta.is_backward() {
            return if input.visible {
                GateAction::Drive
            } else {
                GateAction::PassThrough
            };
        }
        GateAction::Hold
    }

    fn decide_released(&mut self, input: &GateInput) -> GateAction {
        let delta = input.delta;
        if !delta.is_backward() {
            self.touch_travel = 0.0;
            return GateAction::PassThrough;
        }
        if !input.visible {
            return GateAction::PassThrough;
        }
        if delta.source == InputSource::Touch {
            self.touch_travel += delta.raw;
            if self.touch_travel >= -self.touch_dead_zone {
                return GateAction::PassThrough;
            }
        }
        self.released = false;
        self.touch_travel = 0.0;
        GateAction::Reengage
    }

    /// Release without an input event (auto-advance firing).
    pub fn release(&mut self) {
        self.released = true;
        self.touch_travel = 0.0;
    }

    /// A touch gesture began or ended; drop accumulated travel.
    pub fn end_touch_gesture(&mut self) {
        self.touch_travel = 0.0;
    }

    pub fn reset(&mut self) {
        self.released = false;
        self.touch_travel = 0.0;
    }
}
