#![forbid(unsafe_code)]

//! Bounded expansion progress with an edge-triggered completion flag.
//!
//! # State Machine
//!
//! - **Expanding**: `0 <= progress < 1`, or `progress == 1` before the
//!   completion edge has been observed.
//! - **Expanded**: `complete == true`.
//!
//! Applying a delta `d`:
//!
//! 1. `progress' = clamp(progress + d, 0, 1)`, snapped onto 1 when within
//!    [`COMPLETE_SNAP`] of it
//! 2. `d < 0` while complete clears `complete` (the transform reverses).
//! 3. `progress' >= 1` while not complete sets `complete` (fires once per
//!    forward pass).
//! 4. `progress = progress'`
//!
//! # Invariants
//!
//! 1. `progress` is finite and within `[0, 1]` after every call.
//! 2. `complete` does not imply `progress == 1`; it only rises at the bound.
//! 3. Content visibility rises with `complete` and falls only once progress
//!    drops below the hide threshold.

/// Distance below 1 within which progress snaps onto the bound. Sums of
/// scaled deltas drift by a few ULPs; without the snap an exact total of 1
/// could stop just short of completion.
pub const COMPLETE_SNAP: f64 = 1e-9;

/// Clamp to `[0, 1]`, snapping values within [`COMPLETE_SNAP`] of 1 onto it.
#[must_use]
pub fn settle(value: f64) -> f64 {
    let clamped = value.clamp(0.0, 1.0);
    if clamped >= 1.0 - COMPLETE_SNAP {
        1.0
    } else {
        clamped
    }
}

/// What changed during one [`ProgressMachine::apply`] call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Transition {
    /// `complete` rose on this update.
    pub completed: bool,
    /// `complete` fell on this update.
    pub reopened: bool,
}

/// Progress scalar plus completion flag.
#[derive(Debug, Clone, PartialEq)]
pub struct ProgressMachine {
    progress: f64,
    complete: bool,
    content_visible: bool,
    content_hide_below: f64,
}

impl ProgressMachine {
    /// `content_hide_below` is the progress under which revealed content hides again.
    #[must_use]
    pub fn new(content_hide_below: f64) -> Self {
        Self {
            progress: 0.0,
            complete: false,
            content_visible: false,
            content_hide_below,
        }
    }

    #[inline]
    #[must_use]
    pub fn progress(&self) -> f64 {
        self.progress
    }

    #[inline]
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.complete
    }

    /// Whether the content under the media should be shown.
    #[inline]
    #[must_use]
    pub fn content_visible(&self) -> bool {
        self.content_visible
    }

    /// Apply one consumed intent delta.
    pub fn apply(&mut self, delta: f64) -> Transition {
        let mut transition = Transition::default();
        if !delta.is_finite() {
            return transition;
        }

        let next = settle(self.progress + delta);

        if delta < 0.0 && self.complete {
            self.complete = false;
            transition.reopened = true;
        }
        if next >= 1.0 && !self.complete {
            self.complete = true;
            transition.completed = true;
        }
        self.progress = next;

        if self.complete {
            self.content_visible = true;
        } else if self.progress < self.content_hide_below {
            self.content_visible = false;
        }

        transition
    }

    /// Return to the initial expanding state.
    pub fn reset(&mut self) {
        self.progress = 0.0;
        self.complete = false;
        self.content_visible = false;
    }
}

impl Default for ProgressMachine {
    fn default() -> Self {
        Self::new(0.75)
    }
}
