#![forbid(unsafe_code)]

//! The expansion controller: aggregator, gate, and progress composed.
//!
//! # Data flow
//!
//! ```text
//! InputEvent ─► InputAggregator ─► IntentDelta ─► ArbitrationGate ─► GateAction
//!                                                        │
//!                                     Drive ─► ProgressMachine ─► Transition
//!                                                        │
//!                                                   Effect (timer)
//! ```
//!
//! The controller owns no clock and no listeners. Timers are requested as
//! [`Effect`]s the host executes; the host reports a fired timer back with
//! [`ExpandController::fire_auto_advance`]. Listener attachment is handled
//! by [`ListenerScope`](crate::lifecycle::ListenerScope).
//!
//! # Invariants
//!
//! 1. `progress` stays within `[0, 1]` across any input sequence.
//! 2. A consumed event never changes `released` except through `Reengage`.
//! 3. Reset (explicit or media change) clears progress, `complete`,
//!    `released`, the touch baseline, and cancels any pending auto-advance.
//! 4. At most one auto-advance token is live; firing any other token is a
//!    no-op.

use std::time::Duration;

use serde::Serialize;
use tracing::{debug, debug_span, trace};

use crate::aggregator::{InputAggregator, IntentDelta};
use crate::coalesce::WheelBatch;
use crate::config::{CompleteBehavior, ExpandConfig};
use crate::error::Result;
use crate::event::{InputEvent, TouchPhase};
use crate::gate::{ArbitrationGate, Disposition, GateAction, GateInput};
use crate::media::{MediaElement, MediaIdentity, MediaKind, TitleSplit};
use crate::progress::{self, ProgressMachine};
use crate::viewport::ViewportMetrics;
use crate::visuals::VisualFrame;

// ---------------------------------------------------------------------------
// Placement
// ---------------------------------------------------------------------------

/// Where the controlled element sits in the viewport when an event arrives.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Placement {
    /// Element bottom edge in viewport coordinates (CSS px). `None` when the
    /// host cannot measure it; treated as visible.
    pub element_bottom: Option<f64>,
}

impl Placement {
    pub const UNKNOWN: Self = Self {
        element_bottom: None,
    };

    #[must_use]
    pub const fn at(element_bottom: f64) -> Self {
        Self {
            element_bottom: Some(element_bottom),
        }
    }

    /// Whether the element is far enough into view for backward input to
    /// take control.
    #[must_use]
    pub fn is_reengageable(&self, viewport_height: f64, threshold: f64) -> bool {
        match self.element_bottom {
            Some(bottom) if bottom.is_finite() && viewport_height > 0.0 => {
                bottom >= viewport_height * threshold
            }
            _ => true,
        }
    }
}

// ---------------------------------------------------------------------------
// Effects and responses
// ---------------------------------------------------------------------------

/// Side effect the host must perform on the controller's behalf.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Effect {
    /// Start a timer; call `fire_auto_advance(token)` when it elapses.
    /// Replaces any timer the host still holds.
    ScheduleAutoAdvance { token: u64, delay: Duration },
    /// Drop the timer for `token`.
    CancelAutoAdvance { token: u64 },
    /// Scroll the document to the section after the hero.
    ScrollToNextSection,
}

/// Outcome of one input event.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Response {
    pub disposition: Disposition,
    /// `None` for events that never reached the gate (resize, touch
    /// boundaries, pinch-zoom, garbage input).
    pub action: Option<GateAction>,
    pub effect: Option<Effect>,
}

impl Response {
    const fn ungated() -> Self {
        Self {
            disposition: Disposition::PassThrough,
            action: None,
            effect: None,
        }
    }

    #[inline]
    #[must_use]
    pub fn is_consumed(&self) -> bool {
        self.disposition.is_consumed()
    }
}

/// Result of [`ExpandController::set_media`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaUpdate {
    /// Same kind and source; nothing changed.
    Unchanged,
    /// New media; state was reset and listeners should be cycled.
    Reset { cancel: Option<Effect> },
}

impl MediaUpdate {
    #[must_use]
    pub const fn is_reset(&self) -> bool {
        matches!(self, Self::Reset { .. })
    }
}

/// Serializable view of the controller state.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ControllerSnapshot {
    pub progress: f64,
    pub complete: bool,
    pub released: bool,
    pub content_visible: bool,
    pub last_touch: Option<f64>,
    pub viewport_width: f64,
    pub viewport_height: f64,
    pub is_compact: bool,
    pub media_kind: MediaKind,
    pub media_source: String,
    pub on_complete_behavior: CompleteBehavior,
    pub auto_advance_token: Option<u64>,
}

// ---------------------------------------------------------------------------
// Controller
// ---------------------------------------------------------------------------

/// One mounted expansion hero.
#[derive(Debug, Clone)]
pub struct ExpandController {
    config: ExpandConfig,
    media: MediaIdentity,
    aggregator: InputAggregator,
    machine: ProgressMachine,
    gate: ArbitrationGate,
    viewport: ViewportMetrics,
    pending_advance: Option<u64>,
    generation: u64,
}

impl ExpandController {
    /// Validate `config` and build a controller at progress 0.
    pub fn new(config: ExpandConfig) -> Result<Self> {
        config.validate()?;
        let tuning = config.tuning;
        Ok(Self {
            media: config.media_identity(),
            aggregator: InputAggregator::new(tuning.input_scale()),
            machine: ProgressMachine::new(tuning.content_hide_below),
            gate: ArbitrationGate::new(config.on_complete_behavior, tuning.touch_dead_zone),
            viewport: ViewportMetrics::UNMEASURED,
            pending_advance: None,
            generation: 0,
            config,
        })
    }

    // -- accessors ----------------------------------------------------------

    #[inline]
    #[must_use]
    pub fn progress(&self) -> f64 {
        self.machine.progress()
    }

    #[inline]
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.machine.is_complete()
    }

    #[inline]
    #[must_use]
    pub fn is_released(&self) -> bool {
        self.gate.is_released()
    }

    #[must_use]
    pub fn content_visible(&self) -> bool {
        self.machine.content_visible()
    }

    #[must_use]
    pub fn last_touch(&self) -> Option<f64> {
        self.aggregator.last_touch()
    }

    #[must_use]
    pub fn viewport(&self) -> ViewportMetrics {
        self.viewport
    }

    #[must_use]
    pub fn config(&self) -> &ExpandConfig {
        &self.config
    }

    #[must_use]
    pub fn media(&self) -> &MediaIdentity {
        &self.media
    }

    /// Token of the outstanding auto-advance timer.
    #[must_use]
    pub fn auto_advance_pending(&self) -> Option<u64> {
        self.pending_advance
    }

    #[must_use]
    pub fn media_element(&self) -> MediaElement {
        MediaElement::resolve(
            self.media.kind,
            &self.media.source,
            self.config.poster_source.as_deref(),
            self.config.title.as_deref(),
        )
    }

    #[must_use]
    pub fn title_split(&self) -> TitleSplit {
        self.config.title_split()
    }

    /// Whether the host should snap native scrolling back to the hero.
    #[must_use]
    pub fn should_pin_page(&self) -> bool {
        self.config.pin_page_while_engaged && !self.gate.is_released()
    }

    #[must_use]
    pub fn visuals(&self) -> VisualFrame {
        VisualFrame::compute(
            self.machine.progress(),
            self.machine.content_visible(),
            &self.viewport,
            self.media.kind,
            &self.config.curves,
        )
    }

    #[must_use]
    pub fn state(&self) -> ControllerSnapshot {
        ControllerSnapshot {
            progress: self.machine.progress(),
            complete: self.machine.is_complete(),
            released: self.gate.is_released(),
            content_visible: self.machine.content_visible(),
            last_touch: self.aggregator.last_touch(),
            viewport_width: self.viewport.width,
            viewport_height: self.viewport.height,
            is_compact: self.viewport.is_compact,
            media_kind: self.media.kind,
            media_source: self.media.source.clone(),
            on_complete_behavior: self.gate.behavior(),
            auto_advance_token: self.pending_advance,
        }
    }

    // -- input ----------------------------------------------------------------

    /// Process one input event.
    pub fn handle(&mut self, event: &InputEvent, placement: Placement) -> Response {
        let _span = debug_span!("heroscroll.handle", kind = event.kind()).entered();

        match event {
            InputEvent::Resize { width, height } => {
                self.resize(*width, *height);
                return Response::ungated();
            }
            InputEvent::Touch(touch) if touch.phase != TouchPhase::Move => {
                self.gate.end_touch_gesture();
            }
            _ => {}
        }

        match self.aggregator.process(event) {
            Some(delta) => self.arbitrate(delta, placement),
            None => Response::ungated(),
        }
    }

    /// Process a coalesced run of same-direction wheel deltas.
    ///
    /// Arbitration runs on the first delta of the run. A driving run feeds
    /// the whole total; a re-engaging run feeds everything after its first
    /// event. A forward run that completes before its last event releases,
    /// as that last event would have. The end state equals processing the
    /// events one by one.
    pub fn handle_wheel_batch(&mut self, batch: &WheelBatch, placement: Placement) -> Response {
        let _span = debug_span!("heroscroll.handle", kind = "wheel_batch").entered();

        let Some(first) = self.aggregator.wheel_delta(batch.first_dy) else {
            return Response::ungated();
        };
        if batch.count <= 1 {
            return self.arbitrate(first, placement);
        }

        let progress_before = self.progress();
        let input = self.gate_input(first, placement);
        let action = self.gate.decide(&input);
        let fed_dy = match action {
            GateAction::Drive => batch.total_dy,
            GateAction::Reengage => {
                debug!(progress = progress_before, "re-engaged");
                batch.remainder_dy()
            }
            GateAction::Release => {
                debug!(progress = progress_before, "released to native scrolling");
                0.0
            }
            GateAction::Hold | GateAction::PassThrough => 0.0,
        };
        let effect = match self.aggregator.wheel_delta(fed_dy) {
            Some(delta) if fed_dy != 0.0 => self.feed(delta.value),
            _ => None,
        };

        let completes_early = action == GateAction::Drive
            && first.is_forward()
            && !input.complete
            && self.gate.behavior() == CompleteBehavior::Release
            && self
                .aggregator
                .wheel_delta(batch.leading_dy())
                .is_some_and(|lead| progress::settle(progress_before + lead.value) >= 1.0);
        if completes_early && self.machine.is_complete() {
            self.gate.release();
            debug!(progress = self.progress(), "released to native scrolling");
        }

        trace!(
            action = action.as_str(),
            count = batch.count,
            total_dy = batch.total_dy,
            progress = self.progress(),
            "wheel batch gated"
        );
        Response {
            disposition: action.disposition(),
            action: Some(action),
            effect,
        }
    }

    fn gate_input(&self, delta: IntentDelta, placement: Placement) -> GateInput {
        GateInput {
            delta,
            complete: self.machine.is_complete(),
            visible: placement
                .is_reengageable(self.viewport.height, self.config.tuning.reengage_threshold),
            auto_advance_pending: self.pending_advance.is_some(),
        }
    }

    fn arbitrate(&mut self, delta: IntentDelta, placement: Placement) -> Response {
        let input = self.gate_input(delta, placement);
        let action = self.gate.decide(&input);
        let effect = match action {
            GateAction::Drive => self.feed(delta.value),
            GateAction::Release => {
                debug!(progress = self.progress(), "released to native scrolling");
                None
            }
            GateAction::Reengage => {
                debug!(progress = self.progress(), "re-engaged");
                None
            }
            GateAction::Hold | GateAction::PassThrough => None,
        };
        trace!(
            action = action.as_str(),
            delta = delta.value,
            progress = self.progress(),
            "event gated"
        );
        Response {
            disposition: action.disposition(),
            action: Some(action),
            effect,
        }
    }

    fn feed(&mut self, value: f64) -> Option<Effect> {
        let transition = self.machine.apply(value);
        let mut effect = None;
        if transition.reopened {
            debug!(progress = self.progress(), "expansion reopened");
            effect = self.cancel_auto_advance();
        }
        if transition.completed {
            debug!("expansion complete");
            if self.gate.behavior() == CompleteBehavior::AutoAdvance {
                effect = Some(self.schedule_auto_advance());
            }
        }
        effect
    }

    // -- auto-advance ---------------------------------------------------------

    fn schedule_auto_advance(&mut self) -> Effect {
        self.generation += 1;
        let token = self.generation;
        let delay = self.config.tuning.auto_advance_delay();
        self.pending_advance = Some(token);
        let delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX);
        debug!(token, delay_ms, "auto-advance scheduled");
        Effect::ScheduleAutoAdvance { token, delay }
    }

    fn cancel_auto_advance(&mut self) -> Option<Effect> {
        let token = self.pending_advance.take()?;
        debug!(token, "auto-advance cancelled");
        Some(Effect::CancelAutoAdvance { token })
    }

    /// The host's auto-advance timer elapsed.
    ///
    /// A live token releases the controller and asks the host to scroll to
    /// the next section. Stale tokens are ignored.
    pub fn fire_auto_advance(&mut self, token: u64) -> Option<Effect> {
        if self.pending_advance != Some(token) {
            debug!(token, "stale auto-advance ignored");
            return None;
        }
        self.pending_advance = None;
        self.gate.release();
        debug!(token, "auto-advance fired");
        Some(Effect::ScrollToNextSection)
    }

    // -- lifecycle ------------------------------------------------------------

    /// Host viewport changed. Progress is preserved.
    pub fn resize(&mut self, width: f64, height: f64) {
        let next = ViewportMetrics::from_size(width, height, self.config.curves.compact_breakpoint);
        if next.is_compact != self.viewport.is_compact {
            debug!(width, height, compact = next.is_compact, "layout class changed");
        }
        self.viewport = next;
    }

    /// Return to progress 0. Returns a cancel effect if a timer was pending.
    pub fn reset(&mut self) -> Option<Effect> {
        self.machine.reset();
        self.gate.reset();
        self.aggregator.reset();
        debug!("controller reset");
        self.cancel_auto_advance()
    }

    /// Swap the media. A different kind or source resets all state.
    pub fn set_media(&mut self, media: MediaIdentity) -> MediaUpdate {
        if media == self.media {
            return MediaUpdate::Unchanged;
        }
        debug!(kind = media.kind.as_str(), source = %media.source, "media changed");
        self.config.media_kind = media.kind;
        self.config.media_source.clone_from(&media.source);
        self.media = media;
        MediaUpdate::Reset {
            cancel: self.reset(),
        }
    }

    /// Discard all partial state on unmount.
    pub fn unmount(&mut self) -> Option<Effect> {
        debug!("controller unmounted");
        self.reset()
    }
}
