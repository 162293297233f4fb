#![forbid(unsafe_code)]

//! Platform-independent host core.
//!
//! Wraps an [`ExpandController`] with what a browser host needs on top of
//! it: JSON config and input decoding, per-frame wheel coalescing, an
//! effect queue the timer layer drains, and serialized snapshots. The
//! wasm bindings and the native tests both drive this type; no JS types
//! appear here.

use heroscroll_core::{
    ConfigError, ControllerSnapshot, Effect, ExpandConfig, ExpandController, InputEvent,
    MediaIdentity, MediaKind, MediaUpdate, Placement, Response, VisualFrame, WheelBatch,
    WheelCoalescer,
};
use serde::Serialize;
use tracing::debug;

use crate::input::{HostInput, InputParseError, parse_host_batch, parse_host_input};
use crate::style::FrameStyles;

/// Errors surfaced at the binding boundary.
#[derive(Debug, thiserror::Error)]
pub enum HostError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Input(#[from] InputParseError),
    #[error("unknown media kind: {0}")]
    UnknownMediaKind(String),
    #[error("serialization failed: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Running tallies of dispatched input.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HostStats {
    pub events: u64,
    pub consumed: u64,
    pub passed_through: u64,
    pub batches: u64,
}

/// The controller plus host bookkeeping.
#[derive(Debug)]
pub struct HostCore {
    controller: ExpandController,
    coalescer: WheelCoalescer,
    effects: Vec<Effect>,
    stats: HostStats,
}

impl HostCore {
    pub fn new(config: ExpandConfig) -> Result<Self, HostError> {
        Ok(Self {
            controller: ExpandController::new(config)?,
            coalescer: WheelCoalescer::new(),
            effects: Vec::new(),
            stats: HostStats::default(),
        })
    }

    pub fn from_config_json(json: &str) -> Result<Self, HostError> {
        Self::new(ExpandConfig::from_json_str(json)?)
    }

    #[must_use]
    pub fn controller(&self) -> &ExpandController {
        &self.controller
    }

    #[must_use]
    pub fn stats(&self) -> HostStats {
        self.stats
    }

    /// Dispatch one live event. Effects are queued for [`take_effects`](Self::take_effects).
    pub fn handle(&mut self, event: &InputEvent, placement: Placement) -> Response {
        let response = self.controller.handle(event, placement);
        self.record(&response);
        response
    }

    /// Decode and dispatch one encoded input.
    pub fn handle_encoded(&mut self, json: &str) -> Result<Response, HostError> {
        let input = parse_host_input(json)?;
        Ok(self.handle(&input.event, input.placement))
    }

    /// Dispatch a frame's worth of encoded inputs.
    ///
    /// Consecutive wheel events measured at the same placement are
    /// coalesced. A placement change or any other event flushes the pending
    /// wheel batch first, so ordering and per-event visibility checks are
    /// preserved. Returns one response per dispatched unit.
    pub fn handle_encoded_frame(&mut self, json: &str) -> Result<Vec<Response>, HostError> {
        let inputs = parse_host_batch(json)?;
        Ok(self.handle_frame(&inputs))
    }

    pub fn handle_frame(&mut self, inputs: &[HostInput]) -> Vec<Response> {
        let mut responses = Vec::new();
        let mut placement = Placement::UNKNOWN;
        for input in inputs {
            match input.wheel_event() {
                Some(wheel) if !wheel.is_pinch_zoom() && wheel.delta_y.is_finite() => {
                    if self.coalescer.has_events()
                        && input.placement != placement
                        && let Some(batch) = self.coalescer.drain()
                    {
                        responses.push(self.dispatch_batch(&batch, placement));
                    }
                    if !self.coalescer.has_events() {
                        placement = input.placement;
                    }
                    if let Some(batch) = self.coalescer.push(wheel) {
                        responses.push(self.dispatch_batch(&batch, placement));
                        placement = input.placement;
                    }
                }
                _ => {
                    if let Some(batch) = self.coalescer.drain() {
                        responses.push(self.dispatch_batch(&batch, placement));
                    }
                    responses.push(self.handle(&input.event, input.placement));
                }
            }
        }
        if let Some(batch) = self.coalescer.drain() {
            responses.push(self.dispatch_batch(&batch, placement));
        }
        responses
    }

    fn dispatch_batch(&mut self, batch: &WheelBatch, placement: Placement) -> Response {
        let response = self.controller.handle_wheel_batch(batch, placement);
        self.stats.batches += 1;
        self.stats.events += u64::from(batch.count.saturating_sub(1));
        self.record(&response);
        response
    }

    fn record(&mut self, response: &Response) {
        self.stats.events += 1;
        if response.is_consumed() {
            self.stats.consumed += 1;
        } else {
            self.stats.passed_through += 1;
        }
        if let Some(effect) = response.effect {
            self.effects.push(effect);
        }
    }

    /// The host timer for `token` elapsed.
    pub fn fire_auto_advance(&mut self, token: u64) -> Option<Effect> {
        let effect = self.controller.fire_auto_advance(token);
        self.effects.extend(effect);
        effect
    }

    pub fn resize(&mut self, width: f64, height: f64) {
        self.controller.resize(width, height);
    }

    /// Switch media by kind label (`"video"` / `"image"`) and source.
    pub fn set_media(&mut self, kind: &str, source: &str) -> Result<MediaUpdate, HostError> {
        let kind =
            MediaKind::parse(kind).ok_or_else(|| HostError::UnknownMediaKind(kind.to_owned()))?;
        let update = self
            .controller
            .set_media(MediaIdentity::new(kind, source));
        if let MediaUpdate::Reset { cancel } = update {
            self.effects.extend(cancel);
            self.coalescer = WheelCoalescer::new();
        }
        Ok(update)
    }

    pub fn reset(&mut self) {
        let cancel = self.controller.reset();
        self.effects.extend(cancel);
        self.coalescer = WheelCoalescer::new();
    }

    pub fn unmount(&mut self) {
        let cancel = self.controller.unmount();
        self.effects.extend(cancel);
        self.coalescer = WheelCoalescer::new();
        debug!(events = self.stats.events, "host unmounted");
    }

    /// Drain queued effects in emission order.
    pub fn take_effects(&mut self) -> Vec<Effect> {
        std::mem::take(&mut self.effects)
    }

    #[must_use]
    pub fn state(&self) -> ControllerSnapshot {
        self.controller.state()
    }

    pub fn state_json(&self) -> Result<String, HostError> {
        Ok(serde_json::to_string(&self.controller.state())?)
    }

    #[must_use]
    pub fn frame(&self) -> VisualFrame {
        self.controller.visuals()
    }

    pub fn frame_json(&self) -> Result<String, HostError> {
        Ok(serde_json::to_string(&self.controller.visuals())?)
    }

    #[must_use]
    pub fn styles(&self) -> FrameStyles {
        FrameStyles::from_frame(&self.controller.visuals(), &self.controller.config().curves)
    }
}
