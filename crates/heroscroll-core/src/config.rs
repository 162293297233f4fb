#![forbid(unsafe_code)]

//! Construction options and tuning for the expansion controller.
//!
//! Everything a host can configure lives in one [`ExpandConfig`] that loads
//! from JSON (always) or TOML (feature `config-toml`). Field names are
//! camelCase so the same document works as a `wasm-bindgen` argument.
//!
//! ```json
//! {
//!   "mediaKind": "video",
//!   "mediaSource": "https://cdn.example/hero.mp4",
//!   "title": "Immersive Video Experience",
//!   "onCompleteBehavior": "autoAdvance",
//!   "tuning": { "wheelScale": 0.001 }
//! }
//! ```
//!
//! # Defaults
//!
//! Every tuning and curve field defaults to the values the hero section
//! ships with, so a config that names only the media is complete.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::aggregator::InputScale;
use crate::error::{ConfigError, Result};
use crate::media::{MediaElement, MediaIdentity, MediaKind, TitleSplit};

// ---------------------------------------------------------------------------
// Completion behavior
// ---------------------------------------------------------------------------

/// What happens to forward input once the media is fully expanded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum CompleteBehavior {
    /// Keep consuming forward input; the page never scrolls past on its own.
    Hold,
    /// Hand the next forward event to native scrolling.
    #[default]
    Release,
    /// Schedule a scroll to the next section; release when it fires.
    AutoAdvance,
}

impl CompleteBehavior {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Hold => "hold",
            Self::Release => "release",
            Self::AutoAdvance => "autoAdvance",
        }
    }
}

// ---------------------------------------------------------------------------
// Input tuning
// ---------------------------------------------------------------------------

/// Input scaling and arbitration thresholds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ScrollTuning {
    /// Progress per wheel pixel.
    pub wheel_scale: f64,
    /// Progress per pixel of upward finger travel.
    pub touch_forward_scale: f64,
    /// Progress per pixel of downward finger travel.
    pub touch_backward_scale: f64,
    /// Element bottom must be at or below this fraction of the viewport
    /// height for backward input to re-engage.
    pub reengage_threshold: f64,
    /// Minimum backward touch travel (px) that re-engages a released
    /// controller.
    pub touch_dead_zone: f64,
    /// Revealed content hides again below this progress.
    pub content_hide_below: f64,
    /// Delay between completion and the auto-advance scroll.
    pub auto_advance_delay_ms: u64,
}

impl Default for ScrollTuning {
    fn default() -> Self {
        let scale = InputScale::default();
        Self {
            wheel_scale: scale.wheel,
            touch_forward_scale: scale.touch_forward,
            touch_backward_scale: scale.touch_backward,
            reengage_threshold: 0.9,
            touch_dead_zone: 20.0,
            content_hide_below: 0.75,
            auto_advance_delay_ms: 600,
        }
    }
}

impl ScrollTuning {
    #[must_use]
    pub fn input_scale(&self) -> InputScale {
        InputScale {
            wheel: self.wheel_scale,
            touch_forward: self.touch_forward_scale,
            touch_backward: self.touch_backward_scale,
        }
    }

    #[must_use]
    pub fn auto_advance_delay(&self) -> Duration {
        Duration::from_millis(self.auto_advance_delay_ms)
    }

    fn validate(&self) -> Result<()> {
        non_negative("wheelScale", self.wheel_scale)?;
        non_negative("touchForwardScale", self.touch_forward_scale)?;
        non_negative("touchBackwardScale", self.touch_backward_scale)?;
        non_negative("touchDeadZone", self.touch_dead_zone)?;
        unit_interval("reengageThreshold", self.reengage_threshold)?;
        unit_interval("contentHideBelow", self.content_hide_below)?;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Size curves
// ---------------------------------------------------------------------------

/// Geometry of the expansion transform.
///
/// Title offsets are in viewport-width percent per unit of progress.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SizeCurves {
    pub base_width: f64,
    pub base_height: f64,
    pub wide_max_width: f64,
    pub wide_max_height: f64,
    pub compact_max_width: f64,
    pub compact_max_height: f64,
    /// Viewports narrower than this use the compact curves.
    pub compact_breakpoint: f64,
    /// Media never exceeds this fraction of the viewport width.
    pub max_viewport_width: f64,
    /// Media never exceeds this fraction of the viewport height.
    pub max_viewport_height: f64,
    pub max_corner_radius: f64,
    pub wide_title_offset_vw: f64,
    pub compact_title_offset_vw: f64,
    pub text_falloff: f64,
    /// Background starts fading at this progress.
    pub background_fade_start: f64,
    pub background_base_opacity: f64,
}

impl Default for SizeCurves {
    fn default() -> Self {
        Self {
            base_width: 300.0,
            base_height: 400.0,
            wide_max_width: 1550.0,
            wide_max_height: 800.0,
            compact_max_width: 950.0,
            compact_max_height: 600.0,
            compact_breakpoint: 768.0,
            max_viewport_width: 0.95,
            max_viewport_height: 0.9,
            max_corner_radius: 12.0,
            wide_title_offset_vw: 150.0,
            compact_title_offset_vw: 180.0,
            text_falloff: 1.5,
            background_fade_start: 0.8,
            background_base_opacity: 1.0,
        }
    }
}

impl SizeCurves {
    /// `(max_width, max_height)` for the given layout class.
    #[must_use]
    pub fn max_size(&self, compact: bool) -> (f64, f64) {
        if compact {
            (self.compact_max_width, self.compact_max_height)
        } else {
            (self.wide_max_width, self.wide_max_height)
        }
    }

    #[must_use]
    pub fn title_offset_vw(&self, compact: bool) -> f64 {
        if compact {
            self.compact_title_offset_vw
        } else {
            self.wide_title_offset_vw
        }
    }

    fn validate(&self) -> Result<()> {
        for (field, value) in [
            ("baseWidth", self.base_width),
            ("baseHeight", self.base_height),
            ("maxCornerRadius", self.max_corner_radius),
            ("wideTitleOffsetVw", self.wide_title_offset_vw),
            ("compactTitleOffsetVw", self.compact_title_offset_vw),
        ] {
            non_negative(field, value)?;
        }
        for (field, base, max) in [
            ("wideMaxWidth", self.base_width, self.wide_max_width),
            ("wideMaxHeight", self.base_height, self.wide_max_height),
            ("compactMaxWidth", self.base_width, self.compact_max_width),
            ("compactMaxHeight", self.base_height, self.compact_max_height),
        ] {
            if !max.is_finite() || max < base {
                return Err(ConfigError::InvertedSizeCurve { field, base, max });
            }
        }
        if !self.compact_breakpoint.is_finite() || self.compact_breakpoint <= 0.0 {
            return Err(ConfigError::InvalidBreakpoint {
                value: self.compact_breakpoint,
            });
        }
        unit_interval("maxViewportWidth", self.max_viewport_width)?;
        unit_interval("maxViewportHeight", self.max_viewport_height)?;
        unit_interval("backgroundBaseOpacity", self.background_base_opacity)?;
        // The fade divides by (1 - start).
        if !(self.background_fade_start > 0.0 && self.background_fade_start < 1.0) {
            return Err(ConfigError::FractionOutOfRange {
                field: "backgroundFadeStart",
                value: self.background_fade_start,
            });
        }
        if !self.text_falloff.is_finite() || self.text_falloff <= 1.0 {
            return Err(ConfigError::FalloffTooSmall {
                value: self.text_falloff,
            });
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// ExpandConfig
// ---------------------------------------------------------------------------

/// Construction options for one expansion hero.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExpandConfig {
    #[serde(default)]
    pub media_kind: MediaKind,
    pub media_source: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub poster_source: Option<String>,
    #[serde(default)]
    pub background_image_source: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub caption_line1: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub caption_line2: Option<String>,
    /// Render the headline with a difference blend over the background.
    #[serde(default)]
    pub blend_title_with_background: bool,
    #[serde(default)]
    pub on_complete_behavior: CompleteBehavior,
    /// Snap native scroll back to the section while the controller is engaged.
    #[serde(default = "default_pin_page")]
    pub pin_page_while_engaged: bool,
    #[serde(default)]
    pub tuning: ScrollTuning,
    #[serde(default)]
    pub curves: SizeCurves,
}

fn default_pin_page() -> bool {
    true
}

impl ExpandConfig {
    /// Config with defaults for everything but the media.
    #[must_use]
    pub fn new(media_kind: MediaKind, media_source: impl Into<String>) -> Self {
        Self {
            media_kind,
            media_source: media_source.into(),
            poster_source: None,
            background_image_source: String::new(),
            title: None,
            caption_line1: None,
            caption_line2: None,
            blend_title_with_background: false,
            on_complete_behavior: CompleteBehavior::default(),
            pin_page_while_engaged: true,
            tuning: ScrollTuning::default(),
            curves: SizeCurves::default(),
        }
    }

    #[must_use]
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    #[must_use]
    pub fn with_behavior(mut self, behavior: CompleteBehavior) -> Self {
        self.on_complete_behavior = behavior;
        self
    }

    #[must_use]
    pub fn with_tuning(mut self, tuning: ScrollTuning) -> Self {
        self.tuning = tuning;
        self
    }

    /// Parse and validate a JSON document.
    pub fn from_json_str(s: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    /// Parse and validate a TOML document.
    #[cfg(feature = "config-toml")]
    pub fn from_toml_str(s: &str) -> Result<Self> {
        let config: Self = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    /// Check every field is in range. Returns the first violation.
    pub fn validate(&self) -> Result<()> {
        if self.media_source.trim().is_empty() {
            return Err(ConfigError::EmptyMediaSource);
        }
        self.tuning.validate()?;
        self.curves.validate()
    }

    #[must_use]
    pub fn media_identity(&self) -> MediaIdentity {
        MediaIdentity::new(self.media_kind, self.media_source.clone())
    }

    #[must_use]
    pub fn media_element(&self) -> MediaElement {
        MediaElement::resolve(
            self.media_kind,
            &self.media_source,
            self.poster_source.as_deref(),
            self.title.as_deref(),
        )
    }

    #[must_use]
    pub fn title_split(&self) -> TitleSplit {
        TitleSplit::from_title(self.title.as_deref())
    }
}

fn non_negative(field: &'static str, value: f64) -> Result<()> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(ConfigError::InvalidScale { field, value })
    }
}

fn unit_interval(field: &'static str, value: f64) -> Result<()> {
    if value > 0.0 && value <= 1.0 {
        Ok(())
    } else {
        Err(ConfigError::ThresholdOutOfRange { field, value })
    }
}
