#![forbid(unsafe_code)]

//! JSON input schema for host-driven mode.
//!
//! Hosts that capture input themselves (a framework wrapper, a test
//! harness, a replay tool) hand events to `ScrollExpandMedia.input()` as
//! JSON objects with a `kind` discriminator:
//!
//! ```text
//! {"kind":"wheel","dy":120,"mods":0,"elementBottom":812.5}
//! {"kind":"touch","phase":"move","y":431}
//! {"kind":"resize","width":1280,"height":800}
//! ```
//!
//! `elementBottom` is the host-measured bottom edge of the hero in viewport
//! pixels; omit it (or send `null`) when unknown. `mods` is the compact
//! modifier bitset (`shift=1, alt=2, ctrl=4, super=8`).

use heroscroll_core::{InputEvent, Modifiers, Placement, TouchEvent, TouchPhase, WheelEvent};
use serde::Deserialize;

/// A window event the browser frontend subscribes to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowListener {
    pub event_type: &'static str,
    /// Registered non-passive so a consumed event can `preventDefault`.
    /// Only events the controller can consume are cancelable.
    pub cancelable: bool,
}

/// Every window listener a mounted hero installs, in attach order.
pub const WINDOW_LISTENERS: [WindowListener; 7] = [
    WindowListener { event_type: "wheel", cancelable: true },
    WindowListener { event_type: "touchstart", cancelable: false },
    WindowListener { event_type: "touchmove", cancelable: true },
    WindowListener { event_type: "touchend", cancelable: false },
    WindowListener { event_type: "touchcancel", cancelable: false },
    WindowListener { event_type: "resize", cancelable: false },
    WindowListener { event_type: "scroll", cancelable: false },
];

/// Errors from parsing encoded input JSON.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InputParseError {
    #[error("JSON parse error: {0}")]
    Json(String),
    #[error("missing required field: {0}")]
    MissingField(&'static str),
    #[error("unknown input kind: {0}")]
    UnknownKind(String),
    #[error("unknown touch phase: {0}")]
    UnknownPhase(String),
}

/// One decoded host input.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HostInput {
    pub event: InputEvent,
    pub placement: Placement,
}

impl HostInput {
    #[must_use]
    pub fn wheel_event(&self) -> Option<&WheelEvent> {
        match &self.event {
            InputEvent::Wheel(wheel) => Some(wheel),
            _ => None,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawInput {
    kind: String,
    #[serde(default)]
    phase: Option<String>,
    #[serde(default)]
    dy: Option<f64>,
    #[serde(default)]
    y: Option<f64>,
    #[serde(default)]
    width: Option<f64>,
    #[serde(default)]
    height: Option<f64>,
    #[serde(default)]
    mods: Option<i64>,
    #[serde(default)]
    element_bottom: Option<f64>,
}

/// Parse one encoded input object.
pub fn parse_host_input(json: &str) -> Result<HostInput, InputParseError> {
    let raw: RawInput =
        serde_json::from_str(json).map_err(|e| InputParseError::Json(e.to_string()))?;
    decode(raw)
}

/// Parse a JSON array of encoded inputs, all delivered within one frame.
pub fn parse_host_batch(json: &str) -> Result<Vec<HostInput>, InputParseError> {
    let raws: Vec<RawInput> =
        serde_json::from_str(json).map_err(|e| InputParseError::Json(e.to_string()))?;
    raws.into_iter().map(decode).collect()
}

fn decode(raw: RawInput) -> Result<HostInput, InputParseError> {
    let placement = Placement {
        element_bottom: raw.element_bottom,
    };
    let event = match raw.kind.as_str() {
        "wheel" => {
            let dy = raw.dy.ok_or(InputParseError::MissingField("dy"))?;
            InputEvent::Wheel(WheelEvent::new(dy).with_modifiers(parse_modifiers(raw.mods)))
        }
        "touch" => InputEvent::Touch(decode_touch(&raw)?),
        "resize" => InputEvent::Resize {
            width: raw.width.ok_or(InputParseError::MissingField("width"))?,
            height: raw.height.ok_or(InputParseError::MissingField("height"))?,
        },
        other => return Err(InputParseError::UnknownKind(other.to_owned())),
    };
    Ok(HostInput { event, placement })
}

fn decode_touch(raw: &RawInput) -> Result<TouchEvent, InputParseError> {
    let phase = raw
        .phase
        .as_deref()
        .ok_or(InputParseError::MissingField("phase"))?;
    let phase = parse_touch_phase(phase)?;
    let y = match phase {
        TouchPhase::Start | TouchPhase::Move => raw.y.ok_or(InputParseError::MissingField("y"))?,
        TouchPhase::End | TouchPhase::Cancel => raw.y.unwrap_or(0.0),
    };
    Ok(TouchEvent { phase, y })
}

fn parse_touch_phase(phase: &str) -> Result<TouchPhase, InputParseError> {
    match phase {
        "start" | "touchstart" => Ok(TouchPhase::Start),
        "move" | "touchmove" => Ok(TouchPhase::Move),
        "end" | "touchend" => Ok(TouchPhase::End),
        "cancel" | "touchcancel" => Ok(TouchPhase::Cancel),
        other => Err(InputParseError::UnknownPhase(other.to_owned())),
    }
}

fn parse_modifiers(mods: Option<i64>) -> Modifiers {
    let bits = mods.unwrap_or(0).clamp(0, i64::from(u8::MAX)) as u8;
    Modifiers::from_bits_truncate_u8(bits)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wheel_with_placement() {
        let input = parse_host_input(r#"{"kind":"wheel","dy":120.5,"elementBottom":810}"#).unwrap();
        assert_eq!(input.event, InputEvent::Wheel(WheelEvent::new(120.5)));
        assert_eq!(input.placement, Placement::at(810.0));
    }

    #[test]
    fn wheel_ctrl_bit_marks_pinch() {
        let input = parse_host_input(r#"{"kind":"wheel","dy":-3,"mods":4}"#).unwrap();
        assert!(input.wheel_event().unwrap().is_pinch_zoom());
    }

    #[test]
    fn out_of_range_mods_are_clamped() {
        let input = parse_host_input(r#"{"kind":"wheel","dy":1,"mods":-9}"#).unwrap();
        assert_eq!(input.wheel_event().unwrap().modifiers, Modifiers::NONE);
    }

    #[test]
    fn touch_end_needs_no_coordinate() {
        let input = parse_host_input(r#"{"kind":"touch","phase":"end"}"#).unwrap();
        assert_eq!(input.event, InputEvent::Touch(TouchEvent::end()));
        assert_eq!(input.placement, Placement::UNKNOWN);
    }

    #[test]
    fn touch_move_requires_coordinate() {
        assert_eq!(
            parse_host_input(r#"{"kind":"touch","phase":"move"}"#),
            Err(InputParseError::MissingField("y"))
        );
    }

    #[test]
    fn dom_phase_names_are_accepted() {
        let input = parse_host_input(r#"{"kind":"touch","phase":"touchstart","y":40}"#).unwrap();
        assert_eq!(input.event, InputEvent::Touch(TouchEvent::start(40.0)));
    }

    #[test]
    fn unknown_kind_and_phase() {
        assert_eq!(
            parse_host_input(r#"{"kind":"key"}"#),
            Err(InputParseError::UnknownKind("key".into()))
        );
        assert_eq!(
            parse_host_input(r#"{"kind":"touch","phase":"hover","y":1}"#),
            Err(InputParseError::UnknownPhase("hover".into()))
        );
    }

    #[test]
    fn malformed_json() {
        assert!(matches!(
            parse_host_input("not json"),
            Err(InputParseError::Json(_))
        ));
    }

    #[test]
    fn only_consumable_events_are_cancelable() {
        use heroscroll_core::{CompleteBehavior, ExpandConfig, ExpandController, MediaKind};

        let cancelable: Vec<&str> = WINDOW_LISTENERS
            .iter()
            .filter(|l| l.cancelable)
            .map(|l| l.event_type)
            .collect();
        assert_eq!(cancelable, vec!["wheel", "touchmove"]);

        // Touch boundaries never reach the gate, whatever the state.
        for behavior in [CompleteBehavior::Release, CompleteBehavior::Hold] {
            let config = ExpandConfig::new(MediaKind::Image, "a.jpg").with_behavior(behavior);
            let mut c = ExpandController::new(config).unwrap();
            c.resize(1280.0, 800.0);
            for progress_dy in [0.0, 400.0, 5000.0] {
                c.handle(&InputEvent::Wheel(WheelEvent::new(progress_dy)), Placement::UNKNOWN);
                for touch in [TouchEvent::start(300.0), TouchEvent::end()] {
                    let r = c.handle(&InputEvent::Touch(touch), Placement::UNKNOWN);
                    assert!(!r.is_consumed(), "{touch:?} consumed under {behavior:?}");
                }
            }
        }
    }

    #[test]
    fn batch_preserves_order() {
        let batch = parse_host_batch(
            r#"[{"kind":"wheel","dy":10},{"kind":"resize","width":390,"height":844},{"kind":"wheel","dy":-4}]"#,
        )
        .unwrap();
        assert_eq!(batch.len(), 3);
        assert_eq!(batch[0].event.kind(), "wheel");
        assert_eq!(batch[1].event.kind(), "resize");
        assert_eq!(batch[2].wheel_event().unwrap().delta_y, -4.0);
    }

    #[test]
    fn batch_fails_on_first_bad_entry() {
        assert_eq!(
            parse_host_batch(r#"[{"kind":"wheel","dy":1},{"kind":"wheel"}]"#),
            Err(InputParseError::MissingField("dy"))
        );
    }
}
