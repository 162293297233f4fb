#![forbid(unsafe_code)]

//! Host-driven frames: encoded JSON in, bookkeeping and state out.
//!
//! Run:
//!   cargo test -p heroscroll-web --test host_frames

use heroscroll_core::{Effect, InputEvent, Placement, WheelEvent};
use heroscroll_web::{HostCore, HostError, HostInput, InputParseError};
use proptest::prelude::*;

const CONFIG: &str = r#"{
    "mediaKind": "video",
    "mediaSource": "https://cdn.example/hero.mp4",
    "onCompleteBehavior": "autoAdvance",
    "tuning": { "wheelScale": 0.0005 }
}"#;

fn core() -> HostCore {
    let mut core = HostCore::from_config_json(CONFIG).unwrap();
    core.resize(1280.0, 800.0);
    core
}

// ── Strategies ──────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
enum Encoded {
    Wheel { dy: f64, mods: u8, bottom: Option<f64> },
    Touch { phase: &'static str, y: f64 },
    Resize { width: f64, height: f64 },
}

impl Encoded {
    fn to_json(&self) -> serde_json::Value {
        match self {
            Self::Wheel { dy, mods, bottom } => serde_json::json!({
                "kind": "wheel", "dy": dy, "mods": mods, "elementBottom": bottom,
            }),
            Self::Touch { phase, y } => serde_json::json!({
                "kind": "touch", "phase": phase, "y": y,
            }),
            Self::Resize { width, height } => serde_json::json!({
                "kind": "resize", "width": width, "height": height,
            }),
        }
    }
}

fn encoded() -> impl Strategy<Value = Encoded> {
    prop_oneof![
        6 => (-800.0f64..800.0, prop_oneof![Just(0u8), Just(1u8), Just(4u8)], proptest::option::of(-200.0f64..1200.0))
            .prop_map(|(dy, mods, bottom)| Encoded::Wheel { dy, mods, bottom }),
        2 => (prop_oneof![Just("start"), Just("move"), Just("end"), Just("cancel")], 0.0f64..900.0)
            .prop_map(|(phase, y)| Encoded::Touch { phase, y }),
        1 => (200.0f64..2000.0, 200.0f64..1400.0)
            .prop_map(|(width, height)| Encoded::Resize { width, height }),
    ]
}

fn frames() -> impl Strategy<Value = Vec<Vec<Encoded>>> {
    proptest::collection::vec(proptest::collection::vec(encoded(), 0..12), 1..20)
}

fn behavior_label() -> impl Strategy<Value = &'static str> {
    prop_oneof![Just("release"), Just("hold"), Just("autoAdvance")]
}

/// Wheel-only frames where the hero moves between events: bottoms on both
/// sides of the re-engage threshold (720px at 1280x800) plus unmeasured.
fn moving_wheel_frames() -> impl Strategy<Value = Vec<Vec<(f64, Option<f64>)>>> {
    let bottom = prop_oneof![
        Just(None),
        Just(Some(700.0)),
        Just(Some(719.0)),
        Just(Some(780.0)),
        Just(Some(900.0)),
    ];
    let delta = prop_oneof![
        3 => (1u32..400).prop_map(f64::from),
        2 => (1u32..400).prop_map(|v| -f64::from(v)),
    ];
    proptest::collection::vec(proptest::collection::vec((delta, bottom), 1..8), 1..30)
}

fn wheel_core(behavior: &str) -> HostCore {
    let json = format!(
        r#"{{"mediaSource":"hero.mp4","onCompleteBehavior":"{behavior}","tuning":{{"wheelScale":0.001}}}}"#
    );
    let mut core = HostCore::from_config_json(&json).unwrap();
    core.resize(1280.0, 800.0);
    core
}

fn wheel_input(dy: f64, bottom: Option<f64>) -> HostInput {
    HostInput {
        event: InputEvent::Wheel(WheelEvent::new(dy)),
        placement: Placement { element_bottom: bottom },
    }
}

// ── Properties ──────────────────────────────────────────────────────────

proptest! {
    #[test]
    fn every_input_is_counted_once(frames in frames()) {
        let mut core = core();
        let mut inputs = 0u64;
        let mut units = 0u64;
        for frame in &frames {
            let json = serde_json::Value::Array(frame.iter().map(Encoded::to_json).collect());
            let responses = core.handle_encoded_frame(&json.to_string()).unwrap();
            inputs += frame.len() as u64;
            units += responses.len() as u64;
            prop_assert!(responses.len() <= frame.len());
        }
        let stats = core.stats();
        prop_assert_eq!(stats.events, inputs);
        prop_assert_eq!(stats.consumed + stats.passed_through, units);
    }

    #[test]
    fn progress_stays_bounded(frames in frames()) {
        let mut core = core();
        for frame in &frames {
            let json = serde_json::Value::Array(frame.iter().map(Encoded::to_json).collect());
            core.handle_encoded_frame(&json.to_string()).unwrap();
            for effect in core.take_effects() {
                if let Effect::ScheduleAutoAdvance { token, .. } = effect {
                    core.fire_auto_advance(token);
                }
            }
            let state = core.state();
            prop_assert!((0.0..=1.0).contains(&state.progress));
            prop_assert!(!state.released || state.complete);
        }
    }
}

proptest! {
    #[test]
    fn framed_dispatch_matches_per_event_with_moving_hero(
        behavior in behavior_label(),
        frames in moving_wheel_frames(),
    ) {
        let mut per_event = wheel_core(behavior);
        let mut framed = wheel_core(behavior);
        for frame in &frames {
            for &(dy, bottom) in frame {
                let input = wheel_input(dy, bottom);
                per_event.handle(&input.event, input.placement);
            }
            let inputs: Vec<HostInput> =
                frame.iter().map(|&(dy, bottom)| wheel_input(dy, bottom)).collect();
            framed.handle_frame(&inputs);

            let (a, b) = (per_event.state(), framed.state());
            prop_assert!((a.progress - b.progress).abs() < 1e-9);
            prop_assert_eq!(a.complete, b.complete);
            prop_assert_eq!(a.released, b.released);
            prop_assert_eq!(a.auto_advance_token.is_some(), b.auto_advance_token.is_some());
        }
    }
}

// ── Errors ──────────────────────────────────────────────────────────────

#[test]
fn bad_frame_leaves_state_untouched() {
    let mut core = core();
    core.handle_encoded(r#"{"kind":"wheel","dy":400}"#).unwrap();
    let before = core.state();
    let err = core
        .handle_encoded_frame(r#"[{"kind":"wheel","dy":400},{"kind":"scroll"}]"#)
        .unwrap_err();
    assert!(matches!(
        err,
        HostError::Input(InputParseError::UnknownKind(ref kind)) if kind == "scroll"
    ));
    assert_eq!(core.state(), before);
}

#[test]
fn error_messages_are_readable() {
    let mut core = core();
    let err = core.handle_encoded(r#"{"kind":"touch","y":3}"#).unwrap_err();
    assert_eq!(err.to_string(), "missing required field: phase");
    let err = core.set_media("gif", "a.gif").unwrap_err();
    assert_eq!(err.to_string(), "unknown media kind: gif");
}

#[test]
fn reset_clears_queue_bookkeeping() {
    let mut core = core();
    core.handle_encoded(r#"{"kind":"wheel","dy":5000}"#).unwrap();
    assert!(core.state().complete);
    core.take_effects();
    core.reset();
    assert_eq!(core.take_effects(), vec![Effect::CancelAutoAdvance { token: 1 }]);
    assert_eq!(core.state().progress, 0.0);
    assert_eq!(core.state().auto_advance_token, None);
}
