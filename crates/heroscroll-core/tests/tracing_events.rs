#![forbid(unsafe_code)]

//! Structured log contract for the controller.
//!
//! Every input runs inside a `heroscroll.handle` span carrying the event
//! kind. State edges (complete, release, re-engage, auto-advance, reset)
//! are `debug` events; per-event arbitration is `trace`.
//!
//! Run:
//!   cargo test -p heroscroll-core --test tracing_events

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use heroscroll_core::{
    CompleteBehavior, Effect, ExpandConfig, ExpandController, InputEvent, MediaKind, Placement,
    ScrollTuning, WheelBatch, WheelEvent,
};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::registry::LookupSpan;

// ============================================================================
// Capture layer
// ============================================================================

#[derive(Debug, Clone)]
struct CapturedSpan {
    name: String,
    fields: HashMap<String, String>,
}

#[derive(Debug, Clone)]
struct CapturedEvent {
    level: tracing::Level,
    target: String,
    message: String,
    fields: HashMap<String, String>,
    parent_span_name: Option<String>,
}

struct Capture {
    spans: Arc<Mutex<Vec<CapturedSpan>>>,
    events: Arc<Mutex<Vec<CapturedEvent>>>,
}

#[derive(Clone)]
struct CaptureHandle {
    spans: Arc<Mutex<Vec<CapturedSpan>>>,
    events: Arc<Mutex<Vec<CapturedEvent>>>,
}

impl CaptureHandle {
    fn spans(&self) -> Vec<CapturedSpan> {
        self.spans.lock().unwrap().clone()
    }

    fn events(&self) -> Vec<CapturedEvent> {
        self.events.lock().unwrap().clone()
    }

    fn messages(&self) -> Vec<String> {
        self.events().into_iter().map(|e| e.message).collect()
    }

    fn find(&self, message: &str) -> Option<CapturedEvent> {
        self.events().into_iter().find(|e| e.message == message)
    }
}

struct FieldVisitor(Vec<(String, String)>);

impl tracing::field::Visit for FieldVisitor {
    fn record_debug(&mut self, field: &tracing::field::Field, value: &dyn std::fmt::Debug) {
        self.0.push((field.name().to_string(), format!("{value:?}")));
    }

    fn record_u64(&mut self, field: &tracing::field::Field, value: u64) {
        self.0.push((field.name().to_string(), value.to_string()));
    }

    fn record_f64(&mut self, field: &tracing::field::Field, value: f64) {
        self.0.push((field.name().to_string(), value.to_string()));
    }

    fn record_str(&mut self, field: &tracing::field::Field, value: &str) {
        self.0.push((field.name().to_string(), value.to_string()));
    }

    fn record_bool(&mut self, field: &tracing::field::Field, value: bool) {
        self.0.push((field.name().to_string(), value.to_string()));
    }
}

impl<S> tracing_subscriber::Layer<S> for Capture
where
    S: tracing::Subscriber + for<'a> LookupSpan<'a>,
{
    fn on_new_span(
        &self,
        attrs: &tracing::span::Attributes<'_>,
        _id: &tracing::span::Id,
        _ctx: tracing_subscriber::layer::Context<'_, S>,
    ) {
        let mut visitor = FieldVisitor(Vec::new());
        attrs.record(&mut visitor);
        self.spans.lock().unwrap().push(CapturedSpan {
            name: attrs.metadata().name().to_string(),
            fields: visitor.0.into_iter().collect(),
        });
    }

    fn on_event(&self, event: &tracing::Event<'_>, ctx: tracing_subscriber::layer::Context<'_, S>) {
        let mut visitor = FieldVisitor(Vec::new());
        event.record(&mut visitor);
        let message = visitor
            .0
            .iter()
            .find(|(k, _)| k == "message")
            .map(|(_, v)| v.clone())
            .unwrap_or_default();
        let parent_span_name = ctx
            .current_span()
            .id()
            .and_then(|id| ctx.span(id))
            .map(|span| span.name().to_string());
        self.events.lock().unwrap().push(CapturedEvent {
            level: *event.metadata().level(),
            target: event.metadata().target().to_string(),
            message,
            fields: visitor.0.into_iter().collect(),
            parent_span_name,
        });
    }
}

fn with_capture<F: FnOnce()>(f: F) -> CaptureHandle {
    let spans = Arc::new(Mutex::new(Vec::new()));
    let events = Arc::new(Mutex::new(Vec::new()));
    let handle = CaptureHandle {
        spans: spans.clone(),
        events: events.clone(),
    };
    let subscriber = tracing_subscriber::registry()
        .with(tracing_subscriber::filter::LevelFilter::TRACE)
        .with(Capture { spans, events });
    tracing::subscriber::with_default(subscriber, f);
    handle
}

fn controller(behavior: CompleteBehavior) -> ExpandController {
    let tuning = ScrollTuning {
        wheel_scale: 0.001,
        ..ScrollTuning::default()
    };
    let config = ExpandConfig::new(MediaKind::Video, "hero.mp4")
        .with_tuning(tuning)
        .with_behavior(behavior);
    let mut c = ExpandController::new(config).unwrap();
    c.resize(1280.0, 800.0);
    c
}

fn wheel(dy: f64) -> InputEvent {
    InputEvent::Wheel(WheelEvent::new(dy))
}

// ============================================================================
// Spans
// ============================================================================

#[test]
fn every_input_opens_handle_span_with_kind() {
    let handle = with_capture(|| {
        let mut c = controller(CompleteBehavior::Release);
        c.handle(&wheel(10.0), Placement::UNKNOWN);
        c.handle(
            &InputEvent::Resize {
                width: 400.0,
                height: 700.0,
            },
            Placement::UNKNOWN,
        );
        c.handle_wheel_batch(
            &WheelBatch {
                first_dy: 5.0,
                last_dy: 5.0,
                total_dy: 10.0,
                count: 2,
            },
            Placement::UNKNOWN,
        );
    });

    let kinds: Vec<String> = handle
        .spans()
        .into_iter()
        .filter(|s| s.name == "heroscroll.handle")
        .filter_map(|s| s.fields.get("kind").cloned())
        .collect();
    assert_eq!(kinds, ["wheel", "resize", "wheel_batch"]);
}

#[test]
fn gating_is_traced_inside_handle_span() {
    let handle = with_capture(|| {
        let mut c = controller(CompleteBehavior::Release);
        c.handle(&wheel(100.0), Placement::UNKNOWN);
    });

    let gated = handle.find("event gated").expect("gating event");
    assert_eq!(gated.level, tracing::Level::TRACE);
    assert_eq!(gated.parent_span_name.as_deref(), Some("heroscroll.handle"));
    assert_eq!(gated.fields.get("action").map(String::as_str), Some("drive"));
    assert!(gated.target.starts_with("heroscroll_core"));
}

// ============================================================================
// State edges
// ============================================================================

#[test]
fn complete_release_and_reengage_are_logged() {
    let handle = with_capture(|| {
        let mut c = controller(CompleteBehavior::Release);
        c.handle(&wheel(1000.0), Placement::UNKNOWN);
        c.handle(&wheel(10.0), Placement::UNKNOWN);
        c.handle(&wheel(-10.0), Placement::at(800.0));
    });

    let messages = handle.messages();
    let order: Vec<&str> = messages
        .iter()
        .map(String::as_str)
        .filter(|m| {
            matches!(
                *m,
                "expansion complete" | "released to native scrolling" | "re-engaged"
            )
        })
        .collect();
    assert_eq!(
        order,
        ["expansion complete", "released to native scrolling", "re-engaged"]
    );
    for m in order {
        let event = handle.find(m).unwrap();
        assert_eq!(event.level, tracing::Level::DEBUG);
        assert_eq!(event.parent_span_name.as_deref(), Some("heroscroll.handle"));
    }
}

#[test]
fn auto_advance_lifecycle_is_logged() {
    let handle = with_capture(|| {
        let mut c = controller(CompleteBehavior::AutoAdvance);
        let r = c.handle(&wheel(1000.0), Placement::UNKNOWN);
        let Some(Effect::ScheduleAutoAdvance { token, .. }) = r.effect else {
            panic!("expected schedule, got {:?}", r.effect);
        };
        c.fire_auto_advance(token + 1);
        c.fire_auto_advance(token);

        c.reset();
        c.handle(&wheel(1000.0), Placement::UNKNOWN);
        c.handle(&wheel(-300.0), Placement::UNKNOWN);
    });

    let scheduled = handle.find("auto-advance scheduled").unwrap();
    assert_eq!(scheduled.fields.get("delay_ms").map(String::as_str), Some("600"));
    assert!(handle.find("stale auto-advance ignored").is_some());
    assert!(handle.find("auto-advance fired").is_some());
    assert!(handle.find("controller reset").is_some());
    assert!(handle.find("expansion reopened").is_some());
    let cancelled = handle.find("auto-advance cancelled").unwrap();
    assert_eq!(cancelled.fields.get("token").map(String::as_str), Some("2"));
}

#[test]
fn quiet_inputs_log_no_state_edges() {
    let mut c = controller(CompleteBehavior::Release);
    let handle = with_capture(move || {
        for _ in 0..5 {
            c.handle(&wheel(50.0), Placement::UNKNOWN);
        }
    });
    assert!(
        handle
            .events()
            .iter()
            .all(|e| e.level == tracing::Level::TRACE),
        "unexpected debug events: {:?}",
        handle.messages()
    );
}
