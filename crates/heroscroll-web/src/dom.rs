#![forbid(unsafe_code)]

//! Window listeners for one mounted hero.
//!
//! Wheel and touch-move listeners are non-passive so a consumed event can
//! call `preventDefault`; the rest are passive. Each listener holds only a
//! weak handle to its sink; dropping [`WindowBindings`] (or calling
//! `detach`) removes every listener.

use std::rc::Weak;

use gloo::events::{EventListener, EventListenerOptions, EventListenerPhase};
use heroscroll_core::{Disposition, InputBindings, Modifiers, TouchEvent, TouchPhase, WheelEvent};
use wasm_bindgen::JsCast;
use web_sys::{Event, Window};

use crate::input::WINDOW_LISTENERS;

type Decoder = fn(&Window, &Event) -> Option<DomSignal>;

/// Pixel size of one wheel "line" for `DOM_DELTA_LINE` devices.
const LINE_HEIGHT_PX: f64 = 16.0;

/// A normalized window notification.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) enum DomSignal {
    Wheel(WheelEvent),
    Touch(TouchEvent),
    Resize { width: f64, height: f64 },
    Scroll,
}

/// Receiver of normalized signals. The disposition decides whether the
/// DOM event's default action is prevented.
pub(crate) trait SignalSink {
    fn deliver(&self, signal: DomSignal) -> Disposition;
}

pub(crate) struct WindowBindings {
    window: Window,
    sink: Weak<dyn SignalSink>,
    listeners: Vec<EventListener>,
}

impl WindowBindings {
    pub(crate) fn new(window: Window, sink: Weak<dyn SignalSink>) -> Self {
        Self {
            window,
            sink,
            listeners: Vec::new(),
        }
    }

    fn listen<F>(&mut self, event_type: &'static str, passive: bool, decode: F)
    where
        F: Fn(&Window, &Event) -> Option<DomSignal> + 'static,
    {
        let sink = self.sink.clone();
        let window = self.window.clone();
        let listener = EventListener::new_with_options(
            &self.window,
            event_type,
            EventListenerOptions {
                phase: EventListenerPhase::Bubble,
                passive,
            },
            move |event: &Event| {
                let Some(sink) = sink.upgrade() else {
                    return;
                };
                let Some(signal) = decode(&window, event) else {
                    return;
                };
                if sink.deliver(signal).is_consumed() && !passive && event.cancelable() {
                    event.prevent_default();
                }
            },
        );
        self.listeners.push(listener);
    }
}

impl InputBindings for WindowBindings {
    type Error = std::convert::Infallible;

    fn attach(&mut self) -> Result<(), Self::Error> {
        if !self.listeners.is_empty() {
            return Ok(());
        }
        for listener in WINDOW_LISTENERS {
            let decode: Decoder = match listener.event_type {
                "wheel" => decode_wheel,
                "touchstart" => |_, e| decode_touch(e, TouchPhase::Start),
                "touchmove" => |_, e| decode_touch(e, TouchPhase::Move),
                "touchend" => |_, e| decode_touch(e, TouchPhase::End),
                "touchcancel" => |_, e| decode_touch(e, TouchPhase::Cancel),
                "resize" => |window, _| {
                    let (width, height) = viewport_size(window);
                    Some(DomSignal::Resize { width, height })
                },
                "scroll" => |_, _| Some(DomSignal::Scroll),
                _ => continue,
            };
            self.listen(listener.event_type, !listener.cancelable, decode);
        }
        tracing::debug!(count = self.listeners.len(), "window listeners attached");
        Ok(())
    }

    fn detach(&mut self) {
        let count = self.listeners.len();
        self.listeners.clear();
        tracing::debug!(count, "window listeners detached");
    }
}

fn decode_wheel(window: &Window, event: &Event) -> Option<DomSignal> {
    let event = event.dyn_ref::<web_sys::WheelEvent>()?;
    let scale = match event.delta_mode() {
        web_sys::WheelEvent::DOM_DELTA_LINE => LINE_HEIGHT_PX,
        web_sys::WheelEvent::DOM_DELTA_PAGE => viewport_size(window).1.max(1.0),
        _ => 1.0,
    };
    let mut mods = Modifiers::NONE;
    mods.set(Modifiers::SHIFT, event.shift_key());
    mods.set(Modifiers::ALT, event.alt_key());
    mods.set(Modifiers::CTRL, event.ctrl_key());
    mods.set(Modifiers::SUPER, event.meta_key());
    Some(DomSignal::Wheel(
        WheelEvent::new(event.delta_y() * scale).with_modifiers(mods),
    ))
}

fn decode_touch(event: &Event, phase: TouchPhase) -> Option<DomSignal> {
    let event = event.dyn_ref::<web_sys::TouchEvent>()?;
    let y = match phase {
        TouchPhase::Start | TouchPhase::Move => f64::from(event.touches().get(0)?.client_y()),
        TouchPhase::End | TouchPhase::Cancel => 0.0,
    };
    Some(DomSignal::Touch(TouchEvent { phase, y }))
}

/// Inner viewport size in CSS pixels; `(0, 0)` when unavailable.
pub(crate) fn viewport_size(window: &Window) -> (f64, f64) {
    let width = window
        .inner_width()
        .ok()
        .and_then(|v| v.as_f64())
        .unwrap_or(0.0);
    let height = window
        .inner_height()
        .ok()
        .and_then(|v| v.as_f64())
        .unwrap_or(0.0);
    (width, height)
}
