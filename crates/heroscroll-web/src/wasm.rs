#![forbid(unsafe_code)]

//! `wasm-bindgen` exports.
//!
//! One [`ScrollExpandMedia`] per hero section. Native input arrives through
//! [`WindowBindings`] while mounted; host-driven input arrives through
//! `input` / `inputFrame`. Both paths go through the same [`HostCore`], so
//! effects (auto-advance timers, the final scroll) run identically.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use gloo::render::{AnimationFrame, request_animation_frame};
use gloo::timers::callback::Timeout;
use heroscroll_core::{Disposition, Effect, InputEvent, ListenerScope, MediaUpdate, Placement};
use js_sys::Reflect;
use wasm_bindgen::prelude::*;
use web_sys::{Document, HtmlElement, ScrollBehavior, ScrollToOptions, Window};

use crate::dom::{DomSignal, SignalSink, WindowBindings, viewport_size};
use crate::host_core::{HostCore, HostError};
use crate::shell::Shell;

fn console_error(msg: &str) {
    let global = js_sys::global();
    let Ok(console) = Reflect::get(&global, &"console".into()) else {
        return;
    };
    let Ok(error) = Reflect::get(&console, &"error".into()) else {
        return;
    };
    let Ok(error_fn) = error.dyn_into::<js_sys::Function>() else {
        return;
    };
    let _ = error_fn.call1(&console, &JsValue::from_str(msg));
}

fn install_panic_hook() {
    use std::sync::Once;

    static ONCE: Once = Once::new();
    ONCE.call_once(|| {
        std::panic::set_hook(Box::new(|info| {
            let msg = match info.location() {
                Some(loc) => format!("heroscroll panic at {}:{}: {info}", loc.file(), loc.line()),
                None => format!("heroscroll panic: {info}"),
            };
            console_error(&msg);
        }));
    });
}

fn js_err(e: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&e.to_string())
}

fn parse_json(json: &str) -> Result<JsValue, JsValue> {
    js_sys::JSON::parse(json)
}

// ---------------------------------------------------------------------------
// Shared state
// ---------------------------------------------------------------------------

struct Shared {
    weak_self: Weak<Shared>,
    window: Window,
    document: Document,
    section: HtmlElement,
    core: RefCell<HostCore>,
    shell: RefCell<Option<Shell>>,
    listeners: RefCell<Option<ListenerScope<WindowBindings>>>,
    timer: RefCell<Option<(u64, Timeout)>>,
    frame: RefCell<Option<AnimationFrame>>,
}

impl Shared {
    fn placement(&self) -> Placement {
        Placement::at(self.section.get_bounding_client_rect().bottom())
    }

    fn dispatch(&self, event: &InputEvent, placement: Placement) -> Disposition {
        let disposition = {
            let Ok(mut core) = self.core.try_borrow_mut() else {
                return Disposition::PassThrough;
            };
            core.handle(event, placement).disposition
        };
        self.run_effects();
        self.schedule_render();
        disposition
    }

    fn run_effects(&self) {
        let effects = match self.core.try_borrow_mut() {
            Ok(mut core) => core.take_effects(),
            Err(_) => return,
        };
        for effect in effects {
            match effect {
                Effect::ScheduleAutoAdvance { token, delay } => {
                    let weak = self.weak_self.clone();
                    let millis = u32::try_from(delay.as_millis()).unwrap_or(u32::MAX);
                    let timeout = Timeout::new(millis, move || {
                        if let Some(shared) = weak.upgrade() {
                            shared.fire(token);
                        }
                    });
                    *self.timer.borrow_mut() = Some((token, timeout));
                }
                Effect::CancelAutoAdvance { token } => {
                    let mut timer = self.timer.borrow_mut();
                    if timer.as_ref().is_some_and(|(held, _)| *held == token) {
                        timer.take();
                    }
                }
                Effect::ScrollToNextSection => self.scroll_past_section(),
            }
        }
    }

    fn fire(&self, token: u64) {
        {
            let mut timer = self.timer.borrow_mut();
            if timer.as_ref().is_some_and(|(held, _)| *held == token) {
                timer.take();
            }
        }
        if let Ok(mut core) = self.core.try_borrow_mut() {
            core.fire_auto_advance(token);
        }
        self.run_effects();
        self.schedule_render();
    }

    fn scroll_past_section(&self) {
        let bottom = self.section.get_bounding_client_rect().bottom();
        let top = bottom + self.window.scroll_y().unwrap_or(0.0);
        let options = ScrollToOptions::new();
        options.set_top(top);
        options.set_behavior(ScrollBehavior::Smooth);
        self.window.scroll_to_with_scroll_to_options(&options);
    }

    fn pin_page(&self) {
        let pin = self
            .core
            .try_borrow()
            .is_ok_and(|core| core.controller().should_pin_page());
        if !pin {
            return;
        }
        let top = self.section.get_bounding_client_rect().top();
        if top.abs() >= 0.5 {
            let y = top + self.window.scroll_y().unwrap_or(0.0);
            self.window.scroll_to_with_x_and_y(0.0, y);
        }
    }

    fn schedule_render(&self) {
        if self.frame.borrow().is_some() {
            return;
        }
        let weak = self.weak_self.clone();
        let handle = request_animation_frame(move |_| {
            let Some(shared) = weak.upgrade() else {
                return;
            };
            shared.frame.borrow_mut().take();
            shared.render();
        });
        *self.frame.borrow_mut() = Some(handle);
    }

    fn render(&self) {
        let Ok(core) = self.core.try_borrow() else {
            return;
        };
        let styles = core.styles();
        drop(core);
        if let Some(shell) = self.shell.borrow().as_ref()
            && let Err(err) = shell.apply(&styles)
        {
            console_error(&format!("heroscroll: style update failed: {err:?}"));
        }
    }

    fn sync_viewport(&self) {
        let (width, height) = viewport_size(&self.window);
        if let Ok(mut core) = self.core.try_borrow_mut() {
            core.resize(width, height);
        }
    }

    fn is_mounted(&self) -> bool {
        self.listeners.borrow().is_some()
    }
}

impl SignalSink for Shared {
    fn deliver(&self, signal: DomSignal) -> Disposition {
        match signal {
            DomSignal::Wheel(wheel) => self.dispatch(&InputEvent::Wheel(wheel), self.placement()),
            DomSignal::Touch(touch) => self.dispatch(&InputEvent::Touch(touch), self.placement()),
            DomSignal::Resize { width, height } => {
                self.dispatch(&InputEvent::Resize { width, height }, Placement::UNKNOWN)
            }
            DomSignal::Scroll => {
                self.pin_page();
                Disposition::PassThrough
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Exported handle
// ---------------------------------------------------------------------------

/// Scroll-driven media expansion bound to one section element.
#[wasm_bindgen]
pub struct ScrollExpandMedia {
    shared: Rc<Shared>,
}

#[wasm_bindgen]
impl ScrollExpandMedia {
    /// Create a controller for `section` from a JSON config object.
    #[wasm_bindgen(constructor)]
    pub fn new(section: HtmlElement, config_json: &str) -> Result<ScrollExpandMedia, JsValue> {
        install_panic_hook();
        let core = HostCore::from_config_json(config_json).map_err(js_err)?;
        let window = web_sys::window().ok_or_else(|| JsValue::from_str("no window"))?;
        let document = window
            .document()
            .ok_or_else(|| JsValue::from_str("no document"))?;
        let shared = Rc::new_cyclic(|weak_self| Shared {
            weak_self: weak_self.clone(),
            window,
            document,
            section,
            core: RefCell::new(core),
            shell: RefCell::new(None),
            listeners: RefCell::new(None),
            timer: RefCell::new(None),
            frame: RefCell::new(None),
        });
        shared.sync_viewport();
        Ok(Self { shared })
    }

    /// Build the shell and attach window listeners. Idempotent.
    pub fn mount(&self) -> Result<(), JsValue> {
        let shared = &self.shared;
        if shared.is_mounted() {
            return Ok(());
        }
        shared.sync_viewport();
        if shared.shell.borrow().is_none() {
            let core = shared.core.borrow();
            let controller = core.controller();
            let shell = Shell::build(
                &shared.document,
                &shared.section,
                controller.config(),
                &controller.media_element(),
                controller.media().kind,
            )?;
            drop(core);
            *shared.shell.borrow_mut() = Some(shell);
        }
        let sink: Weak<dyn SignalSink> = Rc::downgrade(shared);
        let bindings = WindowBindings::new(shared.window.clone(), sink);
        let scope = ListenerScope::new(bindings).unwrap_or_else(|never| match never {});
        *shared.listeners.borrow_mut() = Some(scope);
        shared.render();
        Ok(())
    }

    /// Detach listeners, cancel timers and restore the section.
    pub fn unmount(&self) -> Result<(), JsValue> {
        let shared = &self.shared;
        shared.listeners.borrow_mut().take();
        shared.core.borrow_mut().unmount();
        shared.run_effects();
        shared.timer.borrow_mut().take();
        shared.frame.borrow_mut().take();
        let shell = shared.shell.borrow_mut().take();
        if let Some(shell) = shell {
            shell.teardown()?;
        }
        Ok(())
    }

    /// Switch media. Returns `true` when the controller was reset.
    #[wasm_bindgen(js_name = setMedia)]
    pub fn set_media(&self, kind: &str, source: &str) -> Result<bool, JsValue> {
        let shared = &self.shared;
        let update = shared
            .core
            .borrow_mut()
            .set_media(kind, source)
            .map_err(js_err)?;
        if update == MediaUpdate::Unchanged {
            return Ok(false);
        }
        shared.run_effects();
        if let Some(scope) = shared.listeners.borrow_mut().as_mut() {
            scope.cycle().unwrap_or_else(|never| match never {});
        }
        let media = {
            let core = shared.core.borrow();
            let controller = core.controller();
            (controller.media_element(), controller.media().kind)
        };
        if let Some(shell) = shared.shell.borrow_mut().as_mut() {
            shell.replace_media(&shared.document, &media.0, media.1)?;
        }
        shared.schedule_render();
        Ok(true)
    }

    /// Host-driven input: one encoded event. Returns `"consume"` or
    /// `"pass_through"`.
    pub fn input(&self, json: &str) -> Result<String, JsValue> {
        let input = crate::input::parse_host_input(json)
            .map_err(HostError::from)
            .map_err(js_err)?;
        let disposition = self.shared.dispatch(&input.event, input.placement);
        Ok(disposition.as_str().to_owned())
    }

    /// Host-driven input: a JSON array of events from one frame.
    /// Returns the disposition of each dispatched unit.
    #[wasm_bindgen(js_name = inputFrame)]
    pub fn input_frame(&self, json: &str) -> Result<Vec<String>, JsValue> {
        let shared = &self.shared;
        let responses = shared
            .core
            .borrow_mut()
            .handle_encoded_frame(json)
            .map_err(js_err)?;
        shared.run_effects();
        shared.schedule_render();
        Ok(responses
            .iter()
            .map(|r| r.disposition.as_str().to_owned())
            .collect())
    }

    /// Controller snapshot as a plain JS object.
    pub fn state(&self) -> Result<JsValue, JsValue> {
        let json = self.shared.core.borrow().state_json().map_err(js_err)?;
        parse_json(&json)
    }

    /// Current visual frame as a plain JS object.
    pub fn frame(&self) -> Result<JsValue, JsValue> {
        let json = self.shared.core.borrow().frame_json().map_err(js_err)?;
        parse_json(&json)
    }

    /// Input tallies as a plain JS object.
    pub fn stats(&self) -> Result<JsValue, JsValue> {
        let stats = self.shared.core.borrow().stats();
        let json = serde_json::to_string(&stats).map_err(js_err)?;
        parse_json(&json)
    }

    #[wasm_bindgen(js_name = isMounted)]
    pub fn is_mounted(&self) -> bool {
        self.shared.is_mounted()
    }

    /// Unmount and release the handle.
    pub fn destroy(self) -> Result<(), JsValue> {
        self.unmount()
    }
}
