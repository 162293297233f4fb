#![forbid(unsafe_code)]

//! Canonical input events.
//!
//! Hosts translate their native wheel, touch, and resize notifications into
//! these types before handing them to the controller.
//!
//! # Design Notes
//!
//! - Coordinates and deltas are CSS pixels along the vertical scroll axis.
//! - Positive wheel `delta_y` means forward (scrolling down the page).
//! - `Modifiers` use bitflags so hosts can pass the DOM modifier state as-is.

use bitflags::bitflags;

/// Canonical input event.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputEvent {
    /// A wheel or trackpad tick.
    Wheel(WheelEvent),

    /// A touch start/move/end sample.
    Touch(TouchEvent),

    /// The host viewport changed size.
    Resize {
        /// New viewport width in CSS pixels.
        width: f64,
        /// New viewport height in CSS pixels.
        height: f64,
    },
}

impl InputEvent {
    /// Short, stable label used in log fields and traces.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Wheel(_) => "wheel",
            Self::Touch(_) => "touch",
            Self::Resize { .. } => "resize",
        }
    }
}

/// A wheel event.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WheelEvent {
    /// Vertical delta in CSS pixels (positive = forward).
    pub delta_y: f64,

    /// Modifier keys held during the event.
    pub modifiers: Modifiers,
}

impl WheelEvent {
    /// Create a wheel event without modifiers.
    #[must_use]
    pub const fn new(delta_y: f64) -> Self {
        Self {
            delta_y,
            modifiers: Modifiers::NONE,
        }
    }

    /// Attach modifiers.
    #[must_use]
    pub const fn with_modifiers(mut self, modifiers: Modifiers) -> Self {
        self.modifiers = modifiers;
        self
    }

    /// Browsers report trackpad pinch-zoom as a wheel event with CTRL held.
    #[must_use]
    pub const fn is_pinch_zoom(&self) -> bool {
        self.modifiers.contains(Modifiers::CTRL)
    }
}

/// Phase of a touch sample.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TouchPhase {
    Start,
    Move,
    End,
    Cancel,
}

/// A single-finger touch sample along the scroll axis.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TouchEvent {
    pub phase: TouchPhase,
    /// Client Y coordinate of the primary touch point.
    pub y: f64,
}

impl TouchEvent {
    #[must_use]
    pub const fn start(y: f64) -> Self {
        Self {
            phase: TouchPhase::Start,
            y,
        }
    }

    #[must_use]
    pub const fn moved(y: f64) -> Self {
        Self {
            phase: TouchPhase::Move,
            y,
        }
    }

    #[must_use]
    pub const fn end() -> Self {
        Self {
            phase: TouchPhase::End,
            y: 0.0,
        }
    }
}

bitflags! {
    /// Modifier keys held during an input event.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct Modifiers: u8 {
        /// No modifiers.
        const NONE  = 0b0000;
        /// Shift key.
        const SHIFT = 0b0001;
        /// Alt/Option key.
        const ALT   = 0b0010;
        /// Control key.
        const CTRL  = 0b0100;
        /// Super/Meta/Cmd key.
        const SUPER = 0b1000;
    }
}

impl Modifiers {
    /// Decode the compact `mods` bitset used in JSON traces.
    #[must_use]
    pub const fn from_bits_truncate_u8(bits: u8) -> Self {
        Self::from_bits_truncate(bits)
    }
}
