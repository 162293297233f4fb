#![forbid(unsafe_code)]

//! Core: scroll-driven media expansion, independent of any host platform.
//!
//! # Role in heroscroll
//! `heroscroll-core` owns the expansion controller. A host (the browser
//! frontend in `heroscroll-web`, or a test) pushes normalized input events in
//! and receives a [`Disposition`](gate::Disposition) for each one: either the
//! controller consumed the event (the host must suppress native scrolling) or
//! the event passes through to the page.
//!
//! # Primary responsibilities
//! - **Input aggregation** ([`aggregator`]): wheel and touch deltas become one
//!   signed intent delta per event.
//! - **Progress** ([`progress`]): bounded `[0, 1]` progress with an
//!   edge-triggered `complete` flag.
//! - **Arbitration** ([`gate`]): consume, release, or re-engage per event.
//! - **Visuals** ([`visuals`]): pure functions of progress and viewport.
//! - **Lifecycle** ([`lifecycle`]): scoped listener acquisition.
//! - **Replay** ([`session_record`]): checksummed traces of host sessions.
//!
//! # How it fits together
//! [`controller::ExpandController`] composes the pieces above. It never
//! touches the DOM or a clock; timers and listeners are effects the host
//! executes.

pub mod aggregator;
pub mod coalesce;
pub mod config;
pub mod controller;
pub mod error;
pub mod event;
pub mod gate;
pub mod lifecycle;
pub mod logging;
pub mod media;
pub mod progress;
pub mod session_record;
pub mod storm;
pub mod viewport;
pub mod visuals;

pub use coalesce::{WheelBatch, WheelCoalescer};
pub use config::{CompleteBehavior, ExpandConfig, ScrollTuning, SizeCurves};
pub use controller::{
    ControllerSnapshot, Effect, ExpandController, MediaUpdate, Placement, Response,
};
pub use error::{ConfigError, ReplayError};
pub use event::{InputEvent, Modifiers, TouchEvent, TouchPhase, WheelEvent};
pub use gate::{Disposition, GateAction};
pub use lifecycle::{InputBindings, ListenerScope};
pub use media::{MediaElement, MediaIdentity, MediaKind, TitleSplit};
pub use viewport::ViewportMetrics;
pub use visuals::VisualFrame;
