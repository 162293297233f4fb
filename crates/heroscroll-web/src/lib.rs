#![forbid(unsafe_code)]

//! Browser frontend for heroscroll.
//!
//! [`ScrollExpandMedia`] (wasm32 only) binds one
//! [`ExpandController`](heroscroll_core::ExpandController) to a section
//! element: it builds the media shell, attaches non-passive window
//! listeners, runs auto-advance timers, and writes each visual frame as
//! inline styles on the next animation frame.
//!
//! Everything that does not need a JS engine lives in [`host_core`],
//! [`input`] and [`style`] and is tested natively.

pub mod host_core;
pub mod input;
pub mod style;

#[cfg(target_arch = "wasm32")]
mod dom;
#[cfg(target_arch = "wasm32")]
mod shell;
#[cfg(target_arch = "wasm32")]
mod wasm;

pub use host_core::{HostCore, HostError, HostStats};
pub use input::{
    HostInput, InputParseError, WINDOW_LISTENERS, WindowListener, parse_host_batch,
    parse_host_input,
};
pub use style::{Declaration, FrameStyles};

#[cfg(target_arch = "wasm32")]
pub use wasm::ScrollExpandMedia;
