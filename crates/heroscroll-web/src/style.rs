#![forbid(unsafe_code)]

//! Mapping from [`VisualFrame`] to inline CSS.
//!
//! Every shell part gets a short list of declarations; the DOM layer only
//! calls `style.setProperty` with them. The root also receives custom
//! properties (`--hero-*`) so page stylesheets can follow the expansion.

use heroscroll_core::{SizeCurves, VisualFrame};

/// A single `property: value` pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Declaration {
    pub property: &'static str,
    pub value: String,
}

fn decl(property: &'static str, value: impl Into<String>) -> Declaration {
    Declaration {
        property,
        value: value.into(),
    }
}

/// Inline styles for every shell part for one frame.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FrameStyles {
    pub root: Vec<Declaration>,
    pub background: Vec<Declaration>,
    pub media_box: Vec<Declaration>,
    pub overlay: Vec<Declaration>,
    pub text_layer: Vec<Declaration>,
    pub title_lead: Vec<Declaration>,
    pub title_rest: Vec<Declaration>,
    pub caption_lead: Vec<Declaration>,
    pub caption_rest: Vec<Declaration>,
    pub content: Vec<Declaration>,
}

impl FrameStyles {
    #[must_use]
    pub fn from_frame(frame: &VisualFrame, curves: &SizeCurves) -> Self {
        let title = css_number(frame.title_offset_vw);
        let caption = css_number(frame.caption_offset_vw);
        Self {
            root: vec![
                decl("--hero-progress", css_number(frame.progress)),
                decl("--hero-media-width", px(frame.width)),
                decl("--hero-media-height", px(frame.height)),
                decl("--hero-text-opacity", css_number(frame.text_opacity)),
            ],
            background: vec![decl("opacity", css_number(frame.background_opacity))],
            media_box: vec![
                decl("width", px(frame.width)),
                decl("height", px(frame.height)),
                decl("max-width", vw(curves.max_viewport_width * 100.0)),
                decl("max-height", vh(curves.max_viewport_height * 100.0)),
                decl("border-radius", px(frame.corner_radius)),
            ],
            overlay: vec![
                decl("opacity", css_number(frame.overlay_opacity)),
                decl("border-radius", px(frame.corner_radius)),
            ],
            text_layer: vec![decl("opacity", css_number(frame.text_opacity))],
            title_lead: vec![translate_x(&format!("-{title}vw"))],
            title_rest: vec![translate_x(&format!("{title}vw"))],
            caption_lead: vec![translate_x(&format!("-{caption}vw"))],
            caption_rest: vec![translate_x(&format!("{caption}vw"))],
            content: content_styles(frame.content_opacity),
        }
    }
}

fn content_styles(opacity: f64) -> Vec<Declaration> {
    let shown = opacity > 0.0;
    vec![
        decl("opacity", css_number(opacity)),
        decl("pointer-events", if shown { "auto" } else { "none" }),
    ]
}

fn translate_x(offset: &str) -> Declaration {
    decl("transform", format!("translateX({offset})"))
}

fn px(v: f64) -> String {
    format!("{}px", css_number(v))
}

fn vw(v: f64) -> String {
    format!("{}vw", css_number(v))
}

fn vh(v: f64) -> String {
    format!("{}vh", css_number(v))
}

/// Format with at most three decimals and no trailing zeros. Non-finite
/// values render as `0` so a bad frame never produces invalid CSS.
#[must_use]
pub fn css_number(v: f64) -> String {
    if !v.is_finite() {
        return "0".to_owned();
    }
    let rounded = (v * 1000.0).round() / 1000.0;
    // Avoid "-0".
    let rounded = if rounded == 0.0 { 0.0 } else { rounded };
    let mut s = format!("{rounded:.3}");
    while s.ends_with('0') {
        s.pop();
    }
    if s.ends_with('.') {
        s.pop();
    }
    s
}
