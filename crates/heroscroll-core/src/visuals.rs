#![forbid(unsafe_code)]

//! Derived visual parameters.
//!
//! [`VisualFrame::compute`] is a pure function of progress, viewport, media
//! kind, and the size curves. Progress is clamped again on entry so a
//! corrupted value can never produce an out-of-range style.
//!
//! | parameter | at `p = 0` | at `p = 1` |
//! |-----------|------------|------------|
//! | size | base | curve max, bounded by the viewport |
//! | corner radius | max | 0 |
//! | title offset | 0 | full offset (vw) |
//! | text opacity | 1 | 0 (reaches 0 at `1 / falloff`) |
//! | background opacity | base | 0 (fades after the fade start) |

use serde::Serialize;

use crate::config::SizeCurves;
use crate::media::MediaKind;
use crate::viewport::ViewportMetrics;

/// Everything a renderer needs to draw one frame.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VisualFrame {
    pub progress: f64,
    /// Media box width in CSS pixels.
    pub width: f64,
    /// Media box height in CSS pixels.
    pub height: f64,
    pub corner_radius: f64,
    /// Horizontal offset of each title half, in viewport-width percent.
    /// The first word moves left, the remainder right.
    pub title_offset_vw: f64,
    /// Caption offset; half the title offset, same directions.
    pub caption_offset_vw: f64,
    pub text_opacity: f64,
    pub background_opacity: f64,
    pub overlay_opacity: f64,
    /// Opacity of the content revealed under the media.
    pub content_opacity: f64,
    pub is_compact: bool,
}

impl VisualFrame {
    #[must_use]
    pub fn compute(
        progress: f64,
        content_visible: bool,
        viewport: &ViewportMetrics,
        kind: MediaKind,
        curves: &SizeCurves,
    ) -> Self {
        let p = clamp_unit(progress);
        let compact = viewport.is_compact;
        let (max_w, max_h) = curves.max_size(compact);

        let mut width = lerp(curves.base_width, max_w, p);
        let mut height = lerp(curves.base_height, max_h, p);
        if let Some(bound) = viewport.width_fraction(curves.max_viewport_width) {
            width = width.min(bound);
        }
        if let Some(bound) = viewport.height_fraction(curves.max_viewport_height) {
            height = height.min(bound);
        }

        let title_offset_vw = p * curves.title_offset_vw(compact);
        let fade_span = 1.0 - curves.background_fade_start;
        let fade = if fade_span > 0.0 {
            clamp_unit((1.0 - p) / fade_span)
        } else {
            1.0 - p
        };

        Self {
            progress: p,
            width,
            height,
            corner_radius: curves.max_corner_radius * (1.0 - p),
            title_offset_vw,
            caption_offset_vw: title_offset_vw * 0.5,
            text_opacity: clamp_unit(1.0 - p * curves.text_falloff),
            background_opacity: curves.background_base_opacity * fade,
            overlay_opacity: kind.overlay_opacity(p),
            content_opacity: if content_visible { 1.0 } else { 0.0 },
            is_compact: compact,
        }
    }

    /// Title offset in pixels for the current viewport (0 when unmeasured).
    #[must_use]
    pub fn title_offset_px(&self, viewport: &ViewportMetrics) -> f64 {
        viewport
            .width_fraction(self.title_offset_vw / 100.0)
            .unwrap_or(0.0)
    }
}

#[inline]
fn lerp(from: f64, to: f64, t: f64) -> f64 {
    from + t * (to - from)
}

#[inline]
fn clamp_unit(v: f64) -> f64 {
    if v.is_finite() { v.clamp(0.0, 1.0) } else { 0.0 }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn wide() -> ViewportMetrics {
        ViewportMetrics::from_size(1920.0, 1080.0, 768.0)
    }

    fn frame(p: f64, viewport: &ViewportMetrics) -> VisualFrame {
        VisualFrame::compute(p, false, viewport, MediaKind::Video, &SizeCurves::default())
    }

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn starts_at_base_size() {
        let f = frame(0.0, &wide());
        assert_eq!((f.width, f.height), (300.0, 400.0));
        assert_eq!(f.corner_radius, 12.0);
        assert_eq!(f.text_opacity, 1.0);
        assert_eq!(f.background_opacity, 1.0);
        assert_eq!(f.title_offset_vw, 0.0);
    }

    #[test]
    fn wide_end_state_is_bounded_by_viewport() {
        let f = frame(1.0, &wide());
        // 1550 wide fits in 95% of 1920; 800 tall fits in 90% of 1080.
        assert_eq!(f.width, 1550.0);
        assert_eq!(f.height, 800.0);
        assert_eq!(f.corner_radius, 0.0);
        assert_eq!(f.background_opacity, 0.0);
        assert_eq!(f.text_opacity, 0.0);
        assert_eq!(f.title_offset_vw, 150.0);
        assert_eq!(f.caption_offset_vw, 75.0);
    }

    #[test]
    fn small_viewport_caps_size() {
        let vp = ViewportMetrics::from_size(1000.0, 600.0, 768.0);
        let f = frame(1.0, &vp);
        assert!(approx(f.width, 950.0));
        assert!(approx(f.height, 540.0));
    }

    #[test]
    fn compact_uses_compact_curves() {
        let vp = ViewportMetrics::from_size(390.0, 844.0, 768.0);
        let f = frame(0.5, &vp);
        assert!(f.is_compact);
        // 300 + 0.5 * 650 = 625, capped at 0.95 * 390.
        assert!(approx(f.width, 370.5));
        assert!(approx(f.height, 500.0));
        assert!(approx(f.title_offset_vw, 90.0));
    }

    #[test]
    fn unmeasured_viewport_has_no_bound() {
        let f = frame(1.0, &ViewportMetrics::UNMEASURED);
        assert!(f.is_compact);
        assert_eq!((f.width, f.height), (950.0, 600.0));
        assert!(f.width.is_finite() && f.height.is_finite());
        assert_eq!(f.title_offset_px(&ViewportMetrics::UNMEASURED), 0.0);
    }

    #[test]
    fn text_fades_before_full_expansion() {
        let f = frame(0.4, &wide());
        assert!(approx(f.text_opacity, 0.4));
        let f = frame(0.7, &wide());
        assert_eq!(f.text_opacity, 0.0);
    }

    #[test]
    fn background_holds_until_fade_start() {
        assert_eq!(frame(0.5, &wide()).background_opacity, 1.0);
        assert_eq!(frame(0.8, &wide()).background_opacity, 1.0);
        assert!(approx(frame(0.9, &wide()).background_opacity, 0.5));
    }

    #[test]
    fn out_of_range_progress_is_clamped() {
        let f = frame(7.0, &wide());
        assert_eq!(f.progress, 1.0);
        let f = frame(f64::NAN, &wide());
        assert_eq!(f.progress, 0.0);
        assert_eq!(f.width, 300.0);
    }

    #[test]
    fn content_opacity_follows_flag() {
        let f = VisualFrame::compute(
            0.8,
            true,
            &wide(),
            MediaKind::Image,
            &SizeCurves::default(),
        );
        assert_eq!(f.content_opacity, 1.0);
        assert!(approx(f.overlay_opacity, 0.7 - 0.24));
    }

    #[test]
    fn title_offset_px_scales_with_width() {
        let vp = wide();
        let f = frame(0.5, &vp);
        assert!(approx(f.title_offset_px(&vp), 1920.0 * 0.75));
    }
}
