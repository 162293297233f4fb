#![forbid(unsafe_code)]

//! Viewport metrics derived from the host window size.
//!
//! Hosts can query the window before layout has run, which yields zero (or
//! garbage) dimensions. Such metrics are "unmeasured": they select the
//! compact curves and impose no viewport bound, so no derived value ever
//! divides by or scales with a zero dimension.

/// Host viewport size plus the compact/wide classification.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewportMetrics {
    pub width: f64,
    pub height: f64,
    pub is_compact: bool,
}

impl ViewportMetrics {
    /// Metrics before the host has reported a size.
    pub const UNMEASURED: Self = Self {
        width: 0.0,
        height: 0.0,
        is_compact: true,
    };

    /// Classify a reported size. Widths below `compact_breakpoint` are compact.
    #[must_use]
    pub fn from_size(width: f64, height: f64, compact_breakpoint: f64) -> Self {
        let width = sanitize(width);
        let height = sanitize(height);
        if width == 0.0 || height == 0.0 {
            return Self::UNMEASURED;
        }
        Self {
            width,
            height,
            is_compact: width < compact_breakpoint,
        }
    }

    /// Whether the host has reported a usable size.
    #[inline]
    #[must_use]
    pub fn is_measured(&self) -> bool {
        self.width > 0.0 && self.height > 0.0
    }

    /// `fraction` of the viewport width, if measured.
    #[must_use]
    pub fn width_fraction(&self, fraction: f64) -> Option<f64> {
        self.is_measured().then(|| self.width * fraction)
    }

    /// `fraction` of the viewport height, if measured.
    #[must_use]
    pub fn height_fraction(&self, fraction: f64) -> Option<f64> {
        self.is_measured().then(|| self.height * fraction)
    }
}

impl Default for ViewportMetrics {
    fn default() -> Self {
        Self::UNMEASURED
    }
}

fn sanitize(v: f64) -> f64 {
    if v.is_finite() && v > 0.0 { v } else { 0.0 }
}
