#![forbid(unsafe_code)]

//! Deterministic input storms for stress testing the controller.
//!
//! | Pattern | Description |
//! |---------|-------------|
//! | [`BurstPattern::WheelFlood`] | High-frequency forward-biased wheel ticks |
//! | [`BurstPattern::Jitter`] | Small wheel deltas reversing direction every event |
//! | [`BurstPattern::TouchSwipes`] | Complete touch gestures, up and down |
//! | [`BurstPattern::ResizeStorm`] | Rapid viewport resizes across the breakpoint |
//! | [`BurstPattern::Mixed`] | Interleaved wheel, touch, pinch-zoom, resize |
//!
//! Every step carries the [`Placement`] the host would have measured, so
//! visibility-dependent arbitration is exercised too.

use crate::controller::{ExpandController, Placement};
use crate::event::{InputEvent, Modifiers, TouchEvent, TouchPhase, WheelEvent};

// ============================================================================
// Configuration
// ============================================================================

/// Pattern type for storm generation.
#[derive(Debug, Clone, PartialEq)]
pub enum BurstPattern {
    WheelFlood { count: usize },
    Jitter { count: usize, amplitude: f64 },
    TouchSwipes { swipes: usize, steps: usize },
    ResizeStorm { count: usize },
    Mixed { count: usize },
}

impl BurstPattern {
    /// Pattern name for logging.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::WheelFlood { .. } => "wheel_flood",
            Self::Jitter { .. } => "jitter",
            Self::TouchSwipes { .. } => "touch_swipes",
            Self::ResizeStorm { .. } => "resize_storm",
            Self::Mixed { .. } => "mixed",
        }
    }
}

/// One generated input plus the placement observed with it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StormStep {
    pub event: InputEvent,
    pub placement: Placement,
}

/// Generated storm.
#[derive(Debug, Clone)]
pub struct InputStorm {
    pub steps: Vec<StormStep>,
    pub pattern_name: &'static str,
    pub seed: u64,
}

/// Tallies from driving a storm through a controller.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct StormReport {
    pub events: usize,
    pub consumed: usize,
    pub passed_through: usize,
    /// Steps after which progress was outside `[0, 1]` or non-finite.
    pub out_of_bounds: usize,
    pub final_progress: f64,
}

impl InputStorm {
    /// Feed every step to `controller` in order.
    pub fn drive(&self, controller: &mut ExpandController) -> StormReport {
        let mut report = StormReport::default();
        for step in &self.steps {
            let response = controller.handle(&step.event, step.placement);
            report.events += 1;
            if response.is_consumed() {
                report.consumed += 1;
            } else {
                report.passed_through += 1;
            }
            let p = controller.progress();
            if !(p.is_finite() && (0.0..=1.0).contains(&p)) {
                report.out_of_bounds += 1;
            }
        }
        report.final_progress = controller.progress();
        report
    }
}

// ============================================================================
// Event Generation
// ============================================================================

/// xorshift64; reproducible across platforms.
struct Rng {
    state: u64,
}

impl Rng {
    fn new(seed: u64) -> Self {
        Self {
            state: if seed == 0 { 1 } else { seed },
        }
    }

    fn next(&mut self) -> u64 {
        self.state ^= self.state << 13;
        self.state ^= self.state >> 7;
        self.state ^= self.state << 17;
        self.state
    }

    /// Uniform in `[lo, hi)`.
    fn range(&mut self, lo: f64, hi: f64) -> f64 {
        let unit = (self.next() >> 11) as f64 / (1u64 << 53) as f64;
        lo + unit * (hi - lo)
    }

    fn chance(&mut self, percent: u64) -> bool {
        self.next() % 100 < percent
    }

    fn placement(&mut self, viewport_height: f64) -> Placement {
        if self.chance(20) {
            Placement::UNKNOWN
        } else {
            Placement::at(self.range(0.4, 1.05) * viewport_height)
        }
    }
}

const STORM_VIEWPORT_HEIGHT: f64 = 800.0;

/// Generate a deterministic storm for `pattern`.
#[must_use]
pub fn generate_storm(pattern: &BurstPattern, seed: u64) -> InputStorm {
    let mut rng = Rng::new(seed);
    let steps = match pattern {
        BurstPattern::WheelFlood { count } => wheel_flood(*count, &mut rng),
        BurstPattern::Jitter { count, amplitude } => jitter(*count, *amplitude, &mut rng),
        BurstPattern::TouchSwipes { swipes, steps } => touch_swipes(*swipes, *steps, &mut rng),
        BurstPattern::ResizeStorm { count } => resize_storm(*count, &mut rng),
        BurstPattern::Mixed { count } => mixed(*count, &mut rng),
    };
    InputStorm {
        steps,
        pattern_name: pattern.name(),
        seed,
    }
}

fn step(event: InputEvent, placement: Placement) -> StormStep {
    StormStep { event, placement }
}

fn wheel_flood(count: usize, rng: &mut Rng) -> Vec<StormStep> {
    (0..count)
        .map(|_| {
            let magnitude = rng.range(1.0, 120.0);
            let dy = if rng.chance(80) { magnitude } else { -magnitude };
            step(
                InputEvent::Wheel(WheelEvent::new(dy)),
                rng.placement(STORM_VIEWPORT_HEIGHT),
            )
        })
        .collect()
}

fn jitter(count: usize, amplitude: f64, rng: &mut Rng) -> Vec<StormStep> {
    (0..count)
        .map(|i| {
            let magnitude = rng.range(0.0, amplitude);
            let dy = if i % 2 == 0 { magnitude } else { -magnitude };
            // Jitter happens right at the visibility threshold.
            let bottom = STORM_VIEWPORT_HEIGHT * rng.range(0.88, 0.92);
            step(InputEvent::Wheel(WheelEvent::new(dy)), Placement::at(bottom))
        })
        .collect()
}

fn touch_swipes(swipes: usize, steps: usize, rng: &mut Rng) -> Vec<StormStep> {
    let mut out = Vec::with_capacity(swipes * (steps + 2));
    for _ in 0..swipes {
        let placement = rng.placement(STORM_VIEWPORT_HEIGHT);
        let up = rng.chance(60);
        let mut y = rng.range(200.0, 600.0);
        out.push(step(InputEvent::Touch(TouchEvent::start(y)), placement));
        for _ in 0..steps {
            let travel = rng.range(1.0, 30.0);
            y += if up { -travel } else { travel };
            out.push(step(InputEvent::Touch(TouchEvent::moved(y)), placement));
        }
        let end = if rng.chance(90) {
            TouchEvent::end()
        } else {
            TouchEvent {
                phase: TouchPhase::Cancel,
                y,
            }
        };
        out.push(step(InputEvent::Touch(end), placement));
    }
    out
}

fn resize(rng: &mut Rng) -> InputEvent {
    InputEvent::Resize {
        width: rng.range(320.0, 1920.0).round(),
        height: rng.range(480.0, 1200.0).round(),
    }
}

fn resize_storm(count: usize, rng: &mut Rng) -> Vec<StormStep> {
    (0..count)
        .map(|_| step(resize(rng), Placement::UNKNOWN))
        .collect()
}

fn mixed(count: usize, rng: &mut Rng) -> Vec<StormStep> {
    let mut out = Vec::with_capacity(count);
    let mut touch_y: Option<f64> = None;
    for _ in 0..count {
        let placement = rng.placement(STORM_VIEWPORT_HEIGHT);
        let event = match rng.next() % 10 {
            0..=4 => {
                let dy = rng.range(-150.0, 200.0);
                InputEvent::Wheel(WheelEvent::new(dy))
            }
            5..=7 => match touch_y {
                None => {
                    let y = rng.range(200.0, 600.0);
                    touch_y = Some(y);
                    InputEvent::Touch(TouchEvent::start(y))
                }
                Some(_) if rng.chance(15) => {
                    touch_y = None;
                    InputEvent::Touch(TouchEvent::end())
                }
                Some(y) => {
                    let next = y + rng.range(-40.0, 30.0);
                    touch_y = Some(next);
                    InputEvent::Touch(TouchEvent::moved(next))
                }
            },
            8 => InputEvent::Wheel(
                WheelEvent::new(rng.range(-50.0, 50.0)).with_modifiers(Modifiers::CTRL),
            ),
            _ => resize(rng),
        };
        out.push(step(event, placement));
    }
    out
}
