#![forbid(unsafe_code)]

//! Deterministic session recording and replay.
//!
//! [`SessionRecorder`] wraps an [`ExpandController`] and records every
//! operation the host performs on it together with a checksum of the
//! resulting state. [`replay`] runs a recorded [`SessionTrace`] through a
//! fresh controller and stops at the first record whose checksum differs.
//!
//! # Trace format (`heroscroll-trace-v1`)
//!
//! One JSON object per line, tagged by `type`:
//!
//! - **header**: schema, full controller config, initial viewport.
//! - **input**: one input event plus the element placement it saw.
//! - **reset**: explicit controller reset.
//! - **fire_auto_advance**: the host timer for `token` elapsed.
//! - **summary**: record count and final checksum chain.
//!
//! Each non-header record carries `checksum`, the FNV-1a chain over
//! `(disposition, progress bits, complete, released)` after the operation.
//!
//! # Determinism contract
//!
//! The controller has no clock and no randomness, so identical records
//! through the same build produce identical checksums.

use serde::{Deserialize, Serialize};

use crate::config::ExpandConfig;
use crate::controller::{Effect, ExpandController, Placement, Response};
use crate::error::{ConfigError, ReplayError};
use crate::event::{InputEvent, Modifiers, TouchEvent, TouchPhase, WheelEvent};
use crate::gate::Disposition;

/// Schema version for session traces.
pub const SCHEMA_VERSION: &str = "heroscroll-trace-v1";

const FNV_OFFSET_BASIS: u64 = 0xcbf29ce484222325;
const FNV_PRIME: u64 = 0x100000001b3;

fn fnv1a64_bytes(mut hash: u64, bytes: &[u8]) -> u64 {
    for &b in bytes {
        hash ^= u64::from(b);
        hash = hash.wrapping_mul(FNV_PRIME);
    }
    hash
}

fn fnv1a64_pair(prev: u64, next: u64) -> u64 {
    let hash = fnv1a64_bytes(FNV_OFFSET_BASIS, &prev.to_le_bytes());
    fnv1a64_bytes(hash, &next.to_le_bytes())
}

/// Digest of the observable controller state after one operation.
fn state_digest(disposition: Option<Disposition>, controller: &ExpandController) -> u64 {
    let disposition = match disposition {
        None => 0u8,
        Some(Disposition::Consume) => 1,
        Some(Disposition::PassThrough) => 2,
    };
    let mut hash = fnv1a64_bytes(FNV_OFFSET_BASIS, &[disposition]);
    hash = fnv1a64_bytes(hash, &controller.progress().to_bits().to_le_bytes());
    fnv1a64_bytes(
        hash,
        &[
            u8::from(controller.is_complete()),
            u8::from(controller.is_released()),
        ],
    )
}

// ---------------------------------------------------------------------------
// Records
// ---------------------------------------------------------------------------

/// Serialized form of an [`InputEvent`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum InputRecord {
    Wheel {
        dy: f64,
        #[serde(default)]
        mods: u8,
    },
    Touch {
        phase: TouchPhaseRecord,
        y: f64,
    },
    Resize {
        width: f64,
        height: f64,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TouchPhaseRecord {
    Start,
    Move,
    End,
    Cancel,
}

impl From<TouchPhase> for TouchPhaseRecord {
    fn from(phase: TouchPhase) -> Self {
        match phase {
            TouchPhase::Start => Self::Start,
            TouchPhase::Move => Self::Move,
            TouchPhase::End => Self::End,
            TouchPhase::Cancel => Self::Cancel,
        }
    }
}

impl From<TouchPhaseRecord> for TouchPhase {
    fn from(phase: TouchPhaseRecord) -> Self {
        match phase {
            TouchPhaseRecord::Start => Self::Start,
            TouchPhaseRecord::Move => Self::Move,
            TouchPhaseRecord::End => Self::End,
            TouchPhaseRecord::Cancel => Self::Cancel,
        }
    }
}

impl From<&InputEvent> for InputRecord {
    fn from(event: &InputEvent) -> Self {
        match event {
            InputEvent::Wheel(w) => Self::Wheel {
                dy: w.delta_y,
                mods: w.modifiers.bits(),
            },
            InputEvent::Touch(t) => Self::Touch {
                phase: t.phase.into(),
                y: t.y,
            },
            InputEvent::Resize { width, height } => Self::Resize {
                width: *width,
                height: *height,
            },
        }
    }
}

impl InputRecord {
    #[must_use]
    pub fn to_event(&self) -> InputEvent {
        match *self {
            Self::Wheel { dy, mods } => InputEvent::Wheel(
                WheelEvent::new(dy).with_modifiers(Modifiers::from_bits_truncate_u8(mods)),
            ),
            Self::Touch { phase, y } => InputEvent::Touch(TouchEvent {
                phase: phase.into(),
                y,
            }),
            Self::Resize { width, height } => InputEvent::Resize { width, height },
        }
    }
}

/// A single line of a session trace.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TraceRecord {
    /// Session header (must be first).
    Header {
        schema: String,
        config: ExpandConfig,
        viewport_width: f64,
        viewport_height: f64,
    },
    Input {
        seq: u64,
        event: InputRecord,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        element_bottom: Option<f64>,
        checksum: u64,
    },
    Reset {
        seq: u64,
        checksum: u64,
    },
    FireAutoAdvance {
        seq: u64,
        token: u64,
        checksum: u64,
    },
    /// Trace summary (must be last).
    Summary {
        total_records: u64,
        final_checksum: u64,
    },
}

impl TraceRecord {
    fn checksum(&self) -> Option<(u64, u64)> {
        match self {
            Self::Input { seq, checksum, .. }
            | Self::Reset { seq, checksum }
            | Self::FireAutoAdvance { seq, checksum, .. } => Some((*seq, *checksum)),
            Self::Header { .. } | Self::Summary { .. } => None,
        }
    }
}

/// A complete recorded session.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionTrace {
    pub records: Vec<TraceRecord>,
}

impl SessionTrace {
    /// Number of checksummed operation records.
    #[must_use]
    pub fn operation_count(&self) -> u64 {
        self.records.iter().filter(|r| r.checksum().is_some()).count() as u64
    }

    #[must_use]
    pub fn final_checksum(&self) -> Option<u64> {
        self.records.iter().rev().find_map(|r| match r {
            TraceRecord::Summary { final_checksum, .. } => Some(*final_checksum),
            _ => None,
        })
    }

    /// One JSON object per line.
    pub fn to_jsonl(&self) -> serde_json::Result<String> {
        let mut out = String::new();
        for record in &self.records {
            out.push_str(&serde_json::to_string(record)?);
            out.push('\n');
        }
        Ok(out)
    }

    /// Parse a JSONL trace. Blank lines are skipped.
    pub fn from_jsonl(input: &str) -> Result<Self, ReplayError> {
        let mut records = Vec::new();
        for (idx, line) in input.lines().enumerate() {
            if line.trim().is_empty() {
                continue;
            }
            let record =
                serde_json::from_str::<TraceRecord>(line).map_err(|e| ReplayError::Malformed {
                    line: idx + 1,
                    message: e.to_string(),
                })?;
            records.push(record);
        }
        Ok(Self { records })
    }
}

// ---------------------------------------------------------------------------
// Recorder
// ---------------------------------------------------------------------------

/// Records every operation performed on a controller.
#[derive(Debug)]
pub struct SessionRecorder {
    controller: ExpandController,
    records: Vec<TraceRecord>,
    checksum_chain: u64,
    seq: u64,
}

impl SessionRecorder {
    /// Build the controller and write the header.
    pub fn new(config: ExpandConfig, width: f64, height: f64) -> Result<Self, ConfigError> {
        let mut controller = ExpandController::new(config.clone())?;
        controller.resize(width, height);
        Ok(Self {
            controller,
            records: vec![TraceRecord::Header {
                schema: SCHEMA_VERSION.to_string(),
                config,
                viewport_width: width,
                viewport_height: height,
            }],
            checksum_chain: 0,
            seq: 0,
        })
    }

    #[must_use]
    pub fn controller(&self) -> &ExpandController {
        &self.controller
    }

    pub fn handle(&mut self, event: &InputEvent, placement: Placement) -> Response {
        let response = self.controller.handle(event, placement);
        let checksum = self.advance_chain(Some(response.disposition));
        self.records.push(TraceRecord::Input {
            seq: self.seq,
            event: event.into(),
            element_bottom: placement.element_bottom,
            checksum,
        });
        self.seq += 1;
        response
    }

    pub fn reset(&mut self) -> Option<Effect> {
        let effect = self.controller.reset();
        let checksum = self.advance_chain(None);
        self.records.push(TraceRecord::Reset {
            seq: self.seq,
            checksum,
        });
        self.seq += 1;
        effect
    }

    pub fn fire_auto_advance(&mut self, token: u64) -> Option<Effect> {
        let effect = self.controller.fire_auto_advance(token);
        let checksum = self.advance_chain(None);
        self.records.push(TraceRecord::FireAutoAdvance {
            seq: self.seq,
            token,
            checksum,
        });
        self.seq += 1;
        effect
    }

    /// Close the trace with a summary record.
    #[must_use]
    pub fn finish(mut self) -> SessionTrace {
        self.records.push(TraceRecord::Summary {
            total_records: self.seq,
            final_checksum: self.checksum_chain,
        });
        SessionTrace {
            records: self.records,
        }
    }

    fn advance_chain(&mut self, disposition: Option<Disposition>) -> u64 {
        let digest = state_digest(disposition, &self.controller);
        self.checksum_chain = fnv1a64_pair(self.checksum_chain, digest);
        self.checksum_chain
    }
}

// ---------------------------------------------------------------------------
// Replay
// ---------------------------------------------------------------------------

/// Outcome of a successful replay.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReplayResult {
    pub total_records: u64,
    pub final_checksum: u64,
}

/// Replay `trace` through a fresh controller built from its header.
///
/// Fails on the first record whose checksum differs from the recording.
pub fn replay(trace: &SessionTrace) -> Result<ReplayResult, ReplayError> {
    let Some(TraceRecord::Header {
        schema,
        config,
        viewport_width,
        viewport_height,
    }) = trace.records.first()
    else {
        return Err(ReplayError::MissingHeader);
    };
    if schema != SCHEMA_VERSION {
        return Err(ReplayError::UnsupportedSchema {
            found: schema.clone(),
        });
    }

    let mut controller =
        ExpandController::new(config.clone()).map_err(|e| ReplayError::InvalidConfig {
            message: e.to_string(),
        })?;
    controller.resize(*viewport_width, *viewport_height);

    let mut chain = 0u64;
    let mut replayed = 0u64;
    for record in &trace.records[1..] {
        let disposition = match record {
            TraceRecord::Input {
                event,
                element_bottom,
                ..
            } => {
                let placement = Placement {
                    element_bottom: *element_bottom,
                };
                Some(controller.handle(&event.to_event(), placement).disposition)
            }
            TraceRecord::Reset { .. } => {
                let _ = controller.reset();
                None
            }
            TraceRecord::FireAutoAdvance { token, .. } => {
                let _ = controller.fire_auto_advance(*token);
                None
            }
            TraceRecord::Summary { total_records, .. } => {
                if *total_records != replayed {
                    return Err(ReplayError::RecordCountMismatch {
                        expected: *total_records,
                        actual: replayed,
                    });
                }
                continue;
            }
            TraceRecord::Header { .. } => continue,
        };

        chain = fnv1a64_pair(chain, state_digest(disposition, &controller));
        if let Some((seq, expected)) = record.checksum()
            && expected != chain
        {
            return Err(ReplayError::ChecksumMismatch {
                seq,
                expected,
                actual: chain,
            });
        }
        replayed += 1;
    }

    Ok(ReplayResult {
        total_records: replayed,
        final_checksum: chain,
    })
}
