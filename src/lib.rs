//! Capacitive touch pads to MIDI notes for a woodwind-style controller.
//!
//! This crate is the signal-to-symbol core of the instrument: it turns
//! drifting, glitchy capacitive readings into a stable touch bitmask and
//! decodes that mask into a note under a selectable fingering scheme.
//!
//! # Architecture
//!
//! ```text
//! scan ISR ──► SharedCalibrator::on_samples    (smooth, min/max, glitches)
//!                    │ snapshot (critical section)
//!                    ▼
//! poll loop ─► PadReader::poll                 (normalize, threshold, debounce)
//!                    │ touch mask, bit i ↔ pad i
//!                    ▼
//!              Fingering::translate            (policy + scale → note)
//!                    │
//!                    ▼
//!              note queue                      (0–127, or NO_NOTE = 255)
//! ```
//!
//! [`Whistle`] combines the reader and decoder on the consumer side;
//! [`PadBank`] is the same pipeline without the producer/consumer split.
//!
//! # Quick Start
//!
//! ```
//! # use critical_section as _;
//! use pennywhistle::{InstrumentConfig, SharedCalibrator, Whistle};
//!
//! static CALIBRATION: SharedCalibrator<6> = SharedCalibrator::new();
//!
//! let config = InstrumentConfig { debounce_steps: 1, ..Default::default() };
//! let mut whistle = Whistle::<6>::from_config(&config).unwrap();
//!
//! // Producer side, once per hardware scan:
//! CALIBRATION.on_samples(&[900; 6]);
//! CALIBRATION.on_samples(&[1800; 6]);
//!
//! // Consumer side, at the poll rate:
//! assert_eq!(whistle.update(&CALIBRATION.snapshot()), Some(60));
//! ```
//!
//! # Crate Features
//!
//! - **`defmt`**: structured logging via [`defmt`](https://docs.rs/defmt).
//! - **`task`**: the async `fingering_task` loop (pulls in `embassy-time`).
//!
//! # `no_std` Compatibility
//!
//! No heap allocation. Pad banks are fixed-size arrays sized by a const
//! generic `N` (at most [`MAX_PADS`](pads::MAX_PADS)).

#![no_std]

pub mod calibration;
pub mod config;
pub mod debouncer;
pub mod error;
pub mod fingering;
pub mod instrument;
pub mod pads;
pub mod scale;
pub mod shared;
#[cfg(feature = "task")]
pub mod task;

// ── Re-exports for convenience ───────────────────────────────────────────

pub use calibration::{CalibrationSnapshot, Calibrator, ChannelCalibration};
pub use config::{InstrumentConfig, TuningParameter};
pub use debouncer::Debouncer;
pub use error::ConfigError;
pub use fingering::{decode, DecodePolicy, Fingering, StrongBase, NO_NOTE};
pub use instrument::{ChannelReport, Diagnostics, Whistle};
pub use pads::{PadBank, PadReader, MAX_PADS};
pub use scale::{note_label, Scale, ScaleMode};
pub use shared::SharedCalibrator;
#[cfg(feature = "task")]
pub use task::{fingering_task, poll_once};
