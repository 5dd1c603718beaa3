//! Instrument configuration and runtime tuning parameters.

use crate::calibration::MAX_SMOOTHING;
use crate::debouncer::MAX_STEPS;
use crate::error::ConfigError;
use crate::fingering::DecodePolicy;
use crate::pads::{DEFAULT_THRESHOLD, MAX_PADS};
use crate::scale::{ScaleMode, C, HIGHEST};

/// Fastest accepted poll rate (one poll per microsecond).
pub const MAX_POLL_FREQUENCY_HZ: u32 = 1_000_000;

// ── InstrumentConfig ─────────────────────────────────────────────────────

/// Start-up settings for the whole touch-to-note pipeline.
///
/// [`InstrumentConfig::default()`] reproduces the stock six-hole build:
/// C major, natural fingering, 1 kHz polling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct InstrumentConfig {
    /// Pads included in the touch mask. Default: 6. Max: 16.
    pub pad_count: usize,
    /// Normalized level a pad must exceed to count as touched. Default: 0x40.
    pub threshold: u8,
    /// Consecutive polls needed to flip a pad. Default: 31.
    pub debounce_steps: u8,
    /// Exponential smoothing exponent, 0 disables. Default: 0. Max: 8.
    pub smoothing: u8,
    /// MIDI note of the scale root. Default: 60.
    pub root_note: u8,
    /// Default: major.
    pub mode: ScaleMode,
    /// Default: natural.
    pub policy: DecodePolicy,
    /// Consumer poll rate in Hz. Default: 1000.
    pub poll_frequency_hz: u32,
}

impl Default for InstrumentConfig {
    fn default() -> Self {
        Self {
            pad_count: 6,
            threshold: DEFAULT_THRESHOLD,
            debounce_steps: MAX_STEPS,
            smoothing: 0,
            root_note: C,
            mode: ScaleMode::Major,
            policy: DecodePolicy::Natural,
            poll_frequency_hz: 1000,
        }
    }
}

impl InstrumentConfig {
    /// Check every field against its accepted range.
    ///
    /// ```
    /// use pennywhistle::{ConfigError, InstrumentConfig};
    ///
    /// assert!(InstrumentConfig::default().validate().is_ok());
    ///
    /// let config = InstrumentConfig { debounce_steps: 0, ..Default::default() };
    /// assert_eq!(config.validate(), Err(ConfigError::InvalidDebounceSteps));
    /// ```
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.pad_count == 0 || self.pad_count > MAX_PADS {
            return Err(ConfigError::InvalidPadCount);
        }
        if self.debounce_steps == 0 || self.debounce_steps > MAX_STEPS {
            return Err(ConfigError::InvalidDebounceSteps);
        }
        if self.smoothing > MAX_SMOOTHING {
            return Err(ConfigError::InvalidSmoothing);
        }
        if self.root_note > HIGHEST {
            return Err(ConfigError::InvalidRootNote);
        }
        if self.poll_frequency_hz == 0 || self.poll_frequency_hz > MAX_POLL_FREQUENCY_HZ {
            return Err(ConfigError::InvalidPollFrequency);
        }
        Ok(())
    }

    /// Convert the poll frequency to a timer period in microseconds.
    ///
    /// Formula: `1_000_000 / poll_frequency_hz`. A zero frequency counts as 1 Hz.
    pub fn poll_period_us(&self) -> u64 {
        1_000_000 / self.poll_frequency_hz.max(1) as u64
    }
}

// ── TuningParameter ──────────────────────────────────────────────────────

/// A setting that can be changed while playing.
///
/// Controllers address these by NRPN number. The gaps belong to the
/// half-hole threshold and the scan-hardware settings, which are not
/// handled here.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TuningParameter {
    /// Scale root note (0–127).
    Note,
    /// Scale mode selector (0–10).
    Scale,
    /// Touch threshold for every pad (0–255).
    Threshold,
    /// Debounce run length (1–31).
    Steps,
    /// Active pad count.
    PadCount,
    /// Decode policy selector (0–4).
    Fingering,
}

impl TuningParameter {
    /// Decode a controller parameter number.
    ///
    /// ```
    /// use pennywhistle::{ConfigError, TuningParameter};
    ///
    /// assert_eq!(TuningParameter::from_nrpn(2), Ok(TuningParameter::Threshold));
    /// assert_eq!(TuningParameter::from_nrpn(5), Err(ConfigError::UnsupportedParameter(5)));
    /// ```
    pub fn from_nrpn(number: u16) -> Result<Self, ConfigError> {
        match number {
            0 => Ok(TuningParameter::Note),
            1 => Ok(TuningParameter::Scale),
            2 => Ok(TuningParameter::Threshold),
            4 => Ok(TuningParameter::Steps),
            9 => Ok(TuningParameter::PadCount),
            10 => Ok(TuningParameter::Fingering),
            other => {
                #[cfg(feature = "defmt")]
                defmt::warn!("unsupported parameter number {}", other);
                Err(ConfigError::UnsupportedParameter(other))
            }
        }
    }

    /// Controller parameter number.
    pub fn nrpn(self) -> u16 {
        match self {
            TuningParameter::Note => 0,
            TuningParameter::Scale => 1,
            TuningParameter::Threshold => 2,
            TuningParameter::Steps => 4,
            TuningParameter::PadCount => 9,
            TuningParameter::Fingering => 10,
        }
    }
}

// ── Unit Tests ───────────────────────────────────────────────────────────
