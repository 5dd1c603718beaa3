//! Adaptive per-channel calibration of raw capacitive readings.
//!
//! The [`Calibrator`] runs in the sample producer's context: it receives one
//! frame of raw readings per hardware scan, rejects saturation glitches,
//! smooths each channel with an exponential average and tracks the running
//! minimum and maximum of the smoothed value. The consumer never reads the
//! calibrator directly; it works on a [`CalibrationSnapshot`] copied out in
//! one piece (see [`SharedCalibrator`](crate::SharedCalibrator)).
//!
//! Normalization to 0–255 ([`normalize`]) happens on the consumer side at
//! poll time, not per sample.

use crate::config::InstrumentConfig;
use crate::error::ConfigError;

/// Number of sample frames between automatic calibration resets.
pub const RESET_INTERVAL: u32 = 256;

/// Observed range below which a channel normalizes to 0.
pub const MIN_RANGE: u16 = 5;

/// Largest accepted smoothing exponent.
pub const MAX_SMOOTHING: u8 = 8;

/// Reading reported by a shorted or saturated electrode.
pub const SAMPLE_FLOOR: u16 = 0;

/// Reading reported by a disconnected or overflowing electrode.
pub const SAMPLE_CEILING: u16 = u16::MAX;

/// Exponential moving average with weight `1 / 2^expo` on the new value.
///
/// `expo == 0` returns `val` unchanged. Exponents above 8 are clamped.
///
/// ```
/// use pennywhistle::calibration::smooth;
///
/// assert_eq!(smooth(100, 200, 0), 200);
/// assert_eq!(smooth(100, 200, 1), 150);
/// assert_eq!(smooth(100, 200, 2), 125);
/// ```
pub fn smooth(avg: u16, val: u16, expo: u8) -> u16 {
    let expo = expo.min(MAX_SMOOTHING) as u32;
    if expo == 0 {
        return val;
    }
    let weight = (1u32 << expo) - 1;
    ((weight * avg as u32 + val as u32) >> expo) as u16
}

/// Scale `value` into 0–255 relative to the observed `[min, max]` range.
///
/// A range narrower than [`MIN_RANGE`] (including the empty range left by a
/// reset, where `min > max`) yields 0, which reads as "untouched".
///
/// ```
/// use pennywhistle::calibration::normalize;
///
/// assert_eq!(normalize(100, 100, 200), 0);
/// assert_eq!(normalize(150, 100, 200), 127);
/// assert_eq!(normalize(250, 100, 200), 255);
/// assert_eq!(normalize(150, 100, 102), 0);
/// ```
pub fn normalize(value: u16, min: u16, max: u16) -> u8 {
    let range = max.saturating_sub(min);
    if range < MIN_RANGE {
        return 0;
    }
    let excess = value.saturating_sub(min);
    if excess >= range {
        return 255;
    }
    (255 * excess as u32 / range as u32) as u8
}

// ── ChannelCalibration ───────────────────────────────────────────────────

/// Calibration state of one pad, owned by the producer side.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ChannelCalibration {
    /// Latest reading, after glitch substitution.
    pub raw: u16,
    /// Smoothed reading. Zero until the first sample after a reset.
    pub average: u16,
    /// Smallest smoothed reading since the last reset (`u16::MAX` when none).
    pub min: u16,
    /// Largest smoothed reading since the last reset (0 when none).
    pub max: u16,
    /// Saturated or disconnected readings seen since startup (wrapping).
    pub glitches: u16,
}

impl Default for ChannelCalibration {
    fn default() -> Self {
        Self::EMPTY
    }
}

impl ChannelCalibration {
    /// Startup state: no baseline, no readings.
    pub const EMPTY: Self = Self {
        raw: 0,
        average: 0,
        min: u16::MAX,
        max: 0,
        glitches: 0,
    };

    /// Forget the observed range so it can re-adapt to drift.
    ///
    /// The latest reading and the glitch counter survive a reset.
    pub fn reset(&mut self) {
        self.average = 0;
        self.min = u16::MAX;
        self.max = 0;
    }

    /// `true` once a sample has been accepted since the last reset.
    pub fn has_baseline(&self) -> bool {
        self.min <= self.max
    }

    /// Accept one raw reading.
    pub fn update(&mut self, sample: u16, smoothing: u8) {
        let val = if sample == SAMPLE_FLOOR || sample == SAMPLE_CEILING {
            self.glitches = self.glitches.wrapping_add(1);
            if !self.has_baseline() {
                return;
            }
            self.min
        } else {
            sample
        };

        self.raw = val;
        if self.average == 0 {
            self.average = val;
        }
        self.average = smooth(self.average, val, smoothing);
        self.max = self.max.max(self.average);
        self.min = self.min.min(self.average);
    }

    /// Width of the observed range (0 without a baseline).
    pub fn range(&self) -> u16 {
        self.max.saturating_sub(self.min)
    }

    /// Latest reading scaled into 0–255, see [`normalize`].
    pub fn normalized(&self) -> u8 {
        normalize(self.raw, self.min, self.max)
    }
}

// ── Calibrator ───────────────────────────────────────────────────────────

/// Copy of the whole calibration state, taken atomically by the consumer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct CalibrationSnapshot<const N: usize> {
    /// Per-channel state, indexed by channel.
    pub channels: [ChannelCalibration; N],
    /// Sample frames received since startup (wrapping).
    pub frames: u32,
}

impl<const N: usize> Default for CalibrationSnapshot<N> {
    fn default() -> Self {
        Self {
            channels: [ChannelCalibration::EMPTY; N],
            frames: 0,
        }
    }
}

/// Producer-side calibration for a bank of `N` pads.
///
/// # Examples
///
/// ```
/// use pennywhistle::calibration::Calibrator;
///
/// let mut cal = Calibrator::<2>::new();
/// cal.on_samples(&[1000, 2000]);
/// cal.on_samples(&[1200, 1900]);
///
/// let snap = cal.snapshot();
/// assert_eq!(snap.frames, 2);
/// assert_eq!(snap.channels[0].min, 1000);
/// assert_eq!(snap.channels[0].max, 1200);
/// ```
#[derive(Debug, Clone)]
pub struct Calibrator<const N: usize> {
    channels: [ChannelCalibration; N],
    smoothing: u8,
    frames: u32,
}

impl<const N: usize> Default for Calibrator<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const N: usize> Calibrator<N> {
    /// Create a calibrator with no smoothing and empty channels.
    pub const fn new() -> Self {
        Self {
            channels: [ChannelCalibration::EMPTY; N],
            smoothing: 0,
            frames: 0,
        }
    }

    /// Create a calibrator with the given smoothing exponent.
    pub fn with_smoothing(smoothing: u8) -> Result<Self, ConfigError> {
        let mut calibrator = Self::new();
        calibrator.set_smoothing(smoothing)?;
        Ok(calibrator)
    }

    /// Create a calibrator with the smoothing exponent of `config`.
    pub fn from_config(config: &InstrumentConfig) -> Result<Self, ConfigError> {
        Self::with_smoothing(config.smoothing)
    }

    /// Process one frame of raw readings, `samples[i]` belonging to channel `i`.
    ///
    /// Every [`RESET_INTERVAL`]-th frame resets the calibration before the
    /// frame is applied. Entries beyond `N` are ignored; channels without an
    /// entry keep their state.
    pub fn on_samples(&mut self, samples: &[u16]) {
        self.frames = self.frames.wrapping_add(1);
        if self.frames % RESET_INTERVAL == 0 {
            self.reset();
        }

        #[cfg(feature = "defmt")]
        {
            if samples.len() > N {
                defmt::warn!("on_samples: {} samples for {} pads", samples.len(), N);
            }
            if self.frames % RESET_INTERVAL == 0 {
                defmt::debug!("calibration reset at frame {}", self.frames);
            }
        }

        let smoothing = self.smoothing;
        for (channel, &sample) in self.channels.iter_mut().zip(samples) {
            channel.update(sample, smoothing);
        }
    }

    /// Reset every channel's observed range.
    pub fn reset(&mut self) {
        for channel in &mut self.channels {
            channel.reset();
        }
    }

    /// Set the smoothing exponent (0 disables smoothing).
    ///
    /// Returns [`ConfigError::InvalidSmoothing`] if `smoothing > 8`.
    pub fn set_smoothing(&mut self, smoothing: u8) -> Result<(), ConfigError> {
        if smoothing > MAX_SMOOTHING {
            #[cfg(feature = "defmt")]
            defmt::warn!("set_smoothing: {} out of range", smoothing);
            return Err(ConfigError::InvalidSmoothing);
        }
        self.smoothing = smoothing;
        Ok(())
    }

    /// Current smoothing exponent.
    pub fn smoothing(&self) -> u8 {
        self.smoothing
    }

    /// Sample frames received since startup.
    pub fn frames(&self) -> u32 {
        self.frames
    }

    /// Calibration state of one channel, `None` if out of bounds.
    pub fn channel(&self, idx: usize) -> Option<&ChannelCalibration> {
        self.channels.get(idx)
    }

    /// Copy out the full state.
    pub fn snapshot(&self) -> CalibrationSnapshot<N> {
        CalibrationSnapshot {
            channels: self.channels,
            frames: self.frames,
        }
    }
}

// ── Unit Tests ───────────────────────────────────────────────────────────
