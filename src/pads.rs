//! Touch detection: normalized readings → debounced booleans → bitmask.
//!
//! [`PadReader`] is the consumer half of the pad state. It owns one
//! [`Debouncer`] and one threshold per channel and turns a
//! [`CalibrationSnapshot`] into the aggregated touch mask, bit `i` set while
//! channel `i` reads above its threshold (finger on the pad, hole covered).
//! [`PadBank`] bundles a [`Calibrator`] with a reader for callers that feed
//! samples and poll from the same context.

use crate::calibration::{CalibrationSnapshot, Calibrator};
use crate::debouncer::{Debouncer, DEFAULT_STEPS};
use crate::error::ConfigError;

/// Largest pad bank a `u16` touch mask can describe.
pub const MAX_PADS: usize = 16;

/// Normalized level a channel must exceed to count as touched.
pub const DEFAULT_THRESHOLD: u8 = 0x40;

// ── PadReader ────────────────────────────────────────────────────────────

/// Consumer-side touch state for `N` pads (`1 <= N <= 16`).
///
/// # Examples
///
/// ```
/// use pennywhistle::calibration::Calibrator;
/// use pennywhistle::pads::PadReader;
///
/// let mut cal = Calibrator::<2>::new();
/// let mut reader = PadReader::<2>::new();
/// reader.set_debounce_steps(1).unwrap();
///
/// cal.on_samples(&[1000, 1000]);
/// cal.on_samples(&[1000, 2000]);
/// assert!(reader.poll(&cal.snapshot()));
/// assert_eq!(reader.last_touch(), 0b10);
///
/// // Same state again: nothing to report.
/// assert!(!reader.poll(&cal.snapshot()));
/// ```
#[derive(Debug, Clone)]
pub struct PadReader<const N: usize> {
    debouncers: [Debouncer; N],
    thresholds: [u8; N],
    normalized: [u8; N],
    active: usize,
    last_touch: u16,
}

impl<const N: usize> Default for PadReader<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const N: usize> PadReader<N> {
    const BANK_SIZE_OK: () = assert!(N > 0 && N <= MAX_PADS, "pad bank must hold 1 to 16 pads");

    /// All `N` pads active, default threshold and debounce steps.
    pub fn new() -> Self {
        #[allow(clippy::let_unit_value)]
        let () = Self::BANK_SIZE_OK;
        Self {
            debouncers: [Debouncer::with_mask(Debouncer::mask_for(DEFAULT_STEPS)); N],
            thresholds: [DEFAULT_THRESHOLD; N],
            normalized: [0; N],
            active: N,
            last_touch: 0,
        }
    }

    /// Update from `snapshot` and report whether the touch mask changed.
    ///
    /// On a change the new mask is latched and `true` is returned. Before
    /// the first sample frame this returns `false` and leaves the
    /// debouncers untouched.
    pub fn poll(&mut self, snapshot: &CalibrationSnapshot<N>) -> bool {
        if snapshot.frames == 0 {
            return false;
        }
        let touch = self.compute_touch(snapshot);
        if touch == self.last_touch {
            return false;
        }
        self.last_touch = touch;
        true
    }

    fn compute_touch(&mut self, snapshot: &CalibrationSnapshot<N>) -> u16 {
        let mut touch = 0u16;
        for i in 0..self.active {
            let level = snapshot.channels[i].normalized();
            self.normalized[i] = level;
            if self.debouncers[i].debounce(level > self.thresholds[i]) {
                touch |= 1 << i;
            }
        }
        touch
    }

    /// Mask reported by the last successful [`poll`](Self::poll).
    pub fn last_touch(&self) -> u16 {
        self.last_touch
    }

    /// Normalized level of channel `idx` seen by the last poll.
    pub fn normalized(&self, idx: usize) -> Option<u8> {
        self.normalized.get(idx).copied()
    }

    /// Touch threshold of channel `idx`.
    pub fn threshold(&self, idx: usize) -> Option<u8> {
        self.thresholds.get(idx).copied()
    }

    /// Debounce run length of channel `idx`.
    pub fn debounce_steps(&self, idx: usize) -> Option<u8> {
        self.debouncers.get(idx).map(Debouncer::steps)
    }

    /// Number of channels included in the mask.
    pub fn active(&self) -> usize {
        self.active
    }

    /// Set every channel's threshold.
    pub fn set_threshold(&mut self, threshold: u8) {
        self.thresholds = [threshold; N];
    }

    pub fn set_channel_threshold(&mut self, idx: usize, threshold: u8) -> Result<(), ConfigError> {
        let slot = self.thresholds.get_mut(idx).ok_or_else(|| {
            #[cfg(feature = "defmt")]
            defmt::warn!("set_channel_threshold: channel {} out of range", idx);
            ConfigError::InvalidChannel
        })?;
        *slot = threshold;
        Ok(())
    }

    /// Set every channel's debounce run length (1–31).
    pub fn set_debounce_steps(&mut self, steps: u8) -> Result<(), ConfigError> {
        // Validate once so a bad value leaves every channel unchanged.
        Debouncer::new(steps)?;
        for debouncer in &mut self.debouncers {
            debouncer.set_steps(steps)?;
        }
        Ok(())
    }

    pub fn set_channel_debounce_steps(&mut self, idx: usize, steps: u8) -> Result<(), ConfigError> {
        match self.debouncers.get_mut(idx) {
            Some(debouncer) => debouncer.set_steps(steps),
            None => {
                #[cfg(feature = "defmt")]
                defmt::warn!("set_channel_debounce_steps: channel {} out of range", idx);
                Err(ConfigError::InvalidChannel)
            }
        }
    }

    /// Restrict the mask to the first `count` channels (`1..=N`).
    ///
    /// Channels that drop out are cleared so they start from "untouched"
    /// if they are enabled again.
    pub fn set_active(&mut self, count: usize) -> Result<(), ConfigError> {
        if count == 0 || count > N {
            #[cfg(feature = "defmt")]
            defmt::warn!("set_active: {} pads, bank holds {}", count, N);
            return Err(ConfigError::InvalidPadCount);
        }
        for i in count..N {
            self.debouncers[i].clear();
            self.normalized[i] = 0;
        }
        self.active = count;
        Ok(())
    }

    /// Clear every debouncer and the latched mask.
    pub fn reset(&mut self) {
        for debouncer in &mut self.debouncers {
            debouncer.clear();
        }
        self.normalized = [0; N];
        self.last_touch = 0;
    }
}

// ── PadBank ──────────────────────────────────────────────────────────────

/// Calibrator and reader for single-context use.
///
/// ```
/// use pennywhistle::pads::PadBank;
///
/// let mut bank = PadBank::<3>::new();
/// bank.reader_mut().set_debounce_steps(1).unwrap();
/// bank.on_samples(&[800, 800, 800]);
/// bank.on_samples(&[1600, 800, 1600]);
/// assert!(bank.poll());
/// assert_eq!(bank.last_touch(), 0b101);
/// ```
#[derive(Debug, Clone, Default)]
pub struct PadBank<const N: usize> {
    calibrator: Calibrator<N>,
    reader: PadReader<N>,
}

impl<const N: usize> PadBank<N> {
    pub fn new() -> Self {
        Self {
            calibrator: Calibrator::new(),
            reader: PadReader::new(),
        }
    }

    /// Feed one frame of raw readings.
    pub fn on_samples(&mut self, samples: &[u16]) {
        self.calibrator.on_samples(samples);
    }

    /// Poll the reader against the current calibration.
    pub fn poll(&mut self) -> bool {
        let snapshot = self.calibrator.snapshot();
        self.reader.poll(&snapshot)
    }

    pub fn last_touch(&self) -> u16 {
        self.reader.last_touch()
    }

    pub fn calibrator(&self) -> &Calibrator<N> {
        &self.calibrator
    }

    pub fn calibrator_mut(&mut self) -> &mut Calibrator<N> {
        &mut self.calibrator
    }

    pub fn reader(&self) -> &PadReader<N> {
        &self.reader
    }

    pub fn reader_mut(&mut self) -> &mut PadReader<N> {
        &mut self.reader
    }
}

// ── Unit Tests ───────────────────────────────────────────────────────────
