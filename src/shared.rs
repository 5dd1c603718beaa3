//! Calibration shared between the sample producer and the polling consumer.
//!
//! The producer (a scan-complete interrupt or driver callback) calls
//! [`SharedCalibrator::on_samples`]; the consumer takes a
//! [`CalibrationSnapshot`] and does everything else outside the lock. Both
//! sides go through a critical section, so the consumer never sees a
//! half-updated frame.
//!
//! ```ignore
//! static CALIBRATION: SharedCalibrator<8> = SharedCalibrator::new();
//!
//! // scan-complete interrupt
//! CALIBRATION.on_samples(&readings);
//!
//! // main loop
//! let snapshot = CALIBRATION.snapshot();
//! if let Some(note) = whistle.update(&snapshot) { /* ... */ }
//! ```

use core::cell::RefCell;

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::blocking_mutex::Mutex;

use crate::calibration::{CalibrationSnapshot, Calibrator};
use crate::config::InstrumentConfig;
use crate::error::ConfigError;

/// A [`Calibrator`] behind a critical-section mutex, usable from a `static`.
pub struct SharedCalibrator<const N: usize> {
    inner: Mutex<CriticalSectionRawMutex, RefCell<Calibrator<N>>>,
}

impl<const N: usize> Default for SharedCalibrator<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const N: usize> SharedCalibrator<N> {
    pub const fn new() -> Self {
        Self {
            inner: Mutex::new(RefCell::new(Calibrator::new())),
        }
    }

    /// Producer entry point: process one frame of raw readings.
    pub fn on_samples(&self, samples: &[u16]) {
        self.inner.lock(|cal| cal.borrow_mut().on_samples(samples));
    }

    /// Copy the whole calibration state in one critical section.
    pub fn snapshot(&self) -> CalibrationSnapshot<N> {
        self.inner.lock(|cal| cal.borrow().snapshot())
    }

    /// Forget every channel's observed range.
    pub fn reset(&self) {
        self.inner.lock(|cal| cal.borrow_mut().reset());
    }

    pub fn set_smoothing(&self, smoothing: u8) -> Result<(), ConfigError> {
        self.inner.lock(|cal| cal.borrow_mut().set_smoothing(smoothing))
    }

    pub fn smoothing(&self) -> u8 {
        self.inner.lock(|cal| cal.borrow().smoothing())
    }

    /// Apply the producer-side part of `config` (the smoothing exponent).
    pub fn configure(&self, config: &InstrumentConfig) -> Result<(), ConfigError> {
        self.set_smoothing(config.smoothing)
    }
}
