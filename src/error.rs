//! Error types for instrument configuration.

use core::fmt;

/// Errors that can occur when configuring the touch pipeline.
///
/// The signal path itself never fails; only setters and configuration
/// validation return these. A setter that returns an error leaves the
/// previous state untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigError {
    /// Channel index is out of bounds (must be < the pad bank size).
    InvalidChannel,
    /// Active pad count is zero or larger than the pad bank.
    InvalidPadCount,
    /// Debounce step count outside 1–31.
    InvalidDebounceSteps,
    /// Smoothing exponent outside 0–8.
    InvalidSmoothing,
    /// Root note is not a MIDI note number (must be 0–127).
    InvalidRootNote,
    /// Scale mode selector outside 0–10.
    InvalidScaleMode,
    /// Decode policy selector outside 0–4.
    InvalidDecodePolicy,
    /// Poll frequency of zero or above 1 MHz.
    InvalidPollFrequency,
    /// Tuning parameter number not handled by this core.
    UnsupportedParameter(u16),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ConfigError::InvalidChannel => write!(f, "Invalid channel index"),
            ConfigError::InvalidPadCount => write!(f, "Invalid active pad count"),
            ConfigError::InvalidDebounceSteps => {
                write!(f, "Invalid debounce steps (must be 1-31)")
            }
            ConfigError::InvalidSmoothing => {
                write!(f, "Invalid smoothing exponent (must be 0-8)")
            }
            ConfigError::InvalidRootNote => write!(f, "Invalid root note (must be 0-127)"),
            ConfigError::InvalidScaleMode => write!(f, "Invalid scale mode (must be 0-10)"),
            ConfigError::InvalidDecodePolicy => {
                write!(f, "Invalid decode policy (must be 0-4)")
            }
            ConfigError::InvalidPollFrequency => write!(f, "Invalid poll frequency"),
            ConfigError::UnsupportedParameter(n) => write!(f, "Unsupported parameter {}", n),
        }
    }
}
