//! Shift-register debouncer for one touch channel.

use crate::error::ConfigError;

/// Run length used until [`Debouncer::set_steps`] is called.
pub const DEFAULT_STEPS: u8 = 8;

/// Longest run the 32-bit history register can represent.
pub const MAX_STEPS: u8 = 31;

/// Temporal filter producing a stable boolean from a noisy boolean stream.
///
/// Every input shifts one bit into a history register: `1` when the input
/// agrees with the current stable value, `0` when it disagrees. The stable
/// value flips only once the low `steps` bits are all zero, i.e. after
/// `steps` consecutive disagreeing inputs. The register is refilled with
/// ones after a flip, so the next flip needs a full run again.
///
/// # Examples
///
/// ```
/// use pennywhistle::debouncer::Debouncer;
///
/// let mut d = Debouncer::new(3).unwrap();
/// assert!(!d.debounce(true));
/// assert!(!d.debounce(true));
/// assert!(d.debounce(true)); // third consecutive `true` flips the output
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Debouncer {
    value: bool,
    filter: u32,
    mask: u32,
}

impl Default for Debouncer {
    fn default() -> Self {
        Self::with_mask(Self::mask_for(DEFAULT_STEPS))
    }
}

impl Debouncer {
    /// Create a cleared debouncer (stable value `false`) with the given run length.
    ///
    /// Returns [`ConfigError::InvalidDebounceSteps`] unless `1 <= steps <= 31`.
    pub fn new(steps: u8) -> Result<Self, ConfigError> {
        Self::check(steps)?;
        Ok(Self::with_mask(Self::mask_for(steps)))
    }

    pub(crate) const fn with_mask(mask: u32) -> Self {
        Self {
            value: false,
            filter: u32::MAX,
            mask,
        }
    }

    pub(crate) const fn mask_for(steps: u8) -> u32 {
        (1u32 << steps) - 1
    }

    fn check(steps: u8) -> Result<(), ConfigError> {
        if steps == 0 || steps > MAX_STEPS {
            return Err(ConfigError::InvalidDebounceSteps);
        }
        Ok(())
    }

    /// Feed one raw input and return the (possibly updated) stable value.
    pub fn debounce(&mut self, input: bool) -> bool {
        let agrees = (input == self.value) as u32;
        self.filter = (self.filter << 1) | agrees;
        if self.filter & self.mask == 0 {
            self.value = input;
            self.filter = u32::MAX;
        }
        self.value
    }

    /// Change the run length, keeping the current stable value.
    pub fn set_steps(&mut self, steps: u8) -> Result<(), ConfigError> {
        Self::check(steps)?;
        self.mask = Self::mask_for(steps);
        Ok(())
    }

    /// Configured run length.
    pub fn steps(&self) -> u8 {
        self.mask.count_ones() as u8
    }

    /// Current stable value.
    pub fn value(&self) -> bool {
        self.value
    }

    /// Return to the cleared state (stable `false`, agreeing history).
    pub fn clear(&mut self) {
        self.value = false;
        self.filter = u32::MAX;
    }
}
