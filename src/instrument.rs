//! The consumer side of the instrument: snapshot in, note events out.

use heapless::String;

use crate::calibration::{CalibrationSnapshot, ChannelCalibration};
use crate::config::{InstrumentConfig, TuningParameter};
use crate::error::ConfigError;
use crate::fingering::{DecodePolicy, Fingering};
use crate::pads::PadReader;
use crate::scale::{note_label, ScaleMode};

// ── Whistle ──────────────────────────────────────────────────────────────

/// Pad reader and fingering decoder for a bank of `N` pads.
///
/// Smoothing runs on the producer side: pass the same config to
/// [`SharedCalibrator::configure`](crate::SharedCalibrator::configure) or
/// [`Calibrator::from_config`](crate::Calibrator::from_config).
///
/// # Examples
///
/// ```
/// use pennywhistle::calibration::Calibrator;
/// use pennywhistle::{InstrumentConfig, Whistle};
///
/// let config = InstrumentConfig { debounce_steps: 1, ..Default::default() };
/// let mut cal = Calibrator::<6>::new();
/// let mut whistle = Whistle::<6>::from_config(&config).unwrap();
///
/// cal.on_samples(&[1000; 6]);
/// cal.on_samples(&[2000; 6]);
/// cal.on_samples(&[1000; 6]);
/// assert_eq!(whistle.update(&cal.snapshot()), None);
///
/// cal.on_samples(&[1000, 2000, 2000, 2000, 2000, 2000]);
/// assert_eq!(whistle.update(&cal.snapshot()), Some(62));
/// ```
#[derive(Debug, Clone)]
pub struct Whistle<const N: usize> {
    reader: PadReader<N>,
    fingering: Fingering,
    retuned: bool,
}

impl<const N: usize> Whistle<N> {
    /// Build from a validated configuration.
    ///
    /// Returns [`ConfigError::InvalidPadCount`] if `config.pad_count > N`.
    pub fn from_config(config: &InstrumentConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let mut reader = PadReader::new();
        reader.set_active(config.pad_count)?;
        reader.set_threshold(config.threshold);
        reader.set_debounce_steps(config.debounce_steps)?;
        let fingering = Fingering::new(
            config.root_note,
            config.mode,
            config.policy,
            config.pad_count,
        )?;
        Ok(Self {
            reader,
            fingering,
            retuned: false,
        })
    }

    /// Poll the pads and decode.
    ///
    /// Returns the new note (0–127, or [`NO_NOTE`](crate::fingering::NO_NOTE))
    /// when the touch mask changed, or when a tuning change altered the note
    /// of the current mask. Returns `None` otherwise.
    pub fn update(&mut self, snapshot: &CalibrationSnapshot<N>) -> Option<u8> {
        let changed = self.reader.poll(snapshot);
        let retuned = self.retuned && snapshot.frames != 0;
        if !changed && !retuned {
            return None;
        }
        self.retuned = false;

        let previous = self.fingering.last_note();
        let touch = self.reader.last_touch();
        let note = self.fingering.translate(touch);
        if !changed && note == previous {
            return None;
        }

        #[cfg(feature = "defmt")]
        defmt::debug!("note {} (touch {:#x})", note, touch);

        Some(note)
    }

    /// Apply one runtime tuning change.
    ///
    /// Thresholds above 255 saturate. Every other out-of-range value is
    /// rejected with the matching [`ConfigError`] and leaves the instrument
    /// unchanged.
    pub fn apply(&mut self, param: TuningParameter, value: u16) -> Result<(), ConfigError> {
        match param {
            TuningParameter::Note => {
                let root = u8::try_from(value).map_err(|_| ConfigError::InvalidRootNote)?;
                self.fingering.set_root_note(root)?;
            }
            TuningParameter::Scale => {
                let mode = u8::try_from(value)
                    .map_err(|_| ConfigError::InvalidScaleMode)
                    .and_then(ScaleMode::try_from)?;
                self.fingering.set_mode(mode)?;
            }
            TuningParameter::Threshold => {
                self.reader.set_threshold(value.min(u8::MAX as u16) as u8);
                return Ok(());
            }
            TuningParameter::Steps => {
                let steps =
                    u8::try_from(value).map_err(|_| ConfigError::InvalidDebounceSteps)?;
                self.reader.set_debounce_steps(steps)?;
                return Ok(());
            }
            TuningParameter::PadCount => {
                let count = value as usize;
                self.reader.set_active(count)?;
                self.fingering.set_pad_count(count);
            }
            TuningParameter::Fingering => {
                let policy = u8::try_from(value)
                    .map_err(|_| ConfigError::InvalidDecodePolicy)
                    .and_then(DecodePolicy::try_from)?;
                self.fingering.set_policy(policy);
            }
        }

        #[cfg(feature = "defmt")]
        defmt::info!("{} set to {}", param, value);

        self.retuned = true;
        Ok(())
    }

    /// Current state for a monitor or debug display.
    pub fn diagnostics(&self, snapshot: &CalibrationSnapshot<N>) -> Diagnostics<N> {
        Diagnostics {
            last_note: self.fingering.last_note(),
            last_touch: self.reader.last_touch(),
            frames: snapshot.frames,
            channels: snapshot.channels.map(ChannelReport::from),
        }
    }

    pub fn last_note(&self) -> u8 {
        self.fingering.last_note()
    }

    pub fn reader(&self) -> &PadReader<N> {
        &self.reader
    }

    pub fn reader_mut(&mut self) -> &mut PadReader<N> {
        &mut self.reader
    }

    pub fn fingering(&self) -> &Fingering {
        &self.fingering
    }
}

// ── Diagnostics ──────────────────────────────────────────────────────────

/// Calibration readout of one pad.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ChannelReport {
    pub raw: u16,
    pub average: u16,
    pub min: u16,
    pub max: u16,
    /// Latest reading scaled to 0–255.
    pub normalized: u8,
    pub glitches: u16,
}

impl From<ChannelCalibration> for ChannelReport {
    fn from(channel: ChannelCalibration) -> Self {
        Self {
            raw: channel.raw,
            average: channel.average,
            min: channel.min,
            max: channel.max,
            normalized: channel.normalized(),
            glitches: channel.glitches,
        }
    }
}

/// Everything a monitor needs to show the instrument's state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Diagnostics<const N: usize> {
    pub last_note: u8,
    pub last_touch: u16,
    pub frames: u32,
    pub channels: [ChannelReport; N],
}

impl<const N: usize> Diagnostics<N> {
    /// Label of the last note, `"--"` when muted.
    pub fn note_label(&self) -> String<8> {
        note_label(self.last_note)
    }
}

// ── Unit Tests ───────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calibration::Calibrator;
    use crate::fingering::NO_NOTE;

    const IDLE: u16 = 1000;
    const COVERED: u16 = 2000;

    fn frame(mask: u16) -> [u16; 8] {
        let mut samples = [IDLE; 8];
        for (i, s) in samples.iter_mut().enumerate() {
            if mask & (1 << i) != 0 {
                *s = COVERED;
            }
        }
        samples
    }

    // Eight pads (six holes plus the register pair), C major, no debounce
    // delay. The calibrator has seen the full range on every channel.
    fn setup() -> (Calibrator<8>, Whistle<8>) {
        let config = InstrumentConfig {
            pad_count: 8,
            debounce_steps: 1,
            ..Default::default()
        };
        let mut cal = Calibrator::new();
        cal.on_samples(&[IDLE; 8]);
        cal.on_samples(&[COVERED; 8]);
        cal.on_samples(&[IDLE; 8]);
        (cal, Whistle::from_config(&config).unwrap())
    }

    fn play(cal: &mut Calibrator<8>, whistle: &mut Whistle<8>, mask: u16) -> Option<u8> {
        cal.on_samples(&frame(mask));
        whistle.update(&cal.snapshot())
    }

    #[test]
    fn natural_register_scenario() {
        let (mut cal, mut w) = setup();
        assert_eq!(play(&mut cal, &mut w, 0b11_111111), Some(60));
        assert_eq!(play(&mut cal, &mut w, 0b11_111111), None);
        assert_eq!(play(&mut cal, &mut w, 0b11_111110), Some(62));
        assert_eq!(play(&mut cal, &mut w, 0b10_111110), Some(74));
        assert_eq!(play(&mut cal, &mut w, 0), Some(NO_NOTE));
        assert_eq!(w.last_note(), NO_NOTE);
    }

    #[test]
    fn lifting_fingers_from_the_foot_climbs_the_scale() {
        let (mut cal, mut w) = setup();
        let steps = [
            (0b11_111111, 60),
            (0b11_111110, 62),
            (0b11_111100, 64),
            (0b11_111000, 65),
            (0b11_110000, 67),
            (0b11_100000, 69),
            (0b11_000000, 71),
        ];
        for (mask, note) in steps {
            assert_eq!(play(&mut cal, &mut w, mask), Some(note), "mask {:#010b}", mask);
            assert_eq!(w.reader().last_touch(), mask);
        }
    }

    #[test]
    fn nothing_before_first_frame() {
        let mut w = Whistle::<8>::from_config(&InstrumentConfig::default()).unwrap();
        w.apply(TuningParameter::Note, 62).unwrap();
        assert_eq!(w.update(&CalibrationSnapshot::default()), None);
    }

    #[test]
    fn default_debounce_holds_the_note() {
        let config = InstrumentConfig {
            pad_count: 8,
            ..Default::default()
        };
        let (mut cal, _) = setup();
        let mut w = Whistle::from_config(&config).unwrap();
        for _ in 0..30 {
            assert_eq!(play(&mut cal, &mut w, 0b11_111111), None);
        }
        assert_eq!(play(&mut cal, &mut w, 0b11_111111), Some(60));
    }

    #[test]
    fn retune_reemits_current_mask() {
        let (mut cal, mut w) = setup();
        assert_eq!(play(&mut cal, &mut w, 0b11_111111), Some(60));

        w.apply(TuningParameter::Note, 62).unwrap();
        assert_eq!(w.update(&cal.snapshot()), Some(62));
        assert_eq!(w.update(&cal.snapshot()), None);

        // Same root again: the note does not change, nothing to send.
        w.apply(TuningParameter::Note, 62).unwrap();
        assert_eq!(w.update(&cal.snapshot()), None);
    }

    #[test]
    fn switch_policy_and_scale() {
        let (mut cal, mut w) = setup();
        assert_eq!(play(&mut cal, &mut w, 0b11_111111), Some(60));

        w.apply(TuningParameter::Fingering, 1).unwrap();
        assert_eq!(w.update(&cal.snapshot()), Some(84));

        w.apply(TuningParameter::Fingering, 0).unwrap();
        w.apply(TuningParameter::Scale, 1).unwrap();
        assert_eq!(play(&mut cal, &mut w, 0b11_111100), Some(63));
        assert_eq!(w.fingering().mode(), ScaleMode::NaturalMinor);
    }

    #[test]
    fn threshold_saturates() {
        let (mut cal, mut w) = setup();
        assert_eq!(play(&mut cal, &mut w, 0b11_111111), Some(60));
        w.apply(TuningParameter::Threshold, 300).unwrap();
        assert_eq!(w.reader().threshold(0), Some(255));
        assert_eq!(play(&mut cal, &mut w, 0b11_111111), Some(NO_NOTE));
    }

    #[test]
    fn pad_count_drops_the_register_pair() {
        let (mut cal, mut w) = setup();
        assert_eq!(play(&mut cal, &mut w, 0b11_111110), Some(62));
        w.apply(TuningParameter::PadCount, 6).unwrap();
        assert_eq!(w.reader().active(), 6);
        assert_eq!(play(&mut cal, &mut w, 0b00_111111), Some(60));
    }

    #[test]
    fn bad_values_leave_state_unchanged() {
        let (_, mut w) = setup();
        let before = *w.fingering();
        assert_eq!(w.apply(TuningParameter::Note, 128), Err(ConfigError::InvalidRootNote));
        assert_eq!(w.apply(TuningParameter::Note, 1000), Err(ConfigError::InvalidRootNote));
        assert_eq!(w.apply(TuningParameter::Scale, 11), Err(ConfigError::InvalidScaleMode));
        assert_eq!(
            w.apply(TuningParameter::Fingering, 5),
            Err(ConfigError::InvalidDecodePolicy)
        );
        assert_eq!(w.apply(TuningParameter::Steps, 0), Err(ConfigError::InvalidDebounceSteps));
        assert_eq!(w.apply(TuningParameter::Steps, 256), Err(ConfigError::InvalidDebounceSteps));
        assert_eq!(w.apply(TuningParameter::PadCount, 9), Err(ConfigError::InvalidPadCount));
        assert_eq!(*w.fingering(), before);
        assert_eq!(w.reader().active(), 8);
        assert_eq!(w.reader().debounce_steps(0), Some(1));
    }

    #[test]
    fn from_config_checks_bank_size() {
        let config = InstrumentConfig {
            pad_count: 9,
            ..Default::default()
        };
        assert_eq!(
            Whistle::<8>::from_config(&config).map(|_| ()),
            Err(ConfigError::InvalidPadCount)
        );
        let config = InstrumentConfig {
            smoothing: 12,
            ..Default::default()
        };
        assert!(Whistle::<8>::from_config(&config).is_err());
    }

    #[test]
    fn diagnostics_report() {
        let (mut cal, mut w) = setup();
        play(&mut cal, &mut w, 0b11_111110);
        let diag = w.diagnostics(&cal.snapshot());
        assert_eq!(diag.last_note, 62);
        assert_eq!(diag.last_touch, 0b11_111110);
        assert_eq!(diag.frames, 4);
        assert_eq!(diag.note_label().as_str(), "D4");

        let ch0 = diag.channels[0];
        assert_eq!((ch0.raw, ch0.min, ch0.max, ch0.normalized), (IDLE, IDLE, COVERED, 0));
        assert_eq!(diag.channels[1].normalized, 255);
        assert_eq!(diag.channels[1].glitches, 0);
    }

    #[test]
    fn muted_label() {
        let (mut cal, mut w) = setup();
        play(&mut cal, &mut w, 0);
        play(&mut cal, &mut w, 0b00_111111);
        assert_eq!(w.diagnostics(&cal.snapshot()).note_label().as_str(), "--");
    }
}
