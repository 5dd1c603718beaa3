//! Fingering decoders: from a pad bitmask to a MIDI note.
//!
//! A set bit means the pad is touched: finger down, hole covered. Four
//! interchangeable [`DecodePolicy`] variants interpret the mask:
//!
//! | Policy         | Note selection                              | Octave / accidentals          |
//! |----------------|---------------------------------------------|-------------------------------|
//! | `Natural`      | highest open hole                           | thumb register pair           |
//! | `LowBitBinary` | bits 0–2 are the degree                     | bit 3 up, bits 4/5 flat/sharp |
//! | `GrayCode`     | low nibble, reflected binary                | bits 4/5 flat/sharp           |
//! | `StrongFinger` | bit permutation, then one of the two above  | as the delegate               |
//!
//! Every decoder is total: any mask either yields a note in 0–127 or
//! [`NO_NOTE`].

mod binary;
mod natural;

pub use binary::{gray_code, low_bits, strong_finger_permute, GRAY_TO_DEGREE};
pub use natural::{Holes, NaturalLayout};

use crate::error::ConfigError;
use crate::scale::{Scale, ScaleMode, HIGHEST, LOWEST, SCALE_LEN};

/// Decoder output meaning no note should sound.
pub const NO_NOTE: u8 = 255;

/// Which 4-bit decoder the strong-finger permutation feeds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum StrongBase {
    LowBitBinary,
    GrayCode,
}

/// Bitmask interpretation scheme.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DecodePolicy {
    /// Penny whistle / recorder fingering.
    #[default]
    Natural,
    /// Three low bits select the degree directly.
    LowBitBinary,
    /// Low nibble in reflected binary, one finger per step.
    GrayCode,
    /// Strong fingers carry the degree bits.
    StrongFinger(StrongBase),
}

impl DecodePolicy {
    /// Every policy, in selector order.
    pub const ALL: [DecodePolicy; 5] = [
        DecodePolicy::Natural,
        DecodePolicy::LowBitBinary,
        DecodePolicy::GrayCode,
        DecodePolicy::StrongFinger(StrongBase::LowBitBinary),
        DecodePolicy::StrongFinger(StrongBase::GrayCode),
    ];

    /// Runtime selector value (0–4).
    pub fn selector(self) -> u8 {
        match self {
            DecodePolicy::Natural => 0,
            DecodePolicy::LowBitBinary => 1,
            DecodePolicy::GrayCode => 2,
            DecodePolicy::StrongFinger(StrongBase::LowBitBinary) => 3,
            DecodePolicy::StrongFinger(StrongBase::GrayCode) => 4,
        }
    }
}

impl TryFrom<u8> for DecodePolicy {
    type Error = ConfigError;

    fn try_from(selector: u8) -> Result<Self, Self::Error> {
        DecodePolicy::ALL
            .get(selector as usize)
            .copied()
            .ok_or(ConfigError::InvalidDecodePolicy)
    }
}

/// Note for `degree` (any value, folded by octaves) plus `shift` semitones.
///
/// Returns [`NO_NOTE`] instead of wrapping when the result leaves 0–127.
pub(crate) fn scale_note(scale: &Scale, degree: u8, shift: i16) -> u8 {
    let mut degree = degree as usize;
    let mut octave: i16 = 0;
    while degree >= SCALE_LEN {
        degree -= SCALE_LEN;
        octave += 12;
    }
    let note = scale.degree(degree) as i16 + octave + shift;
    if (LOWEST as i16..=HIGHEST as i16).contains(&note) {
        note as u8
    } else {
        NO_NOTE
    }
}

/// Decode `mask` under `policy`.
///
/// `layout` only matters for [`DecodePolicy::Natural`]; without a layout the
/// natural policy yields [`NO_NOTE`].
///
/// # Examples
///
/// ```
/// use pennywhistle::fingering::{decode, DecodePolicy, NaturalLayout, NO_NOTE};
/// use pennywhistle::scale::{Scale, ScaleMode};
///
/// let scale = Scale::new(60, ScaleMode::Major).unwrap();
/// let layout = NaturalLayout::for_pads(8);
///
/// assert_eq!(decode(DecodePolicy::Natural, layout, &scale, 0b11_111111), 60);
/// assert_eq!(decode(DecodePolicy::Natural, layout, &scale, 0b11_111110), 62);
/// assert_eq!(decode(DecodePolicy::Natural, layout, &scale, 0), NO_NOTE);
/// ```
pub fn decode(
    policy: DecodePolicy,
    layout: Option<NaturalLayout>,
    scale: &Scale,
    mask: u16,
) -> u8 {
    match policy {
        DecodePolicy::Natural => match layout {
            Some(layout) => layout.decode(scale, mask),
            None => NO_NOTE,
        },
        DecodePolicy::LowBitBinary => low_bits(scale, mask),
        DecodePolicy::GrayCode => gray_code(scale, mask),
        DecodePolicy::StrongFinger(StrongBase::LowBitBinary) => {
            low_bits(scale, strong_finger_permute(mask))
        }
        DecodePolicy::StrongFinger(StrongBase::GrayCode) => {
            gray_code(scale, strong_finger_permute(mask))
        }
    }
}

// ── Fingering ────────────────────────────────────────────────────────────

/// Active scale, policy and pad layout, plus the last decoded note.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Fingering {
    scale: Scale,
    root_note: u8,
    mode: ScaleMode,
    policy: DecodePolicy,
    layout: Option<NaturalLayout>,
    last_note: u8,
}

impl Default for Fingering {
    fn default() -> Self {
        Self {
            scale: Scale::default(),
            root_note: crate::scale::C,
            mode: ScaleMode::Major,
            policy: DecodePolicy::Natural,
            layout: NaturalLayout::for_pads(6),
            last_note: NO_NOTE,
        }
    }
}

impl Fingering {
    /// Create a decoder for `pad_count` pads playing `mode` rooted at `root`.
    pub fn new(
        root: u8,
        mode: ScaleMode,
        policy: DecodePolicy,
        pad_count: usize,
    ) -> Result<Self, ConfigError> {
        Ok(Self {
            scale: Scale::new(root, mode)?,
            root_note: root,
            mode,
            policy,
            layout: NaturalLayout::for_pads(pad_count),
            last_note: NO_NOTE,
        })
    }

    /// Rebuild the scale for a new key and mode.
    pub fn set_scale(&mut self, root: u8, mode: ScaleMode) -> Result<(), ConfigError> {
        self.scale = Scale::new(root, mode)?;
        self.root_note = root;
        self.mode = mode;
        Ok(())
    }

    pub fn set_root_note(&mut self, root: u8) -> Result<(), ConfigError> {
        self.set_scale(root, self.mode)
    }

    pub fn set_mode(&mut self, mode: ScaleMode) -> Result<(), ConfigError> {
        self.set_scale(self.root_note, mode)
    }

    pub fn set_policy(&mut self, policy: DecodePolicy) {
        self.policy = policy;
    }

    /// Select the natural layout matching `pad_count` (none for unusual counts).
    pub fn set_pad_count(&mut self, pad_count: usize) {
        self.layout = NaturalLayout::for_pads(pad_count);
    }

    /// Decode `mask` and remember the result.
    pub fn translate(&mut self, mask: u16) -> u8 {
        self.last_note = decode(self.policy, self.layout, &self.scale, mask);
        self.last_note
    }

    pub fn last_note(&self) -> u8 {
        self.last_note
    }

    pub fn scale(&self) -> &Scale {
        &self.scale
    }

    pub fn root_note(&self) -> u8 {
        self.root_note
    }

    pub fn mode(&self) -> ScaleMode {
        self.mode
    }

    pub fn policy(&self) -> DecodePolicy {
        self.policy
    }

    pub fn layout(&self) -> Option<NaturalLayout> {
        self.layout
    }
}

// ── Unit Tests ───────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn c_major() -> Scale {
        Scale::new(60, ScaleMode::Major).unwrap()
    }

    #[test]
    fn every_policy_is_total() {
        let scales = [
            c_major(),
            Scale::new(0, ScaleMode::Locrian).unwrap(),
            Scale::new(127, ScaleMode::Lydian).unwrap(),
        ];
        let layouts = [
            NaturalLayout::for_pads(6),
            NaturalLayout::for_pads(7),
            NaturalLayout::for_pads(8),
            NaturalLayout::for_pads(9),
            NaturalLayout::for_pads(4),
        ];
        for scale in &scales {
            for policy in DecodePolicy::ALL {
                for layout in layouts {
                    for mask in 0..=u16::MAX {
                        let note = decode(policy, layout, scale, mask);
                        assert!(
                            note <= 127 || note == NO_NOTE,
                            "{:?} mask {:#x} gave {}",
                            policy,
                            mask,
                            note
                        );
                    }
                }
            }
        }
    }

    #[test]
    fn scale_note_folds_octaves() {
        let s = c_major();
        assert_eq!(scale_note(&s, 0, 0), 60);
        assert_eq!(scale_note(&s, 7, 0), 72);
        assert_eq!(scale_note(&s, 8, 0), 74);
        assert_eq!(scale_note(&s, 15, 0), 86);
        assert_eq!(scale_note(&s, 2, -1), 63);
    }

    #[test]
    fn scale_note_out_of_range_is_no_note() {
        let high = Scale::new(127, ScaleMode::Major).unwrap();
        assert_eq!(scale_note(&high, 0, 0), 127);
        assert_eq!(scale_note(&high, 1, 0), NO_NOTE);

        let low = Scale::new(0, ScaleMode::Major).unwrap();
        assert_eq!(scale_note(&low, 0, -1), NO_NOTE);
        assert_eq!(scale_note(&low, 0, -12), NO_NOTE);
    }

    #[test]
    fn natural_without_layout_is_no_note() {
        assert_eq!(decode(DecodePolicy::Natural, None, &c_major(), 0b111111), NO_NOTE);
    }

    #[test]
    fn policy_selector_round_trip() {
        for policy in DecodePolicy::ALL {
            assert_eq!(DecodePolicy::try_from(policy.selector()), Ok(policy));
        }
        assert_eq!(DecodePolicy::try_from(5), Err(ConfigError::InvalidDecodePolicy));
    }

    // ── Fingering ────────────────────────────────────────────────────

    #[test]
    fn default_is_c_major_natural_six_pads() {
        let f = Fingering::default();
        assert_eq!(f.root_note(), 60);
        assert_eq!(f.mode(), ScaleMode::Major);
        assert_eq!(f.policy(), DecodePolicy::Natural);
        assert_eq!(f.layout(), NaturalLayout::for_pads(6));
        assert_eq!(f.last_note(), NO_NOTE);
    }

    #[test]
    fn translate_caches_last_note() {
        let mut f = Fingering::default();
        assert_eq!(f.translate(0b111110), 62);
        assert_eq!(f.last_note(), 62);
        f.translate(0b111111);
        assert_eq!(f.last_note(), 60);
    }

    #[test]
    fn set_scale_changes_key() {
        let mut f = Fingering::default();
        f.set_scale(62, ScaleMode::Dorian).unwrap();
        assert_eq!(f.translate(0b111111), 62);
        assert_eq!(f.translate(0b111110), 64);

        f.set_mode(ScaleMode::Major).unwrap();
        assert_eq!(f.translate(0b111000), 67);

        assert_eq!(f.set_root_note(200), Err(ConfigError::InvalidRootNote));
        assert_eq!(f.root_note(), 62);
    }

    #[test]
    fn policy_switch_at_runtime() {
        let mut f = Fingering::default();
        let mask = 0b110001;
        assert_eq!(f.translate(mask), 67); // natural: 110xxx -> sol
        f.set_policy(DecodePolicy::LowBitBinary);
        assert_eq!(f.translate(mask), 62);
        f.set_policy(DecodePolicy::GrayCode);
        assert_eq!(f.translate(mask), 62);
    }

    #[test]
    fn pad_count_selects_layout() {
        let mut f = Fingering::default();
        f.set_pad_count(8);
        assert_eq!(f.translate(0b0011_1111), NO_NOTE);
        assert_eq!(f.translate(0b1111_1111), 60);
        f.set_pad_count(12);
        assert_eq!(f.translate(0b1111_1111), NO_NOTE);
    }
}
