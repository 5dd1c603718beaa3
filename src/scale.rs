//! Scales, modes and note naming.
//!
//! A [`Scale`] is the seven MIDI notes the fingering decoder can select,
//! built by transposing one of the C-rooted [`ScaleMode`] templates to the
//! chosen root note.

use core::fmt::Write;

use heapless::String;

use crate::error::ConfigError;

// ── Note numbers ─────────────────────────────────────────────────────────

pub const LOWEST: u8 = 0;
pub const MIDDLE_C: u8 = 60;
pub const A_440: u8 = 69;
pub const HIGHEST: u8 = 127;

pub const C: u8 = 60;
pub const C_SHARP: u8 = 61;
pub const D_FLAT: u8 = 61;
pub const D: u8 = 62;
pub const D_SHARP: u8 = 63;
pub const E_FLAT: u8 = 63;
pub const E: u8 = 64;
pub const F: u8 = 65;
pub const F_SHARP: u8 = 66;
pub const G_FLAT: u8 = 66;
pub const G: u8 = 67;
pub const G_SHARP: u8 = 68;
pub const A_FLAT: u8 = 68;
pub const A: u8 = 69;
pub const A_SHARP: u8 = 70;
pub const B_FLAT: u8 = 70;
pub const B: u8 = 71;

/// Number of notes in every scale.
pub const SCALE_LEN: usize = 7;

// C-rooted templates, one per mode.
const C_MAJOR: [u8; SCALE_LEN] = [C, D, E, F, G, A, B];
const C_NATURAL_MINOR: [u8; SCALE_LEN] = [C, D, E_FLAT, F, G, A_FLAT, B_FLAT];
const C_HARMONIC_MINOR: [u8; SCALE_LEN] = [C, D, E_FLAT, F, G, A_FLAT, B];
const C_ASCENDING_MELODIC_MINOR: [u8; SCALE_LEN] = [C, D, E_FLAT, F, G, A, B];
const C_PHRYGIAN_DOMINANT: [u8; SCALE_LEN] = [C, D_FLAT, E, F, G, A_FLAT, B_FLAT];
const C_DOUBLE_HARMONIC: [u8; SCALE_LEN] = [C, D_FLAT, E, F, G, A_FLAT, B];
const C_LYDIAN: [u8; SCALE_LEN] = [C, D, E, F_SHARP, G, A, B];
const C_MIXOLYDIAN: [u8; SCALE_LEN] = [C, D, E, F, G, A, B_FLAT];
const C_DORIAN: [u8; SCALE_LEN] = [C, D, E_FLAT, F, G, A, B_FLAT];
const C_PHRYGIAN: [u8; SCALE_LEN] = [C, D_FLAT, E_FLAT, F, G, A_FLAT, B_FLAT];
const C_LOCRIAN: [u8; SCALE_LEN] = [C, D_FLAT, E_FLAT, F, G_FLAT, A_FLAT, B_FLAT];

// ── ScaleMode ────────────────────────────────────────────────────────────

/// One of the built-in seven-note scales or modes.
///
/// The discriminant is the runtime selector value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum ScaleMode {
    #[default]
    Major = 0,
    /// Flat 3rd, flat 6th, flat 7th.
    NaturalMinor = 1,
    /// Flat 3rd, flat 6th.
    HarmonicMinor = 2,
    /// Flat 3rd.
    AscendingMelodicMinor = 3,
    /// Flat 2nd, flat 6th, flat 7th.
    PhrygianDominant = 4,
    /// Flat 2nd, flat 6th.
    DoubleHarmonic = 5,
    /// Sharp 4th.
    Lydian = 6,
    /// Flat 7th.
    Mixolydian = 7,
    /// Flat 3rd, flat 7th.
    Dorian = 8,
    /// Flat 2nd, flat 3rd, flat 6th, flat 7th.
    Phrygian = 9,
    /// Flat 2nd, flat 3rd, flat 5th, flat 6th, flat 7th.
    Locrian = 10,
}

#[allow(non_upper_case_globals)]
impl ScaleMode {
    pub const Ionian: ScaleMode = ScaleMode::Major;
    pub const Aeolian: ScaleMode = ScaleMode::NaturalMinor;
    pub const Minor: ScaleMode = ScaleMode::NaturalMinor;
    pub const DescendingMelodicMinor: ScaleMode = ScaleMode::NaturalMinor;

    /// Every mode, in selector order.
    pub const ALL: [ScaleMode; 11] = [
        ScaleMode::Major,
        ScaleMode::NaturalMinor,
        ScaleMode::HarmonicMinor,
        ScaleMode::AscendingMelodicMinor,
        ScaleMode::PhrygianDominant,
        ScaleMode::DoubleHarmonic,
        ScaleMode::Lydian,
        ScaleMode::Mixolydian,
        ScaleMode::Dorian,
        ScaleMode::Phrygian,
        ScaleMode::Locrian,
    ];

    /// The mode's notes rooted at middle C.
    pub fn template(self) -> &'static [u8; SCALE_LEN] {
        match self {
            ScaleMode::Major => &C_MAJOR,
            ScaleMode::NaturalMinor => &C_NATURAL_MINOR,
            ScaleMode::HarmonicMinor => &C_HARMONIC_MINOR,
            ScaleMode::AscendingMelodicMinor => &C_ASCENDING_MELODIC_MINOR,
            ScaleMode::PhrygianDominant => &C_PHRYGIAN_DOMINANT,
            ScaleMode::DoubleHarmonic => &C_DOUBLE_HARMONIC,
            ScaleMode::Lydian => &C_LYDIAN,
            ScaleMode::Mixolydian => &C_MIXOLYDIAN,
            ScaleMode::Dorian => &C_DORIAN,
            ScaleMode::Phrygian => &C_PHRYGIAN,
            ScaleMode::Locrian => &C_LOCRIAN,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            ScaleMode::Major => "Major",
            ScaleMode::NaturalMinor => "Natural Minor",
            ScaleMode::HarmonicMinor => "Harmonic Minor",
            ScaleMode::AscendingMelodicMinor => "Melodic Minor",
            ScaleMode::PhrygianDominant => "Phrygian Dom",
            ScaleMode::DoubleHarmonic => "Double Harmonic",
            ScaleMode::Lydian => "Lydian",
            ScaleMode::Mixolydian => "Mixolydian",
            ScaleMode::Dorian => "Dorian",
            ScaleMode::Phrygian => "Phrygian",
            ScaleMode::Locrian => "Locrian",
        }
    }
}

impl TryFrom<u8> for ScaleMode {
    type Error = ConfigError;

    fn try_from(selector: u8) -> Result<Self, Self::Error> {
        ScaleMode::ALL
            .get(selector as usize)
            .copied()
            .ok_or(ConfigError::InvalidScaleMode)
    }
}

// ── Scale ────────────────────────────────────────────────────────────────

/// Seven MIDI notes, degree 0 being the root.
///
/// # Examples
///
/// ```
/// use pennywhistle::scale::{Scale, ScaleMode, D};
///
/// let d_dorian = Scale::new(D, ScaleMode::Dorian).unwrap();
/// assert_eq!(d_dorian.notes(), &[62, 64, 65, 67, 69, 71, 72]);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Scale {
    notes: [u8; SCALE_LEN],
}

impl Default for Scale {
    fn default() -> Self {
        Self { notes: C_MAJOR }
    }
}

impl Scale {
    /// Build `mode` rooted at `root`.
    ///
    /// Returns [`ConfigError::InvalidRootNote`] if `root > 127`.
    pub fn new(root: u8, mode: ScaleMode) -> Result<Self, ConfigError> {
        if root > HIGHEST {
            return Err(ConfigError::InvalidRootNote);
        }
        Ok(Self::transpose(mode.template(), root))
    }

    /// Shift a template so its first note lands on `root`.
    pub fn transpose(template: &[u8; SCALE_LEN], root: u8) -> Self {
        let offset = root as i16 - template[0] as i16;
        let notes = core::array::from_fn(|i| (template[i] as i16 + offset) as u8);
        Self { notes }
    }

    /// This scale moved to a new root.
    pub fn transposed(&self, root: u8) -> Self {
        Self::transpose(&self.notes, root)
    }

    pub fn root(&self) -> u8 {
        self.notes[0]
    }

    pub fn notes(&self) -> &[u8; SCALE_LEN] {
        &self.notes
    }

    /// Note for a scale degree already folded into `0..7`.
    pub fn degree(&self, degree: usize) -> u8 {
        self.notes[degree % SCALE_LEN]
    }
}

// ── Note naming ──────────────────────────────────────────────────────────

/// Pitch-class name of a MIDI note, spelling accidentals as flats on request.
pub fn note_name(note: u8, as_flat: bool) -> &'static str {
    match note % 12 {
        0 => "C",
        1 => if as_flat { "D♭" } else { "C♯" },
        2 => "D",
        3 => if as_flat { "E♭" } else { "D♯" },
        4 => "E",
        5 => "F",
        6 => if as_flat { "G♭" } else { "F♯" },
        7 => "G",
        8 => if as_flat { "A♭" } else { "G♯" },
        9 => "A",
        10 => if as_flat { "B♭" } else { "A♯" },
        _ => "B",
    }
}

/// Scientific-pitch octave of a MIDI note (middle C is octave 4).
pub fn note_octave(note: u8) -> i8 {
    (note / 12) as i8 - 1
}

/// Printable label such as `"C♯4"`, or `"--"` for anything above 127.
///
/// ```
/// use pennywhistle::scale::note_label;
///
/// assert_eq!(note_label(60).as_str(), "C4");
/// assert_eq!(note_label(61).as_str(), "C♯4");
/// assert_eq!(note_label(0).as_str(), "C-1");
/// assert_eq!(note_label(255).as_str(), "--");
/// ```
pub fn note_label(note: u8) -> String<8> {
    let mut buf: String<8> = String::new();
    if note > HIGHEST {
        let _ = buf.push_str("--");
        return buf;
    }
    // Longest label is "D♯-1" (6 bytes), always fits.
    let _ = write!(buf, "{}{}", note_name(note, false), note_octave(note));
    buf
}

// ── Unit Tests ───────────────────────────────────────────────────────────
