use super::{scale_note, NO_NOTE};
use crate::scale::Scale;

/// Number of tone holes on the front of the instrument.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Holes {
    /// Penny whistle.
    Six,
    /// Recorder.
    Seven,
}

impl Holes {
    pub fn count(self) -> u32 {
        match self {
            Holes::Six => 6,
            Holes::Seven => 7,
        }
    }
}

/// Physical layout the natural fingering is read from.
///
/// The tone holes occupy the low bits. When `register` is set, the two bits
/// above them are the thumb holes selecting the octave register:
///
/// ```text
/// 0b11 → home octave   0b10 → up an octave
/// 0b01 → down an octave 0b00 → mute
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct NaturalLayout {
    pub holes: Holes,
    pub register: bool,
}

impl NaturalLayout {
    /// Layout for a bank of `pads`: 6 and 7 are bare whistle and recorder,
    /// 8 and 9 add the thumb pair. Other counts have no natural layout.
    pub fn for_pads(pads: usize) -> Option<Self> {
        let (holes, register) = match pads {
            6 => (Holes::Six, false),
            7 => (Holes::Seven, false),
            8 => (Holes::Six, true),
            9 => (Holes::Seven, true),
            _ => return None,
        };
        Some(Self { holes, register })
    }

    /// Decode `mask` with this layout.
    pub fn decode(&self, scale: &Scale, mask: u16) -> u8 {
        let bits = self.holes.count();
        let octave: i16 = if self.register {
            match (mask >> bits) & 0b11 {
                0b11 => 0,
                0b10 => 12,
                0b01 => -12,
                _ => return NO_NOTE,
            }
        } else {
            0
        };

        let pattern = (mask & ((1 << bits) - 1)) as u8;
        let degree = match self.holes {
            Holes::Six => six_hole_degree(pattern),
            Holes::Seven => seven_hole_degree(pattern),
        };
        match degree {
            Some((degree, shift)) => scale_note(scale, degree, shift + octave),
            None => NO_NOTE,
        }
    }
}

// Bit 5 is the hole nearest the mouthpiece. The highest open hole picks the
// degree; holes below it may be in any state (cross fingerings still sound
// the note).
fn six_hole_degree(pattern: u8) -> Option<(u8, i16)> {
    match pattern {
        0b111111 => Some((0, 0)),
        0b111110 => Some((1, 0)),
        0b111100..=0b111101 => Some((2, 0)),
        0b111000..=0b111011 => Some((3, 0)),
        0b110000..=0b110111 => Some((4, 0)),
        0b100000..=0b101111 => Some((5, 0)),
        0b011100..=0b011111 => Some((0, 12)),
        0b000000..=0b011011 => Some((6, 0)),
        _ => None,
    }
}

// 00xxxxx has no fingering on the seven-hole layout.
fn seven_hole_degree(pattern: u8) -> Option<(u8, i16)> {
    match pattern {
        0b1111111 => Some((0, 0)),
        0b1111110 => Some((1, 0)),
        0b1111100..=0b1111101 => Some((2, 0)),
        0b1111000..=0b1111011 => Some((3, 0)),
        0b1110000..=0b1110111 => Some((4, 0)),
        0b1100000..=0b1101111 => Some((5, 0)),
        0b1000000..=0b1011111 => Some((6, 0)),
        0b0100000..=0b0111111 => Some((0, 12)),
        _ => None,
    }
}
