use super::scale_note;
use crate::scale::Scale;

/// Scale degree for each low-nibble pattern in reflected binary order.
///
/// Neighbouring degrees differ in exactly one bit, so stepping up or down
/// the scale moves a single finger.
pub const GRAY_TO_DEGREE: [u8; 16] = [0, 1, 3, 2, 7, 6, 4, 5, 15, 14, 12, 13, 8, 9, 11, 10];

const OCTAVE_UP: u16 = 0x08;
const NOT_FLAT: u16 = 0x10;
const NOT_SHARP: u16 = 0x20;

// An accidental applies while its pad is lifted (bit clear).
fn accidental(mask: u16) -> i16 {
    let mut shift = 0;
    if mask & NOT_FLAT == 0 {
        shift -= 1;
    }
    if mask & NOT_SHARP == 0 {
        shift += 1;
    }
    shift
}

/// Bits 0–2 select the degree (7 is the root an octave up), bit 3 raises an
/// octave, bit 4 clear flattens and bit 5 clear sharpens.
///
/// ```
/// use pennywhistle::fingering::low_bits;
/// use pennywhistle::scale::{Scale, ScaleMode};
///
/// let scale = Scale::new(60, ScaleMode::Major).unwrap();
/// assert_eq!(low_bits(&scale, 0b11_0_010), 64);
/// assert_eq!(low_bits(&scale, 0b11_1_010), 76);
/// assert_eq!(low_bits(&scale, 0b10_0_010), 63);
/// ```
pub fn low_bits(scale: &Scale, mask: u16) -> u8 {
    let degree = (mask & 0x07) as u8;
    let octave = if mask & OCTAVE_UP != 0 { 12 } else { 0 };
    scale_note(scale, degree, octave + accidental(mask))
}

/// The low nibble is a reflected binary code for degrees 0–15, folded into
/// octaves; bits 4 and 5 are the accidentals as in [`low_bits`].
pub fn gray_code(scale: &Scale, mask: u16) -> u8 {
    let degree = GRAY_TO_DEGREE[(mask & 0x0F) as usize];
    scale_note(scale, degree, accidental(mask))
}

/// Move the strong fingers onto the degree bits.
///
/// Physical bits 4/5 become logical 2/3, physical 1/2 become logical 0/1,
/// and the weaker fingers on physical 0 and 3 take the accidentals
/// (logical 4 and 5). Bits above 5 are dropped.
pub fn strong_finger_permute(mask: u16) -> u16 {
    ((mask & 0x30) >> 2) | ((mask & 0x06) >> 1) | ((mask & 0x01) << 4) | ((mask & 0x08) << 2)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fingering::NO_NOTE;
    use crate::scale::ScaleMode;

    // Accidental pads covered: no flat, no sharp.
    const NATURAL: u16 = NOT_FLAT | NOT_SHARP;

    fn c_major() -> Scale {
        Scale::new(60, ScaleMode::Major).unwrap()
    }

    // ── low_bits ─────────────────────────────────────────────────────

    #[test]
    fn low_bits_degrees() {
        let s = c_major();
        let expected = [60, 62, 64, 65, 67, 69, 71, 72];
        for (degree, &note) in expected.iter().enumerate() {
            assert_eq!(low_bits(&s, NATURAL | degree as u16), note);
        }
    }

    #[test]
    fn low_bits_octave_bit() {
        let s = c_major();
        assert_eq!(low_bits(&s, NATURAL | OCTAVE_UP), 72);
        assert_eq!(low_bits(&s, NATURAL | OCTAVE_UP | 0x07), 84);
    }

    #[test]
    fn low_bits_accidentals_use_inverted_logic() {
        let s = c_major();
        assert_eq!(low_bits(&s, NOT_SHARP), 59);
        assert_eq!(low_bits(&s, NOT_FLAT), 61);
        assert_eq!(low_bits(&s, 0), 60);
    }

    #[test]
    fn low_bits_ignores_upper_bits() {
        let s = c_major();
        assert_eq!(low_bits(&s, 0xFF00 | NATURAL | 0x01), 62);
    }

    // ── gray_code ────────────────────────────────────────────────────

    #[test]
    fn gray_first_degrees() {
        let s = c_major();
        assert_eq!(gray_code(&s, NATURAL | 0x0), s.degree(0));
        assert_eq!(gray_code(&s, NATURAL | 0x1), s.degree(1));
        assert_eq!(gray_code(&s, NATURAL | 0x3), s.degree(2));
        assert_eq!(gray_code(&s, NATURAL | 0x2), s.degree(3));
        assert_eq!(gray_code(&s, NATURAL | 0x4), 72);
        assert_eq!(gray_code(&s, NATURAL | 0x8), 86);
    }

    #[test]
    fn gray_table_is_a_permutation() {
        let mut seen = [false; 16];
        for &d in &GRAY_TO_DEGREE {
            assert!(!seen[d as usize]);
            seen[d as usize] = true;
        }
    }

    #[test]
    fn gray_neighbours_differ_by_one_finger() {
        let nibble_for = |degree: u8| {
            GRAY_TO_DEGREE
                .iter()
                .position(|&d| d == degree)
                .unwrap() as u16
        };
        for degree in 0..15u8 {
            let a = nibble_for(degree);
            let b = nibble_for(degree + 1);
            assert_eq!((a ^ b).count_ones(), 1, "degree {} -> {}", degree, degree + 1);
        }
    }

    #[test]
    fn gray_accidentals() {
        let s = c_major();
        assert_eq!(gray_code(&s, NOT_SHARP | 0x1), 61);
        assert_eq!(gray_code(&s, NOT_FLAT | 0x1), 63);
    }

    #[test]
    fn gray_out_of_range_is_no_note() {
        let s = Scale::new(120, ScaleMode::Major).unwrap();
        assert_eq!(gray_code(&s, NATURAL | 0x8), NO_NOTE);
    }

    // ── strong fingers ───────────────────────────────────────────────

    #[test]
    fn permutation_moves_bits() {
        assert_eq!(strong_finger_permute(0b000001), 0b010000);
        assert_eq!(strong_finger_permute(0b000010), 0b000001);
        assert_eq!(strong_finger_permute(0b000100), 0b000010);
        assert_eq!(strong_finger_permute(0b001000), 0b100000);
        assert_eq!(strong_finger_permute(0b010000), 0b000100);
        assert_eq!(strong_finger_permute(0b100000), 0b001000);
        assert_eq!(strong_finger_permute(0b1100_0000), 0);
    }

    #[test]
    fn permutation_is_a_bijection_on_six_bits() {
        let mut seen = [false; 64];
        for m in 0..64u16 {
            let p = strong_finger_permute(m) as usize;
            assert!(p < 64);
            assert!(!seen[p]);
            seen[p] = true;
        }
    }

    #[test]
    fn strong_finger_low_bits() {
        let s = c_major();
        // Weak fingers (physical 0 and 3) down: no accidentals.
        let weak_down = 0b001001;
        assert_eq!(low_bits(&s, strong_finger_permute(weak_down)), 60);
        assert_eq!(low_bits(&s, strong_finger_permute(weak_down | 0b000010)), 62);
        assert_eq!(low_bits(&s, strong_finger_permute(weak_down | 0b010000)), 67);
        assert_eq!(low_bits(&s, strong_finger_permute(weak_down | 0b100000)), 72);
    }
}
