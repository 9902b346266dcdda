//! Seven-segment displays HEX0..HEX5.
//!
//! Segment bit 0 is segment a, bit 6 is segment g. The displays are
//! active-low: the written word is the inverted pattern masked to 7 bits.

use crate::config::DISPLAY_COUNT;
use crate::traits::{HalError, RegisterBackend};
use crate::window::{Register, RegisterWindow};

/// Width of a display register.
pub const SEGMENT_MASK: u32 = 0x7F;

/// Largest value `show_number` fits on the displays.
pub const MAX_NUMBER: u32 = 999_999;

const DIGIT_SEGMENTS: [u8; 10] = [
    0b011_1111, // 0
    0b000_0110, // 1
    0b101_1011, // 2
    0b100_1111, // 3
    0b110_0110, // 4
    0b110_1101, // 5
    0b111_1101, // 6
    0b000_0111, // 7
    0b111_1111, // 8
    0b110_1111, // 9
];

/// Display selector, HEX0 through HEX5.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct DisplayPosition(u8);

impl DisplayPosition {
    pub fn new(index: usize) -> Result<Self, HalError> {
        if index < DISPLAY_COUNT {
            Ok(Self(index as u8))
        } else {
            Err(HalError::InvalidSelector(index))
        }
    }

    pub fn index(self) -> usize {
        self.0 as usize
    }

    pub fn all() -> impl Iterator<Item = Self> {
        (0..DISPLAY_COUNT as u8).map(Self)
    }
}

/// Segment pattern for a decimal digit. Anything outside 0..=9 is blank.
pub fn encode(digit: i32) -> u8 {
    usize::try_from(digit)
        .ok()
        .and_then(|d| DIGIT_SEGMENTS.get(d))
        .copied()
        .unwrap_or(0)
}

/// Register word that lights `pattern` on an active-low display.
pub fn segment_word(pattern: u8) -> u32 {
    !u32::from(pattern) & SEGMENT_MASK
}

/// Show `value` on display `position`. Out-of-range values blank the display.
///
/// A position outside 0..=5 returns `InvalidSelector` and writes nothing.
pub fn set_digit<B: RegisterBackend>(
    window: &mut RegisterWindow<B>,
    value: i32,
    position: usize,
) -> Result<(), HalError> {
    let position = DisplayPosition::new(position)?;
    write_pattern(window, position, encode(value))
}

pub fn blank_all<B: RegisterBackend>(window: &mut RegisterWindow<B>) -> Result<(), HalError> {
    for position in DisplayPosition::all() {
        write_pattern(window, position, 0)?;
    }
    Ok(())
}

/// Show `number` right-aligned in decimal, HEX0 holding the ones digit.
/// Leading positions are blanked.
pub fn show_number<B: RegisterBackend>(
    window: &mut RegisterWindow<B>,
    number: u32,
) -> Result<(), HalError> {
    if number > MAX_NUMBER {
        return Err(HalError::Overflow(number));
    }

    let mut rest = number;
    for position in DisplayPosition::all() {
        let pattern = if rest == 0 && position.index() > 0 {
            0
        } else {
            encode((rest % 10) as i32)
        };
        write_pattern(window, position, pattern)?;
        rest /= 10;
    }
    Ok(())
}

fn write_pattern<B: RegisterBackend>(
    window: &mut RegisterWindow<B>,
    position: DisplayPosition,
    pattern: u8,
) -> Result<(), HalError> {
    window.write_register(Register::Hex(position), segment_word(pattern))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::BoardMap;
    use crate::sim::SimBackend;

    fn open_window() -> RegisterWindow<SimBackend> {
        RegisterWindow::open(SimBackend::new(), BoardMap::de1_soc()).unwrap()
    }

    #[test]
    fn encodes_all_digits() {
        let expected = [
            0b0111111, 0b0000110, 0b1011011, 0b1001111, 0b1100110, 0b1101101, 0b1111101,
            0b0000111, 0b1111111, 0b1101111,
        ];
        for (digit, pattern) in expected.into_iter().enumerate() {
            assert_eq!(encode(digit as i32), pattern, "digit {digit}");
        }
    }

    #[test]
    fn out_of_range_digits_are_blank() {
        for digit in [-1, 10, 42, i32::MIN, i32::MAX] {
            assert_eq!(encode(digit), 0, "digit {digit}");
        }
    }

    #[test]
    fn segment_word_is_inverted_and_masked() {
        assert_eq!(segment_word(0b1111111), 0);
        assert_eq!(segment_word(0), 0x7F);
        assert_eq!(segment_word(encode(1)), 0b1111001);
    }

    #[test]
    fn set_digit_writes_one_register() {
        let mut window = open_window();
        set_digit(&mut window, 7, 3).unwrap();
        assert_eq!(window.backend().writes(), &[(0x90, !0b0000111u32 & 0x7F)]);
    }

    #[test]
    fn set_digit_blanks_on_invalid_value() {
        let mut window = open_window();
        set_digit(&mut window, 12, 0).unwrap();
        assert_eq!(window.backend().writes(), &[(0x60, 0x7F)]);
    }

    #[test]
    fn invalid_selector_writes_nothing() {
        let mut window = open_window();
        for position in [6, 7, usize::MAX] {
            let err = set_digit(&mut window, 1, position).unwrap_err();
            assert!(matches!(err, HalError::InvalidSelector(p) if p == position));
        }
        assert!(window.backend().writes().is_empty());
    }

    #[test]
    fn each_position_targets_its_register() {
        let mut window = open_window();
        let offsets = window.board().hex_offsets;
        for position in 0..DISPLAY_COUNT {
            set_digit(&mut window, 8, position).unwrap();
            assert_eq!(window.backend().writes().len(), position + 1);
            assert_eq!(window.backend().writes()[position], (offsets[position], 0));
        }
    }

    #[test]
    fn closed_window_rejects_digit() {
        let mut window = open_window();
        window.close().unwrap();
        assert!(matches!(
            set_digit(&mut window, 1, 0),
            Err(HalError::WindowClosed)
        ));
        assert!(window.backend().writes().is_empty());
    }

    #[test]
    fn blank_all_turns_every_display_off() {
        let mut window = open_window();
        blank_all(&mut window).unwrap();
        let writes = window.backend().writes();
        assert_eq!(writes.len(), DISPLAY_COUNT);
        assert!(writes.iter().all(|&(_, word)| word == 0x7F));
    }

    #[test]
    fn show_number_right_aligns_and_blanks_leading() {
        let mut window = open_window();
        show_number(&mut window, 305).unwrap();
        let backend = window.backend();
        let shown: Vec<u32> = BoardMap::de1_soc()
            .hex_offsets
            .iter()
            .map(|&offset| backend.register(offset).unwrap())
            .collect();
        assert_eq!(
            shown,
            vec![
                segment_word(encode(5)),
                segment_word(encode(0)),
                segment_word(encode(3)),
                0x7F,
                0x7F,
                0x7F,
            ]
        );
    }

    #[test]
    fn show_number_zero_lights_ones_digit() {
        let mut window = open_window();
        show_number(&mut window, 0).unwrap();
        assert_eq!(window.backend().register(0x60), Some(segment_word(encode(0))));
        assert_eq!(window.backend().register(0x70), Some(0x7F));
    }

    #[test]
    fn show_number_rejects_overflow() {
        let mut window = open_window();
        show_number(&mut window, MAX_NUMBER).unwrap();
        let before = window.backend().writes().len();
        assert!(matches!(
            show_number(&mut window, MAX_NUMBER + 1),
            Err(HalError::Overflow(1_000_000))
        ));
        assert_eq!(window.backend().writes().len(), before);
    }
}
