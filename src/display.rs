//! 4-digit 7-segment display capability and the renderers built on it.
//!
//! Positions follow the backpack layout: digits at 0, 1, 3 and 4, the colon
//! at 2. Writes only touch the buffer until `commit`.

use crate::Duration;

pub const DIGIT_POSITIONS: [usize; 4] = [0, 1, 3, 4];
pub const COLON_POSITION: usize = 2;
pub const NUM_POSITIONS: usize = 5;

pub const GLYPH_BLANK: u8 = 0x00;
pub const GLYPH_DASH: u8 = 0x40;
pub const GLYPH_DOT: u8 = 0x80;

/// Segment patterns for 0-9 and A-F, bit 0 is segment a
pub const HEX_GLYPHS: [u8; 16] = [
    0x3F, 0x06, 0x5B, 0x4F, 0x66, 0x6D, 0x7D, 0x07, 0x7F, 0x6F, 0x77, 0x7C, 0x39, 0x5E, 0x79,
    0x71,
];

pub fn glyph(value: u8) -> u8 {
    HEX_GLYPHS[(value & 0x0F) as usize]
}

pub trait SegmentDisplay {
    fn clear(&mut self);

    fn write_raw(&mut self, position: usize, segments: u8);

    fn set_colon(&mut self, on: bool);

    /// Pushes the buffer to the display
    fn commit(&mut self);

    fn write_digit(&mut self, position: usize, value: u8, dot: bool) {
        let dot = if dot { GLYPH_DOT } else { GLYPH_BLANK };
        self.write_raw(position, glyph(value) | dot);
    }

    fn write_digits(&mut self, digits: &[u8; 4]) {
        for (position, segments) in DIGIT_POSITIONS.iter().zip(digits.iter()) {
            self.write_raw(*position, *segments);
        }
    }

    /// Right aligned, without leading zeros
    fn print_hex(&mut self, value: u16) {
        self.write_digits(&render_number(u32::from(value), 16, 0).unwrap_or([GLYPH_DASH; 4]));
    }

    /// Seconds with one decimal, whole seconds once that no longer fits,
    /// dashes past 9999 s
    fn print_seconds(&mut self, elapsed: Duration) {
        let ms = elapsed.as_millis();
        let digits = render_number(round_div(ms, 100), 10, 1)
            .or_else(|| render_number(round_div(ms, 1000), 10, 0))
            .unwrap_or([GLYPH_DASH; 4]);
        self.write_digits(&digits);
    }

    fn print_dashes(&mut self) {
        self.write_digits(&[GLYPH_BLANK, GLYPH_BLANK, GLYPH_DASH, GLYPH_DASH]);
    }
}

/// `value / divisor` rounded half up, without overflowing near `u32::MAX`
fn round_div(value: u32, divisor: u32) -> u32 {
    value / divisor + u32::from(value % divisor >= divisor / 2)
}

/// Right aligned digits of `value`, with a decimal point `fraction_digits`
/// from the right. `None` if it needs more than four digits.
pub fn render_number(mut value: u32, base: u32, fraction_digits: usize) -> Option<[u8; 4]> {
    let mut digits = [GLYPH_BLANK; 4];
    for (place, slot) in digits.iter_mut().rev().enumerate() {
        if value == 0 && place > fraction_digits {
            break;
        }
        *slot = glyph((value % base) as u8);
        if fraction_digits != 0 && place == fraction_digits {
            *slot |= GLYPH_DOT;
        }
        value /= base;
    }
    if value == 0 {
        Some(digits)
    } else {
        None
    }
}
