//! Adafruit 4-digit 7-segment backpack (HT16K33) over I2C

use crate::{Error, SegmentDisplay, COLON_POSITION};
use embedded_hal::blocking::i2c::Write;
use log::{debug, error};

pub const DEFAULT_ADDRESS: u8 = 0x70;

const CMD_OSCILLATOR_ON: u8 = 0x21;
const CMD_DISPLAY_ON_NO_BLINK: u8 = 0x81;
const CMD_BRIGHTNESS: u8 = 0xE0;
const MAX_BRIGHTNESS: u8 = 15;

const COLON_SEGMENTS: u16 = 0x02;

/// Display RAM rows, one per position
const NUM_ROWS: usize = 8;

pub struct Ht16k33<I2C> {
    i2c: I2C,
    address: u8,
    buffer: [u16; NUM_ROWS],
}

impl<I2C, E> Ht16k33<I2C>
where
    I2C: Write<Error = E>,
{
    pub fn new(i2c: I2C, address: u8) -> Self {
        Ht16k33 {
            i2c,
            address,
            buffer: [0; NUM_ROWS],
        }
    }

    /// Oscillator on, display on without blinking, full brightness
    pub fn init(&mut self) -> Result<(), Error> {
        for cmd in [
            CMD_OSCILLATOR_ON,
            CMD_DISPLAY_ON_NO_BLINK,
            CMD_BRIGHTNESS | MAX_BRIGHTNESS,
        ]
        .iter()
        {
            self.i2c
                .write(self.address, &[*cmd])
                .map_err(|_| Error::DisplayUnavailable)?;
        }
        debug!("HT16K33 at 0x{:02X} initialized", self.address);
        Ok(())
    }

    pub fn free(self) -> I2C {
        self.i2c
    }

    fn write_buffer(&mut self) -> Result<(), E> {
        // Start address 0, then low/high byte of each row
        let mut frame = [0_u8; 1 + NUM_ROWS * 2];
        for (row, bytes) in self.buffer.iter().zip(frame[1..].chunks_mut(2)) {
            bytes[0] = (*row & 0xFF) as u8;
            bytes[1] = (*row >> 8) as u8;
        }
        self.i2c.write(self.address, &frame)
    }
}

impl<I2C, E> SegmentDisplay for Ht16k33<I2C>
where
    I2C: Write<Error = E>,
{
    fn clear(&mut self) {
        self.buffer = [0; NUM_ROWS];
    }

    fn write_raw(&mut self, position: usize, segments: u8) {
        if let Some(row) = self.buffer.get_mut(position) {
            *row = u16::from(segments);
        }
    }

    fn set_colon(&mut self, on: bool) {
        self.buffer[COLON_POSITION] = if on { COLON_SEGMENTS } else { 0 };
    }

    fn commit(&mut self) {
        if self.write_buffer().is_err() {
            error!("Failed to write display buffer");
        }
    }
}
