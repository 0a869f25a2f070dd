use core::fmt;
use embedded_hal::serial;
use nb::block;

/// Line-oriented text channel over a serial transmitter
pub struct Console<TX> {
    tx: TX,
}

impl<TX> From<TX> for Console<TX> {
    fn from(tx: TX) -> Self {
        Console { tx }
    }
}

impl<TX> Console<TX> {
    pub fn into_inner(self) -> TX {
        self.tx
    }
}

impl<TX: serial::Write<u8>> fmt::Write for Console<TX> {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        for c in s.as_bytes() {
            block!(self.tx.write(*c)).map_err(|_| fmt::Error)?;
        }
        block!(self.tx.flush()).map_err(|_| fmt::Error)
    }
}
