//! `Log` backend writing `[<ms>] [<LEVEL>] <message>` lines to a blocking
//! serial port. Single core/thread only, don't log from an interrupt handler.

use crate::{Clock, SystemClock};
use core::cell::UnsafeCell;
use core::fmt::{self, Write};
use embedded_hal::serial;
use log::{Log, Metadata, Record};
use nb::block;

pub struct Logger<T> {
    sink: UnsafeCell<LogSink<T>>,
}

struct LogSink<T> {
    clock: &'static SystemClock,
    port: Option<T>,
}

unsafe impl<T> Sync for Logger<T> {}

impl<T> Logger<T> {
    pub const fn new(clock: &'static SystemClock) -> Self {
        Logger {
            sink: UnsafeCell::new(LogSink { clock, port: None }),
        }
    }

    /// # Safety
    /// Nothing may be logging while the port is swapped
    pub unsafe fn attach(&self, port: T) {
        (*self.sink.get()).port = Some(port);
    }

    /// The attached port, e.g. to service the USB device between records
    #[allow(clippy::mut_from_ref)]
    pub fn port(&self) -> Option<&mut T> {
        unsafe { &mut *self.sink.get() }.port.as_mut()
    }
}

impl<T: serial::Write<u8>> fmt::Write for LogSink<T> {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        let port = self.port.as_mut().ok_or(fmt::Error)?;
        for c in s.as_bytes() {
            // Host gone, drop the rest of the record
            block!(port.write(*c)).map_err(|_| fmt::Error)?;
        }
        Ok(())
    }
}

impl<T: Send + serial::Write<u8>> Log for Logger<T> {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            let sink = unsafe { &mut *self.sink.get() };
            let now = sink.clock.now();
            write!(sink, "[{}] [{}] {}\r\n", now, record.level(), record.args()).ok();
        }
    }

    fn flush(&self) {
        if let Some(port) = self.port() {
            block!(port.flush()).ok();
        }
    }
}
