#![cfg_attr(not(test), no_std)]

#[cfg(feature = "board")]
pub extern crate stm32f3xx_hal as hal;

mod console;
mod controller;
mod display;
mod elapsed_timer;
mod error;
mod ht16k33;
mod input;
mod race;
mod result_sink;
mod serial_port_logger;
mod system_clock;

#[cfg(test)]
mod testing;

pub use console::*;
pub use controller::*;
pub use display::*;
pub use elapsed_timer::*;
pub use error::*;
pub use ht16k33::*;
pub use input::*;
pub use race::*;
pub use result_sink::*;
pub use serial_port_logger::*;
pub use system_clock::*;
