//! Test doubles for the clock, pins and output channels. Clones share state
//! so a test keeps a handle after moving one into the controller.

use crate::{Clock, Instant, SegmentDisplay, COLON_POSITION, NUM_POSITIONS};
use core::convert::Infallible;
use core::fmt;
use embedded_hal::digital::v2::InputPin;
use std::cell::{Cell, RefCell};
use std::rc::Rc;

#[derive(Clone, Default)]
pub struct FakeClock(Rc<Cell<u32>>);

impl FakeClock {
    pub fn set(&self, ms: u32) {
        self.0.set(ms);
    }

    pub fn advance(&self, ms: u32) {
        self.0.set(self.0.get().wrapping_add(ms));
    }
}

impl Clock for FakeClock {
    fn now(&self) -> Instant {
        Instant::from_millis(self.0.get())
    }
}

#[derive(Clone)]
pub struct FakePin(Rc<Cell<bool>>);

impl FakePin {
    pub fn new(high: bool) -> Self {
        FakePin(Rc::new(Cell::new(high)))
    }

    pub fn set_high(&self, high: bool) {
        self.0.set(high);
    }
}

impl InputPin for FakePin {
    type Error = Infallible;

    fn is_high(&self) -> Result<bool, Infallible> {
        Ok(self.0.get())
    }

    fn is_low(&self) -> Result<bool, Infallible> {
        Ok(!self.0.get())
    }
}

#[derive(Clone, Default)]
pub struct FakeConsole {
    text: Rc<RefCell<String>>,
    fail: Rc<Cell<bool>>,
}

impl FakeConsole {
    pub fn failing() -> Self {
        let c = FakeConsole::default();
        c.fail.set(true);
        c
    }

    pub fn text(&self) -> String {
        self.text.borrow().clone()
    }

    pub fn lines(&self) -> Vec<String> {
        self.text
            .borrow()
            .split_terminator("\r\n")
            .map(String::from)
            .collect()
    }

    pub fn clear(&self) {
        self.text.borrow_mut().clear();
    }
}

impl fmt::Write for FakeConsole {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        if self.fail.get() {
            return Err(fmt::Error);
        }
        self.text.borrow_mut().push_str(s);
        Ok(())
    }
}

pub type Frame = [u8; NUM_POSITIONS];

#[derive(Default)]
struct DisplayState {
    buffer: Frame,
    frames: Vec<Frame>,
}

/// Records the buffer each time it is committed
#[derive(Clone, Default)]
pub struct FakeDisplay(Rc<RefCell<DisplayState>>);

impl FakeDisplay {
    pub fn frames(&self) -> Vec<Frame> {
        self.0.borrow().frames.clone()
    }

    pub fn last_frame(&self) -> Frame {
        self.0.borrow().frames.last().copied().unwrap_or_default()
    }

    pub fn colon(&self) -> bool {
        self.last_frame()[COLON_POSITION] != 0
    }

    pub fn clear_frames(&self) {
        self.0.borrow_mut().frames.clear();
    }
}

impl SegmentDisplay for FakeDisplay {
    fn clear(&mut self) {
        self.0.borrow_mut().buffer = [0; NUM_POSITIONS];
    }

    fn write_raw(&mut self, position: usize, segments: u8) {
        if let Some(slot) = self.0.borrow_mut().buffer.get_mut(position) {
            *slot = segments;
        }
    }

    fn set_colon(&mut self, on: bool) {
        self.0.borrow_mut().buffer[COLON_POSITION] = if on { 0x02 } else { 0x00 };
    }

    fn commit(&mut self) {
        let mut state = self.0.borrow_mut();
        let frame = state.buffer;
        state.frames.push(frame);
    }
}
