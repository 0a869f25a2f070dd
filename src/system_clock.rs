use core::fmt;
use core::sync::atomic::{AtomicU32, Ordering::SeqCst};

/// Milliseconds since the clock was started, wraps at `u32::MAX`
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug)]
#[repr(transparent)]
pub struct Instant(u32);

impl Instant {
    pub const fn from_millis(ms: u32) -> Self {
        Instant(ms)
    }

    pub fn as_millis(self) -> u32 {
        self.0
    }

    /// Time elapsed from `earlier` to `self`, correct across a single counter wrap
    pub fn duration_since(self, earlier: Self) -> Duration {
        Duration(self.0.wrapping_sub(earlier.0))
    }
}

impl fmt::Display for Instant {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Milliseconds
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug, Default)]
#[repr(transparent)]
pub struct Duration(u32);

impl Duration {
    pub const ZERO: Self = Duration(0);
    pub const ONE_SECOND: Self = Duration(1000);

    pub const fn from_millis(ms: u32) -> Self {
        Duration(ms)
    }

    pub fn as_millis(self) -> u32 {
        self.0
    }

    pub fn saturating_add(self, rhs: Self) -> Self {
        Duration(self.0.saturating_add(rhs.0))
    }
}

impl From<Duration> for u32 {
    fn from(d: Duration) -> Self {
        d.0
    }
}

impl fmt::Display for Duration {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{} ms", self.0)
    }
}

pub trait Clock {
    fn now(&self) -> Instant;

    fn duration_since(&self, earlier: Instant) -> Duration {
        self.now().duration_since(earlier)
    }
}

impl<T: Clock + ?Sized> Clock for &T {
    fn now(&self) -> Instant {
        (**self).now()
    }
}

/// 32-bit millisecond clock
#[derive(Debug)]
pub struct SystemClock(AtomicU32);

unsafe impl Send for SystemClock {}
unsafe impl Sync for SystemClock {}

impl SystemClock {
    pub const fn new() -> Self {
        SystemClock(AtomicU32::new(0))
    }

    #[cfg(feature = "board")]
    pub fn enable_systick_interrupt(
        &self,
        mut syst: cortex_m::peripheral::SYST,
        clocks: crate::hal::rcc::Clocks,
    ) {
        use cortex_m::peripheral::syst::SystClkSource;
        log::debug!("Enable SystemClock hclk freq {} Hz", clocks.hclk().0);

        // Generate an interrupt once a millisecond, HCLK/8/1000
        syst.set_clock_source(SystClkSource::External);
        syst.set_reload((clocks.hclk().0 / 8) / 1000 - 1);
        syst.clear_current();
        syst.enable_counter();
        syst.enable_interrupt();

        // So the SYST can't be stopped or reset
        drop(syst);
    }

    pub fn inc_from_interrupt(&self) {
        self.0.fetch_add(1, SeqCst);
    }
}

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::from_millis(self.0.load(SeqCst))
    }
}
