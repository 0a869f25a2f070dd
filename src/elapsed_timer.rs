use crate::{Duration, Instant};

/// Start/stop stopwatch with millisecond resolution.
///
/// Time is passed in explicitly so a single clock read per control cycle
/// applies to every timer.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Default)]
pub struct ElapsedTimer {
    /// Time accumulated by completed start/stop spans
    accumulated: Duration,
    /// Reference instant of the span in progress, `None` when stopped
    started_at: Option<Instant>,
}

impl ElapsedTimer {
    pub const fn new() -> Self {
        ElapsedTimer {
            accumulated: Duration::ZERO,
            started_at: None,
        }
    }

    pub fn reset(&mut self) {
        *self = ElapsedTimer::new();
    }

    /// Begins accumulating from `now`. A running timer keeps its current span.
    pub fn start(&mut self, now: Instant) {
        if self.started_at.is_none() {
            self.started_at = Some(now);
        }
    }

    /// Freezes the value at `now`. No-op when already stopped.
    pub fn stop(&mut self, now: Instant) {
        if let Some(started_at) = self.started_at.take() {
            self.accumulated = self
                .accumulated
                .saturating_add(now.duration_since(started_at));
        }
    }

    pub fn value(&self, now: Instant) -> Duration {
        match self.started_at {
            Some(started_at) => self
                .accumulated
                .saturating_add(now.duration_since(started_at)),
            None => self.accumulated,
        }
    }

    pub fn is_running(&self) -> bool {
        self.started_at.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(ms: u32) -> Instant {
        Instant::from_millis(ms)
    }

    #[test]
    fn starts_reset_and_stopped() {
        let t = ElapsedTimer::new();
        assert!(!t.is_running());
        assert_eq!(t.value(at(5000)), Duration::ZERO);
    }

    #[test]
    fn value_is_live_while_running_and_frozen_after_stop() {
        let mut t = ElapsedTimer::new();
        t.start(at(100));
        assert!(t.is_running());
        assert_eq!(t.value(at(100)), Duration::ZERO);
        assert_eq!(t.value(at(1100)), Duration::ONE_SECOND);

        t.stop(at(2445));
        assert!(!t.is_running());
        assert_eq!(t.value(at(2445)), Duration::from_millis(2345));
        assert_eq!(t.value(at(9000)), Duration::from_millis(2345));
    }

    #[test]
    fn stop_when_stopped_is_noop() {
        let mut t = ElapsedTimer::new();
        t.start(at(0));
        t.stop(at(300));
        t.stop(at(800));
        assert_eq!(t.value(at(1000)), Duration::from_millis(300));
    }

    #[test]
    fn start_while_running_keeps_reference() {
        let mut t = ElapsedTimer::new();
        t.start(at(0));
        t.start(at(400));
        assert_eq!(t.value(at(1000)), Duration::ONE_SECOND);
    }

    #[test]
    fn restart_after_stop_resumes_accumulation() {
        let mut t = ElapsedTimer::new();
        t.start(at(0));
        t.stop(at(250));
        t.start(at(1000));
        t.stop(at(1250));
        assert_eq!(t.value(at(2000)), Duration::from_millis(500));
    }

    #[test]
    fn reset_clears_value_and_running() {
        let mut t = ElapsedTimer::new();
        t.start(at(0));
        t.reset();
        assert!(!t.is_running());
        assert_eq!(t.value(at(700)), Duration::ZERO);
    }

    #[test]
    fn survives_tick_counter_rollover() {
        let mut t = ElapsedTimer::new();
        t.start(at(u32::MAX - 499));
        assert_eq!(t.value(at(500)), Duration::ONE_SECOND);
        t.stop(at(1500));
        assert_eq!(t.value(at(1500)), Duration::from_millis(2000));
    }
}
