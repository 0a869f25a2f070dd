use crate::{Lane, Lanes};
use core::convert::Infallible;
use embedded_hal::digital::v2::InputPin;

/// How a light-barrier sensor reports a finish, fixed by the physical wiring
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum SensorMode {
    /// Emitter faces the detector, the signal goes high when the beam is interrupted
    BarrierBroken,
    /// Emitter and detector side by side, the signal goes low on a reflection
    Reflection,
}

#[cfg(not(feature = "reflective-sensor"))]
pub const SENSOR_MODE: SensorMode = SensorMode::BarrierBroken;
#[cfg(feature = "reflective-sensor")]
pub const SENSOR_MODE: SensorMode = SensorMode::Reflection;

/// Turns a raw sensor level into a finish event. No debounce: a finish is
/// latched by the lane timer stopping.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub struct FinishDetector {
    mode: SensorMode,
}

impl FinishDetector {
    pub const fn new(mode: SensorMode) -> Self {
        FinishDetector { mode }
    }

    pub fn mode(&self) -> SensorMode {
        self.mode
    }

    pub fn sample(&self, raw_high: bool) -> bool {
        match self.mode {
            SensorMode::BarrierBroken => raw_high,
            SensorMode::Reflection => !raw_high,
        }
    }
}

impl Default for FinishDetector {
    fn default() -> Self {
        FinishDetector::new(SENSOR_MODE)
    }
}

/// Inputs sampled once per control cycle
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Default)]
pub struct Inputs {
    pub switch_pressed: bool,
    pub finished: Lanes<bool>,
}

impl Inputs {
    pub fn lane_finished(&self, lane: Lane) -> bool {
        self.finished[lane]
    }
}

pub struct RaceInputs<SW, SA, SB> {
    switch: SW,
    sensor_a: SA,
    sensor_b: SB,
    detector: FinishDetector,
}

impl<SW, SA, SB> RaceInputs<SW, SA, SB>
where
    SW: InputPin<Error = Infallible>,
    SA: InputPin<Error = Infallible>,
    SB: InputPin<Error = Infallible>,
{
    pub fn new(switch: SW, sensor_a: SA, sensor_b: SB, detector: FinishDetector) -> Self {
        RaceInputs {
            switch,
            sensor_a,
            sensor_b,
            detector,
        }
    }

    pub fn sample(&self) -> Inputs {
        Inputs {
            // Pulled up, pressed connects to ground
            switch_pressed: !is_high(&self.switch),
            finished: Lanes::new(
                self.detector.sample(is_high(&self.sensor_a)),
                self.detector.sample(is_high(&self.sensor_b)),
            ),
        }
    }
}

fn is_high<P: InputPin<Error = Infallible>>(pin: &P) -> bool {
    match pin.is_high() {
        Ok(level) => level,
        Err(e) => match e {},
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::FakePin;

    #[test]
    fn barrier_broken_is_active_high() {
        let d = FinishDetector::new(SensorMode::BarrierBroken);
        assert!(d.sample(true));
        assert!(!d.sample(false));
    }

    #[test]
    fn reflection_is_active_low() {
        let d = FinishDetector::new(SensorMode::Reflection);
        assert!(d.sample(false));
        assert!(!d.sample(true));
    }

    #[test]
    fn default_detector_uses_build_mode() {
        assert_eq!(FinishDetector::default().mode(), SENSOR_MODE);
    }

    #[test]
    fn samples_switch_active_low_and_both_sensors() {
        let switch = FakePin::new(true);
        let sensor_a = FakePin::new(false);
        let sensor_b = FakePin::new(false);
        let inputs = RaceInputs::new(
            switch.clone(),
            sensor_a.clone(),
            sensor_b.clone(),
            FinishDetector::new(SensorMode::BarrierBroken),
        );
        assert_eq!(inputs.sample(), Inputs::default());

        switch.set_high(false);
        sensor_b.set_high(true);
        let s = inputs.sample();
        assert!(s.switch_pressed);
        assert!(!s.lane_finished(Lane::A));
        assert!(s.lane_finished(Lane::B));
    }
}
