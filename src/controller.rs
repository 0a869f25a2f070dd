use crate::{Clock, Duration, Error, Inputs, Instant, RaceResult, ResultSink, SegmentDisplay};
use core::fmt;
use log::warn;
use private::{Context, Events, StateMachine, States};

/// Switch presses are ignored for this long after the start
const SWITCH_DEBOUNCE: Duration = Duration::ONE_SECOND;

/// How long each step of the finish display stays up
const DISPLAY_DWELL: Duration = Duration::ONE_SECOND;

/// Holding the switch this long on the finish display starts over
const RESTART_HOLD: Duration = Duration::from_millis(2000);

#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum RaceState {
    Idle,
    Running,
    Finished(Showing),
}

/// Step of the finish display sequence
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum Showing {
    Standing,
    First,
    Second,
}

pub struct Controller<W, D, C>
where
    W: fmt::Write,
    D: SegmentDisplay,
    C: Clock + Clone,
{
    sm: StateMachine<Context<W, D, C>>,
    clock: C,
    hold: SwitchHold,
}

impl<W, D, C> Controller<W, D, C>
where
    W: fmt::Write,
    D: SegmentDisplay,
    C: Clock + Clone,
{
    pub fn new(sink: ResultSink<W, D>, clock: C) -> Self {
        let mut sm = StateMachine::new(Context::new(sink, clock.clone()));
        sm.process_event(Events::Init).ok();
        Controller {
            sm,
            clock,
            hold: SwitchHold::default(),
        }
    }

    /// One control cycle, call as often as possible
    pub fn update(&mut self, inputs: Inputs) {
        let now = self.clock.now();
        self.hold.update(inputs.switch_pressed, now);

        let was_finished = self.is_finished();
        let event = if was_finished && self.hold.held_for(now) >= Some(RESTART_HOLD) {
            self.hold.rearm();
            Events::Restart
        } else {
            Events::Tick(inputs)
        };

        self.dispatch(event);

        // The press that ended the race must be released before a hold counts
        if !was_finished && self.is_finished() {
            self.hold.rearm();
        }
    }

    /// A failed guard means stay put. Any other rejection leaves the state
    /// untouched as well, but is reported.
    fn dispatch(&mut self, event: Events) {
        let rejected = match self.sm.process_event(event) {
            Ok(_) | Err(private::Error::GuardFailed) => false,
            Err(_) => true,
        };
        if rejected {
            warn!("{}, holding {:?}", Error::UnreachableState, self.state());
        }
    }

    pub fn state(&self) -> RaceState {
        match self.sm.state() {
            States::Reset | States::Idle(_) => RaceState::Idle,
            States::Running(_) => RaceState::Running,
            States::ShowStanding(_) => RaceState::Finished(Showing::Standing),
            States::ShowFirst(_) => RaceState::Finished(Showing::First),
            States::ShowSecond(_) => RaceState::Finished(Showing::Second),
        }
    }

    pub fn is_idle(&self) -> bool {
        self.state() == RaceState::Idle
    }

    pub fn is_finished(&self) -> bool {
        matches!(self.state(), RaceState::Finished(_))
    }

    /// Final times while the finish display is up
    pub fn standings(&self) -> Option<RaceResult> {
        match self.sm.state() {
            States::ShowStanding(s) | States::ShowFirst(s) | States::ShowSecond(s) => {
                Some(s.result)
            }
            _ => None,
        }
    }
}

/// Tracks how long the switch has been held, ignoring a press that started
/// before the last `rearm`
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Default)]
struct SwitchHold {
    pressed_since: Option<Instant>,
    latched: bool,
}

impl SwitchHold {
    fn update(&mut self, pressed: bool, now: Instant) {
        if !pressed {
            self.latched = false;
            self.pressed_since = None;
        } else if !self.latched && self.pressed_since.is_none() {
            self.pressed_since = Some(now);
        }
    }

    fn rearm(&mut self) {
        self.latched = true;
        self.pressed_since = None;
    }

    fn held_for(&self, now: Instant) -> Option<Duration> {
        self.pressed_since.map(|since| now.duration_since(since))
    }
}

mod private {
    use super::{DISPLAY_DWELL, SWITCH_DEBOUNCE};
    use crate::{
        Clock, ElapsedTimer, Inputs, Instant, Lane, Lanes, RaceResult, ResultSink,
        SegmentDisplay,
    };
    use core::cell::Cell;
    use core::fmt;
    use log::{debug, info};
    use smlang::statemachine;

    statemachine! {
        *Reset + Init / init_action = Idle,

        Idle(IdleData) + Tick(Inputs) [start_guard] / start_action = Running,

        Running(RunningData) + Tick(Inputs) [race_over_guard] / finish_action = ShowStanding,

        ShowStanding(FinishData) + Tick(Inputs) [standing_dwell_guard] / show_first_action = ShowFirst,
        ShowFirst(FinishData) + Tick(Inputs) [first_dwell_guard] / show_second_action = ShowSecond,
        ShowSecond(FinishData) + Tick(Inputs) [second_dwell_guard] / show_standing_action = ShowStanding,

        ShowStanding(FinishData) + Restart / restart_action = Idle,
        ShowFirst(FinishData) + Restart / restart_action = Idle,
        ShowSecond(FinishData) + Restart / restart_action = Idle,
    }

    pub struct Context<W, D, C> {
        sink: ResultSink<W, D>,
        clock: C,
        timers: Lanes<ElapsedTimer>,
    }

    impl<W, D, C> Context<W, D, C>
    where
        W: fmt::Write,
        D: SegmentDisplay,
        C: Clock,
    {
        pub fn new(sink: ResultSink<W, D>, clock: C) -> Self {
            Context {
                sink,
                clock,
                timers: Lanes::default(),
            }
        }

        fn dwell_elapsed(&self, state_data: &FinishData) -> bool {
            self.clock.duration_since(state_data.shown_at) >= DISPLAY_DWELL
        }

        fn show(&mut self, state_data: &FinishData, step: usize) -> FinishData {
            let standing = state_data.result.standings()[step];
            debug!("Showing {} {}", standing.lane, standing.elapsed);
            self.sink.show_time(standing.elapsed);
            FinishData {
                result: state_data.result,
                shown_at: self.clock.now(),
            }
        }
    }

    impl<W, D, C> StateMachineContext for Context<W, D, C>
    where
        W: fmt::Write,
        D: SegmentDisplay,
        C: Clock,
    {
        fn init_action(&mut self) -> IdleData {
            debug!("Initialized race controller state machine");
            IdleData::armed()
        }

        fn start_guard(&mut self, state_data: &IdleData, event_data: &Inputs) -> bool {
            if !event_data.switch_pressed {
                state_data.armed.set(true);
            }
            state_data.armed.get() && event_data.switch_pressed
        }

        fn start_action(&mut self, _state_data: &IdleData, _event_data: &Inputs) -> RunningData {
            let now = self.clock.now();
            for &lane in Lane::BOTH.iter() {
                let timer = &mut self.timers[lane];
                timer.reset();
                timer.start(now);
            }
            self.sink.race_started();
            info!("Race started at {}", now);
            RunningData { started_at: now }
        }

        fn race_over_guard(&mut self, state_data: &RunningData, event_data: &Inputs) -> bool {
            let now = self.clock.now();
            for &lane in Lane::BOTH.iter() {
                let timer = &mut self.timers[lane];
                if event_data.lane_finished(lane) && timer.is_running() {
                    timer.stop(now);
                    let elapsed = timer.value(now);
                    debug!("{} finished in {}", lane, elapsed);
                    self.sink.lane_finished(elapsed);
                }
            }

            let all_finished = Lane::BOTH.iter().all(|&l| !self.timers[l].is_running());
            let forced = event_data.switch_pressed
                && now.duration_since(state_data.started_at) >= SWITCH_DEBOUNCE;
            all_finished || forced
        }

        fn finish_action(&mut self, _state_data: &RunningData, _event_data: &Inputs) -> FinishData {
            let now = self.clock.now();
            for &lane in Lane::BOTH.iter() {
                let timer = &mut self.timers[lane];
                if timer.is_running() {
                    timer.stop(now);
                    debug!("{} stopped by switch", lane);
                }
                self.sink.lane_result(lane, timer.value(now));
            }
            self.sink.race_stopped();

            let result = RaceResult::new(
                self.timers[Lane::A].value(now),
                self.timers[Lane::B].value(now),
            );
            info!("Race over, {}", result);
            self.sink.standing(&result);
            FinishData {
                result,
                shown_at: now,
            }
        }

        fn standing_dwell_guard(&mut self, state_data: &FinishData, _event_data: &Inputs) -> bool {
            self.dwell_elapsed(state_data)
        }

        fn first_dwell_guard(&mut self, state_data: &FinishData, _event_data: &Inputs) -> bool {
            self.dwell_elapsed(state_data)
        }

        fn second_dwell_guard(&mut self, state_data: &FinishData, _event_data: &Inputs) -> bool {
            self.dwell_elapsed(state_data)
        }

        fn show_first_action(&mut self, state_data: &FinishData, _event_data: &Inputs) -> FinishData {
            self.show(state_data, 0)
        }

        fn show_second_action(&mut self, state_data: &FinishData, _event_data: &Inputs) -> FinishData {
            self.show(state_data, 1)
        }

        fn show_standing_action(&mut self, state_data: &FinishData, _event_data: &Inputs) -> FinishData {
            self.sink.standing(&state_data.result);
            FinishData {
                result: state_data.result,
                shown_at: self.clock.now(),
            }
        }

        fn restart_action(&mut self, _state_data: &FinishData) -> IdleData {
            for &lane in Lane::BOTH.iter() {
                self.timers[lane].reset();
            }
            self.sink.ready();
            info!("Race timer restarted");
            IdleData::disarmed()
        }
    }

    #[derive(Clone, PartialEq, Debug)]
    pub struct IdleData {
        /// Switch has been seen released, a press may start a race
        pub armed: Cell<bool>,
    }

    impl IdleData {
        fn armed() -> Self {
            IdleData {
                armed: Cell::new(true),
            }
        }

        fn disarmed() -> Self {
            IdleData {
                armed: Cell::new(false),
            }
        }
    }

    #[derive(Copy, Clone, PartialEq, Debug)]
    pub struct RunningData {
        /// Start of the switch debounce window
        pub started_at: Instant,
    }

    #[derive(Copy, Clone, PartialEq, Debug)]
    pub struct FinishData {
        pub result: RaceResult,
        pub shown_at: Instant,
    }
}
