use crate::Duration;
use core::cmp::Ordering;
use core::fmt;
use core::ops::{Index, IndexMut};

#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug)]
pub enum Lane {
    A,
    B,
}

impl Lane {
    pub const BOTH: [Lane; 2] = [Lane::A, Lane::B];

    pub fn label(self) -> &'static str {
        match self {
            Lane::A => "Line A",
            Lane::B => "Line B",
        }
    }
}

impl fmt::Display for Lane {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// One value per lane
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Default)]
pub struct Lanes<T> {
    pub a: T,
    pub b: T,
}

impl<T> Lanes<T> {
    pub const fn new(a: T, b: T) -> Self {
        Lanes { a, b }
    }
}

impl<T> Index<Lane> for Lanes<T> {
    type Output = T;

    fn index(&self, lane: Lane) -> &T {
        match lane {
            Lane::A => &self.a,
            Lane::B => &self.b,
        }
    }
}

impl<T> IndexMut<Lane> for Lanes<T> {
    fn index_mut(&mut self, lane: Lane) -> &mut T {
        match lane {
            Lane::A => &mut self.a,
            Lane::B => &mut self.b,
        }
    }
}

#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub struct LaneResult {
    pub lane: Lane,
    pub elapsed: Duration,
}

/// Final times of a race
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub struct RaceResult {
    pub times: Lanes<Duration>,
}

impl RaceResult {
    pub fn new(a: Duration, b: Duration) -> Self {
        RaceResult {
            times: Lanes::new(a, b),
        }
    }

    /// Lane with the strictly smaller time, `None` on a tie
    pub fn winner(&self) -> Option<Lane> {
        match self.times.a.cmp(&self.times.b) {
            Ordering::Less => Some(Lane::A),
            Ordering::Greater => Some(Lane::B),
            Ordering::Equal => None,
        }
    }

    pub fn is_tie(&self) -> bool {
        self.winner().is_none()
    }

    /// Results in finishing order, lane order on a tie
    pub fn standings(&self) -> [LaneResult; 2] {
        let (first, second) = match self.winner() {
            Some(Lane::B) => (Lane::B, Lane::A),
            _ => (Lane::A, Lane::B),
        };
        [self.result(first), self.result(second)]
    }

    pub fn result(&self, lane: Lane) -> LaneResult {
        LaneResult {
            lane,
            elapsed: self.times[lane],
        }
    }
}

impl fmt::Display for RaceResult {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self.winner() {
            Some(lane) => write!(
                f,
                "{} wins ({} / {})",
                lane, self.times.a, self.times.b
            ),
            None => write!(f, "tie at {}", self.times.a),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(v: u32) -> Duration {
        Duration::from_millis(v)
    }

    #[test]
    fn strictly_smaller_time_wins() {
        let r = RaceResult::new(ms(2345), ms(2890));
        assert_eq!(r.winner(), Some(Lane::A));
        let [first, second] = r.standings();
        assert_eq!(first, LaneResult { lane: Lane::A, elapsed: ms(2345) });
        assert_eq!(second, LaneResult { lane: Lane::B, elapsed: ms(2890) });

        let r = RaceResult::new(ms(3001), ms(3000));
        assert_eq!(r.winner(), Some(Lane::B));
        assert_eq!(r.standings()[0].lane, Lane::B);
    }

    #[test]
    fn equal_times_are_a_tie_in_lane_order() {
        let r = RaceResult::new(ms(1500), ms(1500));
        assert!(r.is_tie());
        assert_eq!(r.winner(), None);
        let [first, second] = r.standings();
        assert_eq!(first.lane, Lane::A);
        assert_eq!(second.lane, Lane::B);
    }

    #[test]
    fn lanes_index_by_lane() {
        let mut l = Lanes::new(1, 2);
        l[Lane::B] += 10;
        assert_eq!(l[Lane::A], 1);
        assert_eq!(l[Lane::B], 12);
        assert_eq!(Lane::B.label(), "Line B");
    }
}
