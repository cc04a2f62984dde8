use super::{control_point::*, snapping::*};
use crate::utils::*;

use noisy_float::prelude::*;

/// Resolution ticks are classified at. 48 is divisible by every common beat
/// divisor, so one table classifies all of them.
pub const SUB_TICKS_PER_BEAT: i64 = 48;

// Ticks this close to a section boundary belong to the next section.
const TIME_EPSILON: f64 = 1e-6;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TickType {
    Full,
    Half,
    Third,
    Quarter,
    Sixth,
    Eighth,
    Twelfth,
    Sixteenth,
    Other,
}

impl TickType {
    #[rustfmt::skip]
    pub fn classify(sub_tick: i64) -> Self {
        match sub_tick.rem_euclid(SUB_TICKS_PER_BEAT) {
            0                   => Self::Full,
            sub if sub % 24 == 0 => Self::Half,
            sub if sub % 16 == 0 => Self::Third,
            sub if sub % 12 == 0 => Self::Quarter,
            sub if sub % 8 == 0  => Self::Sixth,
            sub if sub % 6 == 0  => Self::Eighth,
            sub if sub % 4 == 0  => Self::Twelfth,
            sub if sub % 3 == 0  => Self::Sixteenth,
            _                   => Self::Other,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tick {
    pub time: R64,
    pub kind: TickType,
    pub is_downbeat: bool,
}

/// Turns a sorted run of timing points into grid ticks.
#[derive(Debug, Clone, Copy)]
pub struct TickGenerator<'a> {
    points: &'a [TimingPoint],
}

impl<'a> TickGenerator<'a> {
    pub fn new(points: &'a [TimingPoint]) -> Self {
        Self { points }
    }

    /// Ticks in `[start, end)` on a `divisor` grid. Each call seeks afresh.
    pub fn generate(&self, start: R64, end: R64, divisor: BeatDivisor) -> Ticks<'a> {
        let segment = self.points.index_at(start).unwrap_or(self.points.len());

        let index = self.points.get(segment).map_or(0, |point| {
            ((start - point.time()).raw() / beat_snap_length(point, divisor) - 1e-9).ceil() as i64
        });

        Ticks {
            points: self.points,
            segment,
            index,
            end,
            divisor: divisor.get() as i64,
        }
    }
}

/// Lazy tick sequence. Holds a shared borrow only, so it can be dropped at
/// any point.
#[derive(Debug, Clone)]
pub struct Ticks<'a> {
    points: &'a [TimingPoint],
    segment: usize,
    index: i64,
    end: R64,
    divisor: i64,
}

impl Ticks<'_> {
    fn finish(&mut self) -> Option<Tick> {
        self.segment = self.points.len();
        None
    }
}

impl Iterator for Ticks<'_> {
    type Item = Tick;

    fn next(&mut self) -> Option<Tick> {
        loop {
            let point = self.points.get(self.segment)?;
            let next = self.points.get(self.segment + 1).map(TypedPoint::time);
            let segment_end = next.map_or(self.end, |next| next.min(self.end));

            let time = point.time().raw()
                + self.index as f64 * point.beat_length() / self.divisor as f64;

            if segment_end.raw() - TIME_EPSILON <= time {
                match next {
                    Some(next) if next < self.end => {
                        self.segment += 1;
                        self.index = 0;
                        continue;
                    }
                    _ => return self.finish(),
                }
            }

            // Position within the current measure, so far-off indices can't overflow.
            let measure = self.divisor * point.meter() as i64;
            let sub_tick = ((self.index.rem_euclid(measure) * SUB_TICKS_PER_BEAT) as f64
                / self.divisor as f64)
                .round() as i64;
            self.index += 1;

            return Some(Tick {
                time: r64(time),
                kind: TickType::classify(sub_tick),
                is_downbeat: sub_tick.rem_euclid(SUB_TICKS_PER_BEAT * point.meter() as i64) == 0,
            });
        }
    }
}

impl std::iter::FusedIterator for Ticks<'_> {}
