use super::{control_point::*, control_point_list::*, snapping::*, tick_generator::*};
use crate::utils::*;

use itertools::Itertools;
use noisy_float::prelude::*;
use tracing::warn;

/// The timing model of one track: four independent, retroactive lists.
#[derive(Debug, Clone, Default)]
pub struct ControlPointInfo {
    pub timing: ControlPointList<TimingPoint>,
    pub difficulty: ControlPointList<DifficultyPoint>,
    pub effect: ControlPointList<EffectPoint>,
    pub sample: ControlPointList<SamplePoint>,
}

// Only points at or before `time` count as preceding it.
fn preceding<T: TypedPoint>(points: &[T], time: R64) -> Option<&T> {
    points[..points.upper_bound(time)].last()
}

fn latest_exactly_at<T: TypedPoint>(points: &[T], time: R64) -> Option<T> {
    preceding(points, time).copied().filter(|point| point.time() == time)
}

fn first_exactly_at<T: TypedPoint>(points: &[T], time: R64) -> Option<usize> {
    let index = points.lower_bound(time);
    (points.get(index)?.time() == time).then_some(index)
}

fn add_unless_redundant<T: TypedPoint>(list: &mut ControlPointList<T>, point: T) -> Option<usize> {
    if point.is_redundant(preceding(list.as_slice(), point.time())) {
        warn!(kind = ?T::KIND, time = %point.time(), "redundant control point rejected");
        return None;
    }

    Some(list.add(point))
}

fn move_all<T: TypedPoint>(list: &mut ControlPointList<T>, from: R64, to: R64) {
    while let Some(index) = first_exactly_at(list.as_slice(), from) {
        list.modify(index, |point| point.set_time(to));
    }
}

fn remove_all<T: TypedPoint>(list: &mut ControlPointList<T>, time: R64) {
    while let Some(index) = first_exactly_at(list.as_slice(), time) {
        list.remove_at(index);
    }
}

fn snap_among(points: &[TimingPoint], time: R64, divisor: BeatDivisor) -> R64 {
    let index = points.index_at(time);
    let point = index.and_then(|index| points.get(index)).copied().unwrap_or_default();
    let next = index
        .and_then(|index| points.get(index + 1))
        .map(TypedPoint::time);

    snap_to(&point, next, time, divisor)
}

impl ControlPointInfo {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn timing_point_at(&self, time: R64) -> TimingPoint {
        self.timing.control_point_at_or(time, TimingPoint::default())
    }

    pub fn difficulty_point_at(&self, time: R64) -> DifficultyPoint {
        self.difficulty.control_point_at_or(time, DifficultyPoint::default())
    }

    pub fn effect_point_at(&self, time: R64) -> EffectPoint {
        self.effect.control_point_at_or(time, EffectPoint::default())
    }

    pub fn sample_point_at(&self, time: R64) -> SamplePoint {
        self.sample.control_point_at_or(time, SamplePoint::default())
    }

    pub fn volume_at(&self, time: R64) -> u8 {
        self.sample_point_at(time).volume()
    }

    pub fn bpm_at(&self, time: R64) -> f64 {
        self.timing_point_at(time).bpm()
    }

    pub fn beat_length_at(&self, time: R64) -> f64 {
        self.timing_point_at(time).beat_length()
    }

    pub fn meter_at(&self, time: R64) -> u32 {
        self.timing_point_at(time).meter()
    }

    pub fn kiai_at(&self, time: R64) -> bool {
        self.effect_point_at(time).kiai()
    }

    /// Slider travel speed in distance units per millisecond. One beat at a
    /// velocity of 1 covers `100 * base_multiplier` units.
    pub fn slider_velocity_at(&self, time: R64, base_multiplier: f64) -> f64 {
        100. * base_multiplier * self.difficulty_point_at(time).slider_velocity()
            / self.beat_length_at(time)
    }

    /// Adds `point` to its list unless it changes nothing there. Returns the
    /// index it landed at.
    pub fn add(&mut self, point: impl Into<ControlPoint>) -> Option<usize> {
        match point.into() {
            ControlPoint::Timing(point) => add_unless_redundant(&mut self.timing, point),
            ControlPoint::Difficulty(point) => add_unless_redundant(&mut self.difficulty, point),
            ControlPoint::Effect(point) => add_unless_redundant(&mut self.effect, point),
            ControlPoint::Sample(point) => add_unless_redundant(&mut self.sample, point),
        }
    }

    pub fn remove(&mut self, point: impl Into<ControlPoint>) -> Option<usize> {
        match point.into() {
            ControlPoint::Timing(point) => self.timing.remove(&point),
            ControlPoint::Difficulty(point) => self.difficulty.remove(&point),
            ControlPoint::Effect(point) => self.effect.remove(&point),
            ControlPoint::Sample(point) => self.sample.remove(&point),
        }
    }

    /// Adds every point of `group`, returning how many were kept.
    pub fn add_group(&mut self, group: &ControlPointGroup) -> usize {
        group
            .points()
            .filter_map(|point| self.add(point))
            .count()
    }

    /// Everything placed exactly at `time`.
    pub fn group_at(&self, time: R64) -> Option<ControlPointGroup> {
        let mut group = ControlPointGroup::new(time);

        [
            latest_exactly_at(&self.timing, time).map(ControlPoint::from),
            latest_exactly_at(&self.difficulty, time).map(ControlPoint::from),
            latest_exactly_at(&self.effect, time).map(ControlPoint::from),
            latest_exactly_at(&self.sample, time).map(ControlPoint::from),
        ]
        .into_iter()
        .flatten()
        .for_each(|point| {
            group.insert(point);
        });

        (!group.is_empty()).then_some(group)
    }

    /// Every point of every kind, ordered by time. On ties timing points come
    /// first, then difficulty, effect and sample.
    pub fn all_points(&self) -> impl Iterator<Item = ControlPoint> + '_ {
        #[rustfmt::skip]
        let merged = self.timing.iter().copied().map(ControlPoint::from)
            .merge_by(self.difficulty.iter().copied().map(ControlPoint::from), |a, b| a.time() <= b.time())
            .merge_by(self.effect.iter().copied().map(ControlPoint::from), |a, b| a.time() <= b.time())
            .merge_by(self.sample.iter().copied().map(ControlPoint::from), |a, b| a.time() <= b.time());

        merged
    }

    /// Merged view: one group per distinct time.
    pub fn groups(&self) -> Vec<ControlPointGroup> {
        let mut groups = vec![];

        for (time, points) in &self.all_points().group_by(ControlPoint::time) {
            groups.push(points.fold(ControlPointGroup::new(time), |mut group, point| {
                group.insert(point);
                group
            }));
        }

        groups
    }

    /// Moves every point at `from` to `to`.
    pub fn move_group(&mut self, from: R64, to: R64) -> Option<ControlPointGroup> {
        if from != to {
            move_all(&mut self.timing, from, to);
            move_all(&mut self.difficulty, from, to);
            move_all(&mut self.effect, from, to);
            move_all(&mut self.sample, from, to);
        }

        self.group_at(to)
    }

    pub fn remove_group(&mut self, time: R64) -> Option<ControlPointGroup> {
        let removed = self.group_at(time)?;

        remove_all(&mut self.timing, time);
        remove_all(&mut self.difficulty, time);
        remove_all(&mut self.effect, time);
        remove_all(&mut self.sample, time);

        Some(removed)
    }

    pub fn clear(&mut self) {
        self.timing.clear();
        self.difficulty.clear();
        self.effect.clear();
        self.sample.clear();
    }

    /// Pending list events of all kinds, grouped by kind.
    pub fn drain_events(&mut self) -> Vec<(ControlPointKind, ListEvent)> {
        #[rustfmt::skip]
        let events = self.timing.drain_events().map(|event| (ControlPointKind::Timing, event))
            .chain(self.difficulty.drain_events().map(|event| (ControlPointKind::Difficulty, event)))
            .chain(self.effect.drain_events().map(|event| (ControlPointKind::Effect, event)))
            .chain(self.sample.drain_events().map(|event| (ControlPointKind::Sample, event)))
            .collect();

        events
    }

    /// Changes whenever any list changes.
    pub fn generation(&self) -> u64 {
        [
            self.timing.generation(),
            self.difficulty.generation(),
            self.effect.generation(),
            self.sample.generation(),
        ]
        .into_iter()
        .fold(0, u64::wrapping_add)
    }

    /// Nearest `divisor` subdivision of the timing section in effect at
    /// `time`, never past the start of the next section.
    pub fn snap(&self, time: R64, divisor: BeatDivisor) -> R64 {
        snap_among(&self.timing, time, divisor)
    }

    /// Like [`snap`](Self::snap) but ignoring timing points at `excluded`,
    /// for when the point being dragged must not snap to itself.
    pub fn snap_excluding(&self, time: R64, divisor: BeatDivisor, excluded: R64) -> R64 {
        let points = self
            .timing
            .iter()
            .filter(|point| point.time() != excluded)
            .copied()
            .collect::<Vec<_>>();

        snap_among(&points, time, divisor)
    }

    pub fn tick_generator(&self) -> TickGenerator<'_> {
        TickGenerator::new(&self.timing)
    }

    pub fn generate_ticks(&self, start: R64, end: R64, divisor: BeatDivisor) -> Ticks<'_> {
        self.tick_generator().generate(start, end, divisor)
    }
}
