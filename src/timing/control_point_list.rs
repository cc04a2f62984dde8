use super::control_point::*;
use crate::utils::*;

use derive_more::Deref;
use noisy_float::prelude::*;
use tracing::trace;

/// What happened to a list, in mutation order.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ListEvent {
    Added { index: usize, time: R64 },
    Removed { index: usize, time: R64 },
    Changed { from: usize, to: usize, time: R64 },
}

/// Control points of one kind, always sorted ascending by time.
///
/// Points with equal times are kept side by side, later insertions after
/// earlier ones. Reads go through `Deref` to the sorted `Vec`; every
/// mutation goes through the list so ordering can't be broken from outside.
/// Events accumulate until drained.
#[derive(Debug, Clone, Deref)]
pub struct ControlPointList<T> {
    #[deref]
    points: Vec<T>,
    events: Vec<ListEvent>,
    generation: u64,
}

impl<T> Default for ControlPointList<T> {
    fn default() -> Self {
        Self {
            points: vec![],
            events: vec![],
            generation: 0,
        }
    }
}

impl<T: TypedPoint> ControlPointList<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_points(points: impl IntoIterator<Item = T>) -> Self {
        let mut points = points.into_iter().collect::<Vec<_>>();
        points.sort_by_key(|point| point.time());

        Self {
            points,
            ..Self::default()
        }
    }

    fn record(&mut self, event: ListEvent) {
        trace!(kind = ?T::KIND, ?event, "control point list changed");
        self.events.push(event);
        self.generation = self.generation.wrapping_add(1);
    }

    pub fn add(&mut self, point: T) -> usize {
        let index = self.points.quantified_insert(point);
        self.record(ListEvent::Added {
            index,
            time: point.time(),
        });
        index
    }

    /// Removes the first point equal to `point`.
    pub fn remove(&mut self, point: &T) -> Option<usize> {
        let start = self.points.lower_bound(point.time());
        let index = start + self.points[start..].iter().position(|other| other == point)?;
        self.remove_at(index).map(|_| index)
    }

    pub fn remove_at(&mut self, index: usize) -> Option<T> {
        (index < self.points.len()).then(|| {
            let point = self.points.remove(index);
            self.record(ListEvent::Removed {
                index,
                time: point.time(),
            });
            point
        })
    }

    /// Edits the point at `index` in place and moves it to wherever its
    /// (possibly new) time sorts. Returns its new index.
    pub fn modify<F>(&mut self, index: usize, func: F) -> Option<usize>
    where
        F: FnOnce(&mut T),
    {
        let point = self.points.get_mut(index)?;
        let old_time = point.time();
        func(point);
        let time = point.time();

        let to = if time == old_time {
            index
        } else {
            let point = self.points.remove(index);
            self.points.quantified_insert(point)
        };

        self.record(ListEvent::Changed {
            from: index,
            to,
            time,
        });
        Some(to)
    }

    /// The point in effect at `time`: the latest one at or before it, or the
    /// first one when `time` precedes them all.
    pub fn control_point_at(&self, time: R64) -> Option<&T> {
        self.points.at_or_before(time)
    }

    pub fn control_point_at_or(&self, time: R64, default: T) -> T {
        self.control_point_at(time).copied().unwrap_or(default)
    }

    pub fn index_at(&self, time: R64) -> Option<usize> {
        self.points.index_at(time)
    }

    /// First point strictly after `time`.
    pub fn next_after(&self, time: R64) -> Option<&T> {
        self.points.get(self.points.upper_bound(time))
    }

    /// Points with `start <= time < end`.
    pub fn range(&self, start: R64, end: R64) -> &[T] {
        let first = self.points.lower_bound(start);
        let last = self.points.lower_bound(end).max(first);
        &self.points[first..last]
    }

    pub fn clear(&mut self) {
        while let Some(index) = self.points.len().checked_sub(1) {
            self.remove_at(index);
        }
    }

    pub fn drain_events(&mut self) -> std::vec::Drain<'_, ListEvent> {
        self.events.drain(..)
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }
}
