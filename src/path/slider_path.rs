use super::{approximator::*, calculated_path::*, PathPoint, PathType};
use crate::{error::*, settings::*, utils::*};

use glam::DVec2;
use itertools::Itertools;
use tinyvec::TinyVec;
use tracing::debug;

/// A run of control points approximated with one curve type. Neighbouring
/// segments share their boundary point.
#[derive(Debug, Clone, PartialEq)]
pub struct PathSegment {
    pub kind: PathType,
    pub points: TinyVec<[DVec2; 4]>,
}

fn checked_expected_distance(expected_distance: Option<f64>) -> Result<Option<f64>> {
    match expected_distance {
        Some(distance) if !(distance.is_finite() && 0. <= distance) => {
            Err(EngineError::InvalidExpectedDistance(distance))
        }
        expected_distance => Ok(expected_distance),
    }
}

/// The authored shape of a slider. The flattened path is derived lazily and
/// cached until the next edit.
#[derive(Debug, Clone, Default)]
pub struct SliderPath {
    control_points: Vec<PathPoint>,
    expected_distance: Option<f64>,
    approximator: PathApproximator,
    calculated: Cached<CalculatedPath>,
}

impl SliderPath {
    pub fn new(
        control_points: impl IntoIterator<Item = PathPoint>,
        expected_distance: Option<f64>,
    ) -> Result<Self> {
        Ok(Self {
            control_points: control_points.into_iter().collect(),
            expected_distance: checked_expected_distance(expected_distance)?,
            ..Default::default()
        })
    }

    pub fn with_settings(mut self, settings: ApproximationSettings) -> Result<Self> {
        self.approximator = PathApproximator::new(settings)?;
        self.calculated.invalidate();
        Ok(self)
    }

    pub fn control_points(&self) -> &[PathPoint] {
        &self.control_points
    }

    pub fn expected_distance(&self) -> Option<f64> {
        self.expected_distance
    }

    pub fn set_control_points(&mut self, control_points: impl IntoIterator<Item = PathPoint>) {
        self.modify_control_points(|points| {
            *points = control_points.into_iter().collect();
        });
    }

    pub fn push(&mut self, point: impl Into<PathPoint>) {
        self.modify_control_points(|points| points.push(point.into()));
    }

    /// Edits the control points in place. The cached path is dropped even if
    /// `func` ends up changing nothing.
    pub fn modify_control_points<F, R>(&mut self, func: F) -> R
    where
        F: FnOnce(&mut Vec<PathPoint>) -> R,
    {
        let result = func(&mut self.control_points);
        self.calculated.invalidate();
        result
    }

    pub fn set_expected_distance(&mut self, expected_distance: Option<f64>) -> Result<()> {
        self.expected_distance = checked_expected_distance(expected_distance)?;
        self.calculated.invalidate();
        Ok(())
    }

    /// Bumped by every edit.
    pub fn generation(&self) -> u64 {
        self.calculated.generation()
    }

    pub fn segments(&self) -> impl Iterator<Item = PathSegment> + '_ {
        let last = self.control_points.len().checked_sub(1);

        #[rustfmt::skip]
        let boundaries = self.control_points
            .iter()
            .enumerate()
            .filter(|(index, point)| *index == 0 || point.segment_type.is_some())
            .map(|(index, _)| index)
            .chain(last)
            .dedup()
            .collect::<Vec<_>>();

        let spans = match boundaries.as_slice() {
            [only] => vec![(*only, *only)],
            _ => boundaries.iter().copied().tuple_windows::<(_, _)>().collect(),
        };

        spans.into_iter().map(move |(start, end)| PathSegment {
            kind: self.control_points[start]
                .segment_type
                .unwrap_or(PathType::Linear),
            points: self.control_points[start..=end]
                .iter()
                .map(|point| point.position)
                .collect(),
        })
    }

    fn calculate(&self) -> CalculatedPath {
        let segments = self
            .segments()
            .map(|segment| self.approximator.approximate(segment.kind, &segment.points));

        let path = CalculatedPath::build(segments, self.expected_distance);

        debug!(
            generation = self.generation(),
            control_points = self.control_points.len(),
            vertices = path.vertices().len(),
            distance = path.distance(),
            "slider path recalculated"
        );

        path
    }

    pub fn calculated_path(&self) -> &CalculatedPath {
        self.calculated.get_or_compute(|| self.calculate())
    }

    /// The logical length: the expected distance when set, else the length
    /// of the approximation.
    pub fn distance(&self) -> f64 {
        self.expected_distance
            .unwrap_or_else(|| self.calculated_path().distance())
    }

    /// Distance along the path at which each segment ends.
    pub fn segment_ends(&self) -> &[f64] {
        self.calculated_path().segment_ends()
    }

    pub fn position_at_distance(&self, distance: f64) -> DVec2 {
        self.calculated_path().position_at_distance(distance)
    }

    /// `progress` runs from 0 at the head to 1 at the logical end.
    pub fn position_at(&self, progress: f64) -> DVec2 {
        self.position_at_distance(progress * self.distance())
    }

    pub fn end_position(&self) -> DVec2 {
        self.position_at_distance(self.distance())
    }

    pub fn range(&self, start: f64, end: f64) -> PathRange<'_> {
        self.calculated_path().range(start, end)
    }

    pub fn range_at_progress(&self, start: f64, end: f64) -> PathRange<'_> {
        let distance = self.distance();
        self.range(start * distance, end * distance)
    }

    /// Authored positions, in order.
    pub fn positions(&self) -> impl Iterator<Item = DVec2> + '_ {
        self.control_points.iter().map(|point| point.position)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use test_case::test_case;

    fn point(x: f64, y: f64) -> PathPoint {
        PathPoint::new(DVec2::new(x, y))
    }

    fn typed(x: f64, y: f64, kind: PathType) -> PathPoint {
        PathPoint::typed(DVec2::new(x, y), kind)
    }

    fn arc(expected_distance: Option<f64>) -> SliderPath {
        SliderPath::new(
            [typed(0., 0., PathType::PerfectCurve), point(50., 50.), point(100., 0.)],
            expected_distance,
        )
        .unwrap()
    }

    #[test]
    fn linear_path_reproduces_authored_points() {
        let path = SliderPath::new(
            [typed(0., 0., PathType::Linear), point(100., 0.), point(100., 100.)],
            None,
        )
        .unwrap();

        let authored = path.positions().collect::<Vec<_>>();
        assert_eq!(path.calculated_path().vertices(), authored.as_slice());
        assert_eq!(path.distance(), 200.);
        assert_eq!(path.position_at_distance(0.), DVec2::ZERO);
        assert_eq!(path.end_position(), DVec2::new(100., 100.));
        assert_eq!(path.position_at(0.75), DVec2::new(100., 50.));

        [0., 100., 200.]
            .into_iter()
            .zip(&authored)
            .for_each(|(distance, expected)| {
                assert!(path.position_at_distance(distance).distance(*expected) < 1e-9);
            });
    }

    #[test]
    fn arc_passes_through_its_middle_point() {
        let path = arc(Some(200.));
        let length = path.calculated_path().distance();

        assert!((length - 50. * std::f64::consts::PI).abs() < 0.5);
        let midpoint = path.position_at_distance(length / 2.);
        assert!(midpoint.distance(DVec2::new(50., 50.)) < 0.1, "{midpoint}");
    }

    #[test]
    fn longer_expected_distance_clamps_to_the_tail() {
        let path = arc(Some(200.));
        assert_eq!(path.distance(), 200.);
        assert!(path.end_position().distance(DVec2::new(100., 0.)) < 1e-9);
        assert_eq!(path.position_at(1.), path.end_position());
    }

    #[test]
    fn shorter_expected_distance_trims() {
        let path = SliderPath::new([point(0., 0.), point(100., 0.)], Some(40.)).unwrap();

        assert_eq!(path.calculated_path().distance(), 40.);
        assert_eq!(path.end_position(), DVec2::new(40., 0.));
        assert_eq!(path.position_at_distance(90.), DVec2::new(40., 0.));
    }

    #[test_case(-1.; "negative")]
    #[test_case(f64::NAN; "nan")]
    #[test_case(f64::INFINITY; "infinite")]
    fn bad_expected_distance_is_rejected(distance: f64) {
        assert!(matches!(
            SliderPath::new([point(0., 0.)], Some(distance)),
            Err(EngineError::InvalidExpectedDistance(_))
        ));

        let mut path = arc(None);
        assert!(path.set_expected_distance(Some(distance)).is_err());
        assert_eq!(path.expected_distance(), None);
    }

    #[test]
    fn segments_split_at_typed_points() {
        let path = SliderPath::new(
            [
                typed(0., 0., PathType::Bezier),
                point(10., 0.),
                typed(20., 0., PathType::Linear),
                point(30., 0.),
                point(40., 0.),
            ],
            None,
        )
        .unwrap();

        let segments = path
            .segments()
            .map(|segment| (segment.kind, segment.points.len()))
            .collect::<Vec<_>>();

        assert_eq!(segments, vec![(PathType::Bezier, 3), (PathType::Linear, 3)]);
        assert_eq!(path.segment_ends(), &[20., 40.]);
    }

    #[test]
    fn untyped_head_is_linear() {
        let path = SliderPath::new([point(0., 0.), point(3., 4.)], None).unwrap();
        let segments = path.segments().collect::<Vec<_>>();

        assert_eq!(segments.len(), 1);
        assert_eq!(segments[0].kind, PathType::Linear);
        assert_eq!(path.distance(), 5.);
    }

    #[test]
    fn degenerate_paths() {
        let empty = SliderPath::default();
        assert_eq!(empty.segments().count(), 0);
        assert_eq!(empty.position_at(0.5), DVec2::ZERO);

        let single = SliderPath::new([point(7., 7.)], None).unwrap();
        assert_eq!(single.calculated_path().vertices(), &[DVec2::new(7., 7.)]);
        assert_eq!(single.position_at(1.), DVec2::new(7., 7.));
    }

    #[test]
    fn edits_invalidate_the_cache() {
        let mut path = SliderPath::new([point(0., 0.), point(10., 0.)], None).unwrap();
        assert_eq!(path.distance(), 10.);
        let generation = path.generation();

        path.push(DVec2::new(10., 10.));
        assert_eq!(path.generation(), generation + 1);
        assert_eq!(path.distance(), 20.);

        path.modify_control_points(|points| points[2].position.y = 20.);
        assert_eq!(path.distance(), 30.);

        path.set_expected_distance(Some(5.)).unwrap();
        assert_eq!(path.end_position(), DVec2::new(5., 0.));
        assert_eq!(path.generation(), generation + 3);
    }

    #[test]
    fn ranges_borrow_the_current_path() {
        let path = SliderPath::new([point(0., 0.), point(100., 0.)], None).unwrap();
        let range = path.range_at_progress(0.25, 0.5);

        assert_eq!(range.start_position(), DVec2::new(25., 0.));
        assert_eq!(range.end_position(), DVec2::new(50., 0.));
        assert_eq!(range.distance(), 25.);
    }

    #[test]
    fn settings_change_the_approximation() {
        let coarse = ApproximationSettings {
            catmull_detail: 2,
            ..Default::default()
        };

        let points = [typed(0., 0., PathType::Catmull), point(50., 40.), point(100., 0.)];
        let path = SliderPath::new(points, None).unwrap().with_settings(coarse).unwrap();

        assert_eq!(path.calculated_path().vertices().len(), 5);
    }

    #[test_case(0.; "zero")]
    #[test_case(-1.; "negative")]
    fn bad_arc_tolerance_is_rejected(tolerance: f64) {
        let settings = ApproximationSettings {
            circular_arc_tolerance: tolerance,
            ..Default::default()
        };

        assert!(matches!(
            arc(None).with_settings(settings),
            Err(EngineError::InvalidSetting { name: "circular_arc_tolerance", .. })
        ));
    }
}
