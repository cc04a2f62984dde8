use core::iter::once as iter_once;

use glam::DVec2;

// Vertices closer than this to their predecessor are dropped.
const DUPLICATE_EPSILON: f64 = 1e-9;

/// A slider path flattened into vertices, parameterized by arc length.
///
/// `vertices[i]` lies `cumulative_distance[i]` along the path. The first
/// distance is 0 and the distances strictly increase.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CalculatedPath {
    vertices: Vec<DVec2>,
    cumulative_distance: Vec<f64>,
    segment_ends: Vec<f64>,
}

impl CalculatedPath {
    /// Joins approximated segments into one path, then trims it to
    /// `expected_distance` when that is shorter than the joined length.
    pub fn build(
        segments: impl IntoIterator<Item = Vec<DVec2>>,
        expected_distance: Option<f64>,
    ) -> Self {
        let mut path = Self::default();

        for segment in segments {
            segment.into_iter().for_each(|vertex| path.push(vertex));
            path.segment_ends.push(path.distance());
        }

        if let Some(expected) = expected_distance {
            path.trim(expected);
        }

        path
    }

    fn push(&mut self, vertex: DVec2) {
        let distance = match self.vertices.last() {
            None => 0.,
            Some(last) if last.distance(vertex) <= DUPLICATE_EPSILON => return,
            Some(last) => self.distance() + last.distance(vertex),
        };

        self.vertices.push(vertex);
        self.cumulative_distance.push(distance);
    }

    fn trim(&mut self, expected: f64) {
        if self.distance() <= expected {
            return;
        }

        match self.cumulative_distance.partition_point(|&distance| distance < expected) {
            0 => {
                self.vertices.truncate(1);
                self.cumulative_distance.truncate(1);
            }
            keep => {
                let end = self.interpolate(keep, expected);
                self.vertices.truncate(keep + 1);
                self.cumulative_distance.truncate(keep + 1);
                self.vertices[keep] = end;
                self.cumulative_distance[keep] = expected;
            }
        }

        let distance = self.distance();
        self.segment_ends
            .iter_mut()
            .for_each(|end| *end = end.min(distance));
    }

    pub fn vertices(&self) -> &[DVec2] {
        &self.vertices
    }

    pub fn cumulative_distance(&self) -> &[f64] {
        &self.cumulative_distance
    }

    /// Distance along the path at which each segment ends, in segment order.
    pub fn segment_ends(&self) -> &[f64] {
        &self.segment_ends
    }

    pub fn distance(&self) -> f64 {
        self.cumulative_distance.last().copied().unwrap_or(0.)
    }

    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    // `index` must be in 1..len.
    fn interpolate(&self, index: usize, distance: f64) -> DVec2 {
        let (p0, p1) = (self.vertices[index - 1], self.vertices[index]);
        let (d0, d1) = (self.cumulative_distance[index - 1], self.cumulative_distance[index]);

        if d1 - d0 <= f64::EPSILON {
            p0
        } else {
            p0.lerp(p1, (distance - d0) / (d1 - d0))
        }
    }

    fn clamp_distance(&self, distance: f64) -> f64 {
        if distance.is_nan() {
            0.
        } else {
            distance.clamp(0., self.distance())
        }
    }

    /// The point `distance` along the path, clamped onto it. An empty path
    /// sits at the origin.
    pub fn position_at_distance(&self, distance: f64) -> DVec2 {
        let Some(&last) = self.vertices.last() else {
            return DVec2::ZERO;
        };

        let distance = self.clamp_distance(distance);

        match self.cumulative_distance.partition_point(|&d| d < distance) {
            0 => self.vertices[0],
            index if index == self.vertices.len() => last,
            index => self.interpolate(index, distance),
        }
    }

    /// Read-only window between two distances, both clamped onto the path. A
    /// reversed window collapses onto its start.
    pub fn range(&self, start: f64, end: f64) -> PathRange<'_> {
        let start = self.clamp_distance(start);

        PathRange {
            path: self,
            start,
            end: self.clamp_distance(end).max(start),
        }
    }
}

/// A borrowed stretch of a [`CalculatedPath`]. Distances passed to it are
/// relative to its start.
#[derive(Debug, Clone, Copy)]
pub struct PathRange<'a> {
    path: &'a CalculatedPath,
    start: f64,
    end: f64,
}

impl<'a> PathRange<'a> {
    pub fn start_distance(&self) -> f64 {
        self.start
    }

    pub fn end_distance(&self) -> f64 {
        self.end
    }

    pub fn distance(&self) -> f64 {
        self.end - self.start
    }

    pub fn start_position(&self) -> DVec2 {
        self.path.position_at_distance(self.start)
    }

    pub fn end_position(&self) -> DVec2 {
        self.path.position_at_distance(self.end)
    }

    pub fn position_at(&self, distance: f64) -> DVec2 {
        self.path
            .position_at_distance(self.start + distance.max(0.).min(self.distance()))
    }

    /// The interpolated start, every path vertex strictly inside the range,
    /// then the interpolated end.
    pub fn vertices(&self) -> impl Iterator<Item = DVec2> + 'a {
        let distances = self.path.cumulative_distance();
        let first = distances.partition_point(|&d| d <= self.start);
        let last = distances.partition_point(|&d| d < self.end).max(first);

        iter_once(self.start_position())
            .chain(self.path.vertices()[first..last].iter().copied())
            .chain(iter_once(self.end_position()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use test_case::test_case;

    fn square() -> CalculatedPath {
        CalculatedPath::build(
            [
                vec![DVec2::new(0., 0.), DVec2::new(10., 0.)],
                vec![DVec2::new(10., 0.), DVec2::new(10., 10.), DVec2::new(0., 10.)],
            ],
            None,
        )
    }

    #[test]
    fn duplicates_are_dropped() {
        let path = square();
        assert_eq!(path.vertices().len(), 4);
        assert_eq!(path.cumulative_distance(), &[0., 10., 20., 30.]);
        assert_eq!(path.segment_ends(), &[10., 30.]);
    }

    #[test_case(-5., DVec2::new(0., 0.); "clamped below")]
    #[test_case(0., DVec2::new(0., 0.); "start")]
    #[test_case(5., DVec2::new(5., 0.); "inside first edge")]
    #[test_case(10., DVec2::new(10., 0.); "on a vertex")]
    #[test_case(25., DVec2::new(5., 10.); "inside last edge")]
    #[test_case(99., DVec2::new(0., 10.); "clamped above")]
    fn positions(distance: f64, expected: DVec2) {
        assert!(square().position_at_distance(distance).distance(expected) < 1e-9);
    }

    #[test]
    fn empty_path_sits_at_origin() {
        let path = CalculatedPath::build(Vec::<Vec<DVec2>>::new(), Some(10.));
        assert!(path.is_empty());
        assert_eq!(path.distance(), 0.);
        assert_eq!(path.position_at_distance(3.), DVec2::ZERO);
    }

    #[test]
    fn trimmed_to_expected_distance() {
        let path = CalculatedPath::build([square().vertices().to_vec()], Some(15.));

        assert_eq!(path.distance(), 15.);
        assert_eq!(path.vertices().last(), Some(&DVec2::new(10., 5.)));
        assert_eq!(path.segment_ends(), &[15.]);
    }

    #[test]
    fn trimmed_to_nothing() {
        let path = CalculatedPath::build([square().vertices().to_vec()], Some(0.));
        assert_eq!(path.vertices(), &[DVec2::ZERO]);
        assert_eq!(path.distance(), 0.);
    }

    #[test]
    fn longer_expected_distance_leaves_path_alone() {
        let path = CalculatedPath::build([square().vertices().to_vec()], Some(100.));
        assert_eq!(path.vertices(), square().vertices());
        assert_eq!(path.position_at_distance(100.), DVec2::new(0., 10.));
    }

    #[test]
    fn range_vertices() {
        let path = square();
        let range = path.range(5., 25.);

        assert_eq!(range.distance(), 20.);
        assert_eq!(
            range.vertices().collect::<Vec<_>>(),
            vec![
                DVec2::new(5., 0.),
                DVec2::new(10., 0.),
                DVec2::new(10., 10.),
                DVec2::new(5., 10.),
            ]
        );
        assert!(range.position_at(10.).distance(DVec2::new(10., 5.)) < 1e-9);
        assert_eq!(range.position_at(500.), range.end_position());
        assert_eq!(range.position_at(f64::NAN), range.start_position());
    }

    #[test]
    fn range_on_vertices_has_no_duplicates() {
        let path = square();
        let vertices = path.range(10., 20.).vertices().collect::<Vec<_>>();
        assert_eq!(vertices, vec![DVec2::new(10., 0.), DVec2::new(10., 10.)]);
    }

    #[test]
    fn reversed_range_collapses() {
        let path = square();
        let range = path.range(20., 5.);
        assert_eq!(range.distance(), 0.);
        assert_eq!(range.start_position(), range.end_position());
    }
}
