use super::PathType;
use crate::{error::*, settings::*, utils::*};

use core::iter::once as iter_once;

use glam::DVec2;
use itertools::Itertools;
use tap::Pipe;
use tracing::debug;

// Twice the signed triangle area below which three points count as colinear.
const COLINEAR_TOLERANCE: f64 = 1e-3;
// Arcs that would need more vertices than this are flattened as Béziers.
const MAX_ARC_VERTICES: usize = 1000;

/// Splits a Bézier curve at its midpoint via de Casteljau.
fn subdivide(points: &[DVec2]) -> (Vec<DVec2>, Vec<DVec2>) {
    let count = points.len();
    let mut midpoints = points.to_vec();
    let mut left = Vec::with_capacity(count);
    let mut right = vec![DVec2::ZERO; count];

    for i in 0..count {
        left.push(midpoints[0]);
        right[count - i - 1] = midpoints[count - i - 1];

        for j in 0..count - i - 1 {
            midpoints[j] = (midpoints[j] + midpoints[j + 1]) / 2.;
        }
    }

    (left, right)
}

fn catmull_point(window: [DVec2; 4], t: f64) -> DVec2 {
    let [p0, p1, p2, p3] = window;
    let (t2, t3) = (t * t, t * t * t);

    0.5 * (2. * p1
        + (-p0 + p2) * t
        + (2. * p0 - 5. * p1 + 4. * p2 - p3) * t2
        + (-p0 + 3. * p1 - 3. * p2 + p3) * t3)
}

/// Turns sparse control points into dense polylines.
///
/// Every method keeps the input's direction, starts on the first input
/// point and ends on the last. Inputs with fewer than two points come back
/// unchanged.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PathApproximator {
    settings: ApproximationSettings,
}

impl PathApproximator {
    pub fn new(settings: ApproximationSettings) -> Result<Self> {
        settings.validate()?;
        Ok(Self { settings })
    }

    pub fn settings(&self) -> &ApproximationSettings {
        &self.settings
    }

    pub fn approximate(&self, kind: PathType, points: &[DVec2]) -> Vec<DVec2> {
        match kind {
            PathType::Linear => self.linear(points),
            PathType::Bezier => self.bezier(points),
            PathType::Catmull => self.catmull(points),
            PathType::BSpline(degree) => self.bspline(points, degree),
            PathType::PerfectCurve => {
                let arc = <[DVec2; 3]>::try_from(points)
                    .ok()
                    .and_then(|points| self.circular_arc(points));

                arc.unwrap_or_else(|| {
                    debug!(points = points.len(), "perfect curve approximated as bezier");
                    self.bezier(points)
                })
            }
        }
    }

    pub fn linear(&self, points: &[DVec2]) -> Vec<DVec2> {
        points.to_vec()
    }

    fn is_flat_enough(&self, points: &[DVec2]) -> bool {
        let limit = 4. * self.settings.bezier_tolerance.powi(2);

        !points
            .iter()
            .tuple_windows::<(_, _, _)>()
            .any(|(&a, &b, &c)| limit < (a - 2. * b + c).length_squared())
    }

    // Replaces a flat piece by a short polyline through weighted midpoints
    // of its two halves.
    fn approximate_flat(points: &[DVec2], output: &mut Vec<DVec2>) {
        let (mut left, right) = subdivide(points);
        left.extend(right.iter().skip(1));

        output.push(points[0]);
        output.extend(
            left[1..]
                .windows(3)
                .step_by(2)
                .map(|window| 0.25 * (window[0] + 2. * window[1] + window[2])),
        );
    }

    /// Adaptive de Casteljau flattening of a single Bézier curve of any
    /// degree.
    pub fn bezier(&self, points: &[DVec2]) -> Vec<DVec2> {
        let Some(&last) = points.last().filter(|_| 2 <= points.len()) else {
            return points.to_vec();
        };

        let mut output = vec![];
        let mut to_flatten = vec![points.to_vec()];

        while let Some(parent) = to_flatten.pop() {
            if self.is_flat_enough(&parent) {
                Self::approximate_flat(&parent, &mut output);
            } else {
                let (left, right) = subdivide(&parent);
                to_flatten.push(right);
                to_flatten.push(left);
            }
        }

        output.push(last);
        output
    }

    /// Uniform Catmull-Rom through every point. The first span reuses its
    /// start as the leading neighbour; the last mirrors its end.
    pub fn catmull(&self, points: &[DVec2]) -> Vec<DVec2> {
        let Some(&last) = points.last().filter(|_| 2 <= points.len()) else {
            return points.to_vec();
        };

        let detail = self.settings.catmull_detail.max(1);

        #[rustfmt::skip]
        let spans = (0..points.len() - 1)
            .map(|i| {
                let p1 = points[i];
                let p0 = i.checked_sub(1).map_or(p1, |prev| points[prev]);
                let p2 = points[i + 1];
                let p3 = points.get(i + 2).copied().unwrap_or(2. * p2 - p1);
                [p0, p1, p2, p3]
            })
            .flat_map(|window| (0..detail).map(move |step| {
                catmull_point(window, step as f64 / detail as f64)
            }));

        spans.chain(iter_once(last)).collect()
    }

    /// The arc of the unique circle through `points`, from the first point
    /// through the second to the third. `None` when they are colinear, or so
    /// close to it that the arc would need an unreasonable vertex count.
    pub fn circular_arc(&self, points: [DVec2; 3]) -> Option<Vec<DVec2>> {
        let [a, b, c] = points;
        let tolerance = self.settings.circular_arc_tolerance;
        let center = circumcenter(points, COLINEAR_TOLERANCE)?;
        let radius = (a - center).length();

        let theta_start = (a - center).pipe(|offset| offset.y.atan2(offset.x));
        let mut theta_end = (c - center).pipe(|offset| offset.y.atan2(offset.x));

        if theta_end < theta_start {
            theta_end += TAU;
        }

        let (direction, range) = if b.is_left(&a, &c) {
            (-1., TAU - (theta_end - theta_start))
        } else {
            (1., theta_end - theta_start)
        };

        let count = if 2. * radius <= tolerance {
            2.
        } else {
            (range / (2. * (1. - tolerance / radius).acos())).ceil().max(2.)
        };

        if !(count <= MAX_ARC_VERTICES as f64) {
            return None;
        }
        let count = count as usize;

        #[rustfmt::skip]
        let arc = (0..count)
            .map(|i| theta_start + direction * range * i as f64 / (count - 1) as f64)
            .map(|theta| center + radius * DVec2::new(theta.cos(), theta.sin()))
            .collect();

        Some(arc)
    }

    /// Uniform clamped B-spline, split into Bézier pieces by repeated knot
    /// insertion (Boehm). Degree 0 uses the configured default; any degree is
    /// capped at one less than the point count.
    pub fn bspline(&self, points: &[DVec2], degree: u8) -> Vec<DVec2> {
        let Some(&last) = points.last().filter(|_| 2 <= points.len()) else {
            return points.to_vec();
        };

        let degree = match degree {
            0 => self.settings.bspline_degree,
            degree => degree,
        }
        .max(1) as usize;

        let mut output = Self::bspline_pieces(points, degree.min(points.len() - 1))
            .iter()
            .flat_map(|piece| {
                let mut flattened = self.bezier(piece);
                flattened.pop();
                flattened
            })
            .collect::<Vec<_>>();

        output.push(last);
        output
    }

    fn bspline_pieces(points: &[DVec2], degree: usize) -> Vec<Vec<DVec2>> {
        let mut points = points.to_vec();
        let spans = points.len() - 1;
        let mut pieces = Vec::with_capacity(spans.saturating_sub(degree) + 1);

        for i in 0..spans - degree {
            let mut piece = Vec::with_capacity(degree + 1);
            piece.push(points[i]);

            for j in 0..degree - 1 {
                piece.push(points[i + 1]);

                for k in 1..degree - j {
                    let weight = k.min(spans - degree - i) as f64;
                    points[i + k] = (weight * points[i + k] + points[i + k + 1]) / (weight + 1.);
                }
            }

            piece.push(points[i + 1]);
            pieces.push(piece);
        }

        pieces.push(points[spans - degree..].to_vec());
        pieces
    }
}
