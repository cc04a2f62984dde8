use glam::{DMat3, DVec2};
use tap::Pipe;

pub const TAU: f64 = std::f64::consts::TAU;

pub trait IsLeft {
    fn is_left(&self, start: &Self, end: &Self) -> bool;
}

impl IsLeft for DVec2 {
    fn is_left(&self, start: &Self, end: &Self) -> bool {
        ((end.x - start.x) * (self.y - start.y) - (end.y - start.y) * (self.x - start.x)) > 0.
    }
}

/// Centre of the circle through three points, or `None` when they are
/// colinear within `tolerance` (measured on twice the signed triangle area).
#[rustfmt::skip]
pub fn circumcenter(points: [DVec2; 3], tolerance: f64) -> Option<DVec2> {
    // https://math.stackexchange.com/a/1460096
    let m11 = points
        .map(|point| [point.x, point.y, 1.])
        .pipe_ref(DMat3::from_cols_array_2d)
        .transpose()
        .determinant();

    if m11.abs() < tolerance {
        return None;
    }

    let m12 = points
        .map(|point| [point.length_squared(), point.y, 1.])
        .pipe_ref(DMat3::from_cols_array_2d)
        .transpose()
        .determinant();

    let m13 = points
        .map(|point| [point.length_squared(), point.x, 1.])
        .pipe_ref(DMat3::from_cols_array_2d)
        .transpose()
        .determinant();

    Some(DVec2::new(0.5 * (m12 / m11), -0.5 * (m13 / m11)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn circumcenter_of_right_angle() {
        let center = circumcenter(
            [DVec2::new(0., 0.), DVec2::new(50., 50.), DVec2::new(100., 0.)],
            1e-3,
        )
        .unwrap();

        assert!(center.distance(DVec2::new(50., 0.)) < 1e-9, "{center}");
    }

    #[test]
    fn colinear_points_have_no_circumcenter() {
        assert!(circumcenter(
            [DVec2::new(0., 0.), DVec2::new(1., 1.), DVec2::new(2., 2.)],
            1e-3
        )
        .is_none());
    }

    #[test]
    fn left_of_segment() {
        let (start, end) = (DVec2::ZERO, DVec2::new(1., 0.));
        assert!(DVec2::new(0.5, 1.).is_left(&start, &end));
        assert!(!DVec2::new(0.5, -1.).is_left(&start, &end));
    }
}
