pub mod approximator;
pub mod calculated_path;
pub mod slider_path;

pub use approximator::*;
pub use calculated_path::*;
pub use slider_path::*;

use glam::DVec2;
use serde::{Deserialize, Serialize};

/// How the control points of one segment are turned into a curve.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PathType {
    Linear,
    Bezier,
    Catmull,
    /// A circular arc through exactly three points.
    PerfectCurve,
    /// Degree 0 stands for the configured default degree.
    BSpline(u8),
}

/// An authored slider control point. A typed point starts a new segment.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct PathPoint {
    pub position: DVec2,
    pub segment_type: Option<PathType>,
}

impl PathPoint {
    pub fn new(position: DVec2) -> Self {
        Self {
            position,
            segment_type: None,
        }
    }

    pub fn typed(position: DVec2, segment_type: PathType) -> Self {
        Self {
            position,
            segment_type: Some(segment_type),
        }
    }
}

impl From<DVec2> for PathPoint {
    fn from(position: DVec2) -> Self {
        Self::new(position)
    }
}
