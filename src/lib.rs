//! Beat timing and slider geometry for a rhythm game map editor.
//!
//! [`timing`] models tempo, slider velocity, kiai and hitsound control points
//! and turns them into a snappable grid of ticks. [`path`] turns authored
//! slider control points into an arc-length parameterized curve.

pub mod error;
pub mod path;
pub mod settings;
pub mod timing;
pub mod utils;

pub use error::{EngineError, Result};
pub use path::{
    CalculatedPath, PathApproximator, PathPoint, PathRange, PathSegment, PathType, SliderPath,
};
pub use settings::{ApproximationSettings, EngineSettings};
pub use timing::{
    BeatDivisor, ControlPoint, ControlPointGroup, ControlPointInfo, ControlPointKind,
    ControlPointList, DifficultyPoint, EffectPoint, ListEvent, SamplePoint, SampleSet, Tick,
    TickGenerator, TickType, Ticks, TimingPoint, TypedPoint,
};
