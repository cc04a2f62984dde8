/// Result alias carrying [`EngineError`].
pub type Result<T, E = EngineError> = std::result::Result<T, E>;

/// Invariant violations rejected at construction or setter boundaries.
///
/// Degenerate geometry and empty-state queries are not errors: they are
/// recovered where they happen.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("beat length must be positive and finite, got {0}")]
    InvalidBeatLength(f64),
    #[error("meter must be at least 1, got {0}")]
    InvalidMeter(u32),
    #[error("beat divisor must be at least 1, got {0}")]
    InvalidDivisor(u32),
    #[error("unknown sample set {0}")]
    UnknownSampleSet(u8),
    #[error("time must be finite, got {0}")]
    NonFiniteTime(f64),
    #[error("slider velocity must be a number, got {0}")]
    InvalidSliderVelocity(f64),
    #[error("expected distance must be finite and non-negative, got {0}")]
    InvalidExpectedDistance(f64),
    #[error("invalid setting `{name}`: {reason}")]
    InvalidSetting { name: &'static str, reason: String },
    #[error("could not read settings: {0}")]
    Settings(#[from] serde_json::Error),
}
