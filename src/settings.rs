use crate::error::*;

use serde::{Deserialize, Serialize};

/// Largest allowed distance between a flat Bézier piece and its chord.
pub const BEZIER_TOLERANCE: f64 = 0.25;
/// Vertices emitted per Catmull-Rom span.
pub const CATMULL_DETAIL: u32 = 50;
/// Largest allowed distance between a circular arc and its chords.
pub const CIRCULAR_ARC_TOLERANCE: f64 = 0.1;
/// Degree used by B-spline segments that don't name one.
pub const BSPLINE_DEGREE: u8 = 3;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApproximationSettings {
    pub bezier_tolerance: f64,
    pub catmull_detail: u32,
    pub circular_arc_tolerance: f64,
    pub bspline_degree: u8,
}

impl Default for ApproximationSettings {
    fn default() -> Self {
        Self {
            bezier_tolerance: BEZIER_TOLERANCE,
            catmull_detail: CATMULL_DETAIL,
            circular_arc_tolerance: CIRCULAR_ARC_TOLERANCE,
            bspline_degree: BSPLINE_DEGREE,
        }
    }
}

fn positive(name: &'static str, value: f64) -> Result<()> {
    (value.is_finite() && 0. < value)
        .then_some(())
        .ok_or_else(|| EngineError::InvalidSetting {
            name,
            reason: format!("must be finite and positive, got {value}"),
        })
}

fn at_least_one(name: &'static str, value: u32) -> Result<()> {
    (1 <= value)
        .then_some(())
        .ok_or_else(|| EngineError::InvalidSetting {
            name,
            reason: format!("must be at least 1, got {value}"),
        })
}

impl ApproximationSettings {
    pub fn validate(&self) -> Result<()> {
        positive("bezier_tolerance", self.bezier_tolerance)?;
        at_least_one("catmull_detail", self.catmull_detail)?;
        positive("circular_arc_tolerance", self.circular_arc_tolerance)?;
        at_least_one("bspline_degree", self.bspline_degree as u32)
    }
}

/// Everything tunable about the engine. Missing fields fall back to their
/// defaults, so partial documents are fine.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineSettings {
    pub approximation: ApproximationSettings,
}

impl EngineSettings {
    pub fn from_json(json: &str) -> Result<Self> {
        let settings = serde_json::from_str::<Self>(json)?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn validate(&self) -> Result<()> {
        self.approximation.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use test_case::test_case;

    #[test]
    fn partial_documents_keep_defaults() {
        let settings =
            EngineSettings::from_json(r#"{ "approximation": { "catmull_detail": 20 } }"#).unwrap();

        assert_eq!(
            settings.approximation,
            ApproximationSettings {
                catmull_detail: 20,
                ..Default::default()
            }
        );
        assert_eq!(EngineSettings::from_json("{}").unwrap(), EngineSettings::default());
    }

    #[test]
    fn survives_a_json_round_trip() {
        let mut settings = EngineSettings::default();
        settings.approximation.bspline_degree = 5;

        let json = settings.to_json().unwrap();
        assert_eq!(EngineSettings::from_json(&json).unwrap(), settings);
    }

    #[test_case(r#"{ "approximation": { "bezier_tolerance": 0 } }"#, "bezier_tolerance")]
    #[test_case(r#"{ "approximation": { "catmull_detail": 0 } }"#, "catmull_detail")]
    #[test_case(r#"{ "approximation": { "circular_arc_tolerance": -1 } }"#, "circular_arc_tolerance")]
    #[test_case(r#"{ "approximation": { "bspline_degree": 0 } }"#, "bspline_degree")]
    fn invalid_values_are_named(json: &str, field: &str) {
        match EngineSettings::from_json(json) {
            Err(EngineError::InvalidSetting { name, .. }) => assert_eq!(name, field),
            other => panic!("expected invalid {field}, got {other:?}"),
        }
    }

    #[test]
    fn malformed_json_is_an_error() {
        assert!(matches!(
            EngineSettings::from_json("{ approximation"),
            Err(EngineError::Settings(_))
        ));
    }
}
