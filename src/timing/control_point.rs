use crate::{error::*, utils::*};

use std::fmt::Debug;

use derive_more::From;
use noisy_float::prelude::*;
use serde::{Deserialize, Serialize};

/// Validates a raw timestamp coming from outside the engine.
pub fn checked_time(time: f64) -> Result<R64> {
    R64::try_new(time).ok_or(EngineError::NonFiniteTime(time))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ControlPointKind {
    Timing,
    Difficulty,
    Effect,
    Sample,
}

/// Shared behaviour of the four control point kinds, used by the generic
/// list. Points are plain values; once owned by a list their time can only
/// change through the list so it stays sorted.
pub trait TypedPoint: Quantify + Copy + PartialEq + Debug {
    const KIND: ControlPointKind;

    fn time(&self) -> R64 {
        self.quantify()
    }

    fn set_time(&mut self, time: R64);

    /// Whether adding `self` after `existing` (the point of the same kind in
    /// effect just before it) would change nothing.
    fn is_redundant(&self, existing: Option<&Self>) -> bool;
}

macro_rules! typed_point {
    ($point:ty, $kind:ident) => {
        impl Quantify for $point {
            fn quantify(&self) -> R64 {
                self.time
            }
        }

        impl TypedPoint for $point {
            const KIND: ControlPointKind = ControlPointKind::$kind;

            fn set_time(&mut self, time: R64) {
                self.time = time;
            }

            fn is_redundant(&self, existing: Option<&Self>) -> bool {
                existing.map_or(false, |existing| self.same_payload(existing))
            }
        }
    };
}

/// Tempo and meter from its time until the next timing point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimingPoint {
    time: R64,
    beat_length: f64,
    meter: u32,
}

impl TimingPoint {
    pub const DEFAULT_BEAT_LENGTH: f64 = 500.;
    pub const DEFAULT_METER: u32 = 4;

    pub fn new(time: R64, beat_length: f64, meter: u32) -> Result<Self> {
        Ok(Self {
            time,
            beat_length: Self::check_beat_length(beat_length)?,
            meter: Self::check_meter(meter)?,
        })
    }

    pub fn from_bpm(time: R64, bpm: f64, meter: u32) -> Result<Self> {
        Self::new(time, 60000. / bpm, meter)
    }

    fn check_beat_length(beat_length: f64) -> Result<f64> {
        (beat_length.is_finite() && 0. < beat_length)
            .then_some(beat_length)
            .ok_or(EngineError::InvalidBeatLength(beat_length))
    }

    fn check_meter(meter: u32) -> Result<u32> {
        (1 <= meter).then_some(meter).ok_or(EngineError::InvalidMeter(meter))
    }

    pub fn beat_length(&self) -> f64 {
        self.beat_length
    }

    pub fn meter(&self) -> u32 {
        self.meter
    }

    pub fn bpm(&self) -> f64 {
        60000. / self.beat_length
    }

    pub fn measure_length(&self) -> f64 {
        self.beat_length * self.meter as f64
    }

    pub fn set_beat_length(&mut self, beat_length: f64) -> Result<()> {
        self.beat_length = Self::check_beat_length(beat_length)?;
        Ok(())
    }

    pub fn set_meter(&mut self, meter: u32) -> Result<()> {
        self.meter = Self::check_meter(meter)?;
        Ok(())
    }

    /// Whether `time` lands on a measure boundary of this point's grid.
    pub fn is_on_measure(&self, time: R64) -> bool {
        let measures = (time - self.time).raw() / self.measure_length();
        (measures - measures.round()).abs() < 1e-6
    }

    // Same tempo and meter is not enough: a point that restarts the measure
    // off the existing grid still moves every downbeat after it.
    fn same_payload(&self, existing: &Self) -> bool {
        self.beat_length == existing.beat_length
            && self.meter == existing.meter
            && existing.is_on_measure(self.time)
    }
}

impl Default for TimingPoint {
    fn default() -> Self {
        Self {
            time: r64(0.),
            beat_length: Self::DEFAULT_BEAT_LENGTH,
            meter: Self::DEFAULT_METER,
        }
    }
}

typed_point!(TimingPoint, Timing);

/// Slider velocity multiplier from its time until the next difficulty point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DifficultyPoint {
    time: R64,
    slider_velocity: f64,
}

impl DifficultyPoint {
    pub const MIN_SLIDER_VELOCITY: f64 = 0.1;
    pub const MAX_SLIDER_VELOCITY: f64 = 10.;

    pub fn new(time: R64, slider_velocity: f64) -> Result<Self> {
        Ok(Self {
            time,
            slider_velocity: Self::normalize(slider_velocity)?,
        })
    }

    /// Clamped into range and rounded to two decimals.
    fn normalize(slider_velocity: f64) -> Result<f64> {
        if slider_velocity.is_nan() {
            return Err(EngineError::InvalidSliderVelocity(slider_velocity));
        }

        Ok((slider_velocity.clamp(Self::MIN_SLIDER_VELOCITY, Self::MAX_SLIDER_VELOCITY) * 100.)
            .round()
            / 100.)
    }

    pub fn slider_velocity(&self) -> f64 {
        self.slider_velocity
    }

    pub fn set_slider_velocity(&mut self, slider_velocity: f64) -> Result<()> {
        self.slider_velocity = Self::normalize(slider_velocity)?;
        Ok(())
    }

    fn same_payload(&self, existing: &Self) -> bool {
        self.slider_velocity == existing.slider_velocity
    }
}

impl Default for DifficultyPoint {
    fn default() -> Self {
        Self {
            time: r64(0.),
            slider_velocity: 1.,
        }
    }
}

typed_point!(DifficultyPoint, Difficulty);

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct EffectPoint {
    time: R64,
    kiai: bool,
}

impl EffectPoint {
    pub fn new(time: R64, kiai: bool) -> Self {
        Self { time, kiai }
    }

    pub fn kiai(&self) -> bool {
        self.kiai
    }

    pub fn set_kiai(&mut self, kiai: bool) {
        self.kiai = kiai;
    }

    fn same_payload(&self, existing: &Self) -> bool {
        self.kiai == existing.kiai
    }
}

typed_point!(EffectPoint, Effect);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[repr(u8)]
pub enum SampleSet {
    Auto = 0,
    #[default]
    Normal = 1,
    Soft = 2,
    Drum = 3,
}

impl TryFrom<u8> for SampleSet {
    type Error = EngineError;

    fn try_from(value: u8) -> Result<Self> {
        match value {
            0 => Ok(Self::Auto),
            1 => Ok(Self::Normal),
            2 => Ok(Self::Soft),
            3 => Ok(Self::Drum),
            unknown => Err(EngineError::UnknownSampleSet(unknown)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SamplePoint {
    time: R64,
    volume: u8,
    sample_set: SampleSet,
    sample_index: u32,
}

impl SamplePoint {
    pub const MIN_VOLUME: u8 = 5;
    pub const MAX_VOLUME: u8 = 100;

    pub fn new(time: R64, volume: i32, sample_set: SampleSet, sample_index: u32) -> Self {
        Self {
            time,
            volume: Self::clamp_volume(volume),
            sample_set,
            sample_index,
        }
    }

    fn clamp_volume(volume: i32) -> u8 {
        volume.clamp(Self::MIN_VOLUME as i32, Self::MAX_VOLUME as i32) as u8
    }

    pub fn volume(&self) -> u8 {
        self.volume
    }

    pub fn sample_set(&self) -> SampleSet {
        self.sample_set
    }

    pub fn sample_index(&self) -> u32 {
        self.sample_index
    }

    pub fn set_volume(&mut self, volume: i32) {
        self.volume = Self::clamp_volume(volume);
    }

    pub fn set_sample_set(&mut self, sample_set: SampleSet) {
        self.sample_set = sample_set;
    }

    pub fn set_sample_index(&mut self, sample_index: u32) {
        self.sample_index = sample_index;
    }

    fn same_payload(&self, existing: &Self) -> bool {
        (self.volume, self.sample_set, self.sample_index)
            == (existing.volume, existing.sample_set, existing.sample_index)
    }
}

impl Default for SamplePoint {
    fn default() -> Self {
        Self {
            time: r64(0.),
            volume: Self::MAX_VOLUME,
            sample_set: SampleSet::Normal,
            sample_index: 0,
        }
    }
}

typed_point!(SamplePoint, Sample);

#[derive(Debug, Clone, Copy, PartialEq, From)]
pub enum ControlPoint {
    Timing(TimingPoint),
    Difficulty(DifficultyPoint),
    Effect(EffectPoint),
    Sample(SamplePoint),
}

impl ControlPoint {
    pub fn kind(&self) -> ControlPointKind {
        match self {
            Self::Timing(_) => ControlPointKind::Timing,
            Self::Difficulty(_) => ControlPointKind::Difficulty,
            Self::Effect(_) => ControlPointKind::Effect,
            Self::Sample(_) => ControlPointKind::Sample,
        }
    }

    pub fn time(&self) -> R64 {
        self.quantify()
    }

    pub fn set_time(&mut self, time: R64) {
        match self {
            Self::Timing(point) => point.set_time(time),
            Self::Difficulty(point) => point.set_time(time),
            Self::Effect(point) => point.set_time(time),
            Self::Sample(point) => point.set_time(time),
        }
    }
}

impl Quantify for ControlPoint {
    fn quantify(&self) -> R64 {
        match self {
            Self::Timing(point) => point.quantify(),
            Self::Difficulty(point) => point.quantify(),
            Self::Effect(point) => point.quantify(),
            Self::Sample(point) => point.quantify(),
        }
    }
}

/// Every control point sharing one timestamp, at most one per kind.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ControlPointGroup {
    time: R64,
    timing: Option<TimingPoint>,
    difficulty: Option<DifficultyPoint>,
    effect: Option<EffectPoint>,
    sample: Option<SamplePoint>,
}

impl ControlPointGroup {
    pub fn new(time: R64) -> Self {
        Self {
            time,
            ..Default::default()
        }
    }

    pub fn time(&self) -> R64 {
        self.time
    }

    /// Moves the group and every point in it.
    pub fn set_time(&mut self, time: R64) {
        self.time = time;
        self.timing.iter_mut().for_each(|point| point.set_time(time));
        self.difficulty.iter_mut().for_each(|point| point.set_time(time));
        self.effect.iter_mut().for_each(|point| point.set_time(time));
        self.sample.iter_mut().for_each(|point| point.set_time(time));
    }

    /// Adopts `point` at the group's time, handing back whatever point of
    /// the same kind it replaces.
    pub fn insert(&mut self, point: impl Into<ControlPoint>) -> Option<ControlPoint> {
        let mut point = point.into();
        point.set_time(self.time);

        match point {
            ControlPoint::Timing(point) => self.timing.replace(point).map(ControlPoint::from),
            ControlPoint::Difficulty(point) => {
                self.difficulty.replace(point).map(ControlPoint::from)
            }
            ControlPoint::Effect(point) => self.effect.replace(point).map(ControlPoint::from),
            ControlPoint::Sample(point) => self.sample.replace(point).map(ControlPoint::from),
        }
    }

    pub fn remove(&mut self, kind: ControlPointKind) -> Option<ControlPoint> {
        match kind {
            ControlPointKind::Timing => self.timing.take().map(ControlPoint::from),
            ControlPointKind::Difficulty => self.difficulty.take().map(ControlPoint::from),
            ControlPointKind::Effect => self.effect.take().map(ControlPoint::from),
            ControlPointKind::Sample => self.sample.take().map(ControlPoint::from),
        }
    }

    pub fn get(&self, kind: ControlPointKind) -> Option<ControlPoint> {
        match kind {
            ControlPointKind::Timing => self.timing.map(ControlPoint::from),
            ControlPointKind::Difficulty => self.difficulty.map(ControlPoint::from),
            ControlPointKind::Effect => self.effect.map(ControlPoint::from),
            ControlPointKind::Sample => self.sample.map(ControlPoint::from),
        }
    }

    pub fn timing(&self) -> Option<&TimingPoint> {
        self.timing.as_ref()
    }

    pub fn difficulty(&self) -> Option<&DifficultyPoint> {
        self.difficulty.as_ref()
    }

    pub fn effect(&self) -> Option<&EffectPoint> {
        self.effect.as_ref()
    }

    pub fn sample(&self) -> Option<&SamplePoint> {
        self.sample.as_ref()
    }

    pub fn points(&self) -> impl Iterator<Item = ControlPoint> {
        [
            self.timing.map(ControlPoint::from),
            self.difficulty.map(ControlPoint::from),
            self.effect.map(ControlPoint::from),
            self.sample.map(ControlPoint::from),
        ]
        .into_iter()
        .flatten()
    }

    pub fn is_empty(&self) -> bool {
        self.points().next().is_none()
    }
}
