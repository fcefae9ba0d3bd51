//! Data contracts shared by the requester, the variation engine and the server.

use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Confidence attached to every model-generated analysis.
///
/// The analysis is produced by a language model, not measured from audio,
/// so this never reaches 1.0.
pub const MODEL_CONFIDENCE: f64 = 0.85;

/// Prominence of one instrument or sound source, in [0, 1].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Timbre {
    pub name: String,
    pub value: f64,
}

impl Timbre {
    pub fn new(name: impl Into<String>, value: f64) -> Self {
        Self {
            name: name.into(),
            value,
        }
    }
}

/// Structured musical description of a song.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Analysis {
    pub title: String,
    pub genre: String,
    /// Beats per minute.
    pub tempo: u32,
    /// One of the twelve pitch-class names, see [`super::keys::PITCH_CLASSES`].
    pub key: String,
    /// Usually "Major" or "Minor", but the model may return anything.
    pub mode: String,
    pub chord_progression: Vec<String>,
    pub timbre: Vec<Timbre>,
    pub energy: f64,
    pub mood: String,
}

impl Analysis {
    /// Clamps every timbre value and the energy level into [0, 1].
    pub fn clamped(mut self) -> Self {
        for timbre in self.timbre.iter_mut() {
            timbre.value = timbre.value.clamp(0.0, 1.0);
        }
        self.energy = self.energy.clamp(0.0, 1.0);
        self
    }
}

/// An [`Analysis`] together with where it came from and when.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResult {
    pub title: String,
    pub source_url: String,
    pub analysis: Analysis,
    pub confidence: f64,
    pub timestamp: String,
}

impl AnalysisResult {
    /// Wraps a freshly produced analysis, stamping it with the current time.
    pub fn new(source: impl Into<String>, analysis: Analysis) -> Self {
        Self {
            title: analysis.title.clone(),
            source_url: source.into(),
            analysis,
            confidence: MODEL_CONFIDENCE,
            timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
        }
    }
}

pub const TEMPO_SHIFT_RANGE: (i32, i32) = (-20, 20);
pub const KEY_SHIFT_RANGE: (i32, i32) = (-6, 6);
pub const ENERGY_SHIFT_RANGE: (i32, i32) = (-25, 25);

#[derive(Debug, Error, PartialEq, Eq)]
pub enum VariationError {
    #[error("{field} shift {value} is out of range [{min}, {max}]")]
    OutOfRange {
        field: &'static str,
        value: i32,
        min: i32,
        max: i32,
    },
}

/// Bounded offsets applied by the variation engine.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VariationParams {
    /// Tempo change in percent.
    pub tempo: i32,
    /// Key change in semitones.
    pub key: i32,
    /// Energy change in percentage points.
    pub energy: i32,
}

impl VariationParams {
    pub fn new(tempo: i32, key: i32, energy: i32) -> Result<Self, VariationError> {
        let params = Self { tempo, key, energy };
        params.validate()?;
        Ok(params)
    }

    pub fn is_identity(&self) -> bool {
        *self == Self::default()
    }

    pub fn validate(&self) -> Result<(), VariationError> {
        check_range("tempo", self.tempo, TEMPO_SHIFT_RANGE)?;
        check_range("key", self.key, KEY_SHIFT_RANGE)?;
        check_range("energy", self.energy, ENERGY_SHIFT_RANGE)
    }
}

fn check_range(field: &'static str, value: i32, range: (i32, i32)) -> Result<(), VariationError> {
    let (min, max) = range;
    if value < min || value > max {
        return Err(VariationError::OutOfRange {
            field,
            value,
            min,
            max,
        });
    }
    Ok(())
}
