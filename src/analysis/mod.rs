mod keys;
mod models;
mod sample;
mod variation;

pub use keys::{pitch_class_index, shift_key, PITCH_CLASSES};
pub use models::{
    Analysis, AnalysisResult, Timbre, VariationError, VariationParams, ENERGY_SHIFT_RANGE,
    KEY_SHIFT_RANGE, MODEL_CONFIDENCE, TEMPO_SHIFT_RANGE,
};
pub use sample::sample_analysis;
pub use variation::{apply_variation, apply_variation_to_result};
