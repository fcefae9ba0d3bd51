//! The variation engine: derives a creative alternative of an analysis.

use super::keys::shift_key;
use super::models::{Analysis, AnalysisResult, VariationParams};

/// Applies tempo, key and energy offsets to `base`, returning a new analysis.
///
/// Tempo is scaled by `params.tempo` percent and rounded to the nearest BPM.
/// Keys outside the canonical twelve are left as they are while the other
/// offsets still apply. Energy is shifted by `params.energy` percentage points
/// and clamped into [0, 1].
pub fn apply_variation(base: &Analysis, params: &VariationParams) -> Analysis {
    let tempo = (base.tempo as f64 * (1.0 + params.tempo as f64 / 100.0)).round();
    let key = match shift_key(&base.key, params.key) {
        Some(shifted) => shifted.to_string(),
        None => base.key.clone(),
    };
    let energy = (base.energy + params.energy as f64 / 100.0).clamp(0.0, 1.0);

    Analysis {
        tempo: tempo.max(0.0) as u32,
        key,
        energy,
        ..base.clone()
    }
}

/// Same as [`apply_variation`], keeping the result's provenance untouched.
pub fn apply_variation_to_result(base: &AnalysisResult, params: &VariationParams) -> AnalysisResult {
    AnalysisResult {
        analysis: apply_variation(&base.analysis, params),
        ..base.clone()
    }
}
