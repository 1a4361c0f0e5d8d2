// src/diff/thresholds.rs
use serde::Serialize;

/// Empirically tuned acceptance constants, preserved from the reference
/// behavior rather than re-derived; overridable for experimentation.
#[derive(Debug, Clone, Serialize)]
pub struct Thresholds {
    /// Residual unmapped statements tolerated when exactly one exact match
    /// anchors an extract/inline hypothesis.
    pub single_exact_match_unmapped_limit: usize,
    /// Residual tolerated when several exact matches anchor it.
    pub multi_exact_match_unmapped_limit: usize,
    /// Normalized name distance above which two operation names are not
    /// considered a plausible rename.
    pub rename_name_distance_cutoff: f64,
    /// Above this many removed and added operations, candidate generation
    /// stops widening the position gate.
    pub max_compared_methods: usize,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            single_exact_match_unmapped_limit: 10,
            multi_exact_match_unmapped_limit: 20,
            rename_name_distance_cutoff: 0.4,
            max_compared_methods: 20,
        }
    }
}
