// src/diff/mod.rs
//! Orchestration: per-class and whole-model comparison, trial-mapper
//! ranking, signature diffing, and the tunable thresholds.

pub mod class_diff;
pub mod model_diff;
pub mod ranking;
pub mod signature;
pub mod thresholds;

pub use class_diff::ClassDiff;
pub use model_diff::{DiffOptions, ModelDiff};
pub use ranking::MapperRank;
pub use thresholds::Thresholds;
