// src/error.rs
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DiffError {
    /// The wall-clock deadline expired while comparing one unit of work.
    /// No partial refactorings are reported for that unit.
    #[error("comparison timed out after {elapsed_ms}ms (budget: {budget_ms}ms)")]
    TimedOut { elapsed_ms: u128, budget_ms: u128 },

    #[error("malformed model: {0}")]
    Model(String),
}

pub type Result<T> = std::result::Result<T, DiffError>;
