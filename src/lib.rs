// src/lib.rs
//! Refactoring detection over two snapshots of a source model.
//!
//! Callers build a [`model::UmlModel`] per snapshot (classes, operations,
//! statement trees), then run [`diff::ModelDiff::compare`]. The engine
//! pairs classes and operations, maps statements between matched bodies,
//! tests extract/inline hypotheses along call trees, resolves conflicting
//! evidence, and reports the surviving [`refactoring::Refactoring`]
//! instances with the statement pairs that justify them.

pub mod deadline;
pub mod detection;
pub mod diff;
pub mod error;
pub mod mapping;
pub mod model;
pub mod refactoring;

pub use deadline::Deadline;
pub use diff::{DiffOptions, ModelDiff, Thresholds};
pub use error::{DiffError, Result};
pub use refactoring::Refactoring;
