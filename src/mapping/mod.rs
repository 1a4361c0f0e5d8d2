// src/mapping/mod.rs
//! Statement-level correspondence: replacements, mappings, and the
//! per-operation-pair body mapper.

pub mod code_mapping;
pub mod mapper;
pub mod matcher;
pub mod replacement;

pub use code_mapping::CodeMapping;
pub use mapper::{BodyMapper, ParameterBindings};
pub use replacement::{Replacement, ReplacementKind};
