// src/detection/mod.rs
//! Call-tree-based extract/inline detection and cross-mapper duplicate
//! resolution.

pub mod call_tree;
pub mod extract;
pub mod inline;
pub mod resolve;

pub use call_tree::{CallTree, CallTreeNode};
pub use extract::{AcceptedExtract, ExtractDetection};
pub use inline::{AcceptedInline, InlineDetection};
