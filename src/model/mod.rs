// src/model/mod.rs
//! Read-only structural model of one snapshot: classes, operations,
//! attributes, and per-operation statement trees.

pub mod fragment;
pub mod invocation;
pub mod location;
pub mod operation;
pub mod text;

pub use fragment::{Body, BodyBuilder, Fragment, FragmentId, FragmentKind, VariableDeclaration};
pub use invocation::Invocation;
pub use location::CodeRange;
pub use operation::{
    Attribute, ClassKind, Operation, Parameter, UmlClass, UmlModel, Visibility,
};
