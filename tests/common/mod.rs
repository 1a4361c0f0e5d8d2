// tests/common/mod.rs
#![allow(dead_code)]

use refsift_core::model::{
    Body, BodyBuilder, Operation, Parameter, UmlClass, UmlModel,
};

/// Builds a flat body (leaf statements only) with auto-numbered lines.
pub fn body(file: &str, statements: &[&str]) -> Body {
    let mut builder = BodyBuilder::new(file, 1);
    for statement in statements {
        builder.leaf(statement);
    }
    builder.build()
}

/// A void operation with the given leaf statements.
pub fn operation(class: &str, name: &str, statements: &[&str]) -> Operation {
    Operation::new(class, name).with_body(body(&format!("{class}.java"), statements))
}

/// Same, with typed parameters given as `(name, type)` pairs.
pub fn operation_with_params(
    class: &str,
    name: &str,
    params: &[(&str, &str)],
    statements: &[&str],
) -> Operation {
    operation(class, name, statements).with_parameters(
        params.iter().map(|(n, t)| Parameter::new(*n, *t)).collect(),
    )
}

pub fn class(package: &str, name: &str, operations: Vec<Operation>) -> UmlClass {
    let mut class = UmlClass::new(package, name);
    for operation in operations {
        class.add_operation(operation);
    }
    class
}

pub fn model(classes: Vec<UmlClass>) -> UmlModel {
    let mut model = UmlModel::new();
    for class in classes {
        model.add_class(class);
    }
    model
}
