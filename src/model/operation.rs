// src/model/operation.rs
//! Declarations: operations, attributes, classes, and the model root.
//! Supplied read-only by the upstream source-model builder; the engine
//! never mutates them.

use crate::model::fragment::Body;
use crate::model::invocation::Invocation;
use crate::model::location::CodeRange;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Visibility {
    Public,
    Protected,
    Private,
    PackagePrivate,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Parameter {
    pub name: String,
    pub type_name: String,
    pub varargs: bool,
}

impl Parameter {
    #[must_use]
    pub fn new(name: impl Into<String>, type_name: impl Into<String>) -> Self {
        Self { name: name.into(), type_name: type_name.into(), varargs: false }
    }

    #[must_use]
    pub fn varargs(name: impl Into<String>, type_name: impl Into<String>) -> Self {
        Self { name: name.into(), type_name: type_name.into(), varargs: true }
    }
}

/// A method or initializer: signature plus an ordered statement tree.
/// Abstract operations carry no body.
#[derive(Debug, Clone, Serialize)]
pub struct Operation {
    pub name: String,
    pub class_name: String,
    pub visibility: Visibility,
    pub is_abstract: bool,
    pub is_static: bool,
    pub is_final: bool,
    pub annotations: Vec<String>,
    pub parameters: Vec<Parameter>,
    pub return_type: String,
    pub body: Option<Body>,
    pub location: CodeRange,
}

impl Operation {
    #[must_use]
    pub fn new(class_name: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            class_name: class_name.into(),
            visibility: Visibility::Public,
            is_abstract: false,
            is_static: false,
            is_final: false,
            annotations: Vec::new(),
            parameters: Vec::new(),
            return_type: "void".to_owned(),
            body: None,
            location: CodeRange::line("<unknown>", 0),
        }
    }

    #[must_use]
    pub fn with_parameters(mut self, parameters: Vec<Parameter>) -> Self {
        self.parameters = parameters;
        self
    }

    #[must_use]
    pub fn with_return_type(mut self, return_type: impl Into<String>) -> Self {
        self.return_type = return_type.into();
        self
    }

    #[must_use]
    pub fn with_body(mut self, body: Body) -> Self {
        self.body = Some(body);
        self
    }

    #[must_use]
    pub fn with_annotations(mut self, annotations: Vec<String>) -> Self {
        self.annotations = annotations;
        self
    }

    #[must_use]
    pub fn with_location(mut self, location: CodeRange) -> Self {
        self.location = location;
        self
    }

    #[must_use]
    pub fn with_visibility(mut self, visibility: Visibility) -> Self {
        self.visibility = visibility;
        self
    }

    #[must_use]
    pub fn abstract_operation(mut self) -> Self {
        self.is_abstract = true;
        self.body = None;
        self
    }

    /// `name(T1, T2) : R`, the display form used in evidence.
    #[must_use]
    pub fn signature_string(&self) -> String {
        let params: Vec<&str> = self.parameters.iter().map(|p| p.type_name.as_str()).collect();
        format!("{}({}) : {}", self.name, params.join(", "), self.return_type)
    }

    /// Identity of an operation across lists: owning class + signature.
    #[must_use]
    pub fn key(&self) -> String {
        format!("{}#{}", self.class_name, self.signature_string())
    }

    #[must_use]
    pub fn equal_signature(&self, other: &Operation) -> bool {
        self.name == other.name
            && self.return_type == other.return_type
            && self.equal_parameter_types(other)
    }

    #[must_use]
    pub fn equal_parameter_types(&self, other: &Operation) -> bool {
        self.parameters.len() == other.parameters.len()
            && self
                .parameters
                .iter()
                .zip(&other.parameters)
                .all(|(a, b)| a.type_name == b.type_name && a.varargs == b.varargs)
    }

    #[must_use]
    pub fn has_test_annotation(&self) -> bool {
        self.annotations.iter().any(|a| a == "Test" || a.ends_with(".Test"))
    }

    /// Every invocation in the body, document order.
    #[must_use]
    pub fn all_invocations(&self) -> Vec<&Invocation> {
        self.body.as_ref().map(Body::all_invocations).unwrap_or_default()
    }

    /// Normalized texts of all countable fragments, used for the
    /// identical-body overload check.
    #[must_use]
    pub fn body_text(&self) -> Vec<String> {
        self.body
            .as_ref()
            .map(|b| {
                b.ids()
                    .map(|id| b.fragment(id))
                    .filter(|f| f.countable())
                    .map(|f| f.text.clone())
                    .collect()
            })
            .unwrap_or_default()
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Attribute {
    pub name: String,
    pub type_name: String,
    pub class_name: String,
    pub visibility: Visibility,
    pub is_static: bool,
    pub is_final: bool,
    pub annotations: Vec<String>,
    pub location: CodeRange,
}

impl Attribute {
    #[must_use]
    pub fn new(
        class_name: impl Into<String>,
        name: impl Into<String>,
        type_name: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            type_name: type_name.into(),
            class_name: class_name.into(),
            visibility: Visibility::Private,
            is_static: false,
            is_final: false,
            annotations: Vec::new(),
            location: CodeRange::line("<unknown>", 0),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ClassKind {
    Class,
    Interface,
    Enum,
}

#[derive(Debug, Clone, Serialize)]
pub struct UmlClass {
    pub name: String,
    pub package: String,
    pub kind: ClassKind,
    pub is_abstract: bool,
    pub superclass: Option<String>,
    pub interfaces: Vec<String>,
    pub annotations: Vec<String>,
    pub attributes: Vec<Attribute>,
    pub operations: Vec<Operation>,
    pub location: CodeRange,
}

impl UmlClass {
    #[must_use]
    pub fn new(package: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            package: package.into(),
            kind: ClassKind::Class,
            is_abstract: false,
            superclass: None,
            interfaces: Vec::new(),
            annotations: Vec::new(),
            attributes: Vec::new(),
            operations: Vec::new(),
            location: CodeRange::line("<unknown>", 0),
        }
    }

    #[must_use]
    pub fn qualified_name(&self) -> String {
        if self.package.is_empty() {
            self.name.clone()
        } else {
            format!("{}.{}", self.package, self.name)
        }
    }

    pub fn add_operation(&mut self, operation: Operation) {
        self.operations.push(operation);
    }

    pub fn add_attribute(&mut self, attribute: Attribute) {
        self.attributes.push(attribute);
    }

    /// Signatures of all declared operations, used for class matching.
    #[must_use]
    pub fn operation_signatures(&self) -> Vec<String> {
        self.operations.iter().map(Operation::signature_string).collect()
    }
}

/// One snapshot of the compared codebase.
#[derive(Debug, Clone, Default, Serialize)]
pub struct UmlModel {
    pub classes: Vec<UmlClass>,
}

impl UmlModel {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_class(&mut self, class: UmlClass) {
        self.classes.push(class);
    }

    #[must_use]
    pub fn class_by_qualified_name(&self, qualified: &str) -> Option<&UmlClass> {
        self.classes.iter().find(|c| c.qualified_name() == qualified)
    }
}
