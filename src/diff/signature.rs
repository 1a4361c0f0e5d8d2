// src/diff/signature.rs
//! Operation-signature diff for a matched pair: parameters, return type,
//! annotations and modifiers. Body-level evidence is attached by the
//! caller; this module only compares declarations.

use crate::model::{Operation, Parameter, Visibility};
use crate::refactoring::{Evidence, Refactoring};

fn visibility_name(visibility: Visibility) -> &'static str {
    match visibility {
        Visibility::Public => "public",
        Visibility::Protected => "protected",
        Visibility::Private => "private",
        Visibility::PackagePrivate => "package",
    }
}

/// Refactorings implied by the declaration difference between a matched
/// operation pair. Rename is the caller's concern (it needs body
/// evidence); everything else is decided here.
#[must_use]
pub fn signature_refactorings(
    operation1: &Operation,
    operation2: &Operation,
    evidence: &Evidence,
) -> Vec<Refactoring> {
    let mut out = Vec::new();
    let signature = operation2.signature_string();

    parameter_refactorings(operation1, operation2, evidence, &signature, &mut out);

    if operation1.return_type != operation2.return_type {
        out.push(Refactoring::ChangeReturnType {
            operation: signature.clone(),
            before: operation1.return_type.clone(),
            after: operation2.return_type.clone(),
            evidence: evidence.clone(),
        });
    }

    for annotation in &operation2.annotations {
        if !operation1.annotations.contains(annotation) {
            out.push(Refactoring::AddMethodAnnotation {
                operation: signature.clone(),
                annotation: annotation.clone(),
                evidence: evidence.clone(),
            });
        }
    }
    for annotation in &operation1.annotations {
        if !operation2.annotations.contains(annotation) {
            out.push(Refactoring::RemoveMethodAnnotation {
                operation: signature.clone(),
                annotation: annotation.clone(),
                evidence: evidence.clone(),
            });
        }
    }

    if operation1.visibility != operation2.visibility {
        out.push(Refactoring::ChangeOperationVisibility {
            operation: signature.clone(),
            before: visibility_name(operation1.visibility).to_owned(),
            after: visibility_name(operation2.visibility).to_owned(),
            evidence: evidence.clone(),
        });
    }
    for (before, after, modifier) in [
        (operation1.is_abstract, operation2.is_abstract, "abstract"),
        (operation1.is_static, operation2.is_static, "static"),
        (operation1.is_final, operation2.is_final, "final"),
    ] {
        if !before && after {
            out.push(Refactoring::AddMethodModifier {
                operation: signature.clone(),
                modifier: modifier.to_owned(),
                evidence: evidence.clone(),
            });
        } else if before && !after {
            out.push(Refactoring::RemoveMethodModifier {
                operation: signature.clone(),
                modifier: modifier.to_owned(),
                evidence: evidence.clone(),
            });
        }
    }
    out
}

fn parameter_refactorings(
    operation1: &Operation,
    operation2: &Operation,
    evidence: &Evidence,
    signature: &str,
    out: &mut Vec<Refactoring>,
) {
    let params1 = &operation1.parameters;
    let params2 = &operation2.parameters;

    // pure reorder: same parameters, different positions
    if params1.len() == params2.len()
        && params1.len() > 1
        && params1 != params2
        && params1.iter().all(|p| params2.contains(p))
    {
        out.push(Refactoring::ReorderParameters {
            operation: signature.to_owned(),
            evidence: evidence.clone(),
        });
        return;
    }

    let display = |p: &Parameter| format!("{} : {}", p.name, p.type_name);

    for parameter2 in params2 {
        let same_name = params1.iter().find(|p| p.name == parameter2.name);
        match same_name {
            None => {
                // a positional counterpart with equal type is a rename,
                // which body evidence reports; only count it as added when
                // no such counterpart exists
                let positional = params1
                    .get(params2.iter().position(|p| p == parameter2).unwrap_or(usize::MAX));
                if positional.is_none_or(|p| p.type_name != parameter2.type_name) {
                    out.push(Refactoring::AddParameter {
                        operation: signature.to_owned(),
                        parameter: display(parameter2),
                        evidence: evidence.clone(),
                    });
                }
            }
            Some(parameter1) if parameter1.type_name != parameter2.type_name => {
                out.push(Refactoring::ChangeParameterType {
                    operation: signature.to_owned(),
                    before: display(parameter1),
                    after: display(parameter2),
                    evidence: evidence.clone(),
                });
            }
            Some(_) => {}
        }
    }
    for parameter1 in params1 {
        let survives_by_name = params2.iter().any(|p| p.name == parameter1.name);
        let positional = params2
            .get(params1.iter().position(|p| p == parameter1).unwrap_or(usize::MAX));
        let survives_by_position =
            positional.is_some_and(|p| p.type_name == parameter1.type_name);
        if !survives_by_name && !survives_by_position {
            out.push(Refactoring::RemoveParameter {
                operation: signature.to_owned(),
                parameter: display(parameter1),
                evidence: evidence.clone(),
            });
        }
    }
}
