// tests/unit_signature.rs
use pretty_assertions::assert_eq;
use refsift_core::diff::signature::signature_refactorings;
use refsift_core::model::{Operation, Parameter, Visibility};
use refsift_core::refactoring::{Evidence, Refactoring};

fn op(name: &str, params: &[(&str, &str)]) -> Operation {
    Operation::new("A", name)
        .with_parameters(params.iter().map(|(n, t)| Parameter::new(*n, *t)).collect())
}

fn kinds(refactorings: &[Refactoring]) -> Vec<&'static str> {
    refactorings.iter().map(Refactoring::kind).collect()
}

#[test]
fn added_parameter() {
    let before = op("run", &[("x", "int")]);
    let after = op("run", &[("x", "int"), ("limit", "long")]);
    let out = signature_refactorings(&before, &after, &Evidence::default());
    assert_eq!(kinds(&out), vec!["Add Parameter"]);
    let Refactoring::AddParameter { parameter, .. } = &out[0] else { panic!() };
    assert_eq!(parameter, "limit : long");
}

#[test]
fn removed_parameter() {
    let before = op("run", &[("x", "int"), ("limit", "long")]);
    let after = op("run", &[("x", "int")]);
    let out = signature_refactorings(&before, &after, &Evidence::default());
    assert_eq!(kinds(&out), vec!["Remove Parameter"]);
}

#[test]
fn positional_rename_is_not_an_add_remove_pair() {
    // the body mapper reports the rename; the signature diff stays silent
    let before = op("run", &[("x", "int")]);
    let after = op("run", &[("y", "int")]);
    let out = signature_refactorings(&before, &after, &Evidence::default());
    assert!(out.is_empty());
}

#[test]
fn changed_parameter_type() {
    let before = op("run", &[("items", "List")]);
    let after = op("run", &[("items", "Collection")]);
    let out = signature_refactorings(&before, &after, &Evidence::default());
    assert_eq!(kinds(&out), vec!["Change Parameter Type"]);
}

#[test]
fn reordered_parameters() {
    let before = op("run", &[("x", "int"), ("name", "String")]);
    let after = op("run", &[("name", "String"), ("x", "int")]);
    let out = signature_refactorings(&before, &after, &Evidence::default());
    assert_eq!(kinds(&out), vec!["Reorder Parameters"]);
}

#[test]
fn changed_return_type() {
    let before = op("run", &[]).with_return_type("int");
    let after = op("run", &[]).with_return_type("long");
    let out = signature_refactorings(&before, &after, &Evidence::default());
    assert_eq!(kinds(&out), vec!["Change Return Type"]);
}

#[test]
fn annotation_add_and_remove() {
    let before = op("run", &[]).with_annotations(vec!["Deprecated".to_owned()]);
    let after = op("run", &[]).with_annotations(vec!["Override".to_owned()]);
    let out = signature_refactorings(&before, &after, &Evidence::default());
    assert_eq!(kinds(&out), vec!["Add Method Annotation", "Remove Method Annotation"]);
}

#[test]
fn visibility_change() {
    let before = op("run", &[]);
    let after = op("run", &[]).with_visibility(Visibility::Private);
    let out = signature_refactorings(&before, &after, &Evidence::default());
    assert_eq!(kinds(&out), vec!["Change Method Access Modifier"]);
    let Refactoring::ChangeOperationVisibility { before, after, .. } = &out[0] else { panic!() };
    assert_eq!(before, "public");
    assert_eq!(after, "private");
}

#[test]
fn modifier_changes() {
    let mut before = op("run", &[]);
    before.is_static = true;
    let mut after = op("run", &[]);
    after.is_final = true;
    let out = signature_refactorings(&before, &after, &Evidence::default());
    assert_eq!(kinds(&out), vec!["Remove Method Modifier", "Add Method Modifier"]);
}
