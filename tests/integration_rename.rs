// tests/integration_rename.rs
mod common;

use common::{class, operation_with_params};
use refsift_core::deadline::Deadline;
use refsift_core::diff::{ClassDiff, Thresholds};
use refsift_core::refactoring::Refactoring;

#[test]
fn renamed_operation_with_renamed_parameter() {
    let before = class(
        "app",
        "Calc",
        vec![operation_with_params(
            "app.Calc",
            "bar",
            &[("x", "int")],
            &["int total = x + 1;", "return total;"],
        )],
    );
    let after = class(
        "app",
        "Calc",
        vec![operation_with_params(
            "app.Calc",
            "baz",
            &[("y", "int")],
            &["int total = y + 1;", "return total;"],
        )],
    );

    let diff =
        ClassDiff::compare(&before, &after, &Thresholds::default(), &Deadline::unlimited())
            .unwrap();

    let kinds: Vec<&str> = diff.refactorings().iter().map(Refactoring::kind).collect();
    assert!(kinds.contains(&"Rename Method"), "got {kinds:?}");
    assert!(kinds.contains(&"Rename Parameter"), "got {kinds:?}");
    assert_eq!(diff.refactorings().len(), 2);

    let rename = diff
        .refactorings()
        .iter()
        .find_map(|r| match r {
            Refactoring::RenameOperation { before, after, .. } => Some((before, after)),
            _ => None,
        })
        .unwrap();
    assert_eq!(rename.0, "bar(int) : void");
    assert_eq!(rename.1, "baz(int) : void");

    let parameter = diff
        .refactorings()
        .iter()
        .find_map(|r| match r {
            Refactoring::RenameParameter { before, after, .. } => Some((before, after)),
            _ => None,
        })
        .unwrap();
    assert_eq!(parameter.0, "x");
    assert_eq!(parameter.1, "y");

    assert!(diff.removed_operations().is_empty());
    assert!(diff.added_operations().is_empty());
}

#[test]
fn renamed_call_is_not_reported_as_a_variable_rename() {
    let before = class(
        "app",
        "Calc",
        vec![operation_with_params("app.Calc", "run", &[("x", "int")], &["save(x);"])],
    );
    let after = class(
        "app",
        "Calc",
        vec![operation_with_params("app.Calc", "run", &[("x", "int")], &["helper(x);"])],
    );

    let diff =
        ClassDiff::compare(&before, &after, &Thresholds::default(), &Deadline::unlimited())
            .unwrap();

    // the call-name change is an invocation replacement inside the mapper,
    // not a refactoring of its own
    assert!(diff.refactorings().is_empty(), "got {:?}", diff.refactorings());
}

#[test]
fn dissimilar_names_with_dissimilar_bodies_do_not_pair() {
    let before = class(
        "app",
        "Calc",
        vec![operation_with_params("app.Calc", "parse", &[], &["tokenize(input);"])],
    );
    let after = class(
        "app",
        "Calc",
        vec![operation_with_params("app.Calc", "render", &[], &["int width = 80;"])],
    );

    let diff =
        ClassDiff::compare(&before, &after, &Thresholds::default(), &Deadline::unlimited())
            .unwrap();

    assert!(diff.refactorings().is_empty());
    assert_eq!(diff.removed_operations().len(), 1);
    assert_eq!(diff.added_operations().len(), 1);
}

#[test]
fn signature_change_rides_along_with_a_rename() {
    let before = class(
        "app",
        "Calc",
        vec![operation_with_params(
            "app.Calc",
            "total",
            &[("x", "int")],
            &["int sum = x + base;", "return sum;"],
        )],
    );
    let after = class(
        "app",
        "Calc",
        vec![operation_with_params(
            "app.Calc",
            "totalWith",
            &[("x", "int"), ("offset", "int")],
            &["int sum = x + base;", "return sum;"],
        )],
    );

    let diff =
        ClassDiff::compare(&before, &after, &Thresholds::default(), &Deadline::unlimited())
            .unwrap();

    let kinds: Vec<&str> = diff.refactorings().iter().map(Refactoring::kind).collect();
    assert!(kinds.contains(&"Rename Method"), "got {kinds:?}");
    assert!(kinds.contains(&"Add Parameter"), "got {kinds:?}");
}
