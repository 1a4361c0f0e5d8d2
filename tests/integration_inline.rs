// tests/integration_inline.rs
mod common;

use common::{class, operation_with_params};
use refsift_core::deadline::Deadline;
use refsift_core::diff::{ClassDiff, Thresholds};
use refsift_core::refactoring::Refactoring;

#[test]
fn inlined_helper_is_detected() {
    let before = class(
        "app",
        "Service",
        vec![
            operation_with_params(
                "app.Service",
                "run",
                &[("y", "int")],
                &["a();", "helper(y);", "c();"],
            ),
            operation_with_params(
                "app.Service",
                "helper",
                &[("y", "int")],
                &["int x = compute(y);", "save(x, y);"],
            ),
        ],
    );
    let after = class(
        "app",
        "Service",
        vec![operation_with_params(
            "app.Service",
            "run",
            &[("y", "int")],
            &["a();", "int x = compute(y);", "save(x, y);", "c();"],
        )],
    );

    let diff =
        ClassDiff::compare(&before, &after, &Thresholds::default(), &Deadline::unlimited())
            .unwrap();

    assert_eq!(diff.refactorings().len(), 1);
    let Refactoring::InlineOperation { inlined, target, nested, evidence } =
        &diff.refactorings()[0]
    else {
        panic!("expected Inline Method, got {:?}", diff.refactorings());
    };
    assert_eq!(inlined, "helper(int) : void");
    assert_eq!(target, "run(int) : void");
    assert!(!nested);
    assert_eq!(evidence.class_after, "app.Service");
    assert_eq!(evidence.mappings.len(), 2);
    assert!(evidence.mappings.iter().all(|m| m.exact));

    // the helper has been explained; nothing is left unmatched
    assert!(diff.removed_operations().is_empty());
    assert!(diff.added_operations().is_empty());
}

#[test]
fn uninvoked_removed_operation_is_not_an_inline() {
    let before = class(
        "app",
        "Service",
        vec![
            operation_with_params("app.Service", "run", &[], &["a();", "b();"]),
            operation_with_params("app.Service", "report", &[], &["int n = count();", "print(n);"]),
        ],
    );
    let after = class(
        "app",
        "Service",
        vec![operation_with_params("app.Service", "run", &[], &["a();", "b();"])],
    );

    let diff =
        ClassDiff::compare(&before, &after, &Thresholds::default(), &Deadline::unlimited())
            .unwrap();

    assert!(diff.refactorings().is_empty());
    assert_eq!(diff.removed_operations().len(), 1);
    assert_eq!(diff.removed_operations()[0].name, "report");
}

#[test]
fn trivial_return_body_is_not_inlined() {
    // `return x;` maps into almost any call site; reporting it would flood
    // the results
    let before = class(
        "app",
        "Service",
        vec![
            operation_with_params(
                "app.Service",
                "run",
                &[("x", "int")],
                &["int v = get(x);", "emit(v);"],
            ),
            operation_with_params("app.Service", "get", &[("x", "int")], &["return x;"]),
        ],
    );
    let after = class(
        "app",
        "Service",
        vec![operation_with_params(
            "app.Service",
            "run",
            &[("x", "int")],
            &["int v = x;", "emit(v);"],
        )],
    );

    let diff =
        ClassDiff::compare(&before, &after, &Thresholds::default(), &Deadline::unlimited())
            .unwrap();

    assert!(!diff
        .refactorings()
        .iter()
        .any(|r| matches!(r, Refactoring::InlineOperation { .. })));
    assert_eq!(diff.removed_operations().len(), 1);
}
