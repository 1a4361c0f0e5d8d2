// tests/integration_merge.rs
mod common;

use common::{class, operation};
use refsift_core::deadline::Deadline;
use refsift_core::diff::{ClassDiff, Thresholds};
use refsift_core::refactoring::Refactoring;

#[test]
fn two_operations_merged_into_one() {
    let before = class(
        "app",
        "Loader",
        vec![
            operation("app.Loader", "load", &["open();", "read();"]),
            operation("app.Loader", "parse", &["tokenize();", "emit();"]),
        ],
    );
    let after = class(
        "app",
        "Loader",
        vec![operation(
            "app.Loader",
            "process",
            &["open();", "read();", "tokenize();", "emit();"],
        )],
    );

    let diff =
        ClassDiff::compare(&before, &after, &Thresholds::default(), &Deadline::unlimited())
            .unwrap();

    assert_eq!(diff.refactorings().len(), 1);
    let Refactoring::MergeOperation { merged, target, evidence } = &diff.refactorings()[0]
    else {
        panic!("expected Merge Method, got {:?}", diff.refactorings());
    };
    assert_eq!(merged.len(), 2);
    assert!(merged.contains(&"load() : void".to_owned()));
    assert!(merged.contains(&"parse() : void".to_owned()));
    assert_eq!(target, "process() : void");
    assert!(!evidence.mappings.is_empty());

    assert!(diff.removed_operations().is_empty());
    assert!(diff.added_operations().is_empty());
}

#[test]
fn one_operation_split_into_two() {
    let before = class(
        "app",
        "Loader",
        vec![operation(
            "app.Loader",
            "process",
            &["open();", "read();", "tokenize();", "emit();"],
        )],
    );
    let after = class(
        "app",
        "Loader",
        vec![
            operation("app.Loader", "load", &["open();", "read();"]),
            operation("app.Loader", "parse", &["tokenize();", "emit();"]),
        ],
    );

    let diff =
        ClassDiff::compare(&before, &after, &Thresholds::default(), &Deadline::unlimited())
            .unwrap();

    assert_eq!(diff.refactorings().len(), 1);
    let Refactoring::SplitOperation { source, split, .. } = &diff.refactorings()[0] else {
        panic!("expected Split Method, got {:?}", diff.refactorings());
    };
    assert_eq!(source, "process() : void");
    assert_eq!(split.len(), 2);
    assert!(diff.removed_operations().is_empty());
    assert!(diff.added_operations().is_empty());
}
