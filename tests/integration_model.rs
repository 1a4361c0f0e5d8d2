// tests/integration_model.rs
mod common;

use common::{class, model, operation, operation_with_params};
use refsift_core::diff::{DiffOptions, ModelDiff};
use refsift_core::refactoring::Refactoring;
use std::time::Duration;

#[test]
fn moved_class_is_detected() {
    let before = model(vec![class(
        "app.io",
        "Util",
        vec![operation("app.io.Util", "help", &["print(usage);"])],
    )]);
    let after = model(vec![class(
        "app.core",
        "Util",
        vec![operation("app.core.Util", "help", &["print(usage);"])],
    )]);

    let diff = ModelDiff::compare(&before, &after, &DiffOptions::default()).unwrap();
    assert_eq!(diff.refactorings().len(), 1);
    let Refactoring::MoveClass { before, after, .. } = &diff.refactorings()[0] else {
        panic!("expected Move Class, got {:?}", diff.refactorings());
    };
    assert_eq!(before, "app.io.Util");
    assert_eq!(after, "app.core.Util");
    assert!(diff.removed_classes().is_empty());
    assert!(diff.added_classes().is_empty());
}

#[test]
fn renamed_class_is_detected_by_member_overlap() {
    let before = model(vec![class(
        "app",
        "Util",
        vec![
            operation("app.Util", "help", &["print(usage);"]),
            operation("app.Util", "version", &["return v;"]),
        ],
    )]);
    let after = model(vec![class(
        "app",
        "Helper",
        vec![
            operation("app.Helper", "help", &["print(usage);"]),
            operation("app.Helper", "version", &["return v;"]),
        ],
    )]);

    let diff = ModelDiff::compare(&before, &after, &DiffOptions::default()).unwrap();
    let kinds: Vec<&str> = diff.refactorings().iter().map(Refactoring::kind).collect();
    assert_eq!(kinds, vec!["Rename Class"]);
}

#[test]
fn whole_package_move_collapses_into_a_package_rename() {
    let before = model(vec![
        class("app.old", "First", vec![operation("app.old.First", "a", &["x();"])]),
        class("app.old", "Second", vec![operation("app.old.Second", "b", &["y();"])]),
    ]);
    let after = model(vec![
        class("app.new", "First", vec![operation("app.new.First", "a", &["x();"])]),
        class("app.new", "Second", vec![operation("app.new.Second", "b", &["y();"])]),
    ]);

    let diff = ModelDiff::compare(&before, &after, &DiffOptions::default()).unwrap();
    let kinds: Vec<&str> = diff.refactorings().iter().map(Refactoring::kind).collect();
    assert_eq!(kinds, vec!["Rename Package"]);
    let Refactoring::RenamePackage { before, after, .. } = &diff.refactorings()[0] else {
        panic!();
    };
    assert_eq!(before, "app.old");
    assert_eq!(after, "app.new");
}

#[test]
fn extracted_interface_is_detected() {
    let before = model(vec![class(
        "app",
        "Repo",
        vec![operation_with_params("app.Repo", "save", &[("item", "Item")], &["store(item);"])],
    )]);
    let mut storage = class("app", "Storage", Vec::new());
    storage.kind = refsift_core::model::ClassKind::Interface;
    storage.add_operation(
        refsift_core::model::Operation::new("app.Storage", "save")
            .with_parameters(vec![refsift_core::model::Parameter::new("item", "Item")])
            .abstract_operation(),
    );
    let mut repo_after = class(
        "app",
        "Repo",
        vec![operation_with_params("app.Repo", "save", &[("item", "Item")], &["store(item);"])],
    );
    repo_after.interfaces.push("app.Storage".to_owned());
    let after = model(vec![repo_after, storage]);

    let diff = ModelDiff::compare(&before, &after, &DiffOptions::default()).unwrap();
    let extract = diff.refactorings().iter().find_map(|r| match r {
        Refactoring::ExtractInterface { extracted, subclasses, .. } => {
            Some((extracted.clone(), subclasses.clone()))
        }
        _ => None,
    });
    let (extracted, subclasses) = extract.expect("expected Extract Interface");
    assert_eq!(extracted, "app.Storage");
    assert_eq!(subclasses, vec!["app.Repo".to_owned()]);
}

#[test]
fn class_pair_over_budget_is_skipped_not_fatal() {
    let before = model(vec![class(
        "app",
        "Busy",
        vec![operation("app.Busy", "work", &["a();", "b();", "c();", "d();"])],
    )]);
    let after = model(vec![class(
        "app",
        "Busy",
        vec![operation("app.Busy", "work", &["a();", "b();", "c();", "e();"])],
    )]);

    let options = DiffOptions { time_budget: Some(Duration::ZERO), ..Default::default() };
    let diff = ModelDiff::compare(&before, &after, &options).unwrap();
    assert!(diff.refactorings().is_empty());
    assert_eq!(diff.timed_out_classes(), ["app.Busy".to_owned()]);
}

#[test]
fn results_are_deterministic_across_runs() {
    let build = || {
        let before = model(vec![class(
            "app",
            "Service",
            vec![operation_with_params(
                "app.Service",
                "run",
                &[("y", "int")],
                &["a();", "int x = compute(y);", "save(x, y);", "c();"],
            )],
        )]);
        let after = model(vec![class(
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
        )]);
        (before, after)
    };

    let (before1, after1) = build();
    let (before2, after2) = build();
    let first = ModelDiff::compare(&before1, &after1, &DiffOptions::default()).unwrap();
    let second = ModelDiff::compare(&before2, &after2, &DiffOptions::default()).unwrap();
    let render = |d: &ModelDiff| serde_json::to_string(d.refactorings()).unwrap();
    assert_eq!(render(&first), render(&second));
    assert!(!first.refactorings().is_empty());
}
