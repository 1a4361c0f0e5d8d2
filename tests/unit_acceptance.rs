// tests/unit_acceptance.rs
mod common;

use common::operation_with_params;
use refsift_core::deadline::Deadline;
use refsift_core::detection::extract::{extract_match_condition, ExtractDetection};
use refsift_core::detection::inline::{inline_match_condition, InlineDetection};
use refsift_core::diff::Thresholds;
use refsift_core::mapping::BodyMapper;

// The acceptance predicates are pure over the mapper state: re-evaluating
// them against an already-accepted child mapper changes neither the
// decision nor the mapper.

#[test]
fn accepted_extract_decision_is_stable_on_reevaluation() {
    let run_before = operation_with_params(
        "app.Service",
        "run",
        &[("y", "int")],
        &["a();", "int x = compute(y);", "save(x, y);", "c();"],
    );
    let run_after = operation_with_params(
        "app.Service",
        "run",
        &[("y", "int")],
        &["a();", "helper(y);", "c();"],
    );
    let helper = operation_with_params(
        "app.Service",
        "helper",
        &[("y", "int")],
        &["int x = compute(y);", "save(x, y);"],
    );

    let deadline = Deadline::unlimited();
    let thresholds = Thresholds::default();
    let mut parent = BodyMapper::new(&run_before, &run_after, &deadline).unwrap();
    let candidates = [&helper];
    let detection = ExtractDetection::new(&candidates, &thresholds, &deadline);
    let accepted = detection.check(&mut parent, &helper).unwrap();
    assert_eq!(accepted.len(), 1);

    let child = &parent.child_mappers()[accepted[0].mapper_index];
    let mappings_before = child.mappings().len();
    assert!(extract_match_condition(child, 0, &thresholds));
    assert!(extract_match_condition(child, 0, &thresholds));
    assert_eq!(child.mappings().len(), mappings_before);
}

#[test]
fn accepted_inline_decision_is_stable_on_reevaluation() {
    let run_before = operation_with_params(
        "app.Service",
        "run",
        &[("y", "int")],
        &["a();", "helper(y);", "c();"],
    );
    let helper = operation_with_params(
        "app.Service",
        "helper",
        &[("y", "int")],
        &["int x = compute(y);", "save(x, y);"],
    );
    let run_after = operation_with_params(
        "app.Service",
        "run",
        &[("y", "int")],
        &["a();", "int x = compute(y);", "save(x, y);", "c();"],
    );

    let deadline = Deadline::unlimited();
    let thresholds = Thresholds::default();
    let mut parent = BodyMapper::new(&run_before, &run_after, &deadline).unwrap();
    let removed = [&helper];
    let detection = InlineDetection::new(&removed, &thresholds, &deadline);
    let accepted = detection.check(&mut parent, &helper).unwrap();
    assert_eq!(accepted.len(), 1);

    let child = &parent.child_mappers()[accepted[0].mapper_index];
    let mappings_before = child.mappings().len();
    assert!(inline_match_condition(child, &parent, &thresholds));
    assert!(inline_match_condition(child, &parent, &thresholds));
    assert_eq!(child.mappings().len(), mappings_before);
}
