// tests/unit_resolver.rs
mod common;

use common::operation;
use refsift_core::deadline::Deadline;
use refsift_core::detection::resolve::resolve_duplicates;
use refsift_core::mapping::BodyMapper;

#[test]
fn competing_claims_leave_exactly_one_winner() {
    let source = operation("A", "source", &["a();"]);
    let target1 = operation("A", "target1", &["a();"]);
    let target2 = operation("A", "target2", &["a();"]);
    // both mappers claim the same before-side fragment of `source`
    let mut mappers = vec![
        BodyMapper::new(&source, &target1, &Deadline::unlimited()).unwrap(),
        BodyMapper::new(&source, &target2, &Deadline::unlimited()).unwrap(),
    ];
    assert_eq!(mappers[0].mappings().len(), 2); // leaf + root block
    assert_eq!(mappers[1].mappings().len(), 2);

    let evicted = resolve_duplicates(&mut mappers);
    assert_eq!(evicted.len(), 2);
    // snapshots describe the loser's mappings
    assert!(evicted.iter().any(|m| m.text_before == "a();"));
    // equal priorities resolve by discovery order: the first mapper wins
    assert_eq!(mappers[0].mappings().len(), 2);
    assert!(mappers[1].mappings().is_empty());
}

#[test]
fn evicted_fragments_return_to_leftover_pools() {
    let source = operation("A", "source", &["a();"]);
    let target1 = operation("A", "target1", &["a();"]);
    let target2 = operation("A", "target2", &["a();"]);
    let mut mappers = vec![
        BodyMapper::new(&source, &target1, &Deadline::unlimited()).unwrap(),
        BodyMapper::new(&source, &target2, &Deadline::unlimited()).unwrap(),
    ];
    resolve_duplicates(&mut mappers);
    // the loser's accounting identity still holds after eviction
    assert_eq!(mappers[1].non_mapped_elements_t1(), 1);
    assert_eq!(mappers[1].non_mapped_elements_t2(), 1);
}

#[test]
fn disjoint_mappers_are_untouched() {
    let op1 = operation("A", "first", &["a();"]);
    let op2 = operation("A", "first", &["a();"]);
    let op3 = operation("A", "second", &["b();"]);
    let op4 = operation("A", "second", &["b();"]);
    let mut mappers = vec![
        BodyMapper::new(&op1, &op2, &Deadline::unlimited()).unwrap(),
        BodyMapper::new(&op3, &op4, &Deadline::unlimited()).unwrap(),
    ];
    assert!(resolve_duplicates(&mut mappers).is_empty());
    assert_eq!(mappers[0].mappings().len(), 2);
    assert_eq!(mappers[1].mappings().len(), 2);
}

#[test]
fn resolution_is_idempotent() {
    let source = operation("A", "source", &["a();"]);
    let target1 = operation("A", "target1", &["a();"]);
    let target2 = operation("A", "target2", &["a();"]);
    let mut mappers = vec![
        BodyMapper::new(&source, &target1, &Deadline::unlimited()).unwrap(),
        BodyMapper::new(&source, &target2, &Deadline::unlimited()).unwrap(),
    ];
    resolve_duplicates(&mut mappers);
    assert!(resolve_duplicates(&mut mappers).is_empty());
}
