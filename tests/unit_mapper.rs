// tests/unit_mapper.rs
mod common;

use common::operation;
use refsift_core::deadline::Deadline;
use refsift_core::mapping::{BodyMapper, ReplacementKind};
use refsift_core::model::{BodyBuilder, FragmentKind, Operation};

fn mapper<'m>(op1: &'m Operation, op2: &'m Operation) -> BodyMapper<'m> {
    BodyMapper::new(op1, op2, &Deadline::unlimited()).unwrap()
}

#[test]
fn identical_bodies_map_exactly() {
    let op1 = operation("A", "run", &["a();", "b();", "c();"]);
    let op2 = operation("A", "run", &["a();", "b();", "c();"]);
    let m = mapper(&op1, &op2);
    assert_eq!(m.mappings_without_blocks(), 3);
    assert_eq!(m.exact_matches().len(), 3);
    assert_eq!(m.non_mapped_elements_t1(), 0);
    assert_eq!(m.non_mapped_elements_t2(), 0);
}

#[test]
fn accounting_identity_holds_on_both_sides() {
    // mapped + unmapped countables must equal the countable statements
    let op1 = operation("A", "run", &["a();", "b();", "x();", "c();"]);
    let op2 = operation("A", "run", &["a();", "c();"]);
    let m = mapper(&op1, &op2);
    let body1 = op1.body.as_ref().unwrap();
    let body2 = op2.body.as_ref().unwrap();
    assert_eq!(
        m.mappings_without_blocks() + m.non_mapped_elements_t1(),
        body1.countable_statements()
    );
    assert_eq!(
        m.mappings_without_blocks() + m.non_mapped_elements_t2(),
        body2.countable_statements()
    );
}

#[test]
fn each_fragment_mapped_at_most_once() {
    let op1 = operation("A", "run", &["x = 1;", "x = 1;", "y = 2;"]);
    let op2 = operation("A", "run", &["x = 1;", "y = 2;"]);
    let m = mapper(&op1, &op2);
    let mut seen1 = Vec::new();
    let mut seen2 = Vec::new();
    for mapping in m.mappings() {
        assert!(!seen1.contains(&mapping.fragment1));
        assert!(!seen2.contains(&mapping.fragment2));
        seen1.push(mapping.fragment1);
        seen2.push(mapping.fragment2);
    }
}

#[test]
fn duplicate_statements_pair_by_position() {
    let op1 = operation("A", "run", &["x = 1;", "x = 1;"]);
    let op2 = operation("A", "run", &["x = 1;", "x = 1;"]);
    let m = mapper(&op1, &op2);
    for mapping in m.mappings() {
        if !mapping.composite {
            assert_eq!(mapping.fragment1, mapping.fragment2);
        }
    }
}

#[test]
fn replacement_mapping_prefers_smaller_edit_distance() {
    let op1 = operation("A", "run", &["save(x);"]);
    let op2 = operation("A", "run", &["save(y);", "write(z);"]);
    let m = mapper(&op1, &op2);
    let leaf = m.mappings().iter().find(|m| !m.composite).unwrap();
    assert_eq!(leaf.text2, "save(y);");
    assert_eq!(leaf.replacements.len(), 1);
    assert_eq!(leaf.replacements[0].kind, ReplacementKind::VariableName);
}

#[test]
fn composite_nodes_match_by_kind_and_guard() {
    let build = || {
        let mut b = BodyBuilder::new("A.java", 1);
        b.open(FragmentKind::If, "if (x > 0)").leaf("log(x);").close().leaf("return x;");
        b.build()
    };
    let op1 = Operation::new("A", "run").with_body(build());
    let op2 = Operation::new("A", "run").with_body(build());
    let m = mapper(&op1, &op2);
    // root block + if header + two leaves
    assert_eq!(m.mappings().len(), 4);
    assert!(m.mappings().iter().any(|m| m.composite && m.text1.starts_with("if")));
}

#[test]
fn guard_difference_becomes_composite_replacement() {
    let build = |guard: &str| {
        let mut b = BodyBuilder::new("A.java", 1);
        b.open(FragmentKind::If, guard).leaf("log(x);").close();
        b.build()
    };
    let op1 = Operation::new("A", "run").with_body(build("if (x > 0)"));
    let op2 = Operation::new("A", "run").with_body(build("if (y > 0)"));
    let m = mapper(&op1, &op2);
    let header = m
        .mappings()
        .iter()
        .find(|m| m.composite && m.text1.starts_with("if"))
        .unwrap();
    assert_eq!(header.replacements.len(), 1);
    assert_eq!(header.replacements[0].kind, ReplacementKind::Composite);
}

#[test]
fn abstract_operations_yield_empty_mapper() {
    let op1 = Operation::new("A", "run").abstract_operation();
    let op2 = Operation::new("A", "run").abstract_operation();
    let m = mapper(&op1, &op2);
    assert!(m.mappings().is_empty());
    assert_eq!(m.non_mapped_elements_t1(), 0);
    assert_eq!(m.non_mapped_elements_t2(), 0);
}

#[test]
fn mapping_is_deterministic_across_runs() {
    let op1 = operation("A", "run", &["a();", "b(x);", "c();", "d();"]);
    let op2 = operation("A", "run", &["a();", "b(y);", "d();"]);
    let first = mapper(&op1, &op2);
    let second = mapper(&op1, &op2);
    let pairs = |m: &BodyMapper<'_>| {
        m.mappings().iter().map(|m| (m.fragment1, m.fragment2)).collect::<Vec<_>>()
    };
    assert_eq!(pairs(&first), pairs(&second));
}

#[test]
fn leftover_invocations_come_from_unmatched_and_inexact_fragments() {
    let op1 = operation("A", "run", &["a();", "save(x, y);"]);
    let op2 = operation("A", "run", &["a();", "helper(y);"]);
    let m = mapper(&op1, &op2);
    let names: Vec<String> =
        m.leftover_invocations_t2().iter().map(|i| i.name.clone()).collect();
    assert!(names.contains(&"helper".to_owned()));
    assert!(!names.contains(&"a".to_owned()));
}

#[test]
fn unrelated_bodies_leave_everything_unmapped() {
    let op1 = operation("A", "run", &["open(file);"]);
    let op2 = operation("A", "run", &["int limit = 3;"]);
    let m = mapper(&op1, &op2);
    assert_eq!(m.mappings_without_blocks(), 0);
    assert_eq!(m.non_mapped_elements_t1(), 1);
    assert_eq!(m.non_mapped_elements_t2(), 1);
}
