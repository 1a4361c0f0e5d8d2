// src/detection/inline.rs
//! Inline-method detection, the mirror image of extract detection: an
//! unmatched removed operation whose body reappears inside a matched
//! operation's after side was inlined, possibly through delegates.

use crate::deadline::Deadline;
use crate::detection::call_tree::CallTree;
use crate::detection::extract::parameter_bindings;
use crate::diff::thresholds::Thresholds;
use crate::error::Result;
use crate::mapping::BodyMapper;
use crate::model::{Invocation, Operation};

#[derive(Debug)]
pub struct AcceptedInline<'m> {
    pub operation: &'m Operation,
    pub call_sites: Vec<Invocation>,
    pub mapper_index: usize,
    pub nested: bool,
}

pub struct InlineDetection<'a, 'm> {
    removed_operations: &'a [&'m Operation],
    thresholds: &'a Thresholds,
    deadline: &'a Deadline,
}

impl<'a, 'm> InlineDetection<'a, 'm> {
    #[must_use]
    pub fn new(
        removed_operations: &'a [&'m Operation],
        thresholds: &'a Thresholds,
        deadline: &'a Deadline,
    ) -> Self {
        Self { removed_operations, thresholds, deadline }
    }

    /// Runs the pass once for (parent mapper, candidate removed op).
    pub fn check(
        &self,
        parent: &mut BodyMapper<'m>,
        candidate: &'m Operation,
    ) -> Result<Vec<AcceptedInline<'m>>> {
        let mut accepted = Vec::new();
        if candidate.body.is_none() {
            return Ok(accepted);
        }
        // the call being removed must have been somewhere in the before side
        let invocations = parent.leftover_invocations_t1();
        let matching: Vec<Invocation> = invocations
            .iter()
            .filter(|i| i.matches_operation(candidate))
            .cloned()
            .collect();
        if matching.is_empty() {
            return Ok(accepted);
        }
        for invocation in &matching {
            self.deadline.check()?;
            if self.process_invocation(parent, candidate, invocation, &matching, &mut accepted)? {
                break;
            }
        }
        Ok(accepted)
    }

    fn process_invocation(
        &self,
        parent: &mut BodyMapper<'m>,
        candidate: &'m Operation,
        invocation: &Invocation,
        call_sites: &[Invocation],
        accepted: &mut Vec<AcceptedInline<'m>>,
    ) -> Result<bool> {
        let tree = CallTree::build(
            parent.container1(),
            candidate,
            invocation,
            self.removed_operations,
            self.deadline,
        )?;
        let Some(bindings) = parameter_bindings(candidate, invocation, parent.container1())
        else {
            return Ok(false);
        };
        let child =
            BodyMapper::for_inlined(parent, candidate, invocation, bindings, false, self.deadline)?;

        let mut nested_accepted: Vec<(BodyMapper<'m>, &'m Operation, Invocation)> = Vec::new();
        for node in tree.nodes_in_breadth_first_order().into_iter().skip(1) {
            self.deadline.check()?;
            let Some(nested_bindings) =
                parameter_bindings(node.callee, &node.invocation, node.caller)
            else {
                continue;
            };
            let nested_mapper = BodyMapper::for_inlined(
                parent,
                node.callee,
                &node.invocation,
                nested_bindings,
                true,
                self.deadline,
            )?;
            if self.inline_match_condition(&nested_mapper, parent) {
                nested_accepted.push((nested_mapper, node.callee, node.invocation.clone()));
            } else {
                return_fragments_to_parent_t2(parent, &nested_mapper);
            }
        }

        if self.inline_match_condition(&child, parent) {
            for (nested_mapper, callee, site) in nested_accepted {
                parent.add_child_mapper(nested_mapper);
                accepted.push(AcceptedInline {
                    operation: callee,
                    call_sites: vec![site],
                    mapper_index: parent.child_mappers().len() - 1,
                    nested: true,
                });
            }
            parent.add_child_mapper(child);
            accepted.push(AcceptedInline {
                operation: candidate,
                call_sites: call_sites.to_vec(),
                mapper_index: parent.child_mappers().len() - 1,
                nested: false,
            });
            Ok(true)
        } else {
            return_fragments_to_parent_t2(parent, &child);
            for (nested_mapper, _, _) in nested_accepted {
                return_fragments_to_parent_t2(parent, &nested_mapper);
            }
            Ok(false)
        }
    }

    /// The inline acceptance predicate. Pure over the mapper state.
    #[must_use]
    pub fn inline_match_condition(
        &self,
        mapper: &BodyMapper<'_>,
        parent: &BodyMapper<'_>,
    ) -> bool {
        inline_match_condition(mapper, parent, self.thresholds)
    }
}

#[must_use]
pub fn inline_match_condition(
    mapper: &BodyMapper<'_>,
    parent: &BodyMapper<'_>,
    thresholds: &Thresholds,
) -> bool {
    // a body that is nothing but `return x;` inlines trivially everywhere;
    // treating it as an inline would flood the results
    if let Some(body1) = mapper.body1() {
        let leaves = body1.leaves();
        if body1.countable_statements() == 1 && leaves.len() == 1 {
            let fragment = body1.fragment(leaves[0]);
            if fragment.variables.len() == 1
                && fragment.text == format!("return {};", fragment.variables[0])
            {
                return false;
            }
        }
    }

    let mappings = mapper.mappings_without_blocks();
    if mappings == 0 {
        return false;
    }

    // statements that merely delegate back to the inlined operation are
    // not unexplained residue
    let mut delegate_statements = 0usize;
    if let Some(body1) = mapper.body1() {
        for id in mapper.non_mapped_leaves_t1() {
            if let Some(invocation) = body1.fragment(*id).invocation_covering_entire_fragment() {
                if invocation.matches_operation(parent.container1())
                    || invocation.matches_operation(mapper.container1())
                {
                    delegate_statements += 1;
                }
            }
        }
    }

    let non_mapped_t1 = mapper.non_mapped_elements_t1().saturating_sub(delegate_statements);
    let exact_list = mapper.exact_matches();
    let exact = exact_list.len();
    let single_throws_new = exact == 1
        && exact_list[0].text1.starts_with("throw new ")
        && exact_list[0].text2.starts_with("throw new ");

    mappings > non_mapped_t1
        || (exact == 1
            && !single_throws_new
            && non_mapped_t1.saturating_sub(exact) < thresholds.single_exact_match_unmapped_limit)
        || (exact > 1
            && non_mapped_t1.saturating_sub(exact) < thresholds.multi_exact_match_unmapped_limit)
}

fn return_fragments_to_parent_t2<'m>(parent: &mut BodyMapper<'m>, rejected: &BodyMapper<'m>) {
    for mapping in rejected.mappings() {
        parent.push_back_t2(mapping.fragment2);
    }
}
