// src/detection/extract.rs
//! Extract-method detection. Decides whether an unmatched added operation
//! represents code relocated out of a matched operation, through possibly
//! several levels of delegation, by rooting a call tree at a leftover
//! invocation and mapping caller statements against the callee body.

use crate::deadline::Deadline;
use crate::detection::call_tree::CallTree;
use crate::error::Result;
use crate::mapping::mapper::ParameterBindings;
use crate::mapping::{BodyMapper, ReplacementKind};
use crate::model::{Invocation, Operation};
use crate::diff::thresholds::Thresholds;

/// An accepted extract hypothesis. The child mapper has been attached to
/// the parent; `mapper_index` points into the parent's child-mapper list.
#[derive(Debug)]
pub struct AcceptedExtract<'m> {
    pub operation: &'m Operation,
    pub call_sites: Vec<Invocation>,
    pub mapper_index: usize,
    pub nested: bool,
}

pub struct ExtractDetection<'a, 'm> {
    added_operations: &'a [&'m Operation],
    thresholds: &'a Thresholds,
    deadline: &'a Deadline,
}

impl<'a, 'm> ExtractDetection<'a, 'm> {
    #[must_use]
    pub fn new(
        added_operations: &'a [&'m Operation],
        thresholds: &'a Thresholds,
        deadline: &'a Deadline,
    ) -> Self {
        Self { added_operations, thresholds, deadline }
    }

    /// Runs the pass once for (parent mapper, candidate). A missing
    /// invocation or failed acceptance is a NoMatch, not an error.
    pub fn check(
        &self,
        parent: &mut BodyMapper<'m>,
        candidate: &'m Operation,
    ) -> Result<Vec<AcceptedExtract<'m>>> {
        let mut accepted = Vec::new();
        if candidate.body.is_none() {
            return Ok(accepted);
        }
        // nothing left to explain on the before side means nothing was
        // extracted out of this mapper
        let has_leftovers = !parent.non_mapped_leaves_t1().is_empty()
            || !parent.non_mapped_inner_t1().is_empty()
            || parent.has_replacements_involving_invocations();
        if !has_leftovers {
            return Ok(accepted);
        }
        let invocations = parent.leftover_invocations_t2();
        let matching: Vec<Invocation> = invocations
            .iter()
            .filter(|i| i.matches_operation(candidate))
            .cloned()
            .collect();
        if matching.is_empty() {
            return Ok(accepted);
        }
        let sorted = self.sort_by_argument_occurrences(parent, matching.clone());
        for invocation in &sorted {
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
        accepted: &mut Vec<AcceptedExtract<'m>>,
    ) -> Result<bool> {
        let tree = CallTree::build(
            parent.container1(),
            candidate,
            invocation,
            self.added_operations,
            self.deadline,
        )?;
        let Some(bindings) = parameter_bindings(candidate, invocation, parent.container1())
        else {
            return Ok(false);
        };
        let child =
            BodyMapper::for_extracted(parent, candidate, invocation, bindings, false, self.deadline)?;

        // nested delegation: map deeper call-tree nodes breadth-first
        let mut additional_exact = 0usize;
        let mut nested_accepted: Vec<(BodyMapper<'m>, &'m Operation, Invocation)> = Vec::new();
        for node in tree.nodes_in_breadth_first_order().into_iter().skip(1) {
            self.deadline.check()?;
            let Some(nested_bindings) =
                parameter_bindings(node.callee, &node.invocation, node.caller)
            else {
                continue;
            };
            let nested_mapper = BodyMapper::for_extracted(
                parent,
                node.callee,
                &node.invocation,
                nested_bindings,
                true,
                self.deadline,
            )?;
            if extract_match_condition(&nested_mapper, 0, self.thresholds) {
                additional_exact += nested_mapper.exact_matches().len();
                nested_accepted.push((nested_mapper, node.callee, node.invocation.clone()));
            } else {
                return_fragments_to_parent_t1(parent, &nested_mapper);
            }
        }

        if extract_match_condition(&child, additional_exact, self.thresholds) {
            for (nested_mapper, callee, site) in nested_accepted {
                parent.add_child_mapper(nested_mapper);
                accepted.push(AcceptedExtract {
                    operation: callee,
                    call_sites: vec![site],
                    mapper_index: parent.child_mappers().len() - 1,
                    nested: true,
                });
            }
            parent.add_child_mapper(child);
            accepted.push(AcceptedExtract {
                operation: candidate,
                call_sites: call_sites.to_vec(),
                mapper_index: parent.child_mappers().len() - 1,
                nested: false,
            });
            Ok(true)
        } else {
            return_fragments_to_parent_t1(parent, &child);
            for (nested_mapper, _, _) in nested_accepted {
                return_fragments_to_parent_t1(parent, &nested_mapper);
            }
            Ok(false)
        }
    }

    /// Call sites whose arguments occur most often in the unmatched
    /// before-side statements are tried first.
    fn sort_by_argument_occurrences(
        &self,
        parent: &BodyMapper<'m>,
        invocations: Vec<Invocation>,
    ) -> Vec<Invocation> {
        if invocations.len() <= 1 {
            return invocations;
        }
        let Some(body1) = parent.body1() else {
            return invocations;
        };
        let mut leftover_variables: Vec<&str> = Vec::new();
        for id in parent
            .non_mapped_leaves_t1()
            .iter()
            .chain(parent.non_mapped_inner_t1())
        {
            for variable in &body1.fragment(*id).variables {
                leftover_variables.push(variable);
            }
        }
        let mut scored: Vec<(usize, usize, Invocation)> = invocations
            .into_iter()
            .enumerate()
            .map(|(position, invocation)| {
                let occurrences = invocation
                    .arguments
                    .iter()
                    .map(|argument| {
                        let bare = argument.strip_prefix("this.").unwrap_or(argument);
                        leftover_variables.iter().filter(|v| **v == bare).count()
                    })
                    .sum();
                (occurrences, position, invocation)
            })
            .collect();
        scored.sort_by(|a, b| b.0.cmp(&a.0).then(a.1.cmp(&b.1)));
        scored.into_iter().map(|(_, _, invocation)| invocation).collect()
    }
}

/// Binds callee parameters to call-site arguments, positionally, with the
/// varargs tail left unbound. Returns `None` when an argument that names a
/// caller parameter disagrees with the callee parameter's type (a shape
/// mismatch, so the hypothesis is not even attempted).
#[must_use]
pub fn parameter_bindings(
    callee: &Operation,
    invocation: &Invocation,
    caller: &Operation,
) -> Option<ParameterBindings> {
    let mut bindings = Vec::new();
    let size = invocation.arguments.len().min(callee.parameters.len());
    for i in 0..size {
        let argument = &invocation.arguments[i];
        let parameter = &callee.parameters[i];
        if let Some(caller_parameter) = caller.parameters.iter().find(|p| p.name == *argument) {
            if caller_parameter.type_name != parameter.type_name {
                return None;
            }
        }
        bindings.push((parameter.name.clone(), argument.clone()));
    }
    Some(bindings)
}

/// The extract acceptance predicate: a precision/recall trade-off toward
/// explaining most of the diff. Pure over the mapper state, hence
/// idempotent for an already-accepted mapper.
#[must_use]
pub fn extract_match_condition(
    mapper: &BodyMapper<'_>,
    additional_exact_matches: usize,
    thresholds: &Thresholds,
) -> bool {
    let mappings = mapper.mappings_without_blocks();
    if mappings == 0 {
        return false;
    }
    let non_mapped_t1 = mapper.non_mapped_elements_t1();
    let mut non_mapped_t2 = mapper.non_mapped_elements_t2();

    let exact_list = mapper.exact_matches();
    let mut exception_handling_exact = false;
    let mut throws_new_exact = false;
    if exact_list.len() == 1 {
        let mapping = exact_list[0];
        if mapper.in_catch_context(mapping.fragment1) {
            exception_handling_exact = true;
        }
        if mapping.text1.starts_with("throw new ") && mapping.text2.starts_with("throw new ") {
            throws_new_exact = true;
        }
    }

    // a variable declared by a mapped statement whose value is simply
    // returned afterwards does not count as unexplained residue
    if let Some(body2) = mapper.body2() {
        for mapping in mapper.mappings() {
            let fragment2 = body2.fragment(mapping.fragment2);
            for declaration in &fragment2.declared_variables {
                let return_text = format!("return {};", declaration.name);
                let returned = mapper
                    .non_mapped_leaves_t2()
                    .iter()
                    .any(|id| body2.fragment(*id).text == return_text);
                if returned {
                    non_mapped_t2 = non_mapped_t2.saturating_sub(1);
                }
            }
        }
    }

    let mut exact = exact_list.len() + additional_exact_matches;
    if exact == 0 && (1..=2).contains(&mappings) {
        if let Some(first) = mapper.mappings().iter().find(|m| !m.composite) {
            if !first.replacements.is_empty()
                && first.replacements.iter().all(|r| r.one_side_contains_other())
            {
                exact += 1;
            }
        }
    }

    mappings > non_mapped_t2
        || (mappings > 1 && mappings >= non_mapped_t2)
        || (exact >= mappings && non_mapped_t1 == 0)
        || (exact == 1
            && !throws_new_exact
            && non_mapped_t2.saturating_sub(exact) <= thresholds.single_exact_match_unmapped_limit)
        || (!exception_handling_exact
            && exact > 1
            && additional_exact_matches <= exact
            && non_mapped_t2.saturating_sub(exact) < thresholds.multi_exact_match_unmapped_limit)
        || (mappings == 1 && mappings > mapper.non_mapped_leaf_elements_t2())
        || argument_extracted_with_default_return(mapper)
}

/// One mapping whose only replacement turns an argument into the return
/// expression, plus a guard and a default return, is the shape left behind
/// by extracting a guarded computation.
fn argument_extracted_with_default_return(mapper: &BodyMapper<'_>) -> bool {
    let Some(body2) = mapper.body2() else { return false };
    let countable_inner: Vec<_> = mapper
        .non_mapped_inner_t2()
        .iter()
        .filter(|id| body2.fragment(**id).countable())
        .collect();
    mapper.mappings().len() == 1
        && mapper.mappings()[0]
            .contains_replacement(ReplacementKind::ArgumentWithReturnExpression)
        && countable_inner.len() == 1
        && body2.fragment(*countable_inner[0]).text.starts_with("if")
        && mapper.non_mapped_leaves_t2().len() == 1
        && body2
            .fragment(mapper.non_mapped_leaves_t2()[0])
            .text
            .starts_with("return ")
}

/// Rejected hypothesis: matched before-side fragments go back to the
/// parent's leftover pools so later detectors can claim them.
fn return_fragments_to_parent_t1<'m>(parent: &mut BodyMapper<'m>, rejected: &BodyMapper<'m>) {
    for mapping in rejected.mappings() {
        parent.push_back_t1(mapping.fragment1);
    }
}
