// src/mapping/mapper.rs
//! Per-operation-pair statement mapper. Aligns two statement trees and
//! owns the resulting mappings plus the four leftover pools. A mapper may
//! be nested under a parent to represent an extract/inline hypothesis, in
//! which case it compares the parent's leftovers against the candidate
//! operation's body with arguments bound to parameters.

use crate::deadline::Deadline;
use crate::error::Result;
use crate::mapping::code_mapping::CodeMapping;
use crate::mapping::matcher::{find_replacements, guard_replacements, substitute_identifiers};
use crate::mapping::replacement::{distinct_kind_count, Replacement, ReplacementKind};
use crate::model::text::edit_distance;
use crate::model::{Body, Fragment, FragmentId, Invocation, Operation};

/// Parameter-name to argument-text bindings applied to one side before
/// texts are compared. Ordered; insertion order is part of determinism.
pub type ParameterBindings = Vec<(String, String)>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BoundSide {
    Neither,
    /// Bindings rewrite before-side texts (inline hypothesis).
    Before,
    /// Bindings rewrite after-side texts (extract hypothesis).
    After,
}

#[derive(Debug)]
pub struct BodyMapper<'m> {
    container1: &'m Operation,
    container2: &'m Operation,
    scope1: Vec<FragmentId>,
    scope2: Vec<FragmentId>,
    bindings: ParameterBindings,
    bound_side: BoundSide,
    mappings: Vec<CodeMapping>,
    non_mapped_leaves_t1: Vec<FragmentId>,
    non_mapped_inner_t1: Vec<FragmentId>,
    non_mapped_leaves_t2: Vec<FragmentId>,
    non_mapped_inner_t2: Vec<FragmentId>,
    child_mappers: Vec<BodyMapper<'m>>,
    nested: bool,
    /// The call site that motivated this mapper, for extract/inline children.
    operation_invocation: Option<Invocation>,
}

impl<'m> BodyMapper<'m> {
    /// Full-body comparison of two operations. Abstract (bodiless)
    /// operations trivially yield zero mappings and empty pools.
    pub fn new(
        container1: &'m Operation,
        container2: &'m Operation,
        deadline: &Deadline,
    ) -> Result<Self> {
        let scope1 = container1.body.as_ref().map(all_ids).unwrap_or_default();
        let scope2 = container2.body.as_ref().map(all_ids).unwrap_or_default();
        let mut mapper = Self {
            container1,
            container2,
            scope1,
            scope2,
            bindings: Vec::new(),
            bound_side: BoundSide::Neither,
            mappings: Vec::new(),
            non_mapped_leaves_t1: Vec::new(),
            non_mapped_inner_t1: Vec::new(),
            non_mapped_leaves_t2: Vec::new(),
            non_mapped_inner_t2: Vec::new(),
            child_mappers: Vec::new(),
            nested: false,
            operation_invocation: None,
        };
        mapper.match_statements(deadline)?;
        Ok(mapper)
    }

    /// Child mapper for an extract hypothesis: the parent's unmatched
    /// before-side statements (plus the before side of its non-exact
    /// mappings) against the added operation's body, with the callee's
    /// parameters substituted by the call-site arguments.
    pub fn for_extracted(
        parent: &BodyMapper<'m>,
        added_operation: &'m Operation,
        invocation: &Invocation,
        bindings: ParameterBindings,
        nested: bool,
        deadline: &Deadline,
    ) -> Result<Self> {
        let mut scope1 = Vec::new();
        scope1.extend(parent.non_mapped_leaves_t1.iter().copied());
        scope1.extend(parent.non_mapped_inner_t1.iter().copied());
        for mapping in &parent.mappings {
            if !mapping.is_exact() && !scope1.contains(&mapping.fragment1) {
                scope1.push(mapping.fragment1);
            }
        }
        scope1.sort_unstable();
        let scope2 = added_operation.body.as_ref().map(all_ids).unwrap_or_default();
        let mut mapper = Self {
            container1: parent.container1,
            container2: added_operation,
            scope1,
            scope2,
            bindings,
            bound_side: BoundSide::After,
            mappings: Vec::new(),
            non_mapped_leaves_t1: Vec::new(),
            non_mapped_inner_t1: Vec::new(),
            non_mapped_leaves_t2: Vec::new(),
            non_mapped_inner_t2: Vec::new(),
            child_mappers: Vec::new(),
            nested,
            operation_invocation: Some(invocation.clone()),
        };
        mapper.match_statements(deadline)?;
        Ok(mapper)
    }

    /// Child mapper for an inline hypothesis: the removed operation's body
    /// against the parent's unmatched after-side statements.
    pub fn for_inlined(
        parent: &BodyMapper<'m>,
        removed_operation: &'m Operation,
        invocation: &Invocation,
        bindings: ParameterBindings,
        nested: bool,
        deadline: &Deadline,
    ) -> Result<Self> {
        let scope1 = removed_operation.body.as_ref().map(all_ids).unwrap_or_default();
        let mut scope2 = Vec::new();
        scope2.extend(parent.non_mapped_leaves_t2.iter().copied());
        scope2.extend(parent.non_mapped_inner_t2.iter().copied());
        for mapping in &parent.mappings {
            if !mapping.is_exact() && !scope2.contains(&mapping.fragment2) {
                scope2.push(mapping.fragment2);
            }
        }
        scope2.sort_unstable();
        let mut mapper = Self {
            container1: removed_operation,
            container2: parent.container2,
            scope1,
            scope2,
            bindings,
            bound_side: BoundSide::Before,
            mappings: Vec::new(),
            non_mapped_leaves_t1: Vec::new(),
            non_mapped_inner_t1: Vec::new(),
            non_mapped_leaves_t2: Vec::new(),
            non_mapped_inner_t2: Vec::new(),
            child_mappers: Vec::new(),
            nested,
            operation_invocation: Some(invocation.clone()),
        };
        mapper.match_statements(deadline)?;
        Ok(mapper)
    }

    // --- accessors -----------------------------------------------------

    #[must_use]
    pub fn container1(&self) -> &'m Operation {
        self.container1
    }

    #[must_use]
    pub fn container2(&self) -> &'m Operation {
        self.container2
    }

    #[must_use]
    pub fn mappings(&self) -> &[CodeMapping] {
        &self.mappings
    }

    #[must_use]
    pub fn is_nested(&self) -> bool {
        self.nested
    }

    #[must_use]
    pub fn operation_invocation(&self) -> Option<&Invocation> {
        self.operation_invocation.as_ref()
    }

    #[must_use]
    pub fn child_mappers(&self) -> &[BodyMapper<'m>] {
        &self.child_mappers
    }

    pub fn add_child_mapper(&mut self, child: BodyMapper<'m>) {
        self.child_mappers.push(child);
    }

    pub(crate) fn child_mappers_mut(&mut self) -> &mut [BodyMapper<'m>] {
        &mut self.child_mappers
    }

    #[must_use]
    pub fn non_mapped_leaves_t1(&self) -> &[FragmentId] {
        &self.non_mapped_leaves_t1
    }

    #[must_use]
    pub fn non_mapped_inner_t1(&self) -> &[FragmentId] {
        &self.non_mapped_inner_t1
    }

    #[must_use]
    pub fn non_mapped_leaves_t2(&self) -> &[FragmentId] {
        &self.non_mapped_leaves_t2
    }

    #[must_use]
    pub fn non_mapped_inner_t2(&self) -> &[FragmentId] {
        &self.non_mapped_inner_t2
    }

    /// Mappings whose fragments are countable (block markers excluded).
    #[must_use]
    pub fn mappings_without_blocks(&self) -> usize {
        self.mappings
            .iter()
            .filter(|m| m.text1 != "{" && m.text2 != "{")
            .count()
    }

    /// Countable before-side statements not covered by any mapping.
    #[must_use]
    pub fn non_mapped_elements_t1(&self) -> usize {
        self.count_countable(&self.non_mapped_leaves_t1, self.body1())
            + self.count_countable(&self.non_mapped_inner_t1, self.body1())
    }

    #[must_use]
    pub fn non_mapped_elements_t2(&self) -> usize {
        self.count_countable(&self.non_mapped_leaves_t2, self.body2())
            + self.count_countable(&self.non_mapped_inner_t2, self.body2())
    }

    #[must_use]
    pub fn non_mapped_leaf_elements_t2(&self) -> usize {
        self.count_countable(&self.non_mapped_leaves_t2, self.body2())
    }

    /// Exact leaf mappings (identical effective text, countable fragments).
    #[must_use]
    pub fn exact_matches(&self) -> Vec<&CodeMapping> {
        self.mappings
            .iter()
            .filter(|m| m.is_exact() && !m.composite && m.text1 != "{")
            .collect()
    }

    #[must_use]
    pub fn has_replacements_involving_invocations(&self) -> bool {
        self.mappings.iter().any(|m| {
            m.contains_replacement(ReplacementKind::MethodInvocation)
                || m.contains_replacement(ReplacementKind::Composite)
        })
    }

    /// Invocations found in after-side leftovers and non-exact mappings:
    /// the candidate call sites for extract detection.
    #[must_use]
    pub fn leftover_invocations_t2(&self) -> Vec<Invocation> {
        let Some(body2) = self.body2() else {
            return Vec::new();
        };
        let mut out: Vec<Invocation> = Vec::new();
        let mut add_from = |fragment: &Fragment| {
            for invocation in &fragment.invocations {
                if !out.contains(invocation) {
                    out.push(invocation.clone());
                }
            }
        };
        for id in &self.non_mapped_leaves_t2 {
            add_from(body2.fragment(*id));
        }
        for mapping in &self.mappings {
            if !mapping.is_exact() {
                add_from(body2.fragment(mapping.fragment2));
            }
        }
        out
    }

    /// Symmetric pool for inline detection: before-side leftovers.
    #[must_use]
    pub fn leftover_invocations_t1(&self) -> Vec<Invocation> {
        let Some(body1) = self.body1() else {
            return Vec::new();
        };
        let mut out: Vec<Invocation> = Vec::new();
        for id in &self.non_mapped_leaves_t1 {
            for invocation in &body1.fragment(*id).invocations {
                if !out.contains(invocation) {
                    out.push(invocation.clone());
                }
            }
        }
        for mapping in &self.mappings {
            if !mapping.is_exact() {
                for invocation in &body1.fragment(mapping.fragment1).invocations {
                    if !out.contains(invocation) {
                        out.push(invocation.clone());
                    }
                }
            }
        }
        out
    }

    #[must_use]
    pub fn body1(&self) -> Option<&'m Body> {
        self.container1.body.as_ref()
    }

    #[must_use]
    pub fn body2(&self) -> Option<&'m Body> {
        self.container2.body.as_ref()
    }

    /// True if the before-side fragment is part of an exception handler.
    #[must_use]
    pub fn in_catch_context(&self, id: FragmentId) -> bool {
        let Some(body) = self.body1() else {
            return false;
        };
        let mut current = body.fragment(id).parent;
        while let Some(parent) = current {
            if body.fragment(parent).kind == crate::model::FragmentKind::Catch {
                return true;
            }
            current = body.fragment(parent).parent;
        }
        false
    }

    // --- mutation used by rejection push-back and duplicate resolution --

    /// Removes a mapping and returns its fragments to the leftover pools.
    pub(crate) fn evict_mapping(&mut self, index: usize) {
        let mapping = self.mappings.remove(index);
        self.push_back_t1(mapping.fragment1);
        self.push_back_t2(mapping.fragment2);
    }

    /// Removes the mapping for an exact (before, after) pair, if present.
    pub(crate) fn evict_pair(&mut self, fragment1: FragmentId, fragment2: FragmentId) {
        if let Some(index) = self
            .mappings
            .iter()
            .position(|m| m.fragment1 == fragment1 && m.fragment2 == fragment2)
        {
            self.evict_mapping(index);
        }
    }

    pub(crate) fn push_back_t1(&mut self, id: FragmentId) {
        let Some(body) = self.body1() else { return };
        let pool = if body.fragment(id).is_leaf() {
            &mut self.non_mapped_leaves_t1
        } else {
            &mut self.non_mapped_inner_t1
        };
        if !pool.contains(&id) {
            pool.push(id);
            pool.sort_unstable();
        }
    }

    pub(crate) fn push_back_t2(&mut self, id: FragmentId) {
        let Some(body) = self.body2() else { return };
        let pool = if body.fragment(id).is_leaf() {
            &mut self.non_mapped_leaves_t2
        } else {
            &mut self.non_mapped_inner_t2
        };
        if !pool.contains(&id) {
            pool.push(id);
            pool.sort_unstable();
        }
    }

    // --- matching ------------------------------------------------------

    fn match_statements(&mut self, deadline: &Deadline) -> Result<()> {
        let (Some(body1), Some(body2)) = (self.body1(), self.body2()) else {
            return Ok(());
        };
        let leaves1: Vec<FragmentId> = self
            .scope1
            .iter()
            .copied()
            .filter(|id| body1.fragment(*id).is_leaf())
            .collect();
        let leaves2: Vec<FragmentId> = self
            .scope2
            .iter()
            .copied()
            .filter(|id| body2.fragment(*id).is_leaf())
            .collect();
        let inner1: Vec<FragmentId> = self
            .scope1
            .iter()
            .copied()
            .filter(|id| !body1.fragment(*id).is_leaf())
            .collect();
        let inner2: Vec<FragmentId> = self
            .scope2
            .iter()
            .copied()
            .filter(|id| !body2.fragment(*id).is_leaf())
            .collect();

        let mut matched1: Vec<FragmentId> = Vec::new();
        let mut matched2: Vec<FragmentId> = Vec::new();

        self.match_leaves_exact(&leaves1, &leaves2, &mut matched1, &mut matched2, deadline)?;
        self.match_leaves_with_replacements(
            &leaves1, &leaves2, &mut matched1, &mut matched2, deadline,
        )?;
        self.match_inner_nodes(&inner1, &inner2, &mut matched1, &mut matched2, deadline)?;

        self.non_mapped_leaves_t1 =
            leaves1.iter().copied().filter(|id| !matched1.contains(id)).collect();
        self.non_mapped_leaves_t2 =
            leaves2.iter().copied().filter(|id| !matched2.contains(id)).collect();
        self.non_mapped_inner_t1 =
            inner1.iter().copied().filter(|id| !matched1.contains(id)).collect();
        self.non_mapped_inner_t2 =
            inner2.iter().copied().filter(|id| !matched2.contains(id)).collect();
        Ok(())
    }

    /// Pass 1: identical effective text. Ties go to the alignment that
    /// preserves relative statement order.
    fn match_leaves_exact(
        &mut self,
        leaves1: &[FragmentId],
        leaves2: &[FragmentId],
        matched1: &mut Vec<FragmentId>,
        matched2: &mut Vec<FragmentId>,
        deadline: &Deadline,
    ) -> Result<()> {
        for (pos1, id1) in leaves1.iter().enumerate() {
            deadline.check()?;
            let text1 = self.effective_text1(*id1);
            let mut best: Option<(usize, FragmentId)> = None;
            for (pos2, id2) in leaves2.iter().enumerate() {
                if matched2.contains(id2) {
                    continue;
                }
                if self.effective_text2(*id2) == text1 {
                    let distance = pos1.abs_diff(pos2);
                    if best.is_none_or(|(d, _)| distance < d) {
                        best = Some((distance, *id2));
                    }
                }
            }
            if let Some((_, id2)) = best {
                self.record_mapping(*id1, id2, Vec::new());
                matched1.push(*id1);
                matched2.push(id2);
            }
        }
        Ok(())
    }

    /// Pass 2: the difference must be fully explained by a replacement
    /// set. Ties: fewest distinct replacement kinds, then minimal edit
    /// distance, then relative order.
    fn match_leaves_with_replacements(
        &mut self,
        leaves1: &[FragmentId],
        leaves2: &[FragmentId],
        matched1: &mut Vec<FragmentId>,
        matched2: &mut Vec<FragmentId>,
        deadline: &Deadline,
    ) -> Result<()> {
        for (pos1, id1) in leaves1.iter().enumerate() {
            if matched1.contains(id1) {
                continue;
            }
            let text1 = self.effective_text1(*id1);
            let mut best: Option<(usize, usize, usize, FragmentId, Vec<Replacement>)> = None;
            for (pos2, id2) in leaves2.iter().enumerate() {
                deadline.check()?;
                if matched2.contains(id2) {
                    continue;
                }
                let text2 = self.effective_text2(*id2);
                let Some(replacements) = find_replacements(&text1, &text2) else {
                    continue;
                };
                if replacements.is_empty() {
                    continue; // exact matches already consumed in pass 1
                }
                let key = (
                    distinct_kind_count(&replacements),
                    edit_distance(&text1, &text2),
                    pos1.abs_diff(pos2),
                );
                if best
                    .as_ref()
                    .is_none_or(|(k, d, p, _, _)| key < (*k, *d, *p))
                {
                    best = Some((key.0, key.1, key.2, *id2, replacements));
                }
            }
            if let Some((_, _, _, id2, replacements)) = best {
                self.record_mapping(*id1, id2, replacements);
                matched1.push(*id1);
                matched2.push(id2);
            }
        }
        Ok(())
    }

    /// Pass 3: composite nodes, matched by kind + compatible guard, scored
    /// by the number of already-mapped descendant pairs.
    fn match_inner_nodes(
        &mut self,
        inner1: &[FragmentId],
        inner2: &[FragmentId],
        matched1: &mut Vec<FragmentId>,
        matched2: &mut Vec<FragmentId>,
        deadline: &Deadline,
    ) -> Result<()> {
        let (Some(body1), Some(body2)) = (self.body1(), self.body2()) else {
            return Ok(());
        };
        // deepest first, so nested composites claim their own children
        let mut order: Vec<(usize, FragmentId)> = inner1
            .iter()
            .map(|id| (body1.fragment(*id).depth, *id))
            .collect();
        order.sort_by(|a, b| b.0.cmp(&a.0).then(a.1.cmp(&b.1)));

        for (_, id1) in order {
            deadline.check()?;
            let fragment1 = body1.fragment(id1);
            let pos1 = inner1.iter().position(|i| *i == id1).unwrap_or(0);
            let mut best: Option<(isize, usize, FragmentId, Vec<Replacement>)> = None;
            for (pos2, id2) in inner2.iter().enumerate() {
                if matched2.contains(id2) {
                    continue;
                }
                let fragment2 = body2.fragment(*id2);
                if fragment1.kind != fragment2.kind {
                    continue;
                }
                let Some(replacements) = self.guards_compatible(fragment1, fragment2) else {
                    continue;
                };
                let score = self.mapped_descendants(body1, body2, id1, *id2);
                let distance = pos1.abs_diff(pos2);
                let candidate = (-(score as isize), distance);
                if best
                    .as_ref()
                    .is_none_or(|(s, d, _, _)| candidate < (*s, *d))
                {
                    best = Some((candidate.0, candidate.1, *id2, replacements));
                }
            }
            if let Some((_, _, id2, replacements)) = best {
                self.record_mapping(id1, id2, replacements);
                matched1.push(id1);
                matched2.push(id2);
            }
        }
        Ok(())
    }

    fn guards_compatible(
        &self,
        fragment1: &Fragment,
        fragment2: &Fragment,
    ) -> Option<Vec<Replacement>> {
        match (&fragment1.expression, &fragment2.expression) {
            (None, None) => Some(Vec::new()),
            (Some(guard1), Some(guard2)) => {
                let g1 = substitute_side1(&self.bindings, self.bound_side, guard1);
                let g2 = substitute_side2(&self.bindings, self.bound_side, guard2);
                guard_replacements(&g1, &g2)
            }
            _ => None,
        }
    }

    fn mapped_descendants(
        &self,
        body1: &Body,
        body2: &Body,
        inner1: FragmentId,
        inner2: FragmentId,
    ) -> usize {
        self.mappings
            .iter()
            .filter(|m| {
                body1.is_descendant_of(m.fragment1, inner1)
                    && body2.is_descendant_of(m.fragment2, inner2)
            })
            .count()
    }

    fn record_mapping(
        &mut self,
        id1: FragmentId,
        id2: FragmentId,
        replacements: Vec<Replacement>,
    ) {
        let (Some(body1), Some(body2)) = (self.body1(), self.body2()) else {
            return;
        };
        let fragment1 = body1.fragment(id1);
        let fragment2 = body2.fragment(id2);
        let edit = edit_distance(&fragment1.text, &fragment2.text);
        self.mappings.push(CodeMapping {
            fragment1: id1,
            fragment2: id2,
            text1: fragment1.text.clone(),
            text2: fragment2.text.clone(),
            range1: fragment1.location.clone(),
            range2: fragment2.location.clone(),
            replacements,
            edit_distance: edit,
            composite: fragment1.kind.is_composite(),
        });
    }

    fn effective_text1(&self, id: FragmentId) -> String {
        let text = &self.body1().expect("side 1 body present").fragment(id).text;
        substitute_side1(&self.bindings, self.bound_side, text)
    }

    fn effective_text2(&self, id: FragmentId) -> String {
        let text = &self.body2().expect("side 2 body present").fragment(id).text;
        substitute_side2(&self.bindings, self.bound_side, text)
    }

    fn count_countable(&self, pool: &[FragmentId], body: Option<&Body>) -> usize {
        let Some(body) = body else { return 0 };
        pool.iter().filter(|id| body.fragment(**id).countable()).count()
    }
}

fn substitute_side1(bindings: &ParameterBindings, side: BoundSide, text: &str) -> String {
    if side == BoundSide::Before {
        substitute_identifiers(text, bindings)
    } else {
        text.to_owned()
    }
}

fn substitute_side2(bindings: &ParameterBindings, side: BoundSide, text: &str) -> String {
    if side == BoundSide::After {
        substitute_identifiers(text, bindings)
    } else {
        text.to_owned()
    }
}

fn all_ids(body: &Body) -> Vec<FragmentId> {
    body.ids().collect()
}
