// src/diff/class_diff.rs
//! Per-class-pair orchestration. Passes run in a strict, non-reorderable
//! sequence: identical-signature matching, signature-change candidate
//! selection (with merge/split grouping), extract detection, inline
//! detection, duplicate resolution, then refactoring emission and the
//! attribute diff. Each pass depends on the previous having removed the
//! operations it already explained.

use crate::deadline::Deadline;
use crate::detection::resolve::resolve_duplicates;
use crate::detection::{ExtractDetection, InlineDetection};
use crate::diff::ranking::MapperRank;
use crate::diff::signature::signature_refactorings;
use crate::diff::thresholds::Thresholds;
use crate::error::Result;
use crate::mapping::{BodyMapper, ReplacementKind};
use crate::model::text::normalized_distance;
use crate::model::{Attribute, Operation, UmlClass};
use crate::refactoring::{Evidence, MappingEvidence, Refactoring};
use tracing::debug;

/// One accepted relocation hypothesis, kept until duplicate resolution
/// decides whether its evidence survives.
#[derive(Debug)]
struct RelocationRecord {
    parent_mapper: usize,
    child_mapper: usize,
    operation_signature: String,
    nested: bool,
    /// true = extract, false = inline
    extract: bool,
}

#[derive(Debug)]
pub struct ClassDiff<'m> {
    class1: &'m UmlClass,
    class2: &'m UmlClass,
    removed_operations: Vec<&'m Operation>,
    added_operations: Vec<&'m Operation>,
    mappers: Vec<BodyMapper<'m>>,
    relocations: Vec<RelocationRecord>,
    refactorings: Vec<Refactoring>,
}

impl<'m> ClassDiff<'m> {
    /// Runs the whole pipeline for one class pair.
    pub fn compare(
        class1: &'m UmlClass,
        class2: &'m UmlClass,
        thresholds: &Thresholds,
        deadline: &Deadline,
    ) -> Result<Self> {
        let mut diff = Self {
            class1,
            class2,
            removed_operations: class1.operations.iter().collect(),
            added_operations: class2.operations.iter().collect(),
            mappers: Vec::new(),
            relocations: Vec::new(),
            refactorings: Vec::new(),
        };
        diff.match_identical_signatures(deadline)?;
        debug!(
            class = %class1.qualified_name(),
            mappers = diff.mappers.len(),
            "identical-signature pass done"
        );
        diff.detect_signature_changes(thresholds, deadline)?;
        diff.detect_extracted_operations(thresholds, deadline)?;
        diff.detect_inlined_operations(thresholds, deadline)?;
        let evicted = resolve_duplicates(&mut diff.mappers);
        debug!(evicted = evicted.len(), "duplicate resolution done");
        diff.revalidate_evidence(&evicted);
        diff.emit_relocation_refactorings();
        diff.diff_attributes(thresholds);
        Ok(diff)
    }

    #[must_use]
    pub fn refactorings(&self) -> &[Refactoring] {
        &self.refactorings
    }

    #[must_use]
    pub fn mappers(&self) -> &[BodyMapper<'m>] {
        &self.mappers
    }

    /// Operations of the before class no pass could explain.
    #[must_use]
    pub fn removed_operations(&self) -> &[&'m Operation] {
        &self.removed_operations
    }

    /// Operations of the after class no pass could explain.
    #[must_use]
    pub fn added_operations(&self) -> &[&'m Operation] {
        &self.added_operations
    }

    pub(crate) fn take_refactorings(&mut self) -> Vec<Refactoring> {
        std::mem::take(&mut self.refactorings)
    }

    // --- pass 1: identical signatures ---------------------------------

    fn match_identical_signatures(&mut self, deadline: &Deadline) -> Result<()> {
        let removed_snapshot: Vec<&'m Operation> = self.removed_operations.clone();
        let mut matched_removed = Vec::new();
        let mut matched_added = Vec::new();
        for (index1, operation1) in removed_snapshot.into_iter().enumerate() {
            deadline.check()?;
            let candidate: Option<(usize, &'m Operation)> = self
                .added_operations
                .iter()
                .enumerate()
                .find(|(index2, operation2)| {
                    !matched_added.contains(index2) && operation1.equal_signature(operation2)
                })
                .map(|(index2, operation2)| (index2, *operation2));
            if let Some((index2, operation2)) = candidate {
                let mapper = BodyMapper::new(operation1, operation2, deadline)?;
                let evidence = self.evidence_from_mapper(&mapper);
                self.refactorings
                    .extend(signature_refactorings(operation1, operation2, &evidence));
                self.emit_variable_refactorings(&mapper);
                self.mappers.push(mapper);
                matched_removed.push(index1);
                matched_added.push(index2);
            }
        }
        self.retain_unmatched(&matched_removed, &matched_added);
        Ok(())
    }

    // --- pass 2: signature changes, merge/split -----------------------

    fn detect_signature_changes(
        &mut self,
        thresholds: &Thresholds,
        deadline: &Deadline,
    ) -> Result<()> {
        let initial_removed = self.removed_operations.len();
        let initial_added = self.added_operations.len();
        if initial_removed == 0 || initial_added == 0 {
            return Ok(());
        }

        struct Candidate<'m> {
            removed_index: usize,
            added_index: usize,
            rank: MapperRank,
            mapper: BodyMapper<'m>,
        }

        // trial mappers for every unresolved pair, in worklist order
        let mut candidates: Vec<Candidate<'m>> = Vec::new();
        let mut generation_order = 0usize;
        for removed_index in 0..initial_removed {
            let removed = self.removed_operations[removed_index];
            for added_index in 0..initial_added {
                let added = self.added_operations[added_index];
                deadline.check()?;
                let position_distance =
                    declaration_distance(self.class1, self.class2, removed, added);
                let max_difference = max_difference_in_position(
                    removed,
                    added,
                    initial_removed,
                    initial_added,
                    thresholds,
                );
                let mapper = BodyMapper::new(removed, added, deadline)?;
                if qualifies(&mapper, position_distance, max_difference, thresholds) {
                    let rank = MapperRank::for_mapper(&mapper, position_distance, generation_order);
                    generation_order += 1;
                    candidates.push(Candidate { removed_index, added_index, rank, mapper });
                }
            }
        }

        let mut consumed_removed: Vec<usize> = Vec::new();
        let mut consumed_added: Vec<usize> = Vec::new();

        // merge groups: several removed operations fully subsumed by one
        // added operation take precedence over independent rename guesses
        for added_index in 0..initial_added {
            let group: Vec<usize> = candidates
                .iter()
                .enumerate()
                .filter(|(_, c)| {
                    c.added_index == added_index
                        && !consumed_removed.contains(&c.removed_index)
                        && c.mapper.mappings_without_blocks() > 0
                        && c.mapper.non_mapped_elements_t1() == 0
                })
                .map(|(i, _)| i)
                .collect();
            if group.len() >= 2 {
                let merged: Vec<String> = group
                    .iter()
                    .map(|i| self.removed_operations[candidates[*i].removed_index].signature_string())
                    .collect();
                let target = self.added_operations[added_index];
                let mut evidence = Evidence {
                    class_before: self.class1.qualified_name(),
                    class_after: self.class2.qualified_name(),
                    range_before: None,
                    range_after: Some(target.location.clone()),
                    mappings: Vec::new(),
                };
                for i in &group {
                    evidence.mappings.extend(
                        candidates[*i].mapper.mappings().iter().map(MappingEvidence::from_mapping),
                    );
                    consumed_removed.push(candidates[*i].removed_index);
                }
                consumed_added.push(added_index);
                self.refactorings.push(Refactoring::MergeOperation {
                    merged,
                    target: target.signature_string(),
                    evidence,
                });
            }
        }

        // split groups: one removed operation fully covered by several
        // added operations
        for removed_index in 0..initial_removed {
            if consumed_removed.contains(&removed_index) {
                continue;
            }
            let group: Vec<usize> = candidates
                .iter()
                .enumerate()
                .filter(|(_, c)| {
                    c.removed_index == removed_index
                        && !consumed_added.contains(&c.added_index)
                        && c.mapper.mappings_without_blocks() > 0
                        && c.mapper.non_mapped_elements_t2() == 0
                })
                .map(|(i, _)| i)
                .collect();
            if group.len() >= 2 {
                let source = self.removed_operations[removed_index];
                let split: Vec<String> = group
                    .iter()
                    .map(|i| self.added_operations[candidates[*i].added_index].signature_string())
                    .collect();
                let mut evidence = Evidence {
                    class_before: self.class1.qualified_name(),
                    class_after: self.class2.qualified_name(),
                    range_before: Some(source.location.clone()),
                    range_after: None,
                    mappings: Vec::new(),
                };
                for i in &group {
                    evidence.mappings.extend(
                        candidates[*i].mapper.mappings().iter().map(MappingEvidence::from_mapping),
                    );
                    consumed_added.push(candidates[*i].added_index);
                }
                consumed_removed.push(removed_index);
                self.refactorings.push(Refactoring::SplitOperation {
                    source: source.signature_string(),
                    split,
                    evidence,
                });
            }
        }

        // one-to-one selection for the rest, best rank first, with the
        // overload trap, the invoked-target preference, and consistency
        // with renames already established
        let mut rename_patterns: Vec<(String, String)> = Vec::new();
        loop {
            deadline.check()?;
            let mut eligible: Vec<usize> = candidates
                .iter()
                .enumerate()
                .filter(|(_, c)| {
                    !consumed_removed.contains(&c.removed_index)
                        && !consumed_added.contains(&c.added_index)
                })
                .map(|(i, _)| i)
                .collect();
            if eligible.is_empty() {
                break;
            }
            eligible.sort_by_key(|i| candidates[*i].rank);

            let pairs: Vec<(usize, usize)> =
                candidates.iter().map(|c| (c.removed_index, c.added_index)).collect();
            let index = self
                .choose_candidate(&eligible, &pairs, &rename_patterns)
                .unwrap_or(eligible[0]);
            let removed = self.removed_operations[candidates[index].removed_index];
            let added = self.added_operations[candidates[index].added_index];
            consumed_removed.push(candidates[index].removed_index);
            consumed_added.push(candidates[index].added_index);

            let mapper = BodyMapper::new(removed, added, deadline)?;
            let evidence = self.evidence_from_mapper(&mapper);
            if removed.name != added.name {
                rename_patterns.push((removed.name.clone(), added.name.clone()));
                self.refactorings.push(Refactoring::RenameOperation {
                    before: removed.signature_string(),
                    after: added.signature_string(),
                    evidence: evidence.clone(),
                });
            }
            self.refactorings.extend(signature_refactorings(removed, added, &evidence));
            self.emit_variable_refactorings(&mapper);
            self.mappers.push(mapper);
        }

        self.retain_unmatched(&consumed_removed, &consumed_added);
        debug!(
            remaining_removed = self.removed_operations.len(),
            remaining_added = self.added_operations.len(),
            "signature-change pass done"
        );
        Ok(())
    }

    /// Overload trap plus preference heuristics; returns the chosen
    /// eligible candidate, or None to fall back to rank order.
    fn choose_candidate(
        &self,
        eligible: &[usize],
        pairs: &[(usize, usize)],
        rename_patterns: &[(String, String)],
    ) -> Option<usize> {
        let not_overload: Vec<usize> = eligible
            .iter()
            .copied()
            .filter(|i| {
                let (removed_index, added_index) = pairs[*i];
                let added = self.added_operations[added_index];
                let removed = self.removed_operations[removed_index];
                // a body byte-identical to some *other* operation on the
                // same side is likely an overload, not a genuine match
                !self.removed_operations.iter().enumerate().any(|(j, other)| {
                    j != removed_index
                        && !other.body_text().is_empty()
                        && other.body_text() == added.body_text()
                }) && !self.added_operations.iter().enumerate().any(|(j, other)| {
                    j != added_index
                        && !other.body_text().is_empty()
                        && other.body_text() == removed.body_text()
                })
            })
            .collect();
        let pool: &[usize] = if not_overload.is_empty() { eligible } else { &not_overload };

        // prefer a target independently invoked by another surviving mapper
        for i in pool {
            let (_, added_index) = pairs[*i];
            let added = self.added_operations[added_index];
            let invoked = self.mappers.iter().any(|m| {
                m.container2()
                    .all_invocations()
                    .iter()
                    .any(|invocation| invocation.matches_operation(added))
            });
            if invoked {
                return Some(*i);
            }
        }

        // then consistency with rename patterns already established
        for i in pool {
            let (removed_index, added_index) = pairs[*i];
            let removed = self.removed_operations[removed_index];
            let added = self.added_operations[added_index];
            if rename_patterns
                .iter()
                .any(|(from, to)| *from == removed.name && *to == added.name)
            {
                return Some(*i);
            }
        }
        pool.first().copied()
    }

    // --- pass 3/4: extract and inline ----------------------------------

    fn detect_extracted_operations(
        &mut self,
        thresholds: &Thresholds,
        deadline: &Deadline,
    ) -> Result<()> {
        let candidates: Vec<&'m Operation> = self.added_operations.clone();
        let mut explained: Vec<String> = Vec::new();
        for &candidate in &candidates {
            deadline.check()?;
            if explained.contains(&candidate.key()) {
                continue;
            }
            let detection = ExtractDetection::new(&candidates, thresholds, deadline);
            for mapper_index in 0..self.mappers.len() {
                let accepted = detection.check(&mut self.mappers[mapper_index], candidate)?;
                for acceptance in accepted {
                    // nested acceptances explain their operation too
                    explained.push(acceptance.operation.key());
                    self.relocations.push(RelocationRecord {
                        parent_mapper: mapper_index,
                        child_mapper: acceptance.mapper_index,
                        operation_signature: acceptance.operation.signature_string(),
                        nested: acceptance.nested,
                        extract: true,
                    });
                }
            }
        }
        self.added_operations.retain(|o| !explained.contains(&o.key()));
        debug!(extracted = explained.len(), "extract pass done");
        Ok(())
    }

    fn detect_inlined_operations(
        &mut self,
        thresholds: &Thresholds,
        deadline: &Deadline,
    ) -> Result<()> {
        let candidates: Vec<&'m Operation> = self.removed_operations.clone();
        let mut explained: Vec<String> = Vec::new();
        for &candidate in &candidates {
            deadline.check()?;
            if explained.contains(&candidate.key()) {
                continue;
            }
            let detection = InlineDetection::new(&candidates, thresholds, deadline);
            for mapper_index in 0..self.mappers.len() {
                let accepted = detection.check(&mut self.mappers[mapper_index], candidate)?;
                for acceptance in accepted {
                    explained.push(acceptance.operation.key());
                    self.relocations.push(RelocationRecord {
                        parent_mapper: mapper_index,
                        child_mapper: acceptance.mapper_index,
                        operation_signature: acceptance.operation.signature_string(),
                        nested: acceptance.nested,
                        extract: false,
                    });
                }
            }
        }
        self.removed_operations.retain(|o| !explained.contains(&o.key()));
        debug!(inlined = explained.len(), "inline pass done");
        Ok(())
    }

    // --- emission ------------------------------------------------------

    /// Refactorings emitted before resolution hold evidence snapshots;
    /// entries whose mapping was evicted are pruned, and a refactoring
    /// whose evidence empties out is dropped entirely.
    fn revalidate_evidence(&mut self, evicted: &[MappingEvidence]) {
        if evicted.is_empty() {
            return;
        }
        self.refactorings.retain_mut(|refactoring| {
            let evidence = refactoring.evidence_mut();
            if evidence.mappings.is_empty() {
                return true;
            }
            evidence.mappings.retain(|m| !evicted.contains(m));
            !evidence.mappings.is_empty()
        });
    }

    /// Relocation refactorings are emitted only after duplicate
    /// resolution: a record whose child mapper lost all its mappings has
    /// empty evidence and is dropped.
    fn emit_relocation_refactorings(&mut self) {
        let records = std::mem::take(&mut self.relocations);
        for record in records {
            let parent = &self.mappers[record.parent_mapper];
            let child = &parent.child_mappers()[record.child_mapper];
            if child.mappings().is_empty() {
                continue;
            }
            let evidence = Evidence {
                class_before: self.class1.qualified_name(),
                class_after: self.class2.qualified_name(),
                range_before: Some(child.container1().location.clone()),
                range_after: Some(child.container2().location.clone()),
                mappings: child.mappings().iter().map(MappingEvidence::from_mapping).collect(),
            };
            let refactoring = if record.extract {
                Refactoring::ExtractOperation {
                    extracted: record.operation_signature,
                    source: parent.container1().signature_string(),
                    nested: record.nested,
                    evidence,
                }
            } else {
                Refactoring::InlineOperation {
                    inlined: record.operation_signature,
                    target: parent.container2().signature_string(),
                    nested: record.nested,
                    evidence,
                }
            };
            self.refactorings.push(refactoring);
        }
    }

    /// Consistent variable-name replacements across a mapper's mappings
    /// become scoped rename refactorings; names that are parameters on
    /// both sides are reported as parameter renames.
    fn emit_variable_refactorings(&mut self, mapper: &BodyMapper<'m>) {
        let mut pairs: Vec<(String, String, Vec<MappingEvidence>)> = Vec::new();
        let mut conflicting: Vec<(String, String)> = Vec::new();
        for mapping in mapper.mappings() {
            for replacement in &mapping.replacements {
                if replacement.kind != ReplacementKind::VariableName {
                    continue;
                }
                let key = (replacement.before.clone(), replacement.after.clone());
                if let Some(entry) = pairs.iter_mut().find(|(b, a, _)| *b == key.0 && *a == key.1) {
                    entry.2.push(MappingEvidence::from_mapping(mapping));
                } else if pairs.iter().any(|(b, a, _)| *b == key.0 && *a != key.1)
                    || pairs.iter().any(|(b, a, _)| *a == key.1 && *b != key.0)
                {
                    conflicting.push(key);
                } else {
                    pairs.push((key.0, key.1, vec![MappingEvidence::from_mapping(mapping)]));
                }
            }
        }
        for (before, after, mappings) in pairs {
            if conflicting.iter().any(|(b, a)| *b == before || *a == after) {
                continue;
            }
            let evidence = Evidence {
                class_before: self.class1.qualified_name(),
                class_after: self.class2.qualified_name(),
                range_before: Some(mapper.container1().location.clone()),
                range_after: Some(mapper.container2().location.clone()),
                mappings,
            };
            let operation = mapper.container2().signature_string();
            let is_parameter = mapper.container1().parameters.iter().any(|p| p.name == before)
                && mapper.container2().parameters.iter().any(|p| p.name == after);
            self.refactorings.push(if is_parameter {
                Refactoring::RenameParameter { operation, before, after, evidence }
            } else {
                Refactoring::RenameVariable { operation, before, after, evidence }
            });
        }

        // same-name declarations with diverging declared types
        if let (Some(body1), Some(body2)) = (mapper.body1(), mapper.body2()) {
            for mapping in mapper.mappings() {
                let declarations1 = &body1.fragment(mapping.fragment1).declared_variables;
                let declarations2 = &body2.fragment(mapping.fragment2).declared_variables;
                for declaration1 in declarations1 {
                    for declaration2 in declarations2 {
                        if declaration1.name == declaration2.name
                            && declaration1.type_name != declaration2.type_name
                        {
                            self.refactorings.push(Refactoring::ChangeVariableType {
                                operation: mapper.container2().signature_string(),
                                variable: declaration2.name.clone(),
                                before: declaration1.type_name.clone(),
                                after: declaration2.type_name.clone(),
                                evidence: Evidence {
                                    class_before: self.class1.qualified_name(),
                                    class_after: self.class2.qualified_name(),
                                    range_before: Some(mapping.range1.clone()),
                                    range_after: Some(mapping.range2.clone()),
                                    mappings: vec![MappingEvidence::from_mapping(mapping)],
                                },
                            });
                        }
                    }
                }
            }
        }
    }

    // --- attributes ----------------------------------------------------

    fn diff_attributes(&mut self, thresholds: &Thresholds) {
        let attributes1: &'m [Attribute] = &self.class1.attributes;
        let attributes2: &'m [Attribute] = &self.class2.attributes;
        let mut matched2: Vec<usize> = Vec::new();

        for attribute1 in attributes1 {
            let Some((index2, attribute2)) = attributes2
                .iter()
                .enumerate()
                .find(|(i, a)| !matched2.contains(i) && a.name == attribute1.name)
            else {
                continue;
            };
            matched2.push(index2);
            self.emit_attribute_changes(attribute1, attribute2);
        }

        // leftover pairs with equal type and similar names are renames
        for attribute1 in attributes1 {
            if attributes2.iter().any(|a| a.name == attribute1.name) {
                continue;
            }
            let candidate = attributes2.iter().enumerate().find(|(i, a)| {
                !matched2.contains(i)
                    && !attributes1.iter().any(|b| b.name == a.name)
                    && a.type_name == attribute1.type_name
                    && normalized_distance(&attribute1.name, &a.name)
                        <= thresholds.rename_name_distance_cutoff
            });
            if let Some((index2, attribute2)) = candidate {
                matched2.push(index2);
                self.refactorings.push(Refactoring::RenameAttribute {
                    before: attribute1.name.clone(),
                    after: attribute2.name.clone(),
                    evidence: self.attribute_evidence(attribute1, attribute2),
                });
                self.emit_attribute_changes(attribute1, attribute2);
            }
        }
    }

    fn emit_attribute_changes(&mut self, attribute1: &Attribute, attribute2: &Attribute) {
        let evidence = self.attribute_evidence(attribute1, attribute2);
        if attribute1.type_name != attribute2.type_name {
            self.refactorings.push(Refactoring::ChangeAttributeType {
                attribute: attribute2.name.clone(),
                before: attribute1.type_name.clone(),
                after: attribute2.type_name.clone(),
                evidence: evidence.clone(),
            });
        }
        for annotation in &attribute2.annotations {
            if !attribute1.annotations.contains(annotation) {
                self.refactorings.push(Refactoring::AddAttributeAnnotation {
                    attribute: attribute2.name.clone(),
                    annotation: annotation.clone(),
                    evidence: evidence.clone(),
                });
            }
        }
        for annotation in &attribute1.annotations {
            if !attribute2.annotations.contains(annotation) {
                self.refactorings.push(Refactoring::RemoveAttributeAnnotation {
                    attribute: attribute2.name.clone(),
                    annotation: annotation.clone(),
                    evidence: evidence.clone(),
                });
            }
        }
        for (before, after, modifier) in [
            (attribute1.is_static, attribute2.is_static, "static"),
            (attribute1.is_final, attribute2.is_final, "final"),
        ] {
            if !before && after {
                self.refactorings.push(Refactoring::AddAttributeModifier {
                    attribute: attribute2.name.clone(),
                    modifier: modifier.to_owned(),
                    evidence: evidence.clone(),
                });
            } else if before && !after {
                self.refactorings.push(Refactoring::RemoveAttributeModifier {
                    attribute: attribute2.name.clone(),
                    modifier: modifier.to_owned(),
                    evidence: evidence.clone(),
                });
            }
        }
    }

    fn attribute_evidence(&self, attribute1: &Attribute, attribute2: &Attribute) -> Evidence {
        Evidence {
            class_before: self.class1.qualified_name(),
            class_after: self.class2.qualified_name(),
            range_before: Some(attribute1.location.clone()),
            range_after: Some(attribute2.location.clone()),
            mappings: Vec::new(),
        }
    }

    // --- helpers -------------------------------------------------------

    fn evidence_from_mapper(&self, mapper: &BodyMapper<'m>) -> Evidence {
        Evidence {
            class_before: self.class1.qualified_name(),
            class_after: self.class2.qualified_name(),
            range_before: Some(mapper.container1().location.clone()),
            range_after: Some(mapper.container2().location.clone()),
            mappings: mapper.mappings().iter().map(MappingEvidence::from_mapping).collect(),
        }
    }

    fn retain_unmatched(&mut self, removed_indices: &[usize], added_indices: &[usize]) {
        let mut index = 0usize;
        self.removed_operations.retain(|_| {
            let keep = !removed_indices.contains(&index);
            index += 1;
            keep
        });
        index = 0;
        self.added_operations.retain(|_| {
            let keep = !added_indices.contains(&index);
            index += 1;
            keep
        });
    }
}

/// Whether a trial mapper is good enough to consider the pair a
/// signature change of the same operation.
fn qualifies(
    mapper: &BodyMapper<'_>,
    position_distance: usize,
    max_difference: usize,
    thresholds: &Thresholds,
) -> bool {
    let mappings = mapper.mappings_without_blocks();
    if mappings == 0 {
        return false;
    }
    let non_mapped_t1 = mapper.non_mapped_elements_t1();
    let non_mapped_t2 = mapper.non_mapped_elements_t2();
    let exact = mapper.exact_matches().len();

    // an exact bijection qualifies regardless of declaration position
    if exact == mappings && non_mapped_t1 == 0 && non_mapped_t2 == 0 {
        return true;
    }
    if position_distance > max_difference {
        return false;
    }
    // one side fully covered is the merge/split shape; the names of the
    // participants carry no signal there
    if mappings > 1 && (non_mapped_t1 == 0 || non_mapped_t2 == 0) {
        return true;
    }

    // names must be plausibly related when the bodies only partly agree
    let name1 = &mapper.container1().name;
    let name2 = &mapper.container2().name;
    let names_compatible = name1 == name2
        || name1.contains(name2.as_str())
        || name2.contains(name1.as_str())
        || normalized_distance(name1, name2) <= thresholds.rename_name_distance_cutoff;

    names_compatible
        && (mappings > non_mapped_t1 && mappings > non_mapped_t2
            || (exact >= 1
                && non_mapped_t1.saturating_sub(exact)
                    <= thresholds.single_exact_match_unmapped_limit
                && non_mapped_t2.saturating_sub(exact)
                    <= thresholds.single_exact_match_unmapped_limit))
}

/// How far apart two declarations may sit in their classes before a trial
/// pairing is not even considered.
fn max_difference_in_position(
    removed: &Operation,
    added: &Operation,
    initial_removed: usize,
    initial_added: usize,
    thresholds: &Thresholds,
) -> usize {
    // paired test methods move around freely, widen the gate for them
    if removed.has_test_annotation() && added.has_test_annotation() {
        return initial_removed + initial_added;
    }
    if initial_removed >= thresholds.max_compared_methods
        && initial_added >= thresholds.max_compared_methods
    {
        return thresholds.max_compared_methods;
    }
    initial_removed.max(initial_added)
}

/// Distance between the operations' declaration positions in their classes.
fn declaration_distance(
    class1: &UmlClass,
    class2: &UmlClass,
    removed: &Operation,
    added: &Operation,
) -> usize {
    let position1 = class1
        .operations
        .iter()
        .position(|o| o.key() == removed.key())
        .unwrap_or(0);
    let position2 = class2
        .operations
        .iter()
        .position(|o| o.key() == added.key())
        .unwrap_or(0);
    position1.abs_diff(position2)
}
