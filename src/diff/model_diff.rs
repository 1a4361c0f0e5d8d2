// src/diff/model_diff.rs
//! Model-level aggregation: pairs classes across two snapshots, runs the
//! per-class pipeline for each pair, explains leftover classes as moves,
//! renames or supertype extractions, and collects everything into one
//! deterministic result. A time budget applies per class pair, so one
//! pathological pair cannot starve the rest of the diff.

use crate::deadline::Deadline;
use crate::diff::class_diff::ClassDiff;
use crate::diff::thresholds::Thresholds;
use crate::error::{DiffError, Result};
use crate::model::{ClassKind, UmlClass, UmlModel};
use crate::refactoring::{Evidence, Refactoring};
use std::time::Duration;
use tracing::{debug, warn};

/// Knobs for one comparison run. `Default` compares without a time limit.
#[derive(Debug, Clone, Default)]
pub struct DiffOptions {
    pub thresholds: Thresholds,
    /// Wall-clock budget applied to each class pair separately.
    pub time_budget: Option<Duration>,
}

/// The result of comparing two model snapshots.
#[derive(Debug)]
pub struct ModelDiff {
    refactorings: Vec<Refactoring>,
    removed_classes: Vec<String>,
    added_classes: Vec<String>,
    timed_out_classes: Vec<String>,
}

impl ModelDiff {
    /// Compares two snapshots. Classes are paired by qualified name first;
    /// leftovers are then explained as moved, renamed, or extracted
    /// classes. Result order follows the before-model declaration order.
    pub fn compare(before: &UmlModel, after: &UmlModel, options: &DiffOptions) -> Result<Self> {
        let mut diff = Self {
            refactorings: Vec::new(),
            removed_classes: Vec::new(),
            added_classes: Vec::new(),
            timed_out_classes: Vec::new(),
        };

        let mut removed: Vec<&UmlClass> = Vec::new();
        for class1 in &before.classes {
            match after.class_by_qualified_name(&class1.qualified_name()) {
                Some(class2) => {
                    diff.diff_pair(class1, class2, options)?;
                    diff.diff_class_annotations(class1, class2);
                }
                None => removed.push(class1),
            }
        }
        let mut added: Vec<&UmlClass> = after
            .classes
            .iter()
            .filter(|c| before.class_by_qualified_name(&c.qualified_name()).is_none())
            .collect();

        diff.match_leftover_classes(before, &mut removed, &mut added, options)?;
        diff.detect_extracted_supertypes(before, after, &added);

        diff.removed_classes = removed.iter().map(|c| c.qualified_name()).collect();
        diff.added_classes = added.iter().map(|c| c.qualified_name()).collect();
        debug!(
            refactorings = diff.refactorings.len(),
            removed = diff.removed_classes.len(),
            added = diff.added_classes.len(),
            "model diff done"
        );
        Ok(diff)
    }

    #[must_use]
    pub fn refactorings(&self) -> &[Refactoring] {
        &self.refactorings
    }

    /// Classes of the before snapshot nothing could explain.
    #[must_use]
    pub fn removed_classes(&self) -> &[String] {
        &self.removed_classes
    }

    /// Classes of the after snapshot nothing could explain.
    #[must_use]
    pub fn added_classes(&self) -> &[String] {
        &self.added_classes
    }

    /// Qualified names of before-side classes whose pair exceeded the
    /// time budget and contributed no refactorings.
    #[must_use]
    pub fn timed_out_classes(&self) -> &[String] {
        &self.timed_out_classes
    }

    /// Runs the per-class pipeline for one pair, isolating timeouts: a
    /// pair over budget is logged and skipped, the rest of the diff
    /// continues.
    fn diff_pair(
        &mut self,
        class1: &UmlClass,
        class2: &UmlClass,
        options: &DiffOptions,
    ) -> Result<()> {
        let deadline = match options.time_budget {
            Some(budget) => Deadline::after(budget),
            None => Deadline::unlimited(),
        };
        match ClassDiff::compare(class1, class2, &options.thresholds, &deadline) {
            Ok(mut class_diff) => {
                self.refactorings.extend(class_diff.take_refactorings());
                Ok(())
            }
            Err(DiffError::TimedOut { elapsed_ms, budget_ms }) => {
                warn!(
                    class = %class1.qualified_name(),
                    elapsed_ms,
                    budget_ms,
                    "class pair exceeded time budget, skipped"
                );
                self.timed_out_classes.push(class1.qualified_name());
                Ok(())
            }
            Err(other) => Err(other),
        }
    }

    /// Leftover classes with matching members are moved and/or renamed
    /// versions of each other. Moves covering a whole package collapse
    /// into one package rename.
    fn match_leftover_classes(
        &mut self,
        before: &UmlModel,
        removed: &mut Vec<&UmlClass>,
        added: &mut Vec<&UmlClass>,
        options: &DiffOptions,
    ) -> Result<()> {
        let mut moves: Vec<(String, String, Refactoring)> = Vec::new();
        let mut matched_removed: Vec<usize> = Vec::new();
        let mut matched_added: Vec<usize> = Vec::new();

        for (index1, class1) in removed.iter().enumerate() {
            let candidate = added.iter().enumerate().find(|(index2, class2)| {
                if matched_added.contains(index2) || class1.kind != class2.kind {
                    return false;
                }
                if class1.name == class2.name {
                    // same simple name in a different package
                    return true;
                }
                member_match_ratio(class1, class2) >= 0.5
            });
            let Some((index2, class2)) = candidate else { continue };
            let evidence = Evidence {
                class_before: class1.qualified_name(),
                class_after: class2.qualified_name(),
                range_before: Some(class1.location.clone()),
                range_after: Some(class2.location.clone()),
                mappings: Vec::new(),
            };
            let refactoring = if class1.name == class2.name {
                Refactoring::MoveClass {
                    before: class1.qualified_name(),
                    after: class2.qualified_name(),
                    evidence,
                }
            } else if class1.package == class2.package {
                Refactoring::RenameClass {
                    before: class1.qualified_name(),
                    after: class2.qualified_name(),
                    evidence,
                }
            } else {
                Refactoring::MoveAndRenameClass {
                    before: class1.qualified_name(),
                    after: class2.qualified_name(),
                    evidence,
                }
            };
            if matches!(refactoring, Refactoring::MoveClass { .. }) {
                moves.push((class1.package.clone(), class2.package.clone(), refactoring));
            } else {
                self.refactorings.push(refactoring);
            }
            matched_removed.push(index1);
            matched_added.push(index2);
            self.diff_pair(class1, class2, options)?;
        }

        // a move set emptying one package into another is a package rename
        let move_pairs: Vec<(String, String)> =
            moves.iter().map(|(from, to, _)| (from.clone(), to.clone())).collect();
        let mut emitted_packages: Vec<(String, String)> = Vec::new();
        for (from, to, refactoring) in moves {
            let whole_package = before
                .classes
                .iter()
                .filter(|c| c.package == from)
                .all(|c| removed.iter().any(|r| r.qualified_name() == c.qualified_name()));
            let moves_from = move_pairs.iter().filter(|(f, _)| *f == from).count();
            let same_target = move_pairs.iter().filter(|(f, t)| *f == from && *t == to).count();
            if whole_package && moves_from >= 2 && moves_from == same_target {
                if !emitted_packages.contains(&(from.clone(), to.clone())) {
                    emitted_packages.push((from.clone(), to.clone()));
                    self.refactorings.push(Refactoring::RenamePackage {
                        before: from,
                        after: to,
                        evidence: Evidence::default(),
                    });
                }
            } else {
                self.refactorings.push(refactoring);
            }
        }

        let mut index = 0usize;
        removed.retain(|_| {
            let keep = !matched_removed.contains(&index);
            index += 1;
            keep
        });
        index = 0;
        added.retain(|_| {
            let keep = !matched_added.contains(&index);
            index += 1;
            keep
        });
        Ok(())
    }

    /// An added type that surviving classes now extend or implement, and
    /// whose members existed in those classes before, was pulled up.
    fn detect_extracted_supertypes(
        &mut self,
        before: &UmlModel,
        after: &UmlModel,
        added: &[&UmlClass],
    ) {
        for class2 in added {
            let supertype_name = class2.qualified_name();
            let subclasses: Vec<&UmlClass> = after
                .classes
                .iter()
                .filter(|c| {
                    c.superclass.as_deref() == Some(supertype_name.as_str())
                        || c.superclass.as_deref() == Some(class2.name.as_str())
                        || c.interfaces.iter().any(|i| i == &supertype_name || i == &class2.name)
                })
                .collect();
            if subclasses.is_empty() {
                continue;
            }
            // members must come from somewhere: at least one subclass used
            // to declare an operation the new supertype now declares
            let signatures = class2.operation_signatures();
            let pulled_up = subclasses.iter().any(|subclass| {
                before
                    .class_by_qualified_name(&subclass.qualified_name())
                    .is_some_and(|old| {
                        old.operation_signatures().iter().any(|s| signatures.contains(s))
                    })
            });
            if !pulled_up {
                continue;
            }
            let names: Vec<String> = subclasses.iter().map(|c| c.qualified_name()).collect();
            let evidence = Evidence {
                class_before: String::new(),
                class_after: supertype_name.clone(),
                range_before: None,
                range_after: Some(class2.location.clone()),
                mappings: Vec::new(),
            };
            self.refactorings.push(match class2.kind {
                ClassKind::Interface => Refactoring::ExtractInterface {
                    extracted: supertype_name,
                    subclasses: names,
                    evidence,
                },
                _ => Refactoring::ExtractSuperclass {
                    extracted: supertype_name,
                    subclasses: names,
                    evidence,
                },
            });
        }
    }

    fn diff_class_annotations(&mut self, class1: &UmlClass, class2: &UmlClass) {
        let evidence = Evidence {
            class_before: class1.qualified_name(),
            class_after: class2.qualified_name(),
            range_before: Some(class1.location.clone()),
            range_after: Some(class2.location.clone()),
            mappings: Vec::new(),
        };
        for annotation in &class2.annotations {
            if !class1.annotations.contains(annotation) {
                self.refactorings.push(Refactoring::AddClassAnnotation {
                    class: class2.qualified_name(),
                    annotation: annotation.clone(),
                    evidence: evidence.clone(),
                });
            }
        }
        for annotation in &class1.annotations {
            if !class2.annotations.contains(annotation) {
                self.refactorings.push(Refactoring::RemoveClassAnnotation {
                    class: class2.qualified_name(),
                    annotation: annotation.clone(),
                    evidence: evidence.clone(),
                });
            }
        }
    }
}

/// Fraction of members (operation signatures plus attribute names) the two
/// classes share, over the larger member count.
fn member_match_ratio(class1: &UmlClass, class2: &UmlClass) -> f64 {
    let signatures1 = class1.operation_signatures();
    let signatures2 = class2.operation_signatures();
    let shared_operations = signatures1.iter().filter(|s| signatures2.contains(s)).count();
    let shared_attributes = class1
        .attributes
        .iter()
        .filter(|a| {
            class2
                .attributes
                .iter()
                .any(|b| b.name == a.name && b.type_name == a.type_name)
        })
        .count();
    let total1 = signatures1.len() + class1.attributes.len();
    let total2 = signatures2.len() + class2.attributes.len();
    let total = total1.max(total2);
    if total == 0 {
        return 0.0;
    }
    #[allow(clippy::cast_precision_loss)]
    {
        (shared_operations + shared_attributes) as f64 / total as f64
    }
}
