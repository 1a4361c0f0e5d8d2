// src/refactoring.rs
//! The result catalog: one tagged union covering the detected refactoring
//! kinds. Every instance carries enough evidence (statement pairs plus
//! before/after ranges and the touched classes) for a downstream consumer
//! to recompute "why" deterministically and deduplicate across detectors.

use crate::mapping::CodeMapping;
use crate::model::CodeRange;
use serde::Serialize;

/// One matched statement pair, snapshotted as evidence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MappingEvidence {
    pub text_before: String,
    pub text_after: String,
    pub range_before: CodeRange,
    pub range_after: CodeRange,
    pub exact: bool,
}

impl MappingEvidence {
    #[must_use]
    pub fn from_mapping(mapping: &CodeMapping) -> Self {
        Self {
            text_before: mapping.text1.clone(),
            text_after: mapping.text2.clone(),
            range_before: mapping.range1.clone(),
            range_after: mapping.range2.clone(),
            exact: mapping.is_exact(),
        }
    }
}

/// Evidence common to every refactoring kind.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Evidence {
    pub class_before: String,
    pub class_after: String,
    pub range_before: Option<CodeRange>,
    pub range_after: Option<CodeRange>,
    pub mappings: Vec<MappingEvidence>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Refactoring {
    // --- operations ---------------------------------------------------
    RenameOperation { before: String, after: String, evidence: Evidence },
    MoveOperation { signature: String, evidence: Evidence },
    MoveAndRenameOperation { before: String, after: String, evidence: Evidence },
    ExtractOperation { extracted: String, source: String, nested: bool, evidence: Evidence },
    ExtractAndMoveOperation { extracted: String, source: String, evidence: Evidence },
    InlineOperation { inlined: String, target: String, nested: bool, evidence: Evidence },
    MoveAndInlineOperation { inlined: String, target: String, evidence: Evidence },
    MergeOperation { merged: Vec<String>, target: String, evidence: Evidence },
    SplitOperation { source: String, split: Vec<String>, evidence: Evidence },
    AddParameter { operation: String, parameter: String, evidence: Evidence },
    RemoveParameter { operation: String, parameter: String, evidence: Evidence },
    ReorderParameters { operation: String, evidence: Evidence },
    ChangeParameterType { operation: String, before: String, after: String, evidence: Evidence },
    ChangeReturnType { operation: String, before: String, after: String, evidence: Evidence },
    AddMethodAnnotation { operation: String, annotation: String, evidence: Evidence },
    RemoveMethodAnnotation { operation: String, annotation: String, evidence: Evidence },
    ModifyMethodAnnotation { operation: String, before: String, after: String, evidence: Evidence },
    AddMethodModifier { operation: String, modifier: String, evidence: Evidence },
    RemoveMethodModifier { operation: String, modifier: String, evidence: Evidence },
    ChangeOperationVisibility { operation: String, before: String, after: String, evidence: Evidence },

    // --- variables ----------------------------------------------------
    RenameVariable { operation: String, before: String, after: String, evidence: Evidence },
    RenameParameter { operation: String, before: String, after: String, evidence: Evidence },
    ChangeVariableType { operation: String, variable: String, before: String, after: String, evidence: Evidence },
    ExtractVariable { operation: String, variable: String, evidence: Evidence },
    InlineVariable { operation: String, variable: String, evidence: Evidence },
    MergeVariable { operation: String, merged: Vec<String>, target: String, evidence: Evidence },
    SplitVariable { operation: String, source: String, split: Vec<String>, evidence: Evidence },

    // --- attributes ---------------------------------------------------
    RenameAttribute { before: String, after: String, evidence: Evidence },
    MoveAttribute { attribute: String, evidence: Evidence },
    ChangeAttributeType { attribute: String, before: String, after: String, evidence: Evidence },
    AddAttributeAnnotation { attribute: String, annotation: String, evidence: Evidence },
    RemoveAttributeAnnotation { attribute: String, annotation: String, evidence: Evidence },
    AddAttributeModifier { attribute: String, modifier: String, evidence: Evidence },
    RemoveAttributeModifier { attribute: String, modifier: String, evidence: Evidence },

    // --- classes ------------------------------------------------------
    RenameClass { before: String, after: String, evidence: Evidence },
    MoveClass { before: String, after: String, evidence: Evidence },
    MoveAndRenameClass { before: String, after: String, evidence: Evidence },
    ExtractSuperclass { extracted: String, subclasses: Vec<String>, evidence: Evidence },
    ExtractInterface { extracted: String, subclasses: Vec<String>, evidence: Evidence },
    AddClassAnnotation { class: String, annotation: String, evidence: Evidence },
    RemoveClassAnnotation { class: String, annotation: String, evidence: Evidence },

    // --- packages -----------------------------------------------------
    RenamePackage { before: String, after: String, evidence: Evidence },
    MovePackage { before: String, after: String, evidence: Evidence },
}

impl Refactoring {
    /// Stable display name, usable as a deduplication key together with
    /// the evidence ranges.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Refactoring::RenameOperation { .. } => "Rename Method",
            Refactoring::MoveOperation { .. } => "Move Method",
            Refactoring::MoveAndRenameOperation { .. } => "Move And Rename Method",
            Refactoring::ExtractOperation { .. } => "Extract Method",
            Refactoring::ExtractAndMoveOperation { .. } => "Extract And Move Method",
            Refactoring::InlineOperation { .. } => "Inline Method",
            Refactoring::MoveAndInlineOperation { .. } => "Move And Inline Method",
            Refactoring::MergeOperation { .. } => "Merge Method",
            Refactoring::SplitOperation { .. } => "Split Method",
            Refactoring::AddParameter { .. } => "Add Parameter",
            Refactoring::RemoveParameter { .. } => "Remove Parameter",
            Refactoring::ReorderParameters { .. } => "Reorder Parameters",
            Refactoring::ChangeParameterType { .. } => "Change Parameter Type",
            Refactoring::ChangeReturnType { .. } => "Change Return Type",
            Refactoring::AddMethodAnnotation { .. } => "Add Method Annotation",
            Refactoring::RemoveMethodAnnotation { .. } => "Remove Method Annotation",
            Refactoring::ModifyMethodAnnotation { .. } => "Modify Method Annotation",
            Refactoring::AddMethodModifier { .. } => "Add Method Modifier",
            Refactoring::RemoveMethodModifier { .. } => "Remove Method Modifier",
            Refactoring::ChangeOperationVisibility { .. } => "Change Method Access Modifier",
            Refactoring::RenameVariable { .. } => "Rename Variable",
            Refactoring::RenameParameter { .. } => "Rename Parameter",
            Refactoring::ChangeVariableType { .. } => "Change Variable Type",
            Refactoring::ExtractVariable { .. } => "Extract Variable",
            Refactoring::InlineVariable { .. } => "Inline Variable",
            Refactoring::MergeVariable { .. } => "Merge Variable",
            Refactoring::SplitVariable { .. } => "Split Variable",
            Refactoring::RenameAttribute { .. } => "Rename Attribute",
            Refactoring::MoveAttribute { .. } => "Move Attribute",
            Refactoring::ChangeAttributeType { .. } => "Change Attribute Type",
            Refactoring::AddAttributeAnnotation { .. } => "Add Attribute Annotation",
            Refactoring::RemoveAttributeAnnotation { .. } => "Remove Attribute Annotation",
            Refactoring::AddAttributeModifier { .. } => "Add Attribute Modifier",
            Refactoring::RemoveAttributeModifier { .. } => "Remove Attribute Modifier",
            Refactoring::RenameClass { .. } => "Rename Class",
            Refactoring::MoveClass { .. } => "Move Class",
            Refactoring::MoveAndRenameClass { .. } => "Move And Rename Class",
            Refactoring::ExtractSuperclass { .. } => "Extract Superclass",
            Refactoring::ExtractInterface { .. } => "Extract Interface",
            Refactoring::AddClassAnnotation { .. } => "Add Class Annotation",
            Refactoring::RemoveClassAnnotation { .. } => "Remove Class Annotation",
            Refactoring::RenamePackage { .. } => "Rename Package",
            Refactoring::MovePackage { .. } => "Move Package",
        }
    }

    #[must_use]
    pub fn evidence(&self) -> &Evidence {
        match self {
            Refactoring::RenameOperation { evidence, .. }
            | Refactoring::MoveOperation { evidence, .. }
            | Refactoring::MoveAndRenameOperation { evidence, .. }
            | Refactoring::ExtractOperation { evidence, .. }
            | Refactoring::ExtractAndMoveOperation { evidence, .. }
            | Refactoring::InlineOperation { evidence, .. }
            | Refactoring::MoveAndInlineOperation { evidence, .. }
            | Refactoring::MergeOperation { evidence, .. }
            | Refactoring::SplitOperation { evidence, .. }
            | Refactoring::AddParameter { evidence, .. }
            | Refactoring::RemoveParameter { evidence, .. }
            | Refactoring::ReorderParameters { evidence, .. }
            | Refactoring::ChangeParameterType { evidence, .. }
            | Refactoring::ChangeReturnType { evidence, .. }
            | Refactoring::AddMethodAnnotation { evidence, .. }
            | Refactoring::RemoveMethodAnnotation { evidence, .. }
            | Refactoring::ModifyMethodAnnotation { evidence, .. }
            | Refactoring::AddMethodModifier { evidence, .. }
            | Refactoring::RemoveMethodModifier { evidence, .. }
            | Refactoring::ChangeOperationVisibility { evidence, .. }
            | Refactoring::RenameVariable { evidence, .. }
            | Refactoring::RenameParameter { evidence, .. }
            | Refactoring::ChangeVariableType { evidence, .. }
            | Refactoring::ExtractVariable { evidence, .. }
            | Refactoring::InlineVariable { evidence, .. }
            | Refactoring::MergeVariable { evidence, .. }
            | Refactoring::SplitVariable { evidence, .. }
            | Refactoring::RenameAttribute { evidence, .. }
            | Refactoring::MoveAttribute { evidence, .. }
            | Refactoring::ChangeAttributeType { evidence, .. }
            | Refactoring::AddAttributeAnnotation { evidence, .. }
            | Refactoring::RemoveAttributeAnnotation { evidence, .. }
            | Refactoring::AddAttributeModifier { evidence, .. }
            | Refactoring::RemoveAttributeModifier { evidence, .. }
            | Refactoring::RenameClass { evidence, .. }
            | Refactoring::MoveClass { evidence, .. }
            | Refactoring::MoveAndRenameClass { evidence, .. }
            | Refactoring::ExtractSuperclass { evidence, .. }
            | Refactoring::ExtractInterface { evidence, .. }
            | Refactoring::AddClassAnnotation { evidence, .. }
            | Refactoring::RemoveClassAnnotation { evidence, .. }
            | Refactoring::RenamePackage { evidence, .. }
            | Refactoring::MovePackage { evidence, .. } => evidence,
        }
    }

    pub(crate) fn evidence_mut(&mut self) -> &mut Evidence {
        match self {
            Refactoring::RenameOperation { evidence, .. }
            | Refactoring::MoveOperation { evidence, .. }
            | Refactoring::MoveAndRenameOperation { evidence, .. }
            | Refactoring::ExtractOperation { evidence, .. }
            | Refactoring::ExtractAndMoveOperation { evidence, .. }
            | Refactoring::InlineOperation { evidence, .. }
            | Refactoring::MoveAndInlineOperation { evidence, .. }
            | Refactoring::MergeOperation { evidence, .. }
            | Refactoring::SplitOperation { evidence, .. }
            | Refactoring::AddParameter { evidence, .. }
            | Refactoring::RemoveParameter { evidence, .. }
            | Refactoring::ReorderParameters { evidence, .. }
            | Refactoring::ChangeParameterType { evidence, .. }
            | Refactoring::ChangeReturnType { evidence, .. }
            | Refactoring::AddMethodAnnotation { evidence, .. }
            | Refactoring::RemoveMethodAnnotation { evidence, .. }
            | Refactoring::ModifyMethodAnnotation { evidence, .. }
            | Refactoring::AddMethodModifier { evidence, .. }
            | Refactoring::RemoveMethodModifier { evidence, .. }
            | Refactoring::ChangeOperationVisibility { evidence, .. }
            | Refactoring::RenameVariable { evidence, .. }
            | Refactoring::RenameParameter { evidence, .. }
            | Refactoring::ChangeVariableType { evidence, .. }
            | Refactoring::ExtractVariable { evidence, .. }
            | Refactoring::InlineVariable { evidence, .. }
            | Refactoring::MergeVariable { evidence, .. }
            | Refactoring::SplitVariable { evidence, .. }
            | Refactoring::RenameAttribute { evidence, .. }
            | Refactoring::MoveAttribute { evidence, .. }
            | Refactoring::ChangeAttributeType { evidence, .. }
            | Refactoring::AddAttributeAnnotation { evidence, .. }
            | Refactoring::RemoveAttributeAnnotation { evidence, .. }
            | Refactoring::AddAttributeModifier { evidence, .. }
            | Refactoring::RemoveAttributeModifier { evidence, .. }
            | Refactoring::RenameClass { evidence, .. }
            | Refactoring::MoveClass { evidence, .. }
            | Refactoring::MoveAndRenameClass { evidence, .. }
            | Refactoring::ExtractSuperclass { evidence, .. }
            | Refactoring::ExtractInterface { evidence, .. }
            | Refactoring::AddClassAnnotation { evidence, .. }
            | Refactoring::RemoveClassAnnotation { evidence, .. }
            | Refactoring::RenamePackage { evidence, .. }
            | Refactoring::MovePackage { evidence, .. } => evidence,
        }
    }
}

impl std::fmt::Display for Refactoring {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.kind())?;
        match self {
            Refactoring::RenameOperation { before, after, .. }
            | Refactoring::RenameClass { before, after, .. }
            | Refactoring::RenameAttribute { before, after, .. } => {
                write!(f, " {before} -> {after}")
            }
            Refactoring::ExtractOperation { extracted, source, .. } => {
                write!(f, " {extracted} extracted from {source}")
            }
            Refactoring::InlineOperation { inlined, target, .. } => {
                write!(f, " {inlined} inlined to {target}")
            }
            _ => Ok(()),
        }
    }
}
