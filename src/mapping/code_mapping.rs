// src/mapping/code_mapping.rs
use crate::mapping::replacement::{distinct_kind_count, Replacement, ReplacementKind};
use crate::model::{CodeRange, FragmentId};
use serde::Serialize;

/// A matched (before-fragment, after-fragment) pair plus the replacement
/// set explaining any textual difference.
///
/// Within one mapper a fragment id from either side appears in at most one
/// mapping; the mapper enforces this during matching and the duplicate
/// resolver re-establishes it across mappers.
#[derive(Debug, Clone, Serialize)]
pub struct CodeMapping {
    pub fragment1: FragmentId,
    pub fragment2: FragmentId,
    /// Snapshot of the matched texts, kept for evidence and for cross-mapper
    /// comparisons after the owning bodies go out of scope.
    pub text1: String,
    pub text2: String,
    pub range1: CodeRange,
    pub range2: CodeRange,
    pub replacements: Vec<Replacement>,
    pub edit_distance: usize,
    /// True when both fragments are composite headers.
    pub composite: bool,
}

impl CodeMapping {
    /// Exact means the replacement set is empty: identical normalized text.
    #[must_use]
    pub fn is_exact(&self) -> bool {
        self.replacements.is_empty()
    }

    #[must_use]
    pub fn contains_replacement(&self, kind: ReplacementKind) -> bool {
        self.replacements.iter().any(|r| r.kind == kind)
    }

    #[must_use]
    pub fn distinct_replacement_kinds(&self) -> usize {
        distinct_kind_count(&self.replacements)
    }

    #[must_use]
    pub fn involves_method_invocation(&self) -> bool {
        self.contains_replacement(ReplacementKind::MethodInvocation)
    }
}
