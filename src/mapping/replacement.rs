// src/mapping/replacement.rs
use serde::Serialize;

/// What kind of localized substitution explains a textual difference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum ReplacementKind {
    VariableName,
    Literal,
    TypeName,
    /// A whole method invocation swapped for another.
    MethodInvocation,
    /// An argument in the before-text became the return expression of the
    /// extracted method (`x` ↔ `return x;`).
    ArgumentWithReturnExpression,
    /// An infix operator or sub-expression change.
    Infix,
    /// A composite header guard change.
    Composite,
}

/// A typed, localized textual edit explaining a non-exact mapping.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Replacement {
    pub kind: ReplacementKind,
    pub before: String,
    pub after: String,
}

impl Replacement {
    #[must_use]
    pub fn new(kind: ReplacementKind, before: impl Into<String>, after: impl Into<String>) -> Self {
        Self { kind, before: before.into(), after: after.into() }
    }

    /// One side textually contains the other (a weak sign the edit is a
    /// refinement rather than an unrelated rewrite).
    #[must_use]
    pub fn one_side_contains_other(&self) -> bool {
        self.before.contains(&self.after) || self.after.contains(&self.before)
    }
}

/// Number of distinct replacement kinds in a set; the matcher minimizes
/// this before edit distance when breaking ties.
#[must_use]
pub fn distinct_kind_count(replacements: &[Replacement]) -> usize {
    let mut kinds: Vec<ReplacementKind> = replacements.iter().map(|r| r.kind).collect();
    kinds.sort_unstable();
    kinds.dedup();
    kinds.len()
}
