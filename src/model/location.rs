// src/model/location.rs
use serde::Serialize;

/// Source span of a model element (file plus line/column range).
///
/// Ranges participate in fragment identity: two fragments with equal text
/// but different ranges are distinct diff units.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct CodeRange {
    pub file: String,
    pub start_line: u32,
    pub start_column: u32,
    pub end_line: u32,
    pub end_column: u32,
}

impl CodeRange {
    #[must_use]
    pub fn new(file: impl Into<String>, start_line: u32, end_line: u32) -> Self {
        Self {
            file: file.into(),
            start_line,
            start_column: 0,
            end_line,
            end_column: 0,
        }
    }

    /// Single-line range, the common case for leaf statements.
    #[must_use]
    pub fn line(file: impl Into<String>, line: u32) -> Self {
        Self::new(file, line, line)
    }

    /// True if `other` lies entirely within this range.
    #[must_use]
    pub fn subsumes(&self, other: &CodeRange) -> bool {
        self.file == other.file
            && self.start_line <= other.start_line
            && self.end_line >= other.end_line
    }
}

impl std::fmt::Display for CodeRange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.start_line == self.end_line {
            write!(f, "{}:{}", self.file, self.start_line)
        } else {
            write!(f, "{}:{}-{}", self.file, self.start_line, self.end_line)
        }
    }
}
