// src/model/fragment.rs
//! Statement trees. A [`Body`] owns its fragments in a flat preorder
//! vector; everything else refers to them by [`FragmentId`]. Fragments are
//! immutable once the body is built.

use crate::model::invocation::{extract_invocations, Invocation};
use crate::model::location::CodeRange;
use crate::model::text::{normalize, referenced_identifiers};
use regex::Regex;
use serde::Serialize;
use std::sync::LazyLock;

static DECLARATION_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^(?:final\s+)?([A-Za-z_][A-Za-z0-9_.<>\[\], ]*?)\s+([a-z_][A-Za-z0-9_]*)\s*(?:=\s*(.*?))?\s*;$",
    )
    .unwrap()
});

/// Index of a fragment within its owning [`Body`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct FragmentId(pub usize);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum FragmentKind {
    /// Leaf statement.
    Statement,
    Block,
    If,
    Else,
    For,
    While,
    DoWhile,
    Try,
    Catch,
    Finally,
    Switch,
    Synchronized,
}

impl FragmentKind {
    #[must_use]
    pub fn is_composite(self) -> bool {
        self != FragmentKind::Statement
    }
}

/// A local variable declared by a leaf statement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VariableDeclaration {
    pub name: String,
    pub type_name: String,
    pub initializer: Option<String>,
}

/// One statement (leaf) or composite block, the unit of diffing.
#[derive(Debug, Clone, Serialize)]
pub struct Fragment {
    pub kind: FragmentKind,
    /// Normalized text. For composites this is the header (`if (x > 0)`);
    /// bare blocks are `{`.
    pub text: String,
    /// Guard expression of a composite header, if any.
    pub expression: Option<String>,
    pub location: CodeRange,
    pub parent: Option<FragmentId>,
    pub children: Vec<FragmentId>,
    /// Document-order position among the body's fragments.
    pub index: usize,
    pub depth: usize,
    pub invocations: Vec<Invocation>,
    pub variables: Vec<String>,
    pub declared_variables: Vec<VariableDeclaration>,
}

impl Fragment {
    /// Bare block markers are structural glue, not countable statements.
    #[must_use]
    pub fn countable(&self) -> bool {
        self.text != "{"
    }

    #[must_use]
    pub fn is_leaf(&self) -> bool {
        self.kind == FragmentKind::Statement
    }

    #[must_use]
    pub fn throws_new_exception(&self) -> bool {
        self.text.starts_with("throw new ")
    }

    /// The invocation covering the entire fragment, if the statement is
    /// nothing but one call (possibly `return`ed or assigned).
    #[must_use]
    pub fn invocation_covering_entire_fragment(&self) -> Option<&Invocation> {
        let invocation = self.invocations.first()?;
        let call = invocation.actual_string();
        let stripped = self.text.trim_end_matches(';');
        let covered = stripped == call
            || stripped == format!("return {call}")
            || self
                .declared_variables
                .first()
                .and_then(|d| d.initializer.as_deref())
                .is_some_and(|init| init == call);
        covered.then_some(invocation)
    }
}

/// An ordered statement tree. Fragment 0 is the root block.
#[derive(Debug, Clone, Serialize)]
pub struct Body {
    fragments: Vec<Fragment>,
}

impl Body {
    #[must_use]
    pub fn fragment(&self, id: FragmentId) -> &Fragment {
        &self.fragments[id.0]
    }

    #[must_use]
    pub fn root(&self) -> FragmentId {
        FragmentId(0)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.fragments.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fragments.is_empty()
    }

    /// Leaf fragments in document order.
    #[must_use]
    pub fn leaves(&self) -> Vec<FragmentId> {
        self.ids().filter(|id| self.fragment(*id).is_leaf()).collect()
    }

    /// Composite fragments in document order, root block included.
    #[must_use]
    pub fn inner_nodes(&self) -> Vec<FragmentId> {
        self.ids()
            .filter(|id| self.fragment(*id).kind.is_composite())
            .collect()
    }

    pub fn ids(&self) -> impl Iterator<Item = FragmentId> + '_ {
        (0..self.fragments.len()).map(FragmentId)
    }

    /// True if `id` is a (transitive) child of `ancestor`.
    #[must_use]
    pub fn is_descendant_of(&self, id: FragmentId, ancestor: FragmentId) -> bool {
        let mut current = self.fragment(id).parent;
        while let Some(parent) = current {
            if parent == ancestor {
                return true;
            }
            current = self.fragment(parent).parent;
        }
        false
    }

    /// Every invocation in the body, document order, nested ones included.
    #[must_use]
    pub fn all_invocations(&self) -> Vec<&Invocation> {
        self.fragments.iter().flat_map(|f| f.invocations.iter()).collect()
    }

    /// Countable statements on one side of the accounting identity.
    #[must_use]
    pub fn countable_statements(&self) -> usize {
        self.fragments.iter().filter(|f| f.countable()).count()
    }
}

/// Builds a [`Body`] statement by statement. Supplied by the upstream
/// model builder; line numbers auto-increment unless pinned.
#[derive(Debug)]
pub struct BodyBuilder {
    fragments: Vec<Fragment>,
    stack: Vec<FragmentId>,
    file: String,
    next_line: u32,
}

impl BodyBuilder {
    #[must_use]
    pub fn new(file: impl Into<String>, start_line: u32) -> Self {
        let file = file.into();
        let root = Fragment {
            kind: FragmentKind::Block,
            text: "{".to_owned(),
            expression: None,
            location: CodeRange::line(file.clone(), start_line),
            parent: None,
            children: Vec::new(),
            index: 0,
            depth: 0,
            invocations: Vec::new(),
            variables: Vec::new(),
            declared_variables: Vec::new(),
        };
        Self {
            fragments: vec![root],
            stack: vec![FragmentId(0)],
            file,
            next_line: start_line + 1,
        }
    }

    /// Appends a leaf statement under the currently open composite.
    pub fn leaf(&mut self, text: &str) -> &mut Self {
        let text = normalize(text);
        let declared = parse_declaration(&text);
        let fragment = Fragment {
            kind: FragmentKind::Statement,
            invocations: extract_invocations(&text),
            variables: referenced_identifiers(&text),
            declared_variables: declared.into_iter().collect(),
            expression: None,
            location: self.bump_line(),
            parent: self.stack.last().copied(),
            children: Vec::new(),
            index: self.fragments.len(),
            depth: self.stack.len(),
            text,
        };
        self.push(fragment);
        self
    }

    /// Opens a composite with a header like `if (x > 0)`; statements added
    /// until the matching [`close`](Self::close) become its children.
    pub fn open(&mut self, kind: FragmentKind, header: &str) -> &mut Self {
        debug_assert!(kind.is_composite());
        let text = normalize(header);
        let expression = guard_expression(&text);
        let fragment = Fragment {
            kind,
            invocations: extract_invocations(&text),
            variables: referenced_identifiers(&text),
            declared_variables: Vec::new(),
            expression,
            location: self.bump_line(),
            parent: self.stack.last().copied(),
            children: Vec::new(),
            index: self.fragments.len(),
            depth: self.stack.len(),
            text,
        };
        let id = self.push(fragment);
        self.stack.push(id);
        self
    }

    pub fn close(&mut self) -> &mut Self {
        debug_assert!(self.stack.len() > 1, "close() without matching open()");
        self.stack.pop();
        self
    }

    #[must_use]
    pub fn build(self) -> Body {
        Body { fragments: self.fragments }
    }

    fn push(&mut self, fragment: Fragment) -> FragmentId {
        let id = FragmentId(self.fragments.len());
        if let Some(parent) = fragment.parent {
            self.fragments[parent.0].children.push(id);
        }
        self.fragments.push(fragment);
        id
    }

    fn bump_line(&mut self) -> CodeRange {
        let range = CodeRange::line(self.file.clone(), self.next_line);
        self.next_line += 1;
        range
    }
}

/// `Type name = init;` or `Type name;` on a leaf statement.
fn parse_declaration(text: &str) -> Option<VariableDeclaration> {
    let captures = DECLARATION_RE.captures(text)?;
    let type_name = captures.get(1)?.as_str().trim().to_owned();
    if crate::model::text::tokenize(&type_name)
        .iter()
        .any(|t| t.kind == crate::model::text::TokenKind::Keyword)
    {
        return None;
    }
    Some(VariableDeclaration {
        name: captures.get(2)?.as_str().to_owned(),
        type_name,
        initializer: captures.get(3).map(|m| m.as_str().to_owned()),
    })
}

/// Extracts `x > 0` from `if (x > 0)`, `while (x > 0)`, etc.
fn guard_expression(header: &str) -> Option<String> {
    let open = header.find('(')?;
    let close = header.rfind(')')?;
    if close <= open {
        return None;
    }
    Some(header[open + 1..close].trim().to_owned())
}
