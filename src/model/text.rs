// src/model/text.rs
//! Statement-text utilities shared by the model builders and the matcher:
//! normalization, tokenization, and string distance.

use regex::Regex;
use std::sync::LazyLock;

static WHITESPACE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").unwrap());

static TOKEN_RE: LazyLock<Regex> = LazyLock::new(|| {
    // identifiers, string/char literals, numbers, then any single symbol
    Regex::new(r#"[A-Za-z_][A-Za-z0-9_]*|"(?:[^"\\]|\\.)*"|'(?:[^'\\]|\\.)'|\d+(?:\.\d+)?[fFlL]?|\S"#)
        .unwrap()
});

static IDENTIFIER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").unwrap());

const KEYWORDS: &[&str] = &[
    "if", "else", "for", "while", "do", "try", "catch", "finally", "switch", "case", "default",
    "return", "throw", "new", "this", "super", "null", "true", "false", "break", "continue",
    "instanceof", "synchronized", "final", "static", "public", "private", "protected", "void",
];

/// Collapses runs of whitespace to a single space and trims. All fragment
/// texts are stored in this form; the matcher never sees raw source text.
#[must_use]
pub fn normalize(text: &str) -> String {
    WHITESPACE_RE.replace_all(text.trim(), " ").into_owned()
}

/// Lexical token classes coarse enough for replacement typing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    Identifier,
    StringLiteral,
    NumberLiteral,
    CharLiteral,
    Keyword,
    Symbol,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub text: String,
    pub kind: TokenKind,
}

#[must_use]
pub fn tokenize(text: &str) -> Vec<Token> {
    TOKEN_RE
        .find_iter(text)
        .map(|m| {
            let t = m.as_str();
            let kind = classify(t);
            Token { text: t.to_owned(), kind }
        })
        .collect()
}

fn classify(token: &str) -> TokenKind {
    if KEYWORDS.contains(&token) {
        TokenKind::Keyword
    } else if token.starts_with('"') {
        TokenKind::StringLiteral
    } else if token.starts_with('\'') {
        TokenKind::CharLiteral
    } else if token.starts_with(|c: char| c.is_ascii_digit()) {
        TokenKind::NumberLiteral
    } else if IDENTIFIER_RE.is_match(token) {
        TokenKind::Identifier
    } else {
        TokenKind::Symbol
    }
}

/// Identifiers referenced by a statement, excluding keywords and excluding
/// names immediately followed by `(` (those are call names, not variables).
#[must_use]
pub fn referenced_identifiers(text: &str) -> Vec<String> {
    let tokens = tokenize(text);
    let mut out = Vec::new();
    for (i, token) in tokens.iter().enumerate() {
        if token.kind != TokenKind::Identifier {
            continue;
        }
        let next_is_call = tokens.get(i + 1).is_some_and(|n| n.text == "(");
        if !next_is_call && !out.contains(&token.text) {
            out.push(token.text.clone());
        }
    }
    out
}

/// Classic Levenshtein distance over characters.
#[must_use]
pub fn edit_distance(a: &str, b: &str) -> usize {
    if a == b {
        return 0;
    }
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    if a.is_empty() {
        return b.len();
    }
    if b.is_empty() {
        return a.len();
    }
    let mut prev: Vec<usize> = (0..=b.len()).collect();
    let mut curr = vec![0usize; b.len() + 1];
    for (i, ca) in a.iter().enumerate() {
        curr[0] = i + 1;
        for (j, cb) in b.iter().enumerate() {
            let cost = usize::from(ca != cb);
            curr[j + 1] = (prev[j + 1] + 1).min(curr[j] + 1).min(prev[j] + cost);
        }
        std::mem::swap(&mut prev, &mut curr);
    }
    prev[b.len()]
}

/// Edit distance scaled to `[0, 1]` by the longer string's length.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn normalized_distance(a: &str, b: &str) -> f64 {
    let longest = a.chars().count().max(b.chars().count());
    if longest == 0 {
        return 0.0;
    }
    edit_distance(a, b) as f64 / longest as f64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_collapses_whitespace() {
        assert_eq!(normalize("  int  x =\n 1 ; "), "int x = 1 ;");
    }

    #[test]
    fn tokenize_classifies() {
        let tokens = tokenize("return name + \"x\" + 42;");
        let kinds: Vec<TokenKind> = tokens.iter().map(|t| t.kind).collect();
        assert_eq!(
            kinds,
            vec![
                TokenKind::Keyword,
                TokenKind::Identifier,
                TokenKind::Symbol,
                TokenKind::StringLiteral,
                TokenKind::Symbol,
                TokenKind::NumberLiteral,
                TokenKind::Symbol,
            ]
        );
    }

    #[test]
    fn referenced_identifiers_skip_call_names() {
        let ids = referenced_identifiers("foo(bar, baz.qux());");
        assert_eq!(ids, vec!["bar".to_owned(), "baz".to_owned()]);
    }

    #[test]
    fn edit_distance_basics() {
        assert_eq!(edit_distance("kitten", "sitting"), 3);
        assert_eq!(edit_distance("", "abc"), 3);
        assert_eq!(edit_distance("same", "same"), 0);
    }

    #[test]
    fn normalized_distance_bounds() {
        assert_eq!(normalized_distance("", ""), 0.0);
        assert!((normalized_distance("abcd", "wxyz") - 1.0).abs() < f64::EPSILON);
    }
}
