// src/mapping/matcher.rs
//! The replacement finder: decides whether two normalized statement texts
//! differ only by a set of typed, localized substitutions. A non-exact
//! mapping is produced only when the set fully explains the difference.

use crate::mapping::replacement::{Replacement, ReplacementKind};
use crate::model::invocation::extract_invocations;
use crate::model::text::{tokenize, Token, TokenKind};

/// Tries to explain `text1 -> text2`. Returns `Some(vec![])` for identical
/// texts, `Some(replacements)` when fully explained, `None` otherwise.
/// `None` is a NoMatch, never an error.
#[must_use]
pub fn find_replacements(text1: &str, text2: &str) -> Option<Vec<Replacement>> {
    if text1 == text2 {
        return Some(Vec::new());
    }
    if let Some(replacements) = aligned_token_replacements(text1, text2) {
        return Some(replacements);
    }
    if let Some(replacement) = invocation_swap(text1, text2) {
        return Some(vec![replacement]);
    }
    if let Some(replacement) = return_expression_substitution(text1, text2) {
        return Some(vec![replacement]);
    }
    None
}

/// Composite guards match when equal or when their difference is itself
/// replacement-explained; the latter is reported as one Composite edit.
#[must_use]
pub fn guard_replacements(guard1: &str, guard2: &str) -> Option<Vec<Replacement>> {
    if guard1 == guard2 {
        return Some(Vec::new());
    }
    find_replacements(guard1, guard2).map(|inner| {
        if inner.is_empty() {
            inner
        } else {
            vec![Replacement::new(ReplacementKind::Composite, guard1, guard2)]
        }
    })
}

/// Token streams of equal length whose mismatched pairs are all renameable
/// identifiers, literals of the same class, or operators.
fn aligned_token_replacements(text1: &str, text2: &str) -> Option<Vec<Replacement>> {
    let tokens1 = tokenize(text1);
    let tokens2 = tokenize(text2);
    if tokens1.len() != tokens2.len() || tokens1.is_empty() {
        return None;
    }
    let mut replacements = Vec::new();
    let mut mismatches = 0usize;
    for (i, (a, b)) in tokens1.iter().zip(&tokens2).enumerate() {
        if a.text == b.text {
            continue;
        }
        mismatches += 1;
        let call1 = tokens1.get(i + 1).is_some_and(|t| t.text == "(");
        let call2 = tokens2.get(i + 1).is_some_and(|t| t.text == "(");
        let kind = mismatch_kind(a, b, call1, call2)?;
        let replacement = Replacement::new(kind, &a.text, &b.text);
        if !replacements.contains(&replacement) {
            replacements.push(replacement);
        }
    }
    // An alignment rewriting most of the statement explains nothing.
    if mismatches == 0 || mismatches * 2 > tokens1.len() {
        return None;
    }
    Some(replacements)
}

/// `call1`/`call2` flag identifiers immediately followed by `(`: those are
/// call names, never variables, and a call-to-variable mismatch is not
/// explainable by token alignment at all.
fn mismatch_kind(a: &Token, b: &Token, call1: bool, call2: bool) -> Option<ReplacementKind> {
    match (a.kind, b.kind) {
        (TokenKind::Identifier, TokenKind::Identifier) => {
            if call1 != call2 {
                None
            } else if call1 {
                Some(ReplacementKind::MethodInvocation)
            } else if starts_uppercase(&a.text) && starts_uppercase(&b.text) {
                Some(ReplacementKind::TypeName)
            } else {
                Some(ReplacementKind::VariableName)
            }
        }
        (TokenKind::NumberLiteral, TokenKind::NumberLiteral)
        | (TokenKind::StringLiteral, TokenKind::StringLiteral)
        | (TokenKind::CharLiteral, TokenKind::CharLiteral) => Some(ReplacementKind::Literal),
        (TokenKind::Symbol, TokenKind::Symbol) => Some(ReplacementKind::Infix),
        _ => None,
    }
}

fn starts_uppercase(text: &str) -> bool {
    text.chars().next().is_some_and(char::is_uppercase)
}

/// A single whole-invocation swap: replacing one call text in `text1` with
/// one call text from `text2` makes the statements identical.
fn invocation_swap(text1: &str, text2: &str) -> Option<Replacement> {
    let invocations1 = extract_invocations(text1);
    let invocations2 = extract_invocations(text2);
    for inv1 in &invocations1 {
        let call1 = inv1.actual_string();
        if !text1.contains(&call1) {
            continue;
        }
        for inv2 in &invocations2 {
            let call2 = inv2.actual_string();
            if text1.replacen(&call1, &call2, 1) == *text2 {
                return Some(Replacement::new(ReplacementKind::MethodInvocation, call1, call2));
            }
        }
    }
    None
}

/// `x;` ↔ `return x;` in either direction, the signature of an argument
/// turned into the extracted method's return expression.
fn return_expression_substitution(text1: &str, text2: &str) -> Option<Replacement> {
    let stripped1 = text1.trim_end_matches(';');
    let stripped2 = text2.trim_end_matches(';');
    let returned2 = stripped2.strip_prefix("return ");
    if returned2 == Some(stripped1) {
        return Some(Replacement::new(
            ReplacementKind::ArgumentWithReturnExpression,
            text1,
            text2,
        ));
    }
    let returned1 = stripped1.strip_prefix("return ");
    if returned1 == Some(stripped2) {
        return Some(Replacement::new(
            ReplacementKind::ArgumentWithReturnExpression,
            text1,
            text2,
        ));
    }
    None
}

/// Applies a parameter-to-argument substitution to a statement text,
/// replacing whole identifier tokens only.
#[must_use]
pub fn substitute_identifiers(text: &str, map: &[(String, String)]) -> String {
    if map.is_empty() {
        return text.to_owned();
    }
    let tokens = tokenize(text);
    let mut out = String::with_capacity(text.len());
    let mut cursor = 0usize;
    for token in &tokens {
        let Some(position) = text[cursor..].find(&token.text) else {
            continue;
        };
        let start = cursor + position;
        out.push_str(&text[cursor..start]);
        let substituted = if token.kind == TokenKind::Identifier {
            map.iter()
                .find(|(from, _)| *from == token.text)
                .map(|(_, to)| to.as_str())
        } else {
            None
        };
        out.push_str(substituted.unwrap_or(&token.text));
        cursor = start + token.text.len();
    }
    out.push_str(&text[cursor..]);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identical_texts_are_exact() {
        assert_eq!(find_replacements("a();", "a();"), Some(Vec::new()));
    }

    #[test]
    fn variable_rename() {
        let replacements = find_replacements("return x + 1;", "return y + 1;").unwrap();
        assert_eq!(replacements.len(), 1);
        assert_eq!(replacements[0].kind, ReplacementKind::VariableName);
        assert_eq!(replacements[0].before, "x");
        assert_eq!(replacements[0].after, "y");
    }

    #[test]
    fn literal_change() {
        let replacements = find_replacements("sleep(100);", "sleep(250);").unwrap();
        assert_eq!(replacements[0].kind, ReplacementKind::Literal);
    }

    #[test]
    fn type_change() {
        let replacements =
            find_replacements("List items = load();", "Collection items = load();").unwrap();
        assert_eq!(replacements[0].kind, ReplacementKind::TypeName);
    }

    #[test]
    fn call_rename_is_an_invocation_replacement() {
        // same arity, so the streams align; the changed token is a call
        // name, not a variable
        let replacements = find_replacements("save(x);", "helper(x);").unwrap();
        assert_eq!(replacements.len(), 1);
        assert_eq!(replacements[0].kind, ReplacementKind::MethodInvocation);
        assert_eq!(replacements[0].before, "save");
        assert_eq!(replacements[0].after, "helper");
    }

    #[test]
    fn call_name_never_aligns_with_a_variable() {
        // `f` is a call name on one side, `g` a plain operand on the other
        assert_eq!(find_replacements("f(a) + g;", "g + f(a);"), None);
    }

    #[test]
    fn invocation_swap_detected() {
        let replacements = find_replacements("int x = a(1);", "int x = helper(1, 2);").unwrap();
        assert_eq!(replacements.len(), 1);
        assert_eq!(replacements[0].kind, ReplacementKind::MethodInvocation);
    }

    #[test]
    fn unrelated_statements_do_not_match() {
        assert_eq!(find_replacements("open(file);", "int limit = 3;"), None);
    }

    #[test]
    fn mostly_rewritten_statement_is_rejected() {
        assert_eq!(find_replacements("a b;", "c d;"), None);
    }

    #[test]
    fn return_substitution() {
        let replacements = find_replacements("total;", "return total;").unwrap();
        assert_eq!(replacements[0].kind, ReplacementKind::ArgumentWithReturnExpression);
    }

    #[test]
    fn substitution_replaces_whole_tokens_only() {
        let map = vec![("x".to_owned(), "value".to_owned())];
        assert_eq!(substitute_identifiers("max(x, xs);", &map), "max(value, xs);");
    }
}
