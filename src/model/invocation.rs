// src/model/invocation.rs
//! Method invocations referenced by a statement, derived from its
//! normalized text. This is the normalization the matcher needs (call
//! names, receivers, argument shapes), not source parsing.

use crate::model::operation::Operation;
use regex::Regex;
use serde::Serialize;
use std::sync::LazyLock;

static CALL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"([A-Za-z_][A-Za-z0-9_]*)\s*\(").unwrap());

/// Control-flow keywords followed by parentheses that are not calls.
const NON_CALL_KEYWORDS: &[&str] = &[
    "if", "for", "while", "switch", "catch", "synchronized", "return", "throw", "new", "assert",
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Invocation {
    pub name: String,
    /// Receiver expression (`this`, a variable, or a dotted chain), if any.
    pub receiver: Option<String>,
    pub arguments: Vec<String>,
    /// Byte offset of the call name within the owning statement text.
    /// Distinguishes repeated calls to the same method in one statement.
    pub offset: usize,
}

impl Invocation {
    /// Name + argument/parameter shape compatibility, including a trailing
    /// varargs parameter for which zero or more arguments may be passed.
    #[must_use]
    pub fn matches_operation(&self, operation: &Operation) -> bool {
        if self.name != operation.name {
            return false;
        }
        let params = &operation.parameters;
        if self.arguments.len() == params.len() {
            return true;
        }
        if let Some(last) = params.last() {
            if last.varargs && self.arguments.len() >= params.len() - 1 {
                return true;
            }
        }
        false
    }

    /// The call rendered back to text, receiver included.
    #[must_use]
    pub fn actual_string(&self) -> String {
        let args = self.arguments.join(", ");
        match &self.receiver {
            Some(receiver) => format!("{}.{}({})", receiver, self.name, args),
            None => format!("{}({})", self.name, args),
        }
    }
}

/// Scans a normalized statement text for invocations, nested ones included.
#[must_use]
pub fn extract_invocations(text: &str) -> Vec<Invocation> {
    let mut out = Vec::new();
    for captures in CALL_RE.captures_iter(text) {
        let name_match = captures.get(1).expect("group 1 always present");
        let name = name_match.as_str();
        if NON_CALL_KEYWORDS.contains(&name) {
            continue;
        }
        let open = match text[name_match.end()..].find('(') {
            Some(i) => name_match.end() + i,
            None => continue,
        };
        let Some(close) = matching_paren(text, open) else {
            continue;
        };
        let arguments = split_arguments(&text[open + 1..close]);
        let receiver = receiver_before(text, name_match.start());
        out.push(Invocation {
            name: name.to_owned(),
            receiver,
            arguments,
            offset: name_match.start(),
        });
    }
    out
}

/// Index of the `)` closing the `(` at `open`, honoring nesting and string
/// literals. `None` on unbalanced text.
fn matching_paren(text: &str, open: usize) -> Option<usize> {
    let bytes = text.as_bytes();
    let mut depth = 0usize;
    let mut in_string = false;
    let mut i = open;
    while i < bytes.len() {
        let c = bytes[i];
        if in_string {
            if c == b'\\' {
                i += 2;
                continue;
            }
            if c == b'"' {
                in_string = false;
            }
        } else {
            match c {
                b'"' => in_string = true,
                b'(' => depth += 1,
                b')' => {
                    depth -= 1;
                    if depth == 0 {
                        return Some(i);
                    }
                }
                _ => {}
            }
        }
        i += 1;
    }
    None
}

/// Splits an argument list at top-level commas. Angle brackets nest only
/// when they balance over the whole list; an unpaired `<` is a comparison
/// operator, not a generic argument opener.
fn split_arguments(text: &str) -> Vec<String> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Vec::new();
    }
    let angles_nest = angles_balanced(trimmed);
    let bytes = trimmed.as_bytes();
    let mut depth = 0usize;
    let mut in_string = false;
    let mut start = 0usize;
    let mut out = Vec::new();
    let mut i = 0usize;
    while i < bytes.len() {
        let c = bytes[i];
        if in_string {
            if c == b'\\' {
                i += 2;
                continue;
            }
            if c == b'"' {
                in_string = false;
            }
        } else {
            match c {
                b'"' => in_string = true,
                b'(' | b'[' => depth += 1,
                b')' | b']' => depth = depth.saturating_sub(1),
                b'<' if angles_nest => depth += 1,
                b'>' if angles_nest => depth = depth.saturating_sub(1),
                b',' if depth == 0 => {
                    out.push(trimmed[start..i].trim().to_owned());
                    start = i + 1;
                }
                _ => {}
            }
        }
        i += 1;
    }
    out.push(trimmed[start..].trim().to_owned());
    out
}

/// Whether every `<` has a matching `>` outside string literals. Mixed
/// generic and comparison uses in one list still split imperfectly.
fn angles_balanced(text: &str) -> bool {
    let bytes = text.as_bytes();
    let mut depth = 0isize;
    let mut in_string = false;
    let mut i = 0usize;
    while i < bytes.len() {
        let c = bytes[i];
        if in_string {
            if c == b'\\' {
                i += 2;
                continue;
            }
            if c == b'"' {
                in_string = false;
            }
        } else {
            match c {
                b'"' => in_string = true,
                b'<' => depth += 1,
                b'>' => {
                    depth -= 1;
                    if depth < 0 {
                        return false;
                    }
                }
                _ => {}
            }
        }
        i += 1;
    }
    depth == 0
}

/// The dotted receiver chain immediately preceding a call name, if any.
fn receiver_before(text: &str, name_start: usize) -> Option<String> {
    let head = &text[..name_start];
    if !head.ends_with('.') {
        return None;
    }
    let head = &head[..head.len() - 1];
    let start = head
        .rfind(|c: char| !(c.is_alphanumeric() || c == '_' || c == '.'))
        .map_or(0, |i| i + 1);
    let receiver = &head[start..];
    if receiver.is_empty() {
        None
    } else {
        Some(receiver.to_owned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_simple_call() {
        let invocations = extract_invocations("helper(a, b);");
        assert_eq!(invocations.len(), 1);
        assert_eq!(invocations[0].name, "helper");
        assert_eq!(invocations[0].arguments, vec!["a", "b"]);
        assert_eq!(invocations[0].receiver, None);
    }

    #[test]
    fn extracts_nested_and_receiver_calls() {
        let invocations = extract_invocations("this.log.write(format(x), 1);");
        let names: Vec<&str> = invocations.iter().map(|i| i.name.as_str()).collect();
        assert_eq!(names, vec!["write", "format"]);
        assert_eq!(invocations[0].receiver.as_deref(), Some("this.log"));
        assert_eq!(invocations[0].arguments, vec!["format(x)", "1"]);
    }

    #[test]
    fn control_flow_keywords_are_not_calls() {
        assert!(extract_invocations("if (ready(x)) {").len() == 1);
        assert!(extract_invocations("while (true) {").is_empty());
    }

    #[test]
    fn commas_inside_strings_do_not_split() {
        let invocations = extract_invocations("print(\"a, b\", c);");
        assert_eq!(invocations[0].arguments, vec!["\"a, b\"", "c"]);
    }

    #[test]
    fn comparison_arguments_split_at_their_comma() {
        // a lone `<` is a comparison, not a generic opener
        let invocations = extract_invocations("f(a < b, c);");
        assert_eq!(invocations[0].arguments, vec!["a < b", "c"]);
    }

    #[test]
    fn commas_inside_generics_do_not_split() {
        let invocations = extract_invocations("g(new HashMap<String, Integer>(), x);");
        assert_eq!(
            invocations[0].arguments,
            vec!["new HashMap<String, Integer>()", "x"]
        );
    }

    #[test]
    fn matching_honors_arity_and_varargs() {
        use crate::model::operation::Parameter;

        let fixed = Operation::new("A", "log")
            .with_parameters(vec![Parameter::new("message", "String")]);
        let variadic = Operation::new("A", "log").with_parameters(vec![
            Parameter::new("message", "String"),
            Parameter::varargs("rest", "Object"),
        ]);

        let one = &extract_invocations("log(m);")[0];
        let three = &extract_invocations("log(m, a, b);")[0];
        let zero = &extract_invocations("log();")[0];

        assert!(one.matches_operation(&fixed));
        assert!(!three.matches_operation(&fixed));
        // the varargs tail accepts zero or more extra arguments
        assert!(one.matches_operation(&variadic));
        assert!(three.matches_operation(&variadic));
        assert!(!zero.matches_operation(&variadic));
    }
}
