//! Placeholder substitution for notification messages.
//!
//! Messages coming from the host carry placeholders in four interchangeable
//! syntaxes. Substitution runs as one pass per syntax, in a fixed order:
//!
//! 1. `{{name}}`
//! 2. `${name}`
//! 3. `{name}`
//! 4. `$name`
//!
//! Each pass scans only text that no earlier pass produced: substituted
//! values are frozen and never re-scanned, so a value containing `{y}` does
//! not get substituted again by the single-brace pass. A naive sequential
//! `replace_all` over one accumulated string would break that guarantee,
//! which is why the passes operate on a span list instead.
//!
//! Placeholders whose name is not in the mapping are left verbatim,
//! delimiters included. The function is total: absence of a variable is a
//! formatting no-op, never an error.

use regex::Regex;
use serde_json::{Map, Value};
use std::sync::LazyLock;

/// The four placeholder syntaxes, in substitution order.
///
/// Order matters for overlapping syntaxes: `{{x}}` must be consumed whole
/// by the double-brace pass before the single-brace pass could ever see its
/// inner braces.
static PASSES: LazyLock<[Regex; 4]> = LazyLock::new(|| {
    [
        Regex::new(r"\{\{(\w+)\}\}").expect("valid regex"),
        Regex::new(r"\$\{(\w+)\}").expect("valid regex"),
        Regex::new(r"\{(\w+)\}").expect("valid regex"),
        Regex::new(r"\$(\w+)").expect("valid regex"),
    ]
});

/// A region of the working string during substitution.
///
/// `Raw` text is still a candidate for later passes; `Resolved` text was
/// produced by a substitution and is frozen.
enum Span {
    Raw(String),
    Resolved(String),
}

/// Replace recognized placeholders in `template` with values from
/// `variables`.
///
/// Values stringify as: strings verbatim (unquoted), everything else as its
/// compact JSON text (`1`, `true`, `null`, `[1,2]`). Every occurrence of a
/// name is substituted independently; unknown names pass through unchanged.
///
/// # Example
///
/// ```
/// use mailgate::render::substitute_variables;
/// use serde_json::{Map, json};
///
/// let mut vars = Map::new();
/// vars.insert("host".to_string(), json!("db-01"));
/// let out = substitute_variables("{{host}} is down", &vars);
/// assert_eq!(out, "db-01 is down");
/// ```
pub fn substitute_variables(template: &str, variables: &Map<String, Value>) -> String {
    let mut spans = vec![Span::Raw(template.to_owned())];

    for pass in PASSES.iter() {
        spans = spans
            .into_iter()
            .flat_map(|span| match span {
                Span::Resolved(_) => vec![span],
                Span::Raw(text) => apply_pass(pass, text, variables),
            })
            .collect();
    }

    spans
        .into_iter()
        .map(|span| match span {
            Span::Raw(text) | Span::Resolved(text) => text,
        })
        .collect()
}

/// Run a single syntax pass over one raw span.
///
/// Matches whose name is absent from the mapping are skipped without
/// advancing the cursor, so the unresolved placeholder stays inside raw
/// text and remains visible to later passes.
fn apply_pass(pass: &Regex, text: String, variables: &Map<String, Value>) -> Vec<Span> {
    let mut spans = Vec::new();
    let mut cursor = 0;

    for caps in pass.captures_iter(&text) {
        let matched = caps.get(0).expect("group 0 always present");
        let Some(value) = variables.get(&caps[1]) else {
            continue;
        };
        if matched.start() > cursor {
            spans.push(Span::Raw(text[cursor..matched.start()].to_owned()));
        }
        spans.push(Span::Resolved(value_text(value)));
        cursor = matched.end();
    }

    if cursor == 0 {
        // Nothing substituted, keep the span as-is.
        return vec![Span::Raw(text)];
    }
    if cursor < text.len() {
        spans.push(Span::Raw(text[cursor..].to_owned()));
    }
    spans
}

/// Textual form of a variable value.
fn value_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn vars(pairs: &[(&str, Value)]) -> Map<String, Value> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }

    #[test]
    fn empty_mapping_is_a_no_op() {
        let empty = Map::new();
        for template in [
            "",
            "plain text",
            "{{a}} ${b} {c} $d",
            "unbalanced {{ and $",
        ] {
            assert_eq!(substitute_variables(template, &empty), template);
        }
    }

    #[test]
    fn all_four_syntaxes_substitute_in_position() {
        let vars = vars(&[
            ("a", json!(1)),
            ("b", json!(2)),
            ("c", json!(3)),
            ("d", json!(4)),
        ]);
        let out = substitute_variables("{{a}}-${b}-{c}-$d", &vars);
        assert_eq!(out, "1-2-3-4");
    }

    #[test]
    fn undefined_names_pass_through_verbatim() {
        let vars = vars(&[("name", json!("Al"))]);
        let out = substitute_variables("Hi {{name}}, bye {{ghost}}", &vars);
        assert_eq!(out, "Hi Al, bye {{ghost}}");
    }

    #[test]
    fn undefined_names_pass_through_for_every_syntax() {
        let empty = Map::new();
        assert_eq!(substitute_variables("{{ghost}}", &empty), "{{ghost}}");
        assert_eq!(substitute_variables("${ghost}", &empty), "${ghost}");
        assert_eq!(substitute_variables("{ghost}", &empty), "{ghost}");
        assert_eq!(substitute_variables("$ghost", &empty), "$ghost");
    }

    #[test]
    fn substituted_values_are_never_rescanned() {
        // The value of x contains a single-brace placeholder for y; even
        // though y is mapped, pass 3 must not touch pass 1's output.
        let vars1 = vars(&[("x", json!("{y}")), ("y", json!("boom"))]);
        assert_eq!(substitute_variables("{{x}}", &vars1), "{y}");

        // Same for a dollar placeholder produced by an earlier pass.
        let vars = vars(&[("x", json!("$y")), ("y", json!("boom"))]);
        assert_eq!(substitute_variables("{{x}}", &vars), "$y");
    }

    #[test]
    fn double_brace_consumed_before_single_brace() {
        // {{x}} is consumed whole by pass 1; the inner {x} never reaches
        // pass 3, so the value appears exactly once.
        let vars = vars(&[("x", json!("once"))]);
        assert_eq!(substitute_variables("{{x}}", &vars), "once");
    }

    #[test]
    fn repeated_names_substitute_every_occurrence() {
        let vars = vars(&[("n", json!("x"))]);
        assert_eq!(substitute_variables("{{n}} {n} $n {{n}}", &vars), "x x x x");
    }

    #[test]
    fn empty_names_do_not_match() {
        let vars = vars(&[("x", json!("v"))]);
        for template in ["{}", "{{}}", "${}", "$", "$ x"] {
            assert_eq!(substitute_variables(template, &vars), template);
        }
    }

    #[test]
    fn non_string_values_use_their_json_text() {
        let vars = vars(&[
            ("count", json!(42)),
            ("ratio", json!(0.5)),
            ("ok", json!(true)),
            ("nothing", json!(null)),
            ("list", json!([1, 2])),
        ]);
        let out = substitute_variables("{count}/{ratio}/{ok}/{nothing}/{list}", &vars);
        assert_eq!(out, "42/0.5/true/null/[1,2]");
    }

    #[test]
    fn dollar_brace_wins_over_bare_dollar() {
        // ${x} must resolve as dollar-brace, not as bare-dollar plus braces.
        let vars = vars(&[("x", json!("v"))]);
        assert_eq!(substitute_variables("${x}", &vars), "v");
    }

    #[test]
    fn bare_dollar_takes_maximal_name() {
        let vars = vars(&[("hostname", json!("db-01")), ("host", json!("nope"))]);
        assert_eq!(substitute_variables("$hostname", &vars), "db-01");
    }

    #[test]
    fn text_around_placeholders_is_preserved() {
        let vars = vars(&[("who", json!("ops"))]);
        assert_eq!(
            substitute_variables("to: {{who}} (cc $who)", &vars),
            "to: ops (cc ops)"
        );
    }

    #[test]
    fn unresolved_earlier_syntax_is_still_visible_to_later_passes() {
        // ${ghost} stays raw after pass 2; pass 3 then sees {ghost} inside
        // it, but ghost is still unmapped, so the text survives intact.
        let vars = vars(&[("x", json!("v"))]);
        assert_eq!(substitute_variables("${ghost} $x", &vars), "${ghost} v");
    }
}
