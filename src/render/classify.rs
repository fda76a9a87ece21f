//! Heuristic HTML detection for message bodies.

use regex::Regex;
use std::sync::LazyLock;

/// Anything shaped like a tag or doctype: `<p>`, `</div>`, `<img .../>`,
/// `<!DOCTYPE html>`.
static HTML_TAG: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)<(?:!doctype\b|/?[a-z][a-z0-9]*)(?:\s[^>]*)?/?>").expect("valid regex")
});

/// Decide whether a message body should be sent as HTML.
///
/// This is a lexical heuristic, not a parser: the pipeline only depends on
/// the boolean, and a host with a smarter classifier can make the decision
/// itself and feed the extractor directly.
pub fn looks_like_html(message: &str) -> bool {
    HTML_TAG.is_match(message)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_text_is_not_html() {
        assert!(!looks_like_html("disk usage at 93% on db-01"));
        assert!(!looks_like_html("a < b and b > c"));
        assert!(!looks_like_html(""));
    }

    #[test]
    fn markup_is_html() {
        assert!(looks_like_html("<p>alert</p>"));
        assert!(looks_like_html("before <br/> after"));
        assert!(looks_like_html("<!DOCTYPE html><html></html>"));
        assert!(looks_like_html(r#"<img src="https://x/y.png">"#));
        assert!(looks_like_html("<DIV CLASS=\"x\">shouting</DIV>"));
    }

    #[test]
    fn comparison_operators_do_not_trigger() {
        assert!(!looks_like_html("1<2"));
        assert!(!looks_like_html("x <= y"));
    }
}
