//! Payload-to-email rendering pipeline.
//!
//! Two pure, stateless functions compose to turn a raw message string into
//! transport-ready content:
//!
//! ```text
//! raw message -> substitute -> classify -> (if HTML) extract images
//! ```
//!
//! Both stages have no shared mutable state and no I/O; they may run
//! concurrently and repeatedly without coordination. Execution is bounded
//! by input size: a linear scan per substitution pass plus per-match base64
//! decoding.

mod classify;
mod inline;
mod substitute;

pub use classify::looks_like_html;
pub use inline::{ExtractedHtml, InlineImage, extract_inline_images};
pub use substitute::substitute_variables;

use serde_json::{Map, Value};

/// Transport-ready body for a single email.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EmailBody {
    /// Plain-text body; never carries attachments.
    Text(String),
    /// HTML body with its inline-image attachments in discovery order.
    Html {
        html: String,
        images: Vec<InlineImage>,
    },
}

impl EmailBody {
    /// Attachments to ship alongside the body (empty for plain text).
    pub fn images(&self) -> &[InlineImage] {
        match self {
            EmailBody::Text(_) => &[],
            EmailBody::Html { images, .. } => images,
        }
    }
}

/// Render a raw message into a deliverable body.
///
/// Substitutes placeholders, then runs the inline-image extractor if and
/// only if the result classifies as HTML. Plain-text messages bypass the
/// extractor entirely.
pub fn render_body(message: &str, variables: &Map<String, Value>) -> EmailBody {
    let substituted = substitute_variables(message, variables);

    if looks_like_html(&substituted) {
        let ExtractedHtml { html, images } = extract_inline_images(&substituted);
        tracing::trace!(
            html_len = html.len(),
            image_count = images.len(),
            "Rendered HTML body"
        );
        EmailBody::Html { html, images }
    } else {
        tracing::trace!(text_len = substituted.len(), "Rendered plain-text body");
        EmailBody::Text(substituted)
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
    fn plain_text_bypasses_the_extractor() {
        let vars = vars(&[("host", json!("db-01"))]);
        let body = render_body("host {{host}} unreachable", &vars);

        assert_eq!(body, EmailBody::Text("host db-01 unreachable".to_string()));
        assert!(body.images().is_empty());
    }

    #[test]
    fn html_without_images_keeps_empty_attachment_list() {
        let vars = vars(&[("host", json!("db-01"))]);
        let body = render_body("<p>host {{host}} unreachable</p>", &vars);

        match body {
            EmailBody::Html { html, images } => {
                assert_eq!(html, "<p>host db-01 unreachable</p>");
                assert!(images.is_empty());
            }
            other => panic!("expected Html, got {:?}", other),
        }
    }

    #[test]
    fn html_with_embedded_image_is_extracted() {
        let vars = vars(&[("name", json!("Al"))]);
        let body = render_body(
            r#"<p>Hi {{name}}</p><img src="data:image/png;base64,AAAA">"#,
            &vars,
        );

        match body {
            EmailBody::Html { html, images } => {
                assert_eq!(images.len(), 1);
                assert!(html.contains("Hi Al"));
                assert!(html.contains(&format!("cid:{}", images[0].content_id)));
                assert!(!html.contains("base64"));
            }
            other => panic!("expected Html, got {:?}", other),
        }
    }

    #[test]
    fn substitution_runs_before_classification() {
        // The template itself is plain, the substituted value brings the
        // markup; classification sees the substituted result.
        let vars = vars(&[("body", json!("<b>loud</b>"))]);
        let body = render_body("{{body}}", &vars);
        assert!(matches!(body, EmailBody::Html { .. }));
    }
}
