//! Inline-image extraction for HTML email bodies.
//!
//! Mail clients cannot fetch `data:` URIs, so every `<img>` whose `src` is
//! a base64 data URI is decoded into a binary attachment and the `src` is
//! rewritten to a `cid:` reference the client resolves against that
//! attachment. The rewritten HTML and the returned attachment list are
//! always consistent: each `cid:` reference corresponds to exactly one
//! attachment and vice versa.
//!
//! The matcher is a lexical pattern over quoted `src` attributes, not an
//! HTML parser. Unquoted attributes or otherwise unusual markup are not
//! guaranteed to match; everything that does not match passes through
//! byte-for-byte.

use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use regex::{Captures, Regex};
use std::sync::LazyLock;
use uuid::Uuid;

/// `<img ... src="data:image/<subtype>;base64,<payload>" ...>`, either
/// quote style. Attributes before `src` are captured and re-emitted
/// verbatim; attributes after the closing quote are outside the match and
/// untouched.
static DATA_IMAGE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"(?i)(<img\b[^>]*?\ssrc\s*=\s*)(["'])data:image/([a-zA-Z0-9.+-]+);base64,([^"']*)\2"#,
    )
    .expect("valid regex")
});

/// An image lifted out of an HTML body, ready to attach.
///
/// Created fresh per extraction pass and owned by the caller; never
/// persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InlineImage {
    /// Synthetic name, `image-<index>.<subtype>`.
    pub filename: String,
    /// Decoded image bytes.
    pub content: Vec<u8>,
    /// Content identifier referenced by the rewritten HTML, unique within
    /// one extraction pass.
    pub content_id: String,
    /// Declared MIME type, `image/<subtype>`, taken from the data URI
    /// without content sniffing.
    pub media_type: String,
}

/// Result of one extraction pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedHtml {
    /// Input HTML with every extracted `src` rewritten to `cid:<id>`.
    pub html: String,
    /// Extracted attachments in discovery order. Empty when the input
    /// contains no base64 images.
    pub images: Vec<InlineImage>,
}

/// Scan `html` for base64-embedded images and lift them into attachments.
///
/// Images are processed left to right; indices follow discovery order and
/// are never reused. Content identifiers combine the per-call index with a
/// fresh UUID salt, so identifiers never collide within a pass and calls
/// never interfere with each other.
///
/// A `src` whose payload is not valid base64 is left completely untouched:
/// no attachment, no rewrite, no index consumed. Non-data-URI sources
/// (plain URLs, other schemes) never match in the first place.
pub fn extract_inline_images(html: &str) -> ExtractedHtml {
    let salt = Uuid::new_v4().simple().to_string();
    let mut images: Vec<InlineImage> = Vec::new();

    let rewritten = DATA_IMAGE.replace_all(html, |caps: &Captures<'_>| {
        let subtype = &caps[3];
        let content = match BASE64.decode(caps[4].as_bytes()) {
            Ok(bytes) => bytes,
            Err(error) => {
                tracing::debug!(
                    %error,
                    subtype,
                    "img src declares base64 but does not decode, leaving element untouched"
                );
                return caps[0].to_string();
            }
        };

        let index = images.len();
        let content_id = format!("image-{index}.{salt}@mailgate");
        images.push(InlineImage {
            filename: format!("image-{index}.{subtype}"),
            content,
            content_id: content_id.clone(),
            media_type: format!("image/{subtype}"),
        });

        format!("{}{}cid:{}{}", &caps[1], &caps[2], content_id, &caps[2])
    });

    ExtractedHtml {
        html: rewritten.into_owned(),
        images,
    }
}
