//! Submitted-value sanitation policies.
//!
//! Every policy is idempotent and never fails; persisters call them on each
//! scalar before anything reaches storage. The [`Sanitizer`] trait is the
//! seam for hosts that bring their own policy.

use crate::field::FieldKind;
use regex::Regex;

pub trait Sanitizer {
    fn sanitize(&self, value: &str) -> String;
}

/// Single-line policy: strips markup, drops control characters, collapses
/// whitespace runs to a single space, trims.
pub struct TextSanitizer;

impl Sanitizer for TextSanitizer {
    fn sanitize(&self, value: &str) -> String {
        text_field(value)
    }
}

/// Multi-line policy: like [`TextSanitizer`] but newlines survive.
pub struct MultilineSanitizer;

impl Sanitizer for MultilineSanitizer {
    fn sanitize(&self, value: &str) -> String {
        multiline_field(value)
    }
}

/// Rich-text policy: keeps an allowlist of formatting tags, drops script
/// and style blocks wholesale, scrubs event handlers and javascript: URLs.
pub struct RichTextSanitizer;

impl Sanitizer for RichTextSanitizer {
    fn sanitize(&self, value: &str) -> String {
        rich_text(value)
    }
}

/// Picks the default policy for a field kind, mirroring how each kind is
/// edited: editors produce markup, textareas multi-line text, everything
/// else a single line.
pub fn for_kind(kind: &FieldKind, value: &str) -> String {
    match kind {
        FieldKind::Editor { .. } => rich_text(value),
        FieldKind::Textarea { .. } => multiline_field(value),
        _ => text_field(value),
    }
}

pub fn text_field(value: &str) -> String {
    let stripped = strip_tags(&strip_tag_blocks(value));
    // Tabs and newlines are control characters too; keep whitespace so the
    // collapse below can normalize it instead of gluing words together.
    let printable: String = stripped
        .chars()
        .filter(|c| !c.is_control() || c.is_whitespace())
        .collect();
    printable.split_whitespace().collect::<Vec<_>>().join(" ")
}

pub fn multiline_field(value: &str) -> String {
    let stripped = strip_tags(&strip_tag_blocks(value));
    let printable: String = stripped
        .chars()
        .filter(|c| !c.is_control() || c.is_whitespace())
        .collect();
    let normalized = printable.replace("\r\n", "\n").replace('\r', "\n");
    normalized
        .split('\n')
        .map(|line| line.split_whitespace().collect::<Vec<_>>().join(" "))
        .collect::<Vec<_>>()
        .join("\n")
        .trim_matches('\n')
        .to_string()
}

const ALLOWED_RICH_TAGS: &[&str] = &[
    "a",
    "b",
    "blockquote",
    "br",
    "code",
    "em",
    "h1",
    "h2",
    "h3",
    "h4",
    "h5",
    "h6",
    "i",
    "img",
    "li",
    "ol",
    "p",
    "pre",
    "s",
    "strong",
    "ul",
];

pub fn rich_text(value: &str) -> String {
    let without_blocks = strip_tag_blocks(value);
    let tag_re = Regex::new(r"</?([A-Za-z][A-Za-z0-9]*)\b[^>]*>").unwrap();
    let event_re = Regex::new(r#"(?i)\son[a-z]+\s*=\s*("[^"]*"|'[^']*'|[^\s>]+)"#).unwrap();
    let js_re = Regex::new(r"(?i)javascript:").unwrap();

    let cleaned = tag_re.replace_all(&without_blocks, |caps: &regex::Captures| {
        let name = caps[1].to_ascii_lowercase();
        if !ALLOWED_RICH_TAGS.contains(&name.as_str()) {
            return String::new();
        }
        let tag = event_re.replace_all(&caps[0], "");
        js_re.replace_all(&tag, "").into_owned()
    });
    cleaned.trim().to_string()
}

/// Removes script and style elements together with their contents.
fn strip_tag_blocks(value: &str) -> String {
    let re =
        Regex::new(r"(?is)<script\b[^>]*>.*?</script\s*>|<style\b[^>]*>.*?</style\s*>").unwrap();
    re.replace_all(value, "").into_owned()
}

/// Removes anything tag-shaped. Stray `<` characters that do not open a
/// tag are left alone.
fn strip_tags(value: &str) -> String {
    let re = Regex::new(r"</?[A-Za-z][^>]*>").unwrap();
    re.replace_all(value, "").into_owned()
}
