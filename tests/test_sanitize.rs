use metabox_core::sanitize::{
    multiline_field, rich_text, text_field, MultilineSanitizer, RichTextSanitizer, Sanitizer,
    TextSanitizer,
};

#[test]
/// REQ-SAN-001
fn test_sanitize_req_san_001_text_strips_markup_and_collapses_whitespace() {
    assert_eq!(text_field("  Main   St  "), "Main St");
    assert_eq!(text_field("a\tb\nc"), "a b c");
    assert_eq!(text_field("<b>bold</b> text"), "bold text");
    assert_eq!(text_field("before<script>alert(1)</script>after"), "beforeafter");
    assert_eq!(text_field(""), "");
}

#[test]
/// REQ-SAN-002
fn test_sanitize_req_san_002_stray_angle_brackets_survive() {
    assert_eq!(text_field("1 < 2"), "1 < 2");
    assert_eq!(text_field("a > b"), "a > b");
}

#[test]
/// REQ-SAN-003
fn test_sanitize_req_san_003_multiline_keeps_line_breaks() {
    assert_eq!(multiline_field("line one\r\nline  two"), "line one\nline two");
    assert_eq!(multiline_field("\n  padded  \n"), "padded");
    assert_eq!(multiline_field("<i>keep</i>\ntext"), "keep\ntext");
}

#[test]
/// REQ-SAN-004
fn test_sanitize_req_san_004_rich_text_allowlists_tags() {
    assert_eq!(rich_text("<p>Hi</p>"), "<p>Hi</p>");
    assert_eq!(rich_text("<div><strong>x</strong></div>"), "<strong>x</strong>");
    assert_eq!(rich_text("a<script>alert(1)</script>b"), "ab");
    assert_eq!(rich_text("<style>p{}</style>text"), "text");
}

#[test]
/// REQ-SAN-005
fn test_sanitize_req_san_005_rich_text_scrubs_handlers_and_js_urls() {
    assert_eq!(rich_text("<p onclick=\"x()\">Hi</p>"), "<p>Hi</p>");
    assert_eq!(rich_text("<p onmouseover=evil>Hi</p>"), "<p>Hi</p>");
    assert!(!rich_text("<a href=\"javascript:alert(1)\">x</a>").contains("javascript:"));
}

#[test]
/// REQ-SAN-006
fn test_sanitize_req_san_006_policies_are_idempotent() {
    let samples = [
        "  Main   St  ",
        "<b>bold</b> 1 < 2",
        "line one\r\nline  two",
        "<p onclick=\"x()\">Hi</p><script>a</script>",
    ];
    for sample in samples {
        let text = text_field(sample);
        assert_eq!(text_field(&text), text);
        let multi = multiline_field(sample);
        assert_eq!(multiline_field(&multi), multi);
        let rich = rich_text(sample);
        assert_eq!(rich_text(&rich), rich);
    }
}

#[test]
/// REQ-SAN-007
fn test_sanitize_req_san_007_trait_objects_delegate_to_the_policies() {
    let sample = "  <b>x</b>  ";
    assert_eq!(TextSanitizer.sanitize(sample), text_field(sample));
    assert_eq!(MultilineSanitizer.sanitize(sample), multiline_field(sample));
    assert_eq!(RichTextSanitizer.sanitize(sample), rich_text(sample));
}
