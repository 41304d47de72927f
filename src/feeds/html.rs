//! Small HTML helpers for feed bodies: tag stripping, entity decoding and
//! first-image lookup. Not a parser; good enough for RSS content blobs.

use std::sync::OnceLock;

use regex::Regex;

fn tag_re() -> Option<&'static Regex> {
    static RE: OnceLock<Option<Regex>> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?s)<[^>]*>").ok()).as_ref()
}

fn img_re() -> Option<&'static Regex> {
    static RE: OnceLock<Option<Regex>> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r#"(?is)<img\b[^>]*?\bsrc\s*=\s*(?:"([^"]*)"|'([^']*)'|([^\s>]+))"#).ok())
        .as_ref()
}

/// Remove every `<...>` tag.
pub fn strip_tags(html: &str) -> String {
    match tag_re() {
        Some(re) => re.replace_all(html, "").into_owned(),
        None => html.to_string(),
    }
}

/// Decode the handful of entities feeds actually use.
pub fn decode_entities(text: &str) -> String {
    text.replace("&nbsp;", " ")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&#039;", "'")
        .replace("&apos;", "'")
        .replace("&amp;", "&")
}

/// `src` of the first `<img>` in `html`, if any.
pub fn first_image(html: &str) -> Option<String> {
    let caps = img_re()?.captures(html)?;
    let src = caps.get(1).or_else(|| caps.get(2)).or_else(|| caps.get(3))?;
    let src = decode_entities(src.as_str().trim());
    (!src.is_empty()).then_some(src)
}

/// Plain-text preview of `html`, cut to `max_chars` with `...` appended when
/// anything was dropped.
pub fn snippet(html: &str, max_chars: usize) -> String {
    let text = decode_entities(&strip_tags(html));
    if text.chars().count() <= max_chars {
        return text;
    }
    let cut: String = text.chars().take(max_chars).collect();
    format!("{}...", cut.trim())
}
