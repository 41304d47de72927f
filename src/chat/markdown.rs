//! Minimal markdown to HTML for assistant replies.
//!
//! Supported: `- ` / `* ` list items, blank-line spacers, inline `**bold**`
//! and `[text](url)`. Everything else is escaped text.

use std::sync::OnceLock;

use quick_xml::escape::escape;
use regex::Regex;

const INLINE_PATTERN: &str = r"\*\*(.*?)\*\*|\[([^\]]+)\]\(([^)]+)\)";

fn inline_re() -> Option<&'static Regex> {
    static RE: OnceLock<Option<Regex>> = OnceLock::new();
    RE.get_or_init(|| Regex::new(INLINE_PATTERN).ok()).as_ref()
}

/// Render a reply as an HTML fragment.
pub fn render(text: &str) -> String {
    let mut out = String::from("<div class=\"md\">");
    for line in text.split('\n') {
        let trimmed = line.trim();
        if let Some(item) = trimmed.strip_prefix("- ").or_else(|| trimmed.strip_prefix("* ")) {
            out.push_str("<div class=\"md-li\"><span class=\"md-bullet\">\u{2022}</span><span>");
            render_inline(item, &mut out);
            out.push_str("</span></div>");
        } else if trimmed.is_empty() {
            out.push_str("<div class=\"md-spacer\"></div>");
        } else {
            out.push_str("<div class=\"md-p\">");
            render_inline(line, &mut out);
            out.push_str("</div>");
        }
    }
    out.push_str("</div>");
    out
}

fn render_inline(text: &str, out: &mut String) {
    let Some(re) = inline_re() else {
        out.push_str(&escape(text));
        return;
    };
    let mut last = 0;
    for caps in re.captures_iter(text) {
        let Some(whole) = caps.get(0) else { continue };
        out.push_str(&escape(&text[last..whole.start()]));
        if let Some(bold) = caps.get(1) {
            out.push_str("<strong>");
            out.push_str(&escape(bold.as_str()));
            out.push_str("</strong>");
        } else if let (Some(label), Some(url)) = (caps.get(2), caps.get(3)) {
            let url = url.as_str().trim();
            if is_safe_url(url) {
                out.push_str("<a href=\"");
                out.push_str(&escape(url));
                out.push_str("\" target=\"_blank\" rel=\"noopener noreferrer\">");
                out.push_str(&escape(label.as_str()));
                out.push_str("</a>");
            } else {
                out.push_str(&escape(label.as_str()));
            }
        }
        last = whole.end();
    }
    out.push_str(&escape(&text[last..]));
}

/// Strip inline markup for plain-text output: `**x**` becomes `x` and
/// `[t](u)` becomes `t (u)`.
pub fn to_plain(text: &str) -> String {
    let Some(re) = inline_re() else {
        return text.to_string();
    };
    re.replace_all(text, |caps: &regex::Captures<'_>| {
        if let Some(bold) = caps.get(1) {
            bold.as_str().to_string()
        } else {
            let label = caps.get(2).map_or("", |m| m.as_str());
            let url = caps.get(3).map_or("", |m| m.as_str());
            format!("{label} ({url})")
        }
    })
    .into_owned()
}

/// `http(s)://`, `mailto:` and scheme-less relative URLs only.
pub fn is_safe_url(url: &str) -> bool {
    let lower = url.to_ascii_lowercase();
    if lower.starts_with("http://") || lower.starts_with("https://") || lower.starts_with("mailto:") {
        return true;
    }
    // Relative: no scheme before the first path, query or fragment delimiter.
    let head = lower.split(['/', '?', '#']).next().unwrap_or("");
    !lower.starts_with("//") && !head.contains(':')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn paragraph_is_escaped() {
        let html = render("a < b & c");
        assert_eq!(html, "<div class=\"md\"><div class=\"md-p\">a &lt; b &amp; c</div></div>");
    }

    #[test]
    fn bold_and_link() {
        let html = render("I am **fast**. See [my resume](https://example.com/cv.pdf).");
        assert!(html.contains("<strong>fast</strong>"));
        assert!(html.contains(
            "<a href=\"https://example.com/cv.pdf\" target=\"_blank\" rel=\"noopener noreferrer\">my resume</a>"
        ));
        assert!(html.ends_with(".</div></div>"));
    }

    #[test]
    fn list_items_and_spacers() {
        let html = render("Skills:\n- Go\n* Java\n\nDone");
        assert_eq!(html.matches("md-li").count(), 2);
        assert!(html.contains("<span>Go</span>"));
        assert!(html.contains("<span>Java</span>"));
        assert_eq!(html.matches("md-spacer").count(), 1);
        assert_eq!(html.matches("md-p").count(), 2);
    }

    #[test]
    fn script_urls_are_not_linked() {
        let html = render("[click](javascript:alert(1))");
        assert!(!html.contains("<a "));
        assert!(!html.contains("javascript"));
        assert!(html.contains("click"));
    }

    #[test]
    fn raw_html_is_escaped_inside_bold() {
        let html = render("**<img src=x>**");
        assert!(html.contains("<strong>&lt;img src=x&gt;</strong>"));
    }

    #[test]
    fn plain_text_strips_markup() {
        assert_eq!(
            to_plain("**Go** and [CV](https://x.y/cv)"),
            "Go and CV (https://x.y/cv)"
        );
    }

    #[test]
    fn safe_url_rules() {
        assert!(is_safe_url("https://a.b"));
        assert!(is_safe_url("HTTP://a.b"));
        assert!(is_safe_url("mailto:me@x.y"));
        assert!(is_safe_url("/resume.pdf"));
        assert!(is_safe_url("#projects"));
        assert!(!is_safe_url("javascript:alert(1)"));
        assert!(!is_safe_url("data:text/html,hi"));
        assert!(!is_safe_url("//evil.example"));
    }
}
