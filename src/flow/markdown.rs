//! Markdown to display HTML.
//!
//! Raw HTML embedded in the markdown survives only if it consists of tags
//! and attributes the renderer itself produces. Everything else is shown as
//! text. Since rendered output passes that check, rendering is idempotent:
//! `to_html(&to_html(x)) == to_html(x)`.

use once_cell::sync::Lazy;
use pulldown_cmark::{html, CowStr, Event, Options, Parser, Tag, TagEnd};
use regex::Regex;

const ALLOWED_TAGS: &[&str] = &[
    "a", "blockquote", "br", "code", "del", "em", "h1", "h2", "h3", "h4", "h5", "h6", "hr", "img",
    "input", "li", "ol", "p", "pre", "strong", "table", "tbody", "td", "th", "thead", "tr", "ul",
];

const ALLOWED_ATTRIBUTES: &[&str] = &[
    "alt", "checked", "class", "disabled", "href", "src", "start", "style", "title", "type",
];

const DANGEROUS_SCHEMES: &[&str] = &["javascript:", "vbscript:", "data:"];

static TAG_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"</?([A-Za-z][A-Za-z0-9]*)((?:\s+[A-Za-z_:][-A-Za-z0-9_:.]*(?:\s*=\s*(?:"[^"]*"|'[^']*'|[^\s"'=<>`]+))?)*)\s*/?>"#)
        .expect("TAG_RE is a compile-time constant")
});

static ATTR_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"([A-Za-z_:][-A-Za-z0-9_:.]*)(?:\s*=\s*(?:"([^"]*)"|'([^']*)'|([^\s"'=<>`]+)))?"#)
        .expect("ATTR_RE is a compile-time constant")
});

static STYLE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^text-align:\s*(left|center|right)$").expect("STYLE_RE is a compile-time constant")
});

fn options() -> Options {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_TABLES);
    options.insert(Options::ENABLE_STRIKETHROUGH);
    options.insert(Options::ENABLE_TASKLISTS);
    options
}

fn has_dangerous_scheme(url: &str) -> bool {
    let normalized: String = url
        .chars()
        .filter(|c| !c.is_whitespace() && !c.is_control())
        .collect::<String>()
        .to_ascii_lowercase();
    DANGEROUS_SCHEMES
        .iter()
        .any(|scheme| normalized.starts_with(scheme))
}

fn safe_url(url: CowStr<'_>) -> CowStr<'_> {
    if has_dangerous_scheme(&url) {
        CowStr::Borrowed("#")
    } else {
        url
    }
}

fn attributes_are_safe(attributes: &str) -> bool {
    ATTR_RE.captures_iter(attributes).all(|caps| {
        let name = caps
            .get(1)
            .map(|m| m.as_str().to_ascii_lowercase())
            .unwrap_or_default();
        let value = caps
            .get(2)
            .or_else(|| caps.get(3))
            .or_else(|| caps.get(4))
            .map(|m| m.as_str())
            .unwrap_or("");
        if !ALLOWED_ATTRIBUTES.contains(&name.as_str()) {
            return false;
        }
        match name.as_str() {
            "href" | "src" => !has_dangerous_scheme(value),
            "style" => STYLE_RE.is_match(value.trim()),
            _ => true,
        }
    })
}

/// True when every tag in `fragment` is on the allow-list and no stray `<`
/// remains outside a recognised tag.
pub fn is_safe_html(fragment: &str) -> bool {
    for caps in TAG_RE.captures_iter(fragment) {
        let tag = caps
            .get(1)
            .map(|m| m.as_str().to_ascii_lowercase())
            .unwrap_or_default();
        if !ALLOWED_TAGS.contains(&tag.as_str()) {
            return false;
        }
        if !attributes_are_safe(caps.get(2).map(|m| m.as_str()).unwrap_or("")) {
            return false;
        }
    }
    !TAG_RE.replace_all(fragment, "").contains('<')
}

fn sanitize(parser: Parser<'_>) -> Vec<Event<'_>> {
    let mut events = Vec::new();
    let mut block: Option<Vec<CowStr<'_>>> = None;

    for event in parser {
        match event {
            Event::Start(Tag::HtmlBlock) => block = Some(Vec::new()),
            Event::End(TagEnd::HtmlBlock) => {
                let chunks = block.take().unwrap_or_default();
                if chunks.iter().all(|chunk| is_safe_html(chunk)) {
                    events.extend(chunks.into_iter().map(Event::Html));
                } else {
                    let mut text = String::new();
                    for chunk in &chunks {
                        text.push_str(chunk);
                    }
                    events.push(Event::Start(Tag::Paragraph));
                    events.push(Event::Text(CowStr::from(text.trim_end().to_string())));
                    events.push(Event::End(TagEnd::Paragraph));
                }
            }
            Event::Html(chunk) => match block.as_mut() {
                Some(chunks) => chunks.push(chunk),
                None if is_safe_html(&chunk) => events.push(Event::Html(chunk)),
                None => events.push(Event::Text(chunk)),
            },
            Event::InlineHtml(chunk) => {
                if is_safe_html(&chunk) {
                    events.push(Event::InlineHtml(chunk));
                } else {
                    events.push(Event::Text(chunk));
                }
            }
            Event::Start(Tag::Link {
                link_type,
                dest_url,
                title,
                id,
            }) => events.push(Event::Start(Tag::Link {
                link_type,
                dest_url: safe_url(dest_url),
                title,
                id,
            })),
            Event::Start(Tag::Image {
                link_type,
                dest_url,
                title,
                id,
            }) => events.push(Event::Start(Tag::Image {
                link_type,
                dest_url: safe_url(dest_url),
                title,
                id,
            })),
            Event::SoftBreak => events.push(Event::HardBreak),
            other => events.push(other),
        }
    }
    events
}

/// Renders GitHub-flavoured markdown to sanitized HTML. Single newlines
/// become `<br />`.
pub fn to_html(markdown: &str) -> String {
    let parser = Parser::new_ext(markdown, options());
    let mut out = String::with_capacity(markdown.len() * 3 / 2);
    html::push_html(&mut out, sanitize(parser).into_iter());
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_gfm_features() {
        let html = to_html("| a | b |\n|---|:-:|\n| 1 | 2 |\n\n- [x] done\n\n~~old~~");
        assert!(html.contains("<table>"));
        assert!(html.contains("checkbox"));
        assert!(html.contains("<del>old</del>"));
        assert_eq!(to_html(&html), html);
    }

    #[test]
    fn soft_breaks_become_line_breaks() {
        assert_eq!(to_html("one\ntwo"), "<p>one<br />\ntwo</p>\n");
    }

    #[test]
    fn dangerous_links_are_neutralised() {
        let html = to_html("[x](javascript:alert(1)) ![y](data:text/html;base64,AAAA)");
        assert!(!html.contains("javascript:"));
        assert!(!html.contains("data:"));
        assert!(html.contains(r##"href="#""##));
    }

    #[test]
    fn allow_list_checks_tags_and_attributes() {
        assert!(is_safe_html("<p><strong>hi</strong></p>"));
        assert!(is_safe_html(r#"<a href="https://example.com" title="t">x</a>"#));
        assert!(is_safe_html(r#"<th style="text-align: center">h</th>"#));
        assert!(!is_safe_html("<script>alert(1)</script>"));
        assert!(!is_safe_html(r#"<a href="javascript:alert(1)">x</a>"#));
        assert!(!is_safe_html(r#"<p onclick="steal()">x</p>"#));
        assert!(!is_safe_html("<!-- note -->"));
    }

    #[test]
    fn inline_html_outside_allow_list_is_escaped() {
        let html = to_html("hello <span onclick=\"x()\">there</span>");
        assert!(html.contains("&lt;span"));
        assert_eq!(to_html(&html), html);
    }
}
