use std::sync::LazyLock;

use regex::Regex;
use scraper::Html;

static BR_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)<br\s*/?>").unwrap());
static P_CLOSE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)</p\s*>").unwrap());
static LI_OPEN_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)<li(\s[^>]*)?>").unwrap());
static TAG_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<[^<]+?>").unwrap());
static BLANK_LINES_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\n(?:[ \t]*\n){2,}").unwrap());
static EMAIL_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[\w.-]+@[\w.-]+\.\w+").unwrap());
static CODE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\bID\s*:?\s*(\d+)").unwrap());

/// Elements whose text never renders.
const HIDDEN_ELEMENTS: &[&str] = &["script", "style", "noscript", "template"];

/// Collapse every whitespace run (newlines included) into a single space.
pub fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// `Some` with the trimmed value, `None` when nothing but whitespace is left.
pub fn non_blank(text: &str) -> Option<String> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// Decode HTML character references (`&amp;`, `&#233;`, `&nbsp;`, ...).
/// `text` is plain text: a stray `<` stays a literal character.
pub fn decode_entities(text: &str) -> String {
    if !text.contains('&') {
        return text.to_string();
    }
    let fragment = Html::parse_fragment(&text.replace('<', "&lt;"));
    fragment.root_element().text().collect()
}

/// Turn the HTML-ish description of a posting into markdown-friendly text:
/// line breaks for `<br>` and paragraphs, list markers for `<li>`, every
/// other tag dropped and entities decoded.
pub fn clean_html(raw: &str) -> String {
    // Some sites entity-encode the markup itself inside JSON-LD.
    let raw = if raw.contains("&lt;") && !raw.contains('<') {
        decode_entities(raw)
    } else {
        raw.to_string()
    };

    let text = BR_RE.replace_all(&raw, "\n");
    let text = P_CLOSE_RE.replace_all(&text, "\n\n");
    let text = LI_OPEN_RE.replace_all(&text, "\n- ");
    let text = TAG_RE.replace_all(&text, "");
    let text = decode_entities(&text).replace('\u{a0}', " ");
    let text = BLANK_LINES_RE.replace_all(&text, "\n\n");
    text.trim().to_string()
}

/// All rendered text of the page, one space between text nodes.
pub fn visible_text(document: &Html) -> String {
    let mut parts = Vec::new();
    for node in document.root_element().descendants() {
        let Some(text) = node.value().as_text() else {
            continue;
        };
        let hidden = node.ancestors().any(|ancestor| {
            ancestor
                .value()
                .as_element()
                .is_some_and(|el| HIDDEN_ELEMENTS.contains(&el.name()))
        });
        if hidden {
            continue;
        }
        let trimmed = text.trim();
        if !trimmed.is_empty() {
            parts.push(trimmed);
        }
    }
    parts.join(" ")
}

/// First email-looking token in `text` with its byte offset.
pub fn find_email(text: &str) -> Option<(usize, String)> {
    EMAIL_RE.find(text).map(|m| (m.start(), m.as_str().to_string()))
}

/// Digits following the literal label `ID`, e.g. `Leerbedrijf ID 12345`.
pub fn recognition_code(text: &str) -> Option<String> {
    CODE_RE.captures(text).map(|caps| caps[1].to_string())
}
