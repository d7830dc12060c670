use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use tracing::debug;

use crate::config::FieldLabels;
use crate::utils::{collapse_whitespace, find_email, non_blank};

/// Containers whose text is read as "caption + value".
const BLOCK_ELEMENTS: &[&str] = &[
    "p", "div", "li", "dd", "dt", "td", "th", "section", "article", "address", "aside", "header",
    "footer", "blockquote", "h1", "h2", "h3", "h4", "h5", "h6",
];

const EMPHASIS: &str = "strong, b";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Person,
    Phone,
    Email,
    Address,
}

/// Contact values found next to their captions in the visible markup.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct LabelScan {
    pub person: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub address: Option<String>,
}

impl LabelScan {
    fn slot_mut(&mut self, field: Field) -> &mut Option<String> {
        match field {
            Field::Person => &mut self.person,
            Field::Phone => &mut self.phone,
            Field::Email => &mut self.email,
            Field::Address => &mut self.address,
        }
    }
}

/// Walk every bold/strong element; when its text is one of the known
/// captions, read the value from the surrounding block. First hit per field
/// wins.
pub fn scan(document: &Html, labels: &FieldLabels) -> LabelScan {
    let selector = Selector::parse(EMPHASIS).unwrap();
    let mut found = LabelScan::default();

    for emphasis in document.select(&selector) {
        let caption = element_text(emphasis);
        let Some(field) = classify(&caption, labels) else {
            continue;
        };
        let slot = found.slot_mut(field);
        if slot.is_some() {
            continue;
        }
        *slot = value_after_caption(emphasis, labels, &selector);
        if let Some(value) = slot.as_deref() {
            debug!(?field, value, "label scan hit");
        }
    }

    found
}

/// Map a caption such as `Telefoonnummer:` to the field it introduces.
pub fn classify(caption: &str, labels: &FieldLabels) -> Option<Field> {
    let key = caption.trim().trim_end_matches(':').trim().to_lowercase();
    if key.is_empty() {
        return None;
    }
    let matches = |candidates: &[String]| candidates.iter().any(|l| l.to_lowercase() == key);
    if matches(&labels.person) {
        Some(Field::Person)
    } else if matches(&labels.phone) {
        Some(Field::Phone)
    } else if matches(&labels.email) {
        Some(Field::Email)
    } else if matches(&labels.address) {
        Some(Field::Address)
    } else {
        None
    }
}

fn element_text(element: ElementRef<'_>) -> String {
    collapse_whitespace(&element.text().collect::<Vec<_>>().join(" "))
}

/// Text of the nearest block ancestor that follows this caption element, so
/// an earlier plain-text use of the same word is never mistaken for it.
fn value_after_caption(
    emphasis: ElementRef<'_>,
    labels: &FieldLabels,
    emphasis_selector: &Selector,
) -> Option<String> {
    let container = emphasis
        .ancestors()
        .filter_map(ElementRef::wrap)
        .find(|el| BLOCK_ELEMENTS.contains(&el.value().name()))?;

    let mut after = Vec::new();
    let mut past_caption = false;
    for node in container.descendants() {
        let Some(text) = node.value().as_text() else {
            continue;
        };
        if node.ancestors().any(|a| a.id() == emphasis.id()) {
            past_caption = true;
        } else if past_caption {
            after.push(&**text);
        }
    }
    let rest = collapse_whitespace(&after.join(" "));

    non_blank(rest.trim_start_matches(|c: char| c == ':' || c.is_whitespace()))
        .or_else(|| next_block_value(container, labels, emphasis_selector))
}

/// Caption and value in sibling blocks: `<dt>Adres</dt><dd>Kerkstraat 1</dd>`.
fn next_block_value(
    container: ElementRef<'_>,
    labels: &FieldLabels,
    emphasis_selector: &Selector,
) -> Option<String> {
    let sibling = container.next_siblings().find_map(ElementRef::wrap)?;
    let starts_new_caption = sibling
        .select(emphasis_selector)
        .any(|e| classify(&element_text(e), labels).is_some());
    if starts_new_caption {
        return None;
    }
    non_blank(&element_text(sibling))
}

/// A contact-person value that swallowed the rest of the contact card.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ContactSplit {
    pub person: Option<String>,
    pub email: Option<String>,
}

/// Separate the person's name from an email (and any later captions) that
/// share its block, e.g. `Jan Jansen E-mail: jan@bedrijf.nl`.
pub fn split_contact(raw: &str, labels: &FieldLabels) -> ContactSplit {
    let email = find_email(raw);
    let mut cut = email.as_ref().map_or(raw.len(), |(start, _)| *start);

    // Whole words only: a name like "Jan Adresman" holds no caption.
    for label in labels.phone.iter().chain(&labels.email).chain(&labels.address) {
        let Ok(caption) = Regex::new(&format!(r"(?i)\b{}\b", regex::escape(label))) else {
            continue;
        };
        if let Some(m) = caption.find(raw) {
            cut = cut.min(m.start());
        }
    }

    let person = raw[..cut].trim_end_matches(|c: char| c.is_whitespace() || ":,;|-".contains(c));
    ContactSplit {
        person: non_blank(person),
        email: email.map(|(_, address)| address),
    }
}

/// Person and email from the site's own contact card: the first bold line
/// is the name, the first email-looking token is the address.
pub fn contact_block(document: &Html, selector: &str) -> ContactSplit {
    let selector = match Selector::parse(selector) {
        Ok(selector) => selector,
        Err(e) => {
            debug!(selector, error = %e, "contact block selector does not parse");
            return ContactSplit::default();
        }
    };
    let Some(block) = document.select(&selector).next() else {
        return ContactSplit::default();
    };

    let emphasis = Selector::parse(EMPHASIS).unwrap();
    ContactSplit {
        person: block.select(&emphasis).next().and_then(|e| non_blank(&element_text(e))),
        email: find_email(&element_text(block)).map(|(_, address)| address),
    }
}
