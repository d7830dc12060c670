use scraper::{Html, Selector};
use tracing::debug;

use crate::config::Settings;
use crate::error::ParseError;
use crate::label_scan::{self, ContactSplit, LabelScan};
use crate::record::VacancyRecord;
use crate::structured_data::{self, JobPosting};
use crate::utils::{clean_html, collapse_whitespace, non_blank, recognition_code, visible_text};

/// Outcome of extracting one page. The record is always complete;
/// `structured` tells whether the JSON-LD block could be used.
#[derive(Debug)]
pub struct Extraction {
    pub record: VacancyRecord,
    pub structured: Result<(), ParseError>,
}

/// Everything the resolvers may look at, computed once per page.
struct Sources<'a> {
    document: &'a Html,
    posting: &'a JobPosting,
    labelled: &'a LabelScan,
    /// The label-scanned person, split from any email it swallowed.
    person_split: &'a ContactSplit,
    /// The site's own contact card.
    card: &'a ContactSplit,
    visible_text: &'a str,
}

/// One way of finding a field. Chains are tried in order; the first
/// non-blank answer wins.
type Resolver = fn(&Sources<'_>) -> Option<String>;

const TITLE: &[Resolver] = &[structured_title, first_heading];
const PERSON: &[Resolver] = &[labelled_person, card_person];
const PHONE: &[Resolver] = &[labelled_phone, location_phone, organization_phone];
const EMAIL: &[Resolver] = &[labelled_email, email_beside_person, card_email, organization_email];
const ADDRESS: &[Resolver] = &[labelled_address, location_address];
const SKILLS: &[Resolver] = &[skills, qualifications, experience_requirements];
const CODE: &[Resolver] = &[code_in_visible_text];

fn resolve(chain: &[Resolver], sources: &Sources<'_>) -> Option<String> {
    chain
        .iter()
        .find_map(|resolver| resolver(sources).and_then(|value| non_blank(&value)))
}

/// Turn the markup of a vacancy page into a record. Pure: the same input
/// always produces the same record.
pub fn extract(html: &str, url: &str, settings: &Settings) -> Extraction {
    let document = Html::parse_document(html);

    let (posting, structured) = match structured_data::locate(&document) {
        Ok(posting) => (posting, Ok(())),
        Err(e) => {
            debug!(url, error = %e, "continuing without structured data");
            (JobPosting::default(), Err(e))
        }
    };

    let labelled = label_scan::scan(&document, &settings.labels);
    let person_split = labelled
        .person
        .as_deref()
        .map(|raw| label_scan::split_contact(raw, &settings.labels))
        .unwrap_or_default();
    let card = label_scan::contact_block(&document, &settings.contact_block_selector);
    let visible = visible_text(&document);

    let sources = Sources {
        document: &document,
        posting: &posting,
        labelled: &labelled,
        person_split: &person_split,
        card: &card,
        visible_text: &visible,
    };

    let placeholders = &settings.placeholders;
    let record = VacancyRecord {
        url: non_blank(url).unwrap_or_else(|| url.to_string()),
        title: resolve(TITLE, &sources).unwrap_or_else(|| placeholders.title.clone()),
        text: vacancy_text(&sources, &settings.skills_heading)
            .unwrap_or_else(|| placeholders.text.clone()),
        person: resolve(PERSON, &sources).unwrap_or_else(|| placeholders.person.clone()),
        phone: resolve(PHONE, &sources).unwrap_or_else(|| placeholders.phone.clone()),
        email: resolve(EMAIL, &sources).unwrap_or_else(|| placeholders.email.clone()),
        address: resolve(ADDRESS, &sources).unwrap_or_else(|| placeholders.address.clone()),
        code: resolve(CODE, &sources).unwrap_or_else(|| placeholders.code.clone()),
    };
    debug!(url, fields = ?record.fields(), "vacancy extracted");

    Extraction { record, structured }
}

/// Description, followed by the skills subsection when the posting has one.
fn vacancy_text(sources: &Sources<'_>, skills_heading: &str) -> Option<String> {
    let description = sources
        .posting
        .description
        .as_deref()
        .and_then(|raw| non_blank(&clean_html(raw)));
    let skills = resolve(SKILLS, sources).and_then(|raw| non_blank(&clean_html(&raw)));

    match (description, skills) {
        (Some(description), Some(skills)) => {
            Some(format!("{description}\n\n{skills_heading}\n{skills}"))
        }
        (Some(description), None) => Some(description),
        (None, Some(skills)) => Some(format!("{skills_heading}\n{skills}")),
        (None, None) => None,
    }
}

fn structured_title(s: &Sources<'_>) -> Option<String> {
    s.posting.title.as_deref().map(collapse_whitespace)
}

fn first_heading(s: &Sources<'_>) -> Option<String> {
    let h1 = Selector::parse("h1").unwrap();
    s.document
        .select(&h1)
        .next()
        .map(|el| collapse_whitespace(&el.text().collect::<Vec<_>>().join(" ")))
}

fn labelled_person(s: &Sources<'_>) -> Option<String> {
    s.person_split.person.clone()
}

fn card_person(s: &Sources<'_>) -> Option<String> {
    s.card.person.clone()
}

fn labelled_phone(s: &Sources<'_>) -> Option<String> {
    s.labelled.phone.clone()
}

fn location_phone(s: &Sources<'_>) -> Option<String> {
    s.posting.job_location.as_ref()?.telephone.clone()
}

fn organization_phone(s: &Sources<'_>) -> Option<String> {
    s.posting.hiring_organization.as_ref()?.telephone.clone()
}

fn labelled_email(s: &Sources<'_>) -> Option<String> {
    s.labelled.email.clone()
}

fn email_beside_person(s: &Sources<'_>) -> Option<String> {
    s.person_split.email.clone()
}

fn card_email(s: &Sources<'_>) -> Option<String> {
    s.card.email.clone()
}

fn organization_email(s: &Sources<'_>) -> Option<String> {
    s.posting.hiring_organization.as_ref()?.email.clone()
}

fn labelled_address(s: &Sources<'_>) -> Option<String> {
    s.labelled.address.clone()
}

/// `street, postal-code place`, skipping whatever the posting leaves out.
fn location_address(s: &Sources<'_>) -> Option<String> {
    let location = s.posting.job_location.as_ref()?;
    let address = location.address.as_ref();

    let street = address.and_then(|a| a.street_address.clone());
    let postal_code = address.and_then(|a| a.postal_code.clone());
    let place = location
        .name
        .clone()
        .or_else(|| address.and_then(|a| a.address_locality.clone()));

    let town = [postal_code, place].into_iter().flatten().collect::<Vec<_>>().join(" ");
    let line = [street, non_blank(&town)]
        .into_iter()
        .flatten()
        .collect::<Vec<_>>()
        .join(", ");
    non_blank(&collapse_whitespace(&line))
}

fn skills(s: &Sources<'_>) -> Option<String> {
    s.posting.skills.clone()
}

fn qualifications(s: &Sources<'_>) -> Option<String> {
    s.posting.qualifications.clone()
}

fn experience_requirements(s: &Sources<'_>) -> Option<String> {
    s.posting.experience_requirements.clone()
}

fn code_in_visible_text(s: &Sources<'_>) -> Option<String> {
    recognition_code(s.visible_text)
}

#[cfg(test)]
mod tests {
    use super::*;

    const URL: &str = "https://stagemarkt.nl/stages/12345";

    fn full_page() -> String {
        r#"<html><head>
        <script type="application/ld+json">
        {"@context":"https://schema.org","@graph":[
          {"@type":"Organization","name":"Stagemarkt"},
          {"@type":"JobPosting",
           "title":"Stage Software Developer",
           "description":"<p>Wij zoeken een stagiair.</p><ul><li>Rust</li><li>Testen</li></ul>",
           "skills":"<p>Leergierig &amp; nauwkeurig</p>",
           "jobLocation":{"@type":"Place","name":"Utrecht","telephone":"030-1234567",
             "address":{"@type":"PostalAddress","streetAddress":"Stationsplein 1","postalCode":"3511 AA"}}}
        ]}
        </script></head>
        <body><h1>Stage Software Developer</h1><p>Leerbedrijf ID 12345</p></body></html>"#
            .to_string()
    }

    fn assert_no_blank_fields(record: &VacancyRecord) {
        for (name, value) in record.fields() {
            assert!(!value.trim().is_empty(), "field {name} is blank");
        }
    }

    #[test]
    fn structured_fields_are_used_when_present() {
        let settings = Settings::default();
        let extraction = extract(&full_page(), URL, &settings);
        assert!(extraction.structured.is_ok());

        let record = extraction.record;
        assert_eq!(record.url, URL);
        assert_eq!(record.title, "Stage Software Developer");
        assert_eq!(
            record.text,
            "Wij zoeken een stagiair.\n\n- Rust\n- Testen\n\n### Vaardigheden/Eisen:\nLeergierig & nauwkeurig"
        );
        assert_eq!(record.phone, "030-1234567");
        assert_eq!(record.address, "Stationsplein 1, 3511 AA Utrecht");
        assert_eq!(record.code, "12345");
        assert_eq!(record.person, settings.placeholders.person);
        assert_eq!(record.email, settings.placeholders.email);
    }

    #[test]
    fn page_without_structured_data_falls_back_to_labels() {
        let html = r#"<html><body>
            <h1>Stage Marketing</h1>
            <div><strong>Contact persoon</strong> Jan Jansen</div>
            <div><strong>Telefoonnummer</strong>: 06-12345678</div>
            <div><strong>E-mail</strong> jan@bedrijf.nl</div>
            <div><strong>Adres</strong> Kerkstraat 1, 1234 AB Dorp</div>
            </body></html>"#;
        let settings = Settings::default();
        let extraction = extract(html, URL, &settings);
        assert!(matches!(extraction.structured, Err(ParseError::Missing)));

        let record = extraction.record;
        assert_eq!(record.title, "Stage Marketing");
        assert_eq!(record.person, "Jan Jansen");
        assert_eq!(record.phone, "06-12345678");
        assert_eq!(record.email, "jan@bedrijf.nl");
        assert_eq!(record.address, "Kerkstraat 1, 1234 AB Dorp");
        assert_eq!(record.text, settings.placeholders.text);
        assert_eq!(record.code, "N/A");
    }

    #[test]
    fn labels_win_over_structured_contact_fields() {
        let html = full_page().replace(
            "<h1>",
            "<p><b>Telefoon</b> 010-9999999</p><p><b>Bezoekadres</b> Havenweg 3</p><h1>",
        );
        let record = extract(&html, URL, &Settings::default()).record;
        assert_eq!(record.phone, "010-9999999");
        assert_eq!(record.address, "Havenweg 3");
    }

    #[test]
    fn email_embedded_in_contact_person_is_split_out() {
        let html = r#"<html><body>
            <div><strong>Contactpersoon</strong><br>Mevr. de Vries<br>devries@leerbedrijf.nl</div>
            </body></html>"#;
        let record = extract(html, URL, &Settings::default()).record;
        assert_eq!(record.person, "Mevr. de Vries");
        assert_eq!(record.email, "devries@leerbedrijf.nl");
    }

    #[test]
    fn separately_labelled_email_beats_embedded_one() {
        let html = r#"<html><body>
            <p><strong>Contactpersoon</strong> Jan privé@jan.nl</p>
            <p><strong>E-mail</strong> stage@bedrijf.nl</p>
            </body></html>"#;
        let record = extract(html, URL, &Settings::default()).record;
        assert_eq!(record.person, "Jan");
        assert_eq!(record.email, "stage@bedrijf.nl");
    }

    #[test]
    fn contact_card_is_used_when_no_labels_match() {
        let html = r#"<html><body>
            <div class="text-sbb-body-sm"><strong>Piet Pieters</strong> piet@leerbedrijf.nl</div>
            </body></html>"#;
        let record = extract(html, URL, &Settings::default()).record;
        assert_eq!(record.person, "Piet Pieters");
        assert_eq!(record.email, "piet@leerbedrijf.nl");
    }

    #[test]
    fn organization_contact_is_the_last_structured_resort() {
        let html = r#"<html><head><script type="application/ld+json">
            {"@type":"JobPosting","title":"Stage",
             "hiringOrganization":{"name":"Acme","telephone":"020-7654321","email":"hr@acme.nl"}}
            </script></head><body></body></html>"#;
        let record = extract(html, URL, &Settings::default()).record;
        assert_eq!(record.phone, "020-7654321");
        assert_eq!(record.email, "hr@acme.nl");
    }

    #[test]
    fn skills_fall_back_to_qualifications() {
        let html = r#"<html><head><script type="application/ld+json">
            {"@type":"JobPosting","title":"Stage","qualifications":"MBO niveau 4"}
            </script></head><body></body></html>"#;
        let record = extract(html, URL, &Settings::default()).record;
        assert_eq!(record.text, "### Vaardigheden/Eisen:\nMBO niveau 4");
    }

    #[test]
    fn malformed_structured_data_degrades_gracefully() {
        let html = r#"<html><head><script type="application/ld+json">{"@type": </script></head>
            <body><p><strong>Telefoon</strong> 010-1111111</p></body></html>"#;
        let extraction = extract(html, URL, &Settings::default());
        assert!(matches!(extraction.structured, Err(ParseError::Malformed(_))));
        assert_eq!(extraction.record.phone, "010-1111111");
        assert_no_blank_fields(&extraction.record);
    }

    #[test]
    fn empty_markup_yields_only_placeholders() {
        let settings = Settings::default();
        let record = extract("", URL, &settings).record;
        let p = &settings.placeholders;
        assert_eq!(record.title, p.title);
        assert_eq!(record.text, p.text);
        assert_eq!(record.person, p.person);
        assert_eq!(record.phone, p.phone);
        assert_eq!(record.email, p.email);
        assert_eq!(record.address, p.address);
        assert_eq!(record.code, p.code);
        assert_no_blank_fields(&record);
    }

    #[test]
    fn extraction_is_deterministic() {
        let settings = Settings::default();
        let first = extract(&full_page(), URL, &settings).record;
        let second = extract(&full_page(), URL, &settings).record;
        assert_eq!(first, second);
    }

    #[test]
    fn id_inside_scripts_is_not_a_recognition_code() {
        let html = r#"<html><head><script>window.ID = 777;</script></head>
            <body><p>Geen code</p></body></html>"#;
        let record = extract(html, URL, &Settings::default()).record;
        assert_eq!(record.code, "N/A");
    }
}
