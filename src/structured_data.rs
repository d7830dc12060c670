use scraper::{Html, Selector};
use serde::{Deserialize, Deserializer};
use serde_json::Value;
use tracing::debug;

use crate::error::ParseError;
use crate::utils::non_blank;

const JOB_POSTING: &str = "JobPosting";

/// The parts of a schema.org `JobPosting` the collector reads. Every field is
/// optional and leniently typed: sites disagree on strings vs. arrays vs.
/// nested objects.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobPosting {
    #[serde(default, deserialize_with = "lenient_text")]
    pub title: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub description: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub skills: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub qualifications: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub experience_requirements: Option<String>,
    #[serde(default, deserialize_with = "first_of_many")]
    pub job_location: Option<Place>,
    #[serde(default, deserialize_with = "first_of_many")]
    pub hiring_organization: Option<Organization>,
}

#[derive(Debug, Default, Deserialize)]
pub struct Place {
    #[serde(default, deserialize_with = "lenient_text")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub telephone: Option<String>,
    #[serde(default, deserialize_with = "postal_address")]
    pub address: Option<PostalAddress>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostalAddress {
    #[serde(default, deserialize_with = "lenient_text")]
    pub street_address: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub postal_code: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub address_locality: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct Organization {
    #[serde(default, deserialize_with = "lenient_text")]
    pub telephone: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub email: Option<String>,
}

/// Find the job posting entity in the page's JSON-LD blocks.
///
/// Scripts are tried in document order. A `@graph` (or top-level array) is
/// searched for an entity typed `JobPosting`; a bare object typed
/// `JobPosting` is taken as is. When no script holds a `JobPosting`, the
/// first plain-object payload stands in for it.
pub fn locate(document: &Html) -> Result<JobPosting, ParseError> {
    let selector = Selector::parse(r#"script[type="application/ld+json"]"#).unwrap();

    let mut fallback: Option<Value> = None;
    let mut last_error: Option<ParseError> = None;

    for script in document.select(&selector) {
        let payload: String = script.text().collect();
        let value = match serde_json::from_str::<Value>(payload.trim()) {
            Ok(value) => value,
            Err(e) => {
                debug!(error = %e, "skipping malformed JSON-LD block");
                last_error = Some(ParseError::Malformed(e));
                continue;
            }
        };

        if let Some(entity) = select_job_posting(&value) {
            return into_posting(entity.clone());
        }

        let is_collection = value.is_array() || value.get("@graph").is_some();
        if is_collection {
            last_error = Some(ParseError::NoJobPosting);
        } else if fallback.is_none() && value.is_object() {
            fallback = Some(value);
        }
    }

    match fallback {
        Some(entity) => into_posting(entity),
        None => Err(last_error.unwrap_or(ParseError::Missing)),
    }
}

fn select_job_posting(value: &Value) -> Option<&Value> {
    if let Some(graph) = value.get("@graph").and_then(Value::as_array) {
        return graph.iter().find(|item| is_job_posting(item));
    }
    if let Some(items) = value.as_array() {
        return items.iter().find(|item| is_job_posting(item));
    }
    is_job_posting(value).then_some(value)
}

fn is_job_posting(value: &Value) -> bool {
    match value.get("@type") {
        Some(Value::String(kind)) => kind == JOB_POSTING,
        Some(Value::Array(kinds)) => kinds.iter().any(|k| k.as_str() == Some(JOB_POSTING)),
        _ => false,
    }
}

fn into_posting(entity: Value) -> Result<JobPosting, ParseError> {
    Ok(serde_json::from_value(entity)?)
}

/// Flatten a JSON value into display text. Arrays become one line per item,
/// objects contribute their `name`.
fn value_to_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => non_blank(s),
        Value::Number(n) => Some(n.to_string()),
        Value::Array(items) => {
            let lines: Vec<String> = items.iter().filter_map(value_to_text).collect();
            non_blank(&lines.join("\n"))
        }
        Value::Object(map) => map.get("name").and_then(value_to_text),
        Value::Null | Value::Bool(_) => None,
    }
}

fn lenient_text<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<String>, D::Error> {
    let value = Value::deserialize(deserializer)?;
    Ok(value_to_text(&value))
}

/// `jobLocation` and `hiringOrganization` may be a single object or a list.
fn first_of_many<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: serde::de::DeserializeOwned,
{
    let value = Value::deserialize(deserializer)?;
    let first = match value {
        Value::Array(items) => items.into_iter().find(Value::is_object),
        Value::Object(_) => Some(value),
        _ => None,
    };
    Ok(first.and_then(|v| serde_json::from_value(v).ok()))
}

/// An address is either a `PostalAddress` object or a single line of text.
fn postal_address<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<PostalAddress>, D::Error> {
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::Object(_) => serde_json::from_value(value).ok(),
        Value::String(line) => non_blank(&line).map(|street| PostalAddress {
            street_address: Some(street),
            ..Default::default()
        }),
        _ => None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page(json_ld: &str) -> Html {
        Html::parse_document(&format!(
            r#"<html><head><script type="application/ld+json">{json_ld}</script></head><body></body></html>"#
        ))
    }

    #[test]
    fn selects_job_posting_from_graph() {
        let html = page(
            r#"{"@context":"https://schema.org","@graph":[
                {"@type":"WebPage","name":"Stagemarkt"},
                {"@type":"JobPosting","title":"Stage ICT","jobLocation":{"name":"Utrecht","telephone":"030-1234567",
                 "address":{"streetAddress":"Stationsplein 1","postalCode":"3511 AA"}}}
            ]}"#,
        );
        let posting = locate(&html).unwrap();
        assert_eq!(posting.title.as_deref(), Some("Stage ICT"));
        let location = posting.job_location.unwrap();
        assert_eq!(location.name.as_deref(), Some("Utrecht"));
        assert_eq!(location.telephone.as_deref(), Some("030-1234567"));
        let address = location.address.unwrap();
        assert_eq!(address.street_address.as_deref(), Some("Stationsplein 1"));
        assert_eq!(address.postal_code.as_deref(), Some("3511 AA"));
    }

    #[test]
    fn graph_without_job_posting_is_reported() {
        let html = page(r#"{"@graph":[{"@type":"WebPage","name":"x"}]}"#);
        assert!(matches!(locate(&html), Err(ParseError::NoJobPosting)));
    }

    #[test]
    fn plain_object_is_taken_as_the_entity() {
        let html = page(r#"{"@type":"Thing","title":"Stage zonder type"}"#);
        let posting = locate(&html).unwrap();
        assert_eq!(posting.title.as_deref(), Some("Stage zonder type"));
    }

    #[test]
    fn type_array_matches() {
        let html = page(r#"[{"@type":"Organization"},{"@type":["JobPosting","Thing"],"title":"Stage"}]"#);
        assert_eq!(locate(&html).unwrap().title.as_deref(), Some("Stage"));
    }

    #[test]
    fn malformed_block_is_reported() {
        let html = page(r#"{"@type":"JobPosting", "title": "#);
        assert!(matches!(locate(&html), Err(ParseError::Malformed(_))));
    }

    #[test]
    fn malformed_block_does_not_hide_a_later_valid_one() {
        let html = Html::parse_document(
            r#"<html><head>
            <script type="application/ld+json">{oops</script>
            <script type="application/ld+json">{"@type":"JobPosting","title":"Tweede"}</script>
            </head></html>"#,
        );
        assert_eq!(locate(&html).unwrap().title.as_deref(), Some("Tweede"));
    }

    #[test]
    fn missing_block_is_reported() {
        let html = Html::parse_document("<html><body><p>Geen data</p></body></html>");
        assert!(matches!(locate(&html), Err(ParseError::Missing)));
    }

    #[test]
    fn lenient_fields_accept_lists_numbers_and_text_addresses() {
        let html = page(
            r#"{"@type":"JobPosting","skills":["Rust","SQL"],
                "jobLocation":[{"telephone":301234567,"address":"Kerkstraat 5, Utrecht"}],
                "hiringOrganization":{"name":"Acme","email":"hr@acme.nl"}}"#,
        );
        let posting = locate(&html).unwrap();
        assert_eq!(posting.skills.as_deref(), Some("Rust\nSQL"));
        let location = posting.job_location.unwrap();
        assert_eq!(location.telephone.as_deref(), Some("301234567"));
        assert_eq!(
            location.address.unwrap().street_address.as_deref(),
            Some("Kerkstraat 5, Utrecht")
        );
        assert_eq!(posting.hiring_organization.unwrap().email.as_deref(), Some("hr@acme.nl"));
    }
}
