use std::path::PathBuf;
use std::time::Duration;

/// Browser-like identification; the vacancy site rejects the default reqwest agent.
const DEFAULT_USER_AGENT: &str =
    "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0 Safari/537.36";

/// Everything the collector can be tuned with. There is no config file; the
/// defaults below are what the tool runs with.
#[derive(Debug, Clone)]
pub struct Settings {
    pub user_agent: String,
    pub timeout: Duration,
    pub max_vacancies: usize,
    pub stop_word: String,
    pub output_dir: PathBuf,
    /// CSS selector of the site's contact card, used after the label scan.
    pub contact_block_selector: String,
    pub skills_heading: String,
    pub labels: FieldLabels,
    pub placeholders: Placeholders,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            user_agent: DEFAULT_USER_AGENT.to_string(),
            timeout: Duration::from_secs(30),
            max_vacancies: 8,
            stop_word: "stop".to_string(),
            output_dir: PathBuf::from("."),
            contact_block_selector: "div.text-sbb-body-sm".to_string(),
            skills_heading: "### Vaardigheden/Eisen:".to_string(),
            labels: FieldLabels::default(),
            placeholders: Placeholders::default(),
        }
    }
}

/// Captions that precede contact values in the vacancy markup.
#[derive(Debug, Clone)]
pub struct FieldLabels {
    pub person: Vec<String>,
    pub phone: Vec<String>,
    pub email: Vec<String>,
    pub address: Vec<String>,
}

impl Default for FieldLabels {
    fn default() -> Self {
        fn owned(labels: &[&str]) -> Vec<String> {
            labels.iter().map(|l| l.to_string()).collect()
        }
        Self {
            person: owned(&["Contactpersoon", "Contact persoon"]),
            phone: owned(&["Telefoonnummer", "Telefoon"]),
            email: owned(&["E-mailadres", "E-mail", "Email"]),
            address: owned(&["Bezoekadres", "Adres"]),
        }
    }
}

/// Values written for fields the extractor could not resolve.
#[derive(Debug, Clone)]
pub struct Placeholders {
    pub title: String,
    pub text: String,
    pub person: String,
    pub phone: String,
    pub email: String,
    pub address: String,
    pub code: String,
}

impl Default for Placeholders {
    fn default() -> Self {
        Self {
            title: "Geen titel".to_string(),
            text: "Geen vacaturetekst gevonden".to_string(),
            person: "Niet vermeld".to_string(),
            phone: "Niet vermeld".to_string(),
            email: "Niet vermeld (check website)".to_string(),
            address: "Niet vermeld".to_string(),
            code: "N/A".to_string(),
        }
    }
}
