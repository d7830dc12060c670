use thiserror::Error;

/// Why a vacancy page could not be retrieved. Never fatal to a run: the
/// session reports it and asks for the same slot again.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("ongeldige URL '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("time-out bij ophalen van {url}")]
    Timeout { url: String },

    #[error("netwerkfout: {0}")]
    Network(String),

    #[error("HTTP status {status} voor {url}")]
    Status { status: u16, url: String },

    #[error("lege pagina ontvangen van {url}")]
    EmptyBody { url: String },

    #[error("HTTP client kon niet worden gemaakt: {0}")]
    Client(String),
}

impl From<reqwest::Error> for FetchError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            let url = err.url().map(|u| u.to_string()).unwrap_or_default();
            return FetchError::Timeout { url };
        }
        FetchError::Network(err.to_string())
    }
}

/// Structured data was absent or unusable. Extraction degrades to the label
/// scan and placeholders; this is reported, not propagated.
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("geen gestructureerde data gevonden")]
    Missing,

    #[error("gestructureerde data is ongeldig: {0}")]
    Malformed(#[from] serde_json::Error),

    #[error("gestructureerde data bevat geen JobPosting")]
    NoJobPosting,
}
