use reqwest::Url;
use tracing::info;

use crate::config::Settings;
use crate::error::FetchError;

/// Where vacancy markup comes from. The session only needs this one call,
/// which keeps it testable without a network.
pub trait PageSource {
    fn fetch(&self, url: &str) -> Result<String, FetchError>;
}

/// Plain HTTP GET with a browser-like `User-Agent`, nothing else.
pub struct HttpFetcher {
    client: reqwest::blocking::Client,
}

impl HttpFetcher {
    pub fn new(settings: &Settings) -> Result<Self, FetchError> {
        Self::from_builder(client_builder(settings))
    }

    fn from_builder(builder: reqwest::blocking::ClientBuilder) -> Result<Self, FetchError> {
        let client = builder.build().map_err(|e| FetchError::Client(e.to_string()))?;
        Ok(Self { client })
    }
}

fn client_builder(settings: &Settings) -> reqwest::blocking::ClientBuilder {
    reqwest::blocking::Client::builder()
        .user_agent(settings.user_agent.as_str())
        .timeout(settings.timeout)
}

impl PageSource for HttpFetcher {
    fn fetch(&self, url: &str) -> Result<String, FetchError> {
        let url = validate_url(url)?;
        info!(%url, "fetching vacancy page");

        let response = self.client.get(url.clone()).send()?;
        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        let body = response.text()?;
        if body.trim().is_empty() {
            return Err(FetchError::EmptyBody { url: url.to_string() });
        }

        info!(%url, bytes = body.len(), "vacancy page fetched");
        Ok(body)
    }
}

/// Only absolute http(s) URLs are fetched.
pub fn validate_url(raw: &str) -> Result<Url, FetchError> {
    let raw = raw.trim();
    let url = Url::parse(raw).map_err(|e| FetchError::InvalidUrl {
        url: raw.to_string(),
        reason: e.to_string(),
    })?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(FetchError::InvalidUrl {
            url: raw.to_string(),
            reason: format!("alleen http en https worden ondersteund, niet {other}"),
        }),
    }
}
