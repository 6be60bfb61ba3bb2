//! Geodetic database web service client.

use std::time::Duration;

use reqwest::StatusCode;
use reqwest::blocking::Client;
use tracing::debug;

use crate::domain::MarkCode;

use super::error::SourceError;
use super::source::MarkSource;

/// Default URL template for the mark web service. `{code}` is replaced by the
/// normalized mark code.
pub const DEFAULT_URL_TEMPLATE: &str =
    "https://www.geodesy.linz.govt.nz/api/gdbweb/mark?code={code}";

/// Configuration for the web service client.
#[derive(Debug, Clone)]
pub struct HttpSourceConfig {
    /// URL template containing a `{code}` placeholder
    pub url_template: String,
    /// Request timeout in seconds
    pub timeout_secs: u64,
    /// Skip TLS certificate and hostname verification.
    ///
    /// On by default: the service has historically been reached through
    /// endpoints whose certificates do not verify. Turn it off wherever the
    /// endpoint presents a valid certificate.
    pub accept_invalid_certs: bool,
}

impl HttpSourceConfig {
    /// Create a config for the production web service.
    pub fn new() -> Self {
        Self {
            url_template: DEFAULT_URL_TEMPLATE.to_string(),
            timeout_secs: 30,
            accept_invalid_certs: true,
        }
    }

    /// Set a custom URL template (for testing or a mirror).
    pub fn with_url_template(mut self, template: impl Into<String>) -> Self {
        self.url_template = template.into();
        self
    }

    /// Set request timeout.
    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }

    /// Enable or disable certificate verification bypass.
    pub fn with_accept_invalid_certs(mut self, accept: bool) -> Self {
        self.accept_invalid_certs = accept;
        self
    }

    /// The request URL for a mark.
    pub fn url_for(&self, code: &MarkCode) -> String {
        self.url_template.replace("{code}", &code.to_string())
    }
}

impl Default for HttpSourceConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Client for the geodetic database mark web service.
#[derive(Debug, Clone)]
pub struct HttpSource {
    http: Client,
    config: HttpSourceConfig,
}

impl HttpSource {
    /// Create a new web service client.
    pub fn new(config: HttpSourceConfig) -> Result<Self, SourceError> {
        let http = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .danger_accept_invalid_certs(config.accept_invalid_certs)
            .build()?;

        Ok(Self { http, config })
    }

    /// The configuration this client was built with.
    pub fn config(&self) -> &HttpSourceConfig {
        &self.config
    }
}

impl MarkSource for HttpSource {
    fn fetch(&self, code: &MarkCode) -> Result<Option<String>, SourceError> {
        let url = self.config.url_for(code);
        debug!(%code, %url, "requesting mark from web service");

        let response = self.http.get(&url).send()?;
        let status = response.status();

        if status == StatusCode::NOT_FOUND {
            return Ok(None);
        }

        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(SourceError::Api {
                status: status.as_u16(),
                message: body.chars().take(500).collect(),
            });
        }

        let body = response.text()?;
        let trimmed = body.trim();
        if trimmed.is_empty() || trimmed == "null" {
            return Ok(None);
        }

        Ok(Some(body))
    }

    fn name(&self) -> &'static str {
        "web service"
    }
}
