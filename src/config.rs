use crate::error::ConfigError;
use log::debug;
use std::time::Duration;
use url::Url;

pub const DEFAULT_DETECT_URL: &str = "https://parkd-endpoint.vercel.app/api/detect_and_ocr";
pub const DEFAULT_VERIFY_URL: &str = "https://parkd-verification.vercel.app/api/verify/";
pub const DEFAULT_TIMEOUT_SECS: u64 = 15;

/// Where the two remote services live and how long to wait for each call.
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    pub detect_url: Url,
    /// Plate text is appended to this as a single path segment.
    pub verify_url: Url,
    pub timeout: Duration,
}

impl ServiceConfig {
    pub fn new(
        detect_url: &str,
        verify_url: &str,
        timeout: Duration,
    ) -> Result<ServiceConfig, ConfigError> {
        if timeout == Duration::from_secs(0) {
            return Err(ConfigError::ZeroTimeout);
        }
        Ok(ServiceConfig {
            detect_url: parse_endpoint("detection", detect_url)?,
            verify_url: parse_endpoint("verification", verify_url)?,
            timeout,
        })
    }

    /// Builds the HTTP client shared by both service clients.
    pub fn http_client(&self) -> Result<reqwest::Client, ConfigError> {
        debug!("Building HTTP client with {:?} timeout", self.timeout);
        reqwest::Client::builder()
            .timeout(self.timeout)
            .build()
            .map_err(|e| ConfigError::HttpClient(e.to_string()))
    }
}

fn parse_endpoint(name: &'static str, raw: &str) -> Result<Url, ConfigError> {
    let invalid = |reason: String| ConfigError::InvalidUrl {
        name,
        url: raw.to_string(),
        reason,
    };
    let url = Url::parse(raw).map_err(|e| invalid(e.to_string()))?;
    match url.scheme() {
        "http" | "https" => {}
        other => return Err(invalid(format!("unsupported scheme {}", other))),
    }
    if url.cannot_be_a_base() {
        return Err(invalid("URL cannot be used as a base".to_string()));
    }
    Ok(url)
}
