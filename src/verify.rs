use crate::error::ClientError;
use crate::types::VerificationResult;
use async_trait::async_trait;
use log::{debug, info, warn};
use serde_json::Value;
use url::Url;

/// Permit lookup by plate text. `Ok(true)` only for an explicit "valid" answer.
#[async_trait]
pub trait PermitVerifier: Send + Sync {
    async fn verify(&self, plate_text: &str) -> Result<bool, ClientError>;
}

/// Runs the lookup and folds any failure into `Unavailable`; never fails.
pub async fn check(verifier: &dyn PermitVerifier, plate_text: &str) -> VerificationResult {
    match verifier.verify(plate_text).await {
        Ok(valid) => VerificationResult::Verified(valid),
        Err(e) => {
            warn!("Verification error for plate {:?}: {}", plate_text, e);
            VerificationResult::Unavailable(e.to_string())
        }
    }
}

/// Reads the `valid` flag. Anything but a JSON `true` counts as not valid.
pub fn permit_flag(body: &[u8]) -> Result<bool, ClientError> {
    let value = serde_json::from_slice::<Value>(body).map_err(|e| {
        ClientError::Protocol(format!("verification response is not JSON: {}", e))
    })?;
    Ok(value["valid"].as_bool().unwrap_or(false))
}

pub struct VerificationClient {
    http: reqwest::Client,
    base: Url,
}

impl VerificationClient {
    pub fn new(http: reqwest::Client, base: Url) -> VerificationClient {
        VerificationClient { http, base }
    }

    /// The plate text becomes one percent-encoded path segment under `base`.
    pub fn lookup_url(&self, plate_text: &str) -> Result<Url, ClientError> {
        let mut url = self.base.clone();
        url.path_segments_mut()
            .map_err(|_| ClientError::Transport(format!("{} cannot be a base URL", self.base)))?
            .pop_if_empty()
            .push(plate_text);
        Ok(url)
    }
}

#[async_trait]
impl PermitVerifier for VerificationClient {
    async fn verify(&self, plate_text: &str) -> Result<bool, ClientError> {
        let url = self.lookup_url(plate_text)?;
        debug!("Verifying permit at {}", url);
        let response = self.http.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ClientError::Status {
                status: status.as_u16(),
                body,
            });
        }
        let valid = permit_flag(&response.bytes().await?)?;
        info!("Permit for plate {:?} valid: {}", plate_text, valid);
        Ok(valid)
    }
}
