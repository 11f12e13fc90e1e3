use crate::error::ClientError;
use crate::types::{DetectionResult, EncodedPayload};
use async_trait::async_trait;
use log::{debug, info};
use serde_json::{json, Value};
use url::Url;

/// Plate detection and OCR over an encoded photo.
#[async_trait]
pub trait PlateDetector: Send + Sync {
    async fn detect(&self, payload: EncodedPayload) -> Result<Detection, ClientError>;
}

#[derive(Debug, Clone, PartialEq)]
pub struct Detection {
    pub result: DetectionResult,
    /// Response body as received, kept for diagnostics.
    pub raw: Value,
}

impl Detection {
    /// The service answers with a JSON array whose first element is the plate text.
    /// An empty array, a null or an empty string mean no plate was seen.
    pub fn from_response(raw: Value) -> Result<Detection, ClientError> {
        let result = match &raw {
            Value::Array(items) => match items.first() {
                None | Some(Value::Null) => DetectionResult::NoPlateFound,
                Some(Value::String(text)) if text.is_empty() => DetectionResult::NoPlateFound,
                Some(Value::String(text)) => DetectionResult::PlateFound(text.clone()),
                Some(other) => {
                    return Err(ClientError::Protocol(format!(
                        "unexpected plate value {}",
                        other
                    )))
                }
            },
            other => {
                return Err(ClientError::Protocol(format!(
                    "expected a JSON array, got {}",
                    other
                )))
            }
        };
        Ok(Detection { result, raw })
    }
}

pub struct DetectionClient {
    http: reqwest::Client,
    endpoint: Url,
}

impl DetectionClient {
    pub fn new(http: reqwest::Client, endpoint: Url) -> DetectionClient {
        DetectionClient { http, endpoint }
    }
}

#[async_trait]
impl PlateDetector for DetectionClient {
    async fn detect(&self, payload: EncodedPayload) -> Result<Detection, ClientError> {
        debug!(
            "Posting {} byte {:?} payload to {}",
            payload.data.len(),
            payload.format,
            self.endpoint
        );
        let body = json!({ "image": payload.to_base64() });
        drop(payload);

        let response = self
            .http
            .post(self.endpoint.clone())
            .json(&body)
            .send()
            .await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ClientError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let bytes = response.bytes().await?;
        let value = serde_json::from_slice::<Value>(&bytes).map_err(|e| {
            ClientError::Protocol(format!("detection response is not JSON: {}", e))
        })?;
        let detection = Detection::from_response(value)?;
        info!("Detection result: {:?}", detection.result);
        Ok(detection)
    }
}
