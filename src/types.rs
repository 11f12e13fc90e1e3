use base64::Engine;
use bytes::Bytes;
use serde::Serialize;

/// Shown on the results screen whenever the permit lookup did not complete.
pub const VERIFY_FAILED_MESSAGE: &str = "Failed to verify permit";

/// A photo as handed over by the camera, before any processing.
#[derive(Debug, Clone)]
pub struct CapturedImage {
    pub uri: String,
    pub data: Bytes,
    pub width_hint: Option<u32>,
    pub height_hint: Option<u32>,
    pub device: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PayloadFormat {
    Jpeg,
}

/// Compressed image ready for upload. Consumed by a single detection call.
#[derive(Debug)]
pub struct EncodedPayload {
    pub data: Bytes,
    pub format: PayloadFormat,
    pub width: u32,
    pub height: u32,
}

impl EncodedPayload {
    pub fn to_base64(&self) -> String {
        base64::engine::general_purpose::STANDARD.encode(&self.data)
    }
}

/// Plate text is raw OCR output and is passed along untouched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DetectionResult {
    NoPlateFound,
    PlateFound(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VerificationResult {
    Verified(bool),
    Unavailable(String),
}

impl VerificationResult {
    /// Only an affirmative answer from the verification service counts.
    pub fn permit_valid(&self) -> bool {
        match self {
            VerificationResult::Verified(valid) => *valid,
            VerificationResult::Unavailable(_) => false,
        }
    }
}

/// Terminal record of one capture, handed to the results screen.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Outcome {
    image_uri: String,
    plate_text: Option<String>,
    permit_valid: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    error_message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    api_debug: Option<String>,
}

impl Outcome {
    pub fn new(
        image_uri: String,
        plate_text: String,
        verification: VerificationResult,
        api_debug: Option<String>,
    ) -> Outcome {
        let error_message = match verification {
            VerificationResult::Verified(_) => None,
            VerificationResult::Unavailable(_) => Some(VERIFY_FAILED_MESSAGE.to_string()),
        };
        Outcome {
            image_uri,
            plate_text: Some(plate_text),
            permit_valid: verification.permit_valid(),
            error_message,
            api_debug,
        }
    }

    pub fn image_uri(&self) -> &str {
        &self.image_uri
    }

    pub fn plate_text(&self) -> Option<&str> {
        self.plate_text.as_deref()
    }

    pub fn permit_valid(&self) -> bool {
        self.permit_valid
    }

    pub fn error_message(&self) -> Option<&str> {
        self.error_message.as_deref()
    }

    pub fn api_debug(&self) -> Option<&str> {
        self.api_debug.as_deref()
    }
}
