//! Scripted stand-ins for the camera and the two remote services.

use crate::camera::Camera;
use crate::detect::{Detection, PlateDetector};
use crate::error::{CaptureError, ClientError};
use crate::pipeline::CapturePipeline;
use crate::types::{CapturedImage, EncodedPayload};
use crate::verify::PermitVerifier;
use async_trait::async_trait;
use bytes::Bytes;
use image::{DynamicImage, ImageFormat, Rgb, RgbImage};
use parking_lot::Mutex;
use serde_json::json;
use std::io::Cursor;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::Notify;

pub fn png_bytes(width: u32, height: u32) -> Bytes {
    let image = RgbImage::from_fn(width, height, |x, y| {
        Rgb([(x % 256) as u8, (y % 256) as u8, 128])
    });
    let mut out = Cursor::new(Vec::new());
    DynamicImage::ImageRgb8(image)
        .write_to(&mut out, ImageFormat::Png)
        .unwrap();
    Bytes::from(out.into_inner())
}

pub fn captured(data: Bytes) -> CapturedImage {
    CapturedImage {
        uri: FakeCamera::URI.to_string(),
        data,
        width_hint: None,
        height_hint: None,
        device: None,
    }
}

pub fn pipeline(
    camera: FakeCamera,
    detector: Arc<FakeDetector>,
    verifier: Arc<FakeVerifier>,
) -> CapturePipeline {
    CapturePipeline::new(Arc::new(camera), detector, verifier)
}

pub struct FakeCamera {
    image: Option<CapturedImage>,
    denied: bool,
    gate: Option<Arc<Notify>>,
}

impl FakeCamera {
    pub const URI: &'static str = "file:///photos/plate.jpg";

    pub fn photo() -> FakeCamera {
        FakeCamera {
            image: Some(captured(png_bytes(1200, 900))),
            denied: false,
            gate: None,
        }
    }

    pub fn garbage() -> FakeCamera {
        FakeCamera {
            image: Some(captured(Bytes::from_static(b"definitely not a photo"))),
            denied: false,
            gate: None,
        }
    }

    pub fn failing() -> FakeCamera {
        FakeCamera {
            image: None,
            denied: false,
            gate: None,
        }
    }

    pub fn denied() -> FakeCamera {
        FakeCamera {
            image: None,
            denied: true,
            gate: None,
        }
    }

    /// Holds every capture until `gate` is notified.
    pub fn gated(mut self, gate: Arc<Notify>) -> FakeCamera {
        self.gate = Some(gate);
        self
    }
}

#[async_trait]
impl Camera for FakeCamera {
    async fn take_picture(&self) -> Result<CapturedImage, CaptureError> {
        if let Some(gate) = &self.gate {
            gate.notified().await;
        }
        if self.denied {
            return Err(CaptureError::PermissionDenied);
        }
        self.image.clone().ok_or(CaptureError::NoImage)
    }
}

#[derive(Clone, Copy)]
pub enum DetectScript {
    Plate(&'static str),
    Empty,
    Status(u16),
}

pub struct FakeDetector {
    script: DetectScript,
    gate: Option<Arc<Notify>>,
    calls: AtomicUsize,
    widths: Mutex<Vec<u32>>,
}

impl FakeDetector {
    pub fn new(script: DetectScript) -> FakeDetector {
        FakeDetector {
            script,
            gate: None,
            calls: AtomicUsize::new(0),
            widths: Mutex::new(Vec::new()),
        }
    }

    pub fn gated(mut self, gate: Arc<Notify>) -> FakeDetector {
        self.gate = Some(gate);
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn widths(&self) -> Vec<u32> {
        self.widths.lock().clone()
    }
}

#[async_trait]
impl PlateDetector for FakeDetector {
    async fn detect(&self, payload: EncodedPayload) -> Result<Detection, ClientError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.widths.lock().push(payload.width);
        if let Some(gate) = &self.gate {
            gate.notified().await;
        }
        match self.script {
            DetectScript::Plate(text) => Detection::from_response(json!([text])),
            DetectScript::Empty => Detection::from_response(json!([])),
            DetectScript::Status(status) => Err(ClientError::Status {
                status,
                body: "boom".to_string(),
            }),
        }
    }
}

#[derive(Clone, Copy)]
pub enum VerifyScript {
    Valid(bool),
    Fail,
}

pub struct FakeVerifier {
    script: VerifyScript,
    plates: Mutex<Vec<String>>,
}

impl FakeVerifier {
    pub fn new(script: VerifyScript) -> FakeVerifier {
        FakeVerifier {
            script,
            plates: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> usize {
        self.plates.lock().len()
    }

    pub fn plates(&self) -> Vec<String> {
        self.plates.lock().clone()
    }
}

#[async_trait]
impl PermitVerifier for FakeVerifier {
    async fn verify(&self, plate_text: &str) -> Result<bool, ClientError> {
        self.plates.lock().push(plate_text.to_string());
        match self.script {
            VerifyScript::Valid(valid) => Ok(valid),
            VerifyScript::Fail => Err(ClientError::Status {
                status: 503,
                body: "unavailable".to_string(),
            }),
        }
    }
}
