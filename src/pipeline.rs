use crate::camera::Camera;
use crate::config::ServiceConfig;
use crate::detect::{Detection, DetectionClient, PlateDetector};
use crate::error::{ConfigError, EncodingError, RunError};
use crate::preprocess;
use crate::types::{DetectionResult, Outcome};
use crate::verify::{self, PermitVerifier, VerificationClient};
use log::{error, info};
use std::sync::Arc;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Idle,
    Capturing,
    Preprocessing,
    Detecting,
    Verifying,
    NoPlateFound,
    Failed,
    Completed,
}

impl Stage {
    /// True while a run is between capture and its terminal stage.
    pub fn in_flight(self) -> bool {
        match self {
            Stage::Capturing | Stage::Preprocessing | Stage::Detecting | Stage::Verifying => true,
            _ => false,
        }
    }
}

/// How a single run ended.
#[derive(Debug)]
pub enum RunEnd {
    Completed(Outcome),
    NoPlateFound { image_uri: String },
    Failed(RunError),
}

/// capture -> preprocess -> detect -> verify, strictly in that order.
pub struct CapturePipeline {
    camera: Arc<dyn Camera>,
    detector: Arc<dyn PlateDetector>,
    verifier: Arc<dyn PermitVerifier>,
}

impl CapturePipeline {
    pub fn new(
        camera: Arc<dyn Camera>,
        detector: Arc<dyn PlateDetector>,
        verifier: Arc<dyn PermitVerifier>,
    ) -> CapturePipeline {
        CapturePipeline {
            camera,
            detector,
            verifier,
        }
    }

    /// Wires the HTTP service clients described by `config`.
    pub fn from_config(
        camera: Arc<dyn Camera>,
        config: &ServiceConfig,
    ) -> Result<CapturePipeline, ConfigError> {
        let http = config.http_client()?;
        Ok(CapturePipeline::new(
            camera,
            Arc::new(DetectionClient::new(http.clone(), config.detect_url.clone())),
            Arc::new(VerificationClient::new(http, config.verify_url.clone())),
        ))
    }

    /// Executes one run, reporting each stage to `publish` as it is entered.
    ///
    /// Failures before a plate is read abort the run. Once a plate is read the run
    /// always completes; a failed lookup yields an Outcome with `permit_valid == false`.
    pub async fn run<F>(&self, mut publish: F) -> RunEnd
    where
        F: FnMut(Stage) + Send,
    {
        let run = Uuid::new_v4().simple().to_string();
        info!("[{}] Capture started", run);

        let (image_uri, detection) = match self.read_plate(&run, &mut publish).await {
            Ok(read) => read,
            Err(e) => {
                error!("[{}] Run aborted: {}", run, e);
                publish(Stage::Failed);
                return RunEnd::Failed(e);
            }
        };

        let plate_text = match detection.result {
            DetectionResult::PlateFound(text) => text,
            DetectionResult::NoPlateFound => {
                info!("[{}] No license plate found", run);
                publish(Stage::NoPlateFound);
                return RunEnd::NoPlateFound { image_uri };
            }
        };

        publish(Stage::Verifying);
        let verification = verify::check(self.verifier.as_ref(), &plate_text).await;
        let outcome = Outcome::new(
            image_uri,
            plate_text,
            verification,
            Some(detection.raw.to_string()),
        );
        info!(
            "[{}] Plate {:?}, permit valid: {}",
            run,
            outcome.plate_text(),
            outcome.permit_valid()
        );
        publish(Stage::Completed);
        RunEnd::Completed(outcome)
    }

    async fn read_plate<F>(&self, run: &str, publish: &mut F) -> Result<(String, Detection), RunError>
    where
        F: FnMut(Stage) + Send,
    {
        publish(Stage::Capturing);
        let captured = self.camera.take_picture().await?;
        info!(
            "[{}] Captured {} ({:?}x{:?}, device {:?})",
            run, captured.uri, captured.width_hint, captured.height_hint, captured.device
        );

        publish(Stage::Preprocessing);
        let image_uri = captured.uri.clone();
        let payload = tokio::task::spawn_blocking(move || preprocess::prepare(&captured))
            .await
            .map_err(|e| EncodingError::Encode(e.to_string()))??;

        publish(Stage::Detecting);
        let detection = self.detector.detect(payload).await?;
        Ok((image_uri, detection))
    }
}
