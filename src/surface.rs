//! The camera screen's view of the pipeline.
//!
//! The surface owns the run lifecycle: at most one run at a time, stage updates
//! pushed through a watch channel, and terminal results delivered once through
//! an event channel. Unmounting aborts the run and closes both channels, so
//! nothing reaches a screen that is gone.

use crate::error::{RunError, GENERIC_FAILURE_MESSAGE};
use crate::pipeline::{CapturePipeline, RunEnd, Stage};
use crate::types::Outcome;
use futures::future::{AbortHandle, Abortable};
use futures::FutureExt;
use log::{debug, info};
use parking_lot::Mutex;
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UiState {
    pub stage: Stage,
    /// Bumped once per accepted capture; drives the shutter animation.
    pub capture_pulses: u64,
}

impl UiState {
    pub fn is_capturing(&self) -> bool {
        self.stage == Stage::Capturing
    }

    pub fn is_processing(&self) -> bool {
        self.stage.in_flight()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Alert {
    pub title: String,
    pub message: String,
    pub detail: Option<String>,
}

impl Alert {
    pub fn no_plate_found() -> Alert {
        Alert {
            title: "No License Plate Found".to_string(),
            message: "We couldn't detect a license plate in the image. \
                      Please try again with a clearer photo."
                .to_string(),
            detail: None,
        }
    }

    pub fn failure(error: &RunError) -> Alert {
        Alert {
            title: "Error".to_string(),
            message: GENERIC_FAILURE_MESSAGE.to_string(),
            detail: Some(error.to_string()),
        }
    }
}

impl fmt::Display for Alert {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.title, self.message)?;
        if let Some(detail) = &self.detail {
            write!(f, " ({})", detail)?;
        }
        Ok(())
    }
}

#[derive(Debug)]
pub enum ScreenEvent {
    /// Navigate to the results screen. The surface is detached afterwards.
    ShowResults(Outcome),
    /// Retry prompt; the surface is back to Idle.
    NoPlateFound(Alert),
    /// Error prompt; the surface is back to Idle.
    Failed(Alert),
}

/// What the presentation layer observes.
pub struct SurfaceView {
    pub state: watch::Receiver<UiState>,
    pub events: mpsc::UnboundedReceiver<ScreenEvent>,
}

struct Link {
    state: watch::Sender<UiState>,
    events: mpsc::UnboundedSender<ScreenEvent>,
    pulses: u64,
}

impl Link {
    fn set_stage(&mut self, stage: Stage) {
        if stage == Stage::Capturing {
            self.pulses += 1;
        }
        self.state.send_replace(UiState {
            stage,
            capture_pulses: self.pulses,
        });
    }

    fn alert(&mut self, event: ScreenEvent) {
        if self.events.send(event).is_err() {
            debug!("Screen event dropped; nobody is listening");
        }
        self.set_stage(Stage::Idle);
    }
}

struct Shared {
    link: Mutex<Option<Link>>,
    in_flight: AtomicBool,
    abort: Mutex<Option<AbortHandle>>,
}

impl Shared {
    fn publish_stage(&self, stage: Stage) {
        if let Some(link) = self.link.lock().as_mut() {
            link.set_stage(stage);
        }
    }

    fn finish(&self, end: RunEnd) {
        let mut slot = self.link.lock();
        if slot.is_none() {
            debug!("Discarding run result for unmounted surface");
            return;
        }
        match end {
            RunEnd::Completed(outcome) => {
                // Results replace the camera screen.
                if let Some(link) = slot.take() {
                    if link.events.send(ScreenEvent::ShowResults(outcome)).is_err() {
                        debug!("Results dropped; nobody is listening");
                    }
                }
            }
            RunEnd::NoPlateFound { .. } => {
                if let Some(link) = slot.as_mut() {
                    link.alert(ScreenEvent::NoPlateFound(Alert::no_plate_found()));
                }
            }
            RunEnd::Failed(error) => {
                if let Some(link) = slot.as_mut() {
                    link.alert(ScreenEvent::Failed(Alert::failure(&error)));
                }
            }
        }
    }
}

/// Clears the in-flight flag however the run ends, aborts included.
struct RunGuard(Arc<Shared>);

impl Drop for RunGuard {
    fn drop(&mut self) {
        self.0.in_flight.store(false, Ordering::Release);
    }
}

pub struct CaptureSurface {
    pipeline: Arc<CapturePipeline>,
    shared: Arc<Shared>,
}

impl CaptureSurface {
    pub fn mount(pipeline: Arc<CapturePipeline>) -> (CaptureSurface, SurfaceView) {
        let initial = UiState {
            stage: Stage::Idle,
            capture_pulses: 0,
        };
        let (state_tx, state_rx) = watch::channel(initial);
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        let shared = Arc::new(Shared {
            link: Mutex::new(Some(Link {
                state: state_tx,
                events: events_tx,
                pulses: 0,
            })),
            in_flight: AtomicBool::new(false),
            abort: Mutex::new(None),
        });
        let view = SurfaceView {
            state: state_rx,
            events: events_rx,
        };
        (CaptureSurface { pipeline, shared }, view)
    }

    /// Starts a run on the current tokio runtime.
    ///
    /// Returns `None` without doing anything if a run is already in flight or
    /// the surface has been unmounted.
    pub fn capture(&self) -> Option<JoinHandle<()>> {
        if !self.is_mounted() {
            debug!("Capture requested on unmounted surface; ignoring");
            return None;
        }
        if self
            .shared
            .in_flight
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            debug!("Capture already in flight; ignoring");
            return None;
        }
        let guard = RunGuard(self.shared.clone());
        let pipeline = self.pipeline.clone();
        let shared = self.shared.clone();
        let (abort, registration) = AbortHandle::new_pair();
        *self.shared.abort.lock() = Some(abort);

        let run = async move {
            let end = pipeline.run(|stage| shared.publish_stage(stage)).await;
            shared.finish(end);
            drop(guard);
        };
        Some(tokio::spawn(Abortable::new(run, registration).map(|_| ())))
    }

    pub fn is_mounted(&self) -> bool {
        self.shared.link.lock().is_some()
    }

    /// Tears the surface down: any in-flight run is abandoned and no further
    /// state or events are published.
    pub fn unmount(&self) {
        if let Some(abort) = self.shared.abort.lock().take() {
            abort.abort();
        }
        if self.shared.link.lock().take().is_some() {
            info!("Capture surface unmounted");
        }
    }
}

impl Drop for CaptureSurface {
    fn drop(&mut self) {
        self.unmount();
    }
}
