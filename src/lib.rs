//! Reads a license plate from a photo and checks it against the permit service.
//!
//! A run goes camera -> [`preprocess`] -> [`detect`] -> [`verify`] and ends in an
//! [`Outcome`]. [`CapturePipeline`] sequences the steps; [`CaptureSurface`] is
//! what a screen mounts to drive it.

pub mod camera;
pub mod config;
pub mod detect;
pub mod error;
pub mod pipeline;
pub mod preprocess;
pub mod results;
pub mod surface;
pub mod types;
pub mod verify;

#[cfg(test)]
mod testing;

pub use crate::camera::{Camera, FileCamera};
pub use crate::config::ServiceConfig;
pub use crate::pipeline::{CapturePipeline, RunEnd, Stage};
pub use crate::surface::{Alert, CaptureSurface, ScreenEvent, SurfaceView, UiState};
pub use crate::types::{DetectionResult, Outcome, VerificationResult};
