use crate::error::CaptureError;
use crate::types::CapturedImage;
use async_trait::async_trait;
use bytes::Bytes;
use image::ImageReader;
use log::{debug, warn};
use std::io::Cursor;
use std::path::{Path, PathBuf};
use url::Url;

/// The device boundary: one call, one photo.
#[async_trait]
pub trait Camera: Send + Sync {
    async fn take_picture(&self) -> Result<CapturedImage, CaptureError>;
}

/// Serves a photo that is already on disk, as if it had just been taken.
pub struct FileCamera {
    path: PathBuf,
    device: Option<String>,
}

impl FileCamera {
    pub fn new(path: impl Into<PathBuf>) -> FileCamera {
        FileCamera {
            path: path.into(),
            device: None,
        }
    }

    pub fn with_device(mut self, device: impl Into<String>) -> FileCamera {
        self.device = Some(device.into());
        self
    }
}

#[async_trait]
impl Camera for FileCamera {
    async fn take_picture(&self) -> Result<CapturedImage, CaptureError> {
        let unreadable = |e: std::io::Error| CaptureError::Unreadable {
            uri: self.path.display().to_string(),
            reason: e.to_string(),
        };
        let path = tokio::fs::canonicalize(&self.path)
            .await
            .map_err(unreadable)?;
        let data = tokio::fs::read(&path).await.map_err(unreadable)?;
        if data.is_empty() {
            return Err(CaptureError::NoImage);
        }
        let (width_hint, height_hint) = match dimensions(&data) {
            Some((w, h)) => (Some(w), Some(h)),
            None => {
                // Not fatal here; the preprocessor reports undecodable images.
                warn!("Unable to read dimensions of {:?}", path);
                (None, None)
            }
        };
        let uri = file_uri(&path);
        debug!("Captured {} bytes from {}", data.len(), uri);
        Ok(CapturedImage {
            uri,
            data: Bytes::from(data),
            width_hint,
            height_hint,
            device: self.device.clone(),
        })
    }
}

fn dimensions(data: &[u8]) -> Option<(u32, u32)> {
    ImageReader::new(Cursor::new(data))
        .with_guessed_format()
        .ok()?
        .into_dimensions()
        .ok()
}

fn file_uri(path: &Path) -> String {
    match Url::from_file_path(path) {
        Ok(url) => url.to_string(),
        Err(_) => path.display().to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::png_bytes;
    use std::io::Write;

    #[tokio::test]
    async fn reads_photo_with_hints() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(&png_bytes(320, 240)).unwrap();
        let camera = FileCamera::new(file.path()).with_device("test-rig");

        let image = camera.take_picture().await.unwrap();
        assert!(image.uri.starts_with("file://"));
        assert_eq!(image.width_hint, Some(320));
        assert_eq!(image.height_hint, Some(240));
        assert_eq!(image.device.as_deref(), Some("test-rig"));
    }

    #[tokio::test]
    async fn empty_file_is_no_image() {
        let file = tempfile::NamedTempFile::new().unwrap();
        let camera = FileCamera::new(file.path());
        match camera.take_picture().await {
            Err(CaptureError::NoImage) => {}
            other => panic!("unexpected result {:?}", other),
        }
    }

    #[tokio::test]
    async fn missing_file_is_unreadable() {
        let camera = FileCamera::new("/definitely/not/here.jpg");
        match camera.take_picture().await {
            Err(CaptureError::Unreadable { uri, .. }) => assert!(uri.ends_with("here.jpg")),
            other => panic!("unexpected result {:?}", other),
        }
    }
}
