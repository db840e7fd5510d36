use crate::domain::ports::{Frame, FrameSource};
use crate::utils::error::{ClientError, Result};
use std::path::PathBuf;

/// Replays still images as camera frames, one image per frame.
#[derive(Debug, Clone)]
pub struct ImageFileSource {
    paths: Vec<PathBuf>,
    cursor: usize,
    active: bool,
}

impl ImageFileSource {
    pub fn new(paths: Vec<PathBuf>) -> Self {
        Self {
            paths,
            cursor: 0,
            active: false,
        }
    }

    pub fn is_active(&self) -> bool {
        self.active
    }
}

impl FrameSource for ImageFileSource {
    fn is_available(&self) -> bool {
        !self.paths.is_empty()
    }

    fn start(&mut self) -> Result<()> {
        if let Some(missing) = self.paths.iter().find(|p| !p.is_file()) {
            return Err(ClientError::CameraUnavailable {
                reason: format!("image not found: {}", missing.display()),
            });
        }
        self.cursor = 0;
        self.active = true;
        tracing::debug!("Image source started with {} file(s)", self.paths.len());
        Ok(())
    }

    fn next_frame(&mut self) -> Result<Option<Frame>> {
        if !self.active {
            return Err(ClientError::ScanFailed {
                message: "image source is not started".to_string(),
            });
        }

        let Some(path) = self.paths.get(self.cursor) else {
            return Err(ClientError::ScanFailed {
                message: format!("no QR code found in {} image(s)", self.paths.len()),
            });
        };
        self.cursor += 1;

        let luma = image::open(path)?.to_luma8();
        tracing::debug!(
            "Frame from {} ({}x{})",
            path.display(),
            luma.width(),
            luma.height()
        );
        Ok(Some(Frame {
            width: luma.width(),
            height: luma.height(),
            luma: luma.into_raw(),
        }))
    }

    fn stop(&mut self) {
        if self.active {
            tracing::debug!("Image source released");
        }
        self.active = false;
    }
}
