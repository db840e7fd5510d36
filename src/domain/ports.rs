use crate::domain::qr::{QrSession, SessionOrigin};
use crate::domain::token::Role;
use crate::utils::error::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenPair {
    #[serde(rename = "accessToken", alias = "token")]
    pub access_token: String,
    #[serde(rename = "refreshToken", default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
}

/// Persistent home of the access/refresh tokens.
pub trait TokenStore: Send + Sync {
    fn load(&self) -> Result<Option<TokenPair>>;
    fn save(&self, tokens: &TokenPair) -> Result<()>;
    fn clear(&self) -> Result<()>;

    fn access_token(&self) -> Result<Option<String>> {
        Ok(self.load()?.map(|t| t.access_token))
    }
}

/// One greyscale camera frame, row-major.
#[derive(Debug, Clone)]
pub struct Frame {
    pub width: u32,
    pub height: u32,
    pub luma: Vec<u8>,
}

impl Frame {
    pub fn pixel(&self, x: usize, y: usize) -> u8 {
        self.luma
            .get(y * self.width as usize + x)
            .copied()
            .unwrap_or(u8::MAX)
    }
}

/// Camera-like producer of frames.
///
/// `stop` must release the underlying device and be safe to call more than once.
/// `next_frame` may block (file or device IO); the scanner moves it off the
/// async worker when the runtime allows it.
pub trait FrameSource: Send {
    fn is_available(&self) -> bool;
    fn start(&mut self) -> Result<()>;
    /// `Ok(None)` means no frame is ready yet.
    fn next_frame(&mut self) -> Result<Option<Frame>>;
    fn stop(&mut self);
}

pub trait QrDecoder: Send + Sync {
    fn decode(&self, frame: &Frame) -> Option<String>;
}

/// Issues QR sessions: validation of a scanned/typed code, or admin remote start.
#[async_trait]
pub trait SessionIssuer: Send + Sync {
    async fn validate(
        &self,
        code: &str,
        elevator_id: i64,
        origin: SessionOrigin,
    ) -> Result<QrSession>;

    async fn remote_start(&self, elevator_id: i64, role: Option<&Role>) -> Result<QrSession>;
}
