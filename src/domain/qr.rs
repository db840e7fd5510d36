use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// How a QR session came to be.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionOrigin {
    Scanned,
    Manual,
    RemoteStart,
}

impl fmt::Display for SessionOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            SessionOrigin::Scanned => "camera scan",
            SessionOrigin::Manual => "manual code entry",
            SessionOrigin::RemoteStart => "remote start",
        })
    }
}

/// Short-lived backend credential authorising work on one elevator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QrSession {
    pub token: String,
    pub elevator_id: i64,
    pub expires_at: Option<DateTime<Utc>>,
    pub origin: SessionOrigin,
}

impl QrSession {
    /// Sessions without an expiry are left to the backend to judge.
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.is_some_and(|exp| exp <= now)
    }
}
