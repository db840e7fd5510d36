use crate::core::api_client::ApiClient;
use crate::domain::ports::SessionIssuer;
use crate::domain::qr::{QrSession, SessionOrigin};
use crate::domain::token::Role;
use crate::utils::error::{ClientError, Result};
use async_trait::async_trait;
use chrono::{DateTime, Duration, NaiveDateTime, Utc};
use serde::{de, Deserialize, Deserializer, Serialize};

#[derive(Debug, Serialize)]
struct ValidateRequest<'a> {
    #[serde(rename = "qrCode")]
    code: &'a str,
    #[serde(rename = "elevatorId")]
    elevator_id: i64,
}

#[derive(Debug, Serialize)]
struct RemoteStartRequest {
    #[serde(rename = "elevatorId")]
    elevator_id: i64,
}

#[derive(Debug, Deserialize)]
struct SessionResponse {
    #[serde(rename = "sessionToken", alias = "qrSessionToken", alias = "token")]
    token: String,
    #[serde(rename = "elevatorId", deserialize_with = "lenient_id")]
    elevator_id: i64,
    #[serde(rename = "expiresAt", default)]
    expires_at: Option<String>,
    #[serde(rename = "expiresIn", default)]
    expires_in: Option<i64>,
}

/// Some backend versions send ids as strings.
fn lenient_id<'de, D: Deserializer<'de>>(deserializer: D) -> std::result::Result<i64, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawId {
        Number(i64),
        Text(String),
    }

    match RawId::deserialize(deserializer)? {
        RawId::Number(n) => Ok(n),
        RawId::Text(s) => s
            .trim()
            .parse()
            .map_err(|_| de::Error::custom(format!("invalid elevator id: {}", s))),
    }
}

fn parse_expiry(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    // 沒有時區資訊時視為 UTC
    ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .map(|naive| naive.and_utc())
}

impl SessionResponse {
    fn into_session(
        self,
        requested_elevator: i64,
        origin: SessionOrigin,
        now: DateTime<Utc>,
    ) -> Result<QrSession> {
        if self.elevator_id != requested_elevator {
            tracing::warn!(
                "QR session issued for elevator {} but {} was requested, rejecting",
                self.elevator_id,
                requested_elevator
            );
            return Err(ClientError::ElevatorMismatch {
                expected: requested_elevator,
                actual: self.elevator_id,
            });
        }
        if self.token.trim().is_empty() {
            return Err(ClientError::ApiError {
                status: 200,
                message: "Backend returned an empty QR session token".to_string(),
            });
        }

        let expires_at = match self.expires_at.as_deref().and_then(parse_expiry) {
            Some(at) => Some(at),
            None => match self.expires_in {
                Some(secs) => Some(
                    Duration::try_seconds(secs)
                        .and_then(|d| now.checked_add_signed(d))
                        .ok_or_else(|| ClientError::ApiError {
                            status: 200,
                            message: format!("invalid expiresIn: {}", secs),
                        })?,
                ),
                None => None,
            },
        };

        Ok(QrSession {
            token: self.token,
            elevator_id: self.elevator_id,
            expires_at,
            origin,
        })
    }
}

/// `/qr/validate` and `/qr/remote-start`.
#[derive(Clone)]
pub struct QrSessionService {
    client: ApiClient,
}

impl QrSessionService {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl SessionIssuer for QrSessionService {
    async fn validate(
        &self,
        code: &str,
        elevator_id: i64,
        origin: SessionOrigin,
    ) -> Result<QrSession> {
        let code = code.trim();
        if code.is_empty() {
            return Err(ClientError::validation("qrCode", "QR code is empty"));
        }

        tracing::info!("🔐 Validating QR code for elevator {}", elevator_id);
        let response: SessionResponse = self
            .client
            .post("/qr/validate", &ValidateRequest { code, elevator_id })
            .await?;
        response.into_session(elevator_id, origin, Utc::now())
    }

    async fn remote_start(&self, elevator_id: i64, role: Option<&Role>) -> Result<QrSession> {
        if !role.is_some_and(Role::is_admin) {
            return Err(ClientError::Forbidden {
                message: "remote start is only available to PATRON users".to_string(),
            });
        }

        tracing::info!("📡 Remote start for elevator {}", elevator_id);
        let response: SessionResponse = self
            .client
            .post("/qr/remote-start", &RemoteStartRequest { elevator_id })
            .await?;
        response.into_session(elevator_id, SessionOrigin::RemoteStart, Utc::now())
    }
}
