//! Access-token inspection for display and local expiry checks.
//!
//! Signatures are not verified here; the backend remains the authority. The
//! decoded claims only drive UI decisions such as showing the current user
//! or offering remote start to administrators.

use crate::utils::error::{ClientError, Result};
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use chrono::{DateTime, Duration, TimeZone, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Role {
    /// Backend `PATRON`: administrator.
    Patron,
    /// Backend `PERSONEL`: technician.
    Personel,
    Other(String),
}

impl Role {
    pub fn from_backend(raw: &str) -> Self {
        let normalized = raw.trim().trim_start_matches("ROLE_").to_ascii_uppercase();
        match normalized.as_str() {
            "PATRON" => Role::Patron,
            "PERSONEL" => Role::Personel,
            _ => Role::Other(raw.trim().to_string()),
        }
    }

    pub fn as_backend(&self) -> &str {
        match self {
            Role::Patron => "PATRON",
            Role::Personel => "PERSONEL",
            Role::Other(raw) => raw.as_str(),
        }
    }

    pub fn is_admin(&self) -> bool {
        matches!(self, Role::Patron)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::Patron => write!(f, "Admin (PATRON)"),
            Role::Personel => write!(f, "Technician (PERSONEL)"),
            Role::Other(raw) => write!(f, "{}", raw),
        }
    }
}

impl Serialize for Role {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_backend())
    }
}

impl<'de> Deserialize<'de> for Role {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(Role::from_backend(&raw))
    }
}

#[derive(Debug, Clone, Deserialize)]
struct RawClaims {
    sub: Option<String>,
    username: Option<String>,
    name: Option<String>,
    role: Option<Role>,
    roles: Option<Vec<Role>>,
    authorities: Option<Vec<Role>>,
    exp: Option<i64>,
    iat: Option<i64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TokenClaims {
    pub sub: Option<String>,
    pub username: Option<String>,
    pub role: Option<Role>,
    pub exp: Option<i64>,
    pub iat: Option<i64>,
}

impl From<RawClaims> for TokenClaims {
    fn from(raw: RawClaims) -> Self {
        let first = |list: Option<Vec<Role>>| list.and_then(|l| l.into_iter().next());
        let role = raw
            .role
            .or_else(|| first(raw.roles))
            .or_else(|| first(raw.authorities));

        Self {
            username: raw.username.or(raw.name).or_else(|| raw.sub.clone()),
            sub: raw.sub,
            role,
            exp: raw.exp,
            iat: raw.iat,
        }
    }
}

impl TokenClaims {
    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        self.exp.and_then(|exp| Utc.timestamp_opt(exp, 0).single())
    }

    pub fn is_admin(&self) -> bool {
        self.role.as_ref().is_some_and(Role::is_admin)
    }
}

/// Decode the payload segment of a JWT.
pub fn decode_claims(token: &str) -> Result<TokenClaims> {
    let mut parts = token.trim().split('.');
    let payload = match (parts.next(), parts.next(), parts.next(), parts.next()) {
        (Some(_), Some(payload), Some(_), None) if !payload.is_empty() => payload,
        _ => {
            return Err(ClientError::InvalidToken {
                reason: "expected three dot-separated segments".to_string(),
            })
        }
    };

    // 有些後端會保留 base64 padding
    let bytes = URL_SAFE_NO_PAD
        .decode(payload.trim_end_matches('='))
        .map_err(|e| ClientError::InvalidToken {
            reason: format!("payload is not base64url: {}", e),
        })?;

    let raw: RawClaims = serde_json::from_slice(&bytes).map_err(|e| ClientError::InvalidToken {
        reason: format!("payload is not a JSON claim set: {}", e),
    })?;

    Ok(raw.into())
}

pub fn is_token_expired_with_skew(token: &str, now: DateTime<Utc>, skew: Duration) -> bool {
    match decode_claims(token).ok().and_then(|c| c.exp) {
        Some(exp) => exp <= (now + skew).timestamp(),
        None => true,
    }
}

/// Undecodable tokens and tokens without `exp` count as expired.
pub fn is_token_expired(token: &str, now: DateTime<Utc>) -> bool {
    is_token_expired_with_skew(token, now, Duration::zero())
}

/// Remaining lifetime, `None` when already expired or undecodable.
pub fn expires_in(token: &str, now: DateTime<Utc>) -> Option<Duration> {
    let expires_at = decode_claims(token).ok()?.expires_at()?;
    let remaining = expires_at - now;
    (remaining > Duration::zero()).then_some(remaining)
}

#[cfg(test)]
pub(crate) fn make_test_token(claims: serde_json::Value) -> String {
    let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"HS256","typ":"JWT"}"#);
    let payload = URL_SAFE_NO_PAD.encode(claims.to_string());
    format!("{}.{}.signature", header, payload)
}
