//! Bearer tokens and JWT expiry decoding.
//!
//! Only the `exp` claim is read. The signature is not verified here; the
//! chat backend does that on every request.

use crate::error::AuthError;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// An opaque bearer credential with a known expiry.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Token {
    value: String,
    expires_at: DateTime<Utc>,
}

impl Token {
    pub fn new(value: impl Into<String>, expires_at: DateTime<Utc>) -> Self {
        Self {
            value: value.into(),
            expires_at,
        }
    }

    /// Builds a token from a JWT, taking the expiry from its `exp` claim.
    pub fn from_jwt(jwt: &str) -> Result<Self, AuthError> {
        let expires_at = decode_expiry(jwt)?;
        Ok(Self::new(jwt, expires_at))
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn expires_at(&self) -> DateTime<Utc> {
        self.expires_at
    }

    /// `true` while `now` is strictly before the expiry.
    pub fn is_usable_at(&self, now: DateTime<Utc>) -> bool {
        now < self.expires_at
    }
}

impl fmt::Debug for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Token")
            .field("value", &"[REDACTED]")
            .field("expires_at", &self.expires_at)
            .finish()
    }
}

#[derive(Deserialize)]
struct ExpiryClaim {
    exp: Option<serde_json::Number>,
}

/// Reads the `exp` claim (seconds since the epoch) from a JWT payload.
pub fn decode_expiry(jwt: &str) -> Result<DateTime<Utc>, AuthError> {
    let mut parts = jwt.split('.');
    let payload = match (parts.next(), parts.next(), parts.next(), parts.next()) {
        (Some(_), Some(payload), Some(_), None) => payload,
        _ => {
            return Err(AuthError::MalformedToken(
                "expected three dot-separated segments".to_string(),
            ))
        }
    };

    let bytes = URL_SAFE_NO_PAD
        .decode(payload.trim_end_matches('='))
        .map_err(|e| AuthError::MalformedToken(format!("payload is not base64url: {e}")))?;

    let claim: ExpiryClaim = serde_json::from_slice(&bytes)
        .map_err(|e| AuthError::MalformedToken(format!("payload is not JSON: {e}")))?;

    let exp = claim
        .exp
        .ok_or_else(|| AuthError::MalformedToken("missing exp claim".to_string()))?;

    let seconds = exp
        .as_i64()
        .or_else(|| exp.as_f64().map(|f| f.floor() as i64))
        .ok_or_else(|| AuthError::MalformedToken(format!("exp claim {exp} is not a number")))?;

    DateTime::from_timestamp(seconds, 0)
        .ok_or_else(|| AuthError::MalformedToken(format!("exp claim {seconds} is out of range")))
}
