use chrono::{DateTime, Duration, Utc};
use parking_lot::Mutex;
use serde::Deserialize;
use serde_json::Value;

const EXPIRY_SKEW_SECONDS: i64 = 30;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessToken {
    pub value: String,
    pub obtained_at: DateTime<Utc>,
    pub expires_at: Option<DateTime<Utc>>,
}

impl AccessToken {
    pub fn is_usable(&self, now: DateTime<Utc>) -> bool {
        self.expires_at
            .map(|expires_at| now + Duration::seconds(EXPIRY_SKEW_SECONDS) < expires_at)
            .unwrap_or(true)
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct TokenResponse {
    pub access_token: String,
    /// Kept loose: an unreadable lifetime only disables expiry tracking.
    #[serde(default)]
    pub expires_in: Option<Value>,
}

impl TokenResponse {
    pub fn into_token(self, now: DateTime<Utc>) -> AccessToken {
        let expires_at = self
            .expires_in
            .as_ref()
            .and_then(lifetime_seconds)
            .filter(|seconds| *seconds > 0)
            .and_then(Duration::try_seconds)
            .and_then(|lifetime| now.checked_add_signed(lifetime));

        AccessToken {
            value: self.access_token,
            obtained_at: now,
            expires_at,
        }
    }
}

fn lifetime_seconds(value: &Value) -> Option<i64> {
    match value {
        Value::Number(number) => number
            .as_i64()
            .or_else(|| number.as_f64().filter(|f| f.is_finite()).map(|f| f as i64)),
        Value::String(text) => text.trim().parse().ok(),
        _ => None,
    }
}

/// The one bearer token shared by every in-flight request. The lock is only
/// held to read or swap the value; concurrent refreshes simply overwrite each
/// other.
#[derive(Debug, Default)]
pub(crate) struct TokenCell {
    inner: Mutex<Option<AccessToken>>,
}

impl TokenCell {
    pub fn current(&self, now: DateTime<Utc>) -> Option<String> {
        self.inner
            .lock()
            .as_ref()
            .filter(|token| token.is_usable(now))
            .map(|token| token.value.clone())
    }

    pub fn store(&self, token: AccessToken) -> String {
        let value = token.value.clone();
        *self.inner.lock() = Some(token);
        value
    }

    pub fn clear(&self) {
        self.inner.lock().take();
    }

    pub fn snapshot(&self) -> Option<AccessToken> {
        self.inner.lock().clone()
    }
}
