//! Device push-notification token.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Errors that can occur when parsing a [`PushTokenValue`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum PushTokenError {
    /// The token is missing or blank.
    #[error("Push token is required")]
    Missing,
    /// The token exceeds the maximum accepted length.
    #[error("push token must be at most {max} characters")]
    TooLong {
        /// Maximum allowed length.
        max: usize,
    },
}

/// The opaque token string a device hands out for push delivery
/// (e.g. `ExponentPushToken[...]`). Unique per device registration.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PushTokenValue(String);

impl PushTokenValue {
    /// Longest token accepted from clients.
    pub const MAX_LENGTH: usize = 512;

    /// Parse a token, trimming whitespace.
    ///
    /// # Errors
    ///
    /// Returns `PushTokenError::Missing` for blank input and
    /// `PushTokenError::TooLong` past [`Self::MAX_LENGTH`].
    pub fn parse(raw: &str) -> Result<Self, PushTokenError> {
        let raw = raw.trim();
        if raw.is_empty() {
            return Err(PushTokenError::Missing);
        }
        if raw.len() > Self::MAX_LENGTH {
            return Err(PushTokenError::TooLong {
                max: Self::MAX_LENGTH,
            });
        }
        Ok(Self(raw.to_owned()))
    }

    /// The token text.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PushTokenValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_token_is_missing() {
        assert_eq!(PushTokenValue::parse(""), Err(PushTokenError::Missing));
        assert_eq!(PushTokenValue::parse("  \t"), Err(PushTokenError::Missing));
    }

    #[test]
    fn test_token_is_trimmed() {
        let token = PushTokenValue::parse(" ExponentPushToken[abc] ");
        assert_eq!(token.map(|t| t.to_string()), Ok("ExponentPushToken[abc]".to_owned()));
    }

    #[test]
    fn test_overlong_token_is_rejected() {
        let raw = "x".repeat(PushTokenValue::MAX_LENGTH + 1);
        assert!(matches!(
            PushTokenValue::parse(&raw),
            Err(PushTokenError::TooLong { .. })
        ));
    }
}
