use chrono::DateTime;
use chrono::Duration;
use chrono::Utc;
use serde::Deserialize;
use serde::Serialize;

/// Access token claims.
///
/// Carries the account identifier as the RFC 7519 subject together with a
/// coarse role tag. All fields are mandatory: a token missing any of them
/// fails to decode.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Claims {
    /// Subject (account identifier)
    pub sub: String,

    /// Role tag of the subject
    pub role: String,

    /// Issued at (Unix timestamp)
    pub iat: i64,

    /// Expiration time (Unix timestamp)
    pub exp: i64,
}

impl Claims {
    /// Create claims valid for `lifetime` starting at `issued_at`.
    pub fn new(
        subject: impl ToString,
        role: impl ToString,
        issued_at: DateTime<Utc>,
        lifetime: Duration,
    ) -> Self {
        let expiration = issued_at + lifetime;

        Self {
            sub: subject.to_string(),
            role: role.to_string(),
            iat: issued_at.timestamp(),
            exp: expiration.timestamp(),
        }
    }

    /// Check whether the token has expired at `current_timestamp`.
    ///
    /// The expiry instant itself is already expired.
    pub fn is_expired(&self, current_timestamp: i64) -> bool {
        current_timestamp >= self.exp
    }

    /// Expiration as a UTC datetime.
    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(self.exp, 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_claims() {
        let issued_at = DateTime::from_timestamp(1_700_000_000, 0).unwrap();
        let claims = Claims::new("ada.lovelace", "trainee", issued_at, Duration::hours(24));

        assert_eq!(claims.sub, "ada.lovelace");
        assert_eq!(claims.role, "trainee");
        assert_eq!(claims.iat, 1_700_000_000);
        assert_eq!(claims.exp - claims.iat, 24 * 60 * 60);
    }

    #[test]
    fn test_is_expired() {
        let issued_at = DateTime::from_timestamp(0, 0).unwrap();
        let claims = Claims::new("user", "admin", issued_at, Duration::seconds(1000));

        assert!(!claims.is_expired(999));
        assert!(claims.is_expired(1000));
        assert!(claims.is_expired(1001));
    }

    #[test]
    fn test_expires_at() {
        let issued_at = DateTime::from_timestamp(1_000, 0).unwrap();
        let claims = Claims::new("user", "trainer", issued_at, Duration::seconds(60));

        assert_eq!(
            claims.expires_at(),
            Some(DateTime::from_timestamp(1_060, 0).unwrap())
        );
    }
}
