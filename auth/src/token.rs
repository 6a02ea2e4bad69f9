use chrono::DateTime;
use chrono::Duration;
use chrono::Utc;

use crate::jwt::Claims;
use crate::jwt::JwtError;
use crate::jwt::JwtHandler;

/// Issues and validates time-bounded access tokens.
///
/// Wraps a [`JwtHandler`] with a fixed token lifetime. Tokens carry the
/// subject, its role, the issue time and the expiry; nothing is stored
/// server-side, so expiry is the only way a token stops being valid.
pub struct TokenService {
    jwt_handler: JwtHandler,
    lifetime: Duration,
}

/// A freshly issued access token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssuedToken {
    /// Signed JWT
    pub access_token: String,
    /// Instant from which the token no longer parses
    pub expires_at: DateTime<Utc>,
}

impl TokenService {
    /// Create a token service.
    ///
    /// # Arguments
    /// * `secret` - Key used to sign and verify tokens
    /// * `lifetime` - How long an issued token stays valid
    pub fn new(secret: &[u8], lifetime: Duration) -> Self {
        Self {
            jwt_handler: JwtHandler::new(secret),
            lifetime,
        }
    }

    pub fn lifetime(&self) -> Duration {
        self.lifetime
    }

    /// Issue a token for `subject` with `role`, valid from now.
    ///
    /// # Errors
    /// * `EncodingFailed` - Token signing failed
    pub fn issue(&self, subject: &str, role: &str) -> Result<IssuedToken, JwtError> {
        self.issue_at(subject, role, Utc::now())
    }

    /// Issue a token as if the current time were `now`.
    pub fn issue_at(
        &self,
        subject: &str,
        role: &str,
        now: DateTime<Utc>,
    ) -> Result<IssuedToken, JwtError> {
        let claims = Claims::new(subject, role, now, self.lifetime);
        let access_token = self.jwt_handler.encode(&claims)?;

        Ok(IssuedToken {
            access_token,
            expires_at: now + self.lifetime,
        })
    }

    /// Validate a token against the current time and return its claims.
    ///
    /// # Errors
    /// * `InvalidToken` - Bad signature, malformed token or missing claims
    /// * `TokenExpired` - Signature is valid but the expiry has passed
    pub fn parse(&self, token: &str) -> Result<Claims, JwtError> {
        self.parse_at(token, Utc::now())
    }

    /// Validate a token as if the current time were `now`.
    pub fn parse_at(&self, token: &str, now: DateTime<Utc>) -> Result<Claims, JwtError> {
        let claims: Claims = self.jwt_handler.decode(token)?;

        if claims.is_expired(now.timestamp()) {
            return Err(JwtError::TokenExpired);
        }

        Ok(claims)
    }
}
