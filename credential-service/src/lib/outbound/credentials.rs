//! Adapters binding the domain's credential ports to the `auth` crate.

use auth::JwtError;

use crate::account::errors::AccountError;
use crate::account::errors::CredentialError;
use crate::domain::account::models::AccessToken;
use crate::domain::account::models::Role;
use crate::domain::account::models::TokenSubject;
use crate::domain::account::models::Username;
use crate::domain::account::ports::CredentialHasher;
use crate::domain::account::ports::SecretSource;
use crate::domain::account::ports::TokenCodec;

impl CredentialHasher for auth::PasswordHasher {
    fn hash(&self, password: &str) -> Result<String, CredentialError> {
        auth::PasswordHasher::hash(self, password)
            .map_err(|e| CredentialError::HashingFailed(e.to_string()))
    }

    fn verify(&self, password: &str, hash: &str) -> Result<bool, CredentialError> {
        auth::PasswordHasher::verify(self, password, hash)
            .map_err(|e| CredentialError::VerificationFailed(e.to_string()))
    }
}

impl TokenCodec for auth::TokenService {
    fn issue(&self, username: &Username, role: Role) -> Result<AccessToken, AccountError> {
        let issued = auth::TokenService::issue(self, username.as_str(), role.as_str())
            .map_err(|e| CredentialError::SigningFailed(e.to_string()))?;

        Ok(AccessToken {
            token: issued.access_token,
            username: username.clone(),
            expires_at: issued.expires_at,
        })
    }

    fn parse(&self, token: &str) -> Result<TokenSubject, AccountError> {
        let claims = auth::TokenService::parse(self, token).map_err(|e| match e {
            JwtError::TokenExpired => AccountError::TokenExpired,
            other => {
                tracing::debug!(error = %other, "Rejected access token");
                AccountError::TokenInvalid
            }
        })?;

        let username = Username::new(claims.sub).map_err(|_| AccountError::TokenInvalid)?;
        let role = claims
            .role
            .parse::<Role>()
            .map_err(|_| AccountError::TokenInvalid)?;

        Ok(TokenSubject { username, role })
    }
}

impl SecretSource for auth::SecretGenerator {
    fn generate(&self) -> String {
        auth::SecretGenerator::generate(self)
    }
}
