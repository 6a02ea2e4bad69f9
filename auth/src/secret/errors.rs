use thiserror::Error;

/// Error type for secret generation setup.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SecretError {
    #[error("Secret length must be at least 1")]
    ZeroLength,
}
