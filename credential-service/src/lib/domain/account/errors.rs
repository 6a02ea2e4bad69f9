use thiserror::Error;

/// Error for AccountId parsing failures
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum AccountIdError {
    #[error("Invalid UUID format: {0}")]
    InvalidFormat(String),
}

/// Error for Username validation failures
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum UsernameError {
    #[error("Username must not be empty")]
    Empty,

    #[error("Username too long: maximum {max} characters, got {actual}")]
    TooLong { max: usize, actual: usize },

    #[error("Username must not contain whitespace")]
    ContainsWhitespace,
}

/// Error for Role parsing failures
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RoleError {
    #[error("Unknown role: {0}")]
    Unknown(String),
}

/// Error for credential primitive failures (hashing, token signing)
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CredentialError {
    #[error("Password hashing failed: {0}")]
    HashingFailed(String),

    #[error("Password verification failed: {0}")]
    VerificationFailed(String),

    #[error("Token signing failed: {0}")]
    SigningFailed(String),
}

/// Top-level error for all account operations
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum AccountError {
    // Precondition errors
    #[error("Missing required fields: {}", .missing_fields.join(", "))]
    Validation { missing_fields: Vec<String> },

    #[error("Invalid account ID: {0}")]
    InvalidAccountId(#[from] AccountIdError),

    #[error("Invalid username: {0}")]
    InvalidUsername(#[from] UsernameError),

    #[error("Invalid role: {0}")]
    InvalidRole(#[from] RoleError),

    // Domain-level errors
    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Account not found: {0}")]
    NotFound(String),

    #[error("Username {username} does not belong to account {account_id}")]
    AccountMismatch {
        account_id: String,
        username: String,
    },

    #[error("Account is inactive: {0}")]
    AccountInactive(String),

    #[error("Username already exists: {0}")]
    UsernameAlreadyExists(String),

    #[error("Account was modified concurrently: {0}")]
    Conflict(String),

    #[error("Token is invalid")]
    TokenInvalid,

    #[error("Token is expired")]
    TokenExpired,

    // Infrastructure errors
    #[error("Credential error: {0}")]
    Credential(#[from] CredentialError),

    #[error("Database error: {0}")]
    DatabaseError(String),
}

