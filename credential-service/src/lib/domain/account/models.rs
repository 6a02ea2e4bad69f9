use std::fmt;
use std::str::FromStr;

use chrono::DateTime;
use chrono::Utc;
use serde::Deserialize;
use serde::Serialize;
use uuid::Uuid;

use crate::account::errors::AccountIdError;
use crate::account::errors::RoleError;
use crate::account::errors::UsernameError;

/// Account aggregate entity.
///
/// Login credentials of a trainer, trainee or administrator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Account {
    pub id: AccountId,
    pub username: Username,
    pub password_hash: String,
    pub role: Role,
    pub is_active: bool,
    /// Optimistic concurrency counter, bumped by every successful update
    pub version: i64,
    pub created_at: DateTime<Utc>,
}

impl Account {
    /// Build a freshly provisioned, active account.
    pub fn new(username: Username, password_hash: String, role: Role) -> Self {
        Self {
            id: AccountId::new(),
            username,
            password_hash,
            role,
            is_active: true,
            version: 0,
            created_at: Utc::now(),
        }
    }
}

/// Account surrogate identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AccountId(pub Uuid);

impl AccountId {
    /// Generate a new random account ID.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Parse an account ID from string.
    ///
    /// # Errors
    /// * `InvalidFormat` - String is not a valid UUID
    pub fn from_string(s: &str) -> Result<Self, AccountIdError> {
        Uuid::parse_str(s)
            .map(AccountId)
            .map_err(|e| AccountIdError::InvalidFormat(e.to_string()))
    }
}

impl Default for AccountId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Login name value type
///
/// Non-blank, at most 64 characters, no whitespace. Case is preserved as
/// given; generated usernames are lowercase.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Username(String);

impl Username {
    pub const MAX_LENGTH: usize = 64;

    /// Create a new valid username.
    ///
    /// # Errors
    /// * `Empty` - Username is empty
    /// * `TooLong` - Username longer than 64 characters
    /// * `ContainsWhitespace` - Username contains whitespace
    pub fn new(username: String) -> Result<Self, UsernameError> {
        let length = username.chars().count();

        if length == 0 {
            return Err(UsernameError::Empty);
        }
        if length > Self::MAX_LENGTH {
            return Err(UsernameError::TooLong {
                max: Self::MAX_LENGTH,
                actual: length,
            });
        }
        if username.chars().any(char::is_whitespace) {
            return Err(UsernameError::ContainsWhitespace);
        }

        Ok(Self(username))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Username {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Coarse role tag, fixed at provisioning.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Trainee,
    Trainer,
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Trainee => "trainee",
            Role::Trainer => "trainer",
            Role::Admin => "admin",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = RoleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "trainee" => Ok(Role::Trainee),
            "trainer" => Ok(Role::Trainer),
            "admin" => Ok(Role::Admin),
            other => Err(RoleError::Unknown(other.to_string())),
        }
    }
}

/// One-time username/password pair handed to the caller.
///
/// The plaintext password exists only in this value; it is never persisted
/// and is redacted from `Debug` output.
#[derive(Clone, PartialEq, Eq)]
pub struct CredentialPair {
    pub account_id: AccountId,
    pub username: Username,
    pub password: String,
}

impl fmt::Debug for CredentialPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CredentialPair")
            .field("account_id", &self.account_id)
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Authenticated subject decoded from a valid access token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenSubject {
    pub username: Username,
    pub role: Role,
}

/// Access token returned by a successful authentication.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessToken {
    pub token: String,
    pub username: Username,
    pub expires_at: DateTime<Utc>,
}

/// Command to provision a new account.
///
/// Name fields arrive raw; blank values are rejected by the service before
/// anything else happens.
#[derive(Debug, Clone)]
pub struct ProvisionAccountCommand {
    pub first_name: String,
    pub last_name: String,
    pub role: Role,
}

/// Command to authenticate with a username and password.
#[derive(Clone)]
pub struct AuthenticateCommand {
    pub username: String,
    pub password: String,
}

impl fmt::Debug for AuthenticateCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthenticateCommand")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Command to rotate an account's login.
///
/// `username`, when present, must name the account resolved by `account_id`.
#[derive(Clone)]
pub struct ChangeLoginCommand {
    pub account_id: AccountId,
    pub username: Option<String>,
    pub new_username: String,
    pub password: String,
}

impl fmt::Debug for ChangeLoginCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChangeLoginCommand")
            .field("account_id", &self.account_id)
            .field("username", &self.username)
            .field("new_username", &self.new_username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Outcome of a login rotation.
///
/// `password` carries the newly generated secret only when disclosure is
/// enabled in configuration.
#[derive(Clone, PartialEq, Eq)]
pub struct LoginChanged {
    pub account_id: AccountId,
    pub username: Username,
    pub password: Option<String>,
}

impl fmt::Debug for LoginChanged {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoginChanged")
            .field("account_id", &self.account_id)
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

/// How `change_login` authorizes the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RotationPolicy {
    /// Supplied password must verify against the stored hash.
    #[default]
    RejectOnMismatch,
    /// Proceed when the stored hash string differs from the supplied value.
    /// Kept for compatibility with older clients only.
    Legacy,
}
