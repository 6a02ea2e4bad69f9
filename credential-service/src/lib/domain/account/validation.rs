//! Precondition checks run at the top of every account operation.

use crate::account::errors::AccountError;
use crate::domain::account::models::Account;

/// Collects blank mandatory fields and reports them together.
///
/// ```
/// use credential_service::account::validation::RequiredFields;
///
/// let result = RequiredFields::new()
///     .field("first_name", "Ada")
///     .field("last_name", "  ")
///     .check();
/// assert!(result.is_err());
/// ```
#[derive(Debug, Default)]
pub struct RequiredFields {
    missing: Vec<String>,
}

impl RequiredFields {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a mandatory field; whitespace-only counts as missing.
    pub fn field(mut self, name: &str, value: &str) -> Self {
        if value.trim().is_empty() {
            self.missing.push(name.to_string());
        }
        self
    }

    /// # Errors
    /// * `Validation` - At least one field was blank, listed in registration order
    pub fn check(self) -> Result<(), AccountError> {
        if self.missing.is_empty() {
            Ok(())
        } else {
            Err(AccountError::Validation {
                missing_fields: self.missing,
            })
        }
    }
}

/// Ensure `supplied` is the username of `account`.
///
/// # Errors
/// * `AccountMismatch` - `supplied` names a different login
pub fn check_account_match(account: &Account, supplied: &str) -> Result<(), AccountError> {
    if account.username.as_str() == supplied.trim() {
        Ok(())
    } else {
        Err(AccountError::AccountMismatch {
            account_id: account.id.to_string(),
            username: supplied.to_string(),
        })
    }
}
