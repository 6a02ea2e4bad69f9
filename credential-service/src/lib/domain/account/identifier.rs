use std::sync::Arc;

use crate::account::errors::AccountError;
use crate::domain::account::models::Username;
use crate::domain::account::ports::AccountRepository;

/// Derives `first.last` usernames and resolves collisions with a numeric suffix.
///
/// The lookup here is only a fast path: two concurrent provisions can pick
/// the same free name, and the repository's unique constraint decides which
/// one wins.
pub struct UsernameGenerator<AR>
where
    AR: AccountRepository,
{
    repository: Arc<AR>,
}

impl<AR> UsernameGenerator<AR>
where
    AR: AccountRepository,
{
    pub fn new(repository: Arc<AR>) -> Self {
        Self { repository }
    }

    /// Build the collision-free username for a name pair.
    ///
    /// Returns `first.last` when free, otherwise `first.lastN` with the
    /// smallest `N >= 1` that is not taken. The base is cut short where
    /// needed so that base and suffix together fit `Username::MAX_LENGTH`.
    ///
    /// # Errors
    /// * `Validation` - A name part is empty after normalization
    /// * `DatabaseError` - Lookup failed
    pub async fn generate(
        &self,
        first_name: &str,
        last_name: &str,
    ) -> Result<Username, AccountError> {
        let base = Self::base_username(first_name, last_name)?;

        if self.repository.find_by_username(&base).await?.is_none() {
            return Ok(base);
        }

        let mut suffix: u64 = 1;
        loop {
            let candidate = with_suffix(&base, suffix)?;
            if self.repository.find_by_username(&candidate).await?.is_none() {
                tracing::debug!(
                    base = %base,
                    username = %candidate,
                    "Resolved username collision"
                );
                return Ok(candidate);
            }
            suffix += 1;
        }
    }

    /// Normalized `first.last`: trimmed, lowercased, inner whitespace removed,
    /// truncated to `Username::MAX_LENGTH` characters.
    pub fn base_username(first_name: &str, last_name: &str) -> Result<Username, AccountError> {
        let first = normalize(first_name);
        let last = normalize(last_name);

        let mut missing_fields = Vec::new();
        if first.is_empty() {
            missing_fields.push("first_name".to_string());
        }
        if last.is_empty() {
            missing_fields.push("last_name".to_string());
        }
        if !missing_fields.is_empty() {
            return Err(AccountError::Validation { missing_fields });
        }

        let base: String = format!("{}.{}", first, last)
            .chars()
            .take(Username::MAX_LENGTH)
            .collect();

        Ok(Username::new(base)?)
    }
}

fn with_suffix(base: &Username, suffix: u64) -> Result<Username, AccountError> {
    let suffix = suffix.to_string();
    let stem: String = base
        .as_str()
        .chars()
        .take(Username::MAX_LENGTH - suffix.len())
        .collect();

    Ok(Username::new(format!("{}{}", stem, suffix))?)
}

fn normalize(name_part: &str) -> String {
    name_part
        .chars()
        .filter(|c| !c.is_whitespace())
        .flat_map(char::to_lowercase)
        .collect()
}
