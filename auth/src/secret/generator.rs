use rand::distributions::Alphanumeric;
use rand::rngs::OsRng;
use rand::Rng;

use super::errors::SecretError;

pub const DEFAULT_SECRET_LENGTH: usize = 10;

/// Generator of one-time passwords.
///
/// Draws from `[A-Za-z0-9]` using the operating system's CSPRNG. A failing
/// OS random source panics: there is no safe fallback for credential material.
#[derive(Debug, Clone, Copy)]
pub struct SecretGenerator {
    length: usize,
}

impl SecretGenerator {
    /// Create a generator producing secrets of `length` characters.
    ///
    /// # Errors
    /// * `ZeroLength` - `length` is 0
    pub fn new(length: usize) -> Result<Self, SecretError> {
        if length == 0 {
            return Err(SecretError::ZeroLength);
        }

        Ok(Self { length })
    }

    pub fn length(&self) -> usize {
        self.length
    }

    /// Generate a new random secret.
    pub fn generate(&self) -> String {
        OsRng
            .sample_iter(&Alphanumeric)
            .take(self.length)
            .map(char::from)
            .collect()
    }
}

impl Default for SecretGenerator {
    fn default() -> Self {
        Self {
            length: DEFAULT_SECRET_LENGTH,
        }
    }
}
