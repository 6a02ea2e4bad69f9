//! Credential primitives library
//!
//! Provides reusable credential infrastructure for services:
//! - Password hashing (Argon2id)
//! - One-time password generation
//! - JWT access token issuance and validation
//!
//! Services define their own credential traits and adapt these
//! implementations, so no account model leaks into this crate.
//!
//! # Examples
//!
//! ## Password Hashing
//! ```
//! use auth::PasswordHasher;
//!
//! let hasher = PasswordHasher::new();
//! let hash = hasher.hash("my_password").unwrap();
//! assert!(hasher.verify("my_password", &hash).unwrap());
//! ```
//!
//! ## One-time Passwords
//! ```
//! use auth::SecretGenerator;
//!
//! let secret = SecretGenerator::new(10).unwrap().generate();
//! assert_eq!(secret.len(), 10);
//! ```
//!
//! ## Access Tokens
//! ```
//! use auth::TokenService;
//! use chrono::Duration;
//!
//! let tokens = TokenService::new(b"secret_key_at_least_32_bytes_long!", Duration::hours(24));
//! let issued = tokens.issue("ada.lovelace", "trainee").unwrap();
//! let claims = tokens.parse(&issued.access_token).unwrap();
//! assert_eq!(claims.sub, "ada.lovelace");
//! ```

pub mod jwt;
pub mod password;
pub mod secret;
pub mod token;

// Re-export commonly used items
pub use jwt::Claims;
pub use jwt::JwtError;
pub use jwt::JwtHandler;
pub use password::PasswordError;
pub use password::PasswordHasher;
pub use secret::SecretError;
pub use secret::SecretGenerator;
pub use token::IssuedToken;
pub use token::TokenService;
