use async_trait::async_trait;

use crate::account::errors::AccountError;
use crate::account::errors::CredentialError;
use crate::domain::account::models::AccessToken;
use crate::domain::account::models::Account;
use crate::domain::account::models::AccountId;
use crate::domain::account::models::AuthenticateCommand;
use crate::domain::account::models::ChangeLoginCommand;
use crate::domain::account::models::CredentialPair;
use crate::domain::account::models::LoginChanged;
use crate::domain::account::models::ProvisionAccountCommand;
use crate::domain::account::models::Role;
use crate::domain::account::models::TokenSubject;
use crate::domain::account::models::Username;

/// Port for account credential operations.
#[async_trait]
pub trait AccountServicePort: Send + Sync + 'static {
    /// Create an account with a generated username and one-time password.
    ///
    /// # Arguments
    /// * `command` - First name, last name and role of the new account
    ///
    /// # Returns
    /// The generated credential pair; the password is not retrievable later
    ///
    /// # Errors
    /// * `Validation` - First or last name is blank
    /// * `UsernameAlreadyExists` - Generated username collided twice at save time
    /// * `DatabaseError` - Database operation failed
    async fn provision_account(
        &self,
        command: ProvisionAccountCommand,
    ) -> Result<CredentialPair, AccountError>;

    /// Verify a username/password pair and issue an access token.
    ///
    /// # Errors
    /// * `Validation` - Username or password is blank
    /// * `InvalidCredentials` - Unknown username, wrong password or inactive account
    /// * `DatabaseError` - Database operation failed
    async fn authenticate(&self, command: AuthenticateCommand)
        -> Result<AccessToken, AccountError>;

    /// Replace an account's username and password.
    ///
    /// # Errors
    /// * `Validation` - New username or password is blank
    /// * `NotFound` - No account with the given ID
    /// * `AccountMismatch` - Supplied current username names another account
    /// * `InvalidCredentials` - Password check failed
    /// * `UsernameAlreadyExists` - New username belongs to another account
    /// * `Conflict` - Account changed between read and write
    /// * `DatabaseError` - Database operation failed
    async fn change_login(&self, command: ChangeLoginCommand)
        -> Result<LoginChanged, AccountError>;

    /// Validate an access token and return its subject.
    ///
    /// # Errors
    /// * `TokenInvalid` - Bad signature, malformed token or unknown role
    /// * `TokenExpired` - Token expiry has passed
    fn verify_token(&self, token: &str) -> Result<TokenSubject, AccountError>;
}

/// Persistence operations for the account aggregate.
///
/// Implementations own username uniqueness: `create` and `update` must fail
/// with `UsernameAlreadyExists` rather than store a duplicate.
#[async_trait]
pub trait AccountRepository: Send + Sync + 'static {
    /// Persist a new account.
    ///
    /// # Errors
    /// * `UsernameAlreadyExists` - Username is already taken
    /// * `DatabaseError` - Database operation failed
    async fn create(&self, account: Account) -> Result<Account, AccountError>;

    /// Retrieve account by surrogate identifier.
    ///
    /// # Errors
    /// * `DatabaseError` - Database operation failed
    async fn find_by_id(&self, id: &AccountId) -> Result<Option<Account>, AccountError>;

    /// Retrieve account by username.
    ///
    /// # Errors
    /// * `DatabaseError` - Database operation failed
    async fn find_by_username(&self, username: &Username)
        -> Result<Option<Account>, AccountError>;

    /// Write back a modified account if nobody else changed it since it was read.
    ///
    /// The write succeeds only while the stored version equals
    /// `account.version`; the returned account carries the bumped version.
    ///
    /// # Errors
    /// * `NotFound` - Account does not exist
    /// * `Conflict` - Stored version differs from `account.version`
    /// * `UsernameAlreadyExists` - New username is already taken
    /// * `DatabaseError` - Database operation failed
    async fn update(&self, account: Account) -> Result<Account, AccountError>;
}

/// One-way password hashing.
pub trait CredentialHasher: Send + Sync + 'static {
    fn hash(&self, password: &str) -> Result<String, CredentialError>;

    /// `Ok(false)` on mismatch; errors only for unusable digests.
    fn verify(&self, password: &str, hash: &str) -> Result<bool, CredentialError>;
}

/// Signed, time-bounded access tokens.
pub trait TokenCodec: Send + Sync + 'static {
    fn issue(&self, username: &Username, role: Role) -> Result<AccessToken, AccountError>;

    /// # Errors
    /// * `TokenInvalid` - Bad signature, malformed token or unknown claims
    /// * `TokenExpired` - Token expiry has passed
    fn parse(&self, token: &str) -> Result<TokenSubject, AccountError>;
}

/// Source of one-time passwords.
pub trait SecretSource: Send + Sync + 'static {
    fn generate(&self) -> String;
}
