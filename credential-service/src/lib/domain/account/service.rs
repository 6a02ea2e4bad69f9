use std::sync::Arc;
use std::sync::OnceLock;

use async_trait::async_trait;

use crate::account::errors::AccountError;
use crate::account::ports::AccountRepository;
use crate::account::ports::AccountServicePort;
use crate::account::ports::CredentialHasher;
use crate::account::ports::SecretSource;
use crate::account::ports::TokenCodec;
use crate::account::validation::check_account_match;
use crate::account::validation::RequiredFields;
use crate::domain::account::identifier::UsernameGenerator;
use crate::domain::account::models::AccessToken;
use crate::domain::account::models::Account;
use crate::domain::account::models::AuthenticateCommand;
use crate::domain::account::models::ChangeLoginCommand;
use crate::domain::account::models::CredentialPair;
use crate::domain::account::models::LoginChanged;
use crate::domain::account::models::ProvisionAccountCommand;
use crate::domain::account::models::RotationPolicy;
use crate::domain::account::models::TokenSubject;
use crate::domain::account::models::Username;

/// Save-time username collisions retried before giving up.
const PROVISION_CONFLICT_RETRIES: usize = 1;

/// Plaintext behind the digest verified when a login names no account.
const MISSING_ACCOUNT_PASSWORD: &str = "missing-account-placeholder";

/// Domain service implementation for account credential operations.
///
/// Stateless: every call works purely from its arguments and the repository.
pub struct AccountService<AR, CH, TC, SS>
where
    AR: AccountRepository,
    CH: CredentialHasher,
    TC: TokenCodec,
    SS: SecretSource,
{
    repository: Arc<AR>,
    usernames: UsernameGenerator<AR>,
    hasher: Arc<CH>,
    tokens: Arc<TC>,
    secrets: Arc<SS>,
    rotation_policy: RotationPolicy,
    disclose_rotated_password: bool,
    missing_account_digest: OnceLock<String>,
}

impl<AR, CH, TC, SS> AccountService<AR, CH, TC, SS>
where
    AR: AccountRepository,
    CH: CredentialHasher,
    TC: TokenCodec,
    SS: SecretSource,
{
    /// Create a new account service with injected dependencies.
    ///
    /// Rotation defaults to rejecting password mismatches and to keeping the
    /// rotated password out of the response.
    pub fn new(
        repository: Arc<AR>,
        hasher: Arc<CH>,
        tokens: Arc<TC>,
        secrets: Arc<SS>,
    ) -> Self {
        Self {
            usernames: UsernameGenerator::new(Arc::clone(&repository)),
            repository,
            hasher,
            tokens,
            secrets,
            rotation_policy: RotationPolicy::default(),
            disclose_rotated_password: false,
            missing_account_digest: OnceLock::new(),
        }
    }

    pub fn with_rotation_policy(mut self, policy: RotationPolicy) -> Self {
        self.rotation_policy = policy;
        self
    }

    /// Return the generated password from `change_login`.
    pub fn with_rotated_password_disclosure(mut self, disclose: bool) -> Self {
        self.disclose_rotated_password = disclose;
        self
    }

    /// Run one verification for a login with no matching account, so a miss
    /// costs the same Argon2 work as a wrong password.
    fn verify_missing_account(&self, password: &str) {
        let digest = self.missing_account_digest.get_or_init(|| {
            self.hasher
                .hash(MISSING_ACCOUNT_PASSWORD)
                .unwrap_or_default()
        });
        let _ = self.hasher.verify(password, digest);
    }

    fn authorize_rotation(&self, account: &Account, password: &str) -> Result<(), AccountError> {
        let authorized = match self.rotation_policy {
            RotationPolicy::RejectOnMismatch => {
                self.hasher.verify(password, &account.password_hash)?
            }
            RotationPolicy::Legacy => account.password_hash != password,
        };

        if authorized {
            Ok(())
        } else {
            tracing::warn!(
                account_id = %account.id,
                policy = ?self.rotation_policy,
                "Login change rejected: password check failed"
            );
            Err(AccountError::InvalidCredentials)
        }
    }
}

#[async_trait]
impl<AR, CH, TC, SS> AccountServicePort for AccountService<AR, CH, TC, SS>
where
    AR: AccountRepository,
    CH: CredentialHasher,
    TC: TokenCodec,
    SS: SecretSource,
{
    async fn provision_account(
        &self,
        command: ProvisionAccountCommand,
    ) -> Result<CredentialPair, AccountError> {
        RequiredFields::new()
            .field("first_name", &command.first_name)
            .field("last_name", &command.last_name)
            .check()?;

        let password = self.secrets.generate();
        let password_hash = self.hasher.hash(&password)?;

        let mut retries = 0;
        loop {
            let username = self
                .usernames
                .generate(&command.first_name, &command.last_name)
                .await?;
            let account = Account::new(username, password_hash.clone(), command.role);

            match self.repository.create(account).await {
                Ok(created) => {
                    tracing::info!(
                        account_id = %created.id,
                        username = %created.username,
                        role = %created.role,
                        "Account provisioned"
                    );

                    return Ok(CredentialPair {
                        account_id: created.id,
                        username: created.username,
                        password,
                    });
                }
                Err(AccountError::UsernameAlreadyExists(taken))
                    if retries < PROVISION_CONFLICT_RETRIES =>
                {
                    retries += 1;
                    tracing::warn!(
                        username = %taken,
                        retry = retries,
                        "Username taken at save time, regenerating"
                    );
                }
                Err(e) => return Err(e),
            }
        }
    }

    async fn authenticate(
        &self,
        command: AuthenticateCommand,
    ) -> Result<AccessToken, AccountError> {
        RequiredFields::new()
            .field("username", &command.username)
            .field("password", &command.password)
            .check()?;

        // A malformed username cannot exist, and says nothing more than an unknown one.
        let account = match Username::new(command.username.trim().to_string()) {
            Ok(username) => self.repository.find_by_username(&username).await?,
            Err(_) => None,
        };

        let Some(account) = account else {
            self.verify_missing_account(&command.password);
            tracing::warn!(
                username = %command.username.trim(),
                "Authentication failed: unknown username"
            );
            return Err(AccountError::InvalidCredentials);
        };

        if !self
            .hasher
            .verify(&command.password, &account.password_hash)?
        {
            tracing::warn!(account_id = %account.id, "Authentication failed: wrong password");
            return Err(AccountError::InvalidCredentials);
        }

        if !account.is_active {
            tracing::warn!(account_id = %account.id, "Authentication failed: account inactive");
            return Err(AccountError::InvalidCredentials);
        }

        let token = self.tokens.issue(&account.username, account.role)?;
        tracing::info!(
            account_id = %account.id,
            expires_at = %token.expires_at,
            "Account authenticated"
        );

        Ok(token)
    }

    async fn change_login(
        &self,
        command: ChangeLoginCommand,
    ) -> Result<LoginChanged, AccountError> {
        RequiredFields::new()
            .field("new_username", &command.new_username)
            .field("password", &command.password)
            .check()?;
        let new_username = Username::new(command.new_username.trim().to_string())?;

        let mut account = self
            .repository
            .find_by_id(&command.account_id)
            .await?
            .ok_or(AccountError::NotFound(command.account_id.to_string()))?;

        if let Some(supplied) = command.username.as_deref() {
            if !supplied.trim().is_empty() {
                check_account_match(&account, supplied)?;
            }
        }

        self.authorize_rotation(&account, &command.password)?;

        if !account.is_active {
            return Err(AccountError::AccountInactive(account.id.to_string()));
        }

        if new_username != account.username {
            if let Some(holder) = self.repository.find_by_username(&new_username).await? {
                if holder.id != account.id {
                    return Err(AccountError::UsernameAlreadyExists(
                        new_username.to_string(),
                    ));
                }
            }
        }

        let password = self.secrets.generate();
        account.password_hash = self.hasher.hash(&password)?;
        let previous_username = std::mem::replace(&mut account.username, new_username);

        let updated = self.repository.update(account).await?;
        tracing::info!(
            account_id = %updated.id,
            previous_username = %previous_username,
            username = %updated.username,
            "Login changed"
        );

        Ok(LoginChanged {
            account_id: updated.id,
            username: updated.username,
            password: self.disclose_rotated_password.then_some(password),
        })
    }

    fn verify_token(&self, token: &str) -> Result<TokenSubject, AccountError> {
        self.tokens.parse(token)
    }
}
