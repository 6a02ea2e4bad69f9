use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::account::errors::AccountError;
use crate::domain::account::models::Account;
use crate::domain::account::models::AccountId;
use crate::domain::account::models::Username;
use crate::domain::account::ports::AccountRepository;

/// Process-local account store.
///
/// Applies the same uniqueness and version rules as the PostgreSQL
/// repository, each write checked and applied under one write lock.
#[derive(Debug, Clone, Default)]
pub struct InMemoryAccountRepository {
    accounts: Arc<RwLock<HashMap<AccountId, Account>>>,
}

impl InMemoryAccountRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored accounts
    pub async fn len(&self) -> usize {
        self.accounts.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.accounts.read().await.is_empty()
    }
}

fn username_taken_by_other(
    accounts: &HashMap<AccountId, Account>,
    username: &Username,
    id: &AccountId,
) -> bool {
    accounts
        .values()
        .any(|existing| existing.username == *username && existing.id != *id)
}

#[async_trait]
impl AccountRepository for InMemoryAccountRepository {
    async fn create(&self, account: Account) -> Result<Account, AccountError> {
        let mut accounts = self.accounts.write().await;

        if username_taken_by_other(&accounts, &account.username, &account.id) {
            return Err(AccountError::UsernameAlreadyExists(
                account.username.to_string(),
            ));
        }
        if accounts.contains_key(&account.id) {
            return Err(AccountError::DatabaseError(format!(
                "duplicate account id {}",
                account.id
            )));
        }

        accounts.insert(account.id, account.clone());
        Ok(account)
    }

    async fn find_by_id(&self, id: &AccountId) -> Result<Option<Account>, AccountError> {
        Ok(self.accounts.read().await.get(id).cloned())
    }

    async fn find_by_username(
        &self,
        username: &Username,
    ) -> Result<Option<Account>, AccountError> {
        Ok(self
            .accounts
            .read()
            .await
            .values()
            .find(|account| account.username == *username)
            .cloned())
    }

    async fn update(&self, mut account: Account) -> Result<Account, AccountError> {
        let mut accounts = self.accounts.write().await;

        let stored_version = accounts
            .get(&account.id)
            .map(|stored| stored.version)
            .ok_or(AccountError::NotFound(account.id.to_string()))?;

        if stored_version != account.version {
            return Err(AccountError::Conflict(account.id.to_string()));
        }
        if username_taken_by_other(&accounts, &account.username, &account.id) {
            return Err(AccountError::UsernameAlreadyExists(
                account.username.to_string(),
            ));
        }

        account.version += 1;
        accounts.insert(account.id, account.clone());
        Ok(account)
    }
}
