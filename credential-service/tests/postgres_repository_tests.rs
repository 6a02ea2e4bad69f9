//! PostgreSQL adapter tests.
//!
//! These need a running server: `DATABASE_URL=... cargo test -- --ignored`.

mod common;

use common::TestDb;
use credential_service::domain::account::errors::AccountError;
use credential_service::domain::account::models::Account;
use credential_service::domain::account::models::AccountId;
use credential_service::domain::account::models::Role;
use credential_service::domain::account::models::Username;
use credential_service::domain::account::ports::AccountRepository;
use credential_service::outbound::repositories::PostgresAccountRepository;

fn username(s: &str) -> Username {
    Username::new(s.to_string()).unwrap()
}

fn account(name: &str) -> Account {
    Account::new(username(name), "$argon2id$stored".to_string(), Role::Trainer)
}

#[tokio::test]
#[ignore = "requires PostgreSQL at DATABASE_URL"]
async fn test_create_and_find() {
    let db = TestDb::new().await;
    let repository = PostgresAccountRepository::new(db.pool.clone());

    let created = repository.create(account("ada.lovelace")).await.unwrap();

    let by_id = repository.find_by_id(&created.id).await.unwrap().unwrap();
    assert_eq!(by_id.username, username("ada.lovelace"));
    assert_eq!(by_id.role, Role::Trainer);
    assert_eq!(by_id.version, 0);
    assert!(by_id.is_active);

    let by_username = repository
        .find_by_username(&username("ada.lovelace"))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(by_username.id, created.id);

    assert!(repository
        .find_by_username(&username("charles.babbage"))
        .await
        .unwrap()
        .is_none());
}

#[tokio::test]
#[ignore = "requires PostgreSQL at DATABASE_URL"]
async fn test_create_duplicate_username() {
    let db = TestDb::new().await;
    let repository = PostgresAccountRepository::new(db.pool.clone());

    repository.create(account("ada.lovelace")).await.unwrap();
    let result = repository.create(account("ada.lovelace")).await;

    assert_eq!(
        result.unwrap_err(),
        AccountError::UsernameAlreadyExists("ada.lovelace".to_string())
    );
}

#[tokio::test]
#[ignore = "requires PostgreSQL at DATABASE_URL"]
async fn test_update_bumps_version() {
    let db = TestDb::new().await;
    let repository = PostgresAccountRepository::new(db.pool.clone());

    let mut stored = repository.create(account("ada.lovelace")).await.unwrap();
    stored.username = username("ada.byron");
    stored.password_hash = "$argon2id$rotated".to_string();

    let updated = repository.update(stored).await.unwrap();
    assert_eq!(updated.version, 1);

    let reloaded = repository.find_by_id(&updated.id).await.unwrap().unwrap();
    assert_eq!(reloaded.username, username("ada.byron"));
    assert_eq!(reloaded.password_hash, "$argon2id$rotated");
    assert_eq!(reloaded.version, 1);
}

#[tokio::test]
#[ignore = "requires PostgreSQL at DATABASE_URL"]
async fn test_update_with_stale_version_conflicts() {
    let db = TestDb::new().await;
    let repository = PostgresAccountRepository::new(db.pool.clone());

    let stored = repository.create(account("ada.lovelace")).await.unwrap();
    let mut first = stored.clone();
    let mut second = stored.clone();

    first.username = username("ada.byron");
    repository.update(first).await.unwrap();

    second.username = username("ada.king");
    let result = repository.update(second).await;
    assert_eq!(result.unwrap_err(), AccountError::Conflict(stored.id.to_string()));

    let reloaded = repository.find_by_id(&stored.id).await.unwrap().unwrap();
    assert_eq!(reloaded.username, username("ada.byron"));
}

#[tokio::test]
#[ignore = "requires PostgreSQL at DATABASE_URL"]
async fn test_update_missing_account_is_not_found() {
    let db = TestDb::new().await;
    let repository = PostgresAccountRepository::new(db.pool.clone());

    let mut ghost = account("ada.lovelace");
    ghost.id = AccountId::new();

    let result = repository.update(ghost.clone()).await;
    assert_eq!(result.unwrap_err(), AccountError::NotFound(ghost.id.to_string()));
}

#[tokio::test]
#[ignore = "requires PostgreSQL at DATABASE_URL"]
async fn test_update_to_taken_username() {
    let db = TestDb::new().await;
    let repository = PostgresAccountRepository::new(db.pool.clone());

    repository.create(account("ada.lovelace")).await.unwrap();
    let mut other = repository.create(account("charles.babbage")).await.unwrap();
    other.username = username("ada.lovelace");

    let result = repository.update(other).await;
    assert_eq!(
        result.unwrap_err(),
        AccountError::UsernameAlreadyExists("ada.lovelace".to_string())
    );
}
