//! Authentication service.
//!
//! Username and password login backed by argon2id hashes.

mod error;

pub use error::AuthError;

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use tracing::instrument;

use corner_store_core::{AccountRole, Username};

use crate::db::{AccountRepository, RepositoryError, Store};
use crate::models::Account;

/// Minimum password length.
const MIN_PASSWORD_LENGTH: usize = 8;

/// Authentication service.
///
/// Handles account creation and password login.
pub struct AuthService<'a> {
    store: &'a dyn Store,
}

impl<'a> AuthService<'a> {
    /// Create a new authentication service.
    #[must_use]
    pub const fn new(store: &'a dyn Store) -> Self {
        Self { store }
    }

    /// Create an account with a username and password.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidUsername` if the username format is invalid.
    /// Returns `AuthError::WeakPassword` if the password doesn't meet requirements.
    /// Returns `AuthError::AccountAlreadyExists` if the username is taken.
    #[instrument(skip(self, password))]
    pub async fn create_account(
        &self,
        username: &str,
        password: &str,
        role: AccountRole,
    ) -> Result<Account, AuthError> {
        let username = Username::parse(username)?;
        validate_password(password)?;
        let password_hash = hash_password(password)?;

        let account = self
            .store
            .create_account(&username, &password_hash, role)
            .await
            .map_err(|e| match e {
                RepositoryError::Conflict(_) => AuthError::AccountAlreadyExists,
                other => AuthError::Repository(other),
            })?;

        tracing::info!(account_id = %account.id, %role, "account created");
        Ok(account)
    }

    /// Change an account's role. Takes effect on the account's next staff
    /// request; no re-login needed.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::AccountNotFound` if there is no such username.
    #[instrument(skip(self))]
    pub async fn set_role(&self, username: &str, role: AccountRole) -> Result<Account, AuthError> {
        let username = Username::parse(username).map_err(|_| AuthError::AccountNotFound)?;
        let account = self
            .store
            .set_account_role(&username, role)
            .await
            .map_err(|e| match e {
                RepositoryError::NotFound => AuthError::AccountNotFound,
                other => AuthError::Repository(other),
            })?;

        tracing::info!(account_id = %account.id, %role, "account role changed");
        Ok(account)
    }

    /// Login with username and password.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidCredentials` if the username or password is wrong.
    #[instrument(skip(self, password))]
    pub async fn login(&self, username: &str, password: &str) -> Result<Account, AuthError> {
        // A malformed username can never match an account
        let username = Username::parse(username).map_err(|_| AuthError::InvalidCredentials)?;

        let (account, password_hash) = self
            .store
            .get_account_with_hash(&username)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        verify_password(password, &password_hash)?;

        Ok(account)
    }
}

/// Validate password meets minimum requirements.
fn validate_password(password: &str) -> Result<(), AuthError> {
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(AuthError::WeakPassword(format!(
            "password must be at least {MIN_PASSWORD_LENGTH} characters"
        )));
    }

    Ok(())
}

/// Hash a password using Argon2id.
fn hash_password(password: &str) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();

    argon2
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|_| AuthError::PasswordHash)
}

/// Verify a password against a hash.
fn verify_password(password: &str, hash: &str) -> Result<(), AuthError> {
    let parsed_hash = PasswordHash::new(hash).map_err(|_| AuthError::InvalidCredentials)?;
    let argon2 = Argon2::default();

    argon2
        .verify_password(password.as_bytes(), &parsed_hash)
        .map_err(|_| AuthError::InvalidCredentials)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::db::memory::MemoryStore;

    #[test]
    fn test_hash_and_verify_password() {
        let hash = hash_password("correct horse").unwrap();
        assert!(hash.starts_with("$argon2id$"));
        assert!(verify_password("correct horse", &hash).is_ok());
        assert!(matches!(
            verify_password("wrong horse", &hash),
            Err(AuthError::InvalidCredentials)
        ));
    }

    #[test]
    fn test_validate_password_length() {
        assert!(matches!(
            validate_password("short"),
            Err(AuthError::WeakPassword(_))
        ));
        assert!(validate_password("longenough").is_ok());
    }

    #[tokio::test]
    async fn test_create_account_and_login() {
        let store = MemoryStore::new();
        let auth = AuthService::new(&store);

        let account = auth
            .create_account("erin", "s3cret-pass", AccountRole::Staff)
            .await
            .unwrap();
        assert!(account.is_staff());

        let logged_in = auth.login("erin", "s3cret-pass").await.unwrap();
        assert_eq!(logged_in.id, account.id);

        assert!(matches!(
            auth.login("erin", "nope-nope").await,
            Err(AuthError::InvalidCredentials)
        ));
        assert!(matches!(
            auth.login("nobody", "s3cret-pass").await,
            Err(AuthError::InvalidCredentials)
        ));
    }

    #[tokio::test]
    async fn test_create_account_duplicate() {
        let store = MemoryStore::new();
        let auth = AuthService::new(&store);
        auth.create_account("finn", "password1", AccountRole::Customer)
            .await
            .unwrap();
        assert!(matches!(
            auth.create_account("finn", "password2", AccountRole::Customer)
                .await,
            Err(AuthError::AccountAlreadyExists)
        ));
    }

    #[tokio::test]
    async fn test_set_role() {
        let store = MemoryStore::new();
        let auth = AuthService::new(&store);
        let account = auth
            .create_account("gwen", "password1", AccountRole::Staff)
            .await
            .unwrap();

        let demoted = auth.set_role("gwen", AccountRole::Customer).await.unwrap();
        assert_eq!(demoted.id, account.id);
        assert!(!demoted.is_staff());

        assert!(matches!(
            auth.set_role("nobody", AccountRole::Staff).await,
            Err(AuthError::AccountNotFound)
        ));
    }

    #[tokio::test]
    async fn test_create_account_invalid_username() {
        let store = MemoryStore::new();
        let auth = AuthService::new(&store);
        assert!(matches!(
            auth.create_account("has space", "password1", AccountRole::Customer)
                .await,
            Err(AuthError::InvalidUsername(_))
        ));
    }
}
