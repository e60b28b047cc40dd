//! Account management commands.
//!
//! # Usage
//!
//! ```bash
//! CS_ACCOUNT_PASSWORD='correct horse battery' cs-cli account create -u alice
//! CS_ACCOUNT_PASSWORD='correct horse battery' cs-cli account create -u bob --staff
//!
//! # Revoke staff rights (applies to bob's current session too)
//! cs-cli account set-role -u bob
//! ```
//!
//! The password is read from the environment so it never shows up in shell
//! history or the process list.

use secrecy::{ExposeSecret, SecretString};

use corner_store_core::AccountRole;
use corner_store_storefront::services::AuthService;

use super::{CommandError, store};

/// Environment variable holding the new account's password.
pub const PASSWORD_ENV: &str = "CS_ACCOUNT_PASSWORD";

/// Create a login account.
///
/// # Returns
///
/// The ID of the created account.
///
/// # Errors
///
/// Returns an error if the password variable is missing, the username or
/// password is rejected, or the username is already taken.
pub async fn create(username: &str, staff: bool) -> Result<i32, CommandError> {
    dotenvy::dotenv().ok();

    let password = std::env::var(PASSWORD_ENV)
        .map(SecretString::from)
        .map_err(|_| CommandError::MissingEnvVar(PASSWORD_ENV))?;

    let role = role_for(staff);

    let store = store().await?;
    let account = AuthService::new(&store)
        .create_account(username, password.expose_secret(), role)
        .await?;

    tracing::info!(
        "Account created successfully! ID: {}, Username: {}, Role: {}",
        account.id,
        account.username,
        role
    );
    if !staff {
        tracing::info!("The customer profile is created on first visit to /profile/.");
    }

    Ok(account.id.as_i32())
}

/// Change an account's role.
///
/// # Errors
///
/// Returns an error if the username does not exist.
pub async fn set_role(username: &str, staff: bool) -> Result<(), CommandError> {
    let store = store().await?;
    let account = AuthService::new(&store)
        .set_role(username, role_for(staff))
        .await?;

    tracing::info!(
        "Account {} ({}) is now {}",
        account.username,
        account.id,
        account.role
    );
    Ok(())
}

const fn role_for(staff: bool) -> AccountRole {
    if staff {
        AccountRole::Staff
    } else {
        AccountRole::Customer
    }
}
