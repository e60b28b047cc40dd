//! Subcommand implementations.
//!
//! Every command loads `.env`, connects to the storefront database and works
//! through the same services the web app uses, so validation rules are
//! shared.

pub mod account;
pub mod catalog;
pub mod migrate;
pub mod orders;

use std::path::PathBuf;

use secrecy::SecretString;
use sqlx::PgPool;
use thiserror::Error;

use corner_store_storefront::db::{self, PgStore};
use corner_store_storefront::services::{AuthError, ServiceError};

/// Errors that can occur while running a command.
#[derive(Debug, Error)]
pub enum CommandError {
    /// Required environment variable is missing.
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(&'static str),

    /// Database connection error.
    #[error("Database connection error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error(transparent)]
    Service(#[from] ServiceError),

    /// A command-line argument could not be parsed.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Could not read {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    #[error("Invalid YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

/// Storefront database URL: `STOREFRONT_DATABASE_URL`, then `DATABASE_URL`.
fn database_url() -> Result<SecretString, CommandError> {
    dotenvy::dotenv().ok();

    std::env::var("STOREFRONT_DATABASE_URL")
        .or_else(|_| std::env::var("DATABASE_URL"))
        .map(SecretString::from)
        .map_err(|_| CommandError::MissingEnvVar("STOREFRONT_DATABASE_URL"))
}

/// Product image directory, as configured for the web app.
fn media_dir() -> PathBuf {
    PathBuf::from(std::env::var("STOREFRONT_MEDIA_DIR").unwrap_or_else(|_| "media".to_owned()))
}

async fn connect() -> Result<PgPool, CommandError> {
    let database_url = database_url()?;
    tracing::info!("Connecting to storefront database...");
    Ok(db::create_pool(&database_url).await?)
}

/// Connect and wrap the pool in the store the services expect.
async fn store() -> Result<PgStore, CommandError> {
    Ok(PgStore::new(connect().await?))
}
