use anyhow::{bail, Context, Result};
use keyring::Entry;
use tracing::debug;

use crate::api::Credentials;
use crate::config::{Config, APP_NAME};

/// Environment variable overriding the stored application id
pub const APP_ID_ENV: &str = "PCBACKEND_APP_ID";

/// Environment variable overriding the stored secret
pub const SECRET_ENV: &str = "PCBACKEND_SECRET";

pub struct CredentialStore;

impl CredentialStore {
    /// Store a token secret in the OS keychain under its application id
    pub fn store(app_id: &str, secret: &str) -> Result<()> {
        let entry = Entry::new(APP_NAME, app_id).context("Failed to create keyring entry")?;
        entry
            .set_password(secret)
            .context("Failed to store secret in keychain")?;
        Ok(())
    }

    pub fn get_secret(app_id: &str) -> Result<String> {
        let entry = Entry::new(APP_NAME, app_id).context("Failed to create keyring entry")?;
        entry
            .get_password()
            .context("Failed to retrieve secret from keychain")
    }

    pub fn delete(app_id: &str) -> Result<()> {
        let entry = Entry::new(APP_NAME, app_id).context("Failed to create keyring entry")?;
        entry
            .delete_credential()
            .context("Failed to delete credential from keychain")?;
        Ok(())
    }

    pub fn has_credentials(app_id: &str) -> bool {
        Entry::new(APP_NAME, app_id)
            .map(|entry| entry.get_password().is_ok())
            .unwrap_or(false)
    }
}

/// Pick credentials from the environment, else from config plus keychain.
pub fn resolve_credentials(config: &Config) -> Result<Credentials> {
    let env_app_id = std::env::var(APP_ID_ENV).ok().filter(|v| !v.is_empty());
    let env_secret = std::env::var(SECRET_ENV).ok().filter(|v| !v.is_empty());
    from_sources(config.last_app_id.as_deref(), env_app_id, env_secret, |app_id| {
        CredentialStore::get_secret(app_id)
    })
}

fn from_sources(
    stored_app_id: Option<&str>,
    env_app_id: Option<String>,
    env_secret: Option<String>,
    keychain: impl FnOnce(&str) -> Result<String>,
) -> Result<Credentials> {
    let app_id = match env_app_id.or_else(|| stored_app_id.map(str::to_string)) {
        Some(id) => id,
        None => bail!(
            "No application id configured. Run `pcbackend login` or set {}",
            APP_ID_ENV
        ),
    };

    let secret = match env_secret {
        Some(secret) => {
            debug!("Using secret from environment");
            secret
        }
        None => keychain(&app_id)
            .with_context(|| format!("No stored secret for application id {}", app_id))?,
    };

    Ok(Credentials { app_id, secret })
}
