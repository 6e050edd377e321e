//! Keeps a valid Google access token for one account.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{DateTime, Duration, Utc};
use google_calendar::{AccessToken, Client};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::app_config::{self, Credentials, base_dir};

/// Tokens are refreshed this long before they actually expire.
const EXPIRY_MARGIN_SECS: i64 = 60;

pub struct Session {
    account_email: String,
    data: SessionData,
    credentials: Credentials,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct SessionData {
    access_token: String,
    refresh_token: String,
    expires_at: DateTime<Utc>,
}

impl From<&AccessToken> for SessionData {
    fn from(tokens: &AccessToken) -> Self {
        SessionData {
            access_token: tokens.access_token.clone(),
            refresh_token: tokens.refresh_token.clone(),
            expires_at: Utc::now() + Duration::seconds(tokens.expires_in),
        }
    }
}

impl SessionData {
    fn read(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path).with_context(|| {
            format!("Failed to read Google OAuth session from {}", path.display())
        })?;

        toml::from_str(&contents).with_context(|| {
            format!("Failed to parse Google OAuth session from {}", path.display())
        })
    }

    fn write(&self, path: &Path) -> Result<()> {
        let contents = toml::to_string_pretty(self).context("Failed to serialize session")?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory {}", parent.display()))?;
        }

        std::fs::write(path, contents)
            .with_context(|| format!("Failed to write session to {}", path.display()))?;

        // Owner-only, the file holds OAuth tokens.
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o600))
                .with_context(|| format!("Failed to set permissions on {}", path.display()))?;
        }

        Ok(())
    }

    fn is_expired(&self) -> bool {
        Utc::now() + Duration::seconds(EXPIRY_MARGIN_SECS) >= self.expires_at
    }
}

impl Session {
    fn path_for_account_email(account_email: &str) -> Result<PathBuf> {
        let email_slug = account_email.replace(['/', '\\', ':'], "_");

        Ok(base_dir()?
            .join("session")
            .join(format!("{}.toml", email_slug)))
    }

    pub fn new(account_email: &str, data: SessionData, credentials: Credentials) -> Self {
        Session {
            account_email: account_email.to_string(),
            data,
            credentials,
        }
    }

    pub fn account_email(&self) -> &str {
        &self.account_email
    }

    /// Load the stored session and refresh it if it has expired.
    pub async fn load_valid(account_email: &str) -> Result<Self> {
        let path = Self::path_for_account_email(account_email)?;

        if !path.exists() {
            anyhow::bail!(
                "Google OAuth session for {} not found. Run `gameplan auth` first.",
                account_email
            );
        }

        let mut session = Session {
            account_email: account_email.to_string(),
            data: SessionData::read(&path)?,
            credentials: app_config::load()?,
        };
        session.refresh_if_expired().await?;

        Ok(session)
    }

    pub fn save(&self) -> Result<()> {
        self.data.write(&Self::path_for_account_email(&self.account_email)?)
    }

    pub fn client(&self) -> Client {
        Client::new(
            self.credentials.client_id.clone(),
            self.credentials.client_secret.clone(),
            String::new(),
            self.data.access_token.clone(),
            self.data.refresh_token.clone(),
        )
    }

    pub fn access_token(&self) -> &str {
        &self.data.access_token
    }

    pub async fn refresh_if_expired(&mut self) -> Result<()> {
        if !self.data.is_expired() {
            return Ok(());
        }

        debug!(account = %self.account_email, "Refreshing Google access token");

        let mut tokens = self
            .client()
            .refresh_access_token()
            .await
            .context("Failed to refresh token")?;

        // Google typically doesn't return a new refresh_token on refresh
        if tokens.refresh_token.is_empty() {
            tokens.refresh_token = self.data.refresh_token.clone();
        }

        self.data = (&tokens).into();
        self.save()?;

        Ok(())
    }
}
