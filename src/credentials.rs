//! Credential Store
//!
//! Account identity and role. Registration always yields a `player`; admins
//! only come from the seeder.

use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, info};
use uuid::Uuid;

use crate::error::{AppError, Result};
use crate::models::{Account, AccountRecord, Role};
use crate::password::{hash_password, verify_password};
use crate::storage::LeaderboardStore;

/// Emails are stored and looked up without surrounding whitespace; case is kept
fn normalize_email(email: &str) -> &str {
    email.trim()
}

#[derive(Clone)]
pub struct CredentialStore {
    store: Arc<dyn LeaderboardStore>,
}

impl CredentialStore {
    pub fn new(store: Arc<dyn LeaderboardStore>) -> Self {
        Self { store }
    }

    /// Create a player account. The raw password never leaves this call.
    pub async fn register(&self, name: String, email: String, password: String) -> Result<Account> {
        let name = name.trim().to_string();
        let email = normalize_email(&email).to_string();

        if name.is_empty() {
            return Err(AppError::Validation("Name is required".into()));
        }
        if !email.contains('@') {
            return Err(AppError::Validation("Invalid email address".into()));
        }
        if password.is_empty() {
            return Err(AppError::Validation("Password is required".into()));
        }

        // The unique index below is authoritative
        if self.store.find_account_by_email(&email).await?.is_some() {
            return Err(AppError::Conflict("Email already registered".into()));
        }

        let password_hash = hash_password(password).await?;
        let record = AccountRecord {
            account: Account {
                id: Uuid::new_v4().to_string(),
                name,
                email,
                role: Role::Player,
                total_points: 0,
                created_at: Utc::now(),
            },
            password_hash,
        };

        if !self.store.create_account(&record).await? {
            return Err(AppError::Conflict("Email already registered".into()));
        }

        info!("Registered player {} ({})", record.account.name, record.account.id);
        Ok(record.account)
    }

    pub async fn find_by_email(&self, email: &str) -> Result<Option<Account>> {
        Ok(self
            .store
            .find_account_by_email(normalize_email(email))
            .await?
            .map(|record| record.account))
    }

    pub async fn find_by_id(&self, id: &str) -> Result<Option<Account>> {
        Ok(self.store.find_account(id).await?.map(|record| record.account))
    }

    /// Remove the account row only. Clearing its claim history is the caller's job.
    pub async fn delete(&self, id: &str) -> Result<bool> {
        Ok(self.store.delete_account(id).await?)
    }

    /// Check an email/password pair and return the matching account
    pub async fn verify_login(&self, email: &str, password: String) -> Result<Account> {
        let record = self
            .store
            .find_account_by_email(normalize_email(email))
            .await?
            .ok_or_else(|| AppError::NotFound("User not found".into()))?;

        if !verify_password(password, record.password_hash).await? {
            debug!("Wrong password for {}", record.account.id);
            return Err(AppError::Validation("Wrong password".into()));
        }

        Ok(record.account)
    }
}
