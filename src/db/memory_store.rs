use std::{fs, path::Path};

use async_trait::async_trait;
use tracing::info;

use crate::db::credential_store::{CredentialStore, CredentialStoreError};
use crate::models::{account::AccountRecord, app::Audience};

/// Read-only account list, loaded once at boot from a JSON array of
/// [`AccountRecord`]s.
#[derive(Debug, Default, Clone)]
pub struct MemoryCredentialStore {
    accounts: Vec<AccountRecord>,
}

impl MemoryCredentialStore {
    pub fn new(accounts: Vec<AccountRecord>) -> Self {
        Self { accounts }
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, CredentialStoreError> {
        let path = path.as_ref();
        let raw = fs::read_to_string(path).map_err(|err| {
            CredentialStoreError::Unavailable(format!("{}: {err}", path.display()))
        })?;
        let accounts: Vec<AccountRecord> = serde_json::from_str(&raw)
            .map_err(|err| CredentialStoreError::Query(format!("{}: {err}", path.display())))?;

        info!(count = accounts.len(), path = %path.display(), "Loaded accounts");
        Ok(Self::new(accounts))
    }
}

#[async_trait]
impl CredentialStore for MemoryCredentialStore {
    async fn find_account_by_email(
        &self,
        email: &str,
        audience: Audience,
    ) -> Result<Option<AccountRecord>, CredentialStoreError> {
        Ok(self
            .accounts
            .iter()
            .find(|a| a.audience == audience && a.email.eq_ignore_ascii_case(email.trim()))
            .cloned())
    }

    async fn find_account_by_id(
        &self,
        user_id: &str,
        audience: Audience,
    ) -> Result<Option<AccountRecord>, CredentialStoreError> {
        Ok(self
            .accounts
            .iter()
            .find(|a| a.audience == audience && a.id == user_id)
            .cloned())
    }
}
