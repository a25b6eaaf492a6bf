use std::sync::Mutex;

use async_trait::async_trait;

use crate::db::credential_store::{CredentialStore, CredentialStoreError};
use crate::models::{account::AccountRecord, app::Audience};

#[derive(Default)]
pub struct MockCredentialStore {
    pub accounts: Vec<AccountRecord>,
    pub should_fail: bool,
    pub lookups: Mutex<Vec<String>>,
}

impl MockCredentialStore {
    pub fn with_accounts(accounts: Vec<AccountRecord>) -> Self {
        Self {
            accounts,
            ..Default::default()
        }
    }

    fn record_lookup(&self, key: &str) {
        if let Ok(mut lookups) = self.lookups.lock() {
            lookups.push(key.to_string());
        }
    }
}

#[async_trait]
impl CredentialStore for MockCredentialStore {
    async fn find_account_by_email(
        &self,
        email: &str,
        audience: Audience,
    ) -> Result<Option<AccountRecord>, CredentialStoreError> {
        self.record_lookup(email);
        if self.should_fail {
            return Err(CredentialStoreError::Unavailable("mock failure".into()));
        }

        Ok(self
            .accounts
            .iter()
            .find(|a| a.audience == audience && a.email.eq_ignore_ascii_case(email))
            .cloned())
    }

    async fn find_account_by_id(
        &self,
        user_id: &str,
        audience: Audience,
    ) -> Result<Option<AccountRecord>, CredentialStoreError> {
        self.record_lookup(user_id);
        if self.should_fail {
            return Err(CredentialStoreError::Unavailable("mock failure".into()));
        }

        Ok(self
            .accounts
            .iter()
            .find(|a| a.audience == audience && a.id == user_id)
            .cloned())
    }
}
