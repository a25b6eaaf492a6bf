use async_trait::async_trait;
use thiserror::Error;

use crate::models::{account::AccountRecord, app::Audience};

#[derive(Debug, Error)]
pub enum CredentialStoreError {
    #[error("credential store unavailable: {0}")]
    Unavailable(String),
    #[error("credential store query failed: {0}")]
    Query(String),
}

/// Accounts and admins, looked up after a token verifies or during login.
#[async_trait]
pub trait CredentialStore: Send + Sync {
    async fn find_account_by_email(
        &self,
        email: &str,
        audience: Audience,
    ) -> Result<Option<AccountRecord>, CredentialStoreError>;

    async fn find_account_by_id(
        &self,
        user_id: &str,
        audience: Audience,
    ) -> Result<Option<AccountRecord>, CredentialStoreError>;
}
