use serde::{Deserialize, Serialize};

use super::app::Audience;

/// Account as seen by the credential store, for either audience.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct AccountRecord {
    pub id: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub audience: Audience,
    pub user_type: Option<String>,
    pub role: Option<String>,
    pub is_active: bool,
    pub session_version: Option<i64>,
}

impl AccountRecord {
    pub fn is_admin(&self) -> bool {
        self.audience == Audience::Admin
    }
}

/// Account fields safe to hand back to a client.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PublicAccount {
    pub id: String,
    pub email: String,
    pub user_type: Option<String>,
    pub role: Option<String>,
}

impl From<&AccountRecord> for PublicAccount {
    fn from(account: &AccountRecord) -> Self {
        Self {
            id: account.id.clone(),
            email: account.email.clone(),
            user_type: account.user_type.clone(),
            role: account.role.clone(),
        }
    }
}
