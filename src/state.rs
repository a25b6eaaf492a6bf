use std::sync::Arc;

use crate::authority::SessionAuthority;
use crate::db::credential_store::CredentialStore;

#[derive(Clone)]
pub struct AppState {
    pub authority: Arc<SessionAuthority>,
    pub accounts: Arc<dyn CredentialStore>,
}
