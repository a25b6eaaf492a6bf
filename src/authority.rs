//! Process-wide session authority: signing keys plus the session cookie
//! config for this app, created once at boot.

use std::sync::Arc;

use chrono::{Duration, Utc};
use once_cell::sync::OnceCell;
use thiserror::Error;
use tracing::{debug, error, info};

use crate::config::{Config, ConfigError};
use crate::cookies::{store::CookieStore, SessionCookieConfig};
use crate::models::{account::AccountRecord, app::Audience};
use crate::session::{issue_session_token, verify_session_token, SessionClaims, SessionRecord};
use crate::utils::jwt::JwtKeys;

static AUTHORITY: OnceCell<Arc<SessionAuthority>> = OnceCell::new();

#[derive(Debug, Error)]
pub enum IssueError {
    #[error("session signing secret is not configured")]
    NotConfigured,
    #[error("failed to sign session token: {0}")]
    Token(#[from] jsonwebtoken::errors::Error),
}

#[derive(Debug)]
pub struct SessionAuthority {
    keys: Option<JwtKeys>,
    audience: Audience,
    cookie: SessionCookieConfig,
}

impl SessionAuthority {
    pub fn new(keys: JwtKeys, audience: Audience, cookie: SessionCookieConfig) -> Self {
        Self {
            keys: Some(keys),
            audience,
            cookie,
        }
    }

    /// An authority without keys. Every verification logs the missing
    /// secret and reports no session.
    pub fn without_keys(audience: Audience, cookie: SessionCookieConfig) -> Self {
        Self {
            keys: None,
            audience,
            cookie,
        }
    }

    pub fn from_config(config: &Config, keys: JwtKeys) -> Self {
        let cookie = SessionCookieConfig::resolve(
            config.audience,
            config.app,
            config.cookie_domain_override.as_deref(),
            &config.cookie_env,
            config.production,
        );
        Self::new(keys, config.audience, cookie)
    }

    pub fn audience(&self) -> Audience {
        self.audience
    }

    pub fn cookie(&self) -> &SessionCookieConfig {
        &self.cookie
    }

    /// Verified session for `token`, or `None` for any failure.
    pub fn verify(&self, token: &str) -> Option<SessionRecord> {
        let Some(keys) = &self.keys else {
            error!("session signing secret is not configured; treating request as unauthenticated");
            return None;
        };

        let record = verify_session_token(token, keys)?;
        if self.audience == Audience::Admin && !record.is_admin {
            debug!(user_id = %record.user_id, "non-admin session presented to admin audience");
            return None;
        }

        Some(record)
    }

    pub fn session_from(&self, store: &impl CookieStore) -> Option<SessionRecord> {
        let token = self.cookie.read(store)?;
        self.verify(&token)
    }

    pub fn issue(&self, account: &AccountRecord) -> Result<String, IssueError> {
        let keys = self.keys.as_ref().ok_or(IssueError::NotConfigured)?;
        let claims = SessionClaims::for_account(
            account,
            Utc::now(),
            Duration::seconds(self.cookie.max_age_seconds),
        );
        Ok(issue_session_token(&claims, keys)?)
    }

    pub fn start_session(
        &self,
        store: &mut impl CookieStore,
        account: &AccountRecord,
    ) -> Result<(), IssueError> {
        let token = self.issue(account)?;
        self.cookie.write(store, &token);
        Ok(())
    }

    pub fn end_session(&self, store: &mut impl CookieStore) {
        self.cookie.clear(store);
    }
}

/// Creates the process-wide authority on first call; later calls return
/// the same instance.
pub fn init_authority(config: &Config) -> Result<Arc<SessionAuthority>, ConfigError> {
    AUTHORITY
        .get_or_try_init(|| -> Result<Arc<SessionAuthority>, ConfigError> {
            let keys = Config::jwt_keys_from_env()?;
            let authority = SessionAuthority::from_config(config, keys);
            info!(
                cookie = %authority.cookie.name,
                domain = ?authority.cookie.domain,
                audience = ?authority.audience,
                "Session authority initialized"
            );
            Ok(Arc::new(authority))
        })
        .cloned()
}

pub fn authority() -> Option<Arc<SessionAuthority>> {
    AUTHORITY.get().cloned()
}


#[cfg(test)]
mod tests {
    use super::test_support::*;
    use super::*;
    use crate::cookies::domain::CookieDomainEnv;
    use crate::cookies::store::MemoryCookieStore;

    #[test]
    fn session_round_trips_through_cookie_store() {
        let authority = test_authority(Audience::User);
        let mut store = MemoryCookieStore::default();

        authority
            .start_session(&mut store, &account("u1", Audience::User))
            .unwrap();
        let session = authority.session_from(&store).expect("session should verify");
        assert_eq!(session.user_id, "u1");
        assert_eq!(session.user_type.as_deref(), Some("teacher"));
        assert_eq!(session.session_version, Some(1));

        authority.end_session(&mut store);
        assert_eq!(authority.session_from(&store), None);
    }

    #[test]
    fn admin_audience_rejects_user_sessions() {
        let user_authority = test_authority(Audience::User);
        let admin_authority = test_authority(Audience::Admin);

        let token = user_authority.issue(&account("u1", Audience::User)).unwrap();
        assert!(user_authority.verify(&token).is_some());
        assert_eq!(admin_authority.verify(&token), None);

        let admin_token = admin_authority.issue(&account("a1", Audience::Admin)).unwrap();
        let admin = admin_authority.verify(&admin_token).unwrap();
        assert!(admin.is_admin);
        assert_eq!(admin.role.as_deref(), Some("support_admin"));
    }

    #[test]
    fn init_authority_is_a_process_singleton() {
        std::env::set_var("AUTH_SECRET", TEST_SECRET);
        let config = Config::from_lookup(|_: &str| None).unwrap();

        let first = init_authority(&config).unwrap();
        let second = init_authority(&config).unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert!(Arc::ptr_eq(&first, &authority().unwrap()));
        assert_eq!(first.audience(), Audience::User);
    }

    #[test]
    fn authority_without_keys_reports_no_session() {
        let cookie = SessionCookieConfig::resolve(
            Audience::User,
            None,
            None,
            &CookieDomainEnv::default(),
            false,
        );
        let degraded = SessionAuthority::without_keys(Audience::User, cookie);

        let token = test_authority(Audience::User)
            .issue(&account("u1", Audience::User))
            .unwrap();
        assert_eq!(degraded.verify(&token), None);
        assert!(matches!(
            degraded.issue(&account("u1", Audience::User)),
            Err(IssueError::NotConfigured)
        ));
    }
}
