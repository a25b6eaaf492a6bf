pub mod domain;
pub mod store;

use axum_extra::extract::cookie::SameSite;

use crate::models::app::{AppName, Audience};
use domain::{resolve_cookie_domain, CookieDomainEnv};
use store::{CookieOptions, CookieStore};

/// Lifetime of a freshly issued session cookie and token.
pub const SESSION_MAX_AGE_SECONDS: i64 = 7 * 24 * 60 * 60;

const SECURE_PREFIX: &str = "__Secure-";

/// Name and attributes of the session cookie for one app and audience.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionCookieConfig {
    pub name: String,
    pub domain: Option<String>,
    pub secure: bool,
    pub max_age_seconds: i64,
}

pub fn session_cookie_name(audience: Audience, app: Option<AppName>, production: bool) -> String {
    let base = match (audience, app) {
        (Audience::Admin, _) => "aotf_admin_session".to_string(),
        (Audience::User, Some(app)) => format!("aotf_{}_session", app.as_str()),
        (Audience::User, None) => "aotf_session".to_string(),
    };

    if production {
        format!("{SECURE_PREFIX}{base}")
    } else {
        base
    }
}

impl SessionCookieConfig {
    pub fn resolve(
        audience: Audience,
        app: Option<AppName>,
        explicit_domain: Option<&str>,
        env: &CookieDomainEnv,
        production: bool,
    ) -> Self {
        Self {
            name: session_cookie_name(audience, app, production),
            domain: resolve_cookie_domain(explicit_domain, app, env),
            secure: production,
            max_age_seconds: SESSION_MAX_AGE_SECONDS,
        }
    }

    pub fn options(&self) -> CookieOptions {
        CookieOptions {
            domain: self.domain.clone(),
            path: "/".to_string(),
            http_only: true,
            secure: self.secure,
            same_site: SameSite::Lax,
            max_age_seconds: Some(self.max_age_seconds),
        }
    }

    /// Same name and domain as the live cookie, so the browser replaces it.
    pub fn clear_options(&self) -> CookieOptions {
        CookieOptions {
            max_age_seconds: Some(0),
            ..self.options()
        }
    }

    pub fn read(&self, store: &impl CookieStore) -> Option<String> {
        store.get(&self.name).filter(|value| !value.is_empty())
    }

    pub fn write(&self, store: &mut impl CookieStore, token: &str) {
        store.set(&self.name, token, &self.options());
    }

    pub fn clear(&self, store: &mut impl CookieStore) {
        store.set(&self.name, "", &self.clear_options());
    }
}
