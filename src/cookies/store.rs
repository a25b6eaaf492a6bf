use std::collections::HashMap;

use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use time::Duration as TimeDuration;

/// Attributes applied when a cookie is written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CookieOptions {
    pub domain: Option<String>,
    pub path: String,
    pub http_only: bool,
    pub secure: bool,
    pub same_site: SameSite,
    /// `Some(0)` expires the cookie immediately.
    pub max_age_seconds: Option<i64>,
}

impl CookieOptions {
    pub fn build_cookie(&self, name: &str, value: &str) -> Cookie<'static> {
        let mut builder = Cookie::build((name.to_string(), value.to_string()))
            .path(self.path.clone())
            .http_only(self.http_only)
            .secure(self.secure)
            .same_site(self.same_site);

        if let Some(domain) = &self.domain {
            builder = builder.domain(domain.clone());
        }
        if let Some(seconds) = self.max_age_seconds {
            builder = builder.max_age(TimeDuration::seconds(seconds));
        }

        builder.build()
    }
}

/// The two operations session code needs from a request/response cookie jar.
pub trait CookieStore {
    fn get(&self, name: &str) -> Option<String>;
    fn set(&mut self, name: &str, value: &str, options: &CookieOptions);
}

/// Adapter over axum-extra's jar. Cookies set here end up as `Set-Cookie`
/// headers once the jar is returned from a handler.
#[derive(Debug, Default, Clone)]
pub struct JarStore {
    jar: CookieJar,
}

impl JarStore {
    pub fn new(jar: CookieJar) -> Self {
        Self { jar }
    }

    pub fn into_jar(self) -> CookieJar {
        self.jar
    }
}

impl CookieStore for JarStore {
    fn get(&self, name: &str) -> Option<String> {
        self.jar.get(name).map(|cookie| cookie.value().to_string())
    }

    fn set(&mut self, name: &str, value: &str, options: &CookieOptions) {
        let jar = std::mem::take(&mut self.jar);
        self.jar = jar.add(options.build_cookie(name, value));
    }
}

/// In-process store, used where no HTTP jar exists.
#[derive(Debug, Default, Clone)]
pub struct MemoryCookieStore {
    cookies: HashMap<String, (String, CookieOptions)>,
}

impl MemoryCookieStore {
    pub fn options(&self, name: &str) -> Option<&CookieOptions> {
        self.cookies.get(name).map(|(_, options)| options)
    }
}

impl CookieStore for MemoryCookieStore {
    fn get(&self, name: &str) -> Option<String> {
        self.cookies
            .get(name)
            .filter(|(_, options)| options.max_age_seconds != Some(0))
            .map(|(value, _)| value.clone())
    }

    fn set(&mut self, name: &str, value: &str, options: &CookieOptions) {
        self.cookies
            .insert(name.to_string(), (value.to_string(), options.clone()));
    }
}
