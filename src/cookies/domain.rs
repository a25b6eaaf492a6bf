use std::{collections::HashMap, env, net::IpAddr};

use url::Url;

use crate::models::app::AppName;

/// Variable naming the cookie domain for every app.
pub const GLOBAL_DOMAIN_VAR: &str = "AUTH_COOKIE_DOMAIN";
/// Older name for the same setting, still honoured after the global one.
pub const LEGACY_DOMAIN_VAR: &str = "COOKIE_DOMAIN";
/// When true, app-derived domains collapse to the registrable root.
pub const SHARE_ROOT_VAR: &str = "AUTH_COOKIE_SHARE_ROOT";

/// Environment inputs for cookie-domain resolution, captured once.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CookieDomainEnv {
    pub global_domain: Option<String>,
    pub legacy_domain: Option<String>,
    pub app_urls: HashMap<AppName, String>,
    pub share_root: bool,
}

impl CookieDomainEnv {
    pub fn from_env() -> Self {
        Self::from_lookup(|name| env::var(name).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let app_urls = AppName::ALL
            .into_iter()
            .filter_map(|app| lookup(app.public_url_var()).map(|url| (app, url)))
            .collect();

        let share_root = lookup(SHARE_ROOT_VAR)
            .map(|v| matches!(v.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes"))
            .unwrap_or(false);

        Self {
            global_domain: lookup(GLOBAL_DOMAIN_VAR),
            legacy_domain: lookup(LEGACY_DOMAIN_VAR),
            app_urls,
            share_root,
        }
    }
}

/// Outcome of normalizing one candidate.
#[derive(Debug, PartialEq, Eq)]
enum Candidate {
    /// Empty or whitespace; try the next source.
    Absent,
    /// Loopback or IP literal; resolution stops with no domain.
    HostOnly,
    Domain(String),
}

/// Picks the domain to scope the session cookie to, or `None` for a
/// host-only cookie.
///
/// Sources in priority order: `explicit`, the global variable, the legacy
/// variable, then the app's public URL. The first non-empty source decides.
pub fn resolve_cookie_domain(
    explicit: Option<&str>,
    app: Option<AppName>,
    env: &CookieDomainEnv,
) -> Option<String> {
    let configured = [
        explicit,
        env.global_domain.as_deref(),
        env.legacy_domain.as_deref(),
    ];

    for value in configured.into_iter().flatten() {
        match normalize_candidate(value) {
            Candidate::Absent => continue,
            Candidate::HostOnly => return None,
            Candidate::Domain(domain) => return Some(domain),
        }
    }

    let url = app.and_then(|app| env.app_urls.get(&app))?;
    match normalize_candidate(url) {
        Candidate::Domain(host) if env.share_root => Some(registrable_root_domain(&host)),
        Candidate::Domain(host) => Some(host),
        Candidate::Absent | Candidate::HostOnly => None,
    }
}

fn normalize_candidate(value: &str) -> Candidate {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Candidate::Absent;
    }

    let host = extract_host(trimmed);
    let host = host.trim_start_matches('.').trim_end_matches('.').to_ascii_lowercase();
    if host.is_empty() {
        return Candidate::Absent;
    }

    if is_local_host(&host) {
        return Candidate::HostOnly;
    }

    Candidate::Domain(host)
}

/// Parses `value` as a URL when it has a scheme, else treats it as a bare
/// hostname with any path or port dropped.
fn extract_host(value: &str) -> String {
    if let Ok(url) = Url::parse(value) {
        if let Some(host) = url.host_str() {
            return host.trim_start_matches('[').trim_end_matches(']').to_string();
        }
    }

    let without_path = value.split(['/', '?', '#']).next().unwrap_or_default();
    if without_path.starts_with('[') {
        // Bracketed IPv6 literal, possibly with a port.
        return without_path
            .trim_start_matches('[')
            .split(']')
            .next()
            .unwrap_or_default()
            .to_string();
    }

    match without_path.rsplit_once(':') {
        Some((host, port))
            if !host.contains(':') && port.chars().all(|c| c.is_ascii_digit()) =>
        {
            host.to_string()
        }
        _ => without_path.to_string(),
    }
}

pub fn is_local_host(host: &str) -> bool {
    let host = host.trim_start_matches('[').trim_end_matches(']');
    host == "localhost" || host.ends_with(".localhost") || host.parse::<IpAddr>().is_ok()
}

/// Shortest suffix of `host` cookies can be shared under.
///
/// Takes the last two labels, or the last three when the name looks like
/// `example.co.uk`: a two-letter final label, a second-level label of at
/// most three characters, and at least three labels overall.
pub fn registrable_root_domain(host: &str) -> String {
    let labels: Vec<&str> = host.split('.').filter(|l| !l.is_empty()).collect();
    let count = labels.len();
    if count <= 2 {
        return labels.join(".");
    }

    let tld = labels[count - 1];
    let second = labels[count - 2];
    let take = if tld.len() == 2 && second.len() <= 3 { 3 } else { 2 };

    labels[count - take..].join(".")
}
