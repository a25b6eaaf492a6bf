use core::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// One of the web applications sharing the session authority.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AppName {
    Admin,
    Jobs,
    Main,
    Tutorials,
}

impl AppName {
    pub const ALL: [AppName; 4] = [
        AppName::Admin,
        AppName::Jobs,
        AppName::Main,
        AppName::Tutorials,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            AppName::Admin => "admin",
            AppName::Jobs => "jobs",
            AppName::Main => "main",
            AppName::Tutorials => "tutorials",
        }
    }

    /// Environment variable holding the app's public base URL.
    pub fn public_url_var(&self) -> &'static str {
        match self {
            AppName::Admin => "NEXT_PUBLIC_ADMIN_APP_URL",
            AppName::Jobs => "NEXT_PUBLIC_JOBS_APP_URL",
            AppName::Main => "NEXT_PUBLIC_MAIN_APP_URL",
            AppName::Tutorials => "NEXT_PUBLIC_TUTORIALS_APP_URL",
        }
    }

    pub fn default_audience(&self) -> Audience {
        match self {
            AppName::Admin => Audience::Admin,
            _ => Audience::User,
        }
    }
}

impl fmt::Display for AppName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownAppName(pub String);

impl fmt::Display for UnknownAppName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown application name '{}'", self.0)
    }
}

impl std::error::Error for UnknownAppName {}

impl FromStr for AppName {
    type Err = UnknownAppName;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase();
        AppName::ALL
            .into_iter()
            .find(|app| app.as_str() == normalized)
            .ok_or_else(|| UnknownAppName(s.to_string()))
    }
}

/// Principal class a session config is issued for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Audience {
    /// Guardians, teachers, freelancers and clients.
    User,
    Admin,
}

impl FromStr for Audience {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "user" => Ok(Audience::User),
            "admin" => Ok(Audience::Admin),
            other => Err(format!("unknown audience '{other}'")),
        }
    }
}
