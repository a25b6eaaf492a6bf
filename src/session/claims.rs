use std::collections::BTreeMap;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::models::account::AccountRecord;

/// Claim bag as it arrives in either token format. Every field is kept as a
/// raw JSON value and normalized explicitly, so an odd type in one claim
/// never fails the whole token.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct RawClaims {
    pub user_id: Option<Value>,
    pub id: Option<Value>,
    pub sub: Option<Value>,
    pub email: Option<Value>,
    pub user_type: Option<Value>,
    pub role: Option<Value>,
    pub session_version: Option<Value>,
    pub permissions: Option<Value>,
    pub is_admin: Option<Value>,
    pub timestamp: Option<Value>,
    pub iat: Option<Value>,
    pub exp: Option<Value>,
}

pub(crate) fn non_empty_string(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::String(s) if !s.trim().is_empty() => Some(s.clone()),
        _ => None,
    }
}

/// Ids may come through as strings or, in old payloads, as numbers.
pub(crate) fn id_string(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::Number(n) => Some(n.to_string()),
        other => non_empty_string(Some(other)),
    }
}

pub(crate) fn integer(value: Option<&Value>) -> Option<i64> {
    let value = value?;
    value
        .as_i64()
        .or_else(|| value.as_f64().filter(|f| f.is_finite()).map(|f| f as i64))
}

/// Copies only boolean entries; an empty result counts as absent.
pub(crate) fn boolean_map(value: Option<&Value>) -> Option<BTreeMap<String, bool>> {
    let Value::Object(entries) = value? else {
        return None;
    };

    let map: BTreeMap<String, bool> = entries
        .iter()
        .filter_map(|(key, value)| value.as_bool().map(|flag| (key.clone(), flag)))
        .collect();

    (!map.is_empty()).then_some(map)
}

impl RawClaims {
    pub fn user_type(&self) -> Option<String> {
        non_empty_string(self.user_type.as_ref()).or_else(|| non_empty_string(self.role.as_ref()))
    }

    pub fn is_admin(&self) -> bool {
        self.is_admin
            .as_ref()
            .and_then(Value::as_bool)
            .unwrap_or(false)
    }
}

/// Claims written into a signed session token at login.
#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
#[serde(rename_all = "camelCase")]
pub struct SessionClaims {
    pub user_id: String,
    pub sub: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    pub user_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session_version: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub permissions: Option<BTreeMap<String, bool>>,
    pub is_admin: bool,
    pub iat: i64,
    pub exp: i64,
}

impl SessionClaims {
    pub fn for_account(account: &AccountRecord, issued_at: DateTime<Utc>, ttl: Duration) -> Self {
        Self {
            user_id: account.id.clone(),
            sub: account.id.clone(),
            email: Some(account.email.clone()),
            user_type: account.user_type.clone(),
            session_version: account.session_version,
            role: account.role.clone(),
            permissions: None,
            is_admin: account.is_admin(),
            iat: issued_at.timestamp(),
            exp: (issued_at + ttl).timestamp(),
        }
    }
}
