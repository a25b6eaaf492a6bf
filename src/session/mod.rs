//! Session token verification.
//!
//! A cookie value is parsed by sequential attempt: first as an HS256 signed
//! token, then as a legacy base64 JSON blob. The outcome is a
//! [`ParsedToken`]; callers that only care whether a session exists use
//! [`verify_session_token`], which never fails loudly.

pub mod claims;
pub mod legacy;

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use jsonwebtoken::errors::ErrorKind;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::utils::jwt::{create_jwt, decode_jwt, JwtKeys};
use claims::{boolean_map, id_string, integer, non_empty_string, RawClaims};

pub use claims::SessionClaims;
pub use legacy::LEGACY_SESSION_LIFETIME_MS;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenFormat {
    Signed,
    Legacy,
}

/// Normalized view of an authenticated principal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionRecord {
    pub user_id: String,
    pub email: Option<String>,
    pub user_type: Option<String>,
    pub session_version: Option<i64>,
    pub role: Option<String>,
    pub permissions: Option<BTreeMap<String, bool>>,
    pub is_admin: bool,
    /// Epoch milliseconds.
    pub issued_at: Option<i64>,
    /// Epoch milliseconds.
    pub expires_at: Option<i64>,
    pub format: TokenFormat,
}

impl SessionRecord {
    /// A token without a version predates versioning and is only current
    /// while the account has never been bumped.
    pub fn matches_version(&self, account_version: Option<i64>) -> bool {
        self.session_version.unwrap_or(0) == account_version.unwrap_or(0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    /// Well-formed and correctly signed, but past `exp`.
    Expired,
    /// Neither a valid signed token nor a legacy payload.
    Malformed,
    MissingUserId,
    /// Legacy payload outside its lifetime window.
    Stale,
    Unexpected,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ParsedToken {
    Signed(SessionRecord),
    Legacy(SessionRecord),
    Rejected(Rejection),
}

impl ParsedToken {
    pub fn into_session(self) -> Option<SessionRecord> {
        match self {
            ParsedToken::Signed(record) | ParsedToken::Legacy(record) => Some(record),
            ParsedToken::Rejected(_) => None,
        }
    }
}

fn seconds_to_millis(secs: i64) -> Result<i64, Rejection> {
    secs.checked_mul(1000).ok_or(Rejection::Malformed)
}

fn record_from_signed(claims: RawClaims, now: DateTime<Utc>) -> Result<SessionRecord, Rejection> {
    let exp = integer(claims.exp.as_ref());
    if exp.is_some_and(|exp| exp <= now.timestamp()) {
        return Err(Rejection::Expired);
    }

    let user_id = id_string(claims.user_id.as_ref())
        .or_else(|| id_string(claims.sub.as_ref()))
        .ok_or(Rejection::MissingUserId)?;

    let issued_at = integer(claims.iat.as_ref()).map(seconds_to_millis).transpose()?;
    let expires_at = exp.map(seconds_to_millis).transpose()?;

    Ok(SessionRecord {
        user_id,
        email: non_empty_string(claims.email.as_ref()),
        user_type: claims.user_type(),
        session_version: integer(claims.session_version.as_ref()),
        role: non_empty_string(claims.role.as_ref()),
        permissions: boolean_map(claims.permissions.as_ref()),
        is_admin: claims.is_admin(),
        issued_at,
        expires_at,
        format: TokenFormat::Signed,
    })
}

/// Classifies `token` at instant `now`.
pub fn parse_token(token: &str, keys: &JwtKeys, now: DateTime<Utc>) -> ParsedToken {
    let token = token.trim();
    if token.is_empty() {
        return ParsedToken::Rejected(Rejection::Malformed);
    }

    match decode_jwt::<RawClaims>(token, keys) {
        Ok(data) => match record_from_signed(data.claims, now) {
            Ok(record) => ParsedToken::Signed(record),
            Err(rejection) => ParsedToken::Rejected(rejection),
        },
        Err(error) => match error.kind() {
            ErrorKind::InvalidToken
            | ErrorKind::InvalidSignature
            | ErrorKind::InvalidAlgorithm
            | ErrorKind::InvalidAlgorithmName
            | ErrorKind::Base64(_)
            | ErrorKind::Json(_)
            | ErrorKind::Utf8(_) => match legacy::parse_legacy(token, now) {
                Ok(record) => ParsedToken::Legacy(record),
                Err(rejection) => ParsedToken::Rejected(rejection),
            },
            _ => {
                warn!(?error, "unexpected error while decoding session token");
                ParsedToken::Rejected(Rejection::Unexpected)
            }
        },
    }
}

pub fn verify_session_token_at(
    token: &str,
    keys: &JwtKeys,
    now: DateTime<Utc>,
) -> Option<SessionRecord> {
    match parse_token(token, keys, now) {
        ParsedToken::Rejected(reason) => {
            debug!(?reason, "session token rejected");
            None
        }
        parsed => parsed.into_session(),
    }
}

/// Verifies a cookie value against the wall clock. Every failure is `None`.
pub fn verify_session_token(token: &str, keys: &JwtKeys) -> Option<SessionRecord> {
    verify_session_token_at(token, keys, Utc::now())
}

pub fn issue_session_token(
    claims: &SessionClaims,
    keys: &JwtKeys,
) -> Result<String, jsonwebtoken::errors::Error> {
    create_jwt(claims, keys)
}

#[cfg(test)]
mod tests {
    use std::time::{SystemTime, UNIX_EPOCH};

    use serde_json::json;

    use super::legacy::encode_legacy;
    use super::*;

    fn valid_secret() -> &'static str {
        "0123456789abcdef0123456789abcdef"
    }

    fn keys() -> JwtKeys {
        JwtKeys::from_secret(valid_secret()).expect("secret should be accepted")
    }

    fn now_secs() -> i64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap()
            .as_secs() as i64
    }

    fn sign(payload: serde_json::Value, keys: &JwtKeys) -> String {
        create_jwt(&payload, keys).expect("token should encode")
    }

    #[test]
    fn verifies_signed_token() {
        let keys = keys();
        let exp = now_secs() + 3600;
        let token = sign(
            json!({"userId": "u1", "userType": "teacher", "iat": now_secs(), "exp": exp}),
            &keys,
        );

        let record = verify_session_token(&token, &keys).expect("session should verify");
        assert_eq!(record.user_id, "u1");
        assert_eq!(record.user_type.as_deref(), Some("teacher"));
        assert_eq!(record.expires_at, Some(exp * 1000));
        assert_eq!(record.format, TokenFormat::Signed);
    }

    #[test]
    fn expired_token_is_rejected_without_legacy_fallback() {
        let keys = keys();
        let token = sign(json!({"userId": "u1", "exp": now_secs() - 10}), &keys);

        assert_eq!(
            parse_token(&token, &keys, Utc::now()),
            ParsedToken::Rejected(Rejection::Expired)
        );
        assert_eq!(verify_session_token(&token, &keys), None);
    }

    #[test]
    fn token_from_other_secret_is_rejected() {
        let other = JwtKeys::from_secret("fedcba9876543210fedcba9876543210").unwrap();
        let token = sign(json!({"userId": "u1", "exp": now_secs() + 3600}), &other);

        assert_eq!(verify_session_token(&token, &keys()), None);
    }

    #[test]
    fn subject_claim_backs_up_user_id() {
        let keys = keys();
        let token = sign(json!({"sub": "from-sub", "exp": now_secs() + 60}), &keys);
        assert_eq!(
            verify_session_token(&token, &keys).map(|r| r.user_id),
            Some("from-sub".to_string())
        );

        let token = sign(json!({"userId": "", "sub": "", "exp": now_secs() + 60}), &keys);
        assert_eq!(
            parse_token(&token, &keys, Utc::now()),
            ParsedToken::Rejected(Rejection::MissingUserId)
        );
    }

    #[test]
    fn role_fills_in_missing_user_type_and_permissions_are_filtered() {
        let keys = keys();
        let token = sign(
            json!({
                "userId": "a1",
                "role": "support_admin",
                "isAdmin": true,
                "permissions": {"ads": true, "posts": "nope"},
                "sessionVersion": 3,
                "exp": now_secs() + 60
            }),
            &keys,
        );

        let record = verify_session_token(&token, &keys).unwrap();
        assert_eq!(record.user_type.as_deref(), Some("support_admin"));
        assert_eq!(record.role.as_deref(), Some("support_admin"));
        assert!(record.is_admin);
        assert_eq!(record.session_version, Some(3));
        let permissions = record.permissions.unwrap();
        assert_eq!(permissions.len(), 1);
        assert_eq!(permissions.get("ads"), Some(&true));
    }

    #[test]
    fn legacy_token_inside_window_is_accepted() {
        let now = Utc::now();
        let stamp = now.timestamp_millis() - 60_000;
        let token = encode_legacy(&json!({"userId": "abc", "timestamp": stamp}));

        let parsed = parse_token(&token, &keys(), now);
        assert!(matches!(parsed, ParsedToken::Legacy(ref r) if r.user_id == "abc"));
    }

    #[test]
    fn legacy_token_older_than_lifetime_is_rejected() {
        let now = Utc::now();
        let eight_days = 8 * 24 * 3600 * 1000;
        let stamp = now.timestamp_millis() - eight_days;
        let token = encode_legacy(&json!({"userId": "u2", "timestamp": stamp}));

        assert_eq!(verify_session_token_at(&token, &keys(), now), None);
    }

    #[test]
    fn garbage_never_panics() {
        let keys = keys();
        for token in ["", "   ", "a.b.c", "bnVsbA==", "W10=", "e30=", "ey.ey.ey", "%%%"] {
            assert_eq!(verify_session_token(token, &keys), None, "token {token:?}");
        }
    }

    #[test]
    fn out_of_range_times_yield_no_session() {
        let keys = keys();
        for timestamp in [json!(i64::MIN), json!(i64::MAX), json!(-1e300)] {
            let token = encode_legacy(&json!({"userId": "x", "timestamp": timestamp}));
            assert_eq!(verify_session_token(&token, &keys), None, "timestamp {timestamp}");
        }

        let far_exp = sign(json!({"userId": "u1", "exp": i64::MAX - 1}), &keys);
        assert_eq!(
            parse_token(&far_exp, &keys, Utc::now()),
            ParsedToken::Rejected(Rejection::Malformed)
        );
        assert_eq!(verify_session_token(&far_exp, &keys), None);

        let far_iat = sign(
            json!({"userId": "u1", "iat": i64::MAX, "exp": now_secs() + 60}),
            &keys,
        );
        assert_eq!(verify_session_token(&far_iat, &keys), None);
    }

    #[test]
    fn verification_is_idempotent() {
        let keys = keys();
        let now = Utc::now();
        let token = sign(json!({"userId": "u1", "exp": now_secs() + 3600}), &keys);

        let first = verify_session_token_at(&token, &keys, now);
        let second = verify_session_token_at(&token, &keys, now);
        assert!(first.is_some());
        assert_eq!(first, second);
    }

    #[test]
    fn issued_claims_verify() {
        let keys = keys();
        let claims = SessionClaims {
            user_id: "u9".into(),
            sub: "u9".into(),
            email: Some("u9@example.com".into()),
            user_type: Some("guardian".into()),
            session_version: Some(2),
            role: None,
            permissions: None,
            is_admin: false,
            iat: now_secs(),
            exp: now_secs() + 600,
        };

        let token = issue_session_token(&claims, &keys).unwrap();
        let record = verify_session_token(&token, &keys).unwrap();
        assert_eq!(record.user_id, "u9");
        assert_eq!(record.email.as_deref(), Some("u9@example.com"));
        assert_eq!(record.issued_at, Some(claims.iat * 1000));
        assert!(record.matches_version(Some(2)));
        assert!(!record.matches_version(Some(3)));
    }
}
