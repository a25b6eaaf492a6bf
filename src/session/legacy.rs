//! Pre-JWT session cookies: a base64-encoded JSON object with no signature.
//!
//! Kept so sessions issued before the move to signed tokens keep working
//! until they age out. Only the timestamp window bounds them.

use base64::{
    engine::general_purpose::{STANDARD, STANDARD_NO_PAD, URL_SAFE, URL_SAFE_NO_PAD},
    Engine,
};
use chrono::{DateTime, Utc};

use super::claims::{boolean_map, id_string, integer, non_empty_string, RawClaims};
use super::{Rejection, SessionRecord, TokenFormat};

/// Fixed lifetime of a legacy session in milliseconds, measured from its `timestamp`.
pub const LEGACY_SESSION_LIFETIME_MS: i64 = 7 * 24 * 60 * 60 * 1000;

fn decode_base64(token: &str) -> Option<Vec<u8>> {
    let token = token.trim();
    [STANDARD, STANDARD_NO_PAD, URL_SAFE, URL_SAFE_NO_PAD]
        .iter()
        .find_map(|engine| engine.decode(token).ok())
}

pub(crate) fn parse_legacy(token: &str, now: DateTime<Utc>) -> Result<SessionRecord, Rejection> {
    let bytes = decode_base64(token).ok_or(Rejection::Malformed)?;
    let text = String::from_utf8(bytes).map_err(|_| Rejection::Malformed)?;
    let text = text.trim();
    if !text.starts_with('{') {
        return Err(Rejection::Malformed);
    }

    let claims: RawClaims = serde_json::from_str(text).map_err(|_| Rejection::Malformed)?;

    let user_id = id_string(claims.user_id.as_ref())
        .or_else(|| id_string(claims.id.as_ref()))
        .ok_or(Rejection::MissingUserId)?;

    let (issued_at, expires_at) = match integer(claims.timestamp.as_ref()) {
        Some(timestamp) => {
            let in_window = now
                .timestamp_millis()
                .checked_sub(timestamp)
                .is_some_and(|age| (0..=LEGACY_SESSION_LIFETIME_MS).contains(&age));
            if !in_window {
                return Err(Rejection::Stale);
            }
            let expires_at = timestamp
                .checked_add(LEGACY_SESSION_LIFETIME_MS)
                .ok_or(Rejection::Stale)?;
            (Some(timestamp), Some(expires_at))
        }
        None => (None, None),
    };

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
        format: TokenFormat::Legacy,
    })
}

#[cfg(test)]
pub(crate) fn encode_legacy(payload: &serde_json::Value) -> String {
    STANDARD.encode(payload.to_string())
}
