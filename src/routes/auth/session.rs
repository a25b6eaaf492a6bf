use axum::{
    extract::FromRequestParts,
    http::request::Parts,
    response::{IntoResponse, Response},
};
use axum_extra::extract::cookie::CookieJar;
use tracing::{debug, error};

use crate::cookies::store::JarStore;
use crate::permissions::session_has_permission;
use crate::responses::JsonResponse;
use crate::session::SessionRecord;
use crate::state::AppState;

const UNAUTHORIZED: &str = "Unauthorized";
const FORBIDDEN: &str = "Forbidden";

/// A verified session whose account still exists, is active, and has not
/// had its session version bumped since the token was issued.
#[derive(Debug, PartialEq)]
pub struct AuthSession(pub SessionRecord);

impl FromRequestParts<AppState> for AuthSession {
    type Rejection = Response;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let store = JarStore::new(CookieJar::from_headers(&parts.headers));
        let Some(session) = state.authority.session_from(&store) else {
            return Err(JsonResponse::unauthorized(UNAUTHORIZED).into_response());
        };

        let audience = state.authority.audience();
        match state
            .accounts
            .find_account_by_id(&session.user_id, audience)
            .await
        {
            Ok(Some(account))
                if account.is_active && session.matches_version(account.session_version) =>
            {
                Ok(AuthSession(session))
            }
            Ok(Some(_)) => {
                debug!(
                    user_id = %session.user_id,
                    "session refers to inactive or re-versioned account"
                );
                Err(JsonResponse::unauthorized(UNAUTHORIZED).into_response())
            }
            Ok(None) => {
                debug!(user_id = %session.user_id, "session refers to unknown account");
                Err(JsonResponse::unauthorized(UNAUTHORIZED).into_response())
            }
            Err(err) => {
                error!(user_id = %session.user_id, ?err, "failed to confirm session account");
                Err(JsonResponse::server_error("Internal error").into_response())
            }
        }
    }
}

/// `Err` carries a generic 403 response.
pub fn require_permission(session: &SessionRecord, permission: &str) -> Result<(), Response> {
    if session_has_permission(session, permission) {
        Ok(())
    } else {
        debug!(user_id = %session.user_id, permission, "permission denied");
        Err(JsonResponse::forbidden_with_code(FORBIDDEN, "permission_denied").into_response())
    }
}
