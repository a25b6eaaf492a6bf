use axum::{
    extract::{Json, State},
    response::{IntoResponse, Response},
};
use axum_extra::extract::cookie::CookieJar;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{error, info, warn};

use super::session::AuthSession;
use crate::{
    cookies::store::JarStore,
    models::account::PublicAccount,
    responses::JsonResponse,
    state::AppState,
    utils::password::verify_password,
};

const INVALID_CREDENTIALS: &str = "Invalid credentials";

#[derive(Deserialize, Serialize)]
pub struct LoginPayload {
    pub email: String,
    pub password: String,
}

pub async fn handle_login(
    State(app_state): State<AppState>,
    jar: CookieJar,
    Json(payload): Json<LoginPayload>,
) -> Response {
    let audience = app_state.authority.audience();
    let account = match app_state
        .accounts
        .find_account_by_email(payload.email.trim(), audience)
        .await
    {
        Ok(Some(record)) => record,
        Ok(None) => return JsonResponse::unauthorized(INVALID_CREDENTIALS).into_response(),
        Err(err) => {
            error!(?err, "credential store lookup failed during login");
            return JsonResponse::server_error("Internal error").into_response();
        }
    };

    if account.password_hash.trim().is_empty() {
        return JsonResponse::unauthorized(INVALID_CREDENTIALS).into_response();
    }

    match verify_password(&payload.password, &account.password_hash) {
        Ok(true) => {}
        Ok(false) => return JsonResponse::unauthorized(INVALID_CREDENTIALS).into_response(),
        Err(err) => {
            error!(user_id = %account.id, ?err, "stored password hash could not be parsed");
            return JsonResponse::server_error("Internal error").into_response();
        }
    }

    if !account.is_active {
        warn!(user_id = %account.id, "login attempt for inactive account");
        return JsonResponse::unauthorized(INVALID_CREDENTIALS).into_response();
    }

    let mut store = JarStore::new(jar);
    if let Err(err) = app_state.authority.start_session(&mut store, &account) {
        error!(user_id = %account.id, ?err, "failed to issue session token");
        return JsonResponse::server_error("Internal error").into_response();
    }

    info!(user_id = %account.id, ?audience, "session started");
    (
        store.into_jar(),
        Json(json!({
            "success": true,
            "user": PublicAccount::from(&account),
        })),
    )
        .into_response()
}

/// Echoes the verified session record.
pub async fn handle_session(AuthSession(session): AuthSession) -> Response {
    Json(json!({
        "success": true,
        "session": session,
    }))
    .into_response()
}
