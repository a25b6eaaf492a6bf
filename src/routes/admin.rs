use axum::{
    extract::Path,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use crate::permissions::{session_has_permission, AdminRole, Permission};
use crate::routes::auth::{require_permission, AuthSession};

/// 200 when the session may use `permission`, 403 otherwise.
pub async fn check_permission(
    AuthSession(session): AuthSession,
    Path(permission): Path<String>,
) -> Response {
    if let Err(denied) = require_permission(&session, &permission) {
        return denied;
    }

    Json(json!({
        "success": true,
        "permission": permission,
        "allowed": true,
    }))
    .into_response()
}

/// Every known permission and whether this session holds it.
pub async fn list_permissions(AuthSession(session): AuthSession) -> Response {
    let granted: serde_json::Map<String, serde_json::Value> = Permission::ALL
        .into_iter()
        .map(|permission| {
            let allowed = session_has_permission(&session, permission.as_str());
            (permission.as_str().to_string(), allowed.into())
        })
        .collect();

    let role = session
        .role
        .as_deref()
        .and_then(|role| role.parse::<AdminRole>().ok());

    Json(json!({
        "success": true,
        "role": role,
        "permissions": granted,
    }))
    .into_response()
}
