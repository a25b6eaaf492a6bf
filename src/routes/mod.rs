pub mod admin;
pub mod auth;

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::trace::TraceLayer;

use crate::models::app::Audience;
use crate::state::AppState;

pub fn app_router(state: AppState) -> Router {
    let auth_routes = Router::new()
        .route("/login", post(auth::handle_login))
        .route("/logout", post(auth::handle_logout))
        .route("/session", get(auth::handle_session));

    let mut router = Router::new().nest("/api/auth", auth_routes);

    // Permission checks only make sense where admin sessions are issued.
    if state.authority.audience() == Audience::Admin {
        let admin_routes = Router::new()
            .route("/permissions", get(admin::list_permissions))
            .route("/permissions/{permission}", get(admin::check_permission));
        router = router.nest("/api/admin", admin_routes);
    }

    router.with_state(state).layer(TraceLayer::new_for_http())
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::{
        body::Body,
        http::{Request, StatusCode},
    };
    use tower::ServiceExt;

    use super::app_router;
    use crate::{
        authority::test_support::test_authority, db::mock_db::MockCredentialStore,
        models::app::Audience, state::AppState,
    };

    fn state(audience: Audience) -> AppState {
        AppState {
            authority: Arc::new(test_authority(audience)),
            accounts: Arc::new(MockCredentialStore::default()),
        }
    }

    #[tokio::test]
    async fn admin_routes_exist_only_for_admin_audience() {
        let res = app_router(state(Audience::User))
            .oneshot(
                Request::get("/api/admin/permissions")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::NOT_FOUND);

        let res = app_router(state(Audience::Admin))
            .oneshot(
                Request::get("/api/admin/permissions")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn logout_is_mounted_under_api_auth() {
        let res = app_router(state(Audience::User))
            .oneshot(Request::post("/api/auth/logout").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::OK);
    }
}
