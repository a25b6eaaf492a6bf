use axum::{
    extract::State,
    response::{IntoResponse, Response},
};
use axum_extra::extract::cookie::CookieJar;

use crate::{cookies::store::JarStore, responses::JsonResponse, state::AppState};

pub async fn handle_logout(State(app_state): State<AppState>, jar: CookieJar) -> Response {
    let mut store = JarStore::new(jar);
    app_state.authority.end_session(&mut store);

    (store.into_jar(), JsonResponse::success("Logged out")).into_response()
}
