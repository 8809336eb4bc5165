//! Handlers for session endpoints.

use axum::{Json, extract::State};
use axum_extra::extract::cookie::{Cookie, CookieJar};

use crate::api::dto::links::ApiResponse;
use crate::api::middleware::auth::SESSION_COOKIE;
use crate::domain::session::Session;
use crate::state::AppState;

/// Returns the current session, or `null` when signed out.
///
/// # Endpoint
///
/// `GET /api/auth/session`
///
/// # Response
///
/// ```json
/// {
///   "user": { "id": "…", "email": "ann@example.com", "name": "Ann", "image": null, "plan": "FREE" },
///   "expires": "2026-11-18T10:00:00Z"
/// }
/// ```
pub async fn session_handler(session: Option<Session>) -> Json<Option<Session>> {
    Json(session)
}

/// Signs the caller out by clearing the session cookie.
///
/// # Endpoint
///
/// `POST /api/auth/signout`
///
/// Always succeeds, including for callers without a session.
pub async fn signout_handler(
    State(state): State<AppState>,
    session: Option<Session>,
    jar: CookieJar,
) -> (CookieJar, Json<ApiResponse<()>>) {
    state.auth_service.sign_out(session.as_ref());

    let jar = jar.remove(Cookie::build(SESSION_COOKIE).path("/"));

    (jar, Json(ApiResponse::ok(())))
}
