//! API route configuration.
//!
//! Link management routes require a session; the gate itself lives in
//! [`crate::api::middleware::auth::layer`], applied at the top-level router.

use crate::api::handlers::{
    callback_handler, create_link_handler, delete_link_handler, get_link_handler,
    list_links_handler, session_handler, signin_handler, signout_handler, update_link_handler,
};
use crate::state::AppState;
use axum::{
    Router,
    routing::{get, post},
};

/// Link management routes, owned by the signed-in user.
///
/// # Endpoints
///
/// - `GET    /links`          - List the caller's links (paginated, searchable)
/// - `POST   /links`          - Create a link
/// - `GET    /links/{slug}`   - Fetch one link
/// - `PATCH  /links/{slug}`   - Partially update a link
/// - `DELETE /links/{slug}`   - Delete a link
pub fn link_routes() -> Router<AppState> {
    Router::new()
        .route("/links", get(list_links_handler).post(create_link_handler))
        .route(
            "/links/{slug}",
            get(get_link_handler)
                .patch(update_link_handler)
                .delete(delete_link_handler),
        )
}

/// Sign-in and session routes, available with or without a session.
///
/// # Endpoints
///
/// - `GET  /auth/signin/{provider}`     - Redirect to the OAuth provider
/// - `GET  /auth/callback/{provider}`   - Finish sign-in, set the session cookie
/// - `GET  /auth/session`               - Current session, or `null`
/// - `POST /auth/signout`               - Clear the session cookie
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/signin/{provider}", get(signin_handler))
        .route("/auth/callback/{provider}", get(callback_handler))
        .route("/auth/session", get(session_handler))
        .route("/auth/signout", post(signout_handler))
}
