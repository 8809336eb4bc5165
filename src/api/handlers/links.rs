//! Handlers for link management endpoints.
//!
//! All handlers here run behind [`crate::api::middleware::auth::layer`] and
//! act on behalf of the signed-in [`Session`] user.

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use validator::Validate;

use crate::api::dto::links::{
    ApiResponse, CreateLinkData, CreateLinkRequest, LinkListData, LinkView, UpdateLinkRequest,
};
use crate::api::dto::pagination::{ListLinksQuery, PaginationMeta};
use crate::domain::entities::Link;
use crate::domain::session::Session;
use crate::error::AppError;
use crate::state::AppState;

fn view(state: &AppState, link: Link) -> LinkView {
    let short_url = state.link_service.short_url(&link.slug);
    LinkView::new(link, short_url)
}

/// Creates a short link.
///
/// # Endpoint
///
/// `POST /api/links`
///
/// # Request Body
///
/// ```json
/// {
///   "originalUrl": "https://example.com/very/long/path",
///   "customSlug": "promo",          // optional, paid plans
///   "title": "Spring promo",        // optional
///   "tags": ["marketing"],          // optional
///   "expiresAt": "2030-01-01T00:00:00Z", // optional
///   "password": "secret"            // optional, paid plans
/// }
/// ```
///
/// # Response Codes
///
/// - **201 Created**: `{ "success": true, "data": { "link", "shortUrl", "qrCodeUrl" } }`
/// - **400 Bad Request**: Validation failed
/// - **403 Forbidden**: Plan quota or feature restriction
/// - **409 Conflict**: Custom slug taken
/// - **503 Service Unavailable**: No free random slug found
pub async fn create_link_handler(
    State(state): State<AppState>,
    session: Session,
    Json(payload): Json<CreateLinkRequest>,
) -> Result<(StatusCode, Json<ApiResponse<CreateLinkData>>), AppError> {
    payload.validate()?;

    let link = state
        .link_service
        .create_link(session.user.id, payload.into_draft())
        .await?;

    let short_url = state.link_service.short_url(&link.slug);
    let qr_code_url = state.link_service.qr_code_url(&link.slug);

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::ok(CreateLinkData {
            link: LinkView::new(link, short_url.clone()),
            short_url,
            qr_code_url,
        })),
    ))
}

/// Lists the caller's links.
///
/// # Endpoint
///
/// `GET /api/links?page=1&limit=10&search=docs&tag=rust&sortBy=createdAt&sortOrder=desc`
pub async fn list_links_handler(
    State(state): State<AppState>,
    session: Session,
    Query(params): Query<ListLinksQuery>,
) -> Result<Json<ApiResponse<LinkListData>>, AppError> {
    let request = params.resolve()?;

    let page = state
        .link_service
        .list_links(session.user.id, request.query)
        .await?;

    let links = page.links.into_iter().map(|l| view(&state, l)).collect();

    Ok(Json(ApiResponse::ok(LinkListData {
        links,
        pagination: PaginationMeta::new(request.page, request.limit, page.total),
    })))
}

/// Returns one of the caller's links.
///
/// # Endpoint
///
/// `GET /api/links/{slug}`
pub async fn get_link_handler(
    State(state): State<AppState>,
    session: Session,
    Path(slug): Path<String>,
) -> Result<Json<ApiResponse<LinkView>>, AppError> {
    let link = state.link_service.get_link(session.user.id, &slug).await?;

    Ok(Json(ApiResponse::ok(view(&state, link))))
}

/// Partially updates one of the caller's links.
///
/// # Endpoint
///
/// `PATCH /api/links/{slug}`
///
/// Omitted fields are left unchanged. `"expiresAt": null` and
/// `"password": null` clear those values.
pub async fn update_link_handler(
    State(state): State<AppState>,
    session: Session,
    Path(slug): Path<String>,
    Json(payload): Json<UpdateLinkRequest>,
) -> Result<Json<ApiResponse<LinkView>>, AppError> {
    payload.validate()?;

    let link = state
        .link_service
        .update_link(session.user.id, &slug, payload.into_changes())
        .await?;

    Ok(Json(ApiResponse::ok(view(&state, link))))
}

/// Deletes one of the caller's links.
///
/// # Endpoint
///
/// `DELETE /api/links/{slug}`
///
/// # Response Codes
///
/// - **204 No Content**: Deleted
/// - **404 Not Found**: No such link for this user
pub async fn delete_link_handler(
    State(state): State<AppState>,
    session: Session,
    Path(slug): Path<String>,
) -> Result<StatusCode, AppError> {
    state
        .link_service
        .delete_link(session.user.id, &slug)
        .await?;

    Ok(StatusCode::NO_CONTENT)
}
