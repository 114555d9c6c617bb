use axum::{
    Json, Router,
    extract::{Path, Query, State},
    routing::get,
};

use crate::{
    dto::artworks::ArtworkList,
    error::AppResult,
    models::Artwork,
    response::ApiResponse,
    routes::params::Pagination,
    services::catalog_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_artworks))
        .route("/{slug}", get(get_artwork))
}

#[utoipa::path(
    get,
    path = "/api/artworks",
    params(
        ("page" = Option<i64>, Query, description = "Page number, default 1"),
        ("per_page" = Option<i64>, Query, description = "Items per page, default 20"),
    ),
    responses(
        (status = 200, description = "Available artworks, newest first", body = ApiResponse<ArtworkList>)
    ),
    tag = "Gallery"
)]
pub async fn list_artworks(
    State(state): State<AppState>,
    Query(pagination): Query<Pagination>,
) -> AppResult<Json<ApiResponse<ArtworkList>>> {
    let resp = catalog_service::list_gallery(&state, pagination).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/artworks/{slug}",
    params(
        ("slug" = String, Path, description = "Artwork slug")
    ),
    responses(
        (status = 200, description = "Artwork detail", body = ApiResponse<Artwork>),
        (status = 404, description = "Artwork not found"),
    ),
    tag = "Gallery"
)]
pub async fn get_artwork(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> AppResult<Json<ApiResponse<Artwork>>> {
    let resp = catalog_service::get_by_slug(&state, &slug).await?;
    Ok(Json(resp))
}
