use axum::{
    Json, Router,
    extract::{DefaultBodyLimit, Multipart, Path, Query, State},
    routing::{delete, get, patch, post, put},
};
use uuid::Uuid;

use crate::{
    dto::artworks::{ArtworkList, ImageUploadBody, SaveArtworkRequest, UploadedImage},
    dto::orders::{OrderDetail, OrderList, UpdateOrderStatusRequest, UploadedFile},
    error::{AppError, AppResult},
    middleware::auth::AuthUser,
    models::{Artwork, Order},
    response::ApiResponse,
    routes::checkout::file_field,
    routes::params::{ArtworkListQuery, OrderListQuery},
    services::{admin_service, catalog_service},
    state::AppState,
};

const IMAGE_BODY_LIMIT: usize = 8 * 1024 * 1024;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/artworks", get(list_artworks_admin))
        .route("/artworks", post(create_artwork))
        .route(
            "/artworks/images",
            post(upload_artwork_image).layer(DefaultBodyLimit::max(IMAGE_BODY_LIMIT)),
        )
        .route("/artworks/{id}", put(update_artwork))
        .route("/artworks/{id}", delete(delete_artwork))
        .route("/orders", get(list_all_orders))
        .route("/orders/{id}", get(get_order_admin))
        .route("/orders/{id}/status", patch(update_order_status))
}

#[utoipa::path(
    get,
    path = "/api/admin/artworks",
    params(
        ("page" = Option<i64>, Query, description = "Page number, default 1"),
        ("per_page" = Option<i64>, Query, description = "Items per page, default 20"),
        ("q" = Option<String>, Query, description = "Title search"),
        ("status" = Option<String>, Query, description = "Filter by status"),
        ("sort_order" = Option<String>, Query, description = "Sort order: asc, desc")
    ),
    responses(
        (status = 200, description = "All artworks (admin only)", body = ApiResponse<ArtworkList>),
        (status = 403, description = "Forbidden"),
    ),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn list_artworks_admin(
    State(state): State<AppState>,
    user: AuthUser,
    Query(query): Query<ArtworkListQuery>,
) -> AppResult<Json<ApiResponse<ArtworkList>>> {
    let resp = catalog_service::list_admin(&state, &user, query).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/admin/artworks",
    request_body = SaveArtworkRequest,
    responses(
        (status = 200, description = "Artwork created", body = ApiResponse<Artwork>),
        (status = 400, description = "Invalid form or duplicate slug"),
        (status = 403, description = "Forbidden"),
    ),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn create_artwork(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<SaveArtworkRequest>,
) -> AppResult<Json<ApiResponse<Artwork>>> {
    let resp = catalog_service::create_artwork(&state, &user, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    put,
    path = "/api/admin/artworks/{id}",
    params(
        ("id" = Uuid, Path, description = "Artwork ID")
    ),
    request_body = SaveArtworkRequest,
    responses(
        (status = 200, description = "Artwork updated", body = ApiResponse<Artwork>),
        (status = 400, description = "Invalid form or duplicate slug"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Not Found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn update_artwork(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<SaveArtworkRequest>,
) -> AppResult<Json<ApiResponse<Artwork>>> {
    let resp = catalog_service::update_artwork(&state, &user, id, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    delete,
    path = "/api/admin/artworks/{id}",
    params(
        ("id" = Uuid, Path, description = "Artwork ID")
    ),
    responses(
        (status = 200, description = "Artwork deleted"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Not Found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn delete_artwork(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<serde_json::Value>>> {
    let resp = catalog_service::delete_artwork(&state, &user, id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/admin/artworks/images",
    request_body(content = ImageUploadBody, content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "Image uploaded", body = ApiResponse<UploadedImage>),
        (status = 400, description = "Missing or non-image file"),
        (status = 403, description = "Forbidden"),
    ),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn upload_artwork_image(
    State(state): State<AppState>,
    user: AuthUser,
    mut multipart: Multipart,
) -> AppResult<Json<ApiResponse<UploadedImage>>> {
    let mut file: Option<UploadedFile> = None;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|_| AppError::BadRequest("Invalid multipart body".into()))?
    {
        if field.name() == Some("image") {
            file = Some(file_field(field).await?);
        }
    }
    let file = file.ok_or_else(|| AppError::BadRequest("Image file is required".into()))?;

    let resp = catalog_service::upload_image(&state, &user, file).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/admin/orders",
    params(
        ("page" = Option<i64>, Query, description = "Page number, default 1"),
        ("per_page" = Option<i64>, Query, description = "Items per page, default 20"),
        ("status" = Option<String>, Query, description = "Filter by order status"),
        ("q" = Option<String>, Query, description = "Search buyer name, email or order id"),
        ("sort_order" = Option<String>, Query, description = "Sort order: asc, desc")
    ),
    responses(
        (status = 200, description = "All orders (admin only)", body = ApiResponse<OrderList>),
        (status = 403, description = "Forbidden"),
    ),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn list_all_orders(
    State(state): State<AppState>,
    user: AuthUser,
    Query(query): Query<OrderListQuery>,
) -> AppResult<Json<ApiResponse<OrderList>>> {
    let resp = admin_service::list_all_orders(&state, &user, query).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/admin/orders/{id}",
    params(
        ("id" = Uuid, Path, description = "Order ID")
    ),
    responses(
        (status = 200, description = "Order with items (admin only)", body = ApiResponse<OrderDetail>),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Not Found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn get_order_admin(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<OrderDetail>>> {
    let resp = admin_service::get_order_admin(&state, &user, id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    patch,
    path = "/api/admin/orders/{id}/status",
    params(
        ("id" = Uuid, Path, description = "Order ID")
    ),
    request_body = UpdateOrderStatusRequest,
    responses(
        (status = 200, description = "Order status updated", body = ApiResponse<Order>),
        (status = 400, description = "Unknown or illegal status transition"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Not Found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn update_order_status(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateOrderStatusRequest>,
) -> AppResult<Json<ApiResponse<Order>>> {
    let resp = admin_service::update_order_status(&state, &user, id, payload).await?;
    Ok(Json(resp))
}
