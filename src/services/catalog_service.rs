use chrono::Utc;
use sea_orm::sea_query::Expr;
use sea_orm::sea_query::extension::postgres::PgExpr;
use sea_orm::{
    ColumnTrait, Condition, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect,
};
use uuid::Uuid;

use crate::{
    audit::log_audit,
    dto::artworks::{ArtworkList, SaveArtworkRequest, UploadedImage},
    dto::orders::UploadedFile,
    entity::artworks::{Column as ArtCol, Entity as Artworks, Model as ArtworkModel},
    error::{AppError, AppResult},
    middleware::auth::{AuthUser, ensure_admin},
    models::Artwork,
    response::{ApiResponse, Meta},
    routes::params::{ArtworkListQuery, Pagination, SortOrder},
    slug::slugify,
    state::AppState,
    storage::file_ext,
};

/// Public gallery: available artworks, newest first.
pub async fn list_gallery(
    state: &AppState,
    pagination: Pagination,
) -> AppResult<ApiResponse<ArtworkList>> {
    let (page, limit, offset) = pagination.normalize();

    let items = sqlx::query_as::<_, Artwork>(
        "SELECT * FROM artworks WHERE status = 'available' ORDER BY created_at DESC LIMIT $1 OFFSET $2",
    )
    .bind(limit)
    .bind(offset)
    .fetch_all(&state.pool)
    .await?;

    let total: (i64,) = sqlx::query_as("SELECT count(*) FROM artworks WHERE status = 'available'")
        .fetch_one(&state.pool)
        .await?;

    let meta = Meta::new(page, limit, total.0);
    Ok(ApiResponse::success(
        "Artworks",
        ArtworkList { items },
        Some(meta),
    ))
}

/// Detail lookup by slug, whatever the status; a missing slug is the
/// distinct not-found outcome, not a validation error.
pub async fn get_by_slug(state: &AppState, slug: &str) -> AppResult<ApiResponse<Artwork>> {
    let artwork = sqlx::query_as::<_, Artwork>("SELECT * FROM artworks WHERE slug = $1")
        .bind(slug)
        .fetch_optional(&state.pool)
        .await?;
    let artwork = match artwork {
        Some(a) => a,
        None => return Err(AppError::NotFound),
    };
    Ok(ApiResponse::success("Artwork", artwork, None))
}

/// Admin listing across all statuses with optional title search.
pub async fn list_admin(
    state: &AppState,
    user: &AuthUser,
    query: ArtworkListQuery,
) -> AppResult<ApiResponse<ArtworkList>> {
    ensure_admin(user)?;
    let (page, limit, offset) = query.pagination.normalize();

    let mut condition = Condition::all();
    if let Some(search) = query.q.as_ref().filter(|s| !s.is_empty()) {
        let pattern = format!("%{}%", search);
        condition = condition.add(Expr::col(ArtCol::Title).ilike(pattern));
    }
    if let Some(status) = query.status.as_ref().filter(|s| !s.is_empty()) {
        condition = condition.add(ArtCol::Status.eq(status.clone()));
    }

    let sort_order = query.sort_order.unwrap_or(SortOrder::Desc);
    let mut finder = Artworks::find().filter(condition);
    finder = match sort_order {
        SortOrder::Asc => finder.order_by_asc(ArtCol::CreatedAt),
        SortOrder::Desc => finder.order_by_desc(ArtCol::CreatedAt),
    };

    let total = finder.clone().count(&state.orm).await? as i64;

    let items = finder
        .limit(limit as u64)
        .offset(offset as u64)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(artwork_from_entity)
        .collect();

    let meta = Meta::new(page, limit, total);
    Ok(ApiResponse::success(
        "Artworks",
        ArtworkList { items },
        Some(meta),
    ))
}

pub async fn create_artwork(
    state: &AppState,
    user: &AuthUser,
    payload: SaveArtworkRequest,
) -> AppResult<ApiResponse<Artwork>> {
    ensure_admin(user)?;
    validate_form(&payload)?;

    let slug = slugify(&payload.title);
    ensure_slug_free(state, &slug, None).await?;

    let id = Uuid::new_v4();
    let artwork = sqlx::query_as::<_, Artwork>(
        r#"
        INSERT INTO artworks
            (id, slug, title, description, price, dimensions, medium, video_url, images, inventory, status)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
        RETURNING *
        "#,
    )
    .bind(id)
    .bind(&slug)
    .bind(payload.title.trim())
    .bind(payload.description)
    .bind(payload.price)
    .bind(payload.dimensions)
    .bind(payload.medium)
    .bind(payload.video_url)
    .bind(&payload.images)
    .bind(payload.inventory)
    .bind(payload.status)
    .fetch_one(&state.pool)
    .await?;

    if let Err(err) = log_audit(
        &state.pool,
        Some(user.user_id),
        "artwork_create",
        Some("artworks"),
        Some(serde_json::json!({ "artwork_id": artwork.id, "slug": artwork.slug })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(ApiResponse::success(
        "Artwork created",
        artwork,
        Some(Meta::empty()),
    ))
}

/// Full-form save: every field is written, and the slug is recomputed
/// from the title on every save.
pub async fn update_artwork(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
    payload: SaveArtworkRequest,
) -> AppResult<ApiResponse<Artwork>> {
    ensure_admin(user)?;
    validate_form(&payload)?;

    let slug = slugify(&payload.title);
    ensure_slug_free(state, &slug, Some(id)).await?;

    let artwork = sqlx::query_as::<_, Artwork>(
        r#"
        UPDATE artworks
        SET slug = $2, title = $3, description = $4, price = $5, dimensions = $6,
            medium = $7, video_url = $8, images = $9, inventory = $10, status = $11
        WHERE id = $1
        RETURNING *
        "#,
    )
    .bind(id)
    .bind(&slug)
    .bind(payload.title.trim())
    .bind(payload.description)
    .bind(payload.price)
    .bind(payload.dimensions)
    .bind(payload.medium)
    .bind(payload.video_url)
    .bind(&payload.images)
    .bind(payload.inventory)
    .bind(payload.status)
    .fetch_optional(&state.pool)
    .await?;
    let artwork = match artwork {
        Some(a) => a,
        None => return Err(AppError::NotFound),
    };

    if let Err(err) = log_audit(
        &state.pool,
        Some(user.user_id),
        "artwork_update",
        Some("artworks"),
        Some(serde_json::json!({ "artwork_id": artwork.id, "slug": artwork.slug })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(ApiResponse::success("Updated", artwork, Some(Meta::empty())))
}

/// Hard delete, an explicit admin action only. Order items keep their
/// frozen price and dangling artwork id.
pub async fn delete_artwork(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<serde_json::Value>> {
    ensure_admin(user)?;
    let result = sqlx::query("DELETE FROM artworks WHERE id = $1")
        .bind(id)
        .execute(&state.pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound);
    }

    if let Err(err) = log_audit(
        &state.pool,
        Some(user.user_id),
        "artwork_delete",
        Some("artworks"),
        Some(serde_json::json!({ "artwork_id": id })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(ApiResponse::success(
        "Deleted",
        serde_json::json!({}),
        Some(Meta::empty()),
    ))
}

/// Store an artwork image under a fresh UUID name and hand back its URL;
/// the admin form collects the URLs into the artwork's image list.
pub async fn upload_image(
    state: &AppState,
    user: &AuthUser,
    file: UploadedFile,
) -> AppResult<ApiResponse<UploadedImage>> {
    ensure_admin(user)?;

    let is_image = file
        .content_type
        .as_deref()
        .is_some_and(|ct| ct.starts_with("image/"));
    if !is_image {
        return Err(AppError::BadRequest("Upload must be an image".into()));
    }
    if file.bytes.is_empty() {
        return Err(AppError::BadRequest("Upload is empty".into()));
    }

    let name = format!("{}.{}", Uuid::new_v4(), file_ext(file.file_name.as_deref()));
    let content_type = file.content_type.as_deref().unwrap_or("application/octet-stream");
    let url = state
        .blobs
        .put("artworks", &name, content_type, file.bytes)
        .await?;

    if let Err(err) = log_audit(
        &state.pool,
        Some(user.user_id),
        "artwork_image_upload",
        Some("artworks"),
        Some(serde_json::json!({ "url": url })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(ApiResponse::success(
        "Image uploaded",
        UploadedImage { url },
        Some(Meta::empty()),
    ))
}

fn validate_form(payload: &SaveArtworkRequest) -> Result<(), AppError> {
    if payload.title.trim().is_empty() {
        return Err(AppError::BadRequest("Title is required".into()));
    }
    if payload.price <= 0 {
        return Err(AppError::BadRequest("Price must be positive".into()));
    }
    if payload.inventory < 0 {
        return Err(AppError::BadRequest("Inventory cannot be negative".into()));
    }
    let status = crate::domain::ArtworkStatus::parse(&payload.status)
        .ok_or_else(|| AppError::BadRequest("Invalid artwork status".into()))?;
    if status == crate::domain::ArtworkStatus::Available && payload.images.is_empty() {
        return Err(AppError::BadRequest(
            "An available artwork needs at least one image".into(),
        ));
    }
    Ok(())
}

async fn ensure_slug_free(state: &AppState, slug: &str, exclude: Option<Uuid>) -> AppResult<()> {
    let taken: Option<(Uuid,)> = match exclude {
        Some(id) => {
            sqlx::query_as("SELECT id FROM artworks WHERE slug = $1 AND id <> $2")
                .bind(slug)
                .bind(id)
                .fetch_optional(&state.pool)
                .await?
        }
        None => {
            sqlx::query_as("SELECT id FROM artworks WHERE slug = $1")
                .bind(slug)
                .fetch_optional(&state.pool)
                .await?
        }
    };
    if taken.is_some() {
        return Err(AppError::BadRequest(
            "An artwork with this title already exists".into(),
        ));
    }
    Ok(())
}

fn artwork_from_entity(model: ArtworkModel) -> Artwork {
    Artwork {
        id: model.id,
        slug: model.slug,
        title: model.title,
        description: model.description,
        price: model.price,
        dimensions: model.dimensions,
        medium: model.medium,
        video_url: model.video_url,
        images: model.images,
        inventory: model.inventory,
        status: model.status,
        created_at: model.created_at.with_timezone(&Utc),
    }
}
