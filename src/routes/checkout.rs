use axum::{
    Json, Router,
    extract::{DefaultBodyLimit, Multipart, State},
    extract::multipart::Field,
    routing::post,
};

use crate::{
    dto::orders::{CheckoutForm, CheckoutRequestBody, OrderWithItems, UploadedFile},
    error::{AppError, AppResult},
    response::ApiResponse,
    services::order_service,
    state::AppState,
};

// Proof images run up to 5 MiB; leave headroom for the text fields.
const CHECKOUT_BODY_LIMIT: usize = 8 * 1024 * 1024;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(checkout))
        .layer(DefaultBodyLimit::max(CHECKOUT_BODY_LIMIT))
}

#[utoipa::path(
    post,
    path = "/api/checkout",
    request_body(content = CheckoutRequestBody, content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "Order placed", body = ApiResponse<OrderWithItems>),
        (status = 400, description = "Invalid form, empty cart or missing proof"),
    ),
    tag = "Checkout"
)]
pub async fn checkout(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> AppResult<Json<ApiResponse<OrderWithItems>>> {
    let mut form = CheckoutForm::default();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|_| AppError::BadRequest("Invalid multipart body".into()))?
    {
        let name = field.name().map(|s| s.to_string());
        match name.as_deref() {
            Some("name") => form.name = Some(text_field(field).await?),
            Some("email") => form.email = Some(text_field(field).await?),
            Some("phone") => form.phone = Some(text_field(field).await?),
            Some("address") => form.address = Some(text_field(field).await?),
            Some("city") => form.city = Some(text_field(field).await?),
            Some("payment_method") => form.payment_method = Some(text_field(field).await?),
            Some("cart") => form.cart = Some(text_field(field).await?),
            Some("proof") => form.proof = Some(file_field(field).await?),
            _ => {}
        }
    }

    let resp = order_service::checkout(&state, form).await?;
    Ok(Json(resp))
}

pub(crate) async fn text_field(field: Field<'_>) -> Result<String, AppError> {
    field
        .text()
        .await
        .map_err(|_| AppError::BadRequest("Invalid multipart field".into()))
}

pub(crate) async fn file_field(field: Field<'_>) -> Result<UploadedFile, AppError> {
    let file_name = field.file_name().map(|s| s.to_string());
    let content_type = field.content_type().map(|s| s.to_string());
    let bytes = field
        .bytes()
        .await
        .map_err(|_| AppError::BadRequest("Could not read uploaded file".into()))?
        .to_vec();
    Ok(UploadedFile {
        file_name,
        content_type,
        bytes,
    })
}
