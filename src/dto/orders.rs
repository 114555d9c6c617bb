use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::models::{Order, OrderItem};

/// A file field lifted out of a multipart body.
#[derive(Debug)]
pub struct UploadedFile {
    pub file_name: Option<String>,
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

/// Fields collected from the multipart checkout form. Everything stays
/// optional until the order service validates the whole submission.
#[derive(Debug, Default)]
pub struct CheckoutForm {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub payment_method: Option<String>,
    pub cart: Option<String>,
    pub proof: Option<UploadedFile>,
}

/// OpenAPI shape of the checkout form; the handler itself reads the
/// multipart stream field by field.
#[derive(Debug, ToSchema)]
#[allow(dead_code)]
pub struct CheckoutRequestBody {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub address: String,
    pub city: String,
    pub payment_method: String,
    /// Serialized cart: a bare JSON array of entries.
    pub cart: String,
    /// Payment-proof image, at most 5 MiB.
    #[schema(value_type = String, format = Binary)]
    pub proof: Vec<u8>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateOrderStatusRequest {
    pub status: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct OrderWithItems {
    pub order: Order,
    pub items: Vec<OrderItem>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct OrderList {
    pub items: Vec<Order>,
}

/// Admin detail view: each line item is joined with what is left of its
/// artwork, which may be nothing if the piece was deleted.
#[derive(Debug, Serialize, ToSchema)]
pub struct OrderDetail {
    pub order: Order,
    pub items: Vec<ItemWithArtwork>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ItemWithArtwork {
    pub item: OrderItem,
    pub artwork: Option<ArtworkSummary>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ArtworkSummary {
    pub id: Uuid,
    pub slug: String,
    pub title: String,
    pub image: Option<String>,
}
