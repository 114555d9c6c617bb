use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::models::Artwork;

/// The full artwork form. The slug is never sent: it is recomputed from
/// the title on every save.
#[derive(Debug, Deserialize, ToSchema)]
pub struct SaveArtworkRequest {
    pub title: String,
    pub description: Option<String>,
    pub price: i64,
    pub dimensions: Option<String>,
    pub medium: Option<String>,
    pub video_url: Option<String>,
    #[serde(default)]
    pub images: Vec<String>,
    pub inventory: i32,
    pub status: String,
}

#[derive(Serialize, ToSchema)]
pub struct ArtworkList {
    pub items: Vec<Artwork>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct UploadedImage {
    pub url: String,
}

/// OpenAPI shape of the image-upload form; the handler reads the
/// multipart stream itself.
#[derive(Debug, ToSchema)]
#[allow(dead_code)]
pub struct ImageUploadBody {
    #[schema(value_type = String, format = Binary)]
    pub image: Vec<u8>,
}
