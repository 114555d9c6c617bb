use utoipa::{
    Modify, OpenApi,
    openapi::{
        self,
        OpenApi as OpenApiSpec,
        security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    },
};
use utoipa_scalar::{Scalar, Servable};

use crate::{
    cart::{Cart, CartEntry},
    dto::{
        artworks::{ArtworkList, ImageUploadBody, SaveArtworkRequest, UploadedImage},
        auth::{LoginRequest, LoginResponse},
        orders::{
            ArtworkSummary, CheckoutRequestBody, ItemWithArtwork, OrderDetail, OrderList,
            OrderWithItems, UpdateOrderStatusRequest,
        },
    },
    models::{Artwork, Order, OrderItem},
    response::{ApiResponse, Meta},
    routes::{admin, auth, checkout, gallery, health, params},
};

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        health::health_check,
        auth::login,
        gallery::list_artworks,
        gallery::get_artwork,
        checkout::checkout,
        admin::list_artworks_admin,
        admin::create_artwork,
        admin::update_artwork,
        admin::delete_artwork,
        admin::upload_artwork_image,
        admin::list_all_orders,
        admin::get_order_admin,
        admin::update_order_status
    ),
    components(
        schemas(
            Artwork,
            Order,
            OrderItem,
            Cart,
            CartEntry,
            ArtworkList,
            SaveArtworkRequest,
            UploadedImage,
            ImageUploadBody,
            CheckoutRequestBody,
            UpdateOrderStatusRequest,
            OrderWithItems,
            OrderList,
            OrderDetail,
            ItemWithArtwork,
            ArtworkSummary,
            LoginRequest,
            LoginResponse,
            params::Pagination,
            params::ArtworkListQuery,
            params::OrderListQuery,
            Meta,
            ApiResponse<Artwork>,
            ApiResponse<ArtworkList>,
            ApiResponse<Order>,
            ApiResponse<OrderWithItems>,
            ApiResponse<OrderDetail>,
            ApiResponse<OrderList>,
            ApiResponse<UploadedImage>,
            ApiResponse<LoginResponse>
        )
    ),
    security(
        ("bearer_auth" = [])
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Health", description = "Health check endpoint"),
        (name = "Gallery", description = "Public gallery endpoints"),
        (name = "Checkout", description = "Manual-payment checkout"),
        (name = "Auth", description = "Authentication endpoints"),
        (name = "Admin", description = "Admin endpoints"),
    )
)]
pub struct ApiDoc;

pub fn scalar_docs() -> Scalar<OpenApiSpec> {
    Scalar::with_url("/docs", ApiDoc::openapi())
}
