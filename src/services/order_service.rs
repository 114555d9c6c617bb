use chrono::Utc;
use sea_orm::ActiveValue::NotSet;
use sea_orm::sea_query::LockType;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QuerySelect, Set, TransactionTrait,
};
use uuid::Uuid;

use crate::{
    audit::log_audit,
    cart::Cart,
    domain::{OrderStatus, PaymentMethod, PaymentStatus},
    dto::orders::{CheckoutForm, OrderWithItems},
    entity::{
        artworks::{Column as ArtCol, Entity as Artworks},
        order_items::{ActiveModel as OrderItemActive, Model as OrderItemModel},
        orders::{ActiveModel as OrderActive, Model as OrderModel},
    },
    error::{AppError, AppResult},
    models::{Order, OrderItem},
    response::{ApiResponse, Meta},
    state::AppState,
    storage::file_ext,
};

const MAX_PROOF_BYTES: usize = 5 * 1024 * 1024;

/// Turn a submitted cart into a pending/pending order.
///
/// The proof upload is the only step outside the database transaction,
/// so it runs first: if it fails nothing was written anywhere, and if
/// the transaction fails afterwards the only debris is a proof blob
/// named after an order id that never existed.
pub async fn checkout(
    state: &AppState,
    form: CheckoutForm,
) -> AppResult<ApiResponse<OrderWithItems>> {
    let name = required(form.name, "name")?;
    let email = required(form.email, "email")?;
    let phone = required(form.phone, "phone")?;
    let address = required(form.address, "address")?;
    let city = required(form.city, "city")?;

    let method_raw = required(form.payment_method, "payment_method")?;
    let method = PaymentMethod::parse(&method_raw)
        .ok_or_else(|| AppError::BadRequest("Unknown payment method".into()))?;

    let cart_raw = form
        .cart
        .ok_or_else(|| AppError::BadRequest("Cart is required".into()))?;
    let cart: Cart = serde_json::from_str(&cart_raw)
        .map_err(|_| AppError::BadRequest("Cart is not valid JSON".into()))?;
    if cart.is_empty() {
        return Err(AppError::BadRequest("Cart is empty".into()));
    }

    let proof = form
        .proof
        .ok_or_else(|| AppError::BadRequest("Payment proof is required".into()))?;
    let is_image = proof
        .content_type
        .as_deref()
        .is_some_and(|ct| ct.starts_with("image/"));
    if !is_image {
        return Err(AppError::BadRequest("Payment proof must be an image".into()));
    }
    if proof.bytes.is_empty() {
        return Err(AppError::BadRequest("Payment proof is empty".into()));
    }
    if proof.bytes.len() > MAX_PROOF_BYTES {
        return Err(AppError::BadRequest("Payment proof exceeds 5 MiB".into()));
    }

    let order_id = Uuid::new_v4();
    let proof_name = format!("{}.{}", order_id, file_ext(proof.file_name.as_deref()));
    let content_type = proof
        .content_type
        .as_deref()
        .unwrap_or("application/octet-stream");
    let proof_url = state
        .blobs
        .put("proofs", &proof_name, content_type, proof.bytes)
        .await?;

    let db_result: AppResult<(OrderModel, Vec<OrderItem>)> = async {
        let txn = state.orm.begin().await?;

        let ids: Vec<Uuid> = cart.entries().iter().map(|e| e.id).collect();
        let artworks = Artworks::find()
            .filter(ArtCol::Id.is_in(ids))
            .lock(LockType::Update)
            .all(&txn)
            .await?;

        // Prices are frozen server-side from the current catalog rows,
        // not trusted from the submitted cart.
        let mut total: i64 = 0;
        let mut lines: Vec<(Uuid, i64)> = Vec::with_capacity(cart.len());
        for entry in cart.entries() {
            let artwork = artworks.iter().find(|a| a.id == entry.id).ok_or_else(|| {
                AppError::BadRequest(format!("Artwork {} is no longer available", entry.id))
            })?;
            total += artwork.price;
            lines.push((artwork.id, artwork.price));
        }

        let order = OrderActive {
            id: Set(order_id),
            buyer_name: Set(name),
            email: Set(email),
            phone: Set(phone),
            shipping_address: Set(address),
            city: Set(city),
            total: Set(total),
            payment_method: Set(method.as_str().to_string()),
            payment_status: Set(PaymentStatus::Pending.as_str().to_string()),
            order_status: Set(OrderStatus::Pending.as_str().to_string()),
            payment_proof_url: Set(Some(proof_url)),
            created_at: NotSet,
        }
        .insert(&txn)
        .await?;

        let mut items: Vec<OrderItem> = Vec::with_capacity(lines.len());
        for (artwork_id, price) in lines {
            let item = OrderItemActive {
                id: Set(Uuid::new_v4()),
                order_id: Set(order.id),
                artwork_id: Set(artwork_id),
                price: Set(price),
                quantity: Set(1),
                created_at: NotSet,
            }
            .insert(&txn)
            .await?;
            items.push(order_item_from_entity(item));
        }

        txn.commit().await?;
        Ok((order, items))
    }
    .await;

    let (order, items) = match db_result {
        Ok(pair) => pair,
        Err(err) => {
            tracing::warn!(
                order_id = %order_id,
                "order write failed after proof upload, blob left orphaned"
            );
            return Err(err);
        }
    };

    if let Err(err) = log_audit(
        &state.pool,
        None,
        "checkout",
        Some("orders"),
        Some(serde_json::json!({ "order_id": order.id, "total": order.total })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(ApiResponse::success(
        "Order placed",
        OrderWithItems {
            order: order_from_entity(order),
            items,
        },
        Some(Meta::empty()),
    ))
}

fn required(value: Option<String>, field: &str) -> Result<String, AppError> {
    match value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty()) {
        Some(v) => Ok(v),
        None => Err(AppError::BadRequest(format!(
            "Missing required field: {field}"
        ))),
    }
}

fn order_from_entity(model: OrderModel) -> Order {
    Order {
        id: model.id,
        buyer_name: model.buyer_name,
        email: model.email,
        phone: model.phone,
        shipping_address: model.shipping_address,
        city: model.city,
        total: model.total,
        payment_method: model.payment_method,
        payment_status: model.payment_status,
        order_status: model.order_status,
        payment_proof_url: model.payment_proof_url,
        created_at: model.created_at.with_timezone(&Utc),
    }
}

fn order_item_from_entity(model: OrderItemModel) -> OrderItem {
    OrderItem {
        id: model.id,
        order_id: model.order_id,
        artwork_id: model.artwork_id,
        price: model.price,
        quantity: model.quantity,
        created_at: model.created_at.with_timezone(&Utc),
    }
}
