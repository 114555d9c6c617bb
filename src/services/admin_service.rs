use chrono::Utc;
use sea_orm::ActiveValue::Set;
use sea_orm::sea_query::Expr;
use sea_orm::sea_query::LockType;
use sea_orm::sea_query::extension::postgres::PgExpr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect, TransactionTrait,
};
use uuid::Uuid;

use crate::{
    audit::log_audit,
    domain::{self, ArtworkStatus, OrderStatus},
    dto::orders::{
        ArtworkSummary, ItemWithArtwork, OrderDetail, OrderList, UpdateOrderStatusRequest,
    },
    entity::{
        artworks::{ActiveModel as ArtworkActive, Entity as Artworks, Model as ArtworkModel},
        order_items::{Column as OrderItemCol, Entity as OrderItems, Model as OrderItemModel},
        orders::{
            ActiveModel as OrderActive, Column as OrderCol, Entity as Orders, Model as OrderModel,
        },
    },
    error::{AppError, AppResult},
    middleware::auth::{AuthUser, ensure_admin},
    models::{Order, OrderItem},
    response::{ApiResponse, Meta},
    routes::params::{OrderListQuery, SortOrder},
    state::AppState,
};

pub async fn list_all_orders(
    state: &AppState,
    user: &AuthUser,
    query: OrderListQuery,
) -> AppResult<ApiResponse<OrderList>> {
    ensure_admin(user)?;
    let (page, limit, offset) = query.pagination.normalize();

    let mut condition = Condition::all();
    if let Some(status) = query.status.as_ref().filter(|s| !s.is_empty()) {
        let status = OrderStatus::parse(status)
            .ok_or_else(|| AppError::BadRequest("Invalid order status".into()))?;
        condition = condition.add(OrderCol::OrderStatus.eq(status.as_str()));
    }
    if let Some(q) = query.q.as_ref().filter(|s| !s.is_empty()) {
        let pattern = format!("%{}%", q);
        let mut any = Condition::any()
            .add(Expr::col(OrderCol::BuyerName).ilike(pattern.clone()))
            .add(Expr::col(OrderCol::Email).ilike(pattern));
        if let Ok(id) = Uuid::parse_str(q) {
            any = any.add(OrderCol::Id.eq(id));
        }
        condition = condition.add(any);
    }

    let sort_order = query.sort_order.unwrap_or(SortOrder::Desc);
    let mut finder = Orders::find().filter(condition);
    finder = match sort_order {
        SortOrder::Asc => finder.order_by_asc(OrderCol::CreatedAt),
        SortOrder::Desc => finder.order_by_desc(OrderCol::CreatedAt),
    };

    let total = finder.clone().count(&state.orm).await? as i64;

    let orders = finder
        .limit(limit as u64)
        .offset(offset as u64)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(order_from_entity)
        .collect();

    let meta = Meta::new(page, limit, total);
    Ok(ApiResponse::success(
        "Orders",
        OrderList { items: orders },
        Some(meta),
    ))
}

pub async fn get_order_admin(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<OrderDetail>> {
    ensure_admin(user)?;
    let order = Orders::find_by_id(id).one(&state.orm).await?;
    let order = match order {
        Some(o) => o,
        None => return Err(AppError::NotFound),
    };

    let rows = OrderItems::find()
        .filter(OrderItemCol::OrderId.eq(order.id))
        .find_also_related(Artworks)
        .all(&state.orm)
        .await?;

    let items = rows
        .into_iter()
        .map(|(item, artwork)| ItemWithArtwork {
            item: order_item_from_entity(item),
            artwork: artwork.map(artwork_summary),
        })
        .collect();

    let data = OrderDetail {
        order: order_from_entity(order),
        items,
    };
    Ok(ApiResponse::success("Order found", data, Some(Meta::empty())))
}

/// Apply an admin status action to an order. The transition table decides
/// both statuses; a settling transition also flips last-unit artworks to
/// sold. Everything runs in one transaction against locked rows, so a
/// racing admin serializes behind the first writer and is re-validated
/// against the committed state.
pub async fn update_order_status(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
    payload: UpdateOrderStatusRequest,
) -> AppResult<ApiResponse<Order>> {
    ensure_admin(user)?;
    let target = OrderStatus::parse(&payload.status)
        .ok_or_else(|| AppError::BadRequest("Invalid order status".into()))?;

    let txn = state.orm.begin().await?;

    let order = Orders::find_by_id(id)
        .lock(LockType::Update)
        .one(&txn)
        .await?;
    let order = match order {
        Some(o) => o,
        None => return Err(AppError::NotFound),
    };

    let current = OrderStatus::parse(&order.order_status).ok_or_else(|| {
        AppError::Internal(anyhow::anyhow!(
            "order {} carries unknown status {}",
            order.id,
            order.order_status
        ))
    })?;

    let transition = current.transition_to(target).ok_or_else(|| {
        AppError::BadRequest(format!(
            "Cannot move a {} order to {}",
            current.as_str(),
            target.as_str()
        ))
    })?;

    let mut settled: Vec<Uuid> = Vec::new();
    if transition.settles_inventory {
        let items = OrderItems::find()
            .filter(OrderItemCol::OrderId.eq(order.id))
            .all(&txn)
            .await?;
        for item in items {
            // Weak reference: an artwork deleted since the order was
            // placed is simply skipped.
            let artwork = Artworks::find_by_id(item.artwork_id)
                .lock(LockType::Update)
                .one(&txn)
                .await?;
            let Some(artwork) = artwork else { continue };
            if domain::settles_to_sold(artwork.inventory) {
                let artwork_id = artwork.id;
                let mut active: ArtworkActive = artwork.into();
                active.status = Set(ArtworkStatus::Sold.as_str().to_string());
                active.update(&txn).await?;
                settled.push(artwork_id);
            }
        }
    }

    let mut active: OrderActive = order.into();
    active.order_status = Set(transition.order_status.as_str().to_string());
    active.payment_status = Set(transition.payment_status.as_str().to_string());
    let order = active.update(&txn).await?;

    txn.commit().await?;

    if let Err(err) = log_audit(
        &state.pool,
        Some(user.user_id),
        "order_status_update",
        Some("orders"),
        Some(serde_json::json!({
            "order_id": order.id,
            "from": current.as_str(),
            "to": target.as_str(),
            "settled_artworks": settled,
        })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(ApiResponse::success(
        "Order updated",
        order_from_entity(order),
        Some(Meta::empty()),
    ))
}

fn artwork_summary(model: ArtworkModel) -> ArtworkSummary {
    ArtworkSummary {
        id: model.id,
        slug: model.slug,
        title: model.title,
        image: model.images.into_iter().next(),
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
