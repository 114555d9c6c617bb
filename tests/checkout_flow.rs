use std::sync::Arc;

use atelier_api::{
    cart::{Cart, CartEntry},
    db::{create_orm_conn, create_pool, run_migrations},
    dto::artworks::SaveArtworkRequest,
    dto::orders::{CheckoutForm, UpdateOrderStatusRequest, UploadedFile},
    entity::artworks::{ActiveModel as ArtworkActive, Model as ArtworkModel},
    entity::users::ActiveModel as UserActive,
    error::AppError,
    middleware::auth::AuthUser,
    models::Artwork,
    routes::params::{OrderListQuery, Pagination},
    services::{admin_service, catalog_service, order_service},
    slug::slugify,
    state::AppState,
    storage::MemoryBlobStore,
};
use sea_orm::ActiveValue::NotSet;
use sea_orm::{ActiveModelTrait, ConnectionTrait, Set, Statement};
use uuid::Uuid;

// Integration flow: a customer checks out a cart with a payment proof, the
// admin walks the orders through their lifecycle, and settlement flips
// last-unit artworks to sold without ever touching inventory counts.
#[tokio::test]
async fn checkout_and_order_lifecycle_flow() -> anyhow::Result<()> {
    // Allow skipping when no DB is configured in the environment.
    let database_url = match std::env::var("TEST_DATABASE_URL")
        .or_else(|_| std::env::var("DATABASE_URL"))
    {
        Ok(url) => url,
        Err(_) => {
            eprintln!(
                "Skipping test: set TEST_DATABASE_URL or DATABASE_URL to run integration flow tests."
            );
            return Ok(());
        }
    };

    let (state, blobs) = setup_state(&database_url).await?;

    let admin_id = create_admin(&state, "admin@example.com").await?;
    let auth_admin = AuthUser {
        user_id: admin_id,
        role: "admin".into(),
    };

    // One last-unit piece and one multi-unit print run.
    let last_unit = create_artwork(&state, "Lone Tree", 5000, 1).await?;
    let multi_unit = create_artwork(&state, "Blue Print Series", 12_000, 3).await?;

    let mut cart = Cart::new();
    cart.add(entry_for(&last_unit));
    cart.add(entry_for(&multi_unit));

    // Bad submissions are rejected before anything is written.
    let mut missing_proof = checkout_form(&cart);
    missing_proof.proof = None;
    let err = order_service::checkout(&state, missing_proof)
        .await
        .err()
        .expect("missing proof rejected");
    assert!(matches!(err, AppError::BadRequest(_)));

    let mut empty_cart = checkout_form(&cart);
    empty_cart.cart = Some("[]".into());
    let err = order_service::checkout(&state, empty_cart)
        .await
        .err()
        .expect("empty cart rejected");
    assert!(matches!(err, AppError::BadRequest(_)));

    let mut bad_method = checkout_form(&cart);
    bad_method.payment_method = Some("jazzcash".into());
    let err = order_service::checkout(&state, bad_method)
        .await
        .err()
        .expect("unknown payment method rejected");
    assert!(matches!(err, AppError::BadRequest(_)));

    let mut pdf_proof = checkout_form(&cart);
    pdf_proof.proof = Some(UploadedFile {
        file_name: Some("receipt.pdf".into()),
        content_type: Some("application/pdf".into()),
        bytes: vec![1, 2, 3],
    });
    let err = order_service::checkout(&state, pdf_proof)
        .await
        .err()
        .expect("non-image proof rejected");
    assert!(matches!(err, AppError::BadRequest(_)));

    let orders_so_far: (i64,) = sqlx::query_as("SELECT count(*) FROM orders")
        .fetch_one(&state.pool)
        .await?;
    assert_eq!(orders_so_far.0, 0, "rejected submissions must not write");

    // Checkout both pieces.
    let resp = order_service::checkout(&state, checkout_form(&cart)).await?;
    let placed = resp.data.expect("order data");
    assert_eq!(placed.order.total, 17_000);
    assert_eq!(placed.order.order_status, "pending");
    assert_eq!(placed.order.payment_status, "pending");
    assert_eq!(placed.items.len(), 2);
    assert!(placed.items.iter().any(|i| i.price == 5000));
    assert!(placed.items.iter().any(|i| i.price == 12_000));
    assert!(placed.items.iter().all(|i| i.quantity == 1));

    // The proof was uploaded under a name derived from the order id.
    let proof_url = placed.order.payment_proof_url.clone().expect("proof url");
    assert!(proof_url.contains(&placed.order.id.to_string()));
    let proof_name = format!("{}.png", placed.order.id);
    assert!(blobs.get("proofs", &proof_name).is_some());

    // The client clears its cart only after a success response.
    cart.clear();
    assert!(cart.is_empty());

    // Item prices are snapshots: repricing the artwork later changes nothing.
    sqlx::query("UPDATE artworks SET price = $2 WHERE id = $1")
        .bind(last_unit.id)
        .bind(99_999_i64)
        .execute(&state.pool)
        .await?;

    // pending -> shipped settles the last-unit piece only.
    let shipped = admin_service::update_order_status(
        &state,
        &auth_admin,
        placed.order.id,
        UpdateOrderStatusRequest {
            status: "shipped".into(),
        },
    )
    .await?
    .data
    .expect("updated order");
    assert_eq!(shipped.order_status, "shipped");
    assert_eq!(shipped.payment_status, "paid");

    let lone = fetch_artwork(&state, last_unit.id).await?;
    assert_eq!(lone.status, "sold");
    assert_eq!(lone.inventory, 1, "settlement never decrements inventory");
    let prints = fetch_artwork(&state, multi_unit.id).await?;
    assert_eq!(prints.status, "available");
    assert_eq!(prints.inventory, 3);

    // Re-applying the same target is idempotent; leaving shipped is not allowed.
    let again = admin_service::update_order_status(
        &state,
        &auth_admin,
        placed.order.id,
        UpdateOrderStatusRequest {
            status: "shipped".into(),
        },
    )
    .await?
    .data
    .expect("updated order");
    assert_eq!(again.order_status, "shipped");
    assert_eq!(again.payment_status, "paid");
    let lone = fetch_artwork(&state, last_unit.id).await?;
    assert_eq!(lone.inventory, 1);

    for illegal in ["cancelled", "paid", "pending"] {
        let err = admin_service::update_order_status(
            &state,
            &auth_admin,
            placed.order.id,
            UpdateOrderStatusRequest {
                status: illegal.into(),
            },
        )
        .await
        .err()
        .expect("shipped is terminal");
        assert!(matches!(err, AppError::BadRequest(_)));
    }

    // The frozen item price survived the repricing.
    let detail = admin_service::get_order_admin(&state, &auth_admin, placed.order.id)
        .await?
        .data
        .expect("order detail");
    let lone_item = detail
        .items
        .iter()
        .find(|i| i.item.artwork_id == last_unit.id)
        .expect("lone tree line item");
    assert_eq!(lone_item.item.price, 5000);
    assert_eq!(
        lone_item.artwork.as_ref().map(|a| a.slug.as_str()),
        Some("lone-tree")
    );

    // Second order: cancelling a paid order reverts its payment status.
    let mut cart = Cart::new();
    cart.add(entry_for(&multi_unit));
    let second = order_service::checkout(&state, checkout_form(&cart))
        .await?
        .data
        .expect("order data");

    let paid = admin_service::update_order_status(
        &state,
        &auth_admin,
        second.order.id,
        UpdateOrderStatusRequest {
            status: "paid".into(),
        },
    )
    .await?
    .data
    .expect("updated order");
    assert_eq!(paid.order_status, "paid");
    assert_eq!(paid.payment_status, "paid");

    // Multi-unit artwork is never settled by this path.
    let prints = fetch_artwork(&state, multi_unit.id).await?;
    assert_eq!(prints.status, "available");
    assert_eq!(prints.inventory, 3);

    let cancelled = admin_service::update_order_status(
        &state,
        &auth_admin,
        second.order.id,
        UpdateOrderStatusRequest {
            status: "cancelled".into(),
        },
    )
    .await?
    .data
    .expect("updated order");
    assert_eq!(cancelled.order_status, "cancelled");
    assert_eq!(
        cancelled.payment_status, "pending",
        "payment status derives from the target status alone"
    );

    for illegal in ["paid", "shipped", "cancelled"] {
        let err = admin_service::update_order_status(
            &state,
            &auth_admin,
            second.order.id,
            UpdateOrderStatusRequest {
                status: illegal.into(),
            },
        )
        .await
        .err()
        .expect("cancelled is terminal");
        assert!(matches!(err, AppError::BadRequest(_)));
    }

    // Third order: deleting the artwork afterwards leaves a weak reference
    // that settlement skips and the detail view renders without metadata.
    let mut cart = Cart::new();
    cart.add(entry_for(&multi_unit));
    let third = order_service::checkout(&state, checkout_form(&cart))
        .await?
        .data
        .expect("order data");

    catalog_service::delete_artwork(&state, &auth_admin, multi_unit.id).await?;

    let paid = admin_service::update_order_status(
        &state,
        &auth_admin,
        third.order.id,
        UpdateOrderStatusRequest {
            status: "paid".into(),
        },
    )
    .await?
    .data
    .expect("updated order");
    assert_eq!(paid.payment_status, "paid");

    let detail = admin_service::get_order_admin(&state, &auth_admin, third.order.id)
        .await?
        .data
        .expect("order detail");
    assert_eq!(detail.items.len(), 1);
    assert!(detail.items[0].artwork.is_none());
    assert_eq!(detail.items[0].item.price, 12_000);

    // Admin listing: filters by status and free text.
    let all = admin_service::list_all_orders(&state, &auth_admin, order_query(None, None)).await?;
    assert_eq!(all.meta.as_ref().and_then(|m| m.total), Some(3));

    let cancelled_only = admin_service::list_all_orders(
        &state,
        &auth_admin,
        order_query(Some("cancelled".into()), None),
    )
    .await?
    .data
    .expect("orders");
    assert_eq!(cancelled_only.items.len(), 1);
    assert_eq!(cancelled_only.items[0].id, second.order.id);

    let by_id = admin_service::list_all_orders(
        &state,
        &auth_admin,
        order_query(None, Some(placed.order.id.to_string())),
    )
    .await?
    .data
    .expect("orders");
    assert_eq!(by_id.items.len(), 1);
    assert_eq!(by_id.items[0].id, placed.order.id);

    let by_name = admin_service::list_all_orders(
        &state,
        &auth_admin,
        order_query(None, Some("aisha".into())),
    )
    .await?
    .data
    .expect("orders");
    assert_eq!(by_name.items.len(), 3);

    // A second artwork slugifying to an existing slug is rejected.
    let err = catalog_service::create_artwork(
        &state,
        &auth_admin,
        SaveArtworkRequest {
            title: "Lone   Tree!".into(),
            description: None,
            price: 10_000,
            dimensions: None,
            medium: None,
            video_url: None,
            images: vec!["/storage/artworks/dup.jpg".into()],
            inventory: 1,
            status: "available".into(),
        },
    )
    .await
    .err()
    .expect("duplicate slug rejected");
    assert!(matches!(err, AppError::BadRequest(_)));

    // Admin-side actions left an audit trail.
    let checkouts: (i64,) = sqlx::query_as("SELECT count(*) FROM audit_logs WHERE action = $1")
        .bind("checkout")
        .fetch_one(&state.pool)
        .await?;
    assert_eq!(checkouts.0, 3);
    let updates: (i64,) = sqlx::query_as("SELECT count(*) FROM audit_logs WHERE action = $1")
        .bind("order_status_update")
        .fetch_one(&state.pool)
        .await?;
    assert!(updates.0 >= 5);

    Ok(())
}

async fn setup_state(database_url: &str) -> anyhow::Result<(AppState, Arc<MemoryBlobStore>)> {
    let pool = create_pool(database_url).await?;
    let orm = create_orm_conn(database_url).await?;
    run_migrations(&orm).await?;

    // Clean tables between runs
    let backend = orm.get_database_backend();
    orm.execute(Statement::from_string(
        backend,
        "TRUNCATE TABLE order_items, orders, artworks, audit_logs, users RESTART IDENTITY CASCADE",
    ))
    .await?;

    let blobs = Arc::new(MemoryBlobStore::new());
    let state = AppState {
        pool,
        orm,
        blobs: blobs.clone(),
    };
    Ok((state, blobs))
}

async fn create_admin(state: &AppState, email: &str) -> anyhow::Result<Uuid> {
    let user = UserActive {
        id: Set(Uuid::new_v4()),
        email: Set(email.to_string()),
        name: Set(Some("Gallery Admin".into())),
        password_hash: Set("dummy".into()),
        role: Set("admin".into()),
        created_at: NotSet,
    }
    .insert(&state.orm)
    .await?;

    Ok(user.id)
}

async fn create_artwork(
    state: &AppState,
    title: &str,
    price: i64,
    inventory: i32,
) -> anyhow::Result<ArtworkModel> {
    let slug = slugify(title);
    let artwork = ArtworkActive {
        id: Set(Uuid::new_v4()),
        slug: Set(slug.clone()),
        title: Set(title.to_string()),
        description: Set(Some("A piece for testing".into())),
        price: Set(price),
        dimensions: Set(Some("24x36 in".into())),
        medium: Set(Some("Oil on canvas".into())),
        video_url: Set(None),
        images: Set(vec![format!("/storage/artworks/{slug}.jpg")]),
        inventory: Set(inventory),
        status: Set("available".into()),
        created_at: NotSet,
    }
    .insert(&state.orm)
    .await?;

    Ok(artwork)
}

async fn fetch_artwork(state: &AppState, id: Uuid) -> anyhow::Result<Artwork> {
    let artwork = sqlx::query_as::<_, Artwork>("SELECT * FROM artworks WHERE id = $1")
        .bind(id)
        .fetch_one(&state.pool)
        .await?;
    Ok(artwork)
}

fn entry_for(artwork: &ArtworkModel) -> CartEntry {
    CartEntry {
        id: artwork.id,
        title: artwork.title.clone(),
        price: artwork.price,
        image: artwork.images.first().cloned(),
        slug: artwork.slug.clone(),
    }
}

fn checkout_form(cart: &Cart) -> CheckoutForm {
    CheckoutForm {
        name: Some("Aisha Khan".into()),
        email: Some("aisha@example.com".into()),
        phone: Some("+92 300 1234567".into()),
        address: Some("14-B Canal Park".into()),
        city: Some("Lahore".into()),
        payment_method: Some("easypaisa".into()),
        cart: Some(serde_json::to_string(cart).expect("serialize cart")),
        proof: Some(UploadedFile {
            file_name: Some("receipt.png".into()),
            content_type: Some("image/png".into()),
            bytes: vec![0x89, b'P', b'N', b'G'],
        }),
    }
}

fn order_query(status: Option<String>, q: Option<String>) -> OrderListQuery {
    OrderListQuery {
        pagination: Pagination {
            page: Some(1),
            per_page: Some(20),
        },
        status,
        q,
        sort_order: None,
    }
}
