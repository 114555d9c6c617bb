use argon2::{
    Argon2, PasswordHasher,
    password_hash::{SaltString, rand_core::OsRng},
};
use atelier_api::{config::AppConfig, db::create_pool, slug::slugify};
use uuid::Uuid;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = AppConfig::from_env()?;

    let pool = create_pool(&config.database_url).await?;
    // Ensure migrations are applied.
    sqlx::migrate!("./migrations").run(&pool).await?;

    let email = std::env::var("ADMIN_EMAIL").unwrap_or_else(|_| "admin@example.com".to_string());
    let password = std::env::var("ADMIN_PASSWORD").unwrap_or_else(|_| "admin123".to_string());
    let admin_id = ensure_admin(&pool, &email, &password).await?;
    seed_artworks(&pool).await?;

    println!("Seed completed. Admin ID: {admin_id}");
    Ok(())
}

async fn ensure_admin(pool: &sqlx::PgPool, email: &str, password: &str) -> anyhow::Result<Uuid> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();
    let password_hash = argon2
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| anyhow::anyhow!(e.to_string()))?
        .to_string();

    let row: Option<(Uuid,)> = sqlx::query_as(
        r#"
        INSERT INTO users (id, email, name, password_hash, role)
        VALUES ($1, $2, $3, $4, 'admin')
        ON CONFLICT (email) DO NOTHING
        RETURNING id
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(email)
    .bind("Gallery Admin")
    .bind(password_hash)
    .fetch_optional(pool)
    .await?;

    // If the admin already exists, fetch its id.
    let admin_id = match row {
        Some((id,)) => id,
        None => {
            let existing: (Uuid,) = sqlx::query_as("SELECT id FROM users WHERE email = $1")
                .bind(email)
                .fetch_one(pool)
                .await?;
            existing.0
        }
    };

    println!("Ensured admin {email}");
    Ok(admin_id)
}

async fn seed_artworks(pool: &sqlx::PgPool) -> anyhow::Result<()> {
    let artworks = vec![
        (
            "Sunset Over Lahore",
            "Warm light over the old city rooftops",
            45_000_i64,
            "24x36 in",
            "Oil on canvas",
            1_i32,
        ),
        (
            "Whispering Dunes",
            "Cholistan at dawn",
            38_000,
            "20x30 in",
            "Acrylic on canvas",
            1,
        ),
        (
            "Blue Print Series",
            "Limited cyanotype print run",
            12_000,
            "12x16 in",
            "Cyanotype print",
            5,
        ),
        (
            "Monsoon Study",
            "Rain over the Ravi",
            27_500,
            "18x24 in",
            "Watercolor",
            1,
        ),
    ];

    for (title, description, price, dimensions, medium, inventory) in artworks {
        let slug = slugify(title);
        sqlx::query(
            r#"
            INSERT INTO artworks
                (id, slug, title, description, price, dimensions, medium, images, inventory, status)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, 'available')
            ON CONFLICT (slug) DO NOTHING
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(&slug)
        .bind(title)
        .bind(description)
        .bind(price)
        .bind(dimensions)
        .bind(medium)
        .bind(vec![format!("/storage/artworks/{slug}.jpg")])
        .bind(inventory)
        .execute(pool)
        .await?;
    }

    println!("Seeded artworks");
    Ok(())
}
