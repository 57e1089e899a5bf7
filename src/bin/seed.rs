use argon2::{
    Argon2, PasswordHasher,
    password_hash::{SaltString, rand_core::OsRng},
};
use axum_barbershop_api::{config::AppConfig, db::create_pool};
use uuid::Uuid;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = AppConfig::from_env()?;

    let pool = create_pool(&config.database_url).await?;
    // Ensure migrations are applied.
    sqlx::migrate!("./migrations").run(&pool).await?;

    let admin_id = ensure_user(&pool, "admin@example.com", "admin123", "Shop Admin", "admin").await?;
    let user_id = ensure_user(&pool, "user@example.com", "user123", "Walk-in Customer", "customer").await?;
    seed_barbers(&pool).await?;
    seed_services(&pool).await?;
    seed_items(&pool).await?;

    println!("Seed completed. Admin ID: {admin_id}, Customer ID: {user_id}");
    Ok(())
}

async fn ensure_user(
    pool: &sqlx::PgPool,
    email: &str,
    password: &str,
    name: &str,
    role: &str,
) -> anyhow::Result<Uuid> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();
    let password_hash = argon2
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| anyhow::anyhow!(e.to_string()))?
        .to_string();

    let row: Option<(Uuid,)> = sqlx::query_as(
        r#"
        INSERT INTO users (id, email, password_hash, name, role)
        VALUES ($1, $2, $3, $4, $5)
        ON CONFLICT (email) DO UPDATE SET role = EXCLUDED.role
        RETURNING id
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(email)
    .bind(password_hash)
    .bind(name)
    .bind(role)
    .fetch_optional(pool)
    .await?;

    // If user already exists, fetch id
    let user_id = match row {
        Some((id,)) => id,
        None => {
            let existing: (Uuid,) = sqlx::query_as("SELECT id FROM users WHERE email = $1")
                .bind(email)
                .fetch_one(pool)
                .await?;
            existing.0
        }
    };

    println!("Ensured user {email} (role={role})");
    Ok(user_id)
}

async fn seed_barbers(pool: &sqlx::PgPool) -> anyhow::Result<()> {
    let barbers = vec![("Marcos", 4000), ("Rafael", 3500), ("Diego", 3000)];

    for (name, commission_bps) in barbers {
        sqlx::query(
            r#"
            INSERT INTO barbers (id, name, commission_rate_bps)
            SELECT $1, $2, $3
            WHERE NOT EXISTS (SELECT 1 FROM barbers WHERE name = $2)
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(name)
        .bind(commission_bps)
        .execute(pool)
        .await?;
    }

    println!("Seeded barbers");
    Ok(())
}

async fn seed_services(pool: &sqlx::PgPool) -> anyhow::Result<()> {
    let services = vec![
        ("Haircut", 4500, 30),
        ("Beard Trim", 2500, 20),
        ("Hair + Beard Combo", 6500, 45),
        ("Kids Cut", 3500, 25),
    ];

    for (name, price, minutes) in services {
        sqlx::query(
            r#"
            INSERT INTO services (id, name, price_cents, average_minutes)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (name) DO NOTHING
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(name)
        .bind(price)
        .bind(minutes)
        .execute(pool)
        .await?;
    }

    println!("Seeded services");
    Ok(())
}

async fn seed_items(pool: &sqlx::PgPool) -> anyhow::Result<()> {
    let items = vec![
        ("Pomade", 3000, 40),
        ("Beard Oil", 2800, 25),
        ("Shampoo", 2200, 60),
    ];

    for (name, price, stock) in items {
        sqlx::query(
            r#"
            INSERT INTO items (id, name, price_cents, stock)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (name) DO NOTHING
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(name)
        .bind(price)
        .bind(stock)
        .execute(pool)
        .await?;
    }

    println!("Seeded items");
    Ok(())
}
