use argon2::{
    Argon2, PasswordHasher,
    password_hash::{SaltString, rand_core::OsRng},
};
use jmd_backoffice_api::{
    config::AppConfig,
    db::{create_orm_conn, raw_pool, run_migrations},
    models::{FabricType, Role},
};
use rust_decimal::Decimal;
use sqlx::PgPool;
use uuid::Uuid;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = AppConfig::from_env()?;

    let orm = create_orm_conn(&config.database_url).await?;
    // Ensure migrations are applied.
    run_migrations(&orm).await?;
    let pool = raw_pool(&orm);

    let branch_id = ensure_branch(pool, "Main Showroom", "MAIN").await?;
    let director_id = ensure_user(pool, "director@example.com", "director123", Role::Director, None).await?;
    let staff_id =
        ensure_user(pool, "staff@example.com", "staff1234", Role::Staff, Some(branch_id)).await?;
    seed_fabrics(pool).await?;
    seed_items(pool).await?;

    println!("Seed completed. Branch: {branch_id}, director: {director_id}, staff: {staff_id}");
    Ok(())
}

async fn ensure_branch(pool: &PgPool, name: &str, code: &str) -> anyhow::Result<Uuid> {
    let (id,): (Uuid,) = sqlx::query_as(
        r#"
        INSERT INTO branches (id, name, code)
        VALUES ($1, $2, $3)
        ON CONFLICT (code) DO UPDATE SET name = EXCLUDED.name
        RETURNING id
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(name)
    .bind(code)
    .fetch_one(pool)
    .await?;

    println!("Ensured branch {code}");
    Ok(id)
}

async fn ensure_user(
    pool: &PgPool,
    email: &str,
    password: &str,
    role: Role,
    branch_id: Option<Uuid>,
) -> anyhow::Result<Uuid> {
    let salt = SaltString::generate(&mut OsRng);
    let password_hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| anyhow::anyhow!(e.to_string()))?
        .to_string();

    let (id,): (Uuid,) = sqlx::query_as(
        r#"
        INSERT INTO users (id, email, name, password_hash, role, branch_id)
        VALUES ($1, $2, $3, $4, $5, $6)
        ON CONFLICT (email) DO UPDATE SET role = EXCLUDED.role, branch_id = EXCLUDED.branch_id
        RETURNING id
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(email)
    .bind(email.split('@').next().unwrap_or(email))
    .bind(password_hash)
    .bind(role.as_str())
    .bind(branch_id)
    .fetch_one(pool)
    .await?;

    println!("Ensured user {email} (role={role})");
    Ok(id)
}

async fn seed_fabrics(pool: &PgPool) -> anyhow::Result<()> {
    let fabrics = [
        ("Egyptian Cotton", FabricType::Cotton, "white", Decimal::new(45000, 2)),
        ("Banarasi Silk", FabricType::Silk, "maroon", Decimal::new(120000, 2)),
        ("Irish Linen", FabricType::Linen, "beige", Decimal::new(85000, 2)),
        ("Merino Suiting", FabricType::Wool, "charcoal", Decimal::new(150000, 2)),
    ];

    for (name, kind, color, rate) in fabrics {
        sqlx::query(
            r#"
            INSERT INTO fabrics (id, name, fabric_type, color, price_per_meter, in_stock_meters)
            VALUES ($1, $2, $3, $4, $5, $6)
            ON CONFLICT (name) DO NOTHING
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(name)
        .bind(kind.as_str())
        .bind(color)
        .bind(rate)
        .bind(Decimal::new(100, 0))
        .execute(pool)
        .await?;
    }

    println!("Seeded fabrics");
    Ok(())
}

async fn seed_items(pool: &PgPool) -> anyhow::Result<()> {
    let items = [
        ("Shirt", "tops", Decimal::new(800, 0), ["Regular", "Slim fit"]),
        ("Trouser", "bottoms", Decimal::new(700, 0), ["Flat front", "Pleated"]),
        ("Kurta", "ethnic", Decimal::new(1200, 0), ["Straight", "Angrakha"]),
        ("Sherwani", "ethnic", Decimal::new(6500, 0), ["Classic", "Indo-western"]),
    ];

    for (name, category, charge, styles) in items {
        let styles = serde_json::Value::Array(
            styles
                .iter()
                .map(|style| serde_json::json!({ "style_id": null, "style_name": style, "description": null }))
                .collect(),
        );
        sqlx::query(
            r#"
            INSERT INTO item_masters (id, name, stitching_charge, category, styles)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (name) DO NOTHING
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(name)
        .bind(charge)
        .bind(category)
        .bind(styles)
        .execute(pool)
        .await?;
    }

    println!("Seeded item masters");
    Ok(())
}
