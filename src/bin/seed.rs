use foodgram_api::{
    config::AppConfig,
    db::create_pool,
    services::auth_service::hash_password,
};
use uuid::Uuid;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt().with_env_filter("info").init();
    let config = AppConfig::from_env()?;

    let pool = create_pool(&config.database_url).await?;

    seed_tags(&pool).await?;
    let user_id = ensure_user(&pool, "cook@example.com", "cook", "demo-password").await?;

    tracing::info!(%user_id, "seed completed");
    Ok(())
}

async fn ensure_user(
    pool: &sqlx::PgPool,
    email: &str,
    username: &str,
    password: &str,
) -> anyhow::Result<Uuid> {
    let password_hash = hash_password(password)?;

    let row: Option<(Uuid,)> = sqlx::query_as(
        r#"
        INSERT INTO users (id, email, username, first_name, last_name, password_hash)
        VALUES ($1, $2, $3, 'Demo', 'Cook', $4)
        ON CONFLICT (email) DO NOTHING
        RETURNING id
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(email)
    .bind(username)
    .bind(password_hash)
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

    tracing::info!(%email, "ensured user");
    Ok(user_id)
}

async fn seed_tags(pool: &sqlx::PgPool) -> anyhow::Result<()> {
    let tags = [
        ("Breakfast", "breakfast"),
        ("Lunch", "lunch"),
        ("Dinner", "dinner"),
    ];

    for (name, slug) in tags {
        sqlx::query(
            r#"
            INSERT INTO tags (id, name, slug)
            VALUES ($1, $2, $3)
            ON CONFLICT (slug) DO NOTHING
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(name)
        .bind(slug)
        .execute(pool)
        .await?;
    }

    tracing::info!(count = tags.len(), "seeded tags");
    Ok(())
}
