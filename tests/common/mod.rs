#![allow(dead_code)]

use std::sync::Arc;

use foodgram_api::{
    config::AppConfig,
    db::{create_orm_conn, create_pool, run_migrations},
    entity::users::ActiveModel as UserActive,
    middleware::auth::AuthUser,
    state::AppState,
};
use sea_orm::ActiveValue::NotSet;
use sea_orm::{ActiveModelTrait, ConnectionTrait, Set, Statement};
use uuid::Uuid;

/// 1x1 transparent PNG.
pub const PIXEL_PNG: &str = "data:image/png;base64,iVBORw0KGgoAAAANSUhEUgAAAAEAAAABCAYAAAAfFcSJAAAADUlEQVR42mNkYPhfDwAChwGA60e6kgAAAABJRU5ErkJggg==";

pub fn database_url() -> Option<String> {
    match std::env::var("TEST_DATABASE_URL").or_else(|_| std::env::var("DATABASE_URL")) {
        Ok(url) => Some(url),
        Err(_) => {
            eprintln!("Skipping test: set TEST_DATABASE_URL or DATABASE_URL to run integration flow tests.");
            None
        }
    }
}

pub async fn setup_state(database_url: &str) -> anyhow::Result<AppState> {
    let orm = create_orm_conn(database_url).await?;
    run_migrations(&orm).await?;

    // Clean tables between runs
    let backend = orm.get_database_backend();
    orm.execute(Statement::from_string(
        backend,
        "TRUNCATE TABLE subscriptions, shopping_cart_items, favorites, recipe_short_urls, \
         recipe_ingredients, recipe_tags, recipes, ingredients, tags, users CASCADE",
    ))
    .await?;

    let pool = create_pool(database_url).await?;
    let config = AppConfig {
        database_url: database_url.to_string(),
        jwt_secret: "test-secret".into(),
        host: "127.0.0.1".into(),
        port: 3000,
        public_url: "http://testserver".into(),
        media_root: std::env::temp_dir().join("foodgram-test-media"),
    };

    Ok(AppState {
        pool,
        orm,
        config: Arc::new(config),
    })
}

pub async fn create_user(state: &AppState, username: &str) -> anyhow::Result<AuthUser> {
    let user = UserActive {
        id: Set(Uuid::new_v4()),
        email: Set(format!("{username}@example.com")),
        username: Set(username.to_string()),
        first_name: Set("Test".into()),
        last_name: Set("User".into()),
        password_hash: Set("dummy".into()),
        avatar: Set(None),
        created_at: NotSet,
    }
    .insert(&state.orm)
    .await?;

    Ok(AuthUser { user_id: user.id })
}

pub async fn create_tag(state: &AppState, slug: &str) -> anyhow::Result<Uuid> {
    let id = Uuid::new_v4();
    sqlx::query("INSERT INTO tags (id, name, slug) VALUES ($1, $2, $3)")
        .bind(id)
        .bind(slug.to_uppercase())
        .bind(slug)
        .execute(&state.pool)
        .await?;
    Ok(id)
}

pub async fn create_ingredient(state: &AppState, name: &str, unit: &str) -> anyhow::Result<Uuid> {
    let id = Uuid::new_v4();
    sqlx::query("INSERT INTO ingredients (id, name, measurement_unit) VALUES ($1, $2, $3)")
        .bind(id)
        .bind(name)
        .bind(unit)
        .execute(&state.pool)
        .await?;
    Ok(id)
}
