use sqlx::FromRow;
use uuid::Uuid;

use crate::{
    db::DbPool,
    error::{AppError, AppResult},
    media,
    middleware::auth::AuthUser,
    models::ShortRecipe,
    response::{ApiResponse, Meta},
    shopping_list::{CartIngredientRow, ShoppingList},
    state::AppState,
};

#[derive(FromRow)]
pub(crate) struct ShortRecipeRow {
    id: Uuid,
    name: String,
    image: String,
    cooking_time: i32,
}

impl ShortRecipeRow {
    pub(crate) fn into_short_recipe(self, public_url: &str) -> ShortRecipe {
        ShortRecipe {
            id: self.id,
            name: self.name,
            image: media::media_url(public_url, &self.image),
            cooking_time: self.cooking_time,
        }
    }
}

pub(crate) async fn fetch_short_recipe(pool: &DbPool, recipe_id: Uuid) -> AppResult<ShortRecipeRow> {
    sqlx::query_as::<_, ShortRecipeRow>(
        "SELECT id, name, image, cooking_time FROM recipes WHERE id = $1",
    )
    .bind(recipe_id)
    .fetch_optional(pool)
    .await?
    .ok_or(AppError::NotFound)
}

pub async fn add_to_cart(
    state: &AppState,
    user: &AuthUser,
    recipe_id: Uuid,
) -> AppResult<ApiResponse<ShortRecipe>> {
    let recipe = fetch_short_recipe(&state.pool, recipe_id).await?;

    let exist: Option<(Uuid,)> =
        sqlx::query_as("SELECT id FROM shopping_cart_items WHERE user_id = $1 AND recipe_id = $2")
            .bind(user.user_id)
            .bind(recipe_id)
            .fetch_optional(&state.pool)
            .await?;
    if exist.is_some() {
        return Err(AppError::BadRequest(
            "Recipe is already in the shopping cart".to_string(),
        ));
    }

    sqlx::query("INSERT INTO shopping_cart_items (id, user_id, recipe_id) VALUES ($1, $2, $3)")
        .bind(Uuid::new_v4())
        .bind(user.user_id)
        .bind(recipe_id)
        .execute(&state.pool)
        .await?;

    tracing::info!(user_id = %user.user_id, recipe_id = %recipe_id, "cart item added");
    Ok(ApiResponse::success(
        "Added to shopping cart",
        recipe.into_short_recipe(&state.config.public_url),
        Some(Meta::empty()),
    ))
}

pub async fn remove_from_cart(state: &AppState, user: &AuthUser, recipe_id: Uuid) -> AppResult<()> {
    fetch_short_recipe(&state.pool, recipe_id).await?;

    let result = sqlx::query("DELETE FROM shopping_cart_items WHERE recipe_id = $1 AND user_id = $2")
        .bind(recipe_id)
        .bind(user.user_id)
        .execute(&state.pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::BadRequest(
            "Recipe is not in the shopping cart".to_string(),
        ));
    }

    tracing::info!(user_id = %user.user_id, recipe_id = %recipe_id, "cart item removed");
    Ok(())
}

/// Text report of every ingredient needed for the recipes in the user's cart.
pub async fn download_shopping_cart(state: &AppState, user: &AuthUser) -> AppResult<String> {
    let rows = sqlx::query_as::<_, CartIngredientRow>(
        r#"
        SELECT i.name, i.measurement_unit, ri.amount
        FROM shopping_cart_items sc
        JOIN recipe_ingredients ri ON ri.recipe_id = sc.recipe_id
        JOIN ingredients i ON i.id = ri.ingredient_id
        WHERE sc.user_id = $1
        ORDER BY sc.created_at, ri.id
        "#,
    )
    .bind(user.user_id)
    .fetch_all(&state.pool)
    .await?;

    let list: ShoppingList = rows.into_iter().collect();
    tracing::debug!(user_id = %user.user_id, lines = list.len(), "shopping list rendered");
    Ok(list.render())
}
