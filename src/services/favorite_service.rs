use uuid::Uuid;

use crate::{
    error::{AppError, AppResult},
    middleware::auth::AuthUser,
    models::ShortRecipe,
    response::{ApiResponse, Meta},
    services::cart_service::fetch_short_recipe,
    state::AppState,
};

pub async fn add_favorite(
    state: &AppState,
    user: &AuthUser,
    recipe_id: Uuid,
) -> AppResult<ApiResponse<ShortRecipe>> {
    let recipe = fetch_short_recipe(&state.pool, recipe_id).await?;

    let existing: Option<(Uuid,)> =
        sqlx::query_as("SELECT id FROM favorites WHERE user_id = $1 AND recipe_id = $2")
            .bind(user.user_id)
            .bind(recipe_id)
            .fetch_optional(&state.pool)
            .await?;
    if existing.is_some() {
        return Err(AppError::BadRequest(
            "This recipe is already in your favorites.".into(),
        ));
    }

    sqlx::query(
        r#"
        INSERT INTO favorites (id, user_id, recipe_id)
        VALUES ($1, $2, $3)
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(user.user_id)
    .bind(recipe_id)
    .execute(&state.pool)
    .await?;

    tracing::info!(user_id = %user.user_id, recipe_id = %recipe_id, "favorite added");
    Ok(ApiResponse::success(
        "Added to favorites",
        recipe.into_short_recipe(&state.config.public_url),
        Some(Meta::empty()),
    ))
}

pub async fn remove_favorite(state: &AppState, user: &AuthUser, recipe_id: Uuid) -> AppResult<()> {
    fetch_short_recipe(&state.pool, recipe_id).await?;

    let result = sqlx::query("DELETE FROM favorites WHERE user_id = $1 AND recipe_id = $2")
        .bind(user.user_id)
        .bind(recipe_id)
        .execute(&state.pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::BadRequest("Recipe is not in your favorites.".into()));
    }

    tracing::info!(user_id = %user.user_id, recipe_id = %recipe_id, "favorite removed");
    Ok(())
}
