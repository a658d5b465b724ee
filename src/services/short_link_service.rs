use sea_orm::{ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, Set};
use uuid::Uuid;

use crate::{
    entity::{
        recipe_short_urls::{self, ActiveModel, Entity as RecipeShortUrls, Model as ShortUrlModel},
        Recipes,
    },
    error::{AppError, AppResult},
    models::ShortLink,
    response::ApiResponse,
    short_link::{self, MAX_HASH_ATTEMPTS},
    state::AppState,
};

/// Attaches a fresh short hash to `recipe_id`, redrawing when a hash is already taken.
pub async fn create_for_recipe<C>(conn: &C, recipe_id: Uuid) -> AppResult<ShortUrlModel>
where
    C: ConnectionTrait,
{
    create_for_recipe_with(conn, recipe_id, short_link::generate_hash).await
}

/// Same as [`create_for_recipe`] with the hash source supplied by the caller.
pub async fn create_for_recipe_with<C, G>(
    conn: &C,
    recipe_id: Uuid,
    mut next_hash: G,
) -> AppResult<ShortUrlModel>
where
    C: ConnectionTrait,
    G: FnMut() -> String,
{
    for attempt in 1..=MAX_HASH_ATTEMPTS {
        let hash = next_hash();
        let taken = RecipeShortUrls::find()
            .filter(recipe_short_urls::Column::Hash.eq(hash.as_str()))
            .one(conn)
            .await?
            .is_some();
        if taken {
            tracing::warn!(attempt, "short link hash collision, drawing again");
            continue;
        }

        let short_url = ActiveModel {
            id: Set(Uuid::new_v4()),
            recipe_id: Set(recipe_id),
            hash: Set(hash),
        }
        .insert(conn)
        .await?;
        return Ok(short_url);
    }

    Err(AppError::Internal(anyhow::anyhow!(
        "could not allocate a unique short link after {MAX_HASH_ATTEMPTS} attempts"
    )))
}

/// Recipe id behind `hash`.
pub async fn resolve(state: &AppState, hash: &str) -> AppResult<Uuid> {
    if !short_link::is_well_formed(hash) {
        return Err(AppError::NotFound);
    }
    let short_url = RecipeShortUrls::find()
        .filter(recipe_short_urls::Column::Hash.eq(hash))
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)?;
    Ok(short_url.recipe_id)
}

pub async fn get_link(state: &AppState, recipe_id: Uuid) -> AppResult<ApiResponse<ShortLink>> {
    if Recipes::find_by_id(recipe_id).one(&state.orm).await?.is_none() {
        return Err(AppError::NotFound);
    }

    let existing = RecipeShortUrls::find()
        .filter(recipe_short_urls::Column::RecipeId.eq(recipe_id))
        .one(&state.orm)
        .await?;
    let short_url = match existing {
        Some(short_url) => short_url,
        None => create_for_recipe(&state.orm, recipe_id).await?,
    };

    let link = ShortLink {
        short_link: short_link::short_url(&state.config.public_url, &short_url.hash),
    };
    Ok(ApiResponse::success("Short link", link, None))
}
