use std::collections::{HashMap, HashSet};

use sea_orm::sea_query::{Expr, Query};
use sea_orm::ActiveValue::NotSet;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, ConnectionTrait, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait,
};
use uuid::Uuid;

use crate::{
    dto::recipes::{RecipeList, RecipeWriteRequest},
    entity::{
        favorites, ingredients,
        recipe_ingredients::{self, Entity as RecipeIngredients},
        recipe_tags::{self, Entity as RecipeTags},
        recipes::{self, ActiveModel, Entity as Recipes, Model as RecipeModel},
        shopping_cart_items, tags, users, Favorites, Ingredients, ShoppingCartItems, Tags, Users,
    },
    error::{AppError, AppResult},
    media::{self, RECIPE_IMAGES_DIR},
    middleware::auth::{AuthUser, ensure_owner},
    models::{Recipe, RecipeIngredient, ShortRecipe, Tag},
    response::{ApiResponse, Meta},
    routes::params::RecipeFilter,
    services::{short_link_service, tag_service::tag_from_entity, user_service},
    state::AppState,
};

pub async fn list_recipes(
    state: &AppState,
    viewer: Option<&AuthUser>,
    filter: RecipeFilter,
) -> AppResult<ApiResponse<RecipeList>> {
    let (page, limit, offset) = filter.pagination.normalize();

    // Anonymous users have neither favorites nor a cart.
    if viewer.is_none() && (filter.is_favorited || filter.is_in_shopping_cart) {
        let meta = Meta::new(page, limit, 0);
        return Ok(ApiResponse::success("Recipes", RecipeList { items: Vec::new() }, Some(meta)));
    }

    let mut condition = Condition::all();

    if !filter.tags.is_empty() {
        condition = condition.add(
            recipes::Column::Id.in_subquery(
                Query::select()
                    .column((RecipeTags, recipe_tags::Column::RecipeId))
                    .from(RecipeTags)
                    .inner_join(
                        Tags,
                        Expr::col((Tags, tags::Column::Id))
                            .equals((RecipeTags, recipe_tags::Column::TagId)),
                    )
                    .and_where(Expr::col((Tags, tags::Column::Slug)).is_in(filter.tags.clone()))
                    .to_owned(),
            ),
        );
    }

    if let Some(author) = filter.author {
        condition = condition.add(recipes::Column::AuthorId.eq(author));
    }

    if let Some(viewer) = viewer {
        if filter.is_favorited {
            condition = condition.add(
                recipes::Column::Id.in_subquery(
                    Query::select()
                        .column(favorites::Column::RecipeId)
                        .from(Favorites)
                        .and_where(Expr::col(favorites::Column::UserId).eq(viewer.user_id))
                        .to_owned(),
                ),
            );
        }
        if filter.is_in_shopping_cart {
            condition = condition.add(
                recipes::Column::Id.in_subquery(
                    Query::select()
                        .column(shopping_cart_items::Column::RecipeId)
                        .from(ShoppingCartItems)
                        .and_where(
                            Expr::col(shopping_cart_items::Column::UserId).eq(viewer.user_id),
                        )
                        .to_owned(),
                ),
            );
        }
    }

    let finder = Recipes::find()
        .filter(condition)
        .order_by_desc(recipes::Column::PubDate);
    let total = finder.clone().count(&state.orm).await? as i64;

    let models = finder
        .limit(limit as u64)
        .offset(offset as u64)
        .all(&state.orm)
        .await?;
    let items = recipe_views(state, viewer, models).await?;

    let meta = Meta::new(page, limit, total);
    Ok(ApiResponse::success("Recipes", RecipeList { items }, Some(meta)))
}

pub async fn get_recipe(
    state: &AppState,
    viewer: Option<&AuthUser>,
    id: Uuid,
) -> AppResult<ApiResponse<Recipe>> {
    let model = find_recipe(state, id).await?;
    let recipe = recipe_view(state, viewer, model).await?;
    Ok(ApiResponse::success("Recipe", recipe, None))
}

pub async fn create_recipe(
    state: &AppState,
    user: &AuthUser,
    payload: RecipeWriteRequest,
) -> AppResult<ApiResponse<Recipe>> {
    payload.validate(true)?;
    ensure_references_exist(state, &payload).await?;

    let image_data = payload.image.clone().unwrap_or_default();
    let image = media::save_image(&state.config.media_root, RECIPE_IMAGES_DIR, &image_data).await?;

    let recipe = match insert_recipe(state, user, &payload, &image).await {
        Ok(recipe) => recipe,
        Err(err) => {
            media::remove_image(&state.config.media_root, &image).await;
            return Err(err);
        }
    };

    tracing::info!(recipe_id = %recipe.id, author_id = %user.user_id, "recipe created");
    let view = recipe_view(state, Some(user), recipe).await?;
    Ok(ApiResponse::success("Recipe created", view, Some(Meta::empty())))
}

pub async fn update_recipe(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
    payload: RecipeWriteRequest,
) -> AppResult<ApiResponse<Recipe>> {
    let existing = find_recipe(state, id).await?;
    ensure_owner(user, existing.author_id)?;
    payload.validate(false)?;
    ensure_references_exist(state, &payload).await?;

    let new_image = match payload.image.as_deref().filter(|data| !data.is_empty()) {
        Some(data) => {
            Some(media::save_image(&state.config.media_root, RECIPE_IMAGES_DIR, data).await?)
        }
        None => None,
    };
    let old_image = existing.image.clone();

    let txn = state.orm.begin().await?;
    let mut active: ActiveModel = existing.into();
    active.name = Set(payload.name.clone());
    active.text = Set(payload.text.clone());
    active.cooking_time = Set(payload.cooking_time);
    if let Some(image) = &new_image {
        active.image = Set(image.clone());
    }

    let updated = async {
        let recipe = active.update(&txn).await?;
        RecipeTags::delete_many()
            .filter(recipe_tags::Column::RecipeId.eq(id))
            .exec(&txn)
            .await?;
        RecipeIngredients::delete_many()
            .filter(recipe_ingredients::Column::RecipeId.eq(id))
            .exec(&txn)
            .await?;
        insert_links(&txn, id, &payload).await?;
        Ok::<_, AppError>(recipe)
    }
    .await;

    let recipe = match updated {
        Ok(recipe) => {
            txn.commit().await?;
            recipe
        }
        Err(err) => {
            txn.rollback().await?;
            if let Some(image) = &new_image {
                media::remove_image(&state.config.media_root, image).await;
            }
            return Err(err);
        }
    };

    if new_image.is_some() {
        media::remove_image(&state.config.media_root, &old_image).await;
    }

    tracing::info!(recipe_id = %id, "recipe updated");
    let view = recipe_view(state, Some(user), recipe).await?;
    Ok(ApiResponse::success("Updated", view, Some(Meta::empty())))
}

pub async fn delete_recipe(state: &AppState, user: &AuthUser, id: Uuid) -> AppResult<()> {
    let existing = find_recipe(state, id).await?;
    ensure_owner(user, existing.author_id)?;

    let result = Recipes::delete_by_id(id).exec(&state.orm).await?;
    if result.rows_affected == 0 {
        return Err(AppError::NotFound);
    }
    media::remove_image(&state.config.media_root, &existing.image).await;

    tracing::info!(recipe_id = %id, "recipe deleted");
    Ok(())
}

pub(crate) async fn find_recipe(state: &AppState, id: Uuid) -> AppResult<RecipeModel> {
    Recipes::find_by_id(id)
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)
}

pub(crate) fn short_recipe(state: &AppState, model: RecipeModel) -> ShortRecipe {
    ShortRecipe {
        id: model.id,
        name: model.name,
        image: media::media_url(&state.config.public_url, &model.image),
        cooking_time: model.cooking_time,
    }
}

async fn recipe_view(
    state: &AppState,
    viewer: Option<&AuthUser>,
    model: RecipeModel,
) -> AppResult<Recipe> {
    recipe_views(state, viewer, vec![model])
        .await?
        .pop()
        .ok_or(AppError::NotFound)
}

/// Builds full read views for `models`, batching every lookup per relation.
pub(crate) async fn recipe_views(
    state: &AppState,
    viewer: Option<&AuthUser>,
    models: Vec<RecipeModel>,
) -> AppResult<Vec<Recipe>> {
    if models.is_empty() {
        return Ok(Vec::new());
    }
    let ids: Vec<Uuid> = models.iter().map(|r| r.id).collect();

    let mut tags_by_recipe: HashMap<Uuid, Vec<Tag>> = HashMap::new();
    let tag_rows = RecipeTags::find()
        .filter(recipe_tags::Column::RecipeId.is_in(ids.clone()))
        .find_also_related(Tags)
        .order_by_asc(tags::Column::Name)
        .all(&state.orm)
        .await?;
    for (link, tag) in tag_rows {
        if let Some(tag) = tag {
            tags_by_recipe
                .entry(link.recipe_id)
                .or_default()
                .push(tag_from_entity(tag));
        }
    }

    let mut ingredients_by_recipe: HashMap<Uuid, Vec<RecipeIngredient>> = HashMap::new();
    let ingredient_rows = RecipeIngredients::find()
        .filter(recipe_ingredients::Column::RecipeId.is_in(ids.clone()))
        .find_also_related(Ingredients)
        .order_by_asc(ingredients::Column::Name)
        .all(&state.orm)
        .await?;
    for (link, ingredient) in ingredient_rows {
        if let Some(ingredient) = ingredient {
            ingredients_by_recipe
                .entry(link.recipe_id)
                .or_default()
                .push(RecipeIngredient {
                    id: ingredient.id,
                    name: ingredient.name,
                    measurement_unit: ingredient.measurement_unit,
                    amount: link.amount,
                });
        }
    }

    let author_ids: Vec<Uuid> = models
        .iter()
        .map(|r| r.author_id)
        .collect::<HashSet<_>>()
        .into_iter()
        .collect();
    let authors: HashMap<Uuid, users::Model> = Users::find()
        .filter(users::Column::Id.is_in(author_ids.clone()))
        .all(&state.orm)
        .await?
        .into_iter()
        .map(|u| (u.id, u))
        .collect();
    let followed = user_service::followed_creators(state, viewer, author_ids).await?;

    let (favorited, in_cart) = match viewer {
        Some(viewer) => {
            let favorited: HashSet<Uuid> = Favorites::find()
                .filter(favorites::Column::UserId.eq(viewer.user_id))
                .filter(favorites::Column::RecipeId.is_in(ids.clone()))
                .all(&state.orm)
                .await?
                .into_iter()
                .map(|f| f.recipe_id)
                .collect();
            let in_cart: HashSet<Uuid> = ShoppingCartItems::find()
                .filter(shopping_cart_items::Column::UserId.eq(viewer.user_id))
                .filter(shopping_cart_items::Column::RecipeId.is_in(ids))
                .all(&state.orm)
                .await?
                .into_iter()
                .map(|c| c.recipe_id)
                .collect();
            (favorited, in_cart)
        }
        None => (HashSet::new(), HashSet::new()),
    };

    models
        .into_iter()
        .map(|model| {
            let author = authors.get(&model.author_id).cloned().ok_or_else(|| {
                AppError::Internal(anyhow::anyhow!("author of recipe {} is missing", model.id))
            })?;
            let is_subscribed = followed.contains(&author.id);
            Ok(Recipe {
                id: model.id,
                tags: tags_by_recipe.remove(&model.id).unwrap_or_default(),
                author: user_service::profile_from_entity(state, author, is_subscribed),
                ingredients: ingredients_by_recipe.remove(&model.id).unwrap_or_default(),
                is_favorited: favorited.contains(&model.id),
                is_in_shopping_cart: in_cart.contains(&model.id),
                name: model.name,
                image: media::media_url(&state.config.public_url, &model.image),
                text: model.text,
                cooking_time: model.cooking_time,
            })
        })
        .collect()
}

async fn ensure_references_exist(state: &AppState, payload: &RecipeWriteRequest) -> AppResult<()> {
    let known_tags = Tags::find()
        .filter(tags::Column::Id.is_in(payload.tags.clone()))
        .count(&state.orm)
        .await?;
    if known_tags as usize != payload.tags.len() {
        return Err(AppError::BadRequest("tags: Unknown tag id".into()));
    }

    let ingredient_ids: Vec<Uuid> = payload.ingredients.iter().map(|i| i.id).collect();
    let known: HashSet<Uuid> = Ingredients::find()
        .filter(ingredients::Column::Id.is_in(ingredient_ids.clone()))
        .all(&state.orm)
        .await?
        .into_iter()
        .map(|i| i.id)
        .collect();
    if let Some(missing) = ingredient_ids.iter().find(|id| !known.contains(id)) {
        return Err(AppError::BadRequest(format!(
            "ingredients: Ingredient with id {missing} does not exist."
        )));
    }
    Ok(())
}

async fn insert_recipe(
    state: &AppState,
    user: &AuthUser,
    payload: &RecipeWriteRequest,
    image: &str,
) -> AppResult<RecipeModel> {
    let txn = state.orm.begin().await?;
    let id = Uuid::new_v4();

    let inserted = async {
        let recipe = ActiveModel {
            id: Set(id),
            author_id: Set(user.user_id),
            name: Set(payload.name.clone()),
            image: Set(image.to_string()),
            text: Set(payload.text.clone()),
            cooking_time: Set(payload.cooking_time),
            pub_date: NotSet,
        }
        .insert(&txn)
        .await?;
        insert_links(&txn, id, payload).await?;
        short_link_service::create_for_recipe(&txn, id).await?;
        Ok::<_, AppError>(recipe)
    }
    .await;

    match inserted {
        Ok(recipe) => {
            txn.commit().await?;
            Ok(recipe)
        }
        Err(err) => {
            txn.rollback().await?;
            Err(err)
        }
    }
}

async fn insert_links<C>(conn: &C, recipe_id: Uuid, payload: &RecipeWriteRequest) -> AppResult<()>
where
    C: ConnectionTrait,
{
    let tag_links = payload.tags.iter().map(|tag_id| recipe_tags::ActiveModel {
        id: Set(Uuid::new_v4()),
        recipe_id: Set(recipe_id),
        tag_id: Set(*tag_id),
    });
    RecipeTags::insert_many(tag_links).exec(conn).await?;

    let ingredient_links = payload
        .ingredients
        .iter()
        .map(|ingredient| recipe_ingredients::ActiveModel {
            id: Set(Uuid::new_v4()),
            recipe_id: Set(recipe_id),
            ingredient_id: Set(ingredient.id),
            amount: Set(ingredient.amount),
        });
    RecipeIngredients::insert_many(ingredient_links)
        .exec(conn)
        .await?;
    Ok(())
}
