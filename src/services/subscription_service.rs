use std::collections::HashMap;

use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
    QuerySelect, Set,
};
use sea_orm::ActiveValue::NotSet;
use uuid::Uuid;

use crate::{
    dto::users::{CreatorList, SubscriptionQuery},
    entity::{
        recipes,
        subscriptions::{self, ActiveModel, Entity as Subscriptions},
        users::{self, Model as UserModel},
        Recipes, Users,
    },
    error::{AppError, AppResult},
    middleware::auth::AuthUser,
    models::Creator,
    response::{ApiResponse, Meta},
    services::{recipe_service, user_service},
    state::AppState,
};

pub async fn subscribe(
    state: &AppState,
    user: &AuthUser,
    creator_id: Uuid,
    query: SubscriptionQuery,
) -> AppResult<ApiResponse<Creator>> {
    let recipes_limit = query.recipes_limit()?;
    let creator = user_service::find_user(state, creator_id).await?;

    if creator.id == user.user_id {
        return Err(AppError::BadRequest("You cannot subscribe to yourself.".into()));
    }
    if find_subscription(state, user.user_id, creator_id).await?.is_some() {
        return Err(AppError::BadRequest(
            "You have already subscribed to this creator.".into(),
        ));
    }

    ActiveModel {
        id: Set(Uuid::new_v4()),
        subscriber_id: Set(user.user_id),
        creator_id: Set(creator_id),
        created_at: NotSet,
    }
    .insert(&state.orm)
    .await?;

    tracing::info!(subscriber_id = %user.user_id, creator_id = %creator_id, "subscribed");
    let view = creator_view(state, user, creator, recipes_limit).await?;
    Ok(ApiResponse::success("Subscribed", view, Some(Meta::empty())))
}

pub async fn unsubscribe(state: &AppState, user: &AuthUser, creator_id: Uuid) -> AppResult<()> {
    user_service::find_user(state, creator_id).await?;

    let result = Subscriptions::delete_many()
        .filter(subscriptions::Column::SubscriberId.eq(user.user_id))
        .filter(subscriptions::Column::CreatorId.eq(creator_id))
        .exec(&state.orm)
        .await?;
    if result.rows_affected == 0 {
        return Err(AppError::BadRequest(
            "You are not subscribed to this creator.".into(),
        ));
    }

    tracing::info!(subscriber_id = %user.user_id, creator_id = %creator_id, "unsubscribed");
    Ok(())
}

pub async fn list_subscriptions(
    state: &AppState,
    user: &AuthUser,
    query: SubscriptionQuery,
) -> AppResult<ApiResponse<CreatorList>> {
    let recipes_limit = query.recipes_limit()?;
    let (page, limit, offset) = query.pagination().normalize();

    let finder = Subscriptions::find()
        .filter(subscriptions::Column::SubscriberId.eq(user.user_id))
        .order_by_desc(subscriptions::Column::CreatedAt);
    let total = finder.clone().count(&state.orm).await? as i64;

    let creator_ids: Vec<Uuid> = finder
        .limit(limit as u64)
        .offset(offset as u64)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(|s| s.creator_id)
        .collect();

    let mut creators: HashMap<Uuid, UserModel> = Users::find()
        .filter(users::Column::Id.is_in(creator_ids.clone()))
        .all(&state.orm)
        .await?
        .into_iter()
        .map(|u| (u.id, u))
        .collect();

    let mut items = Vec::with_capacity(creator_ids.len());
    for id in creator_ids {
        if let Some(creator) = creators.remove(&id) {
            items.push(creator_view(state, user, creator, recipes_limit).await?);
        }
    }

    let meta = Meta::new(page, limit, total);
    Ok(ApiResponse::success("Subscriptions", CreatorList { items }, Some(meta)))
}

async fn find_subscription(
    state: &AppState,
    subscriber_id: Uuid,
    creator_id: Uuid,
) -> AppResult<Option<subscriptions::Model>> {
    let subscription = Subscriptions::find()
        .filter(subscriptions::Column::SubscriberId.eq(subscriber_id))
        .filter(subscriptions::Column::CreatorId.eq(creator_id))
        .one(&state.orm)
        .await?;
    Ok(subscription)
}

async fn creator_view(
    state: &AppState,
    viewer: &AuthUser,
    creator: UserModel,
    recipes_limit: Option<usize>,
) -> AppResult<Creator> {
    let finder = Recipes::find()
        .filter(recipes::Column::AuthorId.eq(creator.id))
        .order_by_desc(recipes::Column::PubDate);
    let recipes_count = finder.clone().count(&state.orm).await? as i64;

    let finder = match recipes_limit {
        Some(limit) => finder.limit(limit as u64),
        None => finder,
    };
    let recipes = finder
        .all(&state.orm)
        .await?
        .into_iter()
        .map(|recipe| recipe_service::short_recipe(state, recipe))
        .collect();

    let profile = user_service::profile(state, Some(viewer), creator).await?;
    Ok(Creator::new(profile, recipes, recipes_count))
}
