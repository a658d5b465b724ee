use std::collections::HashSet;

use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
    QuerySelect, Set,
};
use uuid::Uuid;

use crate::{
    dto::users::{AvatarRequest, UserList},
    entity::{
        subscriptions,
        users::{self, Entity as Users, Model as UserModel},
        Subscriptions,
    },
    error::{AppError, AppResult},
    media::{self, AVATARS_DIR},
    middleware::auth::AuthUser,
    models::{Avatar, UserProfile},
    response::{ApiResponse, Meta},
    routes::params::Pagination,
    state::AppState,
};

pub async fn list_users(
    state: &AppState,
    viewer: Option<&AuthUser>,
    pagination: Pagination,
) -> AppResult<ApiResponse<UserList>> {
    let (page, limit, offset) = pagination.normalize();
    let finder = Users::find().order_by_asc(users::Column::Username);
    let total = finder.clone().count(&state.orm).await? as i64;

    let models = finder
        .limit(limit as u64)
        .offset(offset as u64)
        .all(&state.orm)
        .await?;
    let items = profiles(state, viewer, models).await?;

    let meta = Meta::new(page, limit, total);
    Ok(ApiResponse::success("Users", UserList { items }, Some(meta)))
}

pub async fn get_user(
    state: &AppState,
    viewer: Option<&AuthUser>,
    id: Uuid,
) -> AppResult<ApiResponse<UserProfile>> {
    let user = find_user(state, id).await?;
    let profile = profile(state, viewer, user).await?;
    Ok(ApiResponse::success("User", profile, None))
}

pub async fn me(state: &AppState, user: &AuthUser) -> AppResult<ApiResponse<UserProfile>> {
    let model = find_user(state, user.user_id).await?;
    let profile = profile(state, Some(user), model).await?;
    Ok(ApiResponse::success("User", profile, None))
}

pub async fn set_avatar(
    state: &AppState,
    user: &AuthUser,
    payload: AvatarRequest,
) -> AppResult<ApiResponse<Avatar>> {
    let existing = find_user(state, user.user_id).await?;
    let root = &state.config.media_root;
    let path = media::save_image(root, AVATARS_DIR, &payload.avatar).await?;

    let previous = existing.avatar.clone();
    let mut active: users::ActiveModel = existing.into();
    active.avatar = Set(Some(path.clone()));
    active.update(&state.orm).await?;

    if let Some(previous) = previous {
        media::remove_image(root, &previous).await;
    }

    tracing::info!(user_id = %user.user_id, "avatar updated");
    Ok(ApiResponse::success(
        "Avatar updated",
        Avatar {
            avatar: Some(media::media_url(&state.config.public_url, &path)),
        },
        Some(Meta::empty()),
    ))
}

pub async fn delete_avatar(state: &AppState, user: &AuthUser) -> AppResult<()> {
    let existing = find_user(state, user.user_id).await?;
    let Some(previous) = existing.avatar.clone() else {
        return Ok(());
    };

    let mut active: users::ActiveModel = existing.into();
    active.avatar = Set(None);
    active.update(&state.orm).await?;
    media::remove_image(&state.config.media_root, &previous).await;

    tracing::info!(user_id = %user.user_id, "avatar removed");
    Ok(())
}

pub(crate) async fn find_user(state: &AppState, id: Uuid) -> AppResult<UserModel> {
    Users::find_by_id(id)
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)
}

/// Creator ids among `creator_ids` that `viewer` follows.
pub(crate) async fn followed_creators(
    state: &AppState,
    viewer: Option<&AuthUser>,
    creator_ids: Vec<Uuid>,
) -> AppResult<HashSet<Uuid>> {
    let Some(viewer) = viewer else {
        return Ok(HashSet::new());
    };
    if creator_ids.is_empty() {
        return Ok(HashSet::new());
    }

    let followed = Subscriptions::find()
        .filter(subscriptions::Column::SubscriberId.eq(viewer.user_id))
        .filter(subscriptions::Column::CreatorId.is_in(creator_ids))
        .all(&state.orm)
        .await?
        .into_iter()
        .map(|s| s.creator_id)
        .collect();
    Ok(followed)
}

pub(crate) async fn profiles(
    state: &AppState,
    viewer: Option<&AuthUser>,
    models: Vec<UserModel>,
) -> AppResult<Vec<UserProfile>> {
    let followed = followed_creators(state, viewer, models.iter().map(|u| u.id).collect()).await?;
    Ok(models
        .into_iter()
        .map(|model| {
            let is_subscribed = followed.contains(&model.id);
            profile_from_entity(state, model, is_subscribed)
        })
        .collect())
}

pub(crate) async fn profile(
    state: &AppState,
    viewer: Option<&AuthUser>,
    model: UserModel,
) -> AppResult<UserProfile> {
    let mut profiles = profiles(state, viewer, vec![model]).await?;
    profiles.pop().ok_or(AppError::NotFound)
}

pub(crate) fn profile_from_entity(
    state: &AppState,
    model: UserModel,
    is_subscribed: bool,
) -> UserProfile {
    UserProfile {
        id: model.id,
        email: model.email,
        username: model.username,
        first_name: model.first_name,
        last_name: model.last_name,
        avatar: model
            .avatar
            .filter(|path| !path.is_empty())
            .map(|path| media::media_url(&state.config.public_url, &path)),
        is_subscribed,
    }
}
