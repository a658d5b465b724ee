use sea_orm::{EntityTrait, QueryOrder};
use uuid::Uuid;

use crate::{
    entity::tags::{self, Entity as Tags, Model as TagModel},
    error::{AppError, AppResult},
    models::Tag,
    response::ApiResponse,
    state::AppState,
};

pub async fn list_tags(state: &AppState) -> AppResult<ApiResponse<Vec<Tag>>> {
    let items = Tags::find()
        .order_by_asc(tags::Column::Name)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(tag_from_entity)
        .collect();
    Ok(ApiResponse::success("Tags", items, None))
}

pub async fn get_tag(state: &AppState, id: Uuid) -> AppResult<ApiResponse<Tag>> {
    let tag = Tags::find_by_id(id)
        .one(&state.orm)
        .await?
        .map(tag_from_entity)
        .ok_or(AppError::NotFound)?;
    Ok(ApiResponse::success("Tag", tag, None))
}

pub(crate) fn tag_from_entity(model: TagModel) -> Tag {
    Tag {
        id: model.id,
        name: model.name,
        slug: model.slug,
    }
}
