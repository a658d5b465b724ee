use sea_orm::{EntityTrait, QueryFilter, QueryOrder};
use sea_orm::sea_query::{Expr, Func};
use uuid::Uuid;

use crate::{
    dto::ingredients::IngredientQuery,
    entity::ingredients::{self, Entity as Ingredients, Model as IngredientModel},
    error::{AppError, AppResult},
    models::Ingredient,
    response::ApiResponse,
    state::AppState,
};

pub async fn list_ingredients(
    state: &AppState,
    query: IngredientQuery,
) -> AppResult<ApiResponse<Vec<Ingredient>>> {
    let mut finder = Ingredients::find().order_by_asc(ingredients::Column::Name);

    if let Some(prefix) = query.name.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
        let pattern = format!("{}%", escape_like(&prefix.to_lowercase()));
        finder = finder.filter(
            Expr::expr(Func::lower(Expr::col(ingredients::Column::Name))).like(pattern),
        );
    }

    let items = finder
        .all(&state.orm)
        .await?
        .into_iter()
        .map(ingredient_from_entity)
        .collect();
    Ok(ApiResponse::success("Ingredients", items, None))
}

pub async fn get_ingredient(state: &AppState, id: Uuid) -> AppResult<ApiResponse<Ingredient>> {
    let ingredient = Ingredients::find_by_id(id)
        .one(&state.orm)
        .await?
        .map(ingredient_from_entity)
        .ok_or(AppError::NotFound)?;
    Ok(ApiResponse::success("Ingredient", ingredient, None))
}

fn ingredient_from_entity(model: IngredientModel) -> Ingredient {
    Ingredient {
        id: model.id,
        name: model.name,
        measurement_unit: model.measurement_unit,
    }
}

/// Escapes LIKE wildcards so user input only ever matches literally.
fn escape_like(value: &str) -> String {
    value
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_")
}

#[cfg(test)]
mod tests {
    use super::escape_like;

    #[test]
    fn escapes_wildcards() {
        assert_eq!(escape_like("50%_off\\"), "50\\%\\_off\\\\");
        assert_eq!(escape_like("мука"), "мука");
    }
}
