use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::{
    error::{AppError, AppResult},
    models::{Recipe, ShortRecipe},
};

pub const RECIPE_NAME_MAX_LENGTH: usize = 256;
pub const MIN_COOKING_TIME: i32 = 1;
pub const MAX_COOKING_TIME: i32 = 32_000;
pub const MIN_INGREDIENT_AMOUNT: i32 = 1;
pub const MAX_INGREDIENT_AMOUNT: i32 = 32_000;

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct IngredientAmount {
    pub id: Uuid,
    pub amount: i32,
}

/// Body of both create and update. Tags and ingredients replace the previous sets.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct RecipeWriteRequest {
    #[serde(default)]
    pub ingredients: Vec<IngredientAmount>,
    #[serde(default)]
    pub tags: Vec<Uuid>,
    /// `data:image/<ext>;base64,<payload>`; required on create.
    pub image: Option<String>,
    pub name: String,
    pub text: String,
    pub cooking_time: i32,
}

impl RecipeWriteRequest {
    pub fn validate(&self, image_required: bool) -> AppResult<()> {
        if self.tags.is_empty() {
            return Err(AppError::BadRequest(
                "tags: This field is required and cannot be empty.".into(),
            ));
        }
        if self.tags.iter().collect::<HashSet<_>>().len() != self.tags.len() {
            return Err(AppError::BadRequest(
                "tags: Tag should be provided only once".into(),
            ));
        }

        if self.ingredients.is_empty() {
            return Err(AppError::BadRequest(
                "ingredients: This field is required and cannot be empty.".into(),
            ));
        }
        let mut seen = HashSet::new();
        for ingredient in &self.ingredients {
            if !seen.insert(ingredient.id) {
                return Err(AppError::BadRequest(
                    "ingredients: Ingredient should be provided only once".into(),
                ));
            }
            if !(MIN_INGREDIENT_AMOUNT..=MAX_INGREDIENT_AMOUNT).contains(&ingredient.amount) {
                return Err(AppError::BadRequest(format!(
                    "ingredients: amount must be between {MIN_INGREDIENT_AMOUNT} and {MAX_INGREDIENT_AMOUNT}"
                )));
            }
        }

        if !(MIN_COOKING_TIME..=MAX_COOKING_TIME).contains(&self.cooking_time) {
            return Err(AppError::BadRequest(format!(
                "cooking_time: must be between {MIN_COOKING_TIME} and {MAX_COOKING_TIME}"
            )));
        }
        if self.name.trim().is_empty() || self.name.chars().count() > RECIPE_NAME_MAX_LENGTH {
            return Err(AppError::BadRequest(format!(
                "name: must be between 1 and {RECIPE_NAME_MAX_LENGTH} characters"
            )));
        }
        if self.text.trim().is_empty() {
            return Err(AppError::BadRequest("text: This field may not be blank.".into()));
        }
        if image_required && self.image.as_deref().is_none_or(str::is_empty) {
            return Err(AppError::BadRequest("image: This field is required.".into()));
        }
        Ok(())
    }
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(transparent)]
pub struct RecipeList {
    #[schema(value_type = Vec<Recipe>)]
    pub items: Vec<Recipe>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(transparent)]
pub struct ShortRecipeList {
    #[schema(value_type = Vec<ShortRecipe>)]
    pub items: Vec<ShortRecipe>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request() -> RecipeWriteRequest {
        RecipeWriteRequest {
            ingredients: vec![
                IngredientAmount {
                    id: Uuid::new_v4(),
                    amount: 200,
                },
                IngredientAmount {
                    id: Uuid::new_v4(),
                    amount: 2,
                },
            ],
            tags: vec![Uuid::new_v4()],
            image: Some("data:image/png;base64,AAAA".into()),
            name: "Pancakes".into(),
            text: "Mix and fry.".into(),
            cooking_time: 20,
        }
    }

    #[test]
    fn accepts_valid_recipe() {
        assert!(request().validate(true).is_ok());
    }

    #[test]
    fn requires_tags_and_ingredients() {
        let mut req = request();
        req.tags.clear();
        assert!(req.validate(true).is_err());

        let mut req = request();
        req.ingredients.clear();
        assert!(req.validate(true).is_err());
    }

    #[test]
    fn rejects_duplicates() {
        let mut req = request();
        req.tags.push(req.tags[0]);
        assert!(req.validate(true).is_err());

        let mut req = request();
        let dup = req.ingredients[0].clone();
        req.ingredients.push(dup);
        assert!(req.validate(true).is_err());
    }

    #[test]
    fn enforces_bounds() {
        let mut req = request();
        req.cooking_time = 0;
        assert!(req.validate(true).is_err());

        let mut req = request();
        req.cooking_time = MAX_COOKING_TIME + 1;
        assert!(req.validate(true).is_err());

        let mut req = request();
        req.ingredients[0].amount = 0;
        assert!(req.validate(true).is_err());
    }

    #[test]
    fn image_only_required_on_create() {
        let mut req = request();
        req.image = None;
        assert!(req.validate(true).is_err());
        assert!(req.validate(false).is_ok());
    }
}
