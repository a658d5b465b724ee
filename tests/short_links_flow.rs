mod common;

use common::{PIXEL_PNG, create_ingredient, create_tag, create_user, database_url, setup_state};
use foodgram_api::{
    dto::recipes::{IngredientAmount, RecipeWriteRequest},
    entity::RecipeShortUrls,
    error::AppError,
    services::{recipe_service, short_link_service},
    short_link::MAX_HASH_ATTEMPTS,
};
use sea_orm::{EntityTrait, ModelTrait};

// Hash collisions are redrawn; a source that only yields taken hashes gives up with a 500.
#[tokio::test]
async fn hash_collisions_are_redrawn_then_rejected() -> anyhow::Result<()> {
    let Some(database_url) = database_url() else {
        return Ok(());
    };
    let state = setup_state(&database_url).await?;

    let author = create_user(&state, "linker").await?;
    let tag = create_tag(&state, "lunch").await?;
    let salt = create_ingredient(&state, "salt", "g").await?;

    let mut recipes = Vec::new();
    for name in ["Salad", "Soup"] {
        let recipe = recipe_service::create_recipe(
            &state,
            &author,
            RecipeWriteRequest {
                ingredients: vec![IngredientAmount { id: salt, amount: 5 }],
                tags: vec![tag],
                image: Some(PIXEL_PNG.into()),
                name: name.into(),
                text: "Season to taste.".into(),
                cooking_time: 10,
            },
        )
        .await?
        .data
        .unwrap();
        recipes.push(recipe);
    }

    let link = short_link_service::get_link(&state, recipes[0].id)
        .await?
        .data
        .unwrap();
    let taken = link
        .short_link
        .rsplit('/')
        .next()
        .expect("hash segment")
        .to_string();

    // Free the second recipe's slot so a new link can be attached to it.
    let soup_link = RecipeShortUrls::find()
        .all(&state.orm)
        .await?
        .into_iter()
        .find(|row| row.recipe_id == recipes[1].id)
        .expect("short link of the second recipe");
    soup_link.delete(&state.orm).await?;

    let mut draws = 0;
    let err = short_link_service::create_for_recipe_with(&state.orm, recipes[1].id, || {
        draws += 1;
        taken.clone()
    })
    .await
    .unwrap_err();
    assert!(matches!(err, AppError::Internal(_)));
    assert_eq!(draws, MAX_HASH_ATTEMPTS);

    let mut candidates = vec![taken.clone(), taken.clone(), "Fresh123".to_string()].into_iter();
    let created = short_link_service::create_for_recipe_with(&state.orm, recipes[1].id, || {
        candidates.next().unwrap_or_default()
    })
    .await?;
    assert_eq!(created.hash, "Fresh123");
    assert_eq!(
        short_link_service::resolve(&state, "Fresh123").await?,
        recipes[1].id
    );

    Ok(())
}
