mod common;

use common::{PIXEL_PNG, create_ingredient, create_tag, create_user, database_url, setup_state};
use foodgram_api::{
    dto::recipes::{IngredientAmount, RecipeWriteRequest},
    error::AppError,
    routes::params::RecipeFilter,
    services::{cart_service, favorite_service, recipe_service, short_link_service},
};
use uuid::Uuid;

fn recipe_request(
    name: &str,
    tag: Uuid,
    ingredients: &[(Uuid, i32)],
    image: Option<&str>,
) -> RecipeWriteRequest {
    RecipeWriteRequest {
        ingredients: ingredients
            .iter()
            .map(|&(id, amount)| IngredientAmount { id, amount })
            .collect(),
        tags: vec![tag],
        image: image.map(str::to_string),
        name: name.to_string(),
        text: "Mix and bake.".into(),
        cooking_time: 30,
    }
}

// Author publishes two recipes; a reader favorites them, fills the cart and downloads the list.
#[tokio::test]
async fn recipe_cart_and_short_link_flow() -> anyhow::Result<()> {
    let Some(database_url) = database_url() else {
        return Ok(());
    };
    let state = setup_state(&database_url).await?;

    let author = create_user(&state, "author").await?;
    let reader = create_user(&state, "reader").await?;
    let breakfast = create_tag(&state, "breakfast").await?;
    let flour = create_ingredient(&state, "flour", "g").await?;
    let eggs = create_ingredient(&state, "eggs", "pcs").await?;

    let pancakes = recipe_service::create_recipe(
        &state,
        &author,
        recipe_request("Pancakes", breakfast, &[(flour, 200), (eggs, 2)], Some(PIXEL_PNG)),
    )
    .await?
    .data
    .unwrap();
    let bread = recipe_service::create_recipe(
        &state,
        &author,
        recipe_request("Bread", breakfast, &[(flour, 100)], Some(PIXEL_PNG)),
    )
    .await?
    .data
    .unwrap();
    assert_eq!(pancakes.ingredients.len(), 2);
    assert_eq!(pancakes.tags[0].slug, "breakfast");
    assert!(pancakes.image.starts_with("http://testserver/media/"));

    // Creating without an image is rejected.
    let err = recipe_service::create_recipe(
        &state,
        &author,
        recipe_request("Soup", breakfast, &[(flour, 1)], None),
    )
    .await
    .unwrap_err();
    assert!(matches!(err, AppError::BadRequest(_)));

    // Only the author may edit.
    let err = recipe_service::update_recipe(
        &state,
        &reader,
        bread.id,
        recipe_request("Stolen", breakfast, &[(flour, 1)], None),
    )
    .await
    .unwrap_err();
    assert!(matches!(err, AppError::Forbidden));

    let updated = recipe_service::update_recipe(
        &state,
        &author,
        bread.id,
        recipe_request("Rye bread", breakfast, &[(flour, 100)], None),
    )
    .await?
    .data
    .unwrap();
    assert_eq!(updated.name, "Rye bread");
    assert_eq!(updated.image, bread.image);

    // Short link resolves back to the recipe; unknown hashes do not.
    let link = short_link_service::get_link(&state, pancakes.id)
        .await?
        .data
        .unwrap();
    let hash = link
        .short_link
        .strip_prefix("http://testserver/s/")
        .expect("short link under /s/");
    assert_eq!(short_link_service::resolve(&state, hash).await?, pancakes.id);
    let again = short_link_service::get_link(&state, pancakes.id).await?.data.unwrap();
    assert_eq!(again.short_link, link.short_link);
    assert!(matches!(
        short_link_service::resolve(&state, "zzzzzzzz").await,
        Err(AppError::NotFound)
    ));

    // Favorites
    favorite_service::add_favorite(&state, &reader, pancakes.id).await?;
    let err = favorite_service::add_favorite(&state, &reader, pancakes.id)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::BadRequest(_)));

    let filter = RecipeFilter::from_query(Some("is_favorited=1"))?;
    let favorites = recipe_service::list_recipes(&state, Some(&reader), filter)
        .await?
        .data
        .unwrap();
    assert_eq!(favorites.items.len(), 1);
    assert!(favorites.items[0].is_favorited);

    // Anonymous callers asking for favorites get nothing.
    let filter = RecipeFilter::from_query(Some("is_favorited=1"))?;
    let anonymous = recipe_service::list_recipes(&state, None, filter)
        .await?
        .data
        .unwrap();
    assert!(anonymous.items.is_empty());

    // Empty cart renders an empty list.
    assert_eq!(cart_service::download_shopping_cart(&state, &reader).await?, "");

    cart_service::add_to_cart(&state, &reader, pancakes.id).await?;
    cart_service::add_to_cart(&state, &reader, bread.id).await?;
    let err = cart_service::add_to_cart(&state, &reader, bread.id)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::BadRequest(_)));

    let list = cart_service::download_shopping_cart(&state, &reader).await?;
    assert_eq!(list, "eggs: 2 pcs\nflour: 300 g");

    cart_service::remove_from_cart(&state, &reader, bread.id).await?;
    let err = cart_service::remove_from_cart(&state, &reader, bread.id)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::BadRequest(_)));
    let list = cart_service::download_shopping_cart(&state, &reader).await?;
    assert_eq!(list, "eggs: 2 pcs\nflour: 200 g");

    // Unknown recipe
    let err = cart_service::add_to_cart(&state, &reader, Uuid::new_v4())
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::NotFound));

    // Deleting cascades the cart entry and the short link.
    let err = recipe_service::delete_recipe(&state, &reader, pancakes.id)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Forbidden));
    recipe_service::delete_recipe(&state, &author, pancakes.id).await?;
    assert_eq!(cart_service::download_shopping_cart(&state, &reader).await?, "");
    assert!(matches!(
        short_link_service::resolve(&state, hash).await,
        Err(AppError::NotFound)
    ));

    Ok(())
}
