mod common;

use common::{PIXEL_PNG, create_ingredient, create_tag, create_user, database_url, setup_state};
use foodgram_api::{
    dto::{
        recipes::{IngredientAmount, RecipeWriteRequest},
        users::SubscriptionQuery,
    },
    error::AppError,
    services::{recipe_service, subscription_service},
};

#[tokio::test]
async fn subscribe_list_and_unsubscribe_flow() -> anyhow::Result<()> {
    let Some(database_url) = database_url() else {
        return Ok(());
    };
    let state = setup_state(&database_url).await?;

    let creator = create_user(&state, "creator").await?;
    let follower = create_user(&state, "follower").await?;
    let tag = create_tag(&state, "dinner").await?;
    let rice = create_ingredient(&state, "rice", "g").await?;

    for name in ["Risotto", "Paella", "Pilaf"] {
        recipe_service::create_recipe(
            &state,
            &creator,
            RecipeWriteRequest {
                ingredients: vec![IngredientAmount { id: rice, amount: 150 }],
                tags: vec![tag],
                image: Some(PIXEL_PNG.into()),
                name: name.into(),
                text: "Cook slowly.".into(),
                cooking_time: 40,
            },
        )
        .await?;
    }

    let err = subscription_service::subscribe(
        &state,
        &follower,
        follower.user_id,
        SubscriptionQuery::default(),
    )
    .await
    .unwrap_err();
    assert!(matches!(err, AppError::BadRequest(_)));

    let limited = SubscriptionQuery {
        recipes_limit: Some("2".into()),
        ..Default::default()
    };
    let view = subscription_service::subscribe(&state, &follower, creator.user_id, limited)
        .await?
        .data
        .unwrap();
    assert!(view.is_subscribed);
    assert_eq!(view.recipes.len(), 2);
    assert_eq!(view.recipes_count, 3);

    let err = subscription_service::subscribe(
        &state,
        &follower,
        creator.user_id,
        SubscriptionQuery::default(),
    )
    .await
    .unwrap_err();
    assert!(matches!(err, AppError::BadRequest(_)));

    let list = subscription_service::list_subscriptions(&state, &follower, SubscriptionQuery::default())
        .await?
        .data
        .unwrap();
    assert_eq!(list.items.len(), 1);
    assert_eq!(list.items[0].id, creator.user_id);
    assert_eq!(list.items[0].recipes.len(), 3);

    subscription_service::unsubscribe(&state, &follower, creator.user_id).await?;
    let err = subscription_service::unsubscribe(&state, &follower, creator.user_id)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::BadRequest(_)));

    Ok(())
}
