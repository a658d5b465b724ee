use utoipa::{
    Modify, OpenApi,
    openapi::{
        self,
        OpenApi as OpenApiSpec,
        security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    },
};
use utoipa_scalar::{Scalar, Servable};

use crate::{
    dto::{
        auth::{LoginRequest, LoginResponse, RegisterRequest, RegisteredUser, SetPasswordRequest},
        ingredients::IngredientQuery,
        recipes::{IngredientAmount, RecipeList, RecipeWriteRequest, ShortRecipeList},
        users::{AvatarRequest, CreatorList, SubscriptionQuery, UserList},
    },
    models::{Avatar, Creator, Ingredient, Recipe, RecipeIngredient, ShortLink, ShortRecipe, Tag, UserProfile},
    response::{ApiResponse, Meta},
    routes::{auth, cart, favorites, health, ingredients, params, recipes, short_links, tags, users},
};

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        health::health_check,
        auth::login,
        auth::logout,
        users::list_users,
        users::register,
        users::get_user,
        users::me,
        users::set_avatar,
        users::delete_avatar,
        users::set_password,
        users::list_subscriptions,
        users::subscribe,
        users::unsubscribe,
        tags::list_tags,
        tags::get_tag,
        ingredients::list_ingredients,
        ingredients::get_ingredient,
        recipes::list_recipes,
        recipes::get_recipe,
        recipes::create_recipe,
        recipes::update_recipe,
        recipes::delete_recipe,
        recipes::get_link,
        favorites::add_favorite,
        favorites::remove_favorite,
        cart::add_to_cart,
        cart::remove_from_cart,
        cart::download_shopping_cart,
        short_links::redirect_short_link
    ),
    components(
        schemas(
            UserProfile,
            Tag,
            Ingredient,
            RecipeIngredient,
            Recipe,
            ShortRecipe,
            Creator,
            ShortLink,
            Avatar,
            RegisterRequest,
            RegisteredUser,
            LoginRequest,
            LoginResponse,
            SetPasswordRequest,
            AvatarRequest,
            IngredientAmount,
            RecipeWriteRequest,
            RecipeList,
            ShortRecipeList,
            UserList,
            CreatorList,
            SubscriptionQuery,
            IngredientQuery,
            params::Pagination,
            Meta,
            ApiResponse<Recipe>,
            ApiResponse<RecipeList>,
            ApiResponse<UserList>,
            ApiResponse<CreatorList>,
            ApiResponse<ShortRecipe>
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Health", description = "Health check endpoint"),
        (name = "Auth", description = "Token endpoints"),
        (name = "Users", description = "User account endpoints"),
        (name = "Subscriptions", description = "Author subscription endpoints"),
        (name = "Tags", description = "Tag endpoints"),
        (name = "Ingredients", description = "Ingredient endpoints"),
        (name = "Recipes", description = "Recipe endpoints"),
        (name = "Favorites", description = "Favorite endpoints"),
        (name = "Cart", description = "Shopping cart endpoints"),
        (name = "Short links", description = "Short recipe links"),
    )
)]
pub struct ApiDoc;

pub fn scalar_docs() -> Scalar<OpenApiSpec> {
    Scalar::with_url("/docs", ApiDoc::openapi())
}
