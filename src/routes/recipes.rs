use axum::{
    Json, Router,
    extract::{Path, RawQuery, State},
    http::StatusCode,
    routing::get,
};
use uuid::Uuid;

use crate::{
    dto::recipes::{RecipeList, RecipeWriteRequest},
    error::AppResult,
    middleware::auth::AuthUser,
    models::{Recipe, ShortLink},
    response::ApiResponse,
    routes::params::RecipeFilter,
    services::{recipe_service, short_link_service},
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_recipes).post(create_recipe))
        .route(
            "/{id}",
            get(get_recipe).patch(update_recipe).delete(delete_recipe),
        )
        .route("/{id}/get-link", get(get_link))
}

#[utoipa::path(
    get,
    path = "/api/recipes",
    params(
        ("page" = Option<i64>, Query, description = "Page number, default 1"),
        ("limit" = Option<i64>, Query, description = "Items per page, default 6"),
        ("tags" = Option<Vec<String>>, Query, description = "Tag slugs, repeatable; any match"),
        ("author" = Option<Uuid>, Query, description = "Author ID"),
        ("is_favorited" = Option<bool>, Query, description = "Only the caller's favorites"),
        ("is_in_shopping_cart" = Option<bool>, Query, description = "Only recipes in the caller's cart")
    ),
    responses(
        (status = 200, description = "List recipes", body = ApiResponse<RecipeList>),
        (status = 400, description = "Malformed filter")
    ),
    tag = "Recipes"
)]
pub async fn list_recipes(
    State(state): State<AppState>,
    user: Option<AuthUser>,
    RawQuery(query): RawQuery,
) -> AppResult<Json<ApiResponse<RecipeList>>> {
    let filter = RecipeFilter::from_query(query.as_deref())?;
    Ok(Json(
        recipe_service::list_recipes(&state, user.as_ref(), filter).await?,
    ))
}

#[utoipa::path(
    get,
    path = "/api/recipes/{id}",
    params(
        ("id" = Uuid, Path, description = "Recipe ID")
    ),
    responses(
        (status = 200, description = "Get recipe", body = ApiResponse<Recipe>),
        (status = 404, description = "Recipe not found"),
    ),
    tag = "Recipes"
)]
pub async fn get_recipe(
    State(state): State<AppState>,
    user: Option<AuthUser>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<Recipe>>> {
    Ok(Json(
        recipe_service::get_recipe(&state, user.as_ref(), id).await?,
    ))
}

#[utoipa::path(
    post,
    path = "/api/recipes",
    request_body = RecipeWriteRequest,
    responses(
        (status = 201, description = "Create recipe", body = ApiResponse<Recipe>),
        (status = 400, description = "Validation failed"),
        (status = 401, description = "Not authenticated")
    ),
    security(("bearer_auth" = [])),
    tag = "Recipes"
)]
pub async fn create_recipe(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<RecipeWriteRequest>,
) -> AppResult<(StatusCode, Json<ApiResponse<Recipe>>)> {
    let resp = recipe_service::create_recipe(&state, &user, payload).await?;
    Ok((StatusCode::CREATED, Json(resp)))
}

#[utoipa::path(
    patch,
    path = "/api/recipes/{id}",
    params(
        ("id" = Uuid, Path, description = "Recipe ID")
    ),
    request_body = RecipeWriteRequest,
    responses(
        (status = 200, description = "Updated recipe", body = ApiResponse<Recipe>),
        (status = 400, description = "Validation failed"),
        (status = 403, description = "Not the author"),
        (status = 404, description = "Recipe not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Recipes"
)]
pub async fn update_recipe(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<RecipeWriteRequest>,
) -> AppResult<Json<ApiResponse<Recipe>>> {
    Ok(Json(
        recipe_service::update_recipe(&state, &user, id, payload).await?,
    ))
}

#[utoipa::path(
    delete,
    path = "/api/recipes/{id}",
    params(
        ("id" = Uuid, Path, description = "Recipe ID")
    ),
    responses(
        (status = 204, description = "Deleted recipe"),
        (status = 403, description = "Not the author"),
        (status = 404, description = "Recipe not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Recipes"
)]
pub async fn delete_recipe(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> AppResult<StatusCode> {
    recipe_service::delete_recipe(&state, &user, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    get,
    path = "/api/recipes/{id}/get-link",
    params(
        ("id" = Uuid, Path, description = "Recipe ID")
    ),
    responses(
        (status = 200, description = "Short link of the recipe", body = ApiResponse<ShortLink>),
        (status = 404, description = "Recipe not found")
    ),
    tag = "Recipes"
)]
pub async fn get_link(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<ShortLink>>> {
    Ok(Json(short_link_service::get_link(&state, id).await?))
}
