use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post, put},
};
use uuid::Uuid;

use crate::{
    dto::{
        auth::{RegisterRequest, RegisteredUser, SetPasswordRequest},
        users::{AvatarRequest, CreatorList, SubscriptionQuery, UserList},
    },
    error::AppResult,
    middleware::auth::AuthUser,
    models::{Avatar, Creator, UserProfile},
    response::ApiResponse,
    routes::params::Pagination,
    services::{auth_service, subscription_service, user_service},
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_users).post(register))
        .route("/me", get(me))
        .route("/me/avatar", put(set_avatar).delete(delete_avatar))
        .route("/set_password", post(set_password))
        .route("/subscriptions", get(list_subscriptions))
        .route("/{id}", get(get_user))
        .route("/{id}/subscribe", post(subscribe).delete(unsubscribe))
}

#[utoipa::path(
    get,
    path = "/api/users",
    params(Pagination),
    responses(
        (status = 200, description = "List users", body = ApiResponse<UserList>)
    ),
    tag = "Users"
)]
pub async fn list_users(
    State(state): State<AppState>,
    user: Option<AuthUser>,
    Query(pagination): Query<Pagination>,
) -> AppResult<Json<ApiResponse<UserList>>> {
    Ok(Json(
        user_service::list_users(&state, user.as_ref(), pagination).await?,
    ))
}

#[utoipa::path(
    post,
    path = "/api/users",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "Register user", body = ApiResponse<RegisteredUser>),
        (status = 400, description = "Validation failed or email/username taken")
    ),
    tag = "Users"
)]
pub async fn register(
    State(state): State<AppState>,
    Json(payload): Json<RegisterRequest>,
) -> AppResult<(StatusCode, Json<ApiResponse<RegisteredUser>>)> {
    let resp = auth_service::register_user(&state, payload).await?;
    Ok((StatusCode::CREATED, Json(resp)))
}

#[utoipa::path(
    get,
    path = "/api/users/{id}",
    params(
        ("id" = Uuid, Path, description = "User ID")
    ),
    responses(
        (status = 200, description = "User profile", body = ApiResponse<UserProfile>),
        (status = 404, description = "User not found")
    ),
    tag = "Users"
)]
pub async fn get_user(
    State(state): State<AppState>,
    user: Option<AuthUser>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<UserProfile>>> {
    Ok(Json(user_service::get_user(&state, user.as_ref(), id).await?))
}

#[utoipa::path(
    get,
    path = "/api/users/me",
    responses(
        (status = 200, description = "Current user", body = ApiResponse<UserProfile>),
        (status = 401, description = "Not authenticated")
    ),
    security(("bearer_auth" = [])),
    tag = "Users"
)]
pub async fn me(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<Json<ApiResponse<UserProfile>>> {
    Ok(Json(user_service::me(&state, &user).await?))
}

#[utoipa::path(
    put,
    path = "/api/users/me/avatar",
    request_body = AvatarRequest,
    responses(
        (status = 200, description = "Avatar stored", body = ApiResponse<Avatar>),
        (status = 400, description = "Invalid image")
    ),
    security(("bearer_auth" = [])),
    tag = "Users"
)]
pub async fn set_avatar(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<AvatarRequest>,
) -> AppResult<Json<ApiResponse<Avatar>>> {
    Ok(Json(user_service::set_avatar(&state, &user, payload).await?))
}

#[utoipa::path(
    delete,
    path = "/api/users/me/avatar",
    responses(
        (status = 204, description = "Avatar removed")
    ),
    security(("bearer_auth" = [])),
    tag = "Users"
)]
pub async fn delete_avatar(State(state): State<AppState>, user: AuthUser) -> AppResult<StatusCode> {
    user_service::delete_avatar(&state, &user).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    post,
    path = "/api/users/set_password",
    request_body = SetPasswordRequest,
    responses(
        (status = 204, description = "Password changed"),
        (status = 400, description = "Wrong current password or weak new password")
    ),
    security(("bearer_auth" = [])),
    tag = "Users"
)]
pub async fn set_password(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<SetPasswordRequest>,
) -> AppResult<StatusCode> {
    auth_service::set_password(&state, &user, payload).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    get,
    path = "/api/users/subscriptions",
    params(SubscriptionQuery),
    responses(
        (status = 200, description = "Followed authors", body = ApiResponse<CreatorList>),
        (status = 400, description = "Invalid recipes_limit")
    ),
    security(("bearer_auth" = [])),
    tag = "Subscriptions"
)]
pub async fn list_subscriptions(
    State(state): State<AppState>,
    user: AuthUser,
    Query(query): Query<SubscriptionQuery>,
) -> AppResult<Json<ApiResponse<CreatorList>>> {
    Ok(Json(
        subscription_service::list_subscriptions(&state, &user, query).await?,
    ))
}

#[utoipa::path(
    post,
    path = "/api/users/{id}/subscribe",
    params(
        ("id" = Uuid, Path, description = "Author ID"),
        ("recipes_limit" = Option<i64>, Query, description = "Maximum recipes per author")
    ),
    responses(
        (status = 201, description = "Subscribed", body = ApiResponse<Creator>),
        (status = 400, description = "Self subscription or already subscribed"),
        (status = 404, description = "User not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Subscriptions"
)]
pub async fn subscribe(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    Query(query): Query<SubscriptionQuery>,
) -> AppResult<(StatusCode, Json<ApiResponse<Creator>>)> {
    let resp = subscription_service::subscribe(&state, &user, id, query).await?;
    Ok((StatusCode::CREATED, Json(resp)))
}

#[utoipa::path(
    delete,
    path = "/api/users/{id}/subscribe",
    params(
        ("id" = Uuid, Path, description = "Author ID")
    ),
    responses(
        (status = 204, description = "Unsubscribed"),
        (status = 400, description = "Not subscribed"),
        (status = 404, description = "User not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Subscriptions"
)]
pub async fn unsubscribe(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> AppResult<StatusCode> {
    subscription_service::unsubscribe(&state, &user, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
