use axum::{Json, Router, extract::State, http::StatusCode, routing::post};

use crate::{
    dto::auth::{LoginRequest, LoginResponse},
    error::AppResult,
    middleware::auth::AuthUser,
    response::ApiResponse,
    services::auth_service::login_user,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/token/login", post(login))
        .route("/token/logout", post(logout))
}

#[utoipa::path(
    post,
    path = "/api/auth/token/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Issue an auth token", body = ApiResponse<LoginResponse>),
        (status = 400, description = "Invalid credentials")
    ),
    tag = "Auth"
)]
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> AppResult<Json<ApiResponse<LoginResponse>>> {
    let resp = login_user(&state, payload).await?;
    Ok(Json(resp))
}

/// Tokens are stateless; logging out only requires a valid token and the client drops it.
#[utoipa::path(
    post,
    path = "/api/auth/token/logout",
    responses(
        (status = 204, description = "Logged out"),
        (status = 401, description = "Not authenticated")
    ),
    security(("bearer_auth" = [])),
    tag = "Auth"
)]
pub async fn logout(user: AuthUser) -> StatusCode {
    tracing::info!(user_id = %user.user_id, "user logged out");
    StatusCode::NO_CONTENT
}
