use axum::{
    Router,
    extract::{Path, State},
    http::{StatusCode, header},
    response::IntoResponse,
    routing::get,
};
use uuid::Uuid;

use crate::{
    error::AppResult,
    services::short_link_service,
    short_link::recipe_detail_path,
    state::AppState,
};

/// Routes served outside `/api`: short-link redirects and the recipe detail
/// placeholder the frontend normally answers.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/s/{hash}", get(redirect_short_link))
        .route("/recipes/{id}", get(recipe_detail))
}

#[utoipa::path(
    get,
    path = "/s/{hash}",
    params(
        ("hash" = String, Path, description = "Short link hash")
    ),
    responses(
        (status = 302, description = "Redirect to the recipe page"),
        (status = 404, description = "Unknown hash")
    ),
    tag = "Short links"
)]
pub async fn redirect_short_link(
    State(state): State<AppState>,
    Path(hash): Path<String>,
) -> AppResult<impl IntoResponse> {
    let recipe_id = short_link_service::resolve(&state, &hash).await?;
    Ok(found(recipe_detail_path(recipe_id)))
}

pub async fn recipe_detail(Path(id): Path<Uuid>) -> String {
    format!("This route is handled by the frontend. Recipe ID: {id}")
}

/// 302 Found; axum's `Redirect` only offers 303/307/308.
pub fn found(location: String) -> impl IntoResponse {
    (StatusCode::FOUND, [(header::LOCATION, location)])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn redirect_is_302_with_location() {
        let id = Uuid::new_v4();
        let response = found(recipe_detail_path(id)).into_response();
        assert_eq!(response.status(), StatusCode::FOUND);
        assert_eq!(
            response.headers().get(header::LOCATION).unwrap(),
            &format!("/recipes/{id}/")
        );
    }
}
