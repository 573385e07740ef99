use axum::{Json, Router, extract::State, routing::get};

use crate::{
    error::AppResult, models::Category, response::ApiResponse, services::category_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new().route("/", get(list_categories))
}

#[utoipa::path(
    get,
    path = "/api/categories",
    responses(
        (status = 200, description = "Scrap categories", body = ApiResponse<Vec<Category>>)
    ),
    tag = "Listings"
)]
pub async fn list_categories(
    State(state): State<AppState>,
) -> AppResult<Json<ApiResponse<Vec<Category>>>> {
    let resp = category_service::list_categories(&state).await?;
    Ok(Json(resp))
}
