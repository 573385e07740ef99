use axum::{
    Json, Router,
    extract::{Path, Query, State},
    routing::{get, post},
};
use uuid::Uuid;

use crate::{
    dto::orders::OrderList,
    error::AppResult,
    middleware::auth::{Principal, require_buyer},
    models::PickupOrder,
    response::ApiResponse,
    routes::params::OrderListQuery,
    services::order_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/orders", get(list_orders))
        .route("/orders/{id}/cancel", post(cancel_order))
}

#[utoipa::path(
    get,
    path = "/api/buyer/orders",
    params(
        ("page" = Option<i64>, Query, description = "Page number, default 1"),
        ("per_page" = Option<i64>, Query, description = "Items per page, default 20"),
        ("sort_order" = Option<String>, Query, description = "asc or desc by creation time"),
    ),
    responses(
        (status = 200, description = "Buyer's active pickup orders", body = ApiResponse<OrderList>),
        (status = 401, description = "Buyer access required")
    ),
    security(("bearer_auth" = [])),
    tag = "Buyer"
)]
pub async fn list_orders(
    State(state): State<AppState>,
    principal: Principal,
    Query(query): Query<OrderListQuery>,
) -> AppResult<Json<ApiResponse<OrderList>>> {
    let buyer = require_buyer(&principal)?;
    let resp = order_service::list_buyer_orders(&state, buyer, query).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/buyer/orders/{id}/cancel",
    params(("id" = Uuid, Path, description = "Pickup order id")),
    responses(
        (status = 200, description = "Order cancelled and listing released", body = ApiResponse<PickupOrder>),
        (status = 400, description = "Order is past the point of cancellation"),
        (status = 404, description = "Order not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Buyer"
)]
pub async fn cancel_order(
    State(state): State<AppState>,
    principal: Principal,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<PickupOrder>>> {
    require_buyer(&principal)?;
    let resp = order_service::cancel_order(&state, &principal, id).await?;
    Ok(Json(resp))
}
