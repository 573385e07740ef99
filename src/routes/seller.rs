use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, patch, post},
};
use uuid::Uuid;

use crate::{
    dto::{
        listings::{ListingFields, ListingList, SellerDashboard},
        orders::{OrderList, UpdateOrderStatusRequest},
    },
    error::AppResult,
    middleware::auth::{Principal, require_seller},
    models::{Listing, PickupOrder},
    response::ApiResponse,
    routes::params::{OrderListQuery, SellerListingQuery},
    services::{listing_service, order_service},
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/dashboard", get(dashboard))
        .route("/listings", get(list_listings).post(create_listing))
        .route("/listings/{id}", get(get_listing).put(update_listing))
        .route("/orders", get(list_orders))
        .route("/orders/{id}/status", patch(update_order_status))
        .route("/orders/{id}/cancel", post(cancel_order))
}

#[utoipa::path(
    get,
    path = "/api/seller/dashboard",
    responses(
        (status = 200, description = "Listing counts and recent bookings", body = ApiResponse<SellerDashboard>),
        (status = 401, description = "Seller access required")
    ),
    security(("bearer_auth" = [])),
    tag = "Seller"
)]
pub async fn dashboard(
    State(state): State<AppState>,
    principal: Principal,
) -> AppResult<Json<ApiResponse<SellerDashboard>>> {
    let seller = require_seller(&principal)?;
    let resp = listing_service::seller_dashboard(&state, seller).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/seller/listings",
    params(
        ("page" = Option<i64>, Query, description = "Page number, default 1"),
        ("per_page" = Option<i64>, Query, description = "Items per page, default 20"),
        ("status" = Option<String>, Query, description = "available, reserved, sold or inactive"),
    ),
    responses(
        (status = 200, description = "Seller's own listings", body = ApiResponse<ListingList>)
    ),
    security(("bearer_auth" = [])),
    tag = "Seller"
)]
pub async fn list_listings(
    State(state): State<AppState>,
    principal: Principal,
    Query(query): Query<SellerListingQuery>,
) -> AppResult<Json<ApiResponse<ListingList>>> {
    let seller = require_seller(&principal)?;
    let resp = listing_service::list_seller_listings(&state, seller, query).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/seller/listings",
    request_body = ListingFields,
    responses(
        (status = 201, description = "Listing created", body = ApiResponse<Listing>),
        (status = 422, description = "Invalid listing fields")
    ),
    security(("bearer_auth" = [])),
    tag = "Seller"
)]
pub async fn create_listing(
    State(state): State<AppState>,
    principal: Principal,
    Json(payload): Json<ListingFields>,
) -> AppResult<(StatusCode, Json<ApiResponse<Listing>>)> {
    let seller = require_seller(&principal)?;
    let resp = listing_service::create_listing(&state, seller, payload).await?;
    Ok((StatusCode::CREATED, Json(resp)))
}

#[utoipa::path(
    get,
    path = "/api/seller/listings/{id}",
    params(("id" = Uuid, Path, description = "Listing id")),
    responses(
        (status = 200, description = "Listing", body = ApiResponse<Listing>),
        (status = 404, description = "Not one of the seller's listings")
    ),
    security(("bearer_auth" = [])),
    tag = "Seller"
)]
pub async fn get_listing(
    State(state): State<AppState>,
    principal: Principal,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<Listing>>> {
    let seller = require_seller(&principal)?;
    let resp = listing_service::get_seller_listing(&state, seller, id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    put,
    path = "/api/seller/listings/{id}",
    params(("id" = Uuid, Path, description = "Listing id")),
    request_body = ListingFields,
    responses(
        (status = 200, description = "Listing updated", body = ApiResponse<Listing>),
        (status = 404, description = "Not one of the seller's listings"),
        (status = 422, description = "Invalid listing fields")
    ),
    security(("bearer_auth" = [])),
    tag = "Seller"
)]
pub async fn update_listing(
    State(state): State<AppState>,
    principal: Principal,
    Path(id): Path<Uuid>,
    Json(payload): Json<ListingFields>,
) -> AppResult<Json<ApiResponse<Listing>>> {
    let seller = require_seller(&principal)?;
    let resp = listing_service::update_listing(&state, seller, id, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/seller/orders",
    params(
        ("page" = Option<i64>, Query, description = "Page number, default 1"),
        ("per_page" = Option<i64>, Query, description = "Items per page, default 20"),
        ("sort_order" = Option<String>, Query, description = "asc or desc by creation time"),
    ),
    responses(
        (status = 200, description = "Bookings against the seller's listings", body = ApiResponse<OrderList>)
    ),
    security(("bearer_auth" = [])),
    tag = "Seller"
)]
pub async fn list_orders(
    State(state): State<AppState>,
    principal: Principal,
    Query(query): Query<OrderListQuery>,
) -> AppResult<Json<ApiResponse<OrderList>>> {
    let seller = require_seller(&principal)?;
    let resp = order_service::list_seller_orders(&state, seller, query).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    patch,
    path = "/api/seller/orders/{id}/status",
    params(("id" = Uuid, Path, description = "Pickup order id")),
    request_body = UpdateOrderStatusRequest,
    responses(
        (status = 200, description = "Order status changed", body = ApiResponse<PickupOrder>),
        (status = 400, description = "Transition not allowed from the current status"),
        (status = 404, description = "Order not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Seller"
)]
pub async fn update_order_status(
    State(state): State<AppState>,
    principal: Principal,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateOrderStatusRequest>,
) -> AppResult<Json<ApiResponse<PickupOrder>>> {
    let seller = require_seller(&principal)?;
    let resp = order_service::update_order_status(&state, seller, id, payload.status).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/seller/orders/{id}/cancel",
    params(("id" = Uuid, Path, description = "Pickup order id")),
    responses(
        (status = 200, description = "Order cancelled and listing released", body = ApiResponse<PickupOrder>),
        (status = 400, description = "Order is past the point of cancellation"),
        (status = 404, description = "Order not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Seller"
)]
pub async fn cancel_order(
    State(state): State<AppState>,
    principal: Principal,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<PickupOrder>>> {
    require_seller(&principal)?;
    let resp = order_service::cancel_order(&state, &principal, id).await?;
    Ok(Json(resp))
}
