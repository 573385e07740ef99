use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post},
};
use uuid::Uuid;

use crate::{
    dto::{
        listings::ListingList,
        orders::{BookListingRequest, BookingReceipt},
    },
    error::AppResult,
    middleware::auth::{Principal, require_buyer},
    response::ApiResponse,
    routes::params::AvailableListingQuery,
    services::{
        booking_service::{self, BookingOutcome},
        listing_service,
    },
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_available))
        .route("/{id}/book", post(book_listing))
}

#[utoipa::path(
    get,
    path = "/api/listings",
    params(
        ("page" = Option<i64>, Query, description = "Page number, default 1"),
        ("per_page" = Option<i64>, Query, description = "Items per page, default 20"),
        ("category_id" = Option<Uuid>, Query, description = "Only listings in this category"),
        ("sort_order" = Option<String>, Query, description = "asc or desc by creation time"),
    ),
    responses(
        (status = 200, description = "Listings open for booking", body = ApiResponse<ListingList>),
        (status = 401, description = "Buyer access required")
    ),
    security(("bearer_auth" = [])),
    tag = "Listings"
)]
pub async fn list_available(
    State(state): State<AppState>,
    principal: Principal,
    Query(query): Query<AvailableListingQuery>,
) -> AppResult<Json<ApiResponse<ListingList>>> {
    require_buyer(&principal)?;
    let resp = listing_service::list_available_listings(&state, query).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/listings/{id}/book",
    params(("id" = Uuid, Path, description = "Listing id")),
    request_body = BookListingRequest,
    responses(
        (status = 201, description = "Listing booked", body = ApiResponse<BookingReceipt>),
        (status = 200, description = "Buyer already booked this listing", body = ApiResponse<BookingReceipt>),
        (status = 401, description = "Buyer access required"),
        (status = 404, description = "Listing not available"),
        (status = 422, description = "Missing or invalid pickup time")
    ),
    security(("bearer_auth" = [])),
    tag = "Listings"
)]
pub async fn book_listing(
    State(state): State<AppState>,
    principal: Principal,
    Path(id): Path<Uuid>,
    Json(payload): Json<BookListingRequest>,
) -> AppResult<(StatusCode, Json<ApiResponse<BookingReceipt>>)> {
    let buyer = require_buyer(&principal)?;

    let outcome =
        booking_service::book_listing(&state, buyer, id, &payload.scheduled_pickup_at).await?;

    let (status, resp) = match outcome {
        BookingOutcome::Booked { order, bid } => (
            StatusCode::CREATED,
            ApiResponse::success(
                "Listing booked successfully. Pickup order created.",
                BookingReceipt {
                    order: Some(order.into()),
                    bid: Some(bid.into()),
                },
                None,
            ),
        ),
        BookingOutcome::AlreadyBooked(order) => (
            StatusCode::OK,
            ApiResponse::success(
                "You have already booked this listing.",
                BookingReceipt {
                    order: order.map(Into::into),
                    bid: None,
                },
                None,
            ),
        ),
    };

    Ok((status, Json(resp)))
}
