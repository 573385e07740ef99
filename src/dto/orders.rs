use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::entity::pickup_orders::OrderStatus;
use crate::models::{Bid, PickupOrder};

#[derive(Debug, Deserialize, ToSchema)]
pub struct BookListingRequest {
    /// Free-text pickup time, e.g. `2026-02-20T10:30`. Times without an
    /// offset are read in the server's configured timezone.
    #[serde(default)]
    pub scheduled_pickup_at: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct BookingReceipt {
    /// Absent only when a concurrent request for the same buyer is still
    /// committing the order.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order: Option<PickupOrder>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bid: Option<Bid>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateOrderStatusRequest {
    pub status: OrderStatus,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct OrderList {
    pub items: Vec<PickupOrder>,
}
