use chrono::{DateTime, FixedOffset, Utc};
use sea_orm::sea_query::{Expr, LockType};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DatabaseTransaction, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait,
};
use uuid::Uuid;

use crate::{
    audit::log_audit,
    dto::orders::OrderList,
    entity::{
        bids::{ActiveModel as BidActive, Entity as Bids},
        buyer_profiles,
        listings::{Column as ListingCol, Entity as Listings, ListingStatus},
        pickup_orders::{
            self, ActiveModel as OrderActive, Column as OrderCol, Entity as PickupOrders,
            OrderStatus,
        },
        seller_profiles,
    },
    error::{AppError, AppResult},
    lifecycle::{
        BidIntent, BidTransition, ListingEvent, OrderIntent, advance_bid, advance_listing,
        advance_order,
    },
    middleware::auth::Principal,
    models::PickupOrder,
    response::ApiResponse,
    routes::params::{OrderListQuery, SortOrder},
    state::AppState,
};

async fn list_orders(
    state: &AppState,
    condition: Condition,
    query: OrderListQuery,
) -> AppResult<ApiResponse<OrderList>> {
    let (page, per_page, offset) = query.pagination().normalize();

    let finder = PickupOrders::find().filter(condition);
    let finder = match query.sort_order.unwrap_or(SortOrder::Desc) {
        SortOrder::Asc => finder.order_by_asc(OrderCol::CreatedAt),
        SortOrder::Desc => finder.order_by_desc(OrderCol::CreatedAt),
    };

    let total = finder.clone().count(&state.orm).await? as i64;
    let items = finder
        .limit(per_page as u64)
        .offset(offset as u64)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(PickupOrder::from)
        .collect();

    Ok(ApiResponse::paged("Ok", OrderList { items }, page, per_page, total))
}

/// The buyer's live orders; cancelled ones are hidden.
pub async fn list_buyer_orders(
    state: &AppState,
    buyer: &buyer_profiles::Model,
    query: OrderListQuery,
) -> AppResult<ApiResponse<OrderList>> {
    let condition = Condition::all()
        .add(OrderCol::BuyerId.eq(buyer.id))
        .add(OrderCol::Status.ne(OrderStatus::Cancelled));
    list_orders(state, condition, query).await
}

/// Live bookings against the seller's listings; cancelled ones are hidden.
pub async fn list_seller_orders(
    state: &AppState,
    seller: &seller_profiles::Model,
    query: OrderListQuery,
) -> AppResult<ApiResponse<OrderList>> {
    let condition = Condition::all()
        .add(OrderCol::SellerId.eq(seller.id))
        .add(OrderCol::Status.ne(OrderStatus::Cancelled));
    list_orders(state, condition, query).await
}

/// Lock an order the caller is party to. The listing row is locked before
/// the order, the same order `book_listing` takes them in.
async fn lock_order(
    txn: &DatabaseTransaction,
    order_id: Uuid,
    party: Condition,
) -> AppResult<pickup_orders::Model> {
    let listing_id = PickupOrders::find_by_id(order_id)
        .filter(party.clone())
        .select_only()
        .column(OrderCol::ListingId)
        .into_tuple::<Uuid>()
        .one(txn)
        .await?
        .ok_or(AppError::NotFound)?;

    Listings::find_by_id(listing_id)
        .lock(LockType::Update)
        .one(txn)
        .await?;

    PickupOrders::find_by_id(order_id)
        .filter(party)
        .lock(LockType::Update)
        .one(txn)
        .await?
        .ok_or(AppError::NotFound)
}

/// Move a listing out of `Reserved` if it is still there. A listing the
/// seller has since deactivated is left alone.
async fn settle_listing(
    txn: &DatabaseTransaction,
    listing_id: Uuid,
    event: ListingEvent,
    now: DateTime<FixedOffset>,
) -> AppResult<()> {
    let next = advance_listing(ListingStatus::Reserved, event)
        .map_err(|e| AppError::BadRequest(e.to_string()))?;

    let result = Listings::update_many()
        .col_expr(ListingCol::Status, Expr::value(next))
        .col_expr(ListingCol::UpdatedAt, Expr::value(now))
        .filter(ListingCol::Id.eq(listing_id))
        .filter(ListingCol::Status.eq(ListingStatus::Reserved))
        .exec(txn)
        .await?;

    if result.rows_affected == 0 {
        tracing::debug!(listing_id = %listing_id, ?event, "listing was not reserved");
    }
    Ok(())
}

/// Cancel a confirmed order. The buyer withdraws their bid, the seller
/// rejects it; either way the listing is offered again.
pub async fn cancel_order(
    state: &AppState,
    principal: &Principal,
    order_id: Uuid,
) -> AppResult<ApiResponse<PickupOrder>> {
    let (party, bid_intent) = match principal {
        Principal::Buyer(buyer) => (OrderCol::BuyerId.eq(buyer.id), BidIntent::Withdraw),
        Principal::Seller(seller) => (OrderCol::SellerId.eq(seller.id), BidIntent::Reject),
        Principal::Guest => return Err(AppError::unauthorized("Login required.")),
    };

    let txn = state.orm.begin().await?;
    let order = lock_order(&txn, order_id, Condition::all().add(party)).await?;

    let next = advance_order(Some(order.status), OrderIntent::Cancel)
        .map_err(|_| AppError::BadRequest("This order can no longer be cancelled.".into()))?;

    let bid = Bids::find_by_id(order.bid_id)
        .lock(LockType::Update)
        .one(&txn)
        .await?
        .ok_or(AppError::NotFound)?;

    let now: DateTime<FixedOffset> = Utc::now().into();

    match advance_bid(Some(bid.status), bid_intent) {
        Ok(BidTransition::SetStatus(status)) => {
            let mut active: BidActive = bid.into();
            active.status = Set(status);
            active.updated_at = Set(now);
            active.update(&txn).await?;
        }
        Ok(other) => {
            tracing::warn!(bid_id = %bid.id, ?other, "unexpected bid transition on cancel");
        }
        Err(err) => return Err(AppError::BadRequest(err.to_string())),
    }

    settle_listing(&txn, order.listing_id, ListingEvent::Release, now).await?;

    let mut active: OrderActive = order.into();
    active.status = Set(next);
    active.updated_at = Set(now);
    let order = active.update(&txn).await?;

    txn.commit().await?;

    tracing::info!(order_id = %order.id, ?bid_intent, "order cancelled");

    if let Err(err) = log_audit(
        &state.orm,
        principal.user_id(),
        "order_cancel",
        Some("pickup_orders"),
        Some(serde_json::json!({ "order_id": order.id, "listing_id": order.listing_id })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(ApiResponse::success("Order cancelled", order.into(), None))
}

/// Seller-driven fulfilment. Completing an order marks its listing sold.
pub async fn update_order_status(
    state: &AppState,
    seller: &seller_profiles::Model,
    order_id: Uuid,
    target: OrderStatus,
) -> AppResult<ApiResponse<PickupOrder>> {
    let intent = OrderIntent::for_target(target).ok_or_else(|| {
        AppError::field("status", "Orders cannot be moved back to placed.")
    })?;

    if intent == OrderIntent::Cancel {
        return cancel_order(state, &Principal::Seller(seller.clone()), order_id).await;
    }

    let txn = state.orm.begin().await?;

    let order = lock_order(
        &txn,
        order_id,
        Condition::all().add(OrderCol::SellerId.eq(seller.id)),
    )
    .await?;

    let next = advance_order(Some(order.status), intent).map_err(|_| {
        AppError::BadRequest(format!(
            "Cannot move an order from {:?} to {:?}.",
            order.status, target
        ))
    })?;

    let now: DateTime<FixedOffset> = Utc::now().into();

    if next == OrderStatus::Completed {
        settle_listing(&txn, order.listing_id, ListingEvent::Sell, now).await?;
    }

    let previous = order.status;
    let mut active: OrderActive = order.into();
    active.status = Set(next);
    active.updated_at = Set(now);
    let order = active.update(&txn).await?;

    txn.commit().await?;

    tracing::info!(order_id = %order.id, from = ?previous, to = ?next, "order status changed");

    if let Err(err) = log_audit(
        &state.orm,
        Some(seller.user_id),
        "order_status_update",
        Some("pickup_orders"),
        Some(serde_json::json!({ "order_id": order.id, "status": next })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(ApiResponse::success("Order updated", order.into(), None))
}
