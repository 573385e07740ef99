//! Booking transaction coordinator.
//!
//! A booking turns an available listing into an accepted bid, a confirmed
//! pickup order and a reserved listing. The three writes commit together or
//! not at all; the listing row is locked for the whole transaction and its
//! status is written with a compare-and-set so two buyers can never both win.

use chrono::{DateTime, FixedOffset, Utc};
use sea_orm::sea_query::{Expr, LockType};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DbErr, EntityTrait, QueryFilter, QuerySelect,
    Set, SqlErr, TransactionTrait,
};
use thiserror::Error;
use uuid::Uuid;

use crate::{
    audit::log_audit,
    entity::{
        bids::{self, ActiveModel as BidActive, BidStatus, Column as BidCol, Entity as Bids},
        buyer_profiles,
        listings::{self, Column as ListingCol, Entity as Listings, ListingStatus},
        pickup_orders::{
            self, ActiveModel as OrderActive, Column as OrderCol, Entity as PickupOrders,
            OrderStatus,
        },
        seller_profiles::Entity as SellerProfiles,
    },
    error::AppError,
    lifecycle::{
        BidIntent, BidTransition, IllegalTransition, ListingEvent, OrderIntent, advance_bid,
        advance_listing, advance_order, is_bookable,
    },
    pickup_time::{PickupTimeError, parse_pickup_time},
    state::AppState,
};

pub const DIRECT_BOOKING_MESSAGE: &str = "Booked directly from buyer dashboard.";

#[derive(Debug)]
pub enum BookingOutcome {
    Booked {
        order: pickup_orders::Model,
        bid: bids::Model,
    },
    /// The buyer already holds a live order on this listing. The order is
    /// absent when a concurrent request from the same buyer won the race and
    /// has not committed yet.
    AlreadyBooked(Option<pickup_orders::Model>),
}

#[derive(Debug, Error)]
pub enum BookingError {
    #[error(transparent)]
    InvalidPickupTime(#[from] PickupTimeError),

    #[error("This listing is not available.")]
    ListingNotAvailable,

    #[error(transparent)]
    Conflict(#[from] IllegalTransition),

    #[error("booking storage failure")]
    Storage(#[from] DbErr),
}

impl From<BookingError> for AppError {
    fn from(err: BookingError) -> Self {
        match err {
            BookingError::InvalidPickupTime(e) => {
                AppError::field("scheduled_pickup_at", e.to_string())
            }
            BookingError::ListingNotAvailable => AppError::NotAvailable(err.to_string()),
            BookingError::Conflict(e) => AppError::BadRequest(e.to_string()),
            BookingError::Storage(e) => AppError::OrmError(e),
        }
    }
}

pub(crate) fn is_unique_violation(err: &DbErr) -> bool {
    matches!(err.sql_err(), Some(SqlErr::UniqueConstraintViolation(_)))
}

/// Insert the accepted bid of a direct booking. Returns `None` when the
/// buyer already holds a bid on the listing, which only happens when a
/// concurrent booking from the same buyer inserted it first.
pub async fn insert_direct_bid<C: ConnectionTrait>(
    conn: &C,
    listing: &listings::Model,
    buyer_id: Uuid,
    now: DateTime<FixedOffset>,
) -> Result<Option<bids::Model>, DbErr> {
    let inserted = BidActive {
        id: Set(Uuid::new_v4()),
        listing_id: Set(listing.id),
        buyer_id: Set(buyer_id),
        quantity_kg: Set(listing.quantity_kg),
        price_per_kg: Set(listing.price_per_kg),
        message: Set(DIRECT_BOOKING_MESSAGE.to_string()),
        status: Set(BidStatus::Accepted),
        created_at: Set(now),
        updated_at: Set(now),
    }
    .insert(conn)
    .await;

    match inserted {
        Ok(bid) => Ok(Some(bid)),
        Err(err) if is_unique_violation(&err) => {
            tracing::info!(listing_id = %listing.id, buyer_id = %buyer_id, "lost bid insert race");
            Ok(None)
        }
        Err(err) => Err(err),
    }
}

/// Book a whole listing for `buyer` with a pickup at `pickup_input`.
pub async fn book_listing(
    state: &AppState,
    buyer: &buyer_profiles::Model,
    listing_id: Uuid,
    pickup_input: &str,
) -> Result<BookingOutcome, BookingError> {
    let scheduled_pickup_at = parse_pickup_time(pickup_input, state.timezone)?;

    let txn = state.orm.begin().await?;

    let listing = Listings::find_by_id(listing_id)
        .lock(LockType::Update)
        .one(&txn)
        .await?;
    let listing = match listing {
        Some(l) => l,
        None => return Err(BookingError::ListingNotAvailable),
    };

    let existing_order = PickupOrders::find()
        .filter(OrderCol::BuyerId.eq(buyer.id))
        .filter(OrderCol::ListingId.eq(listing.id))
        .filter(OrderCol::Status.ne(OrderStatus::Cancelled))
        .one(&txn)
        .await?;
    if let Some(order) = existing_order {
        tracing::debug!(order_id = %order.id, "listing already booked by buyer");
        return Ok(BookingOutcome::AlreadyBooked(Some(order)));
    }

    if !is_bookable(&listing) {
        return Err(BookingError::ListingNotAvailable);
    }
    let reserved = advance_listing(listing.status, ListingEvent::Reserve)?;

    let seller = SellerProfiles::find_by_id(listing.seller_id)
        .one(&txn)
        .await?
        .ok_or(BookingError::ListingNotAvailable)?;

    let now: DateTime<FixedOffset> = Utc::now().into();

    let existing_bid = Bids::find()
        .filter(BidCol::ListingId.eq(listing.id))
        .filter(BidCol::BuyerId.eq(buyer.id))
        .lock(LockType::Update)
        .one(&txn)
        .await?;

    let transition = advance_bid(existing_bid.as_ref().map(|b| b.status), BidIntent::Book)?;
    let bid = match (transition, existing_bid) {
        (BidTransition::Create, _) => match insert_direct_bid(&txn, &listing, buyer.id, now).await? {
            Some(bid) => bid,
            None => return Ok(BookingOutcome::AlreadyBooked(None)),
        },
        (BidTransition::Overwrite, Some(bid)) => {
            let mut active: BidActive = bid.into();
            active.quantity_kg = Set(listing.quantity_kg);
            active.price_per_kg = Set(listing.price_per_kg);
            active.status = Set(BidStatus::Accepted);
            active.message = Set(DIRECT_BOOKING_MESSAGE.to_string());
            active.updated_at = Set(now);
            active.update(&txn).await?
        }
        (BidTransition::Reuse, Some(bid)) => bid,
        (transition, _) => {
            return Err(IllegalTransition::new("bid", transition, BidIntent::Book).into());
        }
    };

    let existing_order = PickupOrders::find()
        .filter(OrderCol::BidId.eq(bid.id))
        .lock(LockType::Update)
        .one(&txn)
        .await?;
    let order_status = advance_order(existing_order.as_ref().map(|o| o.status), OrderIntent::Book)?;
    let total_amount = bid.total_value();

    let order = match existing_order {
        Some(order) => {
            let mut active: OrderActive = order.into();
            active.listing_id = Set(listing.id);
            active.buyer_id = Set(buyer.id);
            active.seller_id = Set(seller.id);
            active.scheduled_pickup_at = Set(Some(scheduled_pickup_at));
            active.pickup_address = Set(seller.pickup_address.clone());
            active.status = Set(order_status);
            active.total_amount = Set(total_amount);
            active.updated_at = Set(now);
            active.update(&txn).await?
        }
        None => {
            let inserted = OrderActive {
                id: Set(Uuid::new_v4()),
                listing_id: Set(listing.id),
                bid_id: Set(bid.id),
                buyer_id: Set(buyer.id),
                seller_id: Set(seller.id),
                scheduled_pickup_at: Set(Some(scheduled_pickup_at)),
                pickup_address: Set(seller.pickup_address.clone()),
                status: Set(order_status),
                total_amount: Set(total_amount),
                created_at: Set(now),
                updated_at: Set(now),
            }
            .insert(&txn)
            .await;
            match inserted {
                Ok(order) => order,
                Err(err) if is_unique_violation(&err) => {
                    return Ok(BookingOutcome::AlreadyBooked(None));
                }
                Err(err) => return Err(err.into()),
            }
        }
    };

    // Compare-and-set: a concurrent booking that already reserved the listing
    // leaves zero rows to update.
    let result = Listings::update_many()
        .col_expr(ListingCol::Status, Expr::value(reserved))
        .col_expr(ListingCol::UpdatedAt, Expr::value(now))
        .filter(ListingCol::Id.eq(listing.id))
        .filter(ListingCol::Status.eq(ListingStatus::Available))
        .exec(&txn)
        .await?;
    if result.rows_affected != 1 {
        return Err(BookingError::ListingNotAvailable);
    }

    txn.commit().await?;

    tracing::info!(
        order_id = %order.id,
        listing_id = %listing.id,
        buyer_id = %buyer.id,
        total_amount = %order.total_amount,
        "booking confirmed"
    );

    if let Err(err) = log_audit(
        &state.orm,
        Some(buyer.user_id),
        "listing_booked",
        Some("pickup_orders"),
        Some(serde_json::json!({ "order_id": order.id, "listing_id": listing.id })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(BookingOutcome::Booked { order, bid })
}
