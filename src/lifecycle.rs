//! State machines for listings, bids and pickup orders.
//!
//! Every status change in the services goes through one of the `advance_*`
//! functions so the set of legal moves lives in one table per record type.

use rust_decimal::Decimal;
use thiserror::Error;

use crate::entity::{
    bids::BidStatus,
    listings::{self, ListingStatus},
    pickup_orders::OrderStatus,
};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("cannot apply {intent} to {record} in state {from}")]
pub struct IllegalTransition {
    pub record: &'static str,
    pub from: String,
    pub intent: String,
}

impl IllegalTransition {
    pub(crate) fn new(record: &'static str, from: impl std::fmt::Debug, intent: impl std::fmt::Debug) -> Self {
        Self {
            record,
            from: format!("{from:?}"),
            intent: format!("{intent:?}"),
        }
    }
}

/// Listing availability guard: only `Available` listings can be booked or
/// shown in the buyer feed.
pub fn is_bookable(listing: &listings::Model) -> bool {
    listing.status == ListingStatus::Available
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListingEvent {
    Reserve,
    Release,
    Sell,
}

pub fn advance_listing(
    current: ListingStatus,
    event: ListingEvent,
) -> Result<ListingStatus, IllegalTransition> {
    use ListingEvent::*;
    use ListingStatus::*;

    match (current, event) {
        (Available, Reserve) => Ok(Reserved),
        (Reserved, Release) => Ok(Available),
        (Reserved, Sell) => Ok(Sold),
        (from, event) => Err(IllegalTransition::new("listing", from, event)),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BidIntent {
    /// Buyer books the whole listing directly.
    Book,
    /// Buyer backs out of a booking.
    Withdraw,
    /// Seller turns a booking down.
    Reject,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BidTransition {
    /// No bid row yet: insert one carrying the booking defaults.
    Create,
    /// Rewrite quantity, price, message and status with the booking defaults.
    Overwrite,
    /// Keep the accepted bid exactly as stored.
    Reuse,
    /// Change only the status column.
    SetStatus(BidStatus),
}

/// Transition table for the (listing, buyer) bid row.
///
/// | current              | Book      | Withdraw  | Reject   |
/// |----------------------|-----------|-----------|----------|
/// | none                 | Create    | -         | -        |
/// | pending              | Overwrite | withdrawn | rejected |
/// | accepted             | Reuse     | withdrawn | rejected |
/// | rejected / withdrawn | Overwrite | -         | -        |
pub fn advance_bid(
    current: Option<BidStatus>,
    intent: BidIntent,
) -> Result<BidTransition, IllegalTransition> {
    use BidStatus::*;

    match (current, intent) {
        (None, BidIntent::Book) => Ok(BidTransition::Create),
        (Some(Accepted), BidIntent::Book) => Ok(BidTransition::Reuse),
        (Some(Pending | Rejected | Withdrawn), BidIntent::Book) => Ok(BidTransition::Overwrite),
        (Some(Pending | Accepted), BidIntent::Withdraw) => Ok(BidTransition::SetStatus(Withdrawn)),
        (Some(Pending | Accepted), BidIntent::Reject) => Ok(BidTransition::SetStatus(Rejected)),
        (from, intent) => Err(IllegalTransition::new("bid", from, intent)),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderIntent {
    /// Upsert performed by a booking.
    Book,
    Confirm,
    PickUp,
    Complete,
    Cancel,
}

impl OrderIntent {
    /// Intent a seller expresses by requesting `target` as the new status.
    pub fn for_target(target: OrderStatus) -> Option<Self> {
        match target {
            OrderStatus::Placed => None,
            OrderStatus::Confirmed => Some(OrderIntent::Confirm),
            OrderStatus::PickedUp => Some(OrderIntent::PickUp),
            OrderStatus::Completed => Some(OrderIntent::Complete),
            OrderStatus::Cancelled => Some(OrderIntent::Cancel),
        }
    }
}

pub fn advance_order(
    current: Option<OrderStatus>,
    intent: OrderIntent,
) -> Result<OrderStatus, IllegalTransition> {
    use OrderStatus::*;

    match (current, intent) {
        (None | Some(Placed | Cancelled), OrderIntent::Book) => Ok(Confirmed),
        (Some(Placed), OrderIntent::Confirm) => Ok(Confirmed),
        (Some(Confirmed), OrderIntent::PickUp) => Ok(PickedUp),
        (Some(PickedUp), OrderIntent::Complete) => Ok(Completed),
        (Some(Placed | Confirmed), OrderIntent::Cancel) => Ok(Cancelled),
        (from, intent) => Err(IllegalTransition::new("order", from, intent)),
    }
}

/// Weights and per-kg prices are stored as NUMERIC(10, 2).
pub fn check_amount(value: &Decimal) -> Result<(), &'static str> {
    if *value < Decimal::new(1, 2) {
        return Err("Ensure this value is greater than or equal to 0.01.");
    }
    if value.normalize().scale() > 2 {
        return Err("Ensure that there are no more than 2 decimal places.");
    }
    if value.trunc() >= Decimal::new(100_000_000, 0) {
        return Err("Ensure that there are no more than 10 digits in total.");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn booking_creates_missing_bid() {
        assert_eq!(advance_bid(None, BidIntent::Book), Ok(BidTransition::Create));
    }

    #[test]
    fn booking_reuses_accepted_bid() {
        assert_eq!(
            advance_bid(Some(BidStatus::Accepted), BidIntent::Book),
            Ok(BidTransition::Reuse)
        );
    }

    #[test]
    fn booking_overwrites_non_accepted_bid() {
        for status in [BidStatus::Pending, BidStatus::Rejected, BidStatus::Withdrawn] {
            assert_eq!(
                advance_bid(Some(status), BidIntent::Book),
                Ok(BidTransition::Overwrite),
                "{status:?}"
            );
        }
    }

    #[test]
    fn withdraw_needs_a_live_bid() {
        assert_eq!(
            advance_bid(Some(BidStatus::Accepted), BidIntent::Withdraw),
            Ok(BidTransition::SetStatus(BidStatus::Withdrawn))
        );
        assert!(advance_bid(None, BidIntent::Withdraw).is_err());
        assert!(advance_bid(Some(BidStatus::Rejected), BidIntent::Withdraw).is_err());
    }

    #[test]
    fn reject_needs_a_live_bid() {
        assert_eq!(
            advance_bid(Some(BidStatus::Pending), BidIntent::Reject),
            Ok(BidTransition::SetStatus(BidStatus::Rejected))
        );
        assert!(advance_bid(Some(BidStatus::Withdrawn), BidIntent::Reject).is_err());
    }

    #[test]
    fn order_fulfilment_moves_one_step_at_a_time() {
        assert_eq!(
            advance_order(Some(OrderStatus::Confirmed), OrderIntent::PickUp),
            Ok(OrderStatus::PickedUp)
        );
        assert_eq!(
            advance_order(Some(OrderStatus::PickedUp), OrderIntent::Complete),
            Ok(OrderStatus::Completed)
        );
        assert!(advance_order(Some(OrderStatus::Confirmed), OrderIntent::Complete).is_err());
        assert!(advance_order(Some(OrderStatus::Completed), OrderIntent::PickUp).is_err());
    }

    #[test]
    fn booking_upsert_revives_cancelled_order_only() {
        assert_eq!(advance_order(None, OrderIntent::Book), Ok(OrderStatus::Confirmed));
        assert_eq!(
            advance_order(Some(OrderStatus::Cancelled), OrderIntent::Book),
            Ok(OrderStatus::Confirmed)
        );
        assert!(advance_order(Some(OrderStatus::Confirmed), OrderIntent::Book).is_err());
        assert!(advance_order(Some(OrderStatus::Completed), OrderIntent::Book).is_err());
    }

    #[test]
    fn cancel_only_before_pickup() {
        assert_eq!(
            advance_order(Some(OrderStatus::Confirmed), OrderIntent::Cancel),
            Ok(OrderStatus::Cancelled)
        );
        assert!(advance_order(Some(OrderStatus::PickedUp), OrderIntent::Cancel).is_err());
        assert!(advance_order(Some(OrderStatus::Cancelled), OrderIntent::Cancel).is_err());
    }

    #[test]
    fn placed_is_not_a_settable_target() {
        assert_eq!(OrderIntent::for_target(OrderStatus::Placed), None);
        assert_eq!(
            OrderIntent::for_target(OrderStatus::PickedUp),
            Some(OrderIntent::PickUp)
        );
    }

    #[test]
    fn listing_never_returns_to_available_except_by_release() {
        assert_eq!(
            advance_listing(ListingStatus::Available, ListingEvent::Reserve),
            Ok(ListingStatus::Reserved)
        );
        assert_eq!(
            advance_listing(ListingStatus::Reserved, ListingEvent::Release),
            Ok(ListingStatus::Available)
        );
        assert!(advance_listing(ListingStatus::Reserved, ListingEvent::Reserve).is_err());
        assert!(advance_listing(ListingStatus::Sold, ListingEvent::Release).is_err());
        assert!(advance_listing(ListingStatus::Available, ListingEvent::Sell).is_err());
    }

    #[test]
    fn amounts_follow_numeric_10_2() {
        assert!(check_amount(&dec("0.01")).is_ok());
        assert!(check_amount(&dec("12.50")).is_ok());
        assert!(check_amount(&dec("99999999.99")).is_ok());
        assert!(check_amount(&dec("0")).is_err());
        assert!(check_amount(&dec("-5")).is_err());
        assert!(check_amount(&dec("0.005")).is_err());
        assert!(check_amount(&dec("1.234")).is_err());
        assert!(check_amount(&dec("100000000")).is_err());
    }
}
