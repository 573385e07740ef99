mod common;

use chrono::{DateTime, FixedOffset, Utc};
use rust_decimal_macros::dec;
use sea_orm::{ActiveModelTrait, EntityTrait, Set};
use scrap_market_api::{
    entity::{
        Bids, Listings, PickupOrders,
        bids::{self, ActiveModel as BidActive, BidStatus},
        listings::ListingStatus,
        pickup_orders::{self, OrderStatus},
    },
    error::AppError,
    middleware::auth::Principal,
    pickup_time::PickupTimeError,
    routes::params::OrderListQuery,
    services::{
        booking_service::{
            BookingError, BookingOutcome, DIRECT_BOOKING_MESSAGE, book_listing, insert_direct_bid,
        },
        order_service,
    },
};
use uuid::Uuid;

use common::{PICKUP, bid_and_order_counts, buyer, listing, seller, setup_state};

fn expect_booked(outcome: BookingOutcome) -> (pickup_orders::Model, bids::Model) {
    match outcome {
        BookingOutcome::Booked { order, bid } => (order, bid),
        other => panic!("expected a booking, got {other:?}"),
    }
}

#[tokio::test]
async fn booking_reserves_listing_and_confirms_order() -> anyhow::Result<()> {
    let state = setup_state().await?;
    let seller = seller(&state, "seller1").await?;
    let buyer = buyer(&state, "buyer1").await?;
    let listing = listing(&state, &seller, dec!(100.00), dec!(50.00), ListingStatus::Available).await?;

    let outcome = book_listing(&state, &buyer, listing.id, PICKUP).await?;
    let (order, bid) = expect_booked(outcome);

    assert_eq!(bid.status, BidStatus::Accepted);
    assert_eq!(bid.quantity_kg, dec!(100.00));
    assert_eq!(bid.price_per_kg, dec!(50.00));
    assert_eq!(bid.message, DIRECT_BOOKING_MESSAGE);

    assert_eq!(order.status, OrderStatus::Confirmed);
    assert_eq!(order.bid_id, bid.id);
    assert_eq!(order.seller_id, seller.id);
    assert_eq!(order.pickup_address, seller.pickup_address);
    assert_eq!(order.total_amount, dec!(5000.00));

    // 10:30 in Kolkata is 05:00 UTC.
    let pickup = order.scheduled_pickup_at.expect("pickup time stored");
    assert_eq!(pickup.with_timezone(&Utc).to_rfc3339(), "2026-11-20T05:00:00+00:00");

    let stored = Listings::find_by_id(listing.id).one(&state.orm).await?.expect("listing");
    assert_eq!(stored.status, ListingStatus::Reserved);
    assert_eq!(bid_and_order_counts(&state).await?, (1, 1));
    Ok(())
}

#[tokio::test]
async fn booking_twice_is_already_booked() -> anyhow::Result<()> {
    let state = setup_state().await?;
    let seller = seller(&state, "seller1").await?;
    let buyer = buyer(&state, "buyer1").await?;
    let listing = listing(&state, &seller, dec!(20), dec!(12.5), ListingStatus::Available).await?;

    let first = book_listing(&state, &buyer, listing.id, PICKUP).await?;
    let (order, _) = expect_booked(first);

    let second = book_listing(&state, &buyer, listing.id, "2026-11-21 09:00").await?;
    match second {
        BookingOutcome::AlreadyBooked(Some(existing)) => assert_eq!(existing.id, order.id),
        other => panic!("expected AlreadyBooked, got {other:?}"),
    }

    assert_eq!(bid_and_order_counts(&state).await?, (1, 1));
    Ok(())
}

/// The test pool has a single connection, so the second booking waits for the
/// first to commit. This pins down what the loser sees: a reserved listing,
/// `ListingNotAvailable` and no extra rows. The insert race on the same
/// buyer is covered by `losing_bid_insert_is_already_booked`.
#[tokio::test]
async fn concurrent_bookings_have_one_winner() -> anyhow::Result<()> {
    let state = setup_state().await?;
    let seller = seller(&state, "seller1").await?;
    let first_buyer = buyer(&state, "buyer1").await?;
    let second_buyer = buyer(&state, "buyer2").await?;
    let listing = listing(&state, &seller, dec!(5), dec!(8), ListingStatus::Available).await?;

    let (a, b) = tokio::join!(
        book_listing(&state, &first_buyer, listing.id, PICKUP),
        book_listing(&state, &second_buyer, listing.id, PICKUP),
    );

    let results = [a, b];
    let booked = results
        .iter()
        .filter(|r| matches!(r, Ok(BookingOutcome::Booked { .. })))
        .count();
    let refused = results
        .iter()
        .filter(|r| matches!(r, Err(BookingError::ListingNotAvailable)))
        .count();
    assert_eq!((booked, refused), (1, 1), "{results:?}");

    assert_eq!(bid_and_order_counts(&state).await?, (1, 1));
    Ok(())
}

#[tokio::test]
async fn losing_bid_insert_is_already_booked() -> anyhow::Result<()> {
    let state = setup_state().await?;
    let seller = seller(&state, "seller1").await?;
    let buyer = buyer(&state, "buyer1").await?;
    let listing = listing(&state, &seller, dec!(5), dec!(8), ListingStatus::Available).await?;
    let now: DateTime<FixedOffset> = Utc::now().into();

    let first = insert_direct_bid(&state.orm, &listing, buyer.id, now).await?;
    assert!(first.is_some());

    // Same (listing, buyer) pair as a request that checked before the first
    // insert landed.
    let second = insert_direct_bid(&state.orm, &listing, buyer.id, now).await?;
    assert!(second.is_none());

    assert_eq!(bid_and_order_counts(&state).await?, (1, 0));
    Ok(())
}

#[tokio::test]
async fn cancelled_orders_leave_the_seller_list() -> anyhow::Result<()> {
    let state = setup_state().await?;
    let seller = seller(&state, "seller1").await?;
    let buyer = buyer(&state, "buyer1").await?;
    let listing = listing(&state, &seller, dec!(5), dec!(8), ListingStatus::Available).await?;

    let (order, _) = expect_booked(book_listing(&state, &buyer, listing.id, PICKUP).await?);
    let before = order_service::list_seller_orders(&state, &seller, OrderListQuery::default())
        .await?
        .data
        .expect("orders");
    assert_eq!(before.items.len(), 1);

    order_service::cancel_order(&state, &Principal::Buyer(buyer.clone()), order.id).await?;

    let after = order_service::list_seller_orders(&state, &seller, OrderListQuery::default())
        .await?;
    assert_eq!(after.meta.as_ref().and_then(|m| m.total), Some(0));
    assert!(after.data.expect("orders").items.is_empty());
    Ok(())
}

#[tokio::test]
async fn bad_pickup_time_writes_nothing() -> anyhow::Result<()> {
    let state = setup_state().await?;
    let seller = seller(&state, "seller1").await?;
    let buyer = buyer(&state, "buyer1").await?;
    let listing = listing(&state, &seller, dec!(5), dec!(8), ListingStatus::Available).await?;

    let blank = book_listing(&state, &buyer, listing.id, "   ").await;
    assert!(matches!(
        blank,
        Err(BookingError::InvalidPickupTime(PickupTimeError::Missing))
    ));

    let garbage = book_listing(&state, &buyer, listing.id, "next tuesday").await;
    assert!(matches!(
        garbage,
        Err(BookingError::InvalidPickupTime(PickupTimeError::Invalid))
    ));

    assert_eq!(bid_and_order_counts(&state).await?, (0, 0));
    let stored = Listings::find_by_id(listing.id).one(&state.orm).await?.expect("listing");
    assert_eq!(stored.status, ListingStatus::Available);
    Ok(())
}

#[tokio::test]
async fn unavailable_or_missing_listing_is_refused() -> anyhow::Result<()> {
    let state = setup_state().await?;
    let seller = seller(&state, "seller1").await?;
    let buyer = buyer(&state, "buyer1").await?;

    for status in [ListingStatus::Reserved, ListingStatus::Sold, ListingStatus::Inactive] {
        let listing = listing(&state, &seller, dec!(5), dec!(8), status).await?;
        let result = book_listing(&state, &buyer, listing.id, PICKUP).await;
        assert!(
            matches!(result, Err(BookingError::ListingNotAvailable)),
            "{status:?}: {result:?}"
        );
    }

    let missing = book_listing(&state, &buyer, Uuid::new_v4(), PICKUP).await;
    assert!(matches!(missing, Err(BookingError::ListingNotAvailable)));

    assert_eq!(bid_and_order_counts(&state).await?, (0, 0));
    Ok(())
}

#[tokio::test]
async fn pending_bid_is_overwritten_on_booking() -> anyhow::Result<()> {
    let state = setup_state().await?;
    let seller = seller(&state, "seller1").await?;
    let buyer = buyer(&state, "buyer1").await?;
    let listing = listing(&state, &seller, dec!(40), dec!(15), ListingStatus::Available).await?;

    let now = Utc::now();
    let pending = BidActive {
        id: Set(Uuid::new_v4()),
        listing_id: Set(listing.id),
        buyer_id: Set(buyer.id),
        quantity_kg: Set(dec!(10)),
        price_per_kg: Set(dec!(9)),
        message: Set("Can you do 9 per kg?".into()),
        status: Set(BidStatus::Pending),
        created_at: Set(now.into()),
        updated_at: Set(now.into()),
    }
    .insert(&state.orm)
    .await?;

    let outcome = book_listing(&state, &buyer, listing.id, PICKUP).await?;
    let (order, bid) = expect_booked(outcome);

    assert_eq!(bid.id, pending.id);
    assert_eq!(bid.status, BidStatus::Accepted);
    assert_eq!(bid.quantity_kg, dec!(40));
    assert_eq!(bid.price_per_kg, dec!(15));
    assert_eq!(bid.message, DIRECT_BOOKING_MESSAGE);
    assert_eq!(order.total_amount, dec!(600));
    assert_eq!(bid_and_order_counts(&state).await?, (1, 1));
    Ok(())
}

#[tokio::test]
async fn cancelled_booking_frees_listing_and_rebooking_reuses_rows() -> anyhow::Result<()> {
    let state = setup_state().await?;
    let seller = seller(&state, "seller1").await?;
    let buyer = buyer(&state, "buyer1").await?;
    let listing = listing(&state, &seller, dec!(20), dec!(12.5), ListingStatus::Available).await?;

    let (order, bid) = expect_booked(book_listing(&state, &buyer, listing.id, PICKUP).await?);

    let principal = Principal::Buyer(buyer.clone());
    let cancelled = order_service::cancel_order(&state, &principal, order.id)
        .await?
        .data
        .expect("order");
    assert_eq!(cancelled.status, OrderStatus::Cancelled);

    let stored_bid = Bids::find_by_id(bid.id).one(&state.orm).await?.expect("bid");
    assert_eq!(stored_bid.status, BidStatus::Withdrawn);
    let stored = Listings::find_by_id(listing.id).one(&state.orm).await?.expect("listing");
    assert_eq!(stored.status, ListingStatus::Available);

    let visible = order_service::list_buyer_orders(&state, &buyer, OrderListQuery::default())
        .await?
        .data
        .expect("orders");
    assert!(visible.items.is_empty());

    let again = book_listing(&state, &buyer, listing.id, PICKUP).await?;
    let (rebooked, rebid) = expect_booked(again);
    assert_eq!(rebid.id, bid.id);
    assert_eq!(rebid.status, BidStatus::Accepted);
    assert_eq!(rebooked.id, order.id);
    assert_eq!(rebooked.status, OrderStatus::Confirmed);
    assert_eq!(bid_and_order_counts(&state).await?, (1, 1));
    Ok(())
}

#[tokio::test]
async fn seller_cancellation_rejects_bid_and_lets_others_book() -> anyhow::Result<()> {
    let state = setup_state().await?;
    let seller = seller(&state, "seller1").await?;
    let first_buyer = buyer(&state, "buyer1").await?;
    let second_buyer = buyer(&state, "buyer2").await?;
    let listing = listing(&state, &seller, dec!(3), dec!(100), ListingStatus::Available).await?;

    let (order, bid) = expect_booked(book_listing(&state, &first_buyer, listing.id, PICKUP).await?);

    // A buyer who is not party to the order cannot see it.
    let stranger = Principal::Buyer(second_buyer.clone());
    let hidden = order_service::cancel_order(&state, &stranger, order.id).await;
    assert!(matches!(hidden, Err(AppError::NotFound)));

    order_service::cancel_order(&state, &Principal::Seller(seller.clone()), order.id).await?;
    let stored_bid = Bids::find_by_id(bid.id).one(&state.orm).await?.expect("bid");
    assert_eq!(stored_bid.status, BidStatus::Rejected);

    let outcome = book_listing(&state, &second_buyer, listing.id, PICKUP).await?;
    assert!(matches!(outcome, BookingOutcome::Booked { .. }));
    assert_eq!(bid_and_order_counts(&state).await?, (2, 2));
    Ok(())
}

#[tokio::test]
async fn completing_order_sells_listing_one_step_at_a_time() -> anyhow::Result<()> {
    let state = setup_state().await?;
    let seller = seller(&state, "seller1").await?;
    let buyer = buyer(&state, "buyer1").await?;
    let listing = listing(&state, &seller, dec!(7), dec!(30), ListingStatus::Available).await?;

    let (order, _) = expect_booked(book_listing(&state, &buyer, listing.id, PICKUP).await?);

    let skipped =
        order_service::update_order_status(&state, &seller, order.id, OrderStatus::Completed).await;
    assert!(matches!(skipped, Err(AppError::BadRequest(_))));

    let picked = order_service::update_order_status(&state, &seller, order.id, OrderStatus::PickedUp)
        .await?
        .data
        .expect("order");
    assert_eq!(picked.status, OrderStatus::PickedUp);

    let late_cancel =
        order_service::cancel_order(&state, &Principal::Buyer(buyer.clone()), order.id).await;
    assert!(matches!(late_cancel, Err(AppError::BadRequest(_))));

    order_service::update_order_status(&state, &seller, order.id, OrderStatus::Completed).await?;

    let stored_order = PickupOrders::find_by_id(order.id).one(&state.orm).await?.expect("order");
    assert_eq!(stored_order.status, OrderStatus::Completed);
    let stored = Listings::find_by_id(listing.id).one(&state.orm).await?.expect("listing");
    assert_eq!(stored.status, ListingStatus::Sold);

    let placed = order_service::update_order_status(&state, &seller, order.id, OrderStatus::Placed).await;
    assert!(matches!(placed, Err(AppError::Validation(_))));
    Ok(())
}

#[tokio::test]
async fn other_sellers_cannot_touch_the_order() -> anyhow::Result<()> {
    let state = setup_state().await?;
    let owner = seller(&state, "seller1").await?;
    let other = seller(&state, "seller2").await?;
    let buyer = buyer(&state, "buyer1").await?;
    let listing = listing(&state, &owner, dec!(2), dec!(2), ListingStatus::Available).await?;

    let (order, _) = expect_booked(book_listing(&state, &buyer, listing.id, PICKUP).await?);

    let result =
        order_service::update_order_status(&state, &other, order.id, OrderStatus::PickedUp).await;
    assert!(matches!(result, Err(AppError::NotFound)));

    let theirs = order_service::list_seller_orders(&state, &other, OrderListQuery::default())
        .await?
        .data
        .expect("orders");
    assert!(theirs.items.is_empty());

    let mine = order_service::list_seller_orders(&state, &owner, OrderListQuery::default())
        .await?
        .data
        .expect("orders");
    assert_eq!(mine.items.len(), 1);
    Ok(())
}
