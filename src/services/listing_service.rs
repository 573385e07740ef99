use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, ConnectionTrait, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect, Set,
};
use uuid::Uuid;
use validator::Validate;

use crate::{
    audit::log_audit,
    dto::listings::{ListingFields, ListingList, SellerDashboard},
    entity::{
        categories::Entity as Categories,
        listings::{ActiveModel as ListingActive, Column as ListingCol, Entity as Listings, ListingStatus},
        pickup_orders::{Column as OrderCol, Entity as PickupOrders, OrderStatus},
        seller_profiles,
    },
    error::{AppError, AppResult},
    models::Listing,
    response::ApiResponse,
    routes::params::{AvailableListingQuery, SellerListingQuery, SortOrder},
    state::AppState,
};

const RECENT_BOOKINGS: u64 = 10;

async fn ensure_category<C: ConnectionTrait>(conn: &C, category_id: Uuid) -> AppResult<()> {
    if Categories::find_by_id(category_id).one(conn).await?.is_none() {
        return Err(AppError::field(
            "category_id",
            "Select a valid choice. That choice is not one of the available choices.",
        ));
    }
    Ok(())
}

pub async fn create_listing(
    state: &AppState,
    seller: &seller_profiles::Model,
    payload: ListingFields,
) -> AppResult<ApiResponse<Listing>> {
    let fields = payload.trimmed();
    fields.validate()?;
    ensure_category(&state.orm, fields.category_id).await?;

    let now = Utc::now();
    let listing = ListingActive {
        id: Set(Uuid::new_v4()),
        seller_id: Set(seller.id),
        category_id: Set(fields.category_id),
        description: Set(fields.description),
        quantity_kg: Set(fields.quantity_kg),
        price_per_kg: Set(fields.price_per_kg),
        location: Set(fields.location),
        status: Set(ListingStatus::Available),
        created_at: Set(now.into()),
        updated_at: Set(now.into()),
    }
    .insert(&state.orm)
    .await?;

    tracing::info!(listing_id = %listing.id, seller_id = %seller.id, "listing created");

    if let Err(err) = log_audit(
        &state.orm,
        Some(seller.user_id),
        "listing_create",
        Some("listings"),
        Some(serde_json::json!({ "listing_id": listing.id })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(ApiResponse::success("Listing created", listing.into(), None))
}

/// Replace the editable content of a listing. Status is untouched; a
/// reserved or sold listing keeps its state.
pub async fn update_listing(
    state: &AppState,
    seller: &seller_profiles::Model,
    listing_id: Uuid,
    payload: ListingFields,
) -> AppResult<ApiResponse<Listing>> {
    let fields = payload.trimmed();
    fields.validate()?;

    let existing = Listings::find_by_id(listing_id)
        .filter(ListingCol::SellerId.eq(seller.id))
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)?;

    ensure_category(&state.orm, fields.category_id).await?;

    let mut active: ListingActive = existing.into();
    active.category_id = Set(fields.category_id);
    active.description = Set(fields.description);
    active.quantity_kg = Set(fields.quantity_kg);
    active.price_per_kg = Set(fields.price_per_kg);
    active.location = Set(fields.location);
    active.updated_at = Set(Utc::now().into());
    let listing = active.update(&state.orm).await?;

    tracing::info!(listing_id = %listing.id, "listing updated");

    if let Err(err) = log_audit(
        &state.orm,
        Some(seller.user_id),
        "listing_update",
        Some("listings"),
        Some(serde_json::json!({ "listing_id": listing.id })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(ApiResponse::success("Listing updated", listing.into(), None))
}

/// Buyer feed: only listings that can still be booked.
pub async fn list_available_listings(
    state: &AppState,
    query: AvailableListingQuery,
) -> AppResult<ApiResponse<ListingList>> {
    let (page, per_page, offset) = query.pagination().normalize();

    let mut condition = Condition::all().add(ListingCol::Status.eq(ListingStatus::Available));
    if let Some(category_id) = query.category_id {
        condition = condition.add(ListingCol::CategoryId.eq(category_id));
    }

    let finder = Listings::find().filter(condition);
    let finder = match query.sort_order.unwrap_or(SortOrder::Desc) {
        SortOrder::Asc => finder.order_by_asc(ListingCol::CreatedAt),
        SortOrder::Desc => finder.order_by_desc(ListingCol::CreatedAt),
    };

    let total = finder.clone().count(&state.orm).await? as i64;
    let items = finder
        .limit(per_page as u64)
        .offset(offset as u64)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(Listing::from)
        .collect();

    Ok(ApiResponse::paged("Ok", ListingList { items }, page, per_page, total))
}

pub async fn list_seller_listings(
    state: &AppState,
    seller: &seller_profiles::Model,
    query: SellerListingQuery,
) -> AppResult<ApiResponse<ListingList>> {
    let (page, per_page, offset) = query.pagination().normalize();

    let mut finder = Listings::find().filter(ListingCol::SellerId.eq(seller.id));
    if let Some(status) = query.status {
        finder = finder.filter(ListingCol::Status.eq(status));
    }
    let finder = finder.order_by_desc(ListingCol::CreatedAt);

    let total = finder.clone().count(&state.orm).await? as i64;
    let items = finder
        .limit(per_page as u64)
        .offset(offset as u64)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(Listing::from)
        .collect();

    Ok(ApiResponse::paged("Ok", ListingList { items }, page, per_page, total))
}

pub async fn get_seller_listing(
    state: &AppState,
    seller: &seller_profiles::Model,
    listing_id: Uuid,
) -> AppResult<ApiResponse<Listing>> {
    let listing = Listings::find_by_id(listing_id)
        .filter(ListingCol::SellerId.eq(seller.id))
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)?;

    Ok(ApiResponse::success("Ok", listing.into(), None))
}

pub async fn seller_dashboard(
    state: &AppState,
    seller: &seller_profiles::Model,
) -> AppResult<ApiResponse<SellerDashboard>> {
    let listings = Listings::find()
        .filter(ListingCol::SellerId.eq(seller.id))
        .order_by_desc(ListingCol::CreatedAt)
        .all(&state.orm)
        .await?;

    let available_listings_count = listings
        .iter()
        .filter(|l| l.status == ListingStatus::Available)
        .count() as u64;

    let bookings = PickupOrders::find()
        .filter(OrderCol::SellerId.eq(seller.id))
        .filter(OrderCol::Status.ne(OrderStatus::Cancelled));

    let bookings_count = bookings.clone().count(&state.orm).await?;
    let recent = bookings
        .order_by_desc(OrderCol::CreatedAt)
        .limit(RECENT_BOOKINGS)
        .all(&state.orm)
        .await?;

    let dashboard = SellerDashboard {
        total_listings_count: listings.len() as u64,
        available_listings_count,
        bookings_count,
        listings: listings.into_iter().map(Listing::from).collect(),
        bookings: recent.into_iter().map(Into::into).collect(),
    };

    Ok(ApiResponse::success("Ok", dashboard, None))
}
