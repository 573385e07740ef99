#![allow(dead_code)]

use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::{ActiveModelTrait, ConnectOptions, Database, EntityTrait, PaginatorTrait, Set};
use scrap_market_api::{
    config::AppConfig,
    db::run_migrations,
    entity::{
        Bids, Categories, PickupOrders,
        buyer_profiles::{self, ActiveModel as BuyerActive},
        categories,
        listings::{self, ActiveModel as ListingActive, ListingStatus},
        seller_profiles::{self, ActiveModel as SellerActive},
        users::{ActiveModel as UserActive, Role},
    },
    services::category_service::ensure_default_categories,
    state::AppState,
};
use uuid::Uuid;

pub const PICKUP: &str = "2026-11-20T10:30";

pub fn test_config() -> AppConfig {
    AppConfig {
        database_url: "sqlite::memory:".into(),
        host: "127.0.0.1".into(),
        port: 0,
        jwt_secret: "test-secret".into(),
        timezone: chrono_tz::Asia::Kolkata,
        db_max_connections: 1,
    }
}

/// Fresh in-memory database with the full schema and default categories.
///
/// A single connection keeps every query on the same in-memory database, so
/// tests must not touch `state.orm` while a transaction is open.
pub async fn setup_state() -> anyhow::Result<AppState> {
    let config = test_config();
    let mut options = ConnectOptions::new(config.database_url.clone());
    options
        .max_connections(1)
        .min_connections(1)
        .sqlx_logging(false);
    let orm = Database::connect(options).await?;
    run_migrations(&orm).await?;
    ensure_default_categories(&orm).await?;
    Ok(AppState::new(orm, &config))
}

async fn create_user(state: &AppState, username: &str, role: Role) -> anyhow::Result<Uuid> {
    let user = UserActive {
        id: Set(Uuid::new_v4()),
        username: Set(username.to_string()),
        email: Set(format!("{username}@example.com")),
        first_name: Set(username.to_string()),
        last_name: Set(String::new()),
        password_hash: Set("not-a-real-hash".into()),
        role: Set(role),
        created_at: Set(Utc::now().into()),
    }
    .insert(&state.orm)
    .await?;
    Ok(user.id)
}

pub async fn buyer(state: &AppState, username: &str) -> anyhow::Result<buyer_profiles::Model> {
    let user_id = create_user(state, username, Role::Buyer).await?;
    let now = Utc::now();
    Ok(BuyerActive {
        id: Set(Uuid::new_v4()),
        user_id: Set(user_id),
        business_name: Set(format!("{username} recyclers")),
        phone_number: Set("9800000000".into()),
        address: Set(String::new()),
        created_at: Set(now.into()),
        updated_at: Set(now.into()),
    }
    .insert(&state.orm)
    .await?)
}

pub async fn seller(state: &AppState, username: &str) -> anyhow::Result<seller_profiles::Model> {
    let user_id = create_user(state, username, Role::Seller).await?;
    let now = Utc::now();
    Ok(SellerActive {
        id: Set(Uuid::new_v4()),
        user_id: Set(user_id),
        business_name: Set(format!("{username} scrap yard")),
        phone_number: Set("9811111111".into()),
        pickup_address: Set("12 Industrial Estate, Pune".into()),
        created_at: Set(now.into()),
        updated_at: Set(now.into()),
    }
    .insert(&state.orm)
    .await?)
}

pub async fn any_category(state: &AppState) -> anyhow::Result<categories::Model> {
    Categories::find()
        .one(&state.orm)
        .await?
        .ok_or_else(|| anyhow::anyhow!("default categories missing"))
}

pub async fn listing(
    state: &AppState,
    seller: &seller_profiles::Model,
    quantity_kg: Decimal,
    price_per_kg: Decimal,
    status: ListingStatus,
) -> anyhow::Result<listings::Model> {
    let category = any_category(state).await?;
    let now = Utc::now();
    Ok(ListingActive {
        id: Set(Uuid::new_v4()),
        seller_id: Set(seller.id),
        category_id: Set(category.id),
        description: Set("Sorted PET bottles".into()),
        quantity_kg: Set(quantity_kg),
        price_per_kg: Set(price_per_kg),
        location: Set("Hadapsar".into()),
        status: Set(status),
        created_at: Set(now.into()),
        updated_at: Set(now.into()),
    }
    .insert(&state.orm)
    .await?)
}

pub async fn bid_and_order_counts(state: &AppState) -> anyhow::Result<(u64, u64)> {
    let bids = Bids::find().count(&state.orm).await?;
    let orders = PickupOrders::find().count(&state.orm).await?;
    Ok((bids, orders))
}
