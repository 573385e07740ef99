use chrono::{DateTime, FixedOffset, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::entity::{
    bids::{self, BidStatus},
    buyer_profiles, categories,
    listings::{self, ListingStatus},
    pickup_orders::{self, OrderStatus},
    seller_profiles,
    users::{self, Role},
};

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct User {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub role: Role,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct BuyerProfile {
    pub id: Uuid,
    pub user_id: Uuid,
    pub business_name: String,
    pub phone_number: String,
    pub address: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct SellerProfile {
    pub id: Uuid,
    pub user_id: Uuid,
    pub business_name: String,
    pub phone_number: String,
    pub pickup_address: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct Category {
    pub id: Uuid,
    pub name: String,
    pub description: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Listing {
    pub id: Uuid,
    pub seller_id: Uuid,
    pub category_id: Uuid,
    pub description: String,
    pub quantity_kg: Decimal,
    pub price_per_kg: Decimal,
    pub location: String,
    pub status: ListingStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Bid {
    pub id: Uuid,
    pub listing_id: Uuid,
    pub buyer_id: Uuid,
    pub quantity_kg: Decimal,
    pub price_per_kg: Decimal,
    pub total_value: Decimal,
    pub message: String,
    pub status: BidStatus,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct PickupOrder {
    pub id: Uuid,
    pub listing_id: Uuid,
    pub bid_id: Uuid,
    pub buyer_id: Uuid,
    pub seller_id: Uuid,
    pub scheduled_pickup_at: Option<DateTime<FixedOffset>>,
    pub pickup_address: String,
    pub status: OrderStatus,
    pub total_amount: Decimal,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<users::Model> for User {
    fn from(model: users::Model) -> Self {
        Self {
            id: model.id,
            username: model.username,
            email: model.email,
            first_name: model.first_name,
            last_name: model.last_name,
            role: model.role,
            created_at: model.created_at.with_timezone(&Utc),
        }
    }
}

impl From<buyer_profiles::Model> for BuyerProfile {
    fn from(model: buyer_profiles::Model) -> Self {
        Self {
            id: model.id,
            user_id: model.user_id,
            business_name: model.business_name,
            phone_number: model.phone_number,
            address: model.address,
        }
    }
}

impl From<seller_profiles::Model> for SellerProfile {
    fn from(model: seller_profiles::Model) -> Self {
        Self {
            id: model.id,
            user_id: model.user_id,
            business_name: model.business_name,
            phone_number: model.phone_number,
            pickup_address: model.pickup_address,
        }
    }
}

impl From<categories::Model> for Category {
    fn from(model: categories::Model) -> Self {
        Self {
            id: model.id,
            name: model.name,
            description: model.description,
        }
    }
}

impl From<listings::Model> for Listing {
    fn from(model: listings::Model) -> Self {
        Self {
            id: model.id,
            seller_id: model.seller_id,
            category_id: model.category_id,
            description: model.description,
            quantity_kg: model.quantity_kg,
            price_per_kg: model.price_per_kg,
            location: model.location,
            status: model.status,
            created_at: model.created_at.with_timezone(&Utc),
            updated_at: model.updated_at.with_timezone(&Utc),
        }
    }
}

impl From<bids::Model> for Bid {
    fn from(model: bids::Model) -> Self {
        Self {
            total_value: model.total_value(),
            id: model.id,
            listing_id: model.listing_id,
            buyer_id: model.buyer_id,
            quantity_kg: model.quantity_kg,
            price_per_kg: model.price_per_kg,
            message: model.message,
            status: model.status,
            created_at: model.created_at.with_timezone(&Utc),
        }
    }
}

impl From<pickup_orders::Model> for PickupOrder {
    fn from(model: pickup_orders::Model) -> Self {
        Self {
            id: model.id,
            listing_id: model.listing_id,
            bid_id: model.bid_id,
            buyer_id: model.buyer_id,
            seller_id: model.seller_id,
            scheduled_pickup_at: model.scheduled_pickup_at,
            pickup_address: model.pickup_address,
            status: model.status,
            total_amount: model.total_amount,
            created_at: model.created_at.with_timezone(&Utc),
            updated_at: model.updated_at.with_timezone(&Utc),
        }
    }
}
