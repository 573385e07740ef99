use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema, EnumIter, DeriveActiveEnum,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(15))")]
#[serde(rename_all = "snake_case")]
pub enum BidStatus {
    #[sea_orm(string_value = "pending")]
    Pending,
    #[sea_orm(string_value = "accepted")]
    Accepted,
    #[sea_orm(string_value = "rejected")]
    Rejected,
    #[sea_orm(string_value = "withdrawn")]
    Withdrawn,
}

/// One row per (listing, buyer); the pair is unique in storage.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "bids")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub listing_id: Uuid,
    pub buyer_id: Uuid,
    pub quantity_kg: Decimal,
    pub price_per_kg: Decimal,
    #[sea_orm(column_type = "Text")]
    pub message: String,
    pub status: BidStatus,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

impl Model {
    pub fn total_value(&self) -> Decimal {
        self.quantity_kg * self.price_per_kg
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::listings::Entity",
        from = "Column::ListingId",
        to = "super::listings::Column::Id"
    )]
    Listings,
    #[sea_orm(
        belongs_to = "super::buyer_profiles::Entity",
        from = "Column::BuyerId",
        to = "super::buyer_profiles::Column::Id"
    )]
    BuyerProfiles,
    #[sea_orm(has_one = "super::pickup_orders::Entity")]
    PickupOrders,
}

impl Related<super::listings::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Listings.def()
    }
}

impl Related<super::buyer_profiles::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::BuyerProfiles.def()
    }
}

impl Related<super::pickup_orders::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::PickupOrders.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
