use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema, EnumIter, DeriveActiveEnum,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(15))")]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    #[sea_orm(string_value = "placed")]
    Placed,
    #[sea_orm(string_value = "confirmed")]
    Confirmed,
    #[sea_orm(string_value = "picked_up")]
    PickedUp,
    #[sea_orm(string_value = "completed")]
    Completed,
    #[sea_orm(string_value = "cancelled")]
    Cancelled,
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "pickup_orders")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub listing_id: Uuid,
    #[sea_orm(unique)]
    pub bid_id: Uuid,
    pub buyer_id: Uuid,
    pub seller_id: Uuid,
    pub scheduled_pickup_at: Option<DateTimeWithTimeZone>,
    #[sea_orm(column_type = "Text")]
    pub pickup_address: String,
    pub status: OrderStatus,
    pub total_amount: Decimal,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
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
        belongs_to = "super::bids::Entity",
        from = "Column::BidId",
        to = "super::bids::Column::Id"
    )]
    Bids,
    #[sea_orm(
        belongs_to = "super::buyer_profiles::Entity",
        from = "Column::BuyerId",
        to = "super::buyer_profiles::Column::Id"
    )]
    BuyerProfiles,
    #[sea_orm(
        belongs_to = "super::seller_profiles::Entity",
        from = "Column::SellerId",
        to = "super::seller_profiles::Column::Id"
    )]
    SellerProfiles,
}

impl Related<super::listings::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Listings.def()
    }
}

impl Related<super::bids::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Bids.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
