use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema, EnumIter, DeriveActiveEnum,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(15))")]
#[serde(rename_all = "snake_case")]
pub enum ListingStatus {
    #[sea_orm(string_value = "available")]
    Available,
    #[sea_orm(string_value = "reserved")]
    Reserved,
    #[sea_orm(string_value = "sold")]
    Sold,
    #[sea_orm(string_value = "inactive")]
    Inactive,
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "listings")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub seller_id: Uuid,
    pub category_id: Uuid,
    #[sea_orm(column_type = "Text")]
    pub description: String,
    pub quantity_kg: Decimal,
    pub price_per_kg: Decimal,
    pub location: String,
    pub status: ListingStatus,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::seller_profiles::Entity",
        from = "Column::SellerId",
        to = "super::seller_profiles::Column::Id"
    )]
    SellerProfiles,
    #[sea_orm(
        belongs_to = "super::categories::Entity",
        from = "Column::CategoryId",
        to = "super::categories::Column::Id"
    )]
    Categories,
    #[sea_orm(has_many = "super::bids::Entity")]
    Bids,
    #[sea_orm(has_many = "super::pickup_orders::Entity")]
    PickupOrders,
}

impl Related<super::seller_profiles::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::SellerProfiles.def()
    }
}

impl Related<super::categories::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Categories.def()
    }
}

impl Related<super::bids::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Bids.def()
    }
}

impl Related<super::pickup_orders::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::PickupOrders.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
