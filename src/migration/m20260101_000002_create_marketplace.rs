use sea_orm_migration::prelude::*;

use super::m20260101_000001_create_accounts::{BuyerProfiles, SellerProfiles};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Categories::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Categories::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Categories::Name).string_len(120).not_null().unique_key())
                    .col(ColumnDef::new(Categories::Description).text().not_null())
                    .col(
                        ColumnDef::new(Categories::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Categories::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Listings::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Listings::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Listings::SellerId).uuid().not_null())
                    .col(ColumnDef::new(Listings::CategoryId).uuid().not_null())
                    .col(ColumnDef::new(Listings::Description).text().not_null())
                    .col(
                        ColumnDef::new(Listings::QuantityKg)
                            .decimal_len(10, 2)
                            .not_null()
                            .check(Expr::col(Listings::QuantityKg).gt(0)),
                    )
                    .col(
                        ColumnDef::new(Listings::PricePerKg)
                            .decimal_len(10, 2)
                            .not_null()
                            .check(Expr::col(Listings::PricePerKg).gt(0)),
                    )
                    .col(ColumnDef::new(Listings::Location).string_len(255).not_null())
                    .col(
                        ColumnDef::new(Listings::Status)
                            .string_len(15)
                            .not_null()
                            .default("available"),
                    )
                    .col(
                        ColumnDef::new(Listings::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Listings::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_listings_seller")
                            .from(Listings::Table, Listings::SellerId)
                            .to(SellerProfiles::Table, SellerProfiles::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_listings_category")
                            .from(Listings::Table, Listings::CategoryId)
                            .to(Categories::Table, Categories::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Bids::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Bids::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Bids::ListingId).uuid().not_null())
                    .col(ColumnDef::new(Bids::BuyerId).uuid().not_null())
                    .col(
                        ColumnDef::new(Bids::QuantityKg)
                            .decimal_len(10, 2)
                            .not_null()
                            .check(Expr::col(Bids::QuantityKg).gt(0)),
                    )
                    .col(
                        ColumnDef::new(Bids::PricePerKg)
                            .decimal_len(10, 2)
                            .not_null()
                            .check(Expr::col(Bids::PricePerKg).gt(0)),
                    )
                    .col(ColumnDef::new(Bids::Message).text().not_null())
                    .col(
                        ColumnDef::new(Bids::Status)
                            .string_len(15)
                            .not_null()
                            .default("pending"),
                    )
                    .col(
                        ColumnDef::new(Bids::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Bids::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_bids_listing")
                            .from(Bids::Table, Bids::ListingId)
                            .to(Listings::Table, Listings::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_bids_buyer")
                            .from(Bids::Table, Bids::BuyerId)
                            .to(BuyerProfiles::Table, BuyerProfiles::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // One bid per (listing, buyer). Booking maps a violation to AlreadyBooked.
        manager
            .create_index(
                Index::create()
                    .name("uq_bids_listing_buyer")
                    .table(Bids::Table)
                    .col(Bids::ListingId)
                    .col(Bids::BuyerId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(PickupOrders::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(PickupOrders::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(PickupOrders::ListingId).uuid().not_null())
                    .col(ColumnDef::new(PickupOrders::BidId).uuid().not_null().unique_key())
                    .col(ColumnDef::new(PickupOrders::BuyerId).uuid().not_null())
                    .col(ColumnDef::new(PickupOrders::SellerId).uuid().not_null())
                    .col(
                        ColumnDef::new(PickupOrders::ScheduledPickupAt)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .col(ColumnDef::new(PickupOrders::PickupAddress).text().not_null())
                    .col(
                        ColumnDef::new(PickupOrders::Status)
                            .string_len(15)
                            .not_null()
                            .default("placed"),
                    )
                    .col(
                        ColumnDef::new(PickupOrders::TotalAmount)
                            .decimal_len(16, 4)
                            .not_null()
                            .check(Expr::col(PickupOrders::TotalAmount).gt(0)),
                    )
                    .col(
                        ColumnDef::new(PickupOrders::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(PickupOrders::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_pickup_orders_listing")
                            .from(PickupOrders::Table, PickupOrders::ListingId)
                            .to(Listings::Table, Listings::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_pickup_orders_bid")
                            .from(PickupOrders::Table, PickupOrders::BidId)
                            .to(Bids::Table, Bids::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_pickup_orders_buyer")
                            .from(PickupOrders::Table, PickupOrders::BuyerId)
                            .to(BuyerProfiles::Table, BuyerProfiles::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_pickup_orders_seller")
                            .from(PickupOrders::Table, PickupOrders::SellerId)
                            .to(SellerProfiles::Table, SellerProfiles::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_listings_status")
                    .table(Listings::Table)
                    .col(Listings::Status)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_listings_category_status")
                    .table(Listings::Table)
                    .col(Listings::CategoryId)
                    .col(Listings::Status)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_listings_seller_status")
                    .table(Listings::Table)
                    .col(Listings::SellerId)
                    .col(Listings::Status)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_pickup_orders_status")
                    .table(PickupOrders::Table)
                    .col(PickupOrders::Status)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_pickup_orders_buyer_status")
                    .table(PickupOrders::Table)
                    .col(PickupOrders::BuyerId)
                    .col(PickupOrders::Status)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_pickup_orders_seller_status")
                    .table(PickupOrders::Table)
                    .col(PickupOrders::SellerId)
                    .col(PickupOrders::Status)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(PickupOrders::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Bids::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Listings::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Categories::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Categories {
    Table,
    Id,
    Name,
    Description,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Listings {
    Table,
    Id,
    SellerId,
    CategoryId,
    Description,
    QuantityKg,
    PricePerKg,
    Location,
    Status,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Bids {
    Table,
    Id,
    ListingId,
    BuyerId,
    QuantityKg,
    PricePerKg,
    Message,
    Status,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum PickupOrders {
    Table,
    Id,
    ListingId,
    BidId,
    BuyerId,
    SellerId,
    ScheduledPickupAt,
    PickupAddress,
    Status,
    TotalAmount,
    CreatedAt,
    UpdatedAt,
}
