use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Users::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Users::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Users::Username).string_len(150).not_null().unique_key())
                    .col(ColumnDef::new(Users::Email).string_len(254).not_null().unique_key())
                    .col(ColumnDef::new(Users::FirstName).string_len(150).not_null())
                    .col(ColumnDef::new(Users::LastName).string_len(150).not_null())
                    .col(ColumnDef::new(Users::PasswordHash).string().not_null())
                    .col(ColumnDef::new(Users::Role).string_len(10).not_null())
                    .col(
                        ColumnDef::new(Users::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(BuyerProfiles::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(BuyerProfiles::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(BuyerProfiles::UserId).uuid().not_null().unique_key())
                    .col(ColumnDef::new(BuyerProfiles::BusinessName).string_len(255).not_null())
                    .col(ColumnDef::new(BuyerProfiles::PhoneNumber).string_len(20).not_null())
                    .col(ColumnDef::new(BuyerProfiles::Address).text().not_null())
                    .col(
                        ColumnDef::new(BuyerProfiles::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(BuyerProfiles::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_buyer_profiles_user")
                            .from(BuyerProfiles::Table, BuyerProfiles::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(SellerProfiles::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(SellerProfiles::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(SellerProfiles::UserId).uuid().not_null().unique_key())
                    .col(ColumnDef::new(SellerProfiles::BusinessName).string_len(255).not_null())
                    .col(ColumnDef::new(SellerProfiles::PhoneNumber).string_len(20).not_null())
                    .col(ColumnDef::new(SellerProfiles::PickupAddress).text().not_null())
                    .col(
                        ColumnDef::new(SellerProfiles::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(SellerProfiles::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_seller_profiles_user")
                            .from(SellerProfiles::Table, SellerProfiles::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(AuditLogs::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(AuditLogs::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(AuditLogs::UserId).uuid().null())
                    .col(ColumnDef::new(AuditLogs::Action).string_len(64).not_null())
                    .col(ColumnDef::new(AuditLogs::Resource).string_len(64).null())
                    .col(ColumnDef::new(AuditLogs::Metadata).json_binary().null())
                    .col(
                        ColumnDef::new(AuditLogs::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_audit_logs_user")
                            .from(AuditLogs::Table, AuditLogs::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(AuditLogs::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(SellerProfiles::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(BuyerProfiles::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Users::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum Users {
    Table,
    Id,
    Username,
    Email,
    FirstName,
    LastName,
    PasswordHash,
    Role,
    CreatedAt,
}

#[derive(DeriveIden)]
pub enum BuyerProfiles {
    Table,
    Id,
    UserId,
    BusinessName,
    PhoneNumber,
    Address,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
pub enum SellerProfiles {
    Table,
    Id,
    UserId,
    BusinessName,
    PhoneNumber,
    PickupAddress,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum AuditLogs {
    Table,
    Id,
    UserId,
    Action,
    Resource,
    Metadata,
    CreatedAt,
}
