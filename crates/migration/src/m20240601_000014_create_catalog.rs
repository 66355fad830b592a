//! Create catalog tables: `category`, `subcategory`, `service` and the `vendor_service` join table.
use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Category::Table)
                    .if_not_exists()
                    .col(uuid(Category::Id).primary_key())
                    .col(string_len(Category::Name, 128).not_null())
                    .col(ColumnDef::new(Category::Description).text().null())
                    .col(ColumnDef::new(Category::Icon).string_len(512).null())
                    .col(double(Category::MembershipFee).not_null())
                    .col(integer(Category::DefaultFreeCredits).not_null())
                    .col(integer(Category::SortOrder).not_null())
                    .col(boolean(Category::IsActive).not_null())
                    .col(timestamp_with_time_zone(Category::CreatedAt).not_null())
                    .col(timestamp_with_time_zone(Category::UpdatedAt).not_null())
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Subcategory::Table)
                    .if_not_exists()
                    .col(uuid(Subcategory::Id).primary_key())
                    .col(uuid(Subcategory::CategoryId).not_null())
                    .col(string_len(Subcategory::Name, 128).not_null())
                    .col(ColumnDef::new(Subcategory::Description).text().null())
                    .col(integer(Subcategory::SortOrder).not_null())
                    .col(double(Subcategory::Price).not_null())
                    .col(boolean(Subcategory::IsActive).not_null())
                    .col(timestamp_with_time_zone(Subcategory::CreatedAt).not_null())
                    .col(timestamp_with_time_zone(Subcategory::UpdatedAt).not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_subcategory_category")
                            .from(Subcategory::Table, Subcategory::CategoryId)
                            .to(Category::Table, Category::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Service::Table)
                    .if_not_exists()
                    .col(uuid(Service::Id).primary_key())
                    .col(uuid(Service::CategoryId).not_null())
                    .col(ColumnDef::new(Service::SubcategoryId).uuid().null())
                    .col(string_len(Service::Title, 255).not_null())
                    .col(ColumnDef::new(Service::Description).text().null())
                    .col(ColumnDef::new(Service::Photo).string_len(512).null())
                    .col(ColumnDef::new(Service::MoreInfo).text().null())
                    .col(ColumnDef::new(Service::AdminPrice).double().null())
                    .col(boolean(Service::IsAdminPriced).not_null())
                    .col(ColumnDef::new(Service::ApproxCompletionTime).integer().null())
                    .col(boolean(Service::IsActive).not_null())
                    .col(boolean(Service::QuantityEnabled).not_null())
                    .col(boolean(Service::PriceAdjustmentEnabled).not_null())
                    .col(timestamp_with_time_zone(Service::CreatedAt).not_null())
                    .col(timestamp_with_time_zone(Service::UpdatedAt).not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_service_category")
                            .from(Service::Table, Service::CategoryId)
                            .to(Category::Table, Category::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_service_subcategory")
                            .from(Service::Table, Service::SubcategoryId)
                            .to(Subcategory::Table, Subcategory::Id)
                            .on_delete(ForeignKeyAction::SetNull)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(VendorService::Table)
                    .if_not_exists()
                    .col(uuid(VendorService::Id).primary_key())
                    .col(uuid(VendorService::VendorId).not_null())
                    .col(uuid(VendorService::ServiceId).not_null())
                    .col(timestamp_with_time_zone(VendorService::CreatedAt).not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_vendor_service_vendor")
                            .from(VendorService::Table, VendorService::VendorId)
                            .to(Vendor::Table, Vendor::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_vendor_service_service")
                            .from(VendorService::Table, VendorService::ServiceId)
                            .to(Service::Table, Service::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(VendorService::Table).to_owned()).await?;
        manager.drop_table(Table::drop().table(Service::Table).to_owned()).await?;
        manager.drop_table(Table::drop().table(Subcategory::Table).to_owned()).await?;
        manager.drop_table(Table::drop().table(Category::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum Category {
    Table,
    Id,
    Name,
    Description,
    Icon,
    MembershipFee,
    DefaultFreeCredits,
    SortOrder,
    IsActive,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Subcategory {
    Table,
    Id,
    CategoryId,
    Name,
    Description,
    SortOrder,
    Price,
    IsActive,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Service {
    Table,
    Id,
    CategoryId,
    SubcategoryId,
    Title,
    Description,
    Photo,
    MoreInfo,
    AdminPrice,
    IsAdminPriced,
    ApproxCompletionTime,
    IsActive,
    QuantityEnabled,
    PriceAdjustmentEnabled,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum VendorService { Table, Id, VendorId, ServiceId, CreatedAt }

#[derive(DeriveIden)]
enum Vendor { Table, Id }
