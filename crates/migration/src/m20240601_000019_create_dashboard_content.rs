//! Create dashboard content tables: `banner` and `service_section`.
use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Banner::Table)
                    .if_not_exists()
                    .col(uuid(Banner::Id).primary_key())
                    .col(string_len(Banner::Title, 255).not_null())
                    .col(string_len(Banner::Image, 1024).not_null())
                    .col(uuid(Banner::CategoryId).not_null())
                    .col(string_len(Banner::Audience, 16).not_null())
                    .col(integer(Banner::SortOrder).not_null())
                    .col(boolean(Banner::IsActive).not_null())
                    .col(timestamp_with_time_zone(Banner::CreatedAt).not_null())
                    .col(timestamp_with_time_zone(Banner::UpdatedAt).not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_banner_category")
                            .from(Banner::Table, Banner::CategoryId)
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
                    .table(ServiceSection::Table)
                    .if_not_exists()
                    .col(uuid(ServiceSection::Id).primary_key())
                    .col(string_len(ServiceSection::Title, 255).not_null())
                    .col(uuid(ServiceSection::CategoryId).not_null())
                    .col(ColumnDef::new(ServiceSection::SubcategoryId).uuid().null())
                    .col(integer(ServiceSection::ItemLimit).not_null())
                    .col(integer(ServiceSection::SortOrder).not_null())
                    .col(boolean(ServiceSection::IsActive).not_null())
                    .col(timestamp_with_time_zone(ServiceSection::CreatedAt).not_null())
                    .col(timestamp_with_time_zone(ServiceSection::UpdatedAt).not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_service_section_category")
                            .from(ServiceSection::Table, ServiceSection::CategoryId)
                            .to(Category::Table, Category::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_service_section_subcategory")
                            .from(ServiceSection::Table, ServiceSection::SubcategoryId)
                            .to(Subcategory::Table, Subcategory::Id)
                            .on_delete(ForeignKeyAction::SetNull)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(ServiceSection::Table).to_owned()).await?;
        manager.drop_table(Table::drop().table(Banner::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum Banner { Table, Id, Title, Image, CategoryId, Audience, SortOrder, IsActive, CreatedAt, UpdatedAt }

#[derive(DeriveIden)]
enum ServiceSection {
    Table,
    Id,
    Title,
    CategoryId,
    SubcategoryId,
    ItemLimit,
    SortOrder,
    IsActive,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Category { Table, Id }

#[derive(DeriveIden)]
enum Subcategory { Table, Id }
