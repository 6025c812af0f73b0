use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Promotions::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Promotions::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Promotions::EventId).uuid())
                    .col(ColumnDef::new(Promotions::Code).text().unique_key())
                    .col(ColumnDef::new(Promotions::PromoType).text().not_null())
                    .col(
                        ColumnDef::new(Promotions::DiscountValue)
                            .decimal_len(12, 2)
                            .not_null(),
                    )
                    .col(ColumnDef::new(Promotions::MinBookingAmount).decimal_len(12, 2))
                    .col(ColumnDef::new(Promotions::MaxDiscountAmount).decimal_len(12, 2))
                    .col(ColumnDef::new(Promotions::UsageLimit).integer())
                    .col(
                        ColumnDef::new(Promotions::UsageCount)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(ColumnDef::new(Promotions::PerCustomerLimit).integer())
                    .col(
                        ColumnDef::new(Promotions::StartDate)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Promotions::EndDate)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Promotions::Priority)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(Promotions::IsActive)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(
                        ColumnDef::new(Promotions::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .check(Expr::cust(
                        "promo_type IN ('percentage', 'fixed_amount', 'bundle', 'early_bird')",
                    ))
                    .check(Expr::cust(
                        "usage_limit IS NULL OR usage_count <= usage_limit",
                    ))
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .table(Promotions::Table)
                    .col(Promotions::EventId)
                    .col(Promotions::Priority)
                    .name("idx_promotions_event_id_priority")
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Promotions::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum Promotions {
    Table,
    Id,
    EventId,
    Code,
    PromoType,
    DiscountValue,
    MinBookingAmount,
    MaxDiscountAmount,
    UsageLimit,
    UsageCount,
    PerCustomerLimit,
    StartDate,
    EndDate,
    Priority,
    IsActive,
    CreatedAt,
}
