use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(TicketOrders::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(TicketOrders::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(TicketOrders::BuyerId).uuid().not_null())
                    .col(ColumnDef::new(TicketOrders::EventId).uuid().not_null())
                    .col(
                        ColumnDef::new(TicketOrders::TotalAmount)
                            .decimal_len(12, 2)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(TicketOrders::DiscountAmount)
                            .decimal_len(12, 2)
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(TicketOrders::Status)
                            .text()
                            .not_null()
                            .default("pending"),
                    )
                    .col(
                        ColumnDef::new(TicketOrders::PaymentStatus)
                            .text()
                            .not_null()
                            .default("pending"),
                    )
                    .col(ColumnDef::new(TicketOrders::PromoCode).text())
                    .col(ColumnDef::new(TicketOrders::PromotionId).uuid())
                    .col(
                        ColumnDef::new(TicketOrders::ExpiresAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(TicketOrders::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(TicketOrders::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .check(Expr::cust(
                        "status IN ('pending', 'confirmed', 'cancelled', 'refunded')",
                    ))
                    .check(Expr::cust(
                        "payment_status IN ('pending', 'completed', 'failed', 'refunded')",
                    ))
                    .foreign_key(
                        ForeignKey::create()
                            .from(TicketOrders::Table, TicketOrders::EventId)
                            .to(Events::Table, Events::Id),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(TicketOrders::Table, TicketOrders::PromotionId)
                            .to(Promotions::Table, Promotions::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .table(TicketOrders::Table)
                    .col(TicketOrders::BuyerId)
                    .col(TicketOrders::PromotionId)
                    .name("idx_ticket_orders_buyer_id_promotion_id")
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .table(TicketOrders::Table)
                    .col(TicketOrders::EventId)
                    .col(TicketOrders::Status)
                    .col(TicketOrders::ExpiresAt)
                    .name("idx_ticket_orders_event_id_status_expires_at")
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(TicketOrders::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum TicketOrders {
    Table,
    Id,
    BuyerId,
    EventId,
    TotalAmount,
    DiscountAmount,
    Status,
    PaymentStatus,
    PromoCode,
    PromotionId,
    ExpiresAt,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
enum Events {
    Table,
    Id,
}

#[derive(Iden)]
enum Promotions {
    Table,
    Id,
}
