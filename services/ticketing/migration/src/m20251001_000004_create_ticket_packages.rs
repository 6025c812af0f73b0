use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(TicketPackages::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(TicketPackages::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(TicketPackages::EventId).uuid().not_null())
                    .col(ColumnDef::new(TicketPackages::Name).text().not_null())
                    .col(
                        ColumnDef::new(TicketPackages::Price)
                            .decimal_len(12, 2)
                            .not_null(),
                    )
                    .col(ColumnDef::new(TicketPackages::QuantityAvailable).integer())
                    .col(
                        ColumnDef::new(TicketPackages::QuantitySold)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(TicketPackages::MinPerOrder)
                            .integer()
                            .not_null()
                            .default(1),
                    )
                    .col(
                        ColumnDef::new(TicketPackages::MaxPerOrder)
                            .integer()
                            .not_null()
                            .default(10),
                    )
                    .col(ColumnDef::new(TicketPackages::SaleStart).timestamp_with_time_zone())
                    .col(ColumnDef::new(TicketPackages::SaleEnd).timestamp_with_time_zone())
                    .col(
                        ColumnDef::new(TicketPackages::IsActive)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .check(Expr::cust(
                        "quantity_sold >= 0 AND (quantity_available IS NULL OR quantity_sold <= quantity_available)",
                    ))
                    .foreign_key(
                        ForeignKey::create()
                            .from(TicketPackages::Table, TicketPackages::EventId)
                            .to(Events::Table, Events::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .table(TicketPackages::Table)
                    .col(TicketPackages::EventId)
                    .name("idx_ticket_packages_event_id")
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(TicketPackages::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum TicketPackages {
    Table,
    Id,
    EventId,
    Name,
    Price,
    QuantityAvailable,
    QuantitySold,
    MinPerOrder,
    MaxPerOrder,
    SaleStart,
    SaleEnd,
    IsActive,
}

#[derive(Iden)]
enum Events {
    Table,
    Id,
}
