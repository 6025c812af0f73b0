use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(EventTickets::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(EventTickets::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(EventTickets::EventId).uuid().not_null())
                    .col(ColumnDef::new(EventTickets::PackageId).uuid().not_null())
                    .col(ColumnDef::new(EventTickets::OrderId).uuid().not_null())
                    .col(ColumnDef::new(EventTickets::AttendeeName).text())
                    .col(ColumnDef::new(EventTickets::AttendeeEmail).text())
                    .col(ColumnDef::new(EventTickets::AttendeePhone).text())
                    .col(
                        ColumnDef::new(EventTickets::QrCode)
                            .text()
                            .not_null()
                            .unique_key(),
                    )
                    .col(
                        ColumnDef::new(EventTickets::Status)
                            .text()
                            .not_null()
                            .default("valid"),
                    )
                    .col(ColumnDef::new(EventTickets::CheckedInAt).timestamp_with_time_zone())
                    .col(ColumnDef::new(EventTickets::SeatId).uuid())
                    .col(
                        ColumnDef::new(EventTickets::Price)
                            .decimal_len(12, 2)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(EventTickets::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .check(Expr::cust(
                        "status IN ('valid', 'used', 'cancelled', 'refunded')",
                    ))
                    .foreign_key(
                        ForeignKey::create()
                            .from(EventTickets::Table, EventTickets::OrderId)
                            .to(TicketOrders::Table, TicketOrders::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(EventTickets::Table, EventTickets::PackageId)
                            .to(TicketPackages::Table, TicketPackages::Id),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(EventTickets::Table, EventTickets::SeatId)
                            .to(Seats::Table, Seats::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .table(EventTickets::Table)
                    .col(EventTickets::OrderId)
                    .name("idx_event_tickets_order_id")
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(EventTickets::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum EventTickets {
    Table,
    Id,
    EventId,
    PackageId,
    OrderId,
    AttendeeName,
    AttendeeEmail,
    AttendeePhone,
    QrCode,
    Status,
    CheckedInAt,
    SeatId,
    Price,
    CreatedAt,
}

#[derive(Iden)]
enum TicketOrders {
    Table,
    Id,
}

#[derive(Iden)]
enum TicketPackages {
    Table,
    Id,
}

#[derive(Iden)]
enum Seats {
    Table,
    Id,
}
