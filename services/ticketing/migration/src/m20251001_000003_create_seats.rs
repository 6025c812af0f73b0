use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Seats::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Seats::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Seats::SectionId).uuid().not_null())
                    .col(ColumnDef::new(Seats::SeatNumber).text().not_null())
                    .col(ColumnDef::new(Seats::Row).integer().not_null())
                    .col(ColumnDef::new(Seats::Column).integer().not_null())
                    .col(
                        ColumnDef::new(Seats::Status)
                            .text()
                            .not_null()
                            .default("available"),
                    )
                    .col(ColumnDef::new(Seats::ReservedUntil).timestamp_with_time_zone())
                    .col(ColumnDef::new(Seats::HeldBy).uuid())
                    .col(ColumnDef::new(Seats::HeldByOrder).uuid())
                    .col(
                        ColumnDef::new(Seats::PriceModifier)
                            .decimal_len(12, 2)
                            .not_null()
                            .default(0),
                    )
                    .check(Expr::cust(
                        "status IN ('available', 'reserved', 'sold', 'blocked')",
                    ))
                    // A hold always carries its deadline and holder.
                    .check(Expr::cust(
                        "(status = 'reserved') = (reserved_until IS NOT NULL AND held_by IS NOT NULL)",
                    ))
                    .check(Expr::cust("held_by_order IS NULL OR status = 'reserved'"))
                    .foreign_key(
                        ForeignKey::create()
                            .from(Seats::Table, Seats::SectionId)
                            .to(Sections::Table, Sections::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .table(Seats::Table)
                    .col(Seats::SectionId)
                    .col(Seats::SeatNumber)
                    .unique()
                    .name("idx_seats_section_id_seat_number")
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .table(Seats::Table)
                    .col(Seats::HeldBy)
                    .name("idx_seats_held_by")
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .table(Seats::Table)
                    .col(Seats::HeldByOrder)
                    .name("idx_seats_held_by_order")
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Seats::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum Seats {
    Table,
    Id,
    SectionId,
    SeatNumber,
    Row,
    Column,
    Status,
    ReservedUntil,
    HeldBy,
    HeldByOrder,
    PriceModifier,
}

#[derive(Iden)]
enum Sections {
    Table,
    Id,
}
