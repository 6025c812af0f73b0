use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Sections::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Sections::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Sections::EventId).uuid().not_null())
                    .col(ColumnDef::new(Sections::Name).text().not_null())
                    .col(ColumnDef::new(Sections::Capacity).integer().not_null())
                    .col(ColumnDef::new(Sections::RowCount).integer().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .from(Sections::Table, Sections::EventId)
                            .to(Events::Table, Events::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .table(Sections::Table)
                    .col(Sections::EventId)
                    .name("idx_sections_event_id")
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Sections::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum Sections {
    Table,
    Id,
    EventId,
    Name,
    Capacity,
    RowCount,
}

#[derive(Iden)]
enum Events {
    Table,
    Id,
}
