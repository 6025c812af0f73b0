use sea_orm_migration::prelude::*;

mod m20251001_000001_create_events;
mod m20251001_000002_create_sections;
mod m20251001_000003_create_seats;
mod m20251001_000004_create_ticket_packages;
mod m20251001_000005_create_promotions;
mod m20251001_000006_create_ticket_orders;
mod m20251001_000007_create_event_tickets;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20251001_000001_create_events::Migration),
            Box::new(m20251001_000002_create_sections::Migration),
            Box::new(m20251001_000003_create_seats::Migration),
            Box::new(m20251001_000004_create_ticket_packages::Migration),
            Box::new(m20251001_000005_create_promotions::Migration),
            Box::new(m20251001_000006_create_ticket_orders::Migration),
            Box::new(m20251001_000007_create_event_tickets::Migration),
        ]
    }
}
