use sea_orm_migration::prelude::*;

#[tokio::main]
async fn main() {
    cli::run_cli(boxoffice_ticketing_migration::Migrator).await;
}
