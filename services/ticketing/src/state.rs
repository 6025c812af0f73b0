use std::sync::Arc;

use sea_orm::DatabaseConnection;

use boxoffice_domain::clock::Clock;

use crate::config::HoldPolicy;
use crate::infra::db::{
    DbCatalogRepository, DbOrderRepository, DbPromotionRepository, DbSeatHoldRepository,
    DbTicketRepository,
};

/// Shared application state passed to every handler via axum `State`.
#[derive(Clone)]
pub struct AppState {
    pub db: DatabaseConnection,
    pub clock: Arc<dyn Clock>,
    pub policy: HoldPolicy,
}

impl AppState {
    pub fn catalog_repo(&self) -> DbCatalogRepository {
        DbCatalogRepository {
            db: self.db.clone(),
        }
    }

    pub fn promotion_repo(&self) -> DbPromotionRepository {
        DbPromotionRepository {
            db: self.db.clone(),
        }
    }

    pub fn seat_hold_repo(&self) -> DbSeatHoldRepository {
        DbSeatHoldRepository {
            db: self.db.clone(),
        }
    }

    pub fn order_repo(&self) -> DbOrderRepository {
        DbOrderRepository {
            db: self.db.clone(),
        }
    }

    pub fn ticket_repo(&self) -> DbTicketRepository {
        DbTicketRepository {
            db: self.db.clone(),
        }
    }
}
