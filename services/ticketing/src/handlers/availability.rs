use axum::{
    Json,
    extract::{Path, State},
};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use uuid::Uuid;

use boxoffice_domain::package::PackageAvailability;
use boxoffice_domain::seat::{Seat, SeatStatus};

use crate::domain::types::EventAvailability;
use crate::error::TicketingServiceError;
use crate::state::AppState;
use crate::usecase::availability::{
    GetEventAvailabilityUseCase, GetPackageAvailabilityUseCase, ListSeatsUseCase,
};

// ── GET /packages/{package_id}/availability ──────────────────────────────────

pub async fn get_package_availability(
    State(state): State<AppState>,
    Path(package_id): Path<Uuid>,
) -> Result<Json<PackageAvailability>, TicketingServiceError> {
    let usecase = GetPackageAvailabilityUseCase {
        catalog: state.catalog_repo(),
        clock: state.clock.clone(),
    };
    Ok(Json(usecase.execute(package_id).await?))
}

// ── GET /events/{event_id}/availability ──────────────────────────────────────

pub async fn get_event_availability(
    State(state): State<AppState>,
    Path(event_id): Path<Uuid>,
) -> Result<Json<EventAvailability>, TicketingServiceError> {
    let usecase = GetEventAvailabilityUseCase {
        catalog: state.catalog_repo(),
        clock: state.clock.clone(),
    };
    Ok(Json(usecase.execute(event_id).await?))
}

// ── GET /events/{event_id}/seats ─────────────────────────────────────────────

/// Seat as buyers see it. The holder is never exposed.
#[derive(Serialize)]
pub struct SeatResponse {
    pub id: Uuid,
    pub section_id: Uuid,
    pub seat_number: String,
    pub row: i32,
    pub column: i32,
    pub status: SeatStatus,
    #[serde(serialize_with = "boxoffice_core::serde::opt_to_rfc3339_ms")]
    pub reserved_until: Option<DateTime<Utc>>,
    pub price_modifier: Decimal,
}

impl From<Seat> for SeatResponse {
    fn from(seat: Seat) -> Self {
        Self {
            id: seat.id,
            section_id: seat.section_id,
            seat_number: seat.seat_number,
            row: seat.row,
            column: seat.column,
            status: seat.status,
            reserved_until: seat.reserved_until,
            price_modifier: seat.price_modifier,
        }
    }
}

pub async fn list_seats(
    State(state): State<AppState>,
    Path(event_id): Path<Uuid>,
) -> Result<Json<Vec<SeatResponse>>, TicketingServiceError> {
    let usecase = ListSeatsUseCase {
        catalog: state.catalog_repo(),
        clock: state.clock.clone(),
    };
    let seats = usecase.execute(event_id).await?;
    Ok(Json(seats.into_iter().map(SeatResponse::from).collect()))
}
