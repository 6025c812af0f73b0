use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use boxoffice_core::identity::IdentityHeaders;

use crate::error::TicketingServiceError;
use crate::state::AppState;
use crate::usecase::hold::{
    ReleaseHoldsInput, ReleaseHoldsUseCase, ReserveSeatsInput, ReserveSeatsUseCase,
};

// ── POST /events/{event_id}/seat-holds ───────────────────────────────────────

#[derive(Deserialize)]
pub struct CreateSeatHoldRequest {
    pub seat_ids: Vec<Uuid>,
    pub hold_minutes: Option<u32>,
}

#[derive(Serialize)]
pub struct SeatHoldResponse {
    pub success: bool,
    pub seat_ids: Vec<Uuid>,
    #[serde(serialize_with = "boxoffice_core::serde::to_rfc3339_ms")]
    pub expires_at: DateTime<Utc>,
}

pub async fn create_seat_hold(
    identity: IdentityHeaders,
    State(state): State<AppState>,
    Path(event_id): Path<Uuid>,
    Json(body): Json<CreateSeatHoldRequest>,
) -> Result<(StatusCode, Json<SeatHoldResponse>), TicketingServiceError> {
    let usecase = ReserveSeatsUseCase {
        catalog: state.catalog_repo(),
        holds: state.seat_hold_repo(),
        clock: state.clock.clone(),
        policy: state.policy,
    };
    let receipt = usecase
        .execute(ReserveSeatsInput {
            event_id,
            buyer_id: identity.user_id,
            seat_ids: body.seat_ids,
            hold_minutes: body.hold_minutes,
        })
        .await?;
    Ok((
        StatusCode::CREATED,
        Json(SeatHoldResponse {
            success: true,
            seat_ids: receipt.seat_ids,
            expires_at: receipt.expires_at,
        }),
    ))
}

// ── DELETE /events/{event_id}/seat-holds ─────────────────────────────────────

#[derive(Deserialize, Default)]
pub struct ReleaseSeatHoldRequest {
    /// Omitted: release every hold of the caller in the event.
    #[serde(default)]
    pub seat_ids: Option<Vec<Uuid>>,
}

#[derive(Serialize)]
pub struct ReleaseSeatHoldResponse {
    pub released: u64,
}

pub async fn release_seat_hold(
    identity: IdentityHeaders,
    State(state): State<AppState>,
    Path(event_id): Path<Uuid>,
    Json(body): Json<ReleaseSeatHoldRequest>,
) -> Result<Json<ReleaseSeatHoldResponse>, TicketingServiceError> {
    let usecase = ReleaseHoldsUseCase {
        catalog: state.catalog_repo(),
        holds: state.seat_hold_repo(),
    };
    let released = usecase
        .execute(ReleaseHoldsInput {
            event_id,
            buyer_id: identity.user_id,
            seat_ids: body.seat_ids,
        })
        .await?;
    Ok(Json(ReleaseSeatHoldResponse { released }))
}
