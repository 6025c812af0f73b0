use axum::{
    Json,
    extract::{Path, State},
};
use uuid::Uuid;

use boxoffice_core::identity::IdentityHeaders;

use crate::error::TicketingServiceError;
use crate::handlers::orders::TicketResponse;
use crate::state::AppState;
use crate::usecase::check_in::CheckInUseCase;

// ── POST /tickets/{ticket_id}/check-in ───────────────────────────────────────

pub async fn check_in_ticket(
    identity: IdentityHeaders,
    State(state): State<AppState>,
    Path(ticket_id): Path<Uuid>,
) -> Result<Json<TicketResponse>, TicketingServiceError> {
    if !identity.is_staff() {
        return Err(TicketingServiceError::Forbidden);
    }
    let usecase = CheckInUseCase {
        tickets: state.ticket_repo(),
        orders: state.order_repo(),
        clock: state.clock.clone(),
    };
    Ok(Json(usecase.execute(ticket_id).await?.into()))
}
