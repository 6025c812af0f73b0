//! Stand-alone seat holds.

use std::collections::HashSet;

use tracing::info;
use uuid::Uuid;

use boxoffice_domain::clock::Clock;
use boxoffice_domain::error::AdmissionError;
use boxoffice_domain::seat::{SeatStatus, hold_deadline};

use crate::config::HoldPolicy;
use crate::domain::repository::{CatalogRepository, SeatHoldRepository};
use crate::domain::types::HoldReceipt;
use crate::error::TicketingServiceError;

pub struct ReserveSeatsInput {
    pub event_id: Uuid,
    pub buyer_id: Uuid,
    pub seat_ids: Vec<Uuid>,
    pub hold_minutes: Option<u32>,
}

pub struct ReserveSeatsUseCase<C, H, K>
where
    C: CatalogRepository,
    H: SeatHoldRepository,
    K: Clock,
{
    pub catalog: C,
    pub holds: H,
    pub clock: K,
    pub policy: HoldPolicy,
}

impl<C, H, K> ReserveSeatsUseCase<C, H, K>
where
    C: CatalogRepository,
    H: SeatHoldRepository,
    K: Clock,
{
    pub async fn execute(
        &self,
        input: ReserveSeatsInput,
    ) -> Result<HoldReceipt, TicketingServiceError> {
        let minutes = input.hold_minutes.unwrap_or(self.policy.default_minutes);
        if minutes == 0 || minutes > self.policy.max_minutes {
            return Err(TicketingServiceError::MissingData);
        }
        let mut seen = HashSet::new();
        let seat_ids: Vec<Uuid> = input
            .seat_ids
            .into_iter()
            .filter(|id| seen.insert(*id))
            .collect();
        if seat_ids.is_empty() {
            return Err(TicketingServiceError::MissingData);
        }

        let now = self.clock.now();
        let event = self
            .catalog
            .find_event(input.event_id)
            .await?
            .ok_or(TicketingServiceError::EventNotFound)?;
        if event.is_removed() {
            return Err(AdmissionError::NotAvailable.into());
        }

        let section_ids: HashSet<Uuid> = self
            .catalog
            .list_sections(event.id)
            .await?
            .into_iter()
            .map(|s| s.id)
            .collect();
        let seats = self.catalog.find_seats(&seat_ids).await?;
        if seats.len() != seat_ids.len()
            || seats.iter().any(|s| !section_ids.contains(&s.section_id))
        {
            return Err(TicketingServiceError::SeatNotFound);
        }
        if seats
            .iter()
            .any(|s| s.effective_status(now) != SeatStatus::Available)
        {
            return Err(AdmissionError::NotAvailable.into());
        }

        let expires_at = hold_deadline(now, i64::from(minutes));
        self.holds
            .hold(&seat_ids, input.buyer_id, expires_at, now)
            .await?;
        info!(
            event_id = %event.id,
            buyer_id = %input.buyer_id,
            seats = seat_ids.len(),
            %expires_at,
            "seats held"
        );

        Ok(HoldReceipt {
            seat_ids,
            expires_at,
        })
    }
}

pub struct ReleaseHoldsInput {
    pub event_id: Uuid,
    pub buyer_id: Uuid,
    /// `None` releases every hold the buyer has in the event.
    pub seat_ids: Option<Vec<Uuid>>,
}

pub struct ReleaseHoldsUseCase<C, H>
where
    C: CatalogRepository,
    H: SeatHoldRepository,
{
    pub catalog: C,
    pub holds: H,
}

impl<C, H> ReleaseHoldsUseCase<C, H>
where
    C: CatalogRepository,
    H: SeatHoldRepository,
{
    pub async fn execute(&self, input: ReleaseHoldsInput) -> Result<u64, TicketingServiceError> {
        self.catalog
            .find_event(input.event_id)
            .await?
            .ok_or(TicketingServiceError::EventNotFound)?;
        let released = self
            .holds
            .release(input.event_id, input.buyer_id, input.seat_ids.as_deref())
            .await?;
        info!(event_id = %input.event_id, buyer_id = %input.buyer_id, released, "holds released");
        Ok(released)
    }
}
