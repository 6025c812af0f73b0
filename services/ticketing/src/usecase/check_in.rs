use tracing::info;
use uuid::Uuid;

use boxoffice_domain::clock::Clock;
use boxoffice_domain::error::AdmissionError;
use boxoffice_domain::order::OrderStatus;
use boxoffice_domain::ticket::EventTicket;

use crate::domain::repository::{OrderRepository, TicketRepository};
use crate::error::TicketingServiceError;

pub struct CheckInUseCase<T, O, K>
where
    T: TicketRepository,
    O: OrderRepository,
    K: Clock,
{
    pub tickets: T,
    pub orders: O,
    pub clock: K,
}

impl<T, O, K> CheckInUseCase<T, O, K>
where
    T: TicketRepository,
    O: OrderRepository,
    K: Clock,
{
    /// Admit a ticket exactly once. Only tickets of confirmed orders pass.
    pub async fn execute(&self, ticket_id: Uuid) -> Result<EventTicket, TicketingServiceError> {
        let now = self.clock.now();
        let mut ticket = self
            .tickets
            .find_ticket(ticket_id)
            .await?
            .ok_or(TicketingServiceError::TicketNotFound)?;

        // Surface the domain verdict before touching the store.
        ticket.check_in(now)?;

        let order = self
            .orders
            .find_order(ticket.order_id)
            .await?
            .ok_or(TicketingServiceError::OrderNotFound)?;
        if order.status != OrderStatus::Confirmed {
            return Err(AdmissionError::InvalidTransition.into());
        }

        let admitted = self.tickets.check_in(ticket_id, now).await?;
        info!(ticket_id = %ticket_id, event_id = %admitted.event_id, "ticket checked in");
        Ok(admitted)
    }
}
