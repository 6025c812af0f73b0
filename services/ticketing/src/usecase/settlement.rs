//! Payment outcome handling, refunds and hold-expiry compensation.

use chrono::{DateTime, Utc};
use tracing::{info, warn};
use uuid::Uuid;

use boxoffice_domain::clock::Clock;
use boxoffice_domain::error::AdmissionError;
use boxoffice_domain::order::{OrderStatus, PaymentOutcome, PaymentStatus, TicketOrder};

use crate::domain::repository::OrderRepository;
use crate::domain::types::{OrderWithTickets, Settlement, seat_ids};
use crate::error::TicketingServiceError;

/// Cancel `order` with full compensation, tolerating a concurrent settle.
///
/// Returns `false` if another caller moved the order first.
pub async fn cancel_with_compensation<O>(
    orders: &O,
    order: &TicketOrder,
    payment_status: PaymentStatus,
    now: DateTime<Utc>,
) -> Result<bool, TicketingServiceError>
where
    O: OrderRepository,
{
    let tickets = orders.list_tickets(order.id).await?;
    match orders
        .settle(order, &tickets, Settlement::Cancel { payment_status }, now)
        .await
    {
        Ok(()) => {
            warn!(
                order_id = %order.id,
                tickets = tickets.len(),
                payment_status = %payment_status,
                "order cancelled, inventory released"
            );
            Ok(true)
        }
        Err(e) if e.admission() == Some(AdmissionError::InvalidTransition) => Ok(false),
        Err(e) => Err(e),
    }
}

/// Cancel any pending orders of the event whose hold window has lapsed.
pub async fn expire_lapsed_orders<O>(
    orders: &O,
    event_id: Uuid,
    now: DateTime<Utc>,
) -> Result<usize, TicketingServiceError>
where
    O: OrderRepository,
{
    let mut expired = 0;
    for order in orders.list_lapsed(event_id, now).await? {
        if cancel_with_compensation(orders, &order, PaymentStatus::Pending, now).await? {
            expired += 1;
        }
    }
    Ok(expired)
}

pub struct ConfirmOrderInput {
    pub order_id: Uuid,
    pub outcome: PaymentOutcome,
}

pub struct ConfirmOrderUseCase<O, K>
where
    O: OrderRepository,
    K: Clock,
{
    pub orders: O,
    pub clock: K,
}

impl<O, K> ConfirmOrderUseCase<O, K>
where
    O: OrderRepository,
    K: Clock,
{
    pub async fn execute(
        &self,
        input: ConfirmOrderInput,
    ) -> Result<OrderWithTickets, TicketingServiceError> {
        let now = self.clock.now();
        let order = self
            .orders
            .find_order(input.order_id)
            .await?
            .ok_or(TicketingServiceError::OrderNotFound)?;
        order.ensure_transition(OrderStatus::Confirmed)?;

        match input.outcome {
            PaymentOutcome::Failed => {
                self.cancel(&order, PaymentStatus::Failed, now).await?;
            }
            PaymentOutcome::Completed if order.is_hold_expired(now) => {
                // Paid too late: the seats may already belong to someone else.
                self.cancel(&order, PaymentStatus::Completed, now).await?;
                return Err(AdmissionError::ExpiredWindow.into());
            }
            PaymentOutcome::Completed => {
                let tickets = self.orders.list_tickets(order.id).await?;
                match self.orders.confirm(&order, &seat_ids(&tickets), now).await {
                    Ok(usage_counted) => {
                        if order.promotion_id.is_some() && !usage_counted {
                            warn!(
                                order_id = %order.id,
                                promotion_id = ?order.promotion_id,
                                "promotion usage limit reached at confirmation"
                            );
                        }
                        info!(order_id = %order.id, tickets = tickets.len(), "order confirmed");
                    }
                    Err(e) if e.admission() == Some(AdmissionError::NotAvailable) => {
                        self.cancel(&order, PaymentStatus::Completed, now).await?;
                        return Err(e);
                    }
                    Err(e) => return Err(e),
                }
            }
        }

        self.reload(order.id).await
    }

    async fn cancel(
        &self,
        order: &TicketOrder,
        payment_status: PaymentStatus,
        now: DateTime<Utc>,
    ) -> Result<(), TicketingServiceError> {
        if cancel_with_compensation(&self.orders, order, payment_status, now).await? {
            Ok(())
        } else {
            Err(AdmissionError::InvalidTransition.into())
        }
    }

    async fn reload(&self, order_id: Uuid) -> Result<OrderWithTickets, TicketingServiceError> {
        let order = self
            .orders
            .find_order(order_id)
            .await?
            .ok_or(TicketingServiceError::OrderNotFound)?;
        let tickets = self.orders.list_tickets(order_id).await?;
        Ok(OrderWithTickets { order, tickets })
    }
}

pub struct RefundOrderUseCase<O, K>
where
    O: OrderRepository,
    K: Clock,
{
    pub orders: O,
    pub clock: K,
}

impl<O, K> RefundOrderUseCase<O, K>
where
    O: OrderRepository,
    K: Clock,
{
    /// `confirmed → refunded`. Refused once any ticket has been admitted.
    pub async fn execute(&self, order_id: Uuid) -> Result<OrderWithTickets, TicketingServiceError> {
        let now = self.clock.now();
        let order = self
            .orders
            .find_order(order_id)
            .await?
            .ok_or(TicketingServiceError::OrderNotFound)?;
        order.ensure_transition(OrderStatus::Refunded)?;

        let tickets = self.orders.list_tickets(order.id).await?;
        if tickets.iter().any(|t| t.checked_in_at.is_some()) {
            return Err(AdmissionError::InvalidTransition.into());
        }
        self.orders
            .settle(&order, &tickets, Settlement::Refund, now)
            .await?;
        info!(order_id = %order.id, tickets = tickets.len(), "order refunded");

        let order = self
            .orders
            .find_order(order_id)
            .await?
            .ok_or(TicketingServiceError::OrderNotFound)?;
        let tickets = self.orders.list_tickets(order_id).await?;
        Ok(OrderWithTickets { order, tickets })
    }
}
