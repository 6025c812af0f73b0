use chrono::Duration;
use rand::RngExt;
use tracing::info;
use uuid::Uuid;

use boxoffice_domain::clock::Clock;
use boxoffice_domain::error::AdmissionError;
use boxoffice_domain::order::{OrderStatus, PaymentStatus, TicketOrder};
use boxoffice_domain::ticket::{EventTicket, TicketStatus};

use crate::config::HoldPolicy;
use crate::domain::repository::{CatalogRepository, OrderRepository, PromotionRepository};
use crate::domain::types::{IssueOrder, OrderRequest, OrderWithTickets, PricedOrder};
use crate::error::TicketingServiceError;
use crate::usecase::pricing::price_order;
use crate::usecase::settlement::{cancel_with_compensation, expire_lapsed_orders};

/// Length of the opaque admission payload.
pub const QR_PAYLOAD_LEN: usize = 24;

const QR_CHARSET: &[u8] = b"ABCDEFGHJKLMNPQRSTUVWXYZ23456789";

fn generate_qr_payload() -> String {
    let mut rng = rand::rng();
    (0..QR_PAYLOAD_LEN)
        .map(|_| QR_CHARSET[rng.random_range(0..QR_CHARSET.len())] as char)
        .collect()
}

pub struct QuoteOrderUseCase<C, P, K>
where
    C: CatalogRepository,
    P: PromotionRepository,
    K: Clock,
{
    pub catalog: C,
    pub promotions: P,
    pub clock: K,
}

impl<C, P, K> QuoteOrderUseCase<C, P, K>
where
    C: CatalogRepository,
    P: PromotionRepository,
    K: Clock,
{
    /// Price an order without holding anything or counting promotion usage.
    pub async fn execute(&self, request: OrderRequest) -> Result<PricedOrder, TicketingServiceError> {
        price_order(&self.catalog, &self.promotions, &request, self.clock.now()).await
    }
}

pub struct CreateOrderUseCase<C, P, O, K>
where
    C: CatalogRepository,
    P: PromotionRepository,
    O: OrderRepository,
    K: Clock,
{
    pub catalog: C,
    pub promotions: P,
    pub orders: O,
    pub clock: K,
    pub policy: HoldPolicy,
}

impl<C, P, O, K> CreateOrderUseCase<C, P, O, K>
where
    C: CatalogRepository,
    P: PromotionRepository,
    O: OrderRepository,
    K: Clock,
{
    pub async fn execute(
        &self,
        request: OrderRequest,
    ) -> Result<OrderWithTickets, TicketingServiceError> {
        let now = self.clock.now();

        // Abandoned checkouts give their inventory back before we count it.
        let expired = expire_lapsed_orders(&self.orders, request.event_id, now).await?;
        if expired > 0 {
            info!(event_id = %request.event_id, expired, "lapsed orders expired");
        }

        let priced = price_order(&self.catalog, &self.promotions, &request, now).await?;

        let order_id = Uuid::now_v7();
        let order = TicketOrder {
            id: order_id,
            buyer_id: request.buyer_id,
            event_id: priced.event_id,
            total_amount: priced.total_amount,
            discount_amount: priced.discount_amount,
            status: OrderStatus::Pending,
            payment_status: PaymentStatus::Pending,
            promo_code: priced.promotion.as_ref().and_then(|p| p.code.clone()),
            promotion_id: priced.promotion.as_ref().map(|p| p.id),
            expires_at: now + Duration::minutes(i64::from(self.policy.order_minutes)),
            created_at: now,
            updated_at: now,
        };
        let tickets: Vec<EventTicket> = priced
            .lines
            .iter()
            .map(|line| EventTicket {
                id: Uuid::now_v7(),
                event_id: priced.event_id,
                package_id: line.package_id,
                order_id,
                attendee: line.attendee.clone(),
                qr_code: generate_qr_payload(),
                status: TicketStatus::Valid,
                checked_in_at: None,
                seat_id: line.seat_id,
                price: line.unit_price,
                created_at: now,
            })
            .collect();

        let issue = IssueOrder { order, tickets };
        self.orders.issue(&issue, now).await?;
        info!(
            order_id = %order_id,
            buyer_id = %request.buyer_id,
            tickets = issue.tickets.len(),
            total = %issue.order.total_amount,
            "order created"
        );

        Ok(OrderWithTickets {
            order: issue.order,
            tickets: issue.tickets,
        })
    }
}

pub struct GetOrderUseCase<O, K>
where
    O: OrderRepository,
    K: Clock,
{
    pub orders: O,
    pub clock: K,
}

impl<O, K> GetOrderUseCase<O, K>
where
    O: OrderRepository,
    K: Clock,
{
    /// Load an order; a pending order past its hold window is expired first.
    pub async fn execute(&self, order_id: Uuid) -> Result<OrderWithTickets, TicketingServiceError> {
        let now = self.clock.now();
        let mut order = self
            .orders
            .find_order(order_id)
            .await?
            .ok_or(TicketingServiceError::OrderNotFound)?;

        if order.is_hold_expired(now)
            && cancel_with_compensation(&self.orders, &order, PaymentStatus::Pending, now).await?
        {
            order = self
                .orders
                .find_order(order_id)
                .await?
                .ok_or(TicketingServiceError::OrderNotFound)?;
        }
        let tickets = self.orders.list_tickets(order_id).await?;
        Ok(OrderWithTickets { order, tickets })
    }
}

pub struct CancelOrderInput {
    pub order_id: Uuid,
    pub requested_by: Uuid,
    pub is_staff: bool,
}

pub struct CancelOrderUseCase<O, K>
where
    O: OrderRepository,
    K: Clock,
{
    pub orders: O,
    pub clock: K,
}

impl<O, K> CancelOrderUseCase<O, K>
where
    O: OrderRepository,
    K: Clock,
{
    pub async fn execute(
        &self,
        input: CancelOrderInput,
    ) -> Result<OrderWithTickets, TicketingServiceError> {
        let now = self.clock.now();
        let order = self
            .orders
            .find_order(input.order_id)
            .await?
            .ok_or(TicketingServiceError::OrderNotFound)?;
        if !input.is_staff && order.buyer_id != input.requested_by {
            return Err(TicketingServiceError::OrderNotFound);
        }
        order.ensure_transition(OrderStatus::Cancelled)?;

        if !cancel_with_compensation(&self.orders, &order, order.payment_status, now).await? {
            return Err(AdmissionError::InvalidTransition.into());
        }

        let order = self
            .orders
            .find_order(input.order_id)
            .await?
            .ok_or(TicketingServiceError::OrderNotFound)?;
        let tickets = self.orders.list_tickets(order.id).await?;
        Ok(OrderWithTickets { order, tickets })
    }
}
