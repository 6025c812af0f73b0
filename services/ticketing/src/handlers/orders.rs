use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use boxoffice_core::identity::IdentityHeaders;
use boxoffice_domain::order::{OrderStatus, PaymentOutcome, PaymentStatus};
use boxoffice_domain::ticket::{Attendee, EventTicket, TicketStatus};

use crate::domain::types::{OrderItem, OrderRequest, OrderWithTickets, PricedOrder};
use crate::error::TicketingServiceError;
use crate::state::AppState;
use crate::usecase::order::{
    CancelOrderInput, CancelOrderUseCase, CreateOrderUseCase, GetOrderUseCase, QuoteOrderUseCase,
};
use crate::usecase::settlement::{ConfirmOrderInput, ConfirmOrderUseCase, RefundOrderUseCase};

// ── Request types ────────────────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct OrderItemRequest {
    pub package_id: Uuid,
    pub quantity: u32,
    #[serde(default)]
    pub seat_ids: Vec<Uuid>,
    #[serde(default)]
    pub attendees: Vec<Attendee>,
}

#[derive(Deserialize)]
pub struct CreateOrderRequest {
    pub event_id: Uuid,
    pub items: Vec<OrderItemRequest>,
    pub promo_code: Option<String>,
}

impl CreateOrderRequest {
    fn into_order_request(self, buyer_id: Uuid) -> OrderRequest {
        OrderRequest {
            buyer_id,
            event_id: self.event_id,
            items: self
                .items
                .into_iter()
                .map(|item| OrderItem {
                    package_id: item.package_id,
                    quantity: item.quantity,
                    seat_ids: item.seat_ids,
                    attendees: item.attendees,
                })
                .collect(),
            promo_code: self.promo_code.filter(|c| !c.trim().is_empty()),
        }
    }
}

#[derive(Deserialize)]
pub struct ConfirmOrderRequest {
    pub payment_outcome: PaymentOutcome,
}

// ── Response types ───────────────────────────────────────────────────────────

#[derive(Serialize)]
pub struct QuoteLineResponse {
    pub package_id: Uuid,
    pub seat_id: Option<Uuid>,
    pub unit_price: Decimal,
}

#[derive(Serialize)]
pub struct QuoteResponse {
    pub event_id: Uuid,
    pub lines: Vec<QuoteLineResponse>,
    pub subtotal: Decimal,
    pub discount_amount: Decimal,
    pub total_amount: Decimal,
    pub promotion_id: Option<Uuid>,
    pub promo_code: Option<String>,
}

impl From<PricedOrder> for QuoteResponse {
    fn from(priced: PricedOrder) -> Self {
        Self {
            event_id: priced.event_id,
            lines: priced
                .lines
                .into_iter()
                .map(|l| QuoteLineResponse {
                    package_id: l.package_id,
                    seat_id: l.seat_id,
                    unit_price: l.unit_price,
                })
                .collect(),
            subtotal: priced.subtotal,
            discount_amount: priced.discount_amount,
            total_amount: priced.total_amount,
            promotion_id: priced.promotion.as_ref().map(|p| p.id),
            promo_code: priced.promotion.and_then(|p| p.code),
        }
    }
}

#[derive(Serialize)]
pub struct TicketResponse {
    pub id: Uuid,
    pub event_id: Uuid,
    pub package_id: Uuid,
    pub order_id: Uuid,
    pub seat_id: Option<Uuid>,
    pub status: TicketStatus,
    pub price: Decimal,
    pub qr_code: String,
    pub attendee: Attendee,
    #[serde(serialize_with = "boxoffice_core::serde::opt_to_rfc3339_ms")]
    pub checked_in_at: Option<DateTime<Utc>>,
}

impl From<EventTicket> for TicketResponse {
    fn from(t: EventTicket) -> Self {
        Self {
            id: t.id,
            event_id: t.event_id,
            package_id: t.package_id,
            order_id: t.order_id,
            seat_id: t.seat_id,
            status: t.status,
            price: t.price,
            qr_code: t.qr_code,
            attendee: t.attendee,
            checked_in_at: t.checked_in_at,
        }
    }
}

#[derive(Serialize)]
pub struct OrderResponse {
    pub id: Uuid,
    pub buyer_id: Uuid,
    pub event_id: Uuid,
    pub status: OrderStatus,
    pub payment_status: PaymentStatus,
    pub total_amount: Decimal,
    pub discount_amount: Decimal,
    pub promo_code: Option<String>,
    #[serde(serialize_with = "boxoffice_core::serde::to_rfc3339_ms")]
    pub expires_at: DateTime<Utc>,
    #[serde(serialize_with = "boxoffice_core::serde::to_rfc3339_ms")]
    pub created_at: DateTime<Utc>,
    #[serde(serialize_with = "boxoffice_core::serde::to_rfc3339_ms")]
    pub updated_at: DateTime<Utc>,
    pub tickets: Vec<TicketResponse>,
}

impl From<OrderWithTickets> for OrderResponse {
    fn from(OrderWithTickets { order, tickets }: OrderWithTickets) -> Self {
        Self {
            id: order.id,
            buyer_id: order.buyer_id,
            event_id: order.event_id,
            status: order.status,
            payment_status: order.payment_status,
            total_amount: order.total_amount,
            discount_amount: order.discount_amount,
            promo_code: order.promo_code,
            expires_at: order.expires_at,
            created_at: order.created_at,
            updated_at: order.updated_at,
            tickets: tickets.into_iter().map(TicketResponse::from).collect(),
        }
    }
}

// ── POST /orders/quote ───────────────────────────────────────────────────────

pub async fn quote_order(
    identity: IdentityHeaders,
    State(state): State<AppState>,
    Json(body): Json<CreateOrderRequest>,
) -> Result<Json<QuoteResponse>, TicketingServiceError> {
    let usecase = QuoteOrderUseCase {
        catalog: state.catalog_repo(),
        promotions: state.promotion_repo(),
        clock: state.clock.clone(),
    };
    let priced = usecase
        .execute(body.into_order_request(identity.user_id))
        .await?;
    Ok(Json(priced.into()))
}

// ── POST /orders ─────────────────────────────────────────────────────────────

pub async fn create_order(
    identity: IdentityHeaders,
    State(state): State<AppState>,
    Json(body): Json<CreateOrderRequest>,
) -> Result<(StatusCode, Json<OrderResponse>), TicketingServiceError> {
    let usecase = CreateOrderUseCase {
        catalog: state.catalog_repo(),
        promotions: state.promotion_repo(),
        orders: state.order_repo(),
        clock: state.clock.clone(),
        policy: state.policy,
    };
    let created = usecase
        .execute(body.into_order_request(identity.user_id))
        .await?;
    Ok((StatusCode::CREATED, Json(created.into())))
}

// ── GET /orders/{order_id} ───────────────────────────────────────────────────

pub async fn get_order(
    identity: IdentityHeaders,
    State(state): State<AppState>,
    Path(order_id): Path<Uuid>,
) -> Result<Json<OrderResponse>, TicketingServiceError> {
    let usecase = GetOrderUseCase {
        orders: state.order_repo(),
        clock: state.clock.clone(),
    };
    let found = usecase.execute(order_id).await?;
    // Other buyers' orders are indistinguishable from missing ones.
    if !identity.may_access(found.order.buyer_id) {
        return Err(TicketingServiceError::OrderNotFound);
    }
    Ok(Json(found.into()))
}

// ── POST /orders/{order_id}/confirmation ─────────────────────────────────────

pub async fn confirm_order(
    identity: IdentityHeaders,
    State(state): State<AppState>,
    Path(order_id): Path<Uuid>,
    Json(body): Json<ConfirmOrderRequest>,
) -> Result<Json<OrderResponse>, TicketingServiceError> {
    if !identity.is_staff() {
        return Err(TicketingServiceError::Forbidden);
    }
    let usecase = ConfirmOrderUseCase {
        orders: state.order_repo(),
        clock: state.clock.clone(),
    };
    let settled = usecase
        .execute(ConfirmOrderInput {
            order_id,
            outcome: body.payment_outcome,
        })
        .await?;
    Ok(Json(settled.into()))
}

// ── POST /orders/{order_id}/cancellation ─────────────────────────────────────

pub async fn cancel_order(
    identity: IdentityHeaders,
    State(state): State<AppState>,
    Path(order_id): Path<Uuid>,
) -> Result<Json<OrderResponse>, TicketingServiceError> {
    let usecase = CancelOrderUseCase {
        orders: state.order_repo(),
        clock: state.clock.clone(),
    };
    let cancelled = usecase
        .execute(CancelOrderInput {
            order_id,
            requested_by: identity.user_id,
            is_staff: identity.is_staff(),
        })
        .await?;
    Ok(Json(cancelled.into()))
}

// ── POST /orders/{order_id}/refund ───────────────────────────────────────────

pub async fn refund_order(
    identity: IdentityHeaders,
    State(state): State<AppState>,
    Path(order_id): Path<Uuid>,
) -> Result<Json<OrderResponse>, TicketingServiceError> {
    if !identity.is_staff() {
        return Err(TicketingServiceError::Forbidden);
    }
    let usecase = RefundOrderUseCase {
        orders: state.order_repo(),
        clock: state.clock.clone(),
    };
    Ok(Json(usecase.execute(order_id).await?.into()))
}
