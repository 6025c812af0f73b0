#![allow(async_fn_in_trait)]

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use boxoffice_domain::event::Event;
use boxoffice_domain::order::TicketOrder;
use boxoffice_domain::package::TicketPackage;
use boxoffice_domain::promotion::Promotion;
use boxoffice_domain::seat::Seat;
use boxoffice_domain::section::Section;
use boxoffice_domain::ticket::EventTicket;

use crate::domain::types::{IssueOrder, Settlement};
use crate::error::TicketingServiceError;

/// Read access to events and their inventory.
pub trait CatalogRepository: Send + Sync {
    async fn find_event(&self, id: Uuid) -> Result<Option<Event>, TicketingServiceError>;

    async fn find_package(&self, id: Uuid)
    -> Result<Option<TicketPackage>, TicketingServiceError>;

    async fn list_packages(
        &self,
        event_id: Uuid,
    ) -> Result<Vec<TicketPackage>, TicketingServiceError>;

    async fn list_sections(&self, event_id: Uuid) -> Result<Vec<Section>, TicketingServiceError>;

    /// Every seat in the event's sections, raw status.
    async fn list_seats(&self, event_id: Uuid) -> Result<Vec<Seat>, TicketingServiceError>;

    /// Seats by id; unknown ids are omitted.
    async fn find_seats(&self, ids: &[Uuid]) -> Result<Vec<Seat>, TicketingServiceError>;
}

pub trait PromotionRepository: Send + Sync {
    async fn find_by_code(&self, code: &str) -> Result<Option<Promotion>, TicketingServiceError>;

    /// Active code-less promotions scoped to `event_id` or to every event.
    async fn list_automatic(&self, event_id: Uuid)
    -> Result<Vec<Promotion>, TicketingServiceError>;

    /// Pending or confirmed orders of `buyer_id` per promotion.
    async fn count_buyer_uses(
        &self,
        buyer_id: Uuid,
        promotion_ids: &[Uuid],
    ) -> Result<HashMap<Uuid, u64>, TicketingServiceError>;
}

/// Stand-alone seat holds placed before checkout.
pub trait SeatHoldRepository: Send + Sync {
    /// Hold every seat in `seat_ids` for `buyer_id` until `until`, or none.
    /// Fails with `NotAvailable` if any seat is not effectively available.
    async fn hold(
        &self,
        seat_ids: &[Uuid],
        buyer_id: Uuid,
        until: DateTime<Utc>,
        now: DateTime<Utc>,
    ) -> Result<(), TicketingServiceError>;

    /// Release stand-alone holds of `buyer_id` in the event. `None` releases
    /// all. Seats bound to a pending order are untouched. Returns the number
    /// of seats released.
    async fn release(
        &self,
        event_id: Uuid,
        buyer_id: Uuid,
        seat_ids: Option<&[Uuid]>,
    ) -> Result<u64, TicketingServiceError>;
}

/// Order lifecycle. Every mutating method is one transaction built from
/// conditional updates; a failed condition rolls the whole unit back.
pub trait OrderRepository: Send + Sync {
    /// Claim seats for the order, bump package and event counters, insert
    /// order and tickets.
    async fn issue(&self, issue: &IssueOrder, now: DateTime<Utc>)
    -> Result<(), TicketingServiceError>;

    async fn find_order(&self, id: Uuid) -> Result<Option<TicketOrder>, TicketingServiceError>;

    async fn list_tickets(&self, order_id: Uuid)
    -> Result<Vec<EventTicket>, TicketingServiceError>;

    /// Pending orders of the event whose hold window ended before `now`.
    async fn list_lapsed(
        &self,
        event_id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<Vec<TicketOrder>, TicketingServiceError>;

    /// `pending → confirmed`: seats sold, promotion usage counted.
    /// Returns whether the usage increment was accepted.
    async fn confirm(
        &self,
        order: &TicketOrder,
        seat_ids: &[Uuid],
        now: DateTime<Utc>,
    ) -> Result<bool, TicketingServiceError>;

    /// Cancel or refund with full compensation of seats and counters.
    async fn settle(
        &self,
        order: &TicketOrder,
        tickets: &[EventTicket],
        settlement: Settlement,
        now: DateTime<Utc>,
    ) -> Result<(), TicketingServiceError>;
}

pub trait TicketRepository: Send + Sync {
    async fn find_ticket(&self, id: Uuid) -> Result<Option<EventTicket>, TicketingServiceError>;

    /// Admit the ticket and bump the event's `checked_in_count`.
    async fn check_in(
        &self,
        ticket_id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<EventTicket, TicketingServiceError>;
}
