use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use uuid::Uuid;

use boxoffice_domain::order::{OrderStatus, PaymentStatus, TicketOrder};
use boxoffice_domain::package::PackageAvailability;
use boxoffice_domain::promotion::Promotion;
use boxoffice_domain::section::SectionAvailability;
use boxoffice_domain::ticket::{Attendee, EventTicket};

/// One requested line of an order: `quantity` tickets of a package.
#[derive(Debug, Clone, Default)]
pub struct OrderItem {
    pub package_id: Uuid,
    pub quantity: u32,
    /// Required for seated events, one per ticket; must be empty otherwise.
    pub seat_ids: Vec<Uuid>,
    /// Optional attendee details, matched to tickets by position.
    pub attendees: Vec<Attendee>,
}

#[derive(Debug, Clone)]
pub struct OrderRequest {
    pub buyer_id: Uuid,
    pub event_id: Uuid,
    pub items: Vec<OrderItem>,
    pub promo_code: Option<String>,
}

/// A single priced ticket before issuance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PricedLine {
    pub package_id: Uuid,
    pub seat_id: Option<Uuid>,
    pub unit_price: Decimal,
    pub attendee: Attendee,
}

/// Result of validating and pricing an order request. No state is touched.
#[derive(Debug, Clone)]
pub struct PricedOrder {
    pub event_id: Uuid,
    pub lines: Vec<PricedLine>,
    pub subtotal: Decimal,
    pub discount_amount: Decimal,
    pub total_amount: Decimal,
    pub promotion: Option<Promotion>,
}

impl PricedOrder {
    pub fn ticket_count(&self) -> u32 {
        self.lines.len() as u32
    }

    pub fn seat_ids(&self) -> Vec<Uuid> {
        self.lines.iter().filter_map(|l| l.seat_id).collect()
    }
}

/// Everything the store commits in one issuance transaction.
#[derive(Debug, Clone)]
pub struct IssueOrder {
    pub order: TicketOrder,
    pub tickets: Vec<EventTicket>,
}

impl IssueOrder {
    pub fn seat_ids(&self) -> Vec<Uuid> {
        seat_ids(&self.tickets)
    }

    pub fn package_counts(&self) -> Vec<(Uuid, u32)> {
        package_counts(&self.tickets)
    }
}

/// Seats bound to `tickets`.
pub fn seat_ids(tickets: &[EventTicket]) -> Vec<Uuid> {
    tickets.iter().filter_map(|t| t.seat_id).collect()
}

/// Ticket count per package, in package id order.
pub fn package_counts(tickets: &[EventTicket]) -> Vec<(Uuid, u32)> {
    let mut counts = BTreeMap::new();
    for t in tickets {
        *counts.entry(t.package_id).or_insert(0u32) += 1;
    }
    counts.into_iter().collect()
}

/// How an order leaves the `pending` or `confirmed` state without a sale.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Settlement {
    /// `pending → cancelled`; seats held for the order are released.
    Cancel { payment_status: PaymentStatus },
    /// `confirmed → refunded`; sold seats are restocked.
    Refund,
}

impl Settlement {
    pub fn from_status(self) -> OrderStatus {
        match self {
            Self::Cancel { .. } => OrderStatus::Pending,
            Self::Refund => OrderStatus::Confirmed,
        }
    }

    pub fn to_status(self) -> OrderStatus {
        match self {
            Self::Cancel { .. } => OrderStatus::Cancelled,
            Self::Refund => OrderStatus::Refunded,
        }
    }
}

#[derive(Debug, Clone)]
pub struct OrderWithTickets {
    pub order: TicketOrder,
    pub tickets: Vec<EventTicket>,
}

#[derive(Debug, Clone, Serialize)]
pub struct EventAvailability {
    pub event_id: Uuid,
    pub max_attendees: Option<u32>,
    pub registered_count: u32,
    pub remaining_capacity: Option<u32>,
    pub packages: Vec<PackageAvailability>,
    pub sections: Vec<SectionAvailability>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HoldReceipt {
    pub seat_ids: Vec<Uuid>,
    pub expires_at: DateTime<Utc>,
}
