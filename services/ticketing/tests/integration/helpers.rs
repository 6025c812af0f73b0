use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use chrono::{DateTime, Utc};
use tracing::warn;
use uuid::Uuid;

use boxoffice_domain::error::AdmissionError;
use boxoffice_domain::event::Event;
use boxoffice_domain::order::{OrderStatus, TicketOrder};
use boxoffice_domain::package::TicketPackage;
use boxoffice_domain::promotion::Promotion;
use boxoffice_domain::seat::{Seat, SeatStatus};
use boxoffice_domain::section::Section;
use boxoffice_domain::ticket::{EventTicket, TicketStatus};
use boxoffice_testing::clock::ManualClock;
use boxoffice_testing::fixture;

use boxoffice_ticketing::config::HoldPolicy;
use boxoffice_ticketing::domain::repository::{
    CatalogRepository, OrderRepository, PromotionRepository, SeatHoldRepository, TicketRepository,
};
use boxoffice_ticketing::domain::types::{
    IssueOrder, OrderItem, OrderRequest, Settlement, package_counts,
};
use boxoffice_ticketing::error::TicketingServiceError;
use boxoffice_ticketing::usecase::check_in::CheckInUseCase;
use boxoffice_ticketing::usecase::hold::{ReleaseHoldsUseCase, ReserveSeatsUseCase};
use boxoffice_ticketing::usecase::order::{
    CancelOrderUseCase, CreateOrderUseCase, GetOrderUseCase, QuoteOrderUseCase,
};
use boxoffice_ticketing::usecase::settlement::{ConfirmOrderUseCase, RefundOrderUseCase};

// ── MemoryStore ──────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq)]
pub struct World {
    pub events: HashMap<Uuid, Event>,
    pub sections: Vec<Section>,
    pub seats: HashMap<Uuid, Seat>,
    pub packages: HashMap<Uuid, TicketPackage>,
    pub promotions: HashMap<Uuid, Promotion>,
    pub orders: HashMap<Uuid, TicketOrder>,
    pub tickets: Vec<EventTicket>,
}

/// Every port over one locked `World`. Mutations work on a copy that is
/// committed only if every step succeeds, like a rolled-back transaction.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    pub world: Arc<Mutex<World>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn snapshot(&self) -> World {
        self.world.lock().unwrap().clone()
    }

    pub fn add_event(&self, event: Event) {
        self.world.lock().unwrap().events.insert(event.id, event);
    }

    pub fn add_section(&self, section: Section) {
        self.world.lock().unwrap().sections.push(section);
    }

    pub fn add_seat(&self, seat: Seat) {
        self.world.lock().unwrap().seats.insert(seat.id, seat);
    }

    pub fn add_package(&self, package: TicketPackage) {
        self.world.lock().unwrap().packages.insert(package.id, package);
    }

    pub fn add_promotion(&self, promotion: Promotion) {
        self.world
            .lock()
            .unwrap()
            .promotions
            .insert(promotion.id, promotion);
    }

    pub fn event(&self, id: Uuid) -> Event {
        self.snapshot().events[&id].clone()
    }

    pub fn seat(&self, id: Uuid) -> Seat {
        self.snapshot().seats[&id].clone()
    }

    pub fn package(&self, id: Uuid) -> TicketPackage {
        self.snapshot().packages[&id].clone()
    }

    pub fn promotion(&self, id: Uuid) -> Promotion {
        self.snapshot().promotions[&id].clone()
    }

    pub fn order(&self, id: Uuid) -> TicketOrder {
        self.snapshot().orders[&id].clone()
    }

    pub fn tickets_of(&self, order_id: Uuid) -> Vec<EventTicket> {
        self.snapshot()
            .tickets
            .into_iter()
            .filter(|t| t.order_id == order_id)
            .collect()
    }

    pub fn update_seat(&self, id: Uuid, f: impl FnOnce(&mut Seat)) {
        if let Some(seat) = self.world.lock().unwrap().seats.get_mut(&id) {
            f(seat);
        }
    }

    fn commit<T>(
        &self,
        f: impl FnOnce(&mut World) -> Result<T, TicketingServiceError>,
    ) -> Result<T, TicketingServiceError> {
        let mut world = self.world.lock().unwrap();
        let mut next = world.clone();
        let out = f(&mut next)?;
        *world = next;
        Ok(out)
    }
}

impl World {
    fn section_ids(&self, event_id: Uuid) -> Vec<Uuid> {
        self.sections
            .iter()
            .filter(|s| s.event_id == event_id)
            .map(|s| s.id)
            .collect()
    }

    fn seat_mut(&mut self, id: Uuid) -> Result<&mut Seat, TicketingServiceError> {
        self.seats
            .get_mut(&id)
            .ok_or(AdmissionError::NotAvailable.into())
    }
}

impl CatalogRepository for MemoryStore {
    async fn find_event(&self, id: Uuid) -> Result<Option<Event>, TicketingServiceError> {
        Ok(self.snapshot().events.get(&id).cloned())
    }

    async fn find_package(
        &self,
        id: Uuid,
    ) -> Result<Option<TicketPackage>, TicketingServiceError> {
        let package = self.snapshot().packages.get(&id).cloned();
        // Concurrent checkouts all read before any of them issues.
        tokio::task::yield_now().await;
        Ok(package)
    }

    async fn list_packages(
        &self,
        event_id: Uuid,
    ) -> Result<Vec<TicketPackage>, TicketingServiceError> {
        let mut packages: Vec<_> = self
            .snapshot()
            .packages
            .into_values()
            .filter(|p| p.event_id == event_id)
            .collect();
        packages.sort_by(|a, b| a.price.cmp(&b.price).then(a.id.cmp(&b.id)));
        Ok(packages)
    }

    async fn list_sections(&self, event_id: Uuid) -> Result<Vec<Section>, TicketingServiceError> {
        Ok(self
            .snapshot()
            .sections
            .into_iter()
            .filter(|s| s.event_id == event_id)
            .collect())
    }

    async fn list_seats(&self, event_id: Uuid) -> Result<Vec<Seat>, TicketingServiceError> {
        let world = self.snapshot();
        let sections = world.section_ids(event_id);
        let mut seats: Vec<_> = world
            .seats
            .into_values()
            .filter(|s| sections.contains(&s.section_id))
            .collect();
        seats.sort_by_key(|s| (s.section_id, s.row, s.column));
        Ok(seats)
    }

    async fn find_seats(&self, ids: &[Uuid]) -> Result<Vec<Seat>, TicketingServiceError> {
        let world = self.snapshot();
        Ok(ids.iter().filter_map(|id| world.seats.get(id).cloned()).collect())
    }
}

impl PromotionRepository for MemoryStore {
    async fn find_by_code(&self, code: &str) -> Result<Option<Promotion>, TicketingServiceError> {
        Ok(self
            .snapshot()
            .promotions
            .into_values()
            .find(|p| p.code.as_deref() == Some(code)))
    }

    async fn list_automatic(
        &self,
        event_id: Uuid,
    ) -> Result<Vec<Promotion>, TicketingServiceError> {
        Ok(self
            .snapshot()
            .promotions
            .into_values()
            .filter(|p| p.code.is_none() && p.is_active && p.applies_to_event(event_id))
            .collect())
    }

    async fn count_buyer_uses(
        &self,
        buyer_id: Uuid,
        promotion_ids: &[Uuid],
    ) -> Result<HashMap<Uuid, u64>, TicketingServiceError> {
        let mut uses = HashMap::new();
        for order in self.snapshot().orders.values() {
            if order.buyer_id != buyer_id || !order.counts_toward_promo_usage() {
                continue;
            }
            if let Some(id) = order.promotion_id.filter(|id| promotion_ids.contains(id)) {
                *uses.entry(id).or_insert(0) += 1;
            }
        }
        Ok(uses)
    }
}

impl SeatHoldRepository for MemoryStore {
    async fn hold(
        &self,
        seat_ids: &[Uuid],
        buyer_id: Uuid,
        until: DateTime<Utc>,
        now: DateTime<Utc>,
    ) -> Result<(), TicketingServiceError> {
        self.commit(|world| {
            for id in seat_ids {
                world.seat_mut(*id)?.reserve(buyer_id, until, now)?;
            }
            Ok(())
        })
    }

    async fn release(
        &self,
        event_id: Uuid,
        buyer_id: Uuid,
        seat_ids: Option<&[Uuid]>,
    ) -> Result<u64, TicketingServiceError> {
        self.commit(|world| {
            let sections = world.section_ids(event_id);
            let mut released = 0;
            for seat in world.seats.values_mut() {
                let selected = seat_ids.is_none_or(|ids| ids.contains(&seat.id));
                if selected
                    && sections.contains(&seat.section_id)
                    && seat.status == SeatStatus::Reserved
                    && seat.held_by == Some(buyer_id)
                    && seat.held_by_order.is_none()
                {
                    seat.release()?;
                    released += 1;
                }
            }
            Ok(released)
        })
    }
}

impl OrderRepository for MemoryStore {
    async fn issue(&self, issue: &IssueOrder, now: DateTime<Utc>) -> Result<(), TicketingServiceError> {
        self.commit(|world| {
            let order = &issue.order;
            for id in issue.seat_ids() {
                world
                    .seat_mut(id)?
                    .claim_for_order(order.buyer_id, order.id, order.expires_at, now)?;
            }
            for (package_id, n) in issue.package_counts() {
                world
                    .packages
                    .get_mut(&package_id)
                    .ok_or(TicketingServiceError::PackageNotFound)?
                    .try_increment_sold(n)?;
            }
            let event = world
                .events
                .get_mut(&order.event_id)
                .ok_or(TicketingServiceError::EventNotFound)?;
            if event.is_removed() {
                return Err(AdmissionError::CapacityExceeded.into());
            }
            event.try_register(issue.tickets.len() as u32)?;
            world.orders.insert(order.id, order.clone());
            world.tickets.extend(issue.tickets.iter().cloned());
            Ok(())
        })
    }

    async fn find_order(&self, id: Uuid) -> Result<Option<TicketOrder>, TicketingServiceError> {
        Ok(self.snapshot().orders.get(&id).cloned())
    }

    async fn list_tickets(
        &self,
        order_id: Uuid,
    ) -> Result<Vec<EventTicket>, TicketingServiceError> {
        Ok(self.tickets_of(order_id))
    }

    async fn list_lapsed(
        &self,
        event_id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<Vec<TicketOrder>, TicketingServiceError> {
        Ok(self
            .snapshot()
            .orders
            .into_values()
            .filter(|o| o.event_id == event_id && o.is_hold_expired(now))
            .collect())
    }

    async fn confirm(
        &self,
        order: &TicketOrder,
        seat_ids: &[Uuid],
        now: DateTime<Utc>,
    ) -> Result<bool, TicketingServiceError> {
        self.commit(|world| {
            let stored = world
                .orders
                .get_mut(&order.id)
                .ok_or(TicketingServiceError::OrderNotFound)?;
            if stored.is_hold_expired(now) {
                return Err(AdmissionError::InvalidTransition.into());
            }
            stored.confirm(now)?;
            for id in seat_ids {
                world.seat_mut(*id)?.mark_sold(order.id, now)?;
            }
            Ok(match order.promotion_id {
                Some(id) => world
                    .promotions
                    .get_mut(&id)
                    .is_some_and(|p| p.try_increment_usage().is_ok()),
                None => true,
            })
        })
    }

    async fn settle(
        &self,
        order: &TicketOrder,
        tickets: &[EventTicket],
        settlement: Settlement,
        now: DateTime<Utc>,
    ) -> Result<(), TicketingServiceError> {
        self.commit(|world| {
            let stored = world
                .orders
                .get_mut(&order.id)
                .ok_or(TicketingServiceError::OrderNotFound)?;
            if stored.status != settlement.from_status() {
                return Err(AdmissionError::InvalidTransition.into());
            }
            let ticket_status = match settlement {
                Settlement::Cancel { payment_status } => {
                    stored.cancel(payment_status, now)?;
                    TicketStatus::Cancelled
                }
                Settlement::Refund => {
                    stored.refund(now)?;
                    TicketStatus::Refunded
                }
            };

            let live: Vec<EventTicket> = tickets
                .iter()
                .filter(|t| t.status == TicketStatus::Valid)
                .cloned()
                .collect();
            for ticket in world.tickets.iter_mut().filter(|t| t.order_id == order.id) {
                if ticket.status != TicketStatus::Valid {
                    continue;
                }
                if settlement == Settlement::Refund && ticket.checked_in_at.is_some() {
                    return Err(AdmissionError::InvalidTransition.into());
                }
                ticket.void(ticket_status)?;
            }

            for seat_id in live.iter().filter_map(|t| t.seat_id) {
                let Some(seat) = world.seats.get_mut(&seat_id) else {
                    continue;
                };
                match settlement {
                    Settlement::Cancel { .. }
                        if seat.status == SeatStatus::Reserved
                            && seat.held_by_order == Some(order.id) =>
                    {
                        seat.release()?;
                    }
                    Settlement::Refund if seat.status == SeatStatus::Sold => seat.restock()?,
                    _ => {}
                }
            }

            for (package_id, n) in package_counts(&live) {
                if let Some(p) = world.packages.get_mut(&package_id) {
                    if let Err(e) = p.decrement_sold(n) {
                        warn!(%package_id, n, error = %e, "quantity_sold below released count");
                    }
                }
            }
            if let Some(event) = world.events.get_mut(&order.event_id) {
                if let Err(e) = event.unregister(live.len() as u32) {
                    warn!(event_id = %order.event_id, error = %e, "registered_count below released count");
                }
            }
            Ok(())
        })
    }
}

impl TicketRepository for MemoryStore {
    async fn find_ticket(&self, id: Uuid) -> Result<Option<EventTicket>, TicketingServiceError> {
        Ok(self.snapshot().tickets.into_iter().find(|t| t.id == id))
    }

    async fn check_in(
        &self,
        ticket_id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<EventTicket, TicketingServiceError> {
        self.commit(|world| {
            let ticket = world
                .tickets
                .iter_mut()
                .find(|t| t.id == ticket_id)
                .ok_or(TicketingServiceError::TicketNotFound)?;
            ticket.check_in(now)?;
            let admitted = ticket.clone();
            if let Some(event) = world.events.get_mut(&admitted.event_id) {
                event.record_check_in();
            }
            Ok(admitted)
        })
    }
}

// ── Venue fixtures ───────────────────────────────────────────────────────────

/// A seeded event with one package, optionally seated, on a manual clock at
/// `fixture::t0()`.
pub struct Venue {
    pub store: MemoryStore,
    pub clock: ManualClock,
    pub policy: HoldPolicy,
    pub event: Event,
    pub package: TicketPackage,
    pub seats: Vec<Seat>,
}

impl Venue {
    /// Unseated event; `quantity_available` capped at `cap`.
    pub fn general_admission(cap: Option<u32>) -> Self {
        let store = MemoryStore::new();
        let event = fixture::event();
        let package = TicketPackage {
            quantity_available: cap,
            ..fixture::package(event.id)
        };
        store.add_event(event.clone());
        store.add_package(package.clone());
        Self {
            store,
            clock: ManualClock::at(fixture::t0()),
            policy: HoldPolicy::default(),
            event,
            package,
            seats: Vec::new(),
        }
    }

    /// Event with one section of `seat_count` seats.
    pub fn seated(seat_count: u32) -> Self {
        let mut venue = Self::general_admission(Some(100));
        let section = fixture::section(venue.event.id);
        venue.store.add_section(section.clone());
        for n in 1..=seat_count {
            let seat = fixture::seat(section.id, n);
            venue.store.add_seat(seat.clone());
            venue.seats.push(seat);
        }
        venue
    }

    pub fn seat_id(&self, n: usize) -> Uuid {
        self.seats[n].id
    }

    /// Request `quantity` general-admission tickets of the default package.
    pub fn ga_request(&self, buyer_id: Uuid, quantity: u32) -> OrderRequest {
        OrderRequest {
            buyer_id,
            event_id: self.event.id,
            items: vec![OrderItem {
                package_id: self.package.id,
                quantity,
                ..Default::default()
            }],
            promo_code: None,
        }
    }

    pub fn seated_request(&self, buyer_id: Uuid, seat_ids: Vec<Uuid>) -> OrderRequest {
        OrderRequest {
            buyer_id,
            event_id: self.event.id,
            items: vec![OrderItem {
                package_id: self.package.id,
                quantity: seat_ids.len() as u32,
                seat_ids,
                ..Default::default()
            }],
            promo_code: None,
        }
    }

    pub fn reserve_seats(&self) -> ReserveSeatsUseCase<MemoryStore, MemoryStore, ManualClock> {
        ReserveSeatsUseCase {
            catalog: self.store.clone(),
            holds: self.store.clone(),
            clock: self.clock.clone(),
            policy: self.policy,
        }
    }

    pub fn release_holds(&self) -> ReleaseHoldsUseCase<MemoryStore, MemoryStore> {
        ReleaseHoldsUseCase {
            catalog: self.store.clone(),
            holds: self.store.clone(),
        }
    }

    pub fn quote_order(&self) -> QuoteOrderUseCase<MemoryStore, MemoryStore, ManualClock> {
        QuoteOrderUseCase {
            catalog: self.store.clone(),
            promotions: self.store.clone(),
            clock: self.clock.clone(),
        }
    }

    pub fn create_order(
        &self,
    ) -> CreateOrderUseCase<MemoryStore, MemoryStore, MemoryStore, ManualClock> {
        CreateOrderUseCase {
            catalog: self.store.clone(),
            promotions: self.store.clone(),
            orders: self.store.clone(),
            clock: self.clock.clone(),
            policy: self.policy,
        }
    }

    pub fn get_order(&self) -> GetOrderUseCase<MemoryStore, ManualClock> {
        GetOrderUseCase {
            orders: self.store.clone(),
            clock: self.clock.clone(),
        }
    }

    pub fn cancel_order(&self) -> CancelOrderUseCase<MemoryStore, ManualClock> {
        CancelOrderUseCase {
            orders: self.store.clone(),
            clock: self.clock.clone(),
        }
    }

    pub fn confirm_order(&self) -> ConfirmOrderUseCase<MemoryStore, ManualClock> {
        ConfirmOrderUseCase {
            orders: self.store.clone(),
            clock: self.clock.clone(),
        }
    }

    pub fn refund_order(&self) -> RefundOrderUseCase<MemoryStore, ManualClock> {
        RefundOrderUseCase {
            orders: self.store.clone(),
            clock: self.clock.clone(),
        }
    }

    pub fn check_in(&self) -> CheckInUseCase<MemoryStore, MemoryStore, ManualClock> {
        CheckInUseCase {
            tickets: self.store.clone(),
            orders: self.store.clone(),
            clock: self.clock.clone(),
        }
    }
}

pub fn buyer() -> Uuid {
    Uuid::new_v4()
}

pub fn is_admission(
    result: &Result<impl std::fmt::Debug, TicketingServiceError>,
    expected: AdmissionError,
) -> bool {
    matches!(result, Err(e) if e.admission() == Some(expected))
}

/// Orders in a non-terminal state for the event.
pub fn open_orders(store: &MemoryStore, event_id: Uuid) -> usize {
    store
        .snapshot()
        .orders
        .values()
        .filter(|o| {
            o.event_id == event_id
                && matches!(o.status, OrderStatus::Pending | OrderStatus::Confirmed)
        })
        .count()
}
