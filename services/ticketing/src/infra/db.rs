//! sea-orm adapters. Every counter or status change is a single conditional
//! `UPDATE`; a zero row count is the rejection.

use std::collections::HashMap;

use anyhow::Context as _;
use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, Condition, DatabaseConnection,
    DatabaseTransaction, EntityTrait, QueryFilter, QueryOrder, QuerySelect, TransactionError,
    TransactionTrait, UpdateMany, sea_query::Expr,
};
use tracing::warn;
use uuid::Uuid;

use boxoffice_domain::error::AdmissionError;
use boxoffice_domain::event::Event;
use boxoffice_domain::order::{OrderStatus, PaymentStatus, TicketOrder};
use boxoffice_domain::package::TicketPackage;
use boxoffice_domain::promotion::Promotion;
use boxoffice_domain::seat::{Seat, SeatStatus};
use boxoffice_domain::section::Section;
use boxoffice_domain::ticket::{Attendee, EventTicket, TicketStatus};
use boxoffice_ticketing_schema::{
    event_tickets, events, promotions, seats, sections, ticket_orders, ticket_packages,
};

use crate::domain::repository::{
    CatalogRepository, OrderRepository, PromotionRepository, SeatHoldRepository, TicketRepository,
};
use crate::domain::types::{IssueOrder, Settlement, package_counts, seat_ids};
use crate::error::TicketingServiceError;

fn flatten(err: TransactionError<TicketingServiceError>) -> TicketingServiceError {
    match err {
        TransactionError::Connection(e) => {
            TicketingServiceError::Internal(anyhow::Error::new(e).context("run transaction"))
        }
        TransactionError::Transaction(e) => e,
    }
}

fn to_u32(value: i32, what: &'static str) -> anyhow::Result<u32> {
    u32::try_from(value).with_context(|| format!("negative {what}: {value}"))
}

fn to_i32(value: u32, what: &'static str) -> anyhow::Result<i32> {
    i32::try_from(value).with_context(|| format!("{what} out of range: {value}"))
}

async fn section_ids_of(
    db: &DatabaseConnection,
    event_id: Uuid,
) -> Result<Vec<Uuid>, TicketingServiceError> {
    let ids = sections::Entity::find()
        .select_only()
        .column(sections::Column::Id)
        .filter(sections::Column::EventId.eq(event_id))
        .into_tuple::<Uuid>()
        .all(db)
        .await
        .context("list section ids")?;
    Ok(ids)
}

// ── Catalog repository ───────────────────────────────────────────────────────

#[derive(Clone)]
pub struct DbCatalogRepository {
    pub db: DatabaseConnection,
}

impl CatalogRepository for DbCatalogRepository {
    async fn find_event(&self, id: Uuid) -> Result<Option<Event>, TicketingServiceError> {
        let model = events::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .context("find event")?;
        Ok(model.map(event_from_model).transpose()?)
    }

    async fn find_package(
        &self,
        id: Uuid,
    ) -> Result<Option<TicketPackage>, TicketingServiceError> {
        let model = ticket_packages::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .context("find package")?;
        Ok(model.map(package_from_model).transpose()?)
    }

    async fn list_packages(
        &self,
        event_id: Uuid,
    ) -> Result<Vec<TicketPackage>, TicketingServiceError> {
        let models = ticket_packages::Entity::find()
            .filter(ticket_packages::Column::EventId.eq(event_id))
            .order_by_asc(ticket_packages::Column::Price)
            .order_by_asc(ticket_packages::Column::Id)
            .all(&self.db)
            .await
            .context("list packages")?;
        Ok(models
            .into_iter()
            .map(package_from_model)
            .collect::<anyhow::Result<_>>()?)
    }

    async fn list_sections(&self, event_id: Uuid) -> Result<Vec<Section>, TicketingServiceError> {
        let models = sections::Entity::find()
            .filter(sections::Column::EventId.eq(event_id))
            .order_by_asc(sections::Column::Name)
            .all(&self.db)
            .await
            .context("list sections")?;
        Ok(models
            .into_iter()
            .map(section_from_model)
            .collect::<anyhow::Result<_>>()?)
    }

    async fn list_seats(&self, event_id: Uuid) -> Result<Vec<Seat>, TicketingServiceError> {
        let section_ids = section_ids_of(&self.db, event_id).await?;
        if section_ids.is_empty() {
            return Ok(Vec::new());
        }
        let models = seats::Entity::find()
            .filter(seats::Column::SectionId.is_in(section_ids))
            .order_by_asc(seats::Column::SectionId)
            .order_by_asc(seats::Column::RowIndex)
            .order_by_asc(seats::Column::ColumnIndex)
            .all(&self.db)
            .await
            .context("list seats")?;
        Ok(models
            .into_iter()
            .map(seat_from_model)
            .collect::<anyhow::Result<_>>()?)
    }

    async fn find_seats(&self, ids: &[Uuid]) -> Result<Vec<Seat>, TicketingServiceError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let models = seats::Entity::find()
            .filter(seats::Column::Id.is_in(ids.iter().copied()))
            .all(&self.db)
            .await
            .context("find seats")?;
        Ok(models
            .into_iter()
            .map(seat_from_model)
            .collect::<anyhow::Result<_>>()?)
    }
}

// ── Promotion repository ─────────────────────────────────────────────────────

#[derive(Clone)]
pub struct DbPromotionRepository {
    pub db: DatabaseConnection,
}

impl PromotionRepository for DbPromotionRepository {
    async fn find_by_code(&self, code: &str) -> Result<Option<Promotion>, TicketingServiceError> {
        let model = promotions::Entity::find()
            .filter(promotions::Column::Code.eq(code))
            .one(&self.db)
            .await
            .context("find promotion by code")?;
        Ok(model.map(promotion_from_model).transpose()?)
    }

    async fn list_automatic(
        &self,
        event_id: Uuid,
    ) -> Result<Vec<Promotion>, TicketingServiceError> {
        let models = promotions::Entity::find()
            .filter(promotions::Column::Code.is_null())
            .filter(promotions::Column::IsActive.eq(true))
            .filter(
                Condition::any()
                    .add(promotions::Column::EventId.eq(event_id))
                    .add(promotions::Column::EventId.is_null()),
            )
            .order_by_desc(promotions::Column::Priority)
            .order_by_asc(promotions::Column::CreatedAt)
            .all(&self.db)
            .await
            .context("list automatic promotions")?;
        Ok(models
            .into_iter()
            .map(promotion_from_model)
            .collect::<anyhow::Result<_>>()?)
    }

    async fn count_buyer_uses(
        &self,
        buyer_id: Uuid,
        promotion_ids: &[Uuid],
    ) -> Result<HashMap<Uuid, u64>, TicketingServiceError> {
        if promotion_ids.is_empty() {
            return Ok(HashMap::new());
        }
        let rows = ticket_orders::Entity::find()
            .select_only()
            .column(ticket_orders::Column::PromotionId)
            .column_as(Expr::col(ticket_orders::Column::Id).count(), "uses")
            .filter(ticket_orders::Column::BuyerId.eq(buyer_id))
            .filter(ticket_orders::Column::PromotionId.is_in(promotion_ids.iter().copied()))
            .filter(ticket_orders::Column::Status.is_in([
                OrderStatus::Pending.as_str(),
                OrderStatus::Confirmed.as_str(),
            ]))
            .group_by(ticket_orders::Column::PromotionId)
            .into_tuple::<(Option<Uuid>, i64)>()
            .all(&self.db)
            .await
            .context("count promotion uses")?;
        Ok(buyer_uses(rows)?)
    }
}

fn buyer_uses(rows: Vec<(Option<Uuid>, i64)>) -> anyhow::Result<HashMap<Uuid, u64>> {
    rows.into_iter()
        .filter_map(|(id, uses)| id.map(|id| (id, uses)))
        .map(|(id, uses)| {
            let uses = u64::try_from(uses)
                .with_context(|| format!("negative promotion use count: {uses}"))?;
            Ok((id, uses))
        })
        .collect()
}

// ── Seat hold repository ─────────────────────────────────────────────────────

#[derive(Clone)]
pub struct DbSeatHoldRepository {
    pub db: DatabaseConnection,
}

impl SeatHoldRepository for DbSeatHoldRepository {
    async fn hold(
        &self,
        seat_ids: &[Uuid],
        buyer_id: Uuid,
        until: DateTime<Utc>,
        now: DateTime<Utc>,
    ) -> Result<(), TicketingServiceError> {
        let seat_ids = seat_ids.to_vec();
        self.db
            .transaction::<_, (), TicketingServiceError>(|txn| {
                Box::pin(async move { claim_seats(txn, &seat_ids, buyer_id, None, until, now).await })
            })
            .await
            .map_err(flatten)
    }

    async fn release(
        &self,
        event_id: Uuid,
        buyer_id: Uuid,
        seat_ids: Option<&[Uuid]>,
    ) -> Result<u64, TicketingServiceError> {
        let section_ids = section_ids_of(&self.db, event_id).await?;
        if section_ids.is_empty() {
            return Ok(0);
        }
        let result = release_holds_stmt(section_ids, buyer_id, seat_ids)
            .exec(&self.db)
            .await
            .context("release holds")?;
        Ok(result.rows_affected)
    }
}

/// Move seats to `status` with every hold column cleared.
fn clear_seats(seat_ids: &[Uuid], status: SeatStatus) -> UpdateMany<seats::Entity> {
    seats::Entity::update_many()
        .col_expr(seats::Column::Status, Expr::value(status.as_str()))
        .col_expr(
            seats::Column::ReservedUntil,
            Expr::value(Option::<DateTime<Utc>>::None),
        )
        .col_expr(seats::Column::HeldBy, Expr::value(Option::<Uuid>::None))
        .col_expr(seats::Column::HeldByOrder, Expr::value(Option::<Uuid>::None))
        .filter(seats::Column::Id.is_in(seat_ids.iter().copied()))
}

/// `status = 'available' OR (status = 'reserved' AND reserved_until < now)`.
fn free_or_lapsed(now: DateTime<Utc>) -> Condition {
    Condition::any()
        .add(seats::Column::Status.eq(SeatStatus::Available.as_str()))
        .add(
            Condition::all()
                .add(seats::Column::Status.eq(SeatStatus::Reserved.as_str()))
                .add(seats::Column::ReservedUntil.lt(now)),
        )
}

/// Free seats, plus (for an order) the buyer's live stand-alone holds.
/// A seat bound to another pending order never matches.
fn claimable(buyer_id: Uuid, for_order: bool, now: DateTime<Utc>) -> Condition {
    let cond = free_or_lapsed(now);
    if !for_order {
        return cond;
    }
    cond.add(
        Condition::all()
            .add(seats::Column::Status.eq(SeatStatus::Reserved.as_str()))
            .add(seats::Column::HeldBy.eq(buyer_id))
            .add(seats::Column::HeldByOrder.is_null()),
    )
}

fn claim_seats_stmt(
    seat_ids: &[Uuid],
    buyer_id: Uuid,
    order_id: Option<Uuid>,
    until: DateTime<Utc>,
    now: DateTime<Utc>,
) -> UpdateMany<seats::Entity> {
    seats::Entity::update_many()
        .col_expr(
            seats::Column::Status,
            Expr::value(SeatStatus::Reserved.as_str()),
        )
        .col_expr(seats::Column::ReservedUntil, Expr::value(until))
        .col_expr(seats::Column::HeldBy, Expr::value(buyer_id))
        .col_expr(seats::Column::HeldByOrder, Expr::value(order_id))
        .filter(seats::Column::Id.is_in(seat_ids.iter().copied()))
        .filter(claimable(buyer_id, order_id.is_some(), now))
}

/// Only stand-alone holds; seats of a pending order leave with the order.
fn release_holds_stmt(
    section_ids: Vec<Uuid>,
    buyer_id: Uuid,
    seat_ids: Option<&[Uuid]>,
) -> UpdateMany<seats::Entity> {
    let mut update = seats::Entity::update_many()
        .col_expr(
            seats::Column::Status,
            Expr::value(SeatStatus::Available.as_str()),
        )
        .col_expr(
            seats::Column::ReservedUntil,
            Expr::value(Option::<DateTime<Utc>>::None),
        )
        .col_expr(seats::Column::HeldBy, Expr::value(Option::<Uuid>::None))
        .filter(seats::Column::SectionId.is_in(section_ids))
        .filter(seats::Column::Status.eq(SeatStatus::Reserved.as_str()))
        .filter(seats::Column::HeldBy.eq(buyer_id))
        .filter(seats::Column::HeldByOrder.is_null());
    if let Some(ids) = seat_ids {
        update = update.filter(seats::Column::Id.is_in(ids.iter().copied()));
    }
    update
}

/// Sell to `order_id`: its own hold, or a seat nobody took after it lapsed.
fn sell_seats_stmt(
    seat_ids: &[Uuid],
    order_id: Uuid,
    now: DateTime<Utc>,
) -> UpdateMany<seats::Entity> {
    clear_seats(seat_ids, SeatStatus::Sold).filter(
        free_or_lapsed(now).add(
            Condition::all()
                .add(seats::Column::Status.eq(SeatStatus::Reserved.as_str()))
                .add(seats::Column::HeldByOrder.eq(order_id)),
        ),
    )
}

fn free_order_seats_stmt(
    seat_ids: &[Uuid],
    settlement: Settlement,
    order_id: Uuid,
) -> UpdateMany<seats::Entity> {
    let freed = clear_seats(seat_ids, SeatStatus::Available);
    match settlement {
        Settlement::Cancel { .. } => freed
            .filter(seats::Column::Status.eq(SeatStatus::Reserved.as_str()))
            .filter(seats::Column::HeldByOrder.eq(order_id)),
        Settlement::Refund => freed.filter(seats::Column::Status.eq(SeatStatus::Sold.as_str())),
    }
}

/// Hold all of `seat_ids` or fail with `NotAvailable`. `order_id` binds the
/// hold to a pending order.
async fn claim_seats(
    txn: &DatabaseTransaction,
    seat_ids: &[Uuid],
    buyer_id: Uuid,
    order_id: Option<Uuid>,
    until: DateTime<Utc>,
    now: DateTime<Utc>,
) -> Result<(), TicketingServiceError> {
    if seat_ids.is_empty() {
        return Ok(());
    }
    let result = claim_seats_stmt(seat_ids, buyer_id, order_id, until, now)
        .exec(txn)
        .await
        .context("claim seats")?;
    if result.rows_affected != seat_ids.len() as u64 {
        return Err(AdmissionError::NotAvailable.into());
    }
    Ok(())
}

// ── Order repository ─────────────────────────────────────────────────────────

#[derive(Clone)]
pub struct DbOrderRepository {
    pub db: DatabaseConnection,
}

impl OrderRepository for DbOrderRepository {
    async fn issue(&self, issue: &IssueOrder, now: DateTime<Utc>) -> Result<(), TicketingServiceError> {
        let issue = issue.clone();
        self.db
            .transaction::<_, (), TicketingServiceError>(|txn| {
                Box::pin(async move {
                    let order = &issue.order;
                    claim_seats(
                        txn,
                        &issue.seat_ids(),
                        order.buyer_id,
                        Some(order.id),
                        order.expires_at,
                        now,
                    )
                    .await?;
                    for (package_id, n) in issue.package_counts() {
                        increment_sold(txn, package_id, n).await?;
                    }
                    register_attendees(txn, order.event_id, issue.tickets.len() as u32).await?;
                    insert_order(txn, order).await?;
                    insert_tickets(txn, &issue.tickets).await?;
                    Ok(())
                })
            })
            .await
            .map_err(flatten)
    }

    async fn find_order(&self, id: Uuid) -> Result<Option<TicketOrder>, TicketingServiceError> {
        let model = ticket_orders::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .context("find order")?;
        Ok(model.map(order_from_model).transpose()?)
    }

    async fn list_tickets(
        &self,
        order_id: Uuid,
    ) -> Result<Vec<EventTicket>, TicketingServiceError> {
        let models = event_tickets::Entity::find()
            .filter(event_tickets::Column::OrderId.eq(order_id))
            .order_by_asc(event_tickets::Column::Id)
            .all(&self.db)
            .await
            .context("list tickets")?;
        Ok(models
            .into_iter()
            .map(ticket_from_model)
            .collect::<anyhow::Result<_>>()?)
    }

    async fn list_lapsed(
        &self,
        event_id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<Vec<TicketOrder>, TicketingServiceError> {
        let models = ticket_orders::Entity::find()
            .filter(ticket_orders::Column::EventId.eq(event_id))
            .filter(ticket_orders::Column::Status.eq(OrderStatus::Pending.as_str()))
            .filter(ticket_orders::Column::ExpiresAt.lt(now))
            .all(&self.db)
            .await
            .context("list lapsed orders")?;
        Ok(models
            .into_iter()
            .map(order_from_model)
            .collect::<anyhow::Result<_>>()?)
    }

    async fn confirm(
        &self,
        order: &TicketOrder,
        seat_ids: &[Uuid],
        now: DateTime<Utc>,
    ) -> Result<bool, TicketingServiceError> {
        let order = order.clone();
        let seat_ids = seat_ids.to_vec();
        self.db
            .transaction::<_, bool, TicketingServiceError>(|txn| {
                Box::pin(async move {
                    let result = ticket_orders::Entity::update_many()
                        .col_expr(
                            ticket_orders::Column::Status,
                            Expr::value(OrderStatus::Confirmed.as_str()),
                        )
                        .col_expr(
                            ticket_orders::Column::PaymentStatus,
                            Expr::value(PaymentStatus::Completed.as_str()),
                        )
                        .col_expr(ticket_orders::Column::UpdatedAt, Expr::value(now))
                        .filter(ticket_orders::Column::Id.eq(order.id))
                        .filter(ticket_orders::Column::Status.eq(OrderStatus::Pending.as_str()))
                        .filter(ticket_orders::Column::ExpiresAt.gte(now))
                        .exec(txn)
                        .await
                        .context("confirm order")?;
                    if result.rows_affected == 0 {
                        return Err(AdmissionError::InvalidTransition.into());
                    }

                    if !seat_ids.is_empty() {
                        let result = sell_seats_stmt(&seat_ids, order.id, now)
                            .exec(txn)
                            .await
                            .context("mark seats sold")?;
                        if result.rows_affected != seat_ids.len() as u64 {
                            return Err(AdmissionError::NotAvailable.into());
                        }
                    }

                    match order.promotion_id {
                        Some(promotion_id) => increment_usage(txn, promotion_id).await,
                        None => Ok(true),
                    }
                })
            })
            .await
            .map_err(flatten)
    }

    async fn settle(
        &self,
        order: &TicketOrder,
        tickets: &[EventTicket],
        settlement: Settlement,
        now: DateTime<Utc>,
    ) -> Result<(), TicketingServiceError> {
        let order = order.clone();
        let live: Vec<EventTicket> = tickets
            .iter()
            .filter(|t| t.status == TicketStatus::Valid)
            .cloned()
            .collect();
        self.db
            .transaction::<_, (), TicketingServiceError>(|txn| {
                Box::pin(async move {
                    let (payment_status, ticket_status) = match settlement {
                        Settlement::Cancel { payment_status } => {
                            (payment_status, TicketStatus::Cancelled)
                        }
                        Settlement::Refund => (PaymentStatus::Refunded, TicketStatus::Refunded),
                    };

                    let result = ticket_orders::Entity::update_many()
                        .col_expr(
                            ticket_orders::Column::Status,
                            Expr::value(settlement.to_status().as_str()),
                        )
                        .col_expr(
                            ticket_orders::Column::PaymentStatus,
                            Expr::value(payment_status.as_str()),
                        )
                        .col_expr(ticket_orders::Column::UpdatedAt, Expr::value(now))
                        .filter(ticket_orders::Column::Id.eq(order.id))
                        .filter(
                            ticket_orders::Column::Status.eq(settlement.from_status().as_str()),
                        )
                        .exec(txn)
                        .await
                        .context("settle order")?;
                    if result.rows_affected == 0 {
                        return Err(AdmissionError::InvalidTransition.into());
                    }

                    let result = void_tickets_stmt(order.id, settlement, ticket_status)
                        .exec(txn)
                        .await
                        .context("void tickets")?;
                    if settlement == Settlement::Refund && result.rows_affected != live.len() as u64 {
                        // A ticket was admitted after we looked.
                        return Err(AdmissionError::InvalidTransition.into());
                    }

                    let seats_to_free = seat_ids(&live);
                    if !seats_to_free.is_empty() {
                        free_order_seats_stmt(&seats_to_free, settlement, order.id)
                            .exec(txn)
                            .await
                            .context("free seats")?;
                    }

                    for (package_id, n) in package_counts(&live) {
                        decrement_sold(txn, package_id, n).await?;
                    }
                    unregister_attendees(txn, order.event_id, live.len() as u32).await?;
                    Ok(())
                })
            })
            .await
            .map_err(flatten)
    }
}

/// `quantity_sold + n <= quantity_available`, rearranged so the bound is
/// checked before the write.
fn increment_sold_stmt(package_id: Uuid, n: i32) -> UpdateMany<ticket_packages::Entity> {
    ticket_packages::Entity::update_many()
        .col_expr(
            ticket_packages::Column::QuantitySold,
            Expr::col(ticket_packages::Column::QuantitySold).add(n),
        )
        .filter(ticket_packages::Column::Id.eq(package_id))
        .filter(
            Condition::any()
                .add(ticket_packages::Column::QuantityAvailable.is_null())
                .add(
                    Expr::col(ticket_packages::Column::QuantitySold)
                        .lte(Expr::col(ticket_packages::Column::QuantityAvailable).sub(n)),
                ),
        )
}

fn decrement_sold_stmt(package_id: Uuid, n: i32) -> UpdateMany<ticket_packages::Entity> {
    ticket_packages::Entity::update_many()
        .col_expr(
            ticket_packages::Column::QuantitySold,
            Expr::col(ticket_packages::Column::QuantitySold).sub(n),
        )
        .filter(ticket_packages::Column::Id.eq(package_id))
        .filter(ticket_packages::Column::QuantitySold.gte(n))
}

fn register_attendees_stmt(event_id: Uuid, n: i32) -> UpdateMany<events::Entity> {
    events::Entity::update_many()
        .col_expr(
            events::Column::RegisteredCount,
            Expr::col(events::Column::RegisteredCount).add(n),
        )
        .filter(events::Column::Id.eq(event_id))
        .filter(events::Column::RemovedAt.is_null())
        .filter(
            Condition::any()
                .add(events::Column::MaxAttendees.is_null())
                .add(
                    Expr::col(events::Column::RegisteredCount)
                        .lte(Expr::col(events::Column::MaxAttendees).sub(n)),
                ),
        )
}

fn unregister_attendees_stmt(event_id: Uuid, n: i32) -> UpdateMany<events::Entity> {
    events::Entity::update_many()
        .col_expr(
            events::Column::RegisteredCount,
            Expr::col(events::Column::RegisteredCount).sub(n),
        )
        .filter(events::Column::Id.eq(event_id))
        .filter(events::Column::RegisteredCount.gte(n))
}

fn increment_usage_stmt(promotion_id: Uuid) -> UpdateMany<promotions::Entity> {
    promotions::Entity::update_many()
        .col_expr(
            promotions::Column::UsageCount,
            Expr::col(promotions::Column::UsageCount).add(1),
        )
        .filter(promotions::Column::Id.eq(promotion_id))
        .filter(
            Condition::any()
                .add(promotions::Column::UsageLimit.is_null())
                .add(
                    Expr::col(promotions::Column::UsageCount)
                        .lt(Expr::col(promotions::Column::UsageLimit)),
                ),
        )
}

/// Void the order's valid tickets. A refund skips admitted tickets so the
/// row count exposes a check-in that raced the refund.
fn void_tickets_stmt(
    order_id: Uuid,
    settlement: Settlement,
    status: TicketStatus,
) -> UpdateMany<event_tickets::Entity> {
    let voided = event_tickets::Entity::update_many()
        .col_expr(event_tickets::Column::Status, Expr::value(status.as_str()))
        .filter(event_tickets::Column::OrderId.eq(order_id))
        .filter(event_tickets::Column::Status.eq(TicketStatus::Valid.as_str()));
    match settlement {
        Settlement::Refund => voided.filter(event_tickets::Column::CheckedInAt.is_null()),
        Settlement::Cancel { .. } => voided,
    }
}

fn check_in_stmt(ticket_id: Uuid, now: DateTime<Utc>) -> UpdateMany<event_tickets::Entity> {
    event_tickets::Entity::update_many()
        .col_expr(event_tickets::Column::CheckedInAt, Expr::value(now))
        .filter(event_tickets::Column::Id.eq(ticket_id))
        .filter(event_tickets::Column::Status.eq(TicketStatus::Valid.as_str()))
        .filter(event_tickets::Column::CheckedInAt.is_null())
}

async fn increment_sold(
    txn: &DatabaseTransaction,
    package_id: Uuid,
    n: u32,
) -> Result<(), TicketingServiceError> {
    let n = to_i32(n, "ticket count")?;
    let result = increment_sold_stmt(package_id, n)
        .exec(txn)
        .await
        .context("increment quantity sold")?;
    if result.rows_affected == 0 {
        return Err(AdmissionError::CapacityExceeded.into());
    }
    Ok(())
}

async fn decrement_sold(
    txn: &DatabaseTransaction,
    package_id: Uuid,
    n: u32,
) -> Result<(), TicketingServiceError> {
    let n = to_i32(n, "ticket count")?;
    let result = decrement_sold_stmt(package_id, n)
        .exec(txn)
        .await
        .context("decrement quantity sold")?;
    if result.rows_affected == 0 {
        warn!(%package_id, n, "quantity_sold below released count, left unchanged");
    }
    Ok(())
}

async fn register_attendees(
    txn: &DatabaseTransaction,
    event_id: Uuid,
    n: u32,
) -> Result<(), TicketingServiceError> {
    let n = to_i32(n, "attendee count")?;
    let result = register_attendees_stmt(event_id, n)
        .exec(txn)
        .await
        .context("increment registered count")?;
    if result.rows_affected == 0 {
        return Err(AdmissionError::CapacityExceeded.into());
    }
    Ok(())
}

async fn unregister_attendees(
    txn: &DatabaseTransaction,
    event_id: Uuid,
    n: u32,
) -> Result<(), TicketingServiceError> {
    if n == 0 {
        return Ok(());
    }
    let n = to_i32(n, "attendee count")?;
    let result = unregister_attendees_stmt(event_id, n)
        .exec(txn)
        .await
        .context("decrement registered count")?;
    if result.rows_affected == 0 {
        warn!(%event_id, n, "registered_count below released count, left unchanged");
    }
    Ok(())
}

/// Returns `false` when the usage limit was already reached.
async fn increment_usage(
    txn: &DatabaseTransaction,
    promotion_id: Uuid,
) -> Result<bool, TicketingServiceError> {
    let result = increment_usage_stmt(promotion_id)
        .exec(txn)
        .await
        .context("increment promotion usage")?;
    Ok(result.rows_affected > 0)
}

async fn insert_order(
    txn: &DatabaseTransaction,
    order: &TicketOrder,
) -> Result<(), TicketingServiceError> {
    ticket_orders::ActiveModel {
        id: Set(order.id),
        buyer_id: Set(order.buyer_id),
        event_id: Set(order.event_id),
        total_amount: Set(order.total_amount),
        discount_amount: Set(order.discount_amount),
        status: Set(order.status.as_str().to_owned()),
        payment_status: Set(order.payment_status.as_str().to_owned()),
        promo_code: Set(order.promo_code.clone()),
        promotion_id: Set(order.promotion_id),
        expires_at: Set(order.expires_at),
        created_at: Set(order.created_at),
        updated_at: Set(order.updated_at),
    }
    .insert(txn)
    .await
    .context("insert order")?;
    Ok(())
}

async fn insert_tickets(
    txn: &DatabaseTransaction,
    tickets: &[EventTicket],
) -> Result<(), TicketingServiceError> {
    if tickets.is_empty() {
        return Ok(());
    }
    let models = tickets.iter().map(|t| event_tickets::ActiveModel {
        id: Set(t.id),
        event_id: Set(t.event_id),
        package_id: Set(t.package_id),
        order_id: Set(t.order_id),
        attendee_name: Set(t.attendee.name.clone()),
        attendee_email: Set(t.attendee.email.clone()),
        attendee_phone: Set(t.attendee.phone.clone()),
        qr_code: Set(t.qr_code.clone()),
        status: Set(t.status.as_str().to_owned()),
        checked_in_at: Set(t.checked_in_at),
        seat_id: Set(t.seat_id),
        price: Set(t.price),
        created_at: Set(t.created_at),
    });
    event_tickets::Entity::insert_many(models)
        .exec(txn)
        .await
        .context("insert tickets")?;
    Ok(())
}

// ── Ticket repository ────────────────────────────────────────────────────────

#[derive(Clone)]
pub struct DbTicketRepository {
    pub db: DatabaseConnection,
}

impl TicketRepository for DbTicketRepository {
    async fn find_ticket(&self, id: Uuid) -> Result<Option<EventTicket>, TicketingServiceError> {
        let model = event_tickets::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .context("find ticket")?;
        Ok(model.map(ticket_from_model).transpose()?)
    }

    async fn check_in(
        &self,
        ticket_id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<EventTicket, TicketingServiceError> {
        self.db
            .transaction::<_, EventTicket, TicketingServiceError>(|txn| {
                Box::pin(async move {
                    let result = check_in_stmt(ticket_id, now)
                        .exec(txn)
                        .await
                        .context("check in ticket")?;

                    let model = event_tickets::Entity::find_by_id(ticket_id)
                        .one(txn)
                        .await
                        .context("reload ticket")?
                        .ok_or(TicketingServiceError::TicketNotFound)?;
                    if result.rows_affected == 0 {
                        return Err(if model.checked_in_at.is_some() {
                            AdmissionError::AlreadyCheckedIn.into()
                        } else {
                            AdmissionError::InvalidTransition.into()
                        });
                    }

                    events::Entity::update_many()
                        .col_expr(
                            events::Column::CheckedInCount,
                            Expr::col(events::Column::CheckedInCount).add(1),
                        )
                        .filter(events::Column::Id.eq(model.event_id))
                        .exec(txn)
                        .await
                        .context("increment checked-in count")?;

                    Ok(ticket_from_model(model)?)
                })
            })
            .await
            .map_err(flatten)
    }
}

// ── Model mapping ────────────────────────────────────────────────────────────

fn event_from_model(m: events::Model) -> anyhow::Result<Event> {
    Ok(Event {
        id: m.id,
        name: m.name,
        starts_at: m.starts_at,
        ends_at: m.ends_at,
        max_attendees: m
            .max_attendees
            .map(|v| to_u32(v, "max_attendees"))
            .transpose()?,
        registered_count: to_u32(m.registered_count, "registered_count")?,
        checked_in_count: to_u32(m.checked_in_count, "checked_in_count")?,
        removed_at: m.removed_at,
    })
}

fn section_from_model(m: sections::Model) -> anyhow::Result<Section> {
    Ok(Section {
        id: m.id,
        event_id: m.event_id,
        name: m.name,
        capacity: to_u32(m.capacity, "capacity")?,
        row_count: to_u32(m.row_count, "row_count")?,
    })
}

fn seat_from_model(m: seats::Model) -> anyhow::Result<Seat> {
    Ok(Seat {
        id: m.id,
        section_id: m.section_id,
        seat_number: m.seat_number,
        row: m.row_index,
        column: m.column_index,
        status: m.status.parse().context("seat status")?,
        reserved_until: m.reserved_until,
        held_by: m.held_by,
        held_by_order: m.held_by_order,
        price_modifier: m.price_modifier,
    })
}

fn package_from_model(m: ticket_packages::Model) -> anyhow::Result<TicketPackage> {
    Ok(TicketPackage {
        id: m.id,
        event_id: m.event_id,
        name: m.name,
        price: m.price,
        quantity_available: m
            .quantity_available
            .map(|v| to_u32(v, "quantity_available"))
            .transpose()?,
        quantity_sold: to_u32(m.quantity_sold, "quantity_sold")?,
        min_per_order: to_u32(m.min_per_order, "min_per_order")?,
        max_per_order: to_u32(m.max_per_order, "max_per_order")?,
        sale_start: m.sale_start,
        sale_end: m.sale_end,
        is_active: m.is_active,
    })
}

fn promotion_from_model(m: promotions::Model) -> anyhow::Result<Promotion> {
    Ok(Promotion {
        id: m.id,
        event_id: m.event_id,
        code: m.code,
        promo_type: m.promo_type.parse().context("promotion type")?,
        discount_value: m.discount_value,
        min_booking_amount: m.min_booking_amount,
        max_discount_amount: m.max_discount_amount,
        usage_limit: m
            .usage_limit
            .map(|v| to_u32(v, "usage_limit"))
            .transpose()?,
        usage_count: to_u32(m.usage_count, "usage_count")?,
        per_customer_limit: m
            .per_customer_limit
            .map(|v| to_u32(v, "per_customer_limit"))
            .transpose()?,
        start_date: m.start_date,
        end_date: m.end_date,
        priority: m.priority,
        is_active: m.is_active,
        created_at: m.created_at,
    })
}

fn order_from_model(m: ticket_orders::Model) -> anyhow::Result<TicketOrder> {
    Ok(TicketOrder {
        id: m.id,
        buyer_id: m.buyer_id,
        event_id: m.event_id,
        total_amount: m.total_amount,
        discount_amount: m.discount_amount,
        status: m.status.parse().context("order status")?,
        payment_status: m.payment_status.parse().context("payment status")?,
        promo_code: m.promo_code,
        promotion_id: m.promotion_id,
        expires_at: m.expires_at,
        created_at: m.created_at,
        updated_at: m.updated_at,
    })
}

fn ticket_from_model(m: event_tickets::Model) -> anyhow::Result<EventTicket> {
    Ok(EventTicket {
        id: m.id,
        event_id: m.event_id,
        package_id: m.package_id,
        order_id: m.order_id,
        attendee: Attendee {
            name: m.attendee_name,
            email: m.attendee_email,
            phone: m.attendee_phone,
        },
        qr_code: m.qr_code,
        status: m.status.parse().context("ticket status")?,
        checked_in_at: m.checked_in_at,
        seat_id: m.seat_id,
        price: m.price,
        created_at: m.created_at,
    })
}
