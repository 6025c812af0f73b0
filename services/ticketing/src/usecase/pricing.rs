//! Order validation and pricing shared by quote and checkout.

use std::collections::{HashMap, HashSet};

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use uuid::Uuid;

use boxoffice_domain::error::AdmissionError;
use boxoffice_domain::package::TicketPackage;
use boxoffice_domain::promotion::{PromoContext, Promotion, select_automatic};
use boxoffice_domain::seat::Seat;

use crate::domain::repository::{CatalogRepository, PromotionRepository};
use crate::domain::types::{OrderRequest, PricedLine, PricedOrder};
use crate::error::TicketingServiceError;

/// Validate `request` against current inventory and price it.
///
/// Reads only. Capacity is pre-checked here so quotes report it, but the
/// authoritative check is the conditional update at issuance.
pub async fn price_order<C, P>(
    catalog: &C,
    promotions: &P,
    request: &OrderRequest,
    now: DateTime<Utc>,
) -> Result<PricedOrder, TicketingServiceError>
where
    C: CatalogRepository,
    P: PromotionRepository,
{
    if request.items.is_empty() {
        return Err(TicketingServiceError::MissingData);
    }

    let event = catalog
        .find_event(request.event_id)
        .await?
        .ok_or(TicketingServiceError::EventNotFound)?;
    if event.is_removed() {
        return Err(AdmissionError::NotAvailable.into());
    }

    let section_ids: HashSet<Uuid> = catalog
        .list_sections(event.id)
        .await?
        .into_iter()
        .map(|s| s.id)
        .collect();
    let seated = !section_ids.is_empty();

    // Quantity per package across items, plus seat bookkeeping.
    let mut per_package: Vec<(Uuid, u32)> = Vec::new();
    let mut requested_seats: Vec<Uuid> = Vec::new();
    for item in &request.items {
        if item.quantity == 0 {
            return Err(AdmissionError::InvalidQuantity.into());
        }
        if seated && item.seat_ids.len() != item.quantity as usize {
            return Err(AdmissionError::InvalidQuantity.into());
        }
        if !seated && !item.seat_ids.is_empty() {
            return Err(TicketingServiceError::SeatNotFound);
        }
        requested_seats.extend(&item.seat_ids);
        match per_package.iter_mut().find(|(id, _)| *id == item.package_id) {
            Some((_, qty)) => {
                *qty = qty
                    .checked_add(item.quantity)
                    .ok_or(AdmissionError::InvalidQuantity)?;
            }
            None => per_package.push((item.package_id, item.quantity)),
        }
    }
    let distinct_seats: HashSet<Uuid> = requested_seats.iter().copied().collect();
    if distinct_seats.len() != requested_seats.len() {
        return Err(AdmissionError::InvalidQuantity.into());
    }

    let mut packages: HashMap<Uuid, TicketPackage> = HashMap::new();
    let mut ticket_count = 0u32;
    for &(package_id, quantity) in &per_package {
        let package = catalog
            .find_package(package_id)
            .await?
            .filter(|p| p.event_id == event.id)
            .ok_or(TicketingServiceError::PackageNotFound)?;
        package.validate_quantity(quantity)?;
        package
            .availability_check(now)
            .map_err(AdmissionError::from)?;
        package.clone().try_increment_sold(quantity)?;
        ticket_count = ticket_count
            .checked_add(quantity)
            .ok_or(AdmissionError::InvalidQuantity)?;
        packages.insert(package_id, package);
    }
    event.clone().try_register(ticket_count)?;

    let seats: HashMap<Uuid, Seat> = if requested_seats.is_empty() {
        HashMap::new()
    } else {
        catalog
            .find_seats(&requested_seats)
            .await?
            .into_iter()
            .filter(|s| section_ids.contains(&s.section_id))
            .map(|s| (s.id, s))
            .collect()
    };
    if seats.len() != requested_seats.len() {
        return Err(TicketingServiceError::SeatNotFound);
    }
    if seats
        .values()
        .any(|s| !s.can_be_claimed_by(request.buyer_id, now))
    {
        return Err(AdmissionError::NotAvailable.into());
    }

    let mut lines = Vec::with_capacity(ticket_count as usize);
    for item in &request.items {
        let package = &packages[&item.package_id];
        for i in 0..item.quantity as usize {
            let seat = item.seat_ids.get(i).map(|id| &seats[id]);
            let modifier = seat.map_or(Decimal::ZERO, |s| s.price_modifier);
            lines.push(PricedLine {
                package_id: package.id,
                seat_id: seat.map(|s| s.id),
                unit_price: (package.price + modifier).max(Decimal::ZERO),
                attendee: item.attendees.get(i).cloned().unwrap_or_default(),
            });
        }
    }
    let subtotal: Decimal = lines.iter().map(|l| l.unit_price).sum();

    let ctx = PromoContext {
        event_id: event.id,
        subtotal,
        ticket_count,
        prior_uses: 0,
    };
    let promotion = resolve_promotion(
        promotions,
        request.buyer_id,
        request.promo_code.as_deref(),
        &ctx,
        now,
    )
    .await?;
    let discount_amount = promotion
        .as_ref()
        .map_or(Decimal::ZERO, |p| p.compute_discount(subtotal));

    Ok(PricedOrder {
        event_id: event.id,
        lines,
        subtotal,
        discount_amount,
        total_amount: subtotal - discount_amount,
        promotion,
    })
}

/// A supplied code must be eligible or the order fails. Without a code,
/// the best eligible automatic promotion applies, if any.
async fn resolve_promotion<P>(
    promotions: &P,
    buyer_id: Uuid,
    code: Option<&str>,
    ctx: &PromoContext,
    now: DateTime<Utc>,
) -> Result<Option<Promotion>, TicketingServiceError>
where
    P: PromotionRepository,
{
    if let Some(code) = code.map(str::trim).filter(|c| !c.is_empty()) {
        let promo = promotions
            .find_by_code(code)
            .await?
            .ok_or(TicketingServiceError::PromoNotFound)?;
        let uses = promotions.count_buyer_uses(buyer_id, &[promo.id]).await?;
        let ctx = PromoContext {
            prior_uses: uses.get(&promo.id).copied().unwrap_or(0),
            ..*ctx
        };
        promo.check_eligible(&ctx, now)?;
        return Ok(Some(promo));
    }

    let candidates = promotions.list_automatic(ctx.event_id).await?;
    if candidates.is_empty() {
        return Ok(None);
    }
    let ids: Vec<Uuid> = candidates.iter().map(|p| p.id).collect();
    let uses = promotions.count_buyer_uses(buyer_id, &ids).await?;
    let chosen = select_automatic(&candidates, |p| {
        let ctx = PromoContext {
            prior_uses: uses.get(&p.id).copied().unwrap_or(0),
            ..*ctx
        };
        p.check_eligible(&ctx, now).is_ok()
    });
    Ok(chosen.cloned())
}
