//! Discount rules applied at order time.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{AdmissionError, UnknownVariant};

/// Minimum ticket count for a `bundle` promotion to apply.
pub const BUNDLE_MIN_TICKETS: u32 = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PromoType {
    Percentage,
    FixedAmount,
    /// Fixed amount off, only for orders of at least [`BUNDLE_MIN_TICKETS`].
    Bundle,
    /// Percentage off; the promotion's date range is the early-bird period.
    EarlyBird,
}

impl PromoType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Percentage => "percentage",
            Self::FixedAmount => "fixed_amount",
            Self::Bundle => "bundle",
            Self::EarlyBird => "early_bird",
        }
    }
}

impl fmt::Display for PromoType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PromoType {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "percentage" => Ok(Self::Percentage),
            "fixed_amount" => Ok(Self::FixedAmount),
            "bundle" => Ok(Self::Bundle),
            "early_bird" => Ok(Self::EarlyBird),
            other => Err(UnknownVariant::new("promotion type", other)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Promotion {
    pub id: Uuid,
    /// `None` = valid for any event.
    pub event_id: Option<Uuid>,
    /// `None` = automatic promotion, applied without a code.
    pub code: Option<String>,
    pub promo_type: PromoType,
    pub discount_value: Decimal,
    pub min_booking_amount: Option<Decimal>,
    pub max_discount_amount: Option<Decimal>,
    pub usage_limit: Option<u32>,
    pub usage_count: u32,
    pub per_customer_limit: Option<u32>,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub priority: i32,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

/// Order facts a promotion is judged against.
#[derive(Debug, Clone, Copy)]
pub struct PromoContext {
    pub event_id: Uuid,
    pub subtotal: Decimal,
    pub ticket_count: u32,
    /// Buyer's prior non-cancelled orders carrying this promotion.
    pub prior_uses: u64,
}

impl Promotion {
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.end_date < now
    }

    pub fn is_upcoming(&self, now: DateTime<Utc>) -> bool {
        self.start_date > now
    }

    pub fn is_exhausted(&self) -> bool {
        self.usage_limit
            .is_some_and(|limit| self.usage_count >= limit)
    }

    pub fn is_automatic(&self) -> bool {
        self.code.is_none()
    }

    /// `is_active ∧ ¬expired ∧ ¬upcoming ∧ ¬exhausted`.
    pub fn can_be_used(&self, now: DateTime<Utc>) -> bool {
        self.is_active && !self.is_expired(now) && !self.is_upcoming(now) && !self.is_exhausted()
    }

    pub fn applies_to_event(&self, event_id: Uuid) -> bool {
        self.event_id.is_none_or(|id| id == event_id)
    }

    /// Full eligibility gate, evaluated before any discount is computed.
    pub fn check_eligible(
        &self,
        ctx: &PromoContext,
        now: DateTime<Utc>,
    ) -> Result<(), AdmissionError> {
        if !self.can_be_used(now) || !self.applies_to_event(ctx.event_id) {
            return Err(AdmissionError::PromoIneligible);
        }
        if self
            .min_booking_amount
            .is_some_and(|min| ctx.subtotal < min)
        {
            return Err(AdmissionError::PromoIneligible);
        }
        if self
            .per_customer_limit
            .is_some_and(|limit| ctx.prior_uses >= u64::from(limit))
        {
            return Err(AdmissionError::PromoIneligible);
        }
        if self.promo_type == PromoType::Bundle && ctx.ticket_count < BUNDLE_MIN_TICKETS {
            return Err(AdmissionError::PromoIneligible);
        }
        Ok(())
    }

    /// Discount on `subtotal`, rounded to cents, never exceeding `subtotal`.
    pub fn compute_discount(&self, subtotal: Decimal) -> Decimal {
        let raw = match self.promo_type {
            PromoType::Percentage | PromoType::EarlyBird => {
                let pct = subtotal * self.discount_value / Decimal::ONE_HUNDRED;
                match self.max_discount_amount {
                    Some(cap) => pct.min(cap),
                    None => pct,
                }
            }
            PromoType::FixedAmount | PromoType::Bundle => self.discount_value,
        };
        raw.max(Decimal::ZERO).min(subtotal).round_dp(2)
    }

    /// Compare-and-set usage increment, refused once the limit is reached.
    pub fn try_increment_usage(&mut self) -> Result<(), AdmissionError> {
        if self.is_exhausted() {
            return Err(AdmissionError::PromoIneligible);
        }
        self.usage_count += 1;
        Ok(())
    }
}

/// Precedence among automatic promotions: highest priority first, then
/// earliest created, then id for a total order.
pub fn automatic_precedence(a: &Promotion, b: &Promotion) -> Ordering {
    b.priority
        .cmp(&a.priority)
        .then_with(|| a.created_at.cmp(&b.created_at))
        .then_with(|| a.id.cmp(&b.id))
}

/// Pick exactly one automatic promotion among those `eligible` accepts.
pub fn select_automatic<'a, I, F>(candidates: I, mut eligible: F) -> Option<&'a Promotion>
where
    I: IntoIterator<Item = &'a Promotion>,
    F: FnMut(&Promotion) -> bool,
{
    let mut ranked: Vec<&Promotion> = candidates
        .into_iter()
        .filter(|p| p.is_automatic())
        .collect();
    ranked.sort_by(|a, b| automatic_precedence(a, b));
    ranked.into_iter().find(|p| eligible(p))
}
