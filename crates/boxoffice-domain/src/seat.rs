//! Seat inventory unit and its hold/expiry state machine.
//!
//! `available → reserved → sold`, `reserved → available` (release or expiry),
//! `available | reserved → blocked` (administrative, external).
//!
//! Expiry is lazy: a `reserved` seat whose `reserved_until` lies in the past is
//! `available` for every purpose. Never branch on [`Seat::status`] directly;
//! go through [`Seat::effective_status`].

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Duration, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{AdmissionError, UnknownVariant};

/// Hold length applied when the caller does not choose one.
pub const DEFAULT_HOLD_MINUTES: i64 = 15;

/// Persisted seat status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SeatStatus {
    Available,
    Reserved,
    Sold,
    Blocked,
}

impl SeatStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Available => "available",
            Self::Reserved => "reserved",
            Self::Sold => "sold",
            Self::Blocked => "blocked",
        }
    }
}

impl fmt::Display for SeatStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SeatStatus {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "available" => Ok(Self::Available),
            "reserved" => Ok(Self::Reserved),
            "sold" => Ok(Self::Sold),
            "blocked" => Ok(Self::Blocked),
            other => Err(UnknownVariant::new("seat status", other)),
        }
    }
}

/// End of a hold started at `now` lasting `minutes`.
pub fn hold_deadline(now: DateTime<Utc>, minutes: i64) -> DateTime<Utc> {
    now + Duration::minutes(minutes)
}

/// A single seat owned by exactly one section.
///
/// Invariant: `status == Reserved ⟺ reserved_until.is_some() ⟺ held_by.is_some()`,
/// and `held_by_order.is_some() ⟹ status == Reserved`.
///
/// A hold is either stand-alone (`held_by_order` empty, placed through the
/// seat-hold API) or owned by a pending order. Only a stand-alone hold can be
/// carried into an order or released by its buyer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Seat {
    pub id: Uuid,
    pub section_id: Uuid,
    pub seat_number: String,
    pub row: i32,
    pub column: i32,
    pub status: SeatStatus,
    pub reserved_until: Option<DateTime<Utc>>,
    pub held_by: Option<Uuid>,
    pub held_by_order: Option<Uuid>,
    /// Added to the package price for tickets bound to this seat.
    pub price_modifier: Decimal,
}

impl Seat {
    /// `status == reserved && reserved_until < now`.
    pub fn is_reservation_expired(&self, now: DateTime<Utc>) -> bool {
        self.status == SeatStatus::Reserved && self.reserved_until.is_some_and(|until| until < now)
    }

    /// Status with lazy expiry applied. The only sanctioned way to read status.
    pub fn effective_status(&self, now: DateTime<Utc>) -> SeatStatus {
        if self.is_reservation_expired(now) {
            SeatStatus::Available
        } else {
            self.status
        }
    }

    /// Buyer holding a live (unexpired) reservation, if any.
    pub fn holder(&self, now: DateTime<Utc>) -> Option<Uuid> {
        match self.effective_status(now) {
            SeatStatus::Reserved => self.held_by,
            _ => None,
        }
    }

    /// Live stand-alone hold owned by `buyer`.
    pub fn is_standalone_hold_of(&self, buyer: Uuid, now: DateTime<Utc>) -> bool {
        self.holder(now) == Some(buyer) && self.held_by_order.is_none()
    }

    /// Whether `buyer` may put this seat into an order: it is free, or the
    /// live stand-alone hold on it belongs to `buyer`. A seat already bound
    /// to a pending order is never claimable, not even by the same buyer.
    pub fn can_be_claimed_by(&self, buyer: Uuid, now: DateTime<Utc>) -> bool {
        match self.effective_status(now) {
            SeatStatus::Available => true,
            SeatStatus::Reserved => self.is_standalone_hold_of(buyer, now),
            SeatStatus::Sold | SeatStatus::Blocked => false,
        }
    }

    /// Whether the seat can be sold to `order_id`: it is free, or its live
    /// hold belongs to that order.
    pub fn can_be_sold_to(&self, order_id: Uuid, now: DateTime<Utc>) -> bool {
        match self.effective_status(now) {
            SeatStatus::Available => true,
            SeatStatus::Reserved => self.held_by_order == Some(order_id),
            SeatStatus::Sold | SeatStatus::Blocked => false,
        }
    }

    /// Place a new hold. Fails with `NotAvailable` unless the seat is
    /// (effectively) available; a failed attempt mutates nothing.
    pub fn reserve(
        &mut self,
        buyer: Uuid,
        until: DateTime<Utc>,
        now: DateTime<Utc>,
    ) -> Result<(), AdmissionError> {
        if self.effective_status(now) != SeatStatus::Available {
            return Err(AdmissionError::NotAvailable);
        }
        self.set_hold(buyer, None, until);
        Ok(())
    }

    /// Hold the seat for an order. Like [`Seat::reserve`], but a live
    /// stand-alone hold owned by the same buyer is taken over and re-timed.
    pub fn claim_for_order(
        &mut self,
        buyer: Uuid,
        order_id: Uuid,
        until: DateTime<Utc>,
        now: DateTime<Utc>,
    ) -> Result<(), AdmissionError> {
        if !self.can_be_claimed_by(buyer, now) {
            return Err(AdmissionError::NotAvailable);
        }
        self.set_hold(buyer, Some(order_id), until);
        Ok(())
    }

    /// Drop a hold. Only valid from `reserved`; a lapsed hold lands in the
    /// same `available` state.
    pub fn release(&mut self) -> Result<(), AdmissionError> {
        if self.status != SeatStatus::Reserved {
            return Err(AdmissionError::InvalidTransition);
        }
        self.clear_hold(SeatStatus::Available);
        Ok(())
    }

    /// Convert to a sale for `order_id`. Allowed from `available` (the
    /// order's hold lapsed but nobody took the seat) or from the order's own
    /// reservation.
    pub fn mark_sold(&mut self, order_id: Uuid, now: DateTime<Utc>) -> Result<(), AdmissionError> {
        if !self.can_be_sold_to(order_id, now) {
            return Err(AdmissionError::NotAvailable);
        }
        self.clear_hold(SeatStatus::Sold);
        Ok(())
    }

    /// Return a sold seat to the pool after its ticket was refunded.
    pub fn restock(&mut self) -> Result<(), AdmissionError> {
        if self.status != SeatStatus::Sold {
            return Err(AdmissionError::InvalidTransition);
        }
        self.clear_hold(SeatStatus::Available);
        Ok(())
    }

    fn set_hold(&mut self, buyer: Uuid, order_id: Option<Uuid>, until: DateTime<Utc>) {
        self.status = SeatStatus::Reserved;
        self.reserved_until = Some(until);
        self.held_by = Some(buyer);
        self.held_by_order = order_id;
    }

    fn clear_hold(&mut self, status: SeatStatus) {
        self.status = status;
        self.reserved_until = None;
        self.held_by = None;
        self.held_by_order = None;
    }
}
