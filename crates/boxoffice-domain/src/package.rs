//! Priced ticket tier with its own quantity cap and sale window.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use uuid::Uuid;

use crate::error::AdmissionError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TicketPackage {
    pub id: Uuid,
    pub event_id: Uuid,
    pub name: String,
    pub price: Decimal,
    /// `None` = unlimited.
    pub quantity_available: Option<u32>,
    pub quantity_sold: u32,
    pub min_per_order: u32,
    pub max_per_order: u32,
    pub sale_start: Option<DateTime<Utc>>,
    pub sale_end: Option<DateTime<Utc>>,
    pub is_active: bool,
}

/// The availability clause that failed. Clauses are independent; the
/// first failing one in declaration order is reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Unavailable {
    Inactive,
    NotYetOnSale,
    SaleEnded,
    SoldOut,
}

impl From<Unavailable> for AdmissionError {
    fn from(reason: Unavailable) -> Self {
        match reason {
            Unavailable::Inactive => AdmissionError::NotAvailable,
            Unavailable::NotYetOnSale | Unavailable::SaleEnded => AdmissionError::ExpiredWindow,
            Unavailable::SoldOut => AdmissionError::CapacityExceeded,
        }
    }
}

/// `GET availability(packageId)` projection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PackageAvailability {
    pub package_id: Uuid,
    pub available: bool,
    pub remaining: Option<u32>,
}

impl TicketPackage {
    pub fn is_on_sale(&self, now: DateTime<Utc>) -> bool {
        self.sale_start.is_none_or(|start| start <= now)
            && self.sale_end.is_none_or(|end| end >= now)
    }

    pub fn is_sold_out(&self) -> bool {
        self.quantity_available
            .is_some_and(|cap| self.quantity_sold >= cap)
    }

    /// Units left to sell; `None` when unlimited.
    pub fn remaining(&self) -> Option<u32> {
        self.quantity_available
            .map(|cap| cap.saturating_sub(self.quantity_sold))
    }

    pub fn availability_check(&self, now: DateTime<Utc>) -> Result<(), Unavailable> {
        if !self.is_active {
            return Err(Unavailable::Inactive);
        }
        if self.sale_start.is_some_and(|start| start > now) {
            return Err(Unavailable::NotYetOnSale);
        }
        if self.sale_end.is_some_and(|end| end < now) {
            return Err(Unavailable::SaleEnded);
        }
        if self.is_sold_out() {
            return Err(Unavailable::SoldOut);
        }
        Ok(())
    }

    /// `is_active ∧ on sale ∧ not sold out`.
    pub fn is_available(&self, now: DateTime<Utc>) -> bool {
        self.availability_check(now).is_ok()
    }

    pub fn availability(&self, now: DateTime<Utc>) -> PackageAvailability {
        PackageAvailability {
            package_id: self.id,
            available: self.is_available(now),
            remaining: self.remaining(),
        }
    }

    /// Check a requested quantity against `[min_per_order, max_per_order]`.
    pub fn validate_quantity(&self, quantity: u32) -> Result<(), AdmissionError> {
        if quantity == 0 || quantity < self.min_per_order || quantity > self.max_per_order {
            return Err(AdmissionError::InvalidQuantity);
        }
        Ok(())
    }

    /// Compare-and-set increment: succeeds only if the result stays within the
    /// cap. Leaves the package untouched on failure.
    pub fn try_increment_sold(&mut self, n: u32) -> Result<(), AdmissionError> {
        let next = self
            .quantity_sold
            .checked_add(n)
            .ok_or(AdmissionError::CapacityExceeded)?;
        if self.quantity_available.is_some_and(|cap| next > cap) {
            return Err(AdmissionError::CapacityExceeded);
        }
        self.quantity_sold = next;
        Ok(())
    }

    /// Symmetric decrement used by cancellation and refund.
    pub fn decrement_sold(&mut self, n: u32) -> Result<(), AdmissionError> {
        self.quantity_sold = self
            .quantity_sold
            .checked_sub(n)
            .ok_or(AdmissionError::InvalidTransition)?;
        Ok(())
    }
}
