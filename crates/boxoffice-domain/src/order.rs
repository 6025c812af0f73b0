//! Purchase transaction aggregating issued tickets and a promotion outcome.
//!
//! `pending → confirmed` (payment succeeded), `pending → cancelled` (buyer,
//! payment failure or hold expiry), `confirmed → refunded`.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{AdmissionError, UnknownVariant};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    Pending,
    Confirmed,
    Cancelled,
    Refunded,
}

impl OrderStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Confirmed => "confirmed",
            Self::Cancelled => "cancelled",
            Self::Refunded => "refunded",
        }
    }

    pub fn can_transition_to(self, next: OrderStatus) -> bool {
        matches!(
            (self, next),
            (Self::Pending, Self::Confirmed)
                | (Self::Pending, Self::Cancelled)
                | (Self::Confirmed, Self::Refunded)
        )
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OrderStatus {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "confirmed" => Ok(Self::Confirmed),
            "cancelled" => Ok(Self::Cancelled),
            "refunded" => Ok(Self::Refunded),
            other => Err(UnknownVariant::new("order status", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    Pending,
    Completed,
    Failed,
    Refunded,
}

impl PaymentStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Completed => "completed",
            Self::Failed => "failed",
            Self::Refunded => "refunded",
        }
    }
}

impl fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PaymentStatus {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "completed" => Ok(Self::Completed),
            "failed" => Ok(Self::Failed),
            "refunded" => Ok(Self::Refunded),
            other => Err(UnknownVariant::new("payment status", other)),
        }
    }
}

/// Terminal signal consumed from the payment collaborator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentOutcome {
    Completed,
    Failed,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TicketOrder {
    pub id: Uuid,
    pub buyer_id: Uuid,
    pub event_id: Uuid,
    pub total_amount: Decimal,
    pub discount_amount: Decimal,
    pub status: OrderStatus,
    pub payment_status: PaymentStatus,
    pub promo_code: Option<String>,
    pub promotion_id: Option<Uuid>,
    /// End of the hold window; seats are held until this instant.
    pub expires_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TicketOrder {
    /// A pending order whose hold window has lapsed.
    pub fn is_hold_expired(&self, now: DateTime<Utc>) -> bool {
        self.status == OrderStatus::Pending && self.expires_at < now
    }

    pub fn ensure_transition(&self, next: OrderStatus) -> Result<(), AdmissionError> {
        if self.status.can_transition_to(next) {
            Ok(())
        } else {
            Err(AdmissionError::InvalidTransition)
        }
    }

    pub fn confirm(&mut self, now: DateTime<Utc>) -> Result<(), AdmissionError> {
        self.ensure_transition(OrderStatus::Confirmed)?;
        self.status = OrderStatus::Confirmed;
        self.payment_status = PaymentStatus::Completed;
        self.updated_at = now;
        Ok(())
    }

    pub fn cancel(
        &mut self,
        payment_status: PaymentStatus,
        now: DateTime<Utc>,
    ) -> Result<(), AdmissionError> {
        self.ensure_transition(OrderStatus::Cancelled)?;
        self.status = OrderStatus::Cancelled;
        self.payment_status = payment_status;
        self.updated_at = now;
        Ok(())
    }

    pub fn refund(&mut self, now: DateTime<Utc>) -> Result<(), AdmissionError> {
        self.ensure_transition(OrderStatus::Refunded)?;
        self.status = OrderStatus::Refunded;
        self.payment_status = PaymentStatus::Refunded;
        self.updated_at = now;
        Ok(())
    }

    /// Orders that count toward a promotion's per-customer limit.
    pub fn counts_toward_promo_usage(&self) -> bool {
        matches!(self.status, OrderStatus::Pending | OrderStatus::Confirmed)
    }
}
