//! Individually identified ticket minted by the issuance pipeline.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{AdmissionError, UnknownVariant};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TicketStatus {
    Valid,
    Used,
    Cancelled,
    Refunded,
}

impl TicketStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Valid => "valid",
            Self::Used => "used",
            Self::Cancelled => "cancelled",
            Self::Refunded => "refunded",
        }
    }
}

impl fmt::Display for TicketStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TicketStatus {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "valid" => Ok(Self::Valid),
            "used" => Ok(Self::Used),
            "cancelled" => Ok(Self::Cancelled),
            "refunded" => Ok(Self::Refunded),
            other => Err(UnknownVariant::new("ticket status", other)),
        }
    }
}

/// Optional attendee details captured per ticket.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attendee {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventTicket {
    pub id: Uuid,
    pub event_id: Uuid,
    pub package_id: Uuid,
    pub order_id: Uuid,
    pub attendee: Attendee,
    /// Opaque admission payload.
    pub qr_code: String,
    pub status: TicketStatus,
    pub checked_in_at: Option<DateTime<Utc>>,
    pub seat_id: Option<Uuid>,
    pub price: Decimal,
    pub created_at: DateTime<Utc>,
}

impl EventTicket {
    /// Admit the ticket. Only a `valid`, not-yet-admitted ticket passes;
    /// status is left unchanged.
    pub fn check_in(&mut self, now: DateTime<Utc>) -> Result<(), AdmissionError> {
        if self.checked_in_at.is_some() {
            return Err(AdmissionError::AlreadyCheckedIn);
        }
        if self.status != TicketStatus::Valid {
            return Err(AdmissionError::InvalidTransition);
        }
        self.checked_in_at = Some(now);
        Ok(())
    }

    /// Soft-cancel or refund a ticket that has not been used.
    pub fn void(&mut self, status: TicketStatus) -> Result<(), AdmissionError> {
        if self.status != TicketStatus::Valid
            || !matches!(status, TicketStatus::Cancelled | TicketStatus::Refunded)
        {
            return Err(AdmissionError::InvalidTransition);
        }
        self.status = status;
        Ok(())
    }
}
