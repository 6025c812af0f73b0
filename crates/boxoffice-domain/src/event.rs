//! Top-level container carrying denormalized attendance counters.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::error::AdmissionError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Event {
    pub id: Uuid,
    pub name: String,
    pub starts_at: DateTime<Utc>,
    pub ends_at: DateTime<Utc>,
    /// `None` = unlimited.
    pub max_attendees: Option<u32>,
    pub registered_count: u32,
    pub checked_in_count: u32,
    /// Soft removal; removed events accept no new orders.
    pub removed_at: Option<DateTime<Utc>>,
}

impl Event {
    pub fn is_removed(&self) -> bool {
        self.removed_at.is_some()
    }

    pub fn remaining_capacity(&self) -> Option<u32> {
        self.max_attendees
            .map(|max| max.saturating_sub(self.registered_count))
    }

    /// Compare-and-set registration increment bounded by `max_attendees`.
    pub fn try_register(&mut self, n: u32) -> Result<(), AdmissionError> {
        let next = self
            .registered_count
            .checked_add(n)
            .ok_or(AdmissionError::CapacityExceeded)?;
        if self.max_attendees.is_some_and(|max| next > max) {
            return Err(AdmissionError::CapacityExceeded);
        }
        self.registered_count = next;
        Ok(())
    }

    pub fn unregister(&mut self, n: u32) -> Result<(), AdmissionError> {
        self.registered_count = self
            .registered_count
            .checked_sub(n)
            .ok_or(AdmissionError::InvalidTransition)?;
        Ok(())
    }

    pub fn record_check_in(&mut self) {
        self.checked_in_count += 1;
    }
}
