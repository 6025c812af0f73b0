//! Capacity container grouping seats under an event.

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::seat::{Seat, SeatStatus};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Section {
    pub id: Uuid,
    pub event_id: Uuid,
    pub name: String,
    pub capacity: u32,
    pub row_count: u32,
}

/// Read-only projection of a section's seats by effective status.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SectionAvailability {
    pub section_id: Uuid,
    pub name: String,
    pub capacity: u32,
    pub available: u32,
    pub reserved: u32,
    pub sold: u32,
    pub blocked: u32,
}

impl SectionAvailability {
    /// Count `seats` belonging to `section`, applying lazy expiry at `now`.
    pub fn tally<'a>(
        section: &Section,
        seats: impl IntoIterator<Item = &'a Seat>,
        now: DateTime<Utc>,
    ) -> Self {
        let mut out = Self {
            section_id: section.id,
            name: section.name.clone(),
            capacity: section.capacity,
            available: 0,
            reserved: 0,
            sold: 0,
            blocked: 0,
        };
        for seat in seats.into_iter().filter(|s| s.section_id == section.id) {
            match seat.effective_status(now) {
                SeatStatus::Available => out.available += 1,
                SeatStatus::Reserved => out.reserved += 1,
                SeatStatus::Sold => out.sold += 1,
                SeatStatus::Blocked => out.blocked += 1,
            }
        }
        out
    }
}
