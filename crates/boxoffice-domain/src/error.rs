//! Admission error taxonomy returned by every inventory transition.

/// Synchronous, caller-visible rejection of an inventory or order transition.
///
/// None of these are retried internally; retry policy belongs to the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum AdmissionError {
    /// Seat or package already taken, blocked or inactive.
    #[error("not available")]
    NotAvailable,
    /// Outside the sale window or the hold window.
    #[error("outside sale window")]
    ExpiredWindow,
    /// Would breach `quantity_available` or `max_attendees`.
    #[error("capacity exceeded")]
    CapacityExceeded,
    /// The entity is not in a state that permits the transition.
    #[error("invalid transition")]
    InvalidTransition,
    /// Check-in attempted on a ticket that was already admitted.
    #[error("already checked in")]
    AlreadyCheckedIn,
    /// Promotion exists but cannot be applied to this order.
    #[error("promotion ineligible")]
    PromoIneligible,
    /// Requested quantity violates per-order bounds.
    #[error("invalid quantity")]
    InvalidQuantity,
}

/// A persisted enum column held a value this build does not know.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown {kind} value: {value}")]
pub struct UnknownVariant {
    pub kind: &'static str,
    pub value: String,
}

impl UnknownVariant {
    pub fn new(kind: &'static str, value: &str) -> Self {
        Self {
            kind,
            value: value.to_owned(),
        }
    }
}
