//! Test utilities for Boxoffice services.
//!
//! Provides `ManualClock`, gateway identity headers and domain fixture
//! builders. Import from dev-dependencies only, never from production code.

pub mod auth;
pub mod clock;
pub mod fixture;
