//! Domain fixture builders with sensible defaults.
//!
//! Every builder returns a plain struct; override fields with struct update
//! syntax.
//!
//! ```no_run
//! use boxoffice_testing::fixture;
//! let event = fixture::event();
//! let pkg = boxoffice_domain::package::TicketPackage {
//!     quantity_available: Some(2),
//!     ..fixture::package(event.id)
//! };
//! ```

use chrono::{DateTime, Duration, TimeZone, Utc};
use rust_decimal::Decimal;
use uuid::Uuid;

use boxoffice_domain::event::Event;
use boxoffice_domain::package::TicketPackage;
use boxoffice_domain::promotion::{PromoType, Promotion};
use boxoffice_domain::seat::{Seat, SeatStatus};
use boxoffice_domain::section::Section;

/// Fixed reference instant all fixtures are relative to.
pub fn t0() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap()
}

pub fn event() -> Event {
    Event {
        id: Uuid::new_v4(),
        name: "Summer Gala".to_owned(),
        starts_at: t0() + Duration::days(30),
        ends_at: t0() + Duration::days(30) + Duration::hours(4),
        max_attendees: None,
        registered_count: 0,
        checked_in_count: 0,
        removed_at: None,
    }
}

pub fn section(event_id: Uuid) -> Section {
    Section {
        id: Uuid::new_v4(),
        event_id,
        name: "Orchestra".to_owned(),
        capacity: 100,
        row_count: 10,
    }
}

pub fn seat(section_id: Uuid, number: u32) -> Seat {
    Seat {
        id: Uuid::new_v4(),
        section_id,
        seat_number: format!("A{number}"),
        row: 1,
        column: i32::try_from(number).unwrap(),
        status: SeatStatus::Available,
        reserved_until: None,
        held_by: None,
        held_by_order: None,
        price_modifier: Decimal::ZERO,
    }
}

/// General admission tier on sale around [`t0`].
pub fn package(event_id: Uuid) -> TicketPackage {
    TicketPackage {
        id: Uuid::new_v4(),
        event_id,
        name: "General".to_owned(),
        price: Decimal::from(20),
        quantity_available: Some(100),
        quantity_sold: 0,
        min_per_order: 1,
        max_per_order: 10,
        sale_start: Some(t0() - Duration::days(7)),
        sale_end: Some(t0() + Duration::days(7)),
        is_active: true,
    }
}

/// Code-based 10% promotion valid around [`t0`].
pub fn promotion(code: &str) -> Promotion {
    Promotion {
        id: Uuid::new_v4(),
        event_id: None,
        code: Some(code.to_owned()),
        promo_type: PromoType::Percentage,
        discount_value: Decimal::from(10),
        min_booking_amount: None,
        max_discount_amount: None,
        usage_limit: None,
        usage_count: 0,
        per_customer_limit: None,
        start_date: t0() - Duration::days(1),
        end_date: t0() + Duration::days(1),
        priority: 0,
        is_active: true,
        created_at: t0() - Duration::days(10),
    }
}

pub fn automatic_promotion(priority: i32) -> Promotion {
    Promotion {
        code: None,
        priority,
        ..promotion("unused")
    }
}
