//! sea-orm entities for the ticketing service tables.

pub mod event_tickets;
pub mod events;
pub mod promotions;
pub mod seats;
pub mod sections;
pub mod ticket_orders;
pub mod ticket_packages;
