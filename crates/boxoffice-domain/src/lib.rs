//! Domain types shared across Boxoffice services.
//!
//! This crate contains only pure types and state transitions with no framework
//! dependencies. Import in `usecase/` and `domain/` layers; storage adapters map
//! their rows into these types and must apply the same predicates.

pub mod clock;
pub mod error;
pub mod event;
pub mod order;
pub mod package;
pub mod promotion;
pub mod seat;
pub mod section;
pub mod ticket;
