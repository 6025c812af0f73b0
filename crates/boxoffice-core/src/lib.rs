//! Shared HTTP plumbing for Boxoffice services.

pub mod config;
pub mod error;
pub mod health;
pub mod identity;
pub mod middleware;
pub mod serde;
pub mod tracing;
