pub mod availability;
pub mod health;
pub mod holds;
pub mod orders;
pub mod tickets;
