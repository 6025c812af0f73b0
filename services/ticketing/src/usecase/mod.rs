pub mod availability;
pub mod check_in;
pub mod hold;
pub mod order;
pub mod pricing;
pub mod settlement;
