use serde::Deserialize;

use boxoffice_core::config::Config;

/// Ticketing service configuration loaded from environment variables.
#[derive(Debug, Clone, Deserialize)]
pub struct TicketingConfig {
    /// PostgreSQL connection URL.
    pub database_url: String,
    /// TCP port for the HTTP server. Env var: `TICKETING_PORT`.
    #[serde(default = "default_port")]
    pub ticketing_port: u16,
    /// Seat hold length when the caller does not ask for one.
    #[serde(default = "default_hold_minutes")]
    pub default_hold_minutes: u32,
    /// Upper bound on caller-requested hold length.
    #[serde(default = "default_max_hold_minutes")]
    pub max_hold_minutes: u32,
    /// How long a pending order keeps its seats and counters.
    #[serde(default = "default_hold_minutes")]
    pub order_hold_minutes: u32,
}

fn default_port() -> u16 {
    3120
}

fn default_hold_minutes() -> u32 {
    boxoffice_domain::seat::DEFAULT_HOLD_MINUTES as u32
}

fn default_max_hold_minutes() -> u32 {
    60
}

impl Config for TicketingConfig {}

/// Hold-window policy handed to use cases.
#[derive(Debug, Clone, Copy)]
pub struct HoldPolicy {
    pub default_minutes: u32,
    pub max_minutes: u32,
    pub order_minutes: u32,
}

impl From<&TicketingConfig> for HoldPolicy {
    fn from(config: &TicketingConfig) -> Self {
        Self {
            default_minutes: config.default_hold_minutes,
            max_minutes: config.max_hold_minutes,
            order_minutes: config.order_hold_minutes,
        }
    }
}

impl Default for HoldPolicy {
    fn default() -> Self {
        Self {
            default_minutes: default_hold_minutes(),
            max_minutes: default_max_hold_minutes(),
            order_minutes: default_hold_minutes(),
        }
    }
}
