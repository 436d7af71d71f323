use anyhow::{Context, Result};
use bevy::prelude::Resource;
use tracing_subscriber::EnvFilter;

use crate::constants::{DEFAULT_LOG_FILTER, TICK_RATE_HZ};

// ============================================================================
// Server Configuration
// ============================================================================

// Runtime settings, filled from the command line
#[derive(Resource, Debug, Clone, PartialEq)]
pub struct ServerConfig {
    // Name of the player whose items and posture drive the effects
    pub admin: Option<String>,
    pub tick_rate: u32,
    // Flat solid ground plane; none means open void
    pub ground_level: Option<f32>,
    pub log_filter: String,
    pub max_ticks: Option<u64>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            admin: None,
            tick_rate: TICK_RATE_HZ,
            ground_level: None,
            log_filter: DEFAULT_LOG_FILTER.to_string(),
            max_ticks: None,
        }
    }
}

impl ServerConfig {
    #[must_use]
    pub fn is_admin(&self, name: &str) -> bool {
        self.admin.as_deref() == Some(name)
    }
}

// ============================================================================
// Logging
// ============================================================================

// RUST_LOG wins over the configured filter when set.
pub fn init_tracing(filter: &str) -> Result<()> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(filter).with_context(|| format!("invalid log filter '{filter}'"))?,
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .try_init()
        .map_err(|e| anyhow::anyhow!("failed to install tracing subscriber: {e}"))
}
