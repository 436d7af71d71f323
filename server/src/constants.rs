// ============================================================================
// Server Loop
// ============================================================================

pub const TICK_RATE_HZ: u32 = 20;
pub const DEFAULT_LOG_FILTER: &str = "info";

// Most recent explosions and feedback lines kept for inspection
pub const EFFECTS_HISTORY: usize = 32;

// ============================================================================
// Host Entities
// ============================================================================

// Player hitbox and eye height (blocks)
pub const PLAYER_WIDTH: f32 = 0.6;
pub const PLAYER_HEIGHT: f32 = 1.8;
pub const PLAYER_EYE_HEIGHT: f32 = 1.62;

// Creature hitbox (blocks)
pub const CREATURE_WIDTH: f32 = 0.6;
pub const CREATURE_HEIGHT: f32 = 1.95;

// ============================================================================
// Administrative Command
// ============================================================================

pub const COMMAND_NAME: &str = "pyre";
pub const ACK_TEXT: &str = "Pyre";
pub const ACK_COLOUR: (u8, u8, u8) = (194, 0, 0);
