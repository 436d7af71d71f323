// ============================================================================
// Floating-Point Comparisons
// ============================================================================

// Small value for floating-point comparisons (near-zero checks, division guards).
pub const PHYSICS_EPSILON: f32 = 1e-6;

// ============================================================================
// Magma Block Projectile
// ============================================================================

// Limits
pub const MAGMA_LIFETIME_TICKS: u32 = 100;
pub const MAGMA_MAX_DISTANCE: f32 = 256.0; // blocks

// Motion (per tick)
pub const MAGMA_LAUNCH_SPEED: f32 = 1.5; // blocks per tick along the look direction
pub const MAGMA_DRAG: f32 = 0.99; // velocity multiplier before moving
pub const MAGMA_GRAVITY: f32 = 0.04; // subtracted from velocity.y before moving
pub const MAGMA_BOOST: f32 = 1.1; // velocity multiplier after moving

// Impact
pub const RAY_SIZE: f32 = 1.0; // hitbox inflation used by the impact ray
pub const EXPLOSION_POWER: f32 = 15.0;

// Exhaust cosmetics
pub const EXHAUST_PARTICLES: usize = 20;
pub const EXHAUST_WIGGLE: f32 = 0.4;
pub const EXHAUST_SOUND_VOLUME: f32 = 0.25;
pub const EXHAUST_SOUND_PITCH: f32 = 0.1;

// Shared by exhaust and breath flames
pub const FLAME_PARTICLE_SPEED: f32 = 0.5;

// ============================================================================
// Breath
// ============================================================================

pub const BREATH_PARTICLES: usize = 10;
pub const BREATH_REACH: f32 = 0.15; // look direction scale for the cone origin
pub const BREATH_MOUTH_OFFSET: f32 = 0.5; // particles start this far above the eyes
pub const BREATH_WIGGLE: f32 = 0.4;
pub const BREATH_WIGGLE_BIAS: f32 = BREATH_WIGGLE / 3.0;
pub const BREATH_AREA_SCALE: f32 = 4.0; // half extents = |look * reach| * scale

// ============================================================================
// Burn Status
// ============================================================================

pub const BURN_IGNITE_AT: u32 = 2; // invocation that sets the entity on fire
pub const BURN_EXTINGUISH_AT: u32 = 100; // invocation that puts it out
pub const BURN_FIRE_TICKS: i32 = 100;
pub const FIRE_TICKS_EXTINGUISHED: i32 = -1;
pub const FIRE_TICKS_CLEAR: i32 = 0;
