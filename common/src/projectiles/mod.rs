mod engine;
mod hooks;
pub mod magma;

pub use engine::{FlightState, Projectile, ProjectileEngine, ProjectileId, TickReport};
pub use hooks::{HookResult, Movement, ProjectileHooks, Trail, TrailOutcome};
pub use magma::{MagmaBlock, launch_magma_block, triggers_launch};
