use bevy_math::Vec3;

use super::engine::FlightState;
use crate::{error::HostError, host::Host};

pub type HookResult<T = ()> = Result<T, HostError>;

// One tick of motion: where the projectile was, where it is now, and the
// velocity that carried it there.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Movement {
    pub from: Vec3,
    pub to: Vec3,
    pub velocity: Vec3,
}

// Same segment as `Movement`, seen by collision and cosmetics. `velocity` is
// `None` when the projectile did not move this tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Trail {
    pub from: Vec3,
    pub to: Vec3,
    pub velocity: Option<Vec3>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrailOutcome {
    Continue,
    Remove,
}

/// Per-projectile behavior, dispatched by [`super::ProjectileEngine`] in a
/// fixed order every tick: pre-update, move, trail, post-update, completion
/// check, and finally remove (exactly once).
///
/// Every slot has a default, so a projectile only overrides what it uses.
pub trait ProjectileHooks: Send + Sync {
    // Velocity transform applied before the projectile moves
    fn on_pre_update(&mut self, velocity: Vec3) -> Vec3 {
        velocity
    }

    fn on_move(&mut self, _host: &mut dyn Host, _movement: &Movement) -> HookResult {
        Ok(())
    }

    // Returning `TrailOutcome::Remove` skips the rest of the tick and removes
    // the projectile.
    fn on_trail(&mut self, _host: &mut dyn Host, _trail: &Trail) -> HookResult<TrailOutcome> {
        Ok(TrailOutcome::Continue)
    }

    // Velocity transform applied after the projectile moved
    fn on_post_update(&mut self, velocity: Vec3) -> Vec3 {
        velocity
    }

    fn on_remove(&mut self, _host: &mut dyn Host) -> HookResult {
        Ok(())
    }

    fn is_finished(&self, state: &FlightState) -> bool {
        state.limits_reached()
    }
}
