use bevy::prelude::*;
use tracing::{debug, trace};

use crate::{host::EcsHost, resources::SchedulerState};
use common::{combat::CombatEffects, fake_entities::FakeEntityRegistry, projectiles::ProjectileEngine};

// ============================================================================
// Tick Scheduler
// ============================================================================

// Run condition for every per-tick system below. They run in this order:
// advance, flush, projectiles, breath, toggle refresh, burns.
pub fn scheduler_running(scheduler: Res<SchedulerState>) -> bool {
    scheduler.is_running()
}

pub fn scheduler_advance_system(mut scheduler: ResMut<SchedulerState>) {
    scheduler.advance();
}

// ============================================================================
// Fake Entity Flush System
// ============================================================================

pub fn registry_flush_system(mut registry: ResMut<FakeEntityRegistry>) {
    let stats = registry.update();
    if stats.packets > 0 {
        trace!(
            "flushed {} packets ({} spawned, {} updated, {} despawned)",
            stats.packets, stats.spawned, stats.updated, stats.despawned
        );
    }
}

// ============================================================================
// Projectile System
// ============================================================================

pub fn projectiles_system(world: &mut World) {
    world.resource_scope(|world, mut engine: Mut<ProjectileEngine>| {
        if engine.is_empty() {
            return;
        }
        let report = engine.update(&mut EcsHost::new(world));
        if report.removed > 0 || report.faulted > 0 {
            debug!(
                "projectiles: {} visited, {} removed, {} faulted",
                report.visited, report.removed, report.faulted
            );
        }
    });
}

// ============================================================================
// Combat Effect Systems
// ============================================================================

// Breath phase, only while the toggle is on. The toggle is derived again
// before breathing.
pub fn breath_system(world: &mut World) {
    world.resource_scope(|world, mut effects: Mut<CombatEffects>| {
        if !effects.is_toggled() {
            return;
        }
        let started = effects.breath_tick(&mut EcsHost::new(world), &mut rand::rng());
        if started > 0 {
            debug!("breath started {started} burn tasks");
        }
    });
}

pub fn toggle_refresh_system(world: &mut World) {
    world.resource_scope(|world, mut effects: Mut<CombatEffects>| {
        effects.refresh_toggle(&mut EcsHost::new(world));
    });
}

pub fn burns_system(world: &mut World) {
    world.resource_scope(|world, mut effects: Mut<CombatEffects>| {
        if effects.burns().is_empty() {
            return;
        }
        let finished = effects.advance_burns(&mut EcsHost::new(world));
        if finished > 0 {
            trace!("{finished} burn tasks finished");
        }
    });
}
