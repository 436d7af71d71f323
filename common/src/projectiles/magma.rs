use bevy_math::Vec3;

use super::{
    engine::{Projectile, ProjectileEngine, ProjectileId},
    hooks::{HookResult, Movement, ProjectileHooks, Trail, TrailOutcome},
};
use crate::{
    collision::damageable_except,
    combat::flames::flame_burst,
    constants::{
        EXHAUST_PARTICLES, EXHAUST_SOUND_PITCH, EXHAUST_SOUND_VOLUME, EXHAUST_WIGGLE, EXPLOSION_POWER, MAGMA_BOOST,
        MAGMA_DRAG, MAGMA_GRAVITY, MAGMA_LAUNCH_SPEED, MAGMA_LIFETIME_TICKS, MAGMA_MAX_DISTANCE, RAY_SIZE,
    },
    fake_entities::{FakeEntityHandle, FakeEntityRegistry},
    host::{ActorSnapshot, Host, RayQuery, Sound, SoundCue},
    protocol::{EntityId, FakeEntityKind, InteractAction, ItemKind},
};
use tracing::debug;

// ============================================================================
// Magma Block Projectile
// ============================================================================

// An accelerating magma block carried by an invisible armor stand. Explodes on
// the first damageable entity or solid block it reaches. The exhaust trails
// opposite the carrier's facing, which stays the launch look direction.
pub struct MagmaBlock {
    launcher: EntityId,
    fake_entity: FakeEntityHandle,
    facing: Vec3,
}

impl MagmaBlock {
    #[must_use]
    pub fn new(launcher: EntityId, fake_entity: FakeEntityHandle, facing: Vec3) -> Self {
        Self {
            launcher,
            fake_entity,
            facing: facing.normalize_or_zero(),
        }
    }

    #[must_use]
    pub const fn fake_entity(&self) -> FakeEntityHandle {
        self.fake_entity
    }

    fn exhaust(&self, host: &mut dyn Host, to: Vec3) {
        let behind = -self.facing;
        flame_burst(
            host,
            &mut rand::rng(),
            to + behind,
            behind,
            EXHAUST_PARTICLES,
            EXHAUST_WIGGLE,
            EXHAUST_WIGGLE / 2.0,
        );
        host.play_sound(SoundCue {
            sound: Sound::FireworkRocketLaunch,
            position: to,
            volume: EXHAUST_SOUND_VOLUME,
            pitch: EXHAUST_SOUND_PITCH,
        });
    }
}

impl ProjectileHooks for MagmaBlock {
    fn on_pre_update(&mut self, velocity: Vec3) -> Vec3 {
        let mut velocity = velocity * MAGMA_DRAG;
        velocity.y -= MAGMA_GRAVITY;
        velocity
    }

    fn on_move(&mut self, host: &mut dyn Host, movement: &Movement) -> HookResult {
        host.fake_entities().move_to(self.fake_entity, movement.to);
        Ok(())
    }

    fn on_trail(&mut self, host: &mut dyn Host, trail: &Trail) -> HookResult<TrailOutcome> {
        let mut outcome = TrailOutcome::Continue;

        if let Some(velocity) = trail.velocity {
            let query = RayQuery {
                origin: trail.from,
                direction: velocity.normalize_or_zero(),
                max_distance: velocity.length(),
                ray_size: RAY_SIZE,
            };
            if let Some(hit) = host.ray_trace(&query, &damageable_except(Some(self.launcher))) {
                debug!("magma block hit {:?} at {}", hit.entity, hit.position);
                host.create_explosion(hit.position, EXPLOSION_POWER);
                outcome = TrailOutcome::Remove;
            }
        }

        self.exhaust(host, trail.to);
        Ok(outcome)
    }

    fn on_post_update(&mut self, velocity: Vec3) -> Vec3 {
        velocity * MAGMA_BOOST
    }

    fn on_remove(&mut self, host: &mut dyn Host) -> HookResult {
        host.fake_entities().remove(self.fake_entity);
        Ok(())
    }
}

// ============================================================================
// Launching
// ============================================================================

// Blaze rod use fires a magma block, except when right-clicking a block.
#[must_use]
pub const fn triggers_launch(action: InteractAction, held: Option<ItemKind>) -> bool {
    matches!(held, Some(ItemKind::BlazeRod)) && !matches!(action, InteractAction::RightClickBlock)
}

// Spawn the carrier armor stand at the actor's feet and fire a magma block
// along the actor's look direction.
pub fn launch_magma_block(
    engine: &mut ProjectileEngine,
    registry: &mut FakeEntityRegistry,
    actor: &ActorSnapshot,
) -> ProjectileId {
    let carrier = registry.spawn_entity(actor.location, FakeEntityKind::ArmorStand);
    registry.update_metadata(carrier, |metadata| {
        metadata.invisible = true;
        metadata.marker = true;
    });
    registry.update_equipment(carrier, |equipment| equipment.helmet = Some(ItemKind::MagmaBlock));

    let projectile = Projectile::new(
        MAGMA_LIFETIME_TICKS,
        MAGMA_MAX_DISTANCE,
        MagmaBlock::new(actor.id, carrier, actor.look),
    )
    .with_launcher(actor.id)
    .with_velocity(actor.look * MAGMA_LAUNCH_SPEED);

    engine.launch(actor.location, projectile)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        host::testing::MockHost,
        protocol::{GameMode, TargetKind},
    };

    fn actor(id: EntityId, look: Vec3) -> ActorSnapshot {
        ActorSnapshot {
            id,
            location: Vec3::ZERO,
            eye: Vec3::new(0.0, 1.62, 0.0),
            look,
            held: Some(ItemKind::BlazeRod),
            sneaking: false,
        }
    }

    // Runs ticks until the projectile is gone; returns the tick it was removed on.
    fn run(engine: &mut ProjectileEngine, host: &mut MockHost, limit: u32) -> Option<u32> {
        for tick in 1..=limit {
            let report = engine.update(host);
            if report.removed > 0 {
                return Some(tick);
            }
        }
        None
    }

    #[test]
    fn launch_sets_up_carrier_and_velocity() {
        let mut host = MockHost::default();
        let mut engine = ProjectileEngine::new();
        let shooter = actor(EntityId(1), Vec3::X);

        let id = launch_magma_block(&mut engine, &mut host.registry, &shooter);

        let state = engine.get(id).unwrap();
        assert_eq!(state.velocity, Vec3::new(1.5, 0.0, 0.0));
        assert_eq!(state.launcher, Some(EntityId(1)));
        assert_eq!(state.max_age, 100);
        assert_eq!(state.max_distance, 256.0);

        assert_eq!(host.registry.len(), 1);
        let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();
        host.registry.add_player(EntityId(2).into(), tx);
        host.registry.update();
        let packet = rx.try_recv().unwrap();
        assert!(matches!(
            packet,
            crate::protocol::FakeEntityPacket::Spawn { metadata, equipment, .. }
                if metadata.invisible && metadata.marker && equipment.helmet == Some(ItemKind::MagmaBlock)
        ));
    }

    #[test]
    fn launcher_is_never_hit() {
        let mut host = MockHost::default();
        let launcher = host.add_target(1, TargetKind::Player(GameMode::Survival), Vec3::ZERO);
        let mut engine = ProjectileEngine::new();
        launch_magma_block(&mut engine, &mut host.registry, &actor(launcher, Vec3::NEG_Z));

        // Accelerating flight runs out of distance before lifetime
        assert_eq!(run(&mut engine, &mut host, 200), Some(33));
        assert!(host.explosions.is_empty());
    }

    #[test]
    fn creature_in_path_explodes_on_second_tick() {
        let mut host = MockHost::default();
        let launcher = host.add_target(1, TargetKind::Player(GameMode::Survival), Vec3::ZERO);
        let victim = host.add_target(2, TargetKind::Creature, Vec3::new(0.0, 0.0, -3.0));
        let mut engine = ProjectileEngine::new();
        launch_magma_block(&mut engine, &mut host.registry, &actor(launcher, Vec3::NEG_Z));

        assert_eq!(run(&mut engine, &mut host, 200), Some(2));
        assert_eq!(host.explosions.len(), 1);
        let (position, power) = host.explosions[0];
        assert_eq!(power, 15.0);
        // Inflated hitbox face
        assert!((position.z + 1.7).abs() < 1e-3, "{position}");
        assert!(host.targets.iter().any(|(t, _)| t.id == victim));
    }

    #[test]
    fn creative_player_is_passed_through() {
        let mut host = MockHost::default();
        let launcher = host.add_target(1, TargetKind::Player(GameMode::Survival), Vec3::ZERO);
        host.add_target(2, TargetKind::Player(GameMode::Creative), Vec3::new(0.0, 0.0, -3.0));
        let mut engine = ProjectileEngine::new();
        launch_magma_block(&mut engine, &mut host.registry, &actor(launcher, Vec3::NEG_Z));

        assert_eq!(run(&mut engine, &mut host, 200), Some(33));
        assert!(host.explosions.is_empty());
    }

    #[test]
    fn solid_ground_stops_a_falling_block() {
        let mut host = MockHost {
            ground: Some(-2.0),
            ..MockHost::default()
        };
        let mut engine = ProjectileEngine::new();
        launch_magma_block(&mut engine, &mut host.registry, &actor(EntityId(1), Vec3::NEG_Y));

        assert_eq!(run(&mut engine, &mut host, 200), Some(2));
        assert_eq!(host.explosions.len(), 1);
        assert!((host.explosions[0].0.y + 2.0).abs() < 1e-4);
    }

    #[test]
    fn every_tick_leaves_an_exhaust() {
        let mut host = MockHost::default();
        let mut engine = ProjectileEngine::new();
        launch_magma_block(&mut engine, &mut host.registry, &actor(EntityId(1), Vec3::X));

        engine.update(&mut host);
        engine.update(&mut host);

        assert_eq!(host.particles.len(), 2 * EXHAUST_PARTICLES);
        assert_eq!(host.sounds.len(), 2);
        assert_eq!(host.sounds[0].sound, Sound::FireworkRocketLaunch);
        assert_eq!(host.sounds[0].volume, 0.25);
        // Flames trail behind the block
        assert!(host.particles.iter().all(|p| p.offset.x < 0.0));
    }

    #[test]
    fn exhaust_keeps_to_the_launch_facing_while_falling() {
        let mut host = MockHost::default();
        let mut engine = ProjectileEngine::new();
        let id = launch_magma_block(&mut engine, &mut host.registry, &actor(EntityId(1), Vec3::X));

        for _ in 0..20 {
            engine.update(&mut host);
        }
        // Gravity has bent the flight well below horizontal by now
        let velocity = engine.get(id).unwrap().velocity;
        assert!(velocity.y < -0.5, "{velocity}");

        let last = &host.particles[host.particles.len() - EXHAUST_PARTICLES..];
        let behind = Vec3::NEG_X;
        let position = engine.get(id).unwrap().position;
        for particle in last {
            assert!((particle.position - (position + behind)).length() < 1e-4);
            // Only the jitter moves the flames off the horizontal
            assert!(particle.offset.y.abs() <= EXHAUST_WIGGLE / 2.0 + 1e-6, "{}", particle.offset);
        }
    }

    #[test]
    fn carrier_follows_and_disappears_with_the_block() {
        let mut host = MockHost::default();
        let mut engine = ProjectileEngine::new();
        let id = launch_magma_block(&mut engine, &mut host.registry, &actor(EntityId(1), Vec3::X));
        assert_eq!(host.registry.update().spawned, 1);

        engine.update(&mut host);
        let position = engine.get(id).unwrap().position;
        assert!(position.x > 1.0);
        assert_eq!(host.registry.update().updated, 1);
        assert_eq!(host.registry.len(), 1);

        assert!(engine.remove(id, &mut host));
        assert!(engine.is_empty());
        host.registry.update();
        assert!(host.registry.is_empty());
    }

    #[test]
    fn only_blaze_rod_outside_block_clicks_launches() {
        assert!(triggers_launch(InteractAction::RightClickAir, Some(ItemKind::BlazeRod)));
        assert!(triggers_launch(InteractAction::LeftClickBlock, Some(ItemKind::BlazeRod)));
        assert!(!triggers_launch(InteractAction::RightClickBlock, Some(ItemKind::BlazeRod)));
        assert!(!triggers_launch(InteractAction::RightClickAir, Some(ItemKind::Stick)));
        assert!(!triggers_launch(InteractAction::LeftClickAir, None));
    }
}
