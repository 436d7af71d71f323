use bevy::prelude::*;
use tracing::{info, trace};

use crate::{
    components::{FireStatus, HeldItem, Hitbox, HostEntity, Look, PlayerMarker, Position, Sneaking},
    constants::PLAYER_EYE_HEIGHT,
    resources::{EntityIndex, HostEffects, Terrain},
};
use common::{
    HostError,
    collision::{Aabb, entities_in_box, first_ray_hit, ray_vs_ground},
    fake_entities::FakeEntityRegistry,
    host::{ActorSnapshot, Host, ParticleEmission, RayHit, RayQuery, SoundCue},
    protocol::{EntityId, TargetInfo},
};

// ============================================================================
// ECS Host
// ============================================================================

// The simulation's view of the in-memory world. Borrowed for the duration of
// one system call.
pub struct EcsHost<'w> {
    world: &'w mut World,
}

impl<'w> EcsHost<'w> {
    pub const fn new(world: &'w mut World) -> Self {
        Self { world }
    }

    fn entity(&self, id: EntityId) -> Result<Entity, HostError> {
        self.world
            .resource::<EntityIndex>()
            .get(id)
            .ok_or(HostError::UnknownEntity(id))
    }

    fn fire_status(&mut self, id: EntityId) -> Result<Mut<'_, FireStatus>, HostError> {
        let entity = self.entity(id)?;
        self.world
            .get_mut::<FireStatus>(entity)
            .ok_or(HostError::NotLiving(id))
    }

    // Every entity with a hitbox, as hit candidates
    fn candidates(&mut self) -> Vec<(TargetInfo, Aabb)> {
        let mut query = self.world.query::<(&HostEntity, &Position, &Hitbox)>();
        query
            .iter(self.world)
            .map(|(host_entity, position, hitbox)| {
                (
                    TargetInfo {
                        id: host_entity.id,
                        kind: host_entity.kind,
                    },
                    Aabb::from_feet(position.0, hitbox.width, hitbox.height),
                )
            })
            .collect()
    }

    fn effects(&mut self) -> Mut<'_, HostEffects> {
        self.world.resource_mut::<HostEffects>()
    }
}

impl Host for EcsHost<'_> {
    fn fake_entities(&mut self) -> &mut FakeEntityRegistry {
        self.world.resource_mut::<FakeEntityRegistry>().into_inner()
    }

    fn ray_trace(&mut self, query: &RayQuery, filter: &dyn Fn(&TargetInfo) -> bool) -> Option<RayHit> {
        let entity_hit = first_ray_hit(self.candidates(), query, filter);

        let direction = query.direction.normalize_or_zero();
        let ground_hit = self
            .world
            .resource::<Terrain>()
            .ground_level
            .filter(|_| direction != Vec3::ZERO)
            .and_then(|level| ray_vs_ground(query.origin, direction, query.max_distance, level))
            .map(|t| RayHit {
                position: query.origin + direction * t,
                entity: None,
            });

        match (entity_hit, ground_hit) {
            (Some(entity), Some(ground)) => {
                let nearer = entity.position.distance_squared(query.origin) <= ground.position.distance_squared(query.origin);
                Some(if nearer { entity } else { ground })
            }
            (entity, ground) => entity.or(ground),
        }
    }

    fn nearby_living(&mut self, area: &Aabb, filter: &dyn Fn(&TargetInfo) -> bool) -> Vec<EntityId> {
        let mut living = self.world.query_filtered::<&HostEntity, With<FireStatus>>();
        let living: Vec<EntityId> = living.iter(self.world).map(|host_entity| host_entity.id).collect();

        entities_in_box(
            self.candidates()
                .into_iter()
                .filter(|(target, _)| living.contains(&target.id)),
            area,
            filter,
        )
    }

    fn actor(&mut self, id: EntityId) -> Option<ActorSnapshot> {
        let entity = self.entity(id).ok()?;
        let entity_ref = self.world.get_entity(entity).ok()?;
        if !entity_ref.contains::<PlayerMarker>() {
            return None;
        }

        let location = entity_ref.get::<Position>()?.0;
        Some(ActorSnapshot {
            id,
            location,
            eye: location + Vec3::new(0.0, PLAYER_EYE_HEIGHT, 0.0),
            look: entity_ref.get::<Look>()?.0,
            held: entity_ref.get::<HeldItem>().and_then(|held| held.0),
            sneaking: entity_ref.get::<Sneaking>().is_some_and(|sneaking| sneaking.0),
        })
    }

    fn spawn_particle(&mut self, emission: ParticleEmission) {
        trace!("{:?} particle at {}", emission.particle, emission.position);
        self.effects().particles += 1;
    }

    fn play_sound(&mut self, cue: SoundCue) {
        trace!("{:?} sound at {}", cue.sound, cue.position);
        self.effects().sounds += 1;
    }

    fn create_explosion(&mut self, position: Vec3, power: f32) {
        info!("explosion of power {} at {}", power, position);
        self.effects().record_explosion(position, power);
    }

    fn set_visual_fire(&mut self, id: EntityId, burning: bool) -> Result<(), HostError> {
        self.fire_status(id)?.visual = burning;
        Ok(())
    }

    fn set_fire_ticks(&mut self, id: EntityId, ticks: i32) -> Result<(), HostError> {
        self.fire_status(id)?.ticks = ticks;
        Ok(())
    }
}
