use bevy_math::Vec3;

use crate::{
    collision::Aabb,
    error::HostError,
    fake_entities::FakeEntityRegistry,
    protocol::{EntityId, ItemKind, TargetInfo},
};

// ============================================================================
// Host Query Types
// ============================================================================

// Entity ray query. Hitboxes are inflated by `ray_size`; fluids never block.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RayQuery {
    pub origin: Vec3,
    pub direction: Vec3,
    pub max_distance: f32,
    pub ray_size: f32,
}

// `entity` is `None` when solid terrain was hit first.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RayHit {
    pub position: Vec3,
    pub entity: Option<EntityId>,
}

// What the host knows about the designated actor right now
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ActorSnapshot {
    pub id: EntityId,
    pub location: Vec3,
    pub eye: Vec3,
    pub look: Vec3,
    pub held: Option<ItemKind>,
    pub sneaking: bool,
}

// ============================================================================
// Host Effects
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Particle {
    Flame,
}

// A single particle. With no count, `offset` is the particle's direction of
// travel and `speed` its magnitude.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParticleEmission {
    pub particle: Particle,
    pub position: Vec3,
    pub offset: Vec3,
    pub speed: f32,
    pub force: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sound {
    FireworkRocketLaunch,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SoundCue {
    pub sound: Sound,
    pub position: Vec3,
    pub volume: f32,
    pub pitch: f32,
}

// ============================================================================
// Host Interface
// ============================================================================

/// Everything the simulation needs from the game server it runs inside.
///
/// All calls happen on the tick thread; implementations may assume no
/// concurrent access.
pub trait Host {
    /// The registry whose flush is the only channel to observers.
    fn fake_entities(&mut self) -> &mut FakeEntityRegistry;

    /// First entity (or solid terrain) along the ray accepted by `filter`.
    fn ray_trace(&mut self, query: &RayQuery, filter: &dyn Fn(&TargetInfo) -> bool) -> Option<RayHit>;

    /// Living entities whose hitbox overlaps `area` and pass `filter`.
    fn nearby_living(&mut self, area: &Aabb, filter: &dyn Fn(&TargetInfo) -> bool) -> Vec<EntityId>;

    /// `None` when the entity is not an online player.
    fn actor(&mut self, id: EntityId) -> Option<ActorSnapshot>;

    fn spawn_particle(&mut self, emission: ParticleEmission);

    fn play_sound(&mut self, cue: SoundCue);

    fn create_explosion(&mut self, position: Vec3, power: f32);

    fn set_visual_fire(&mut self, id: EntityId, burning: bool) -> Result<(), HostError>;

    fn set_fire_ticks(&mut self, id: EntityId, ticks: i32) -> Result<(), HostError>;
}

// ============================================================================
// Test Double
// ============================================================================
