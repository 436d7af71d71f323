use bevy_math::Vec3;
use rand::Rng;

use super::flames::flame_burst;
use crate::{
    collision::{Aabb, damageable_except},
    constants::{BREATH_AREA_SCALE, BREATH_MOUTH_OFFSET, BREATH_PARTICLES, BREATH_REACH, BREATH_WIGGLE, BREATH_WIGGLE_BIAS},
    host::{ActorSnapshot, Host},
    protocol::{EntityId, ItemKind},
};

// Breathing is on exactly while the actor sneaks holding flint and steel.
#[must_use]
pub const fn breath_toggle(actor: &ActorSnapshot) -> bool {
    actor.sneaking && matches!(actor.held, Some(ItemKind::FlintAndSteel))
}

// The box in front of the actor's eyes that catches fire. Its half extents
// follow the look direction, so it is flat along axes the actor is not
// looking down.
#[must_use]
pub fn breath_area(actor: &ActorSnapshot) -> Aabb {
    let reach = actor.look * BREATH_REACH;
    Aabb::from_center(actor.eye + reach, reach * BREATH_AREA_SCALE)
}

// One tick of breath: a cone of flames from the mouth, then every damageable
// living entity in the breath area other than the actor.
pub fn breathe(host: &mut dyn Host, rng: &mut impl Rng, actor: &ActorSnapshot) -> Vec<EntityId> {
    let reach = actor.look * BREATH_REACH;
    let mouth = actor.eye + Vec3::new(0.0, BREATH_MOUTH_OFFSET, 0.0) + reach;
    flame_burst(host, rng, mouth, reach, BREATH_PARTICLES, BREATH_WIGGLE, BREATH_WIGGLE_BIAS);

    host.nearby_living(&breath_area(actor), &damageable_except(Some(actor.id)))
}
