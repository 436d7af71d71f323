use super::helpers::{Aabb, ray_vs_aabb};
use crate::{
    host::{RayHit, RayQuery},
    protocol::{EntityId, TargetInfo, TargetKind},
};

// ============================================================================
// Hit Selection
// ============================================================================

// Any non-player living creature, or a player whose game mode takes damage.
#[must_use]
pub const fn is_damageable(kind: TargetKind) -> bool {
    match kind {
        TargetKind::Player(mode) => mode.is_damageable(),
        TargetKind::Creature => true,
        TargetKind::Object => false,
    }
}

// Damageable filter that never selects `excluded` (the launcher or breather).
pub fn damageable_except(excluded: Option<EntityId>) -> impl Fn(&TargetInfo) -> bool {
    move |target| Some(target.id) != excluded && is_damageable(target.kind)
}

// ============================================================================
// Spatial Queries Over Candidate Lists
// ============================================================================

// Closest entity hit along the query ray. Candidate hitboxes are inflated by
// the query's ray size before testing. Hosts that keep entities in a flat list
// implement `Host::ray_trace` with this.
pub fn first_ray_hit<I>(candidates: I, query: &RayQuery, filter: &dyn Fn(&TargetInfo) -> bool) -> Option<RayHit>
where
    I: IntoIterator<Item = (TargetInfo, Aabb)>,
{
    let direction = query.direction.normalize_or_zero();
    if direction == bevy_math::Vec3::ZERO {
        return None;
    }

    candidates
        .into_iter()
        .filter(|(target, _)| filter(target))
        .filter_map(|(target, aabb)| {
            ray_vs_aabb(query.origin, direction, query.max_distance, &aabb.inflate(query.ray_size))
                .map(|t| (target.id, t))
        })
        .min_by(|a, b| a.1.total_cmp(&b.1))
        .map(|(id, t)| RayHit {
            position: query.origin + direction * t,
            entity: Some(id),
        })
}

// Every candidate whose hitbox overlaps `area`, in candidate order.
pub fn entities_in_box<I>(candidates: I, area: &Aabb, filter: &dyn Fn(&TargetInfo) -> bool) -> Vec<EntityId>
where
    I: IntoIterator<Item = (TargetInfo, Aabb)>,
{
    candidates
        .into_iter()
        .filter(|(target, aabb)| filter(target) && aabb.intersects(area))
        .map(|(target, _)| target.id)
        .collect()
}
