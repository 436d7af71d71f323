use bevy_math::Vec3;

use crate::constants::PHYSICS_EPSILON;

// ============================================================================
// Axis-Aligned Boxes
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    pub min: Vec3,
    pub max: Vec3,
}

impl Aabb {
    // Build from two arbitrary corners; the box is normalized so min <= max.
    #[must_use]
    pub fn from_corners(a: Vec3, b: Vec3) -> Self {
        Self {
            min: a.min(b),
            max: a.max(b),
        }
    }

    // Negative extents are flipped, which is what a "radius" derived from a
    // direction vector needs.
    #[must_use]
    pub fn from_center(center: Vec3, half_extents: Vec3) -> Self {
        Self::from_corners(center - half_extents, center + half_extents)
    }

    // Box for an entity standing at `feet` with the given footprint and height
    #[must_use]
    pub fn from_feet(feet: Vec3, width: f32, height: f32) -> Self {
        let half = width / 2.0;
        Self {
            min: Vec3::new(feet.x - half, feet.y, feet.z - half),
            max: Vec3::new(feet.x + half, feet.y + height, feet.z + half),
        }
    }

    #[must_use]
    pub fn inflate(&self, amount: f32) -> Self {
        Self {
            min: self.min - Vec3::splat(amount),
            max: self.max + Vec3::splat(amount),
        }
    }

    // Touching boxes count as overlapping
    #[must_use]
    pub fn intersects(&self, other: &Self) -> bool {
        ranges_overlap_1d(self.min.x, self.max.x, other.min.x, other.max.x)
            && ranges_overlap_1d(self.min.y, self.max.y, other.min.y, other.max.y)
            && ranges_overlap_1d(self.min.z, self.max.z, other.min.z, other.max.z)
    }

    #[must_use]
    pub fn contains(&self, point: Vec3) -> bool {
        point.cmpge(self.min).all() && point.cmple(self.max).all()
    }

    #[must_use]
    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }
}

// ============================================================================
// Ray Helpers
// ============================================================================

// Check if two 1D ranges overlap.
#[must_use]
pub fn ranges_overlap_1d(a_min: f32, a_max: f32, b_min: f32, b_max: f32) -> bool {
    a_max >= b_min && a_min <= b_max
}

// Compute the intersection interval of a ray with a slab (used in ray-AABB tests)
#[must_use]
pub fn sweep_slab_interval(
    local_coord: f32,
    ray_dir: f32,
    half_extent: f32,
    t_min: f32,
    t_max: f32,
) -> Option<(f32, f32)> {
    if ray_dir.abs() > PHYSICS_EPSILON {
        let t1 = (-half_extent - local_coord) / ray_dir;
        let t2 = (half_extent - local_coord) / ray_dir;
        let new_min = t_min.max(t1.min(t2));
        let new_max = t_max.min(t1.max(t2));
        if new_min <= new_max {
            Some((new_min, new_max))
        } else {
            None
        }
    } else if local_coord.abs() > half_extent {
        None
    } else {
        Some((t_min, t_max))
    }
}

// Distance along a ray to the first point inside `aabb`, if that point lies
// within `max_distance`. `direction` must be normalized. A ray starting inside
// the box hits at distance 0.
#[must_use]
pub fn ray_vs_aabb(origin: Vec3, direction: Vec3, max_distance: f32, aabb: &Aabb) -> Option<f32> {
    let center = aabb.center();
    let half = (aabb.max - aabb.min) * 0.5;
    let local = origin - center;

    let (t_min, t_max) = sweep_slab_interval(local.x, direction.x, half.x, 0.0, max_distance)?;
    let (t_min, t_max) = sweep_slab_interval(local.y, direction.y, half.y, t_min, t_max)?;
    let (t_min, _) = sweep_slab_interval(local.z, direction.z, half.z, t_min, t_max)?;

    Some(t_min)
}

// Distance along a ray to a horizontal solid plane at `level`, approached
// from above. A ray starting on the surface only hits when heading down.
#[must_use]
pub fn ray_vs_ground(origin: Vec3, direction: Vec3, max_distance: f32, level: f32) -> Option<f32> {
    if origin.y < level {
        return Some(0.0);
    }
    if direction.y >= -PHYSICS_EPSILON {
        return None;
    }

    let t = (level - origin.y) / direction.y;
    (t <= max_distance).then_some(t)
}
