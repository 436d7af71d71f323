pub mod helpers;
pub mod targets;

pub use helpers::{Aabb, ray_vs_aabb, ray_vs_ground};
pub use targets::{damageable_except, entities_in_box, first_ray_hit, is_damageable};
