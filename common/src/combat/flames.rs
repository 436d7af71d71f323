use bevy_math::Vec3;
use rand::Rng;

use crate::{
    constants::FLAME_PARTICLE_SPEED,
    host::{Host, Particle, ParticleEmission},
};

// A burst of forced flame particles at `position`. Each particle travels
// along `direction` plus a random jitter in `[-bias, wiggle - bias)` per axis.
pub fn flame_burst(
    host: &mut dyn Host,
    rng: &mut impl Rng,
    position: Vec3,
    direction: Vec3,
    count: usize,
    wiggle: f32,
    bias: f32,
) {
    for _ in 0..count {
        let jitter = Vec3::new(rng.random::<f32>(), rng.random::<f32>(), rng.random::<f32>()) * wiggle
            - Vec3::splat(bias);
        host.spawn_particle(ParticleEmission {
            particle: Particle::Flame,
            position,
            offset: direction + jitter,
            speed: FLAME_PARTICLE_SPEED,
            force: true,
        });
    }
}
