use bevy_ecs::prelude::*;
use bevy_math::Vec3;
use tracing::{debug, warn};

use super::hooks::{Movement, ProjectileHooks, Trail, TrailOutcome};
use crate::{constants::PHYSICS_EPSILON, error::HostError, host::Host, protocol::EntityId};

// ============================================================================
// Projectile State
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ProjectileId(pub u64);

// Kinematics and limits of one projectile
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FlightState {
    pub launcher: Option<EntityId>,
    pub position: Vec3,
    pub velocity: Vec3,
    pub age: u32,
    pub distance: f32,
    pub max_age: u32,
    pub max_distance: f32,
}

impl FlightState {
    #[must_use]
    pub fn limits_reached(&self) -> bool {
        self.distance >= self.max_distance || self.age >= self.max_age
    }
}

pub struct Projectile {
    state: FlightState,
    hooks: Box<dyn ProjectileHooks>,
}

impl Projectile {
    #[must_use]
    pub fn new(max_age: u32, max_distance: f32, hooks: impl ProjectileHooks + 'static) -> Self {
        Self {
            state: FlightState {
                launcher: None,
                position: Vec3::ZERO,
                velocity: Vec3::ZERO,
                age: 0,
                distance: 0.0,
                max_age,
                max_distance,
            },
            hooks: Box::new(hooks),
        }
    }

    #[must_use]
    pub const fn with_velocity(mut self, velocity: Vec3) -> Self {
        self.state.velocity = velocity;
        self
    }

    #[must_use]
    pub const fn with_launcher(mut self, launcher: EntityId) -> Self {
        self.state.launcher = Some(launcher);
        self
    }

    #[must_use]
    pub const fn state(&self) -> &FlightState {
        &self.state
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Status {
    Active,
    Removed,
    // A hook failed; the projectile is dropped without its remove hook
    Faulted,
}

struct Slot {
    id: ProjectileId,
    projectile: Projectile,
    status: Status,
}

// Counts from one engine tick
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickReport {
    pub visited: usize,
    pub removed: usize,
    pub faulted: usize,
}

// ============================================================================
// Projectile Engine
// ============================================================================

/// The in-flight projectiles, advanced once per tick in launch order.
///
/// The engine knows nothing about physics: drag, gravity, collision and
/// cleanup all live in each projectile's [`ProjectileHooks`].
#[derive(Resource, Default)]
pub struct ProjectileEngine {
    next_id: u64,
    slots: Vec<Slot>,
}

impl ProjectileEngine {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn launch(&mut self, origin: Vec3, mut projectile: Projectile) -> ProjectileId {
        let id = ProjectileId(self.next_id);
        self.next_id += 1;

        projectile.state.position = origin;
        debug!(
            "projectile {:?} launched at {} with velocity {}",
            id, origin, projectile.state.velocity
        );
        self.slots.push(Slot {
            id,
            projectile,
            status: Status::Active,
        });
        id
    }

    // Velocity may also be set right after launch, before the next tick.
    pub fn set_velocity(&mut self, id: ProjectileId, velocity: Vec3) -> bool {
        self.slot_mut(id)
            .map(|slot| slot.projectile.state.velocity = velocity)
            .is_some()
    }

    // Removes the projectile right away and fires its remove hook. Unknown or
    // already removed ids report false.
    pub fn remove(&mut self, id: ProjectileId, host: &mut dyn Host) -> bool {
        let Some(index) = self
            .slots
            .iter()
            .position(|slot| slot.id == id && slot.status == Status::Active)
        else {
            return false;
        };

        let mut slot = self.slots.remove(index);
        if let Err(err) = Self::finish(&mut slot, host) {
            warn!("projectile {:?} remove hook failed: {err}", slot.id);
        }
        debug!("projectile {:?} removed on request", slot.id);
        true
    }

    #[must_use]
    pub fn get(&self, id: ProjectileId) -> Option<&FlightState> {
        self.slots
            .iter()
            .find(|slot| slot.id == id)
            .map(|slot| slot.projectile.state())
    }

    pub fn ids(&self) -> impl Iterator<Item = ProjectileId> + '_ {
        self.slots.iter().map(|slot| slot.id)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    fn slot_mut(&mut self, id: ProjectileId) -> Option<&mut Slot> {
        self.slots
            .iter_mut()
            .find(|slot| slot.id == id && slot.status == Status::Active)
    }

    // ------------------------------------------------------------------------
    // Tick
    // ------------------------------------------------------------------------

    pub fn update(&mut self, host: &mut dyn Host) -> TickReport {
        let mut report = TickReport::default();

        for slot in &mut self.slots {
            if slot.status != Status::Active {
                continue;
            }
            report.visited += 1;

            if let Err(err) = Self::step(slot, host) {
                if slot.status == Status::Active {
                    warn!("projectile {:?} hook failed, dropping it: {err}", slot.id);
                    slot.status = Status::Faulted;
                    report.faulted += 1;
                } else {
                    warn!("projectile {:?} remove hook failed: {err}", slot.id);
                }
            }

            if slot.status == Status::Removed {
                let state = slot.projectile.state();
                debug!(
                    "projectile {:?} removed after {} ticks, {:.2} blocks",
                    slot.id, state.age, state.distance
                );
                report.removed += 1;
            }
        }

        self.slots.retain(|slot| slot.status == Status::Active);
        report
    }

    fn step(slot: &mut Slot, host: &mut dyn Host) -> Result<(), HostError> {
        let Projectile { state, hooks } = &mut slot.projectile;

        state.velocity = hooks.on_pre_update(state.velocity);

        let from = state.position;
        let velocity = state.velocity;
        let to = from + velocity;
        state.position = to;
        state.age += 1;
        state.distance += velocity.length();

        hooks.on_move(host, &Movement { from, to, velocity })?;

        let trail = Trail {
            from,
            to,
            velocity: (velocity.length_squared() > PHYSICS_EPSILON).then_some(velocity),
        };
        if hooks.on_trail(host, &trail)? == TrailOutcome::Remove {
            return Self::finish(slot, host);
        }

        state.velocity = hooks.on_post_update(state.velocity);

        if hooks.is_finished(state) {
            return Self::finish(slot, host);
        }
        Ok(())
    }

    // The transition to removed happens before the hook runs, so a failing
    // remove hook cannot make the projectile fire it again.
    fn finish(slot: &mut Slot, host: &mut dyn Host) -> Result<(), HostError> {
        slot.status = Status::Removed;
        slot.projectile.hooks.on_remove(host)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use super::*;
    use crate::{
        host::testing::MockHost,
        projectiles::hooks::{HookResult, ProjectileHooks},
    };

    #[derive(Default)]
    struct Log {
        events: Vec<(u64, &'static str)>,
        segment_lengths: Vec<f32>,
        trail_velocities: Vec<Option<Vec3>>,
        removes: usize,
    }

    // Drag and gravity before moving; optionally removes itself on a given
    // trail tick or fails on a given move tick.
    struct Recording {
        tag: u64,
        log: Arc<Mutex<Log>>,
        ticks: u32,
        drag: bool,
        remove_on_trail: Option<u32>,
        fail_on_move: Option<u32>,
    }

    impl Recording {
        fn new(tag: u64, log: &Arc<Mutex<Log>>) -> Self {
            Self {
                tag,
                log: Arc::clone(log),
                ticks: 0,
                drag: false,
                remove_on_trail: None,
                fail_on_move: None,
            }
        }

        fn push(&self, event: &'static str) {
            self.log.lock().unwrap().events.push((self.tag, event));
        }
    }

    impl ProjectileHooks for Recording {
        fn on_pre_update(&mut self, velocity: Vec3) -> Vec3 {
            self.ticks += 1;
            self.push("pre");
            if self.drag {
                let mut v = velocity * 0.99;
                v.y -= 0.04;
                v
            } else {
                velocity
            }
        }

        fn on_move(&mut self, _host: &mut dyn Host, movement: &Movement) -> HookResult {
            self.push("move");
            if self.fail_on_move == Some(self.ticks) {
                return Err(HostError::UnknownEntity(EntityId(99)));
            }
            self.log
                .lock()
                .unwrap()
                .segment_lengths
                .push(movement.from.distance(movement.to));
            Ok(())
        }

        fn on_trail(&mut self, _host: &mut dyn Host, trail: &Trail) -> HookResult<TrailOutcome> {
            self.push("trail");
            self.log.lock().unwrap().trail_velocities.push(trail.velocity);
            if self.remove_on_trail == Some(self.ticks) {
                return Ok(TrailOutcome::Remove);
            }
            Ok(TrailOutcome::Continue)
        }

        fn on_post_update(&mut self, velocity: Vec3) -> Vec3 {
            self.push("post");
            velocity
        }

        fn on_remove(&mut self, _host: &mut dyn Host) -> HookResult {
            self.push("remove");
            self.log.lock().unwrap().removes += 1;
            Ok(())
        }
    }

    fn events_of(log: &Arc<Mutex<Log>>, tag: u64) -> Vec<&'static str> {
        log.lock()
            .unwrap()
            .events
            .iter()
            .filter(|(t, _)| *t == tag)
            .map(|(_, e)| *e)
            .collect()
    }

    #[test]
    fn arc_with_drag_and_gravity_expires_on_lifetime() {
        let log = Arc::new(Mutex::new(Log::default()));
        let mut hooks = Recording::new(0, &log);
        hooks.drag = true;

        let mut host = MockHost::default();
        let mut engine = ProjectileEngine::new();
        let id = engine.launch(
            Vec3::ZERO,
            Projectile::new(100, 256.0, hooks).with_velocity(Vec3::new(0.0, 0.0, -1.5)),
        );

        let mut removed_at = None;
        for tick in 1..=150 {
            let report = engine.update(&mut host);
            if report.removed > 0 {
                removed_at = Some(tick);
                break;
            }
            if tick == 99 {
                let state = engine.get(id).unwrap();
                let sum: f32 = log.lock().unwrap().segment_lengths.iter().sum();
                assert!((state.distance - sum).abs() < 1e-2, "{} vs {}", state.distance, sum);
                // Falling and slowing down horizontally
                assert!(state.position.y < -100.0);
                assert!(state.velocity.z > -1.5);
            }
        }

        assert_eq!(removed_at, Some(100));
        assert!(engine.is_empty());
        let log = log.lock().unwrap();
        assert_eq!(log.removes, 1);
        let total: f32 = log.segment_lengths.iter().sum();
        assert!(total < 256.0, "traveled {total}");
    }

    #[test]
    fn distance_limit_removes_on_first_tick_reaching_it() {
        let log = Arc::new(Mutex::new(Log::default()));
        let mut host = MockHost::default();
        let mut engine = ProjectileEngine::new();
        engine.launch(
            Vec3::ZERO,
            Projectile::new(1_000, 10.0, Recording::new(0, &log)).with_velocity(Vec3::X),
        );

        for _ in 0..9 {
            assert_eq!(engine.update(&mut host).removed, 0);
        }
        assert_eq!(engine.update(&mut host).removed, 1);
        assert!(engine.is_empty());
        assert_eq!(log.lock().unwrap().removes, 1);

        // Nothing left to call back
        engine.update(&mut host);
        assert_eq!(log.lock().unwrap().removes, 1);
    }

    #[test]
    fn hooks_run_in_protocol_order() {
        let log = Arc::new(Mutex::new(Log::default()));
        let mut host = MockHost::default();
        let mut engine = ProjectileEngine::new();
        engine.launch(
            Vec3::ZERO,
            Projectile::new(2, 100.0, Recording::new(0, &log)).with_velocity(Vec3::X),
        );

        engine.update(&mut host);
        engine.update(&mut host);

        assert_eq!(
            events_of(&log, 0),
            vec!["pre", "move", "trail", "post", "pre", "move", "trail", "post", "remove"]
        );
    }

    #[test]
    fn trail_removal_skips_post_update() {
        let log = Arc::new(Mutex::new(Log::default()));
        let mut hooks = Recording::new(0, &log);
        hooks.remove_on_trail = Some(2);

        let mut host = MockHost::default();
        let mut engine = ProjectileEngine::new();
        engine.launch(Vec3::ZERO, Projectile::new(100, 100.0, hooks).with_velocity(Vec3::X));

        engine.update(&mut host);
        let report = engine.update(&mut host);
        assert_eq!(report.removed, 1);
        assert_eq!(
            events_of(&log, 0),
            vec!["pre", "move", "trail", "post", "pre", "move", "trail", "remove"]
        );
    }

    #[test]
    fn explicit_removal_is_immediate_and_fires_remove_hook_once() {
        let log = Arc::new(Mutex::new(Log::default()));
        let mut host = MockHost::default();
        let mut engine = ProjectileEngine::new();
        let first = engine.launch(
            Vec3::ZERO,
            Projectile::new(100, 100.0, Recording::new(0, &log)).with_velocity(Vec3::X),
        );
        let second = engine.launch(
            Vec3::ZERO,
            Projectile::new(100, 100.0, Recording::new(1, &log)).with_velocity(Vec3::X),
        );

        assert!(engine.remove(first, &mut host));
        assert_eq!(engine.len(), 1);
        assert!(engine.get(first).is_none());
        assert_eq!(engine.ids().collect::<Vec<_>>(), vec![second]);
        assert_eq!(events_of(&log, 0), vec!["remove"]);
        assert_eq!(log.lock().unwrap().removes, 1);

        assert!(!engine.remove(first, &mut host));
        let report = engine.update(&mut host);
        assert_eq!(report.visited, 1);
        assert_eq!(events_of(&log, 0), vec!["remove"]);
        assert_eq!(log.lock().unwrap().removes, 1);
    }

    #[test]
    fn failing_hook_drops_only_that_projectile() {
        let log = Arc::new(Mutex::new(Log::default()));
        let mut broken = Recording::new(0, &log);
        broken.fail_on_move = Some(3);

        let mut host = MockHost::default();
        let mut engine = ProjectileEngine::new();
        engine.launch(Vec3::ZERO, Projectile::new(100, 100.0, broken).with_velocity(Vec3::X));
        let healthy = engine.launch(
            Vec3::ZERO,
            Projectile::new(100, 100.0, Recording::new(1, &log)).with_velocity(Vec3::X),
        );

        engine.update(&mut host);
        engine.update(&mut host);
        let report = engine.update(&mut host);
        assert_eq!(report.faulted, 1);
        assert_eq!(report.removed, 0);
        assert_eq!(engine.ids().collect::<Vec<_>>(), vec![healthy]);

        engine.update(&mut host);
        let broken_events = events_of(&log, 0);
        assert_eq!(broken_events.last(), Some(&"move"));
        assert!(!broken_events.contains(&"remove"));
        assert_eq!(events_of(&log, 1).iter().filter(|e| **e == "pre").count(), 4);
    }

    #[test]
    fn projectiles_tick_in_launch_order() {
        let log = Arc::new(Mutex::new(Log::default()));
        let mut host = MockHost::default();
        let mut engine = ProjectileEngine::new();
        for tag in [3, 1, 2] {
            engine.launch(
                Vec3::ZERO,
                Projectile::new(100, 100.0, Recording::new(tag, &log)).with_velocity(Vec3::X),
            );
        }

        engine.update(&mut host);

        let order: Vec<u64> = log
            .lock()
            .unwrap()
            .events
            .iter()
            .filter(|(_, e)| *e == "pre")
            .map(|(t, _)| *t)
            .collect();
        assert_eq!(order, vec![3, 1, 2]);
    }

    #[test]
    fn resting_projectile_has_no_trail_velocity() {
        let log = Arc::new(Mutex::new(Log::default()));
        let mut host = MockHost::default();
        let mut engine = ProjectileEngine::new();
        let id = engine.launch(Vec3::ONE, Projectile::new(3, 100.0, Recording::new(0, &log)));

        engine.update(&mut host);
        assert!(engine.set_velocity(id, Vec3::Y));
        engine.update(&mut host);

        let log = log.lock().unwrap();
        assert_eq!(log.trail_velocities, vec![None, Some(Vec3::Y)]);
    }
}
