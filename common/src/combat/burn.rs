use tracing::{debug, warn};

use crate::{
    constants::{BURN_EXTINGUISH_AT, BURN_FIRE_TICKS, BURN_IGNITE_AT, FIRE_TICKS_EXTINGUISHED},
    error::HostError,
    host::Host,
    protocol::EntityId,
};

// ============================================================================
// Burn Status Task
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BurnPhase {
    Pending,
    Burning,
    Done,
}

// Sets an entity on fire on its second invocation and puts it out on its
// hundredth. Invoked once per tick.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BurnTask {
    entity: EntityId,
    invocations: u32,
    phase: BurnPhase,
}

impl BurnTask {
    #[must_use]
    pub const fn new(entity: EntityId) -> Self {
        Self {
            entity,
            invocations: 0,
            phase: BurnPhase::Pending,
        }
    }

    #[must_use]
    pub const fn entity(&self) -> EntityId {
        self.entity
    }

    #[must_use]
    pub const fn phase(&self) -> BurnPhase {
        self.phase
    }

    #[must_use]
    pub const fn invocations(&self) -> u32 {
        self.invocations
    }

    pub fn advance(&mut self, host: &mut dyn Host) -> Result<BurnPhase, HostError> {
        if self.phase == BurnPhase::Done {
            return Ok(self.phase);
        }

        self.invocations += 1;
        if self.invocations == BURN_IGNITE_AT {
            host.set_visual_fire(self.entity, true)?;
            host.set_fire_ticks(self.entity, BURN_FIRE_TICKS)?;
            self.phase = BurnPhase::Burning;
            debug!("{:?} ignited", self.entity);
        } else if self.invocations == BURN_EXTINGUISH_AT {
            host.set_visual_fire(self.entity, false)?;
            host.set_fire_ticks(self.entity, FIRE_TICKS_EXTINGUISHED)?;
            self.phase = BurnPhase::Done;
            debug!("{:?} extinguished", self.entity);
        }
        Ok(self.phase)
    }
}

// ============================================================================
// Task List
// ============================================================================

// Running burn tasks, at most one per entity, advanced in start order.
#[derive(Debug, Default)]
pub struct BurnTasks {
    tasks: Vec<BurnTask>,
}

impl BurnTasks {
    // Returns false if the entity already has a running task.
    pub fn start(&mut self, entity: EntityId) -> bool {
        if self.is_burning(entity) {
            return false;
        }
        self.tasks.push(BurnTask::new(entity));
        true
    }

    #[must_use]
    pub fn is_burning(&self, entity: EntityId) -> bool {
        self.tasks.iter().any(|task| task.entity == entity)
    }

    #[must_use]
    pub fn get(&self, entity: EntityId) -> Option<&BurnTask> {
        self.tasks.iter().find(|task| task.entity == entity)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    // Invoke every task once. Finished tasks and tasks whose entity the host
    // rejects leave the list. Returns how many left.
    pub fn advance_all(&mut self, host: &mut dyn Host) -> usize {
        let before = self.tasks.len();
        self.tasks.retain_mut(|task| match task.advance(host) {
            Ok(phase) => phase != BurnPhase::Done,
            Err(err) => {
                warn!("burn task for {:?} dropped: {err}", task.entity);
                false
            }
        });
        before - self.tasks.len()
    }
}

#[cfg(test)]
mod tests {
    use bevy_math::Vec3;

    use super::*;
    use crate::{host::testing::MockHost, protocol::TargetKind};

    #[test]
    fn ignites_on_second_and_clears_on_hundredth_invocation() {
        let mut host = MockHost::default();
        let victim = host.add_target(5, TargetKind::Creature, Vec3::ZERO);
        let mut task = BurnTask::new(victim);

        assert_eq!(task.advance(&mut host), Ok(BurnPhase::Pending));
        assert_eq!(host.fire_of(victim), (false, 0));

        assert_eq!(task.advance(&mut host), Ok(BurnPhase::Burning));
        assert_eq!(host.fire_of(victim), (true, 100));

        for _ in 3..100 {
            assert_eq!(task.advance(&mut host), Ok(BurnPhase::Burning));
        }
        assert_eq!(task.invocations(), 99);
        assert_eq!(host.fire_of(victim), (true, 100));

        assert_eq!(task.advance(&mut host), Ok(BurnPhase::Done));
        assert_eq!(host.fire_of(victim), (false, -1));

        // Finished tasks stay finished
        assert_eq!(task.advance(&mut host), Ok(BurnPhase::Done));
        assert_eq!(task.invocations(), 100);
    }

    #[test]
    fn one_task_per_entity() {
        let mut tasks = BurnTasks::default();
        assert!(tasks.start(EntityId(1)));
        assert!(!tasks.start(EntityId(1)));
        assert!(tasks.start(EntityId(2)));
        assert_eq!(tasks.len(), 2);
    }

    #[test]
    fn finished_tasks_leave_the_list() {
        let mut host = MockHost::default();
        let victim = host.add_target(5, TargetKind::Creature, Vec3::ZERO);
        let mut tasks = BurnTasks::default();
        tasks.start(victim);

        for _ in 0..99 {
            assert_eq!(tasks.advance_all(&mut host), 0);
        }
        assert_eq!(tasks.advance_all(&mut host), 1);
        assert!(tasks.is_empty());

        // A new task may start once the previous one is done
        assert!(tasks.start(victim));
    }

    #[test]
    fn vanished_entity_drops_only_its_task() {
        let mut host = MockHost::default();
        let gone = host.add_target(5, TargetKind::Creature, Vec3::ZERO);
        let stays = host.add_target(6, TargetKind::Creature, Vec3::X);
        let mut tasks = BurnTasks::default();
        tasks.start(gone);
        tasks.start(stays);

        tasks.advance_all(&mut host);
        host.remove_target(gone);
        assert_eq!(tasks.advance_all(&mut host), 1);

        assert!(!tasks.is_burning(gone));
        assert_eq!(tasks.get(stays).map(BurnTask::phase), Some(BurnPhase::Burning));
        assert_eq!(host.fire_of(stays), (true, 100));
    }
}
