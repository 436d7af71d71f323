pub mod breath;
pub mod burn;
pub mod flames;

use bevy_ecs::prelude::*;
use rand::Rng;
use tracing::{debug, info};

pub use breath::{breath_area, breath_toggle, breathe};
pub use burn::{BurnPhase, BurnTask, BurnTasks};

use crate::{host::Host, protocol::EntityId};

// ============================================================================
// Combat Effects
// ============================================================================

/// The designated actor's breath ability and the burn tasks it starts.
///
/// With no designated actor, or while that actor is offline, the toggle stays
/// off and nothing new is set on fire. Burns already running still finish.
#[derive(Resource, Debug, Default)]
pub struct CombatEffects {
    actor: Option<EntityId>,
    toggled: bool,
    burns: BurnTasks,
}

impl CombatEffects {
    #[must_use]
    pub fn new(actor: Option<EntityId>) -> Self {
        Self {
            actor,
            ..Self::default()
        }
    }

    #[must_use]
    pub const fn actor(&self) -> Option<EntityId> {
        self.actor
    }

    pub fn set_actor(&mut self, actor: Option<EntityId>) {
        if self.actor != actor {
            info!("designated actor is now {:?}", actor);
        }
        self.actor = actor;
        if actor.is_none() {
            self.toggled = false;
        }
    }

    #[must_use]
    pub fn is_designated(&self, id: EntityId) -> bool {
        self.actor == Some(id)
    }

    #[must_use]
    pub const fn is_toggled(&self) -> bool {
        self.toggled
    }

    #[must_use]
    pub const fn burns(&self) -> &BurnTasks {
        &self.burns
    }

    // Posture change of `id`. Only the designated actor's sneaking matters.
    pub fn on_sneak(&mut self, host: &mut dyn Host, id: EntityId) -> bool {
        if self.is_designated(id) {
            self.refresh_toggle(host);
        }
        self.toggled
    }

    // Re-derive the toggle from the actor's current posture and held item.
    pub fn refresh_toggle(&mut self, host: &mut dyn Host) -> bool {
        let toggled = self
            .actor
            .and_then(|id| host.actor(id))
            .is_some_and(|actor| breath_toggle(&actor));
        if toggled != self.toggled {
            debug!("breath {}", if toggled { "on" } else { "off" });
        }
        self.toggled = toggled;
        toggled
    }

    // One breath phase. Returns how many new burn tasks it started.
    pub fn breath_tick(&mut self, host: &mut dyn Host, rng: &mut impl Rng) -> usize {
        if !self.refresh_toggle(host) {
            return 0;
        }
        let Some(actor) = self.actor.and_then(|id| host.actor(id)) else {
            return 0;
        };

        breathe(host, rng, &actor)
            .into_iter()
            .filter(|entity| self.burns.start(*entity))
            .count()
    }

    // Invoke every running burn task once. Returns how many finished.
    pub fn advance_burns(&mut self, host: &mut dyn Host) -> usize {
        self.burns.advance_all(host)
    }
}
