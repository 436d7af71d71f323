use std::collections::{BTreeMap, HashMap, VecDeque};

use bevy::prelude::*;
use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender, error::TryRecvError};
use tracing::info;

use crate::{constants::EFFECTS_HISTORY, events::HostEvent, observers::ObserverLink};
use common::protocol::EntityId;

// ============================================================================
// Entity Bookkeeping
// ============================================================================

// Player information (host-side)
#[derive(Debug, Clone, Copy)]
pub struct PlayerInfo {
    pub entity: Entity,
    pub id: EntityId,
}

// Online players by name, in name order
#[derive(Resource, Default)]
pub struct PlayerMap(pub BTreeMap<String, PlayerInfo>);

// Every host entity (players and creatures) by id
#[derive(Resource, Default)]
pub struct EntityIndex {
    next_id: u32,
    entities: HashMap<EntityId, Entity>,
}

impl EntityIndex {
    pub fn allocate(&mut self) -> EntityId {
        self.next_id += 1;
        EntityId(self.next_id)
    }

    pub fn insert(&mut self, id: EntityId, entity: Entity) {
        self.entities.insert(id, entity);
    }

    pub fn remove(&mut self, id: EntityId) -> Option<Entity> {
        self.entities.remove(&id)
    }

    #[must_use]
    pub fn get(&self, id: EntityId) -> Option<Entity> {
        self.entities.get(&id).copied()
    }
}

// ============================================================================
// Scheduler And Listener
// ============================================================================

// The repeating tick driver. Idle until the first administrative command.
#[derive(Resource, Debug, Default)]
pub struct SchedulerState {
    running: bool,
    ticks: u64,
}

impl SchedulerState {
    // Returns false if it was already running.
    pub fn start(&mut self) -> bool {
        if self.running {
            return false;
        }
        self.running = true;
        info!("tick scheduler started");
        true
    }

    // Returns false if it was not running.
    pub fn stop(&mut self) -> bool {
        if !self.running {
            return false;
        }
        self.running = false;
        info!("tick scheduler stopped after {} ticks", self.ticks);
        true
    }

    pub const fn advance(&mut self) {
        self.ticks += 1;
    }

    #[must_use]
    pub const fn is_running(&self) -> bool {
        self.running
    }

    #[must_use]
    pub const fn ticks(&self) -> u64 {
        self.ticks
    }
}

// Join, quit, interact and sneak events are ignored until this is set.
#[derive(Resource, Debug, Default)]
pub struct ListenerState {
    pub registered: bool,
}

// ============================================================================
// World
// ============================================================================

#[derive(Resource, Debug, Default, Clone, Copy)]
pub struct Terrain {
    pub ground_level: Option<f32>,
}

impl Terrain {
    #[must_use]
    pub fn spawn_height(&self) -> f32 {
        self.ground_level.unwrap_or(0.0)
    }
}

// Command feedback shown to a player
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Feedback {
    pub to: String,
    pub text: String,
    pub colour: (u8, u8, u8),
}

// What the simulation did to the world, for the log and for inspection. Only
// the most recent explosions and feedback lines are kept.
#[derive(Resource, Debug, Default)]
pub struct HostEffects {
    pub explosions: VecDeque<(Vec3, f32)>,
    pub explosion_count: u64,
    pub particles: u64,
    pub sounds: u64,
    pub feedback: VecDeque<Feedback>,
}

impl HostEffects {
    pub fn record_explosion(&mut self, position: Vec3, power: f32) {
        self.explosion_count += 1;
        push_recent(&mut self.explosions, (position, power));
    }

    pub fn record_feedback(&mut self, feedback: Feedback) {
        push_recent(&mut self.feedback, feedback);
    }
}

fn push_recent<T>(list: &mut VecDeque<T>, item: T) {
    if list.len() >= EFFECTS_HISTORY {
        list.pop_front();
    }
    list.push_back(item);
}

#[derive(Resource, Debug, Default)]
pub struct ShutdownRequested(pub bool);

// ============================================================================
// Channels
// ============================================================================

// Resource wrapper for the channel from the console task
#[derive(Resource)]
pub struct FromConsoleChannel(UnboundedReceiver<HostEvent>);

impl FromConsoleChannel {
    #[must_use]
    pub const fn new(receiver: UnboundedReceiver<HostEvent>) -> Self {
        Self(receiver)
    }

    pub fn try_recv(&mut self) -> Result<HostEvent, TryRecvError> {
        self.0.try_recv()
    }
}

// Resource wrapper for the channel that hands new observer packet streams to
// the task that forwards them.
#[derive(Resource)]
pub struct ToObserversChannel(UnboundedSender<ObserverLink>);

impl ToObserversChannel {
    #[must_use]
    pub const fn new(sender: UnboundedSender<ObserverLink>) -> Self {
        Self(sender)
    }

    pub fn send(&self, link: ObserverLink) -> bool {
        self.0.send(link).is_ok()
    }
}
