use std::collections::{BTreeMap, BTreeSet};

use bevy_ecs::prelude::*;
use bevy_math::Vec3;
use tokio::sync::mpsc::UnboundedSender;
use tracing::{debug, trace};

use crate::protocol::{Equipment, FakeEntityId, FakeEntityKind, FakeEntityPacket, FakeMetadata, ObserverId};

// ============================================================================
// Handles And Entity Records
// ============================================================================

// Opaque reference to a fake entity owned by the registry. Stays valid as a
// value after removal; every operation on a removed handle is a no-op.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FakeEntityHandle(FakeEntityId);

impl FakeEntityHandle {
    #[must_use]
    pub const fn id(self) -> FakeEntityId {
        self.0
    }
}

#[derive(Debug, Clone, Copy, Default)]
struct Dirty {
    position: bool,
    metadata: bool,
    equipment: bool,
}

impl Dirty {
    const fn any(self) -> bool {
        self.position || self.metadata || self.equipment
    }
}

#[derive(Debug)]
struct FakeEntity {
    kind: FakeEntityKind,
    position: Vec3,
    metadata: FakeMetadata,
    equipment: Equipment,
    observers: BTreeSet<ObserverId>,
    dirty: Dirty,
    // Broadcast to observers at least once
    spawned: bool,
    // Waiting for the flush that despawns it
    removed: bool,
}

impl FakeEntity {
    const fn spawn_packet(&self, id: FakeEntityId) -> FakeEntityPacket {
        FakeEntityPacket::Spawn {
            id,
            kind: self.kind,
            position: self.position,
            metadata: self.metadata,
            equipment: self.equipment,
        }
    }

    // Packets for whatever changed since the last flush
    fn change_packets(&self, id: FakeEntityId) -> Vec<FakeEntityPacket> {
        let mut packets = Vec::with_capacity(3);
        if self.dirty.position {
            packets.push(FakeEntityPacket::Move {
                id,
                position: self.position,
            });
        }
        if self.dirty.metadata {
            packets.push(FakeEntityPacket::Metadata {
                id,
                metadata: self.metadata,
            });
        }
        if self.dirty.equipment {
            packets.push(FakeEntityPacket::Equipment {
                id,
                equipment: self.equipment,
            });
        }
        packets
    }
}

// Counts from one flush
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FlushStats {
    pub spawned: usize,
    pub updated: usize,
    pub despawned: usize,
    pub packets: usize,
}

// ============================================================================
// Fake Entity Registry
// ============================================================================

/// Server-side fake entities and the observers that see them.
///
/// Mutations only mark entities dirty. Observers hear about them in
/// [`FakeEntityRegistry::update`], which runs once per tick and walks entities
/// in creation order. The one exception is [`FakeEntityRegistry::add_player`],
/// which catches a new observer up immediately.
#[derive(Resource, Default)]
pub struct FakeEntityRegistry {
    next_id: u32,
    entities: BTreeMap<FakeEntityId, FakeEntity>,
    observers: BTreeMap<ObserverId, UnboundedSender<FakeEntityPacket>>,
}

impl FakeEntityRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    // ------------------------------------------------------------------------
    // Observers
    // ------------------------------------------------------------------------

    // Register `observer` and send it every entity that is already visible.
    // Returns false if it was already registered.
    pub fn add_player(&mut self, observer: ObserverId, channel: UnboundedSender<FakeEntityPacket>) -> bool {
        if self.observers.contains_key(&observer) {
            return false;
        }

        let mut synced = 0;
        for (id, entity) in &mut self.entities {
            if entity.spawned && !entity.removed {
                let _ = channel.send(entity.spawn_packet(*id));
                entity.observers.insert(observer);
                synced += 1;
            }
        }
        self.observers.insert(observer, channel);

        debug!("{:?} registered, synced {} fake entities", observer, synced);
        true
    }

    // Deregister `observer`, despawning everything it could see. Returns false
    // if it was not registered.
    pub fn remove_player(&mut self, observer: ObserverId) -> bool {
        let Some(channel) = self.observers.remove(&observer) else {
            return false;
        };

        for (id, entity) in &mut self.entities {
            if entity.observers.remove(&observer) {
                let _ = channel.send(FakeEntityPacket::Despawn { id: *id });
            }
        }

        debug!("{:?} deregistered", observer);
        true
    }

    #[must_use]
    pub fn is_observer(&self, observer: ObserverId) -> bool {
        self.observers.contains_key(&observer)
    }

    #[must_use]
    pub fn observer_count(&self) -> usize {
        self.observers.len()
    }

    pub fn observers(&self) -> impl Iterator<Item = ObserverId> + '_ {
        self.observers.keys().copied()
    }

    // ------------------------------------------------------------------------
    // Entity Lifecycle
    // ------------------------------------------------------------------------

    pub fn spawn_entity(&mut self, position: Vec3, kind: FakeEntityKind) -> FakeEntityHandle {
        let id = FakeEntityId(self.next_id);
        self.next_id = self.next_id.wrapping_add(1);

        self.entities.insert(
            id,
            FakeEntity {
                kind,
                position,
                metadata: FakeMetadata::default(),
                equipment: Equipment::default(),
                observers: BTreeSet::new(),
                dirty: Dirty::default(),
                spawned: false,
                removed: false,
            },
        );

        trace!("fake entity {:?} ({:?}) created at {}", id, kind, position);
        FakeEntityHandle(id)
    }

    pub fn update_metadata(&mut self, handle: FakeEntityHandle, update: impl FnOnce(&mut FakeMetadata)) -> bool {
        let Some(entity) = self.live_mut(handle) else {
            return false;
        };
        update(&mut entity.metadata);
        entity.dirty.metadata = true;
        true
    }

    pub fn update_equipment(&mut self, handle: FakeEntityHandle, update: impl FnOnce(&mut Equipment)) -> bool {
        let Some(entity) = self.live_mut(handle) else {
            return false;
        };
        update(&mut entity.equipment);
        entity.dirty.equipment = true;
        true
    }

    pub fn move_to(&mut self, handle: FakeEntityHandle, position: Vec3) -> bool {
        let Some(entity) = self.live_mut(handle) else {
            return false;
        };
        entity.position = position;
        entity.dirty.position = true;
        true
    }

    // Mark for despawn at the next flush. Removing twice is harmless.
    pub fn remove(&mut self, handle: FakeEntityHandle) -> bool {
        let Some(entity) = self.live_mut(handle) else {
            return false;
        };
        entity.removed = true;
        true
    }

    fn live_mut(&mut self, handle: FakeEntityHandle) -> Option<&mut FakeEntity> {
        self.entities.get_mut(&handle.0).filter(|entity| !entity.removed)
    }

    fn live(&self, handle: FakeEntityHandle) -> Option<&FakeEntity> {
        self.entities.get(&handle.0).filter(|entity| !entity.removed)
    }

    #[must_use]
    pub fn is_alive(&self, handle: FakeEntityHandle) -> bool {
        self.live(handle).is_some()
    }

    #[must_use]
    pub fn position(&self, handle: FakeEntityHandle) -> Option<Vec3> {
        self.live(handle).map(|entity| entity.position)
    }

    #[must_use]
    pub fn metadata(&self, handle: FakeEntityHandle) -> Option<FakeMetadata> {
        self.live(handle).map(|entity| entity.metadata)
    }

    #[must_use]
    pub fn equipment(&self, handle: FakeEntityHandle) -> Option<Equipment> {
        self.live(handle).map(|entity| entity.equipment)
    }

    // Entities still tracked, including ones waiting for their despawn flush
    #[must_use]
    pub fn len(&self) -> usize {
        self.entities.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    // ------------------------------------------------------------------------
    // Flush
    // ------------------------------------------------------------------------

    // Push every pending spawn, change and removal to the observers that
    // should see it.
    pub fn update(&mut self) -> FlushStats {
        let observers = &self.observers;
        let mut stats = FlushStats::default();

        let send = |observer: &ObserverId, packet: FakeEntityPacket, stats: &mut FlushStats| {
            if let Some(channel) = observers.get(observer) {
                if channel.send(packet).is_err() {
                    trace!("{:?} channel closed, packet dropped", observer);
                }
                stats.packets += 1;
            }
        };

        self.entities.retain(|id, entity| {
            if entity.removed {
                if entity.spawned {
                    for observer in &entity.observers {
                        send(observer, FakeEntityPacket::Despawn { id: *id }, &mut stats);
                    }
                    stats.despawned += 1;
                }
                return false;
            }

            if !entity.spawned {
                entity.observers = observers.keys().copied().collect();
                for observer in &entity.observers {
                    send(observer, entity.spawn_packet(*id), &mut stats);
                }
                entity.spawned = true;
                entity.dirty = Dirty::default();
                stats.spawned += 1;
                return true;
            }

            if entity.dirty.any() {
                let packets = entity.change_packets(*id);
                for observer in &entity.observers {
                    for packet in &packets {
                        send(observer, packet.clone(), &mut stats);
                    }
                }
                entity.dirty = Dirty::default();
                stats.updated += 1;
            }
            true
        });

        stats
    }
}
