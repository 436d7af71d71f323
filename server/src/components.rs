use bevy::prelude::*;

use common::protocol::{EntityId, ItemKind, TargetKind};

// ============================================================================
// Host Entity Components
// ============================================================================

// Identity every simulated entity carries. `kind` changes with game mode.
#[derive(Component, Debug, Clone, Copy)]
pub struct HostEntity {
    pub id: EntityId,
    pub kind: TargetKind,
}

// Feet position
#[derive(Component, Debug, Clone, Copy, PartialEq)]
pub struct Position(pub Vec3);

// Unit look direction
#[derive(Component, Debug, Clone, Copy, PartialEq)]
pub struct Look(pub Vec3);

#[derive(Component, Debug, Clone, Copy)]
pub struct Hitbox {
    pub width: f32,
    pub height: f32,
}

#[derive(Component, Debug, Clone, Copy, Default)]
pub struct HeldItem(pub Option<ItemKind>);

#[derive(Component, Debug, Clone, Copy, Default)]
pub struct Sneaking(pub bool);

// Only living entities burn
#[derive(Component, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FireStatus {
    pub visual: bool,
    pub ticks: i32,
}

#[derive(Component, Debug, Clone)]
pub struct PlayerName(pub String);

/// Marker component: the entity is a connected player
#[derive(Component)]
pub struct PlayerMarker;

/// Marker component: the entity is a non-player creature
#[derive(Component)]
pub struct CreatureMarker;
