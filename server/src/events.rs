use bevy::prelude::Vec3;

use common::protocol::{GameMode, InteractAction, ItemKind};

// ============================================================================
// Host Events
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PyreCommand {
    Start,
    Stop,
}

// Everything the outside world can do to the host, one per console line
#[derive(Debug, Clone, PartialEq)]
pub enum HostEvent {
    Join { name: String },
    Quit { name: String },
    Look { name: String, direction: Vec3 },
    Teleport { name: String, position: Vec3 },
    Hold { name: String, item: Option<ItemKind> },
    Sneak { name: String, sneaking: bool },
    GameMode { name: String, mode: GameMode },
    Interact { name: String, action: InteractAction },
    SpawnCreature { label: String, position: Vec3 },
    Command { sender: String, command: PyreCommand },
    Shutdown,
}
