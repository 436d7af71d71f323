use std::{fmt, str::FromStr};

use bevy_math::Vec3;

// ============================================================================
// Identifiers
// ============================================================================

// Host-side entity (player, creature or object) identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EntityId(pub u32);

// A player that receives fake entity packets. Observers are players, so the id
// is the player's entity id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObserverId(pub u32);

impl From<EntityId> for ObserverId {
    fn from(id: EntityId) -> Self {
        Self(id.0)
    }
}

// Fake entity identifier. Allocated in increasing order, so ordering by id is
// ordering by creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FakeEntityId(pub u32);

// ============================================================================
// Items
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ItemKind {
    BlazeRod,
    FlintAndSteel,
    MagmaBlock,
    Stick,
}

impl ItemKind {
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::BlazeRod => "blaze_rod",
            Self::FlintAndSteel => "flint_and_steel",
            Self::MagmaBlock => "magma_block",
            Self::Stick => "stick",
        }
    }
}

impl FromStr for ItemKind {
    type Err = ParseKindError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "blaze_rod" => Ok(Self::BlazeRod),
            "flint_and_steel" => Ok(Self::FlintAndSteel),
            "magma_block" => Ok(Self::MagmaBlock),
            "stick" => Ok(Self::Stick),
            _ => Err(ParseKindError::new("item", s)),
        }
    }
}

impl fmt::Display for ItemKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// ============================================================================
// Targets
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum GameMode {
    #[default]
    Survival,
    Adventure,
    Creative,
    Spectator,
}

impl GameMode {
    // Creative and spectator players never take damage
    #[must_use]
    pub const fn is_damageable(self) -> bool {
        matches!(self, Self::Survival | Self::Adventure)
    }
}

impl FromStr for GameMode {
    type Err = ParseKindError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "survival" => Ok(Self::Survival),
            "adventure" => Ok(Self::Adventure),
            "creative" => Ok(Self::Creative),
            "spectator" => Ok(Self::Spectator),
            _ => Err(ParseKindError::new("game mode", s)),
        }
    }
}

// What a host entity is, as far as hit selection cares
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetKind {
    Player(GameMode),
    Creature,
    Object,
}

// Entity description handed to hit filters
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TargetInfo {
    pub id: EntityId,
    pub kind: TargetKind,
}

// ============================================================================
// Player Input
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InteractAction {
    LeftClickAir,
    LeftClickBlock,
    RightClickAir,
    RightClickBlock,
}

impl FromStr for InteractAction {
    type Err = ParseKindError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "left_air" => Ok(Self::LeftClickAir),
            "left_block" => Ok(Self::LeftClickBlock),
            "right_air" => Ok(Self::RightClickAir),
            "right_block" => Ok(Self::RightClickBlock),
            _ => Err(ParseKindError::new("interact action", s)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseKindError {
    what: &'static str,
    value: String,
}

impl ParseKindError {
    fn new(what: &'static str, value: &str) -> Self {
        Self {
            what,
            value: value.to_string(),
        }
    }
}

impl fmt::Display for ParseKindError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown {} '{}'", self.what, self.value)
    }
}

impl std::error::Error for ParseKindError {}

// ============================================================================
// Fake Entity State
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FakeEntityKind {
    ArmorStand,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FakeMetadata {
    pub invisible: bool,
    pub marker: bool,
    pub glowing: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Equipment {
    pub helmet: Option<ItemKind>,
    pub chestplate: Option<ItemKind>,
    pub leggings: Option<ItemKind>,
    pub boots: Option<ItemKind>,
    pub main_hand: Option<ItemKind>,
    pub off_hand: Option<ItemKind>,
}

// ============================================================================
// Observer Packets
// ============================================================================

// Everything an observer learns about fake entities arrives as one of these,
// and only from the registry flush (plus the catch-up sync on registration).
#[derive(Debug, Clone, PartialEq)]
pub enum FakeEntityPacket {
    Spawn {
        id: FakeEntityId,
        kind: FakeEntityKind,
        position: Vec3,
        metadata: FakeMetadata,
        equipment: Equipment,
    },
    Move {
        id: FakeEntityId,
        position: Vec3,
    },
    Metadata {
        id: FakeEntityId,
        metadata: FakeMetadata,
    },
    Equipment {
        id: FakeEntityId,
        equipment: Equipment,
    },
    Despawn {
        id: FakeEntityId,
    },
}

impl FakeEntityPacket {
    #[must_use]
    pub const fn id(&self) -> FakeEntityId {
        match self {
            Self::Spawn { id, .. }
            | Self::Move { id, .. }
            | Self::Metadata { id, .. }
            | Self::Equipment { id, .. }
            | Self::Despawn { id } => *id,
        }
    }
}
