use thiserror::Error;

use crate::protocol::EntityId;

// ============================================================================
// Host Errors
// ============================================================================

/// Failures reported by the host when a hook or task calls into it.
///
/// They are never retried: the engine drops the affected projectile or burn
/// task and keeps ticking everything else.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum HostError {
    /// The entity is gone (died, despawned or disconnected).
    #[error("unknown entity {0:?}")]
    UnknownEntity(EntityId),

    /// The entity exists but cannot carry the requested status.
    #[error("entity {0:?} is not a living entity")]
    NotLiving(EntityId),
}
