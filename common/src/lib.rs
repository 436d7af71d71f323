pub mod collision;
pub mod combat;
pub mod constants;
pub mod error;
pub mod fake_entities;
pub mod host;
pub mod projectiles;
pub mod protocol;

pub use error::HostError;
