pub mod events;
pub mod tick;

pub use events::host_events_system;
pub use tick::{
    breath_system, burns_system, projectiles_system, registry_flush_system, scheduler_advance_system, scheduler_running,
    toggle_refresh_system,
};
