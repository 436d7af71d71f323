pub mod components;
pub mod config;
pub mod console;
pub mod constants;
pub mod events;
pub mod host;
pub mod observers;
pub mod resources;
pub mod systems;

use bevy::prelude::*;
use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender};

use config::ServerConfig;
use events::HostEvent;
use observers::ObserverLink;
use resources::*;
use systems::*;

use common::{combat::CombatEffects, fake_entities::FakeEntityRegistry, projectiles::ProjectileEngine};

// ============================================================================
// App Setup
// ============================================================================

// Build the host app. Each `app.update()` is one tick: console events first,
// then the scheduler's systems if it has been started.
pub fn build_app(
    config: ServerConfig,
    from_console: UnboundedReceiver<HostEvent>,
    to_observers: UnboundedSender<ObserverLink>,
) -> App {
    let mut app = App::new();

    app.insert_resource(Terrain {
        ground_level: config.ground_level,
    })
    .insert_resource(config)
    .insert_resource(FakeEntityRegistry::new())
    .insert_resource(ProjectileEngine::new())
    .insert_resource(CombatEffects::default())
    .insert_resource(PlayerMap::default())
    .insert_resource(EntityIndex::default())
    .insert_resource(SchedulerState::default())
    .insert_resource(ListenerState::default())
    .insert_resource(HostEffects::default())
    .insert_resource(ShutdownRequested::default())
    .insert_resource(FromConsoleChannel::new(from_console))
    .insert_resource(ToObserversChannel::new(to_observers))
    .add_systems(
        Update,
        (
            host_events_system,
            (
                scheduler_advance_system,
                registry_flush_system,
                projectiles_system,
                breath_system,
                toggle_refresh_system,
                burns_system,
            )
                .chain()
                .run_if(scheduler_running),
        )
            .chain(),
    );

    app
}
