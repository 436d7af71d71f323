use bevy::prelude::*;
use tokio::sync::mpsc::unbounded_channel;
use tracing::{debug, info, warn};

use crate::{
    components::{
        CreatureMarker, FireStatus, HeldItem, Hitbox, HostEntity, Look, PlayerMarker, PlayerName, Position, Sneaking,
    },
    config::ServerConfig,
    constants::{ACK_COLOUR, ACK_TEXT, CREATURE_HEIGHT, CREATURE_WIDTH, PLAYER_HEIGHT, PLAYER_WIDTH},
    events::{HostEvent, PyreCommand},
    host::EcsHost,
    observers::ObserverLink,
    resources::{
        EntityIndex, Feedback, FromConsoleChannel, HostEffects, ListenerState, PlayerInfo, PlayerMap, SchedulerState,
        ShutdownRequested, Terrain, ToObserversChannel,
    },
};
use common::{
    combat::CombatEffects,
    constants::FIRE_TICKS_CLEAR,
    fake_entities::FakeEntityRegistry,
    host::Host,
    projectiles::{ProjectileEngine, launch_magma_block, triggers_launch},
    protocol::{EntityId, GameMode, InteractAction, ItemKind, TargetKind},
};

// ============================================================================
// Host Event System
// ============================================================================

// Apply every event the console sent since the last tick, in arrival order.
pub fn host_events_system(world: &mut World) {
    let mut events = Vec::new();
    {
        let mut from_console = world.resource_mut::<FromConsoleChannel>();
        while let Ok(event) = from_console.try_recv() {
            events.push(event);
        }
    }

    for event in events {
        handle_event(world, event);
    }
}

fn handle_event(world: &mut World, event: HostEvent) {
    match event {
        HostEvent::Join { name } => handle_join(world, name),
        HostEvent::Quit { name } => handle_quit(world, &name),
        HostEvent::Look { name, direction } => {
            let direction = direction.normalize_or_zero();
            if direction == Vec3::ZERO {
                warn!("ignoring zero look direction for {name}");
                return;
            }
            update_player(world, &name, |mut player| {
                if let Some(mut look) = player.get_mut::<Look>() {
                    look.0 = direction;
                }
            });
        }
        HostEvent::Teleport { name, position } => update_player(world, &name, |mut player| {
            if let Some(mut current) = player.get_mut::<Position>() {
                current.0 = position;
            }
        }),
        HostEvent::Hold { name, item } => handle_hold(world, &name, item),
        HostEvent::Sneak { name, sneaking } => handle_sneak(world, &name, sneaking),
        HostEvent::GameMode { name, mode } => handle_game_mode(world, &name, mode),
        HostEvent::Interact { name, action } => handle_interact(world, &name, action),
        HostEvent::SpawnCreature { label, position } => spawn_creature(world, &label, position),
        HostEvent::Command { sender, command } => handle_command(world, &sender, command),
        HostEvent::Shutdown => {
            info!("shutdown requested");
            world.resource_mut::<ShutdownRequested>().0 = true;
        }
    }
}

// ============================================================================
// Helpers
// ============================================================================

fn online_player(world: &World, name: &str) -> Option<PlayerInfo> {
    let info = world.resource::<PlayerMap>().0.get(name).copied();
    if info.is_none() {
        warn!("{name} is not online");
    }
    info
}

fn update_player(world: &mut World, name: &str, update: impl FnOnce(EntityWorldMut<'_>)) {
    let Some(info) = online_player(world, name) else {
        return;
    };
    if let Ok(player) = world.get_entity_mut(info.entity) {
        update(player);
    }
}

fn listener_registered(world: &World) -> bool {
    world.resource::<ListenerState>().registered
}

// Register `id` with the fake entity registry and hand its packet stream to
// the observer tasks.
fn register_observer(world: &mut World, name: &str, id: EntityId) -> bool {
    let (to_observer, packets) = unbounded_channel();
    if !world.resource_mut::<FakeEntityRegistry>().add_player(id.into(), to_observer) {
        return false;
    }

    let link = ObserverLink {
        observer: id.into(),
        name: name.to_string(),
        packets,
    };
    if !world.resource::<ToObserversChannel>().send(link) {
        warn!("no observer task for {name}, packets will be dropped");
    }
    true
}

// ============================================================================
// Join And Quit
// ============================================================================

fn handle_join(world: &mut World, name: String) {
    if world.resource::<PlayerMap>().0.contains_key(&name) {
        warn!("{name} is already online");
        return;
    }

    let id = world.resource_mut::<EntityIndex>().allocate();
    let feet = Vec3::new(0.0, world.resource::<Terrain>().spawn_height(), 0.0);
    let entity = world
        .spawn((
            PlayerMarker,
            PlayerName(name.clone()),
            HostEntity {
                id,
                kind: TargetKind::Player(GameMode::default()),
            },
            Position(feet),
            Look(Vec3::NEG_Z),
            Hitbox {
                width: PLAYER_WIDTH,
                height: PLAYER_HEIGHT,
            },
            HeldItem::default(),
            Sneaking::default(),
            FireStatus::default(),
        ))
        .id();
    world.resource_mut::<EntityIndex>().insert(id, entity);
    world.resource_mut::<PlayerMap>().0.insert(name.clone(), PlayerInfo { entity, id });
    info!("{name} joined as {:?}", id);

    if world.resource::<ServerConfig>().is_admin(&name) {
        world.resource_mut::<CombatEffects>().set_actor(Some(id));
    }

    if !listener_registered(world) {
        return;
    }
    register_observer(world, &name, id);

    let mut host = EcsHost::new(world);
    if let Err(e) = host
        .set_visual_fire(id, false)
        .and_then(|()| host.set_fire_ticks(id, FIRE_TICKS_CLEAR))
    {
        warn!("failed to clear fire on {name}: {e}");
    }
}

fn handle_quit(world: &mut World, name: &str) {
    let Some(info) = world.resource_mut::<PlayerMap>().0.remove(name) else {
        warn!("{name} is not online");
        return;
    };

    if listener_registered(world) {
        world.resource_mut::<FakeEntityRegistry>().remove_player(info.id.into());
    }
    world.resource_mut::<EntityIndex>().remove(info.id);
    world.despawn(info.entity);

    let mut effects = world.resource_mut::<CombatEffects>();
    if effects.is_designated(info.id) {
        effects.set_actor(None);
    }
    info!("{name} quit");
}

// ============================================================================
// Player State
// ============================================================================

fn handle_hold(world: &mut World, name: &str, item: Option<ItemKind>) {
    update_player(world, name, |mut player| {
        if let Some(mut held) = player.get_mut::<HeldItem>() {
            held.0 = item;
        }
    });
}

fn handle_game_mode(world: &mut World, name: &str, mode: GameMode) {
    update_player(world, name, |mut player| {
        if let Some(mut host_entity) = player.get_mut::<HostEntity>() {
            host_entity.kind = TargetKind::Player(mode);
        }
    });
}

fn handle_sneak(world: &mut World, name: &str, sneaking: bool) {
    let Some(info) = online_player(world, name) else {
        return;
    };
    if let Some(mut posture) = world.get_mut::<Sneaking>(info.entity) {
        posture.0 = sneaking;
    }

    if !listener_registered(world) {
        return;
    }
    world.resource_scope(|world, mut effects: Mut<CombatEffects>| {
        effects.on_sneak(&mut EcsHost::new(world), info.id);
    });
}

fn handle_interact(world: &mut World, name: &str, action: InteractAction) {
    let Some(info) = online_player(world, name) else {
        return;
    };
    if !listener_registered(world) || !world.resource::<CombatEffects>().is_designated(info.id) {
        return;
    }

    let Some(actor) = EcsHost::new(world).actor(info.id) else {
        return;
    };
    if !triggers_launch(action, actor.held) {
        return;
    }

    let id = world.resource_scope(|world, mut engine: Mut<ProjectileEngine>| {
        let mut registry = world.resource_mut::<FakeEntityRegistry>();
        launch_magma_block(&mut engine, &mut registry, &actor)
    });
    debug!("{name} launched {:?}", id);
}

fn spawn_creature(world: &mut World, label: &str, position: Vec3) {
    let id = world.resource_mut::<EntityIndex>().allocate();
    let entity = world
        .spawn((
            CreatureMarker,
            HostEntity {
                id,
                kind: TargetKind::Creature,
            },
            Position(position),
            Look(Vec3::NEG_Z),
            Hitbox {
                width: CREATURE_WIDTH,
                height: CREATURE_HEIGHT,
            },
            FireStatus::default(),
        ))
        .id();
    world.resource_mut::<EntityIndex>().insert(id, entity);
    info!("spawned {label} as {:?} at {}", id, position);
}

// ============================================================================
// Administrative Command
// ============================================================================

fn handle_command(world: &mut World, sender: &str, command: PyreCommand) {
    match command {
        PyreCommand::Start => {
            world.resource_mut::<HostEffects>().record_feedback(Feedback {
                to: sender.to_string(),
                text: ACK_TEXT.to_string(),
                colour: ACK_COLOUR,
            });
            info!("{sender}: {ACK_TEXT}");

            world.resource_mut::<SchedulerState>().start();

            if !listener_registered(world) {
                world.resource_mut::<ListenerState>().registered = true;
                info!("event listener registered");
            }

            let online: Vec<(String, EntityId)> = world
                .resource::<PlayerMap>()
                .0
                .iter()
                .map(|(name, info)| (name.clone(), info.id))
                .collect();
            let registered = online
                .iter()
                .filter(|(name, id)| register_observer(world, name, *id))
                .count();
            if registered > 0 {
                info!("registered {registered} online players as observers");
            }
        }
        PyreCommand::Stop => {
            if !world.resource_mut::<SchedulerState>().stop() {
                info!("{sender}: tick scheduler is not running");
            }
        }
    }
}
