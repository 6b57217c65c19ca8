//! Helpers for driving single systems against a bare `World`.
//!
//! Commands queued by a system land only after `world.flush()`, so every helper run flushes
//! before returning.

use std::time::Duration;

use bevy::ecs::message::Messages;
use bevy::ecs::system::{IntoSystem, RunSystemOnce};
use bevy::prelude::*;

use crate::plugins::scene::{BehaviorFault, SceneEvent};

/// Run `system` once and apply its queued commands.
pub fn run_system_once<T, Out, Marker>(world: &mut World, system: T) -> Out
where
    T: IntoSystem<(), Out, Marker>,
{
    let out = world.run_system_once(system).expect("system run failed");
    world.flush();
    out
}

/// Ensure the message buffers used by the behaviors exist.
pub fn init_scene_messages(world: &mut World) {
    if world.get_resource::<Messages<SceneEvent>>().is_none() {
        world.init_resource::<Messages<SceneEvent>>();
    }
    if world.get_resource::<Messages<BehaviorFault>>().is_none() {
        world.init_resource::<Messages<BehaviorFault>>();
    }
}

/// Insert a `Time` whose delta is `step`; every system run ticks timers by that much.
pub fn insert_time_step(world: &mut World, step: Duration) {
    let mut time = Time::<()>::default();
    time.advance_by(step);
    world.insert_resource(time);
}

/// Drain every scene event currently buffered.
pub fn read_scene_events(world: &mut World) -> Vec<SceneEvent> {
    run_system_once(world, |mut reader: MessageReader<SceneEvent>| {
        reader.read().cloned().collect::<Vec<_>>()
    })
}

/// Drain every fault currently buffered.
pub fn read_faults(world: &mut World) -> Vec<BehaviorFault> {
    run_system_once(world, |mut reader: MessageReader<BehaviorFault>| {
        reader.read().cloned().collect::<Vec<_>>()
    })
}

/// A world with scene messages, built-in attribute appliers and an empty mixin registry.
pub fn scene_world() -> World {
    use crate::plugins::scene::{AttributeRegistry, MixinRegistry};

    let mut world = World::new();
    init_scene_messages(&mut world);

    let mut registry = AttributeRegistry::default();
    registry.register_builtins();
    world.insert_resource(registry);
    world.insert_resource(MixinRegistry::default());
    world
}
