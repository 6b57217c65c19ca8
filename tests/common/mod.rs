//! Integration test harness.
//!
//! Keep integration tests headless:
//! - `MinimalPlugins` provides core ECS runtime.
//! - we then call `scene_behaviors::game::configure_headless` to install the behaviors.

#![allow(dead_code)]

use bevy::asset::AssetPlugin;
use bevy::ecs::message::Messages;
use bevy::prelude::*;
use bevy::scene::ScenePlugin;
use bevy::state::app::StatesPlugin;
use scene_behaviors::plugins::scene::SceneEvent;

pub fn app_headless() -> App {
    let mut app = App::new();

    // Physics expects transforms, meshes and scenes to exist.
    app.add_plugins((
        MinimalPlugins,
        StatesPlugin,
        AssetPlugin::default(),
        ScenePlugin,
        TransformPlugin,
    ));
    app.init_asset::<Mesh>();

    scene_behaviors::game::configure_headless(&mut app);
    app
}

/// Headless app plus the demo scene.
pub fn app_with_demo_scene() -> App {
    let mut app = app_headless();
    scene_behaviors::plugins::world::plugin(&mut app);
    app
}

/// Scene events written during the last update.
pub fn last_frame_events(app: &App) -> Vec<SceneEvent> {
    app.world()
        .resource::<Messages<SceneEvent>>()
        .iter_current_update_messages()
        .cloned()
        .collect()
}
