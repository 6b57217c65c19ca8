//! Composition root.
//!
//! Provides two public configuration functions:
//! - `configure_full`: DefaultPlugins (window/render), behaviors and the demo scene.
//! - `configure_headless`: behaviors only, for integration tests.

use bevy::prelude::*;
use bevy::window::WindowResolution;

use crate::common::state::SceneState;
use crate::common::tunables::Tunables;
use crate::plugins;

/// Optional tunables file, read from the working directory.
pub const TUNABLES_PATH: &str = "scene.toml";

pub fn run() {
    App::new().add_plugins(configure_full).run();
}

/// Full configuration for `cargo run`.
pub fn configure_full(app: &mut App) {
    app.add_plugins(DefaultPlugins.set(WindowPlugin {
        primary_window: Some(Window {
            title: "Scene Behaviors".into(),
            resolution: WindowResolution::new(1280, 720),
            ..default()
        }),
        ..default()
    }));

    app.insert_resource(Tunables::load_or_default(TUNABLES_PATH));
    configure_behaviors(app);
    plugins::register_render(app);
    plugins::world::plugin(app);
}

/// Headless configuration for integration tests.
///
/// Notes:
/// - Do NOT add DefaultPlugins.
/// - Do NOT add render-only plugins (meshes/camera/light).
pub fn configure_headless(app: &mut App) {
    configure_behaviors(app);
}

/// Configuration shared by both full and headless apps.
fn configure_behaviors(app: &mut App) {
    app.init_state::<SceneState>();
    plugins::register_gameplay(app);
}
