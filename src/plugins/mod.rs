//! Feature plugins.

use bevy::prelude::*;

pub mod core;
pub mod force;
pub mod href;
pub mod input;
pub mod look_at;
pub mod physics;
pub mod projectiles;
pub mod rain;
pub mod scene;
pub mod spawner;
pub mod world;

// Render-only
pub mod camera;
pub mod lighting;
pub mod visuals;

/// Register behavior plugins that work in headless tests.
pub fn register_gameplay(app: &mut App) {
    core::plugin(app);
    physics::plugin(app);
    scene::plugin(app);
    input::plugin(app);
    spawner::plugin(app);
    rain::plugin(app);
    projectiles::plugin(app);
    force::plugin(app);
    look_at::plugin(app);
    href::plugin(app);
}

/// Register render-only plugins (requires DefaultPlugins / render infra).
pub fn register_render(app: &mut App) {
    visuals::plugin(app);
    camera::plugin(app);
    lighting::plugin(app);
}
