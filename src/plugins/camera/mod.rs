//! Camera plugin (render-only).
//!
//! Scene cameras are plain entities marked `SceneCamera`; this only gives them a renderer.

use bevy::prelude::*;

use crate::plugins::scene::{SceneCamera, SceneSet};

pub fn plugin(app: &mut App) {
    app.add_systems(Update, attach_camera.after(SceneSet::Settle));
}

fn attach_camera(mut commands: Commands, q: Query<Entity, (With<SceneCamera>, Without<Camera3d>)>) {
    for e in &q {
        commands.entity(e).insert(Camera3d::default());
    }
}
