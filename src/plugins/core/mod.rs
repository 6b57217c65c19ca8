//! Core plugin: shared resources and global settings.

use bevy::prelude::*;

use crate::common::rng::SceneRng;
use crate::common::tunables::Tunables;

pub fn plugin(app: &mut App) {
    // Keep tunables loaded by the composition root; defaults otherwise.
    let tunables = app
        .world_mut()
        .get_resource_or_insert_with(Tunables::default)
        .clone();

    app.insert_resource(ClearColor(tunables.clear_color()));
    app.insert_resource(SceneRng::new(tunables.seed));
}
