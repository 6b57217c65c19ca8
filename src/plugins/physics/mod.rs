//! Physics wiring (avian3d).

use avian3d::prelude::*;
use bevy::prelude::*;

use crate::common::tunables::Tunables;

pub fn plugin(app: &mut App) {
    let gravity = app
        .world()
        .get_resource::<Tunables>()
        .map(Tunables::gravity)
        .unwrap_or(Vec3::new(0.0, -9.81, 0.0));

    app.add_plugins(PhysicsPlugins::default());
    app.insert_resource(Gravity(gravity));
}
