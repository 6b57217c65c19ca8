//! Meshes and materials for scene geometry (render-only).

use bevy::prelude::*;

use crate::plugins::scene::{Geometry, SceneSet, Tint};

const DEFAULT_COLOR: Color = Color::srgb(0.8, 0.8, 0.8);

pub fn plugin(app: &mut App) {
    app.add_systems(Update, attach_visuals.after(SceneSet::Settle))
        .add_systems(Update, sync_tint.after(attach_visuals));
}

fn attach_visuals(
    mut commands: Commands,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
    q: Query<(Entity, &Geometry, Option<&Tint>), Without<Mesh3d>>,
) {
    for (e, geometry, tint) in &q {
        let color = tint.map_or(DEFAULT_COLOR, |t| t.0);
        commands.entity(e).insert((
            Mesh3d(meshes.add(geometry.mesh())),
            MeshMaterial3d(materials.add(StandardMaterial {
                base_color: color,
                perceptual_roughness: 0.8,
                ..default()
            })),
        ));
    }
}

fn sync_tint(
    mut materials: ResMut<Assets<StandardMaterial>>,
    q: Query<(&Tint, &MeshMaterial3d<StandardMaterial>), Changed<Tint>>,
) {
    for (tint, material) in &q {
        if let Some(mut material) = materials.get_mut(&material.0) {
            material.base_color = tint.0;
        }
    }
}
