//! Spawner: create one entity per trigger event.
//!
//! ```text
//!   SceneSet::React   trigger SceneEvent -> spawn root entity
//!                     (position = spawner world position, mixin declared,
//!                      InheritedRotation = spawner rotation)
//!   SceneSet::Load    loader applies the mixin, inserts Loaded
//!   SceneSet::Settle  EulerRotation += InheritedRotation, component removed
//! ```
//!
//! The spawned entity is a scene root, so it does not follow the spawner afterwards.

use bevy::prelude::*;

use crate::common::error::BehaviorResult;
use crate::plugins::scene::attributes::parse_props;
use crate::plugins::scene::{
    self, Declared, EulerRotation, LoadContext, Loaded, SceneEvent, SceneSet, TagName,
};

#[derive(Component, Debug, Clone, PartialEq, Eq)]
pub struct Spawner {
    /// Event name that triggers a spawn.
    pub on: String,
    /// Mixin(s) declared on each spawned entity.
    pub mixin: String,
}

impl Default for Spawner {
    fn default() -> Self {
        Self {
            on: "click".into(),
            mixin: String::new(),
        }
    }
}

/// Rotation (degrees) to add once the spawned entity has loaded.
#[derive(Component, Debug, Clone, Copy, PartialEq)]
pub struct InheritedRotation(pub Vec3);

pub fn plugin(app: &mut App) {
    scene::register_attribute(app, "spawner", apply_spawner);

    app.add_systems(Update, spawn_on_trigger.in_set(SceneSet::React))
        .add_systems(
            Update,
            apply_inherited_rotation
                .in_set(SceneSet::Settle)
                .before(scene::sync_euler_rotation),
        );
}

fn apply_spawner(entity: &mut EntityCommands, _: &mut LoadContext, value: &str) -> BehaviorResult<()> {
    let mut spawner = Spawner::default();
    for (key, v) in parse_props("spawner", value)? {
        match key {
            "on" => spawner.on = v.to_owned(),
            "mixin" => spawner.mixin = v.to_owned(),
            _ => {}
        }
    }
    entity.insert(spawner);
    Ok(())
}

pub fn spawn_on_trigger(
    mut commands: Commands,
    mut events: MessageReader<SceneEvent>,
    q: Query<(&Spawner, &GlobalTransform, Option<&EulerRotation>)>,
) {
    for ev in events.read() {
        let Ok((spawner, gt, rotation)) = q.get(ev.target) else {
            continue;
        };
        if ev.kind.name() != spawner.on {
            continue;
        }

        let pos = gt.translation();
        let mut declared = Declared::default();
        declared.push("position", format!("{} {} {}", pos.x, pos.y, pos.z));
        if !spawner.mixin.is_empty() {
            declared.push("mixin", spawner.mixin.clone());
        }

        let spawned = commands
            .spawn((
                Name::new("Spawned"),
                TagName("entity".into()),
                declared,
                Transform::from_translation(pos),
                Visibility::default(),
                InheritedRotation(rotation.copied().unwrap_or_default().0),
            ))
            .id();

        debug!("{} spawned {spawned} ({})", ev.target, spawner.mixin);
    }
}

/// Compose the spawner's rotation on top of whatever the mixin produced.
pub fn apply_inherited_rotation(
    mut commands: Commands,
    mut q: Query<(Entity, &InheritedRotation, Option<&EulerRotation>, &mut Transform), With<Loaded>>,
) {
    for (e, inherited, own, mut tf) in &mut q {
        let euler = EulerRotation(own.copied().unwrap_or_default().0 + inherited.0);
        tf.rotation = euler.to_quat();
        commands.entity(e).insert(euler).remove::<InheritedRotation>();
    }
}

#[cfg(test)]
mod tests;
