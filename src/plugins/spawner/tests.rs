use bevy::prelude::*;

use crate::common::error::BehaviorError;
use crate::common::test_utils::{read_faults, run_system_once, scene_world};
use crate::plugins::scene::loader::load_declared_entities;
use crate::plugins::scene::{
    EulerRotation, Geometry, Loaded, MixinRegistry, SceneEvent, SceneEventKind,
};

use super::*;

fn spawner_at(world: &mut World, pos: Vec3, rotation: Vec3, mixin: &str) -> Entity {
    world
        .spawn((
            Spawner { mixin: mixin.into(), ..default() },
            Transform::from_translation(pos),
            GlobalTransform::from_translation(pos),
            EulerRotation(rotation),
        ))
        .id()
}

fn run_spawn_pipeline(world: &mut World) {
    run_system_once(world, spawn_on_trigger);
    run_system_once(world, load_declared_entities);
    run_system_once(world, apply_inherited_rotation);
}

fn spawned(world: &mut World) -> Vec<Entity> {
    world
        .query_filtered::<Entity, With<TagName>>()
        .iter(world)
        .collect()
}

#[test]
fn spawned_entity_inherits_position_and_adds_rotation() {
    let mut world = scene_world();
    world.resource_mut::<MixinRegistry>().define(
        "enemy",
        [("rotation", "10 20 30"), ("geometry", "primitive: sphere; radius: 0.5")],
    );

    let trigger = spawner_at(&mut world, Vec3::new(1.0, 2.0, 3.0), Vec3::new(0.0, 90.0, 0.0), "enemy");
    world.write_message(SceneEvent::new(trigger, SceneEventKind::Click));

    run_spawn_pipeline(&mut world);

    let [e] = spawned(&mut world)[..] else { panic!("expected exactly one spawned entity") };
    let entity = world.entity(e);

    assert!(entity.contains::<Loaded>());
    assert!(!entity.contains::<InheritedRotation>());
    assert!(entity.get::<ChildOf>().is_none(), "spawned entities live at the scene root");
    assert_eq!(entity.get::<Transform>().unwrap().translation, Vec3::new(1.0, 2.0, 3.0));
    assert_eq!(entity.get::<EulerRotation>().unwrap().0, Vec3::new(10.0, 110.0, 30.0));
    assert_eq!(entity.get::<Geometry>(), Some(&Geometry::Sphere { radius: 0.5 }));

    let expected = EulerRotation(Vec3::new(10.0, 110.0, 30.0)).to_quat();
    assert!(entity.get::<Transform>().unwrap().rotation.abs_diff_eq(expected, 1e-5));
}

#[test]
fn rotation_without_mixin_rotation_is_the_spawner_rotation() {
    let mut world = scene_world();
    world.resource_mut::<MixinRegistry>().define("plain", [("color", "#ff0000")]);

    let trigger = spawner_at(&mut world, Vec3::ZERO, Vec3::new(0.0, 45.0, 0.0), "plain");
    world.write_message(SceneEvent::new(trigger, SceneEventKind::Click));

    run_spawn_pipeline(&mut world);

    let [e] = spawned(&mut world)[..] else { panic!("expected exactly one spawned entity") };
    assert_eq!(world.get::<EulerRotation>(e).unwrap().0, Vec3::new(0.0, 45.0, 0.0));
}

#[test]
fn other_events_do_not_spawn() {
    let mut world = scene_world();
    let trigger = spawner_at(&mut world, Vec3::ZERO, Vec3::ZERO, "");
    world.write_message(SceneEvent::new(trigger, SceneEventKind::Custom("fire".into())));

    run_spawn_pipeline(&mut world);

    assert!(spawned(&mut world).is_empty());
}

#[test]
fn one_entity_per_trigger_event() {
    let mut world = scene_world();
    let trigger = spawner_at(&mut world, Vec3::ZERO, Vec3::ZERO, "");
    let bystander = world.spawn(Transform::default()).id();

    world.write_message(SceneEvent::new(trigger, SceneEventKind::Click));
    world.write_message(SceneEvent::new(trigger, SceneEventKind::Click));
    world.write_message(SceneEvent::new(bystander, SceneEventKind::Click));

    run_spawn_pipeline(&mut world);

    assert_eq!(spawned(&mut world).len(), 2);
}

#[test]
fn unknown_mixin_still_spawns_but_reports() {
    let mut world = scene_world();
    let trigger = spawner_at(&mut world, Vec3::X, Vec3::ZERO, "ghost");
    world.write_message(SceneEvent::new(trigger, SceneEventKind::Click));

    run_spawn_pipeline(&mut world);

    let [e] = spawned(&mut world)[..] else { panic!("expected exactly one spawned entity") };
    assert!(world.entity(e).contains::<Loaded>());
    assert!(world.get::<Geometry>(e).is_none());

    let faults = read_faults(&mut world);
    assert_eq!(faults.len(), 1);
    assert_eq!(faults[0].entity, Some(e));
    assert_eq!(faults[0].error, BehaviorError::UnknownMixin("ghost".into()));
}

#[test]
fn custom_trigger_name() {
    let mut world = scene_world();
    let trigger = world
        .spawn((
            Spawner { on: "fire".into(), mixin: String::new() },
            GlobalTransform::default(),
        ))
        .id();
    world.write_message(SceneEvent::new(trigger, SceneEventKind::Custom("fire".into())));
    world.write_message(SceneEvent::new(trigger, SceneEventKind::Click));

    run_spawn_pipeline(&mut world);

    assert_eq!(spawned(&mut world).len(), 1);
}
