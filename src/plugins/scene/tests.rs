use avian3d::prelude::*;
use bevy::prelude::*;

use crate::common::error::BehaviorError;
use crate::common::test_utils::{read_faults, read_scene_events, run_system_once, scene_world};

use super::attributes::{parse_props, parse_vec3, prop_or_bare};
use super::loader::load_declared_entities;
use super::selector::NodeView;
use super::*;

// -----------------------------------------------------------------------------
// Selectors
// -----------------------------------------------------------------------------

fn node<'a>(id: Option<&'a ElementId>, classes: Option<&'a Classes>, tag: Option<&'a str>, declared: Option<&'a Declared>) -> NodeView<'a> {
    NodeView { id, classes, tag, declared }
}

#[test]
fn selector_matches_id_class_tag_and_attributes() {
    let id = ElementId("boss".into());
    let classes = Classes::parse("enemy big");
    let declared = Declared::from_pairs([("force-float-target", ""), ("kind", "red")]);
    let view = node(Some(&id), Some(&classes), Some("box"), Some(&declared));

    for hit in ["#boss", ".enemy", ".enemy.big", "box", "box#boss.big", "[force-float-target]", "[kind=red]", "[kind='red']", "sphere, .big"] {
        assert!(Selector::parse(hit).unwrap().matches(&view), "{hit} should match");
    }
    for miss in ["#other", ".small", "sphere", "[missing]", "[kind=blue]", "box.small"] {
        assert!(!Selector::parse(miss).unwrap().matches(&view), "{miss} should not match");
    }
}

#[test]
fn selector_falls_back_to_declared_id_and_class() {
    let declared = Declared::from_pairs([("id", "camera"), ("class", "enemy  target")]);
    let view = node(None, None, None, Some(&declared));

    assert!(Selector::parse("#camera").unwrap().matches(&view));
    assert!(Selector::parse(".target").unwrap().matches(&view));
    assert!(!Selector::parse(".camera").unwrap().matches(&view));
}

#[test]
fn selector_rejects_combinators_and_garbage() {
    for bad in ["", ".a .b", "a > b", "#", "[", "[x", "[x=", "[x=1", ".a, [x=1", ".a,", "a!"] {
        let err = Selector::parse(bad).unwrap_err();
        assert!(matches!(err, BehaviorError::InvalidSelector { .. }), "{bad}: {err:?}");
    }
    assert_eq!(
        Selector::parse("[x=1").unwrap_err(),
        BehaviorError::InvalidSelector {
            selector: "[x=1".into(),
            reason: "unterminated attribute selector".into(),
        }
    );
    assert!(Selector::parse("[x=1]").is_ok());
}

#[test]
fn selector_displays_its_source() {
    assert_eq!(Selector::parse(" .enemy, #boss ").unwrap().to_string(), ".enemy, #boss");
}

#[test]
fn scene_query_orders_by_entity_and_finds_ids() {
    let mut world = World::new();
    let a = world.spawn(Classes::parse("enemy")).id();
    let _ = world.spawn(Classes::parse("friend")).id();
    let c = world.spawn((Classes::parse("enemy"), ElementId("last".into()))).id();

    let (all, first, by_id) = run_system_once(&mut world, |scene: SceneQuery| {
        let selector = Selector::parse(".enemy").unwrap();
        (scene.select_all(&selector), scene.select_first(&selector), scene.by_id("last"))
    });

    assert_eq!(all, vec![a, c]);
    assert_eq!(first, Some(a));
    assert_eq!(by_id, Some(c));
}

// -----------------------------------------------------------------------------
// Attribute values
// -----------------------------------------------------------------------------

#[test]
fn bundle_entries_split_on_the_first_bar() {
    assert_eq!(Attribute::parse_entry("color|#39BB82"), Attribute::new("color", "#39BB82"));
    assert_eq!(Attribute::parse_entry("dynamic-body"), Attribute::new("dynamic-body", ""));
    assert_eq!(Attribute::parse_entry(" a | b|c "), Attribute::new("a", "b|c"));
}

#[test]
fn property_lists_and_vectors() {
    assert_eq!(
        parse_props("x", "speed: -0.4;  target: .enemy ;").unwrap(),
        vec![("speed", "-0.4"), ("target", ".enemy")]
    );
    assert!(parse_props("x", "speed -0.4").is_err());

    assert_eq!(prop_or_bare("x", "2.5", "speed").unwrap(), Some("2.5"));
    assert_eq!(prop_or_bare("x", "speed: 3", "speed").unwrap(), Some("3"));
    assert_eq!(prop_or_bare("x", "other: 3", "speed").unwrap(), None);

    assert_eq!(parse_vec3("position", " 1  2 -3 ").unwrap(), Vec3::new(1.0, 2.0, -3.0));
    assert!(matches!(
        parse_vec3("position", "1 2"),
        Err(BehaviorError::InvalidAttribute { ref name, .. }) if name == "position"
    ));
}

#[test]
fn declared_lookup_prefers_the_latest_entry() {
    let mut declared = Declared::from_pairs([("a", "1")]);
    declared.push("a", "2");
    assert_eq!(declared.get("a"), Some("2"));
    assert!(declared.has("a"));
    assert!(!declared.has("b"));
}

// -----------------------------------------------------------------------------
// Mixins
// -----------------------------------------------------------------------------

#[test]
fn mixins_apply_in_order_and_own_attributes_win() {
    let mut mixins = MixinRegistry::default();
    mixins.define("base", [("color", "#000000"), ("rotation", "0 0 0")]);
    mixins.define("red", [("color", "#ff0000")]);

    let declared = Declared::from_pairs([("rotation", "0 90 0"), ("mixin", "base red"), ("class", "x")]);
    let (attrs, errors) = mixins.resolve(&declared.0);

    assert!(errors.is_empty());
    assert_eq!(
        attrs,
        vec![
            Attribute::new("color", "#ff0000"),
            Attribute::new("rotation", "0 90 0"),
            Attribute::new("class", "x"),
        ]
    );
}

#[test]
fn unknown_mixin_is_an_error_but_the_rest_resolves() {
    let mixins = MixinRegistry::default();
    let declared = Declared::from_pairs([("mixin", "ghost"), ("class", "x")]);

    let (attrs, errors) = mixins.resolve(&declared.0);

    assert_eq!(attrs, vec![Attribute::new("class", "x")]);
    assert_eq!(errors, vec![BehaviorError::UnknownMixin("ghost".into())]);
}

// -----------------------------------------------------------------------------
// Loader
// -----------------------------------------------------------------------------

#[test]
fn loader_builds_components_once_and_announces_it() {
    let mut world = scene_world();
    world.resource_mut::<MixinRegistry>().define("crate", [("dynamic-body", ""), ("color", "#ff0000")]);

    let e = world
        .spawn((
            TagName("box".into()),
            Declared::from_pairs([
                ("mixin", "crate"),
                ("position", "1 2 3"),
                ("rotation", "0 90 0"),
                ("scale", "2 2 2"),
                ("id", "crate-1"),
                ("class", "pushable heavy"),
                ("force-float-target", ""),
            ]),
        ))
        .id();

    run_system_once(&mut world, load_declared_entities);
    run_system_once(&mut world, load_declared_entities);

    let entity = world.entity(e);
    let tf = entity.get::<Transform>().unwrap();
    assert_eq!(tf.translation, Vec3::new(1.0, 2.0, 3.0));
    assert_eq!(tf.scale, Vec3::splat(2.0));
    assert!(tf.rotation.abs_diff_eq(Quat::from_rotation_y(90f32.to_radians()), 1e-6));
    assert_eq!(entity.get::<EulerRotation>(), Some(&EulerRotation(Vec3::new(0.0, 90.0, 0.0))));
    assert_eq!(entity.get::<Geometry>(), Some(&Geometry::default()));
    assert_eq!(entity.get::<RigidBody>(), Some(&RigidBody::Dynamic));
    assert!(entity.get::<Collider>().is_some());
    assert_eq!(entity.get::<ElementId>(), Some(&ElementId("crate-1".into())));
    assert!(entity.get::<Classes>().unwrap().contains("heavy"));
    assert_eq!(entity.get::<Tint>(), Some(&Tint(Color::srgb(1.0, 0.0, 0.0))));
    assert!(entity.contains::<Loaded>());
    assert!(entity.get::<Declared>().unwrap().has("force-float-target"));

    let loaded: Vec<_> = read_scene_events(&mut world)
        .into_iter()
        .filter(|ev| ev.kind == SceneEventKind::Loaded)
        .collect();
    assert_eq!(loaded, vec![SceneEvent::new(e, SceneEventKind::Loaded)]);
    assert!(read_faults(&mut world).is_empty());
}

#[test]
fn loader_reports_bad_values_and_keeps_going() {
    let mut world = scene_world();
    let e = world
        .spawn(Declared::from_pairs([("position", "nope"), ("class", "ok"), ("geometry", "primitive: cone")]))
        .id();

    run_system_once(&mut world, load_declared_entities);

    assert!(world.entity(e).contains::<Loaded>());
    assert!(world.get::<Classes>(e).unwrap().contains("ok"));
    assert_eq!(world.get::<Transform>(e).unwrap().translation, Vec3::ZERO);
    assert!(world.get::<Geometry>(e).is_none());

    let faults = read_faults(&mut world);
    assert_eq!(faults.len(), 2);
    assert!(faults.iter().all(|f| f.entity == Some(e)));
    assert!(faults.iter().all(|f| matches!(f.error, BehaviorError::InvalidAttribute { .. })));
}

#[test]
fn plain_entity_tag_has_no_geometry() {
    let mut world = scene_world();
    let plain = world.spawn((TagName("entity".into()), Declared::default())).id();
    let sphere = world.spawn((TagName("sphere".into()), Declared::default())).id();

    run_system_once(&mut world, load_declared_entities);

    assert!(world.get::<Geometry>(plain).is_none());
    assert_eq!(world.get::<Geometry>(sphere), Some(&Geometry::Sphere { radius: 1.0 }));
}

// -----------------------------------------------------------------------------
// Geometry
// -----------------------------------------------------------------------------

#[test]
fn geometry_parse_keeps_unset_dimensions() {
    assert_eq!(
        Geometry::parse("primitive: cylinder; height: 0.5").unwrap(),
        Geometry::Cylinder { radius: 1.0, height: 0.5 }
    );
    assert_eq!(Geometry::parse("width: 2").unwrap(), Geometry::Box { width: 2.0, height: 1.0, depth: 1.0 });
    assert!(Geometry::parse("primitive: sphere; width: 2").is_err());
    assert!(Geometry::parse("primitive: box; depth: -1").is_err());
}

#[test]
fn first_and_last_vertices_are_the_end_caps() {
    for geometry in [
        Geometry::Box { width: 2.0, height: 4.0, depth: 1.0 },
        Geometry::Sphere { radius: 0.5 },
        Geometry::Cylinder { radius: 0.1, height: 3.0 },
    ] {
        let vertices = geometry.vertices();
        let (bottom, top) = geometry.end_caps();
        assert_eq!(vertices.first(), Some(&bottom));
        assert_eq!(vertices.last(), Some(&top));
        assert_eq!(top - bottom, Vec3::Y * geometry.half_extents().y * 2.0);
    }
}

#[test]
fn ray_hits_respect_rotation_and_scale() {
    let geometry = Geometry::Box { width: 1.0, height: 4.0, depth: 1.0 };
    // Lying along X and stretched to 8 long.
    let world = GlobalTransform::from(
        Transform::from_xyz(10.0, 0.0, 0.0)
            .with_rotation(Quat::from_rotation_z(90f32.to_radians()))
            .with_scale(Vec3::new(1.0, 2.0, 1.0)),
    );

    let d = geometry.ray_hit_distance(&world, Vec3::ZERO, Dir3::X).unwrap();
    assert!((d - 6.0).abs() < 1e-4, "{d}");

    assert!(geometry.ray_hit_distance(&world, Vec3::new(0.0, 2.0, 0.0), Dir3::X).is_none());
    assert!(geometry.ray_hit_distance(&world, Vec3::ZERO, Dir3::NEG_X).is_none());
}

#[test]
fn round_shapes_are_missed_past_their_bounding_corners() {
    let at_origin = GlobalTransform::IDENTITY;

    let sphere = Geometry::Sphere { radius: 1.0 };
    // Inside the bounding cube, outside the ball.
    assert!(sphere.ray_hit_distance(&at_origin, Vec3::new(-5.0, 0.9, 0.9), Dir3::X).is_none());
    let d = sphere.ray_hit_distance(&at_origin, Vec3::new(-5.0, 0.0, 0.0), Dir3::X).unwrap();
    assert!((d - 4.0).abs() < 1e-3, "{d}");

    let cylinder = Geometry::Cylinder { radius: 1.0, height: 2.0 };
    assert!(cylinder.ray_hit_distance(&at_origin, Vec3::new(0.9, -5.0, 0.9), Dir3::Y).is_none());
    let d = cylinder.ray_hit_distance(&at_origin, Vec3::new(0.5, -5.0, 0.5), Dir3::Y).unwrap();
    assert!((d - 4.0).abs() < 1e-3, "{d}");
}

// -----------------------------------------------------------------------------
// Rotation
// -----------------------------------------------------------------------------

#[test]
fn euler_rotation_is_yxz_degrees() {
    let q = EulerRotation(Vec3::new(90.0, 90.0, 0.0)).to_quat();
    let expected = Quat::from_rotation_y(90f32.to_radians()) * Quat::from_rotation_x(90f32.to_radians());
    assert!(q.abs_diff_eq(expected, 1e-6));
}

#[test]
fn euler_changes_sync_to_transform() {
    let mut world = World::new();
    let e = world.spawn((EulerRotation(Vec3::new(0.0, 180.0, 0.0)), Transform::default())).id();

    run_system_once(&mut world, sync_euler_rotation);

    let rotation = world.get::<Transform>(e).unwrap().rotation;
    assert!(rotation.abs_diff_eq(Quat::from_rotation_y(std::f32::consts::PI), 1e-6));
}

#[test]
fn event_names() {
    assert_eq!(SceneEventKind::Click.name(), "click");
    assert_eq!(SceneEventKind::AnimationEnd.name(), "animationend");
    assert_eq!(SceneEventKind::Custom("fire".into()).name(), "fire");
}
