//! World plugin: the shooting-gallery demo scene.
//!
//! Everything is declared through attributes and mixins, the same way a scene file would be,
//! so the loader builds the components.
//!
//! ```text
//!   camera   click-listener + spawner(mixin: bullet)   -> bullets fly forward
//!   bullet   projectile + collider(.enemy)             -> ColliderHit on enemies
//!   enemy    look-at(#camera)                          -> despawned with the bullet on hit
//!   rain     boxes falling on the ground, pushable by click, float on Space
//! ```

use bevy::prelude::*;

use crate::common::state::SceneState;
use crate::plugins::href::NavigationRequest;
use crate::plugins::projectiles::Projectile;
use crate::plugins::scene::{Classes, Declared, MixinRegistry, SceneCamera, SceneEvent, SceneEventKind, SceneSet, TagName};

/// Projectiles further than this from the origin are dropped.
const PROJECTILE_RANGE: f32 = 100.0;

const ENEMY_POSITIONS: [Vec3; 3] = [
    Vec3::new(-3.0, 1.6, -12.0),
    Vec3::new(0.0, 1.6, -14.0),
    Vec3::new(3.0, 1.6, -12.0),
];

pub fn plugin(app: &mut App) {
    define_mixins(&mut app.world_mut().get_resource_or_init::<MixinRegistry>());

    app.add_systems(Startup, spawn_scene).add_systems(
        Update,
        (despawn_on_hit, despawn_out_of_range, log_navigation)
            .in_set(SceneSet::React)
            .run_if(in_state(SceneState::Running)),
    );
}

pub fn define_mixins(mixins: &mut MixinRegistry) {
    mixins.define(
        "bullet",
        [
            ("geometry", "primitive: cylinder; radius: 0.05; height: 0.6"),
            ("rotation", "-90 0 0"),
            ("color", "#F5D547"),
            ("projectile", "speed: 0.4"),
            ("collider", "target: .enemy; near: 0; far: 0.6"),
        ],
    );
    mixins.define(
        "enemy",
        [
            ("geometry", "primitive: sphere; radius: 0.5"),
            ("color", "#EF2D5E"),
            ("class", "enemy"),
            ("look-at", "#camera"),
        ],
    );
}

fn declare<'a>(tag: &str, attrs: impl IntoIterator<Item = (&'a str, &'a str)>) -> (TagName, Declared) {
    (TagName(tag.to_owned()), Declared::from_pairs(attrs))
}

pub fn spawn_scene(mut commands: Commands) {
    commands.spawn((
        Name::new("Camera"),
        SceneCamera,
        declare(
            "entity",
            [
                ("id", "camera"),
                ("position", "0 1.6 6"),
                ("click-listener", ""),
                ("spawner", "on: click; mixin: bullet"),
            ],
        ),
    ));

    commands.spawn((
        Name::new("Ground"),
        declare(
            "box",
            [
                ("id", "home"),
                ("geometry", "width: 30; height: 0.2; depth: 30"),
                ("position", "0 -0.1 0"),
                ("color", "#2B2D42"),
                ("static-body", ""),
            ],
        ),
    ));

    for (i, pos) in ENEMY_POSITIONS.iter().enumerate() {
        let position = format!("{} {} {}", pos.x, pos.y, pos.z);
        commands.spawn((
            Name::new(format!("Enemy{i}")),
            TagName("entity".into()),
            Declared::from_pairs([("mixin", "enemy"), ("position", position.as_str())]),
        ));
    }

    commands.spawn((
        Name::new("Rain"),
        declare(
            "entity",
            [(
                "rain-of-entities",
                "components: dynamic-body, force-pushable, force-float-target, color|#39BB82",
            )],
        ),
    ));

    commands.spawn((Name::new("Float"), declare("entity", [("force-float", "")])));

    commands.spawn((
        Name::new("Beacon"),
        declare(
            "cylinder",
            [
                ("geometry", "primitive: cylinder; radius: 0.2; height: 2"),
                ("position", "-6 1 -4"),
                ("color", "#8D99AE"),
                ("look-at", "0 1 0"),
            ],
        ),
    ));

    commands.spawn((
        Name::new("HomeLink"),
        declare(
            "sphere",
            [
                ("geometry", "primitive: sphere; radius: 0.3"),
                ("position", "6 1 -4"),
                ("color", "#4D9DE0"),
                ("href", "#home"),
            ],
        ),
    ));
}

/// Despawn both the struck enemy and the projectile.
pub fn despawn_on_hit(
    mut commands: Commands,
    mut events: MessageReader<SceneEvent>,
    q_enemies: Query<&Classes>,
    q_projectiles: Query<(), With<Projectile>>,
) {
    for ev in events.read() {
        let SceneEventKind::ColliderHit { source } = ev.kind else {
            continue;
        };
        if !q_enemies.get(ev.target).is_ok_and(|c| c.contains("enemy")) {
            continue;
        }

        info!("{source} hit {}", ev.target);
        if let Ok(mut enemy) = commands.get_entity(ev.target) {
            enemy.try_despawn();
        }
        if q_projectiles.contains(source) {
            if let Ok(mut projectile) = commands.get_entity(source) {
                projectile.try_despawn();
            }
        }
    }
}

pub fn despawn_out_of_range(mut commands: Commands, q: Query<(Entity, &Transform), With<Projectile>>) {
    for (e, tf) in &q {
        if tf.translation.length_squared() > PROJECTILE_RANGE * PROJECTILE_RANGE {
            commands.entity(e).despawn();
        }
    }
}

pub fn log_navigation(mut requests: MessageReader<NavigationRequest>) {
    for request in requests.read() {
        match request {
            NavigationRequest::Fragment(fragment) => info!("navigate to {fragment}"),
            NavigationRequest::Open { url, window } => info!("open {url} ({window:?})"),
        }
    }
}
