//! Projectiles: constant local-axis motion plus the collision probe.
//!
//! # Data flow
//! ```text
//!   Update
//!┌────────────────────────────────────────────────────────────────────────────┐
//!│  SceneSet::React   move_projectiles                                        │
//!│      - mutates: Transform (translation += rotation * Y * speed)            │
//!│                                                                            │
//!│  SceneSet::Settle  attach_probes                                           │
//!│      - reads: CollisionProbe.target selector                               │
//!│      - writes: ProbeTargets (once per probe)                               │
//!└────────────────────────────────────────────────────────────────────────────┘
//!                │
//!                v
//!   PostUpdate (after TransformSystems::Propagate)
//!┌────────────────────────────────────────────────────────────────────────────┐
//!│  probe_collisions                                                          │
//!│      - reads: Geometry + GlobalTransform of probes and targets, Children   │
//!│      - writes: SceneEvent { target: hit, kind: ColliderHit { source } }    │
//!│      - dedupe: per probe per frame (Local<HashSet>), none across frames    │
//!└────────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Consumers react to `ColliderHit` like any other scene event; the probe itself never
//! changes the struck entity.

pub mod collision;
pub mod components;
pub mod motion;

use bevy::prelude::*;

use crate::common::error::{BehaviorError, BehaviorResult};
use crate::common::state::SceneState;
use crate::plugins::scene::attributes::{parse_f32, parse_props, prop_or_bare};
use crate::plugins::scene::{self, LoadContext, SceneSet, Selector};

pub use components::{CollisionProbe, ProbeTargets, Projectile};

pub fn plugin(app: &mut App) {
    scene::register_attribute(app, "projectile", apply_projectile);
    scene::register_attribute(app, "collider", apply_collider);

    app.add_systems(
        Update,
        motion::move_projectiles
            .in_set(SceneSet::React)
            .run_if(in_state(SceneState::Running)),
    )
    .add_systems(Update, collision::attach_probes.in_set(SceneSet::Settle));

    app.add_systems(
        PostUpdate,
        collision::probe_collisions
            .after(TransformSystems::Propagate)
            .run_if(in_state(SceneState::Running)),
    );
}

fn apply_projectile(entity: &mut EntityCommands, _: &mut LoadContext, value: &str) -> BehaviorResult<()> {
    let mut projectile = Projectile::default();
    if let Some(speed) = prop_or_bare("projectile", value, "speed")? {
        projectile.speed = parse_f32("projectile", speed)?;
    }
    entity.insert(projectile);
    Ok(())
}

fn apply_collider(entity: &mut EntityCommands, _: &mut LoadContext, value: &str) -> BehaviorResult<()> {
    let (target, near, far) = if value.contains(':') {
        let mut target = "";
        let mut near = None;
        let mut far = None;
        for (k, v) in parse_props("collider", value)? {
            match k {
                "target" => target = v,
                "near" => near = Some(parse_f32("collider", v)?),
                "far" => far = Some(parse_f32("collider", v)?),
                _ => {}
            }
        }
        (target, near, far)
    } else {
        (value.trim(), None, None)
    };

    if target.is_empty() {
        return Err(BehaviorError::invalid_attribute("collider", "missing target selector"));
    }

    let mut probe = CollisionProbe::new(Selector::parse(target)?);
    if let Some(near) = near {
        probe.near = near;
    }
    if let Some(far) = far {
        probe.far = far;
    }
    entity.insert(probe);
    Ok(())
}
