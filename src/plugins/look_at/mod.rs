//! Look-at tracking.
//!
//! ```text
//!   LookAt value   ""        -> Unconfigured (no updates)
//!                  "x y z"   -> Static: face the point once
//!                  selector  -> PendingResolve(target) -> Tracking(target): face it every frame
//!
//!   any change of the LookAt value restarts from Unconfigured
//! ```
//!
//! Orientation follows the engine convention: the entity's forward (-Z) axis points at the
//! target, with +Y kept up. Targets are world positions; children convert them into their
//! parent's space first.
//!
//! Tracking runs in `PostUpdate` before transform propagation and reads the target's
//! `GlobalTransform` from the previous propagation.

use std::fmt;

use bevy::prelude::*;

use crate::common::error::{BehaviorError, BehaviorResult};
use crate::common::state::SceneState;
use crate::plugins::scene::attributes::parse_vec3;
use crate::plugins::scene::{self, report, BehaviorFault, Declared, LoadContext, Loaded, SceneQuery, SceneSet, Selector};

/// What a `LookAt` points at.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum LookAtTarget {
    #[default]
    None,
    Point(Vec3),
    Selector(String),
}

impl LookAtTarget {
    /// Empty -> `None`, three numbers -> `Point`, anything else -> `Selector`.
    pub fn parse(value: &str) -> Self {
        let value = value.trim();
        if value.is_empty() {
            return Self::None;
        }
        match parse_vec3("look-at", value) {
            Ok(point) => Self::Point(point),
            Err(_) => Self::Selector(value.to_owned()),
        }
    }
}

impl fmt::Display for LookAtTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::None => Ok(()),
            Self::Point(p) => write!(f, "{} {} {}", p.x, p.y, p.z),
            Self::Selector(s) => f.write_str(s),
        }
    }
}

#[derive(Component, Debug, Clone, Default, PartialEq)]
#[require(LookAtState)]
pub struct LookAt(pub LookAtTarget);

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LookPhase {
    #[default]
    Unconfigured,
    Static,
    PendingResolve(Entity),
    Tracking(Entity),
}

#[derive(Component, Debug, Clone, Default, PartialEq)]
pub struct LookAtState {
    /// Value the current phase was configured from.
    applied: Option<LookAtTarget>,
    pub phase: LookPhase,
}

pub fn plugin(app: &mut App) {
    scene::register_attribute(app, "look-at", apply_look_at);

    app.add_systems(
        Update,
        (reset_removed_look_at, configure_look_at)
            .chain()
            .in_set(SceneSet::Settle)
            .after(scene::sync_euler_rotation),
    )
    .add_systems(
        PostUpdate,
        track_look_at
            .before(TransformSystems::Propagate)
            .run_if(in_state(SceneState::Running)),
    );
}

fn apply_look_at(entity: &mut EntityCommands, _: &mut LoadContext, value: &str) -> BehaviorResult<()> {
    entity.insert(LookAt(LookAtTarget::parse(value)));
    Ok(())
}

/// Turn `tf` so its forward axis points at `world_target`.
fn face(tf: &mut Transform, parent: Option<&GlobalTransform>, world_target: Vec3) {
    let target = parent.map_or(world_target, |p| p.affine().inverse().transform_point3(world_target));
    if target.distance_squared(tf.translation) <= f32::EPSILON {
        return;
    }
    tf.look_at(target, Vec3::Y);
}

/// A re-added `LookAt` must configure again, even with the same value.
pub fn reset_removed_look_at(mut removed: RemovedComponents<LookAt>, mut q: Query<&mut LookAtState>) {
    for e in removed.read() {
        if let Ok(mut state) = q.get_mut(e) {
            *state = LookAtState::default();
        }
    }
}

pub fn configure_look_at(
    scene: SceneQuery,
    mut faults: MessageWriter<BehaviorFault>,
    mut q: Query<(Entity, &LookAt, &mut LookAtState, &mut Transform, Option<&ChildOf>)>,
    q_globals: Query<&GlobalTransform>,
    q_loaded: Query<(), Or<(With<Loaded>, Without<Declared>)>>,
) {
    for (e, look, mut state, mut tf, child_of) in &mut q {
        if state.applied.as_ref() != Some(&look.0) {
            state.applied = Some(look.0.clone());
            state.phase = LookPhase::Unconfigured;

            match &look.0 {
                LookAtTarget::None => {}
                LookAtTarget::Point(point) => {
                    let parent = child_of.and_then(|c| q_globals.get(c.parent()).ok());
                    face(&mut tf, parent, *point);
                    state.phase = LookPhase::Static;
                }
                LookAtTarget::Selector(source) => {
                    let target = Selector::parse(source).and_then(|selector| {
                        scene
                            .select_first(&selector)
                            .ok_or_else(|| BehaviorError::UnresolvedSelector(source.clone()))
                    });
                    match target {
                        Ok(target) => state.phase = LookPhase::PendingResolve(target),
                        Err(err) => report(&mut faults, Some(e), err),
                    }
                }
            }
        }

        if let LookPhase::PendingResolve(target) = state.phase {
            if !scene.contains(target) {
                warn!("{e}: look-at target {target} disappeared before loading");
                state.phase = LookPhase::Unconfigured;
            } else if q_loaded.contains(target) {
                state.phase = LookPhase::Tracking(target);
            }
        }
    }
}

pub fn track_look_at(
    mut q: Query<(Entity, &mut LookAtState, &mut Transform, Option<&ChildOf>), With<LookAt>>,
    q_globals: Query<&GlobalTransform>,
) {
    for (e, mut state, mut tf, child_of) in &mut q {
        let LookPhase::Tracking(target) = state.phase else {
            continue;
        };
        let Ok(target_world) = q_globals.get(target) else {
            warn!("{e}: look-at target {target} is gone, tracking stopped");
            state.phase = LookPhase::Unconfigured;
            continue;
        };
        let parent = child_of.and_then(|c| q_globals.get(c.parent()).ok());
        face(&mut tf, parent, target_world.translation());
    }
}
