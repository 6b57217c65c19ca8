//! Collision probe: ray from the entity's own extent against a fixed target list.
//!
//! # Invariants
//! - `ProbeTargets` is filled exactly once per probe and never refreshed; targets created later
//!   are not tracked.
//! - The probe runs after transform propagation, so it reads this frame's `GlobalTransform`.
//! - Each intersected entity gets exactly one `ColliderHit` per frame, nearest first. A pair
//!   that keeps overlapping is reported every frame.

use bevy::platform::collections::HashSet;
use bevy::prelude::*;

use crate::plugins::scene::{Geometry, SceneEvent, SceneEventKind, SceneQuery};

use super::components::{CollisionProbe, ProbeTargets};

/// Resolve the target selector of newly attached probes.
pub fn attach_probes(scene: SceneQuery, mut q: Query<(Entity, &CollisionProbe, &mut ProbeTargets)>) {
    for (e, probe, mut targets) in &mut q {
        if targets.attached {
            continue;
        }
        targets.targets = scene.select_all(&probe.target);
        targets.attached = true;
        debug!("{e}: probing {} target(s) for `{}`", targets.targets.len(), probe.target);
    }
}

/// World-space ray origin and direction: bottom cap -> top cap.
pub fn probe_ray(geometry: &Geometry, world: &GlobalTransform) -> (Vec3, Vec3) {
    let (bottom, top) = geometry.end_caps();
    let bottom = world.transform_point(bottom);
    let top = world.transform_point(top);
    (bottom, top - bottom)
}

pub fn probe_collisions(
    q_probes: Query<(Entity, &CollisionProbe, &ProbeTargets, &Geometry, &GlobalTransform)>,
    q_shapes: Query<(&Geometry, &GlobalTransform)>,
    q_children: Query<&Children>,
    mut events: MessageWriter<SceneEvent>,
    mut seen: Local<HashSet<Entity>>,
    mut stack: Local<Vec<Entity>>,
    mut hits: Local<Vec<(f32, Entity)>>,
) {
    for (probe_e, probe, targets, geometry, world) in &q_probes {
        let (origin, direction) = probe_ray(geometry, world);
        let Ok(direction) = Dir3::new(direction) else {
            debug!("{probe_e}: degenerate probe extent, skipping");
            continue;
        };

        seen.clear();
        hits.clear();
        stack.clear();
        stack.extend(targets.targets.iter().rev().copied());

        while let Some(candidate) = stack.pop() {
            if candidate == probe_e || !seen.insert(candidate) {
                continue;
            }

            if let Ok(children) = q_children.get(candidate) {
                let children: &[Entity] = children;
                stack.extend(children.iter().rev().copied());
            }

            let Ok((shape, shape_world)) = q_shapes.get(candidate) else {
                continue;
            };
            let Some(distance) = shape.ray_hit_distance(shape_world, origin, direction) else {
                continue;
            };
            if distance >= probe.near && distance <= probe.far {
                hits.push((distance, candidate));
            }
        }

        hits.sort_by(|a, b| a.0.total_cmp(&b.0));
        for &(_, hit) in hits.iter() {
            events.write(SceneEvent::new(hit, SceneEventKind::ColliderHit { source: probe_e }));
        }
    }
}
