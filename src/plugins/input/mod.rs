//! Window input -> scene events.
//!
//! A primary mouse press produces two kinds of `Click`:
//! - one on every entity carrying `ClickListener` (removing the component is the unsubscribe);
//! - one on the nearest `Geometry` under the cursor, cast from the first scene camera.

use bevy::prelude::*;
use bevy::window::PrimaryWindow;

use crate::common::error::BehaviorResult;
use crate::plugins::scene::{self, Geometry, LoadContext, SceneCamera, SceneEvent, SceneEventKind, SceneSet};

#[derive(Component, Debug, Clone, Copy, Default)]
pub struct ClickListener;

pub fn plugin(app: &mut App) {
    scene::register_attribute(app, "click-listener", apply_click_listener);

    app.add_systems(Update, (emit_window_clicks, emit_cursor_clicks).in_set(SceneSet::Input));
}

fn apply_click_listener(entity: &mut EntityCommands, _: &mut LoadContext, _: &str) -> BehaviorResult<()> {
    entity.insert(ClickListener);
    Ok(())
}

/// Headless apps have no mouse input resource; nothing is emitted then.
pub fn emit_window_clicks(
    buttons: Option<Res<ButtonInput<MouseButton>>>,
    q: Query<Entity, With<ClickListener>>,
    mut events: MessageWriter<SceneEvent>,
) {
    let Some(buttons) = buttons else {
        return;
    };
    if !buttons.just_pressed(MouseButton::Left) {
        return;
    }

    let mut listeners: Vec<Entity> = q.iter().collect();
    listeners.sort();
    events.write_batch(listeners.into_iter().map(|e| SceneEvent::new(e, SceneEventKind::Click)));
}

/// Nearest shape the ray enters; ties go to the lower entity.
pub fn pick<'a>(
    ray: Ray3d,
    shapes: impl IntoIterator<Item = (Entity, &'a Geometry, &'a GlobalTransform)>,
) -> Option<Entity> {
    shapes
        .into_iter()
        .filter_map(|(e, geometry, world)| Some((geometry.ray_hit_distance(world, ray.origin, ray.direction)?, e)))
        .min_by(|a, b| a.0.total_cmp(&b.0).then(a.1.cmp(&b.1)))
        .map(|(_, e)| e)
}

/// Click whatever sits under the cursor. A no-op without a window, cursor or rendering camera.
pub fn emit_cursor_clicks(
    buttons: Option<Res<ButtonInput<MouseButton>>>,
    windows: Query<&Window, With<PrimaryWindow>>,
    q_cameras: Query<(Entity, &Camera, &GlobalTransform), With<SceneCamera>>,
    q_shapes: Query<(Entity, &Geometry, &GlobalTransform)>,
    mut events: MessageWriter<SceneEvent>,
) {
    let Some(buttons) = buttons else {
        return;
    };
    if !buttons.just_pressed(MouseButton::Left) {
        return;
    }

    let Ok(window) = windows.single() else {
        return;
    };
    let Some(cursor) = window.cursor_position() else {
        debug!("no cursor, nothing to pick");
        return;
    };
    let Some((_, camera, camera_tf)) = q_cameras.iter().min_by_key(|(e, ..)| *e) else {
        return;
    };
    let ray = match camera.viewport_to_world(camera_tf, cursor) {
        Ok(ray) => ray,
        Err(e) => {
            debug!("viewport_to_world failed: {e:?}");
            return;
        }
    };

    if let Some(hit) = pick(ray, &q_shapes) {
        events.write(SceneEvent::new(hit, SceneEventKind::Click));
    }
}
