//! Impulse behaviors: click-to-push and the scene-wide float toggle.
//!
//! ```text
//!   Click on ForcePushable  -> J = normalize(body - camera) * force at the centre of mass
//!   key release (ForceFloat)
//!       grounded -> save gravity, gravity = 0, lift every selector match
//!       floating -> gravity still 0 ? restore saved : report contention
//! ```

use avian3d::prelude::*;
use bevy::prelude::*;

use crate::common::error::{BehaviorError, BehaviorResult};
use crate::common::rng::SceneRng;
use crate::common::state::SceneState;
use crate::plugins::scene::attributes::{parse_f32, parse_props, prop_or_bare};
use crate::plugins::scene::{
    self, report, BehaviorFault, LoadContext, SceneCamera, SceneEvent, SceneEventKind, SceneQuery, SceneSet,
    Selector,
};

#[derive(Component, Debug, Clone, Copy, PartialEq)]
pub struct ForcePushable {
    pub force: f32,
}

impl Default for ForcePushable {
    fn default() -> Self {
        Self { force: 100.0 }
    }
}

#[derive(Component, Debug, Clone, PartialEq)]
#[require(FloatState)]
pub struct ForceFloat {
    pub force: f32,
    pub key: KeyCode,
    pub selector: Selector,
}

impl Default for ForceFloat {
    fn default() -> Self {
        Self {
            force: 1.0,
            key: KeyCode::Space,
            selector: Selector::attribute("force-float-target"),
        }
    }
}

#[derive(Component, Debug, Clone, Default, PartialEq)]
pub struct FloatState {
    pub floating: bool,
    /// Gravity saved when floating started.
    pub saved: Option<Vec3>,
}

pub fn plugin(app: &mut App) {
    scene::register_attribute(app, "force-pushable", apply_force_pushable);
    scene::register_attribute(app, "force-float", apply_force_float);

    app.add_systems(
        Update,
        (push_on_click, toggle_float)
            .in_set(SceneSet::React)
            .run_if(in_state(SceneState::Running)),
    );
}

fn apply_force_pushable(entity: &mut EntityCommands, _: &mut LoadContext, value: &str) -> BehaviorResult<()> {
    let mut pushable = ForcePushable::default();
    if let Some(force) = prop_or_bare("force-pushable", value, "force")? {
        pushable.force = parse_f32("force-pushable", force)?;
    }
    entity.insert(pushable);
    Ok(())
}

fn apply_force_float(entity: &mut EntityCommands, _: &mut LoadContext, value: &str) -> BehaviorResult<()> {
    let mut float = ForceFloat::default();
    for (key, v) in parse_props("force-float", value)? {
        match key {
            "force" => float.force = parse_f32("force-float", v)?,
            "keyCode" => float.key = parse_key(v)?,
            "selector" => float.selector = Selector::parse(v)?,
            _ => {}
        }
    }
    entity.insert(float);
    Ok(())
}

/// Accept either a legacy DOM key code (`32`) or a key name (`Space`, `KeyF`, `Digit1`).
pub fn parse_key(value: &str) -> BehaviorResult<KeyCode> {
    let value = value.trim();
    let key = match value.parse::<u32>() {
        Ok(code) => key_from_dom_code(code),
        Err(_) => key_from_name(value),
    };
    key.ok_or_else(|| BehaviorError::invalid_attribute("force-float", format!("unsupported key `{value}`")))
}

fn key_from_dom_code(code: u32) -> Option<KeyCode> {
    const LETTERS: [KeyCode; 26] = [
        KeyCode::KeyA, KeyCode::KeyB, KeyCode::KeyC, KeyCode::KeyD, KeyCode::KeyE, KeyCode::KeyF,
        KeyCode::KeyG, KeyCode::KeyH, KeyCode::KeyI, KeyCode::KeyJ, KeyCode::KeyK, KeyCode::KeyL,
        KeyCode::KeyM, KeyCode::KeyN, KeyCode::KeyO, KeyCode::KeyP, KeyCode::KeyQ, KeyCode::KeyR,
        KeyCode::KeyS, KeyCode::KeyT, KeyCode::KeyU, KeyCode::KeyV, KeyCode::KeyW, KeyCode::KeyX,
        KeyCode::KeyY, KeyCode::KeyZ,
    ];
    const DIGITS: [KeyCode; 10] = [
        KeyCode::Digit0, KeyCode::Digit1, KeyCode::Digit2, KeyCode::Digit3, KeyCode::Digit4,
        KeyCode::Digit5, KeyCode::Digit6, KeyCode::Digit7, KeyCode::Digit8, KeyCode::Digit9,
    ];

    Some(match code {
        8 => KeyCode::Backspace,
        9 => KeyCode::Tab,
        13 => KeyCode::Enter,
        16 => KeyCode::ShiftLeft,
        17 => KeyCode::ControlLeft,
        18 => KeyCode::AltLeft,
        27 => KeyCode::Escape,
        32 => KeyCode::Space,
        37 => KeyCode::ArrowLeft,
        38 => KeyCode::ArrowUp,
        39 => KeyCode::ArrowRight,
        40 => KeyCode::ArrowDown,
        48..=57 => DIGITS[(code - 48) as usize],
        65..=90 => LETTERS[(code - 65) as usize],
        _ => return None,
    })
}

fn key_from_name(name: &str) -> Option<KeyCode> {
    Some(match name {
        "Space" => KeyCode::Space,
        "Enter" => KeyCode::Enter,
        "Escape" => KeyCode::Escape,
        "Tab" => KeyCode::Tab,
        "ArrowLeft" => KeyCode::ArrowLeft,
        "ArrowUp" => KeyCode::ArrowUp,
        "ArrowRight" => KeyCode::ArrowRight,
        "ArrowDown" => KeyCode::ArrowDown,
        _ => {
            let rest = name.strip_prefix("Key").or_else(|| name.strip_prefix("Digit"))?;
            let mut chars = rest.chars();
            let (Some(c), None) = (chars.next(), chars.next()) else {
                return None;
            };
            let code = c.to_ascii_uppercase() as u32;
            let digit = name.starts_with("Digit");
            if digit != c.is_ascii_digit() {
                return None;
            }
            return key_from_dom_code(code);
        }
    })
}

/// First scene camera by entity order.
pub fn first_camera<'a>(
    cameras: impl IntoIterator<Item = (Entity, &'a GlobalTransform)>,
) -> Option<(Entity, &'a GlobalTransform)> {
    cameras.into_iter().min_by_key(|(e, _)| *e)
}

pub fn push_on_click(
    mut events: MessageReader<SceneEvent>,
    mut faults: MessageWriter<BehaviorFault>,
    q_cameras: Query<(Entity, &GlobalTransform), With<SceneCamera>>,
    mut q_bodies: Query<(&ForcePushable, &GlobalTransform, Forces)>,
) {
    for ev in events.read() {
        if ev.kind != SceneEventKind::Click {
            continue;
        }
        let Ok((pushable, body_tf, mut forces)) = q_bodies.get_mut(ev.target) else {
            continue;
        };
        let Some((_, cam_tf)) = first_camera(&q_cameras) else {
            report(&mut faults, Some(ev.target), BehaviorError::MissingPushReference);
            continue;
        };

        let Some(dir) = (body_tf.translation() - cam_tf.translation()).try_normalize() else {
            debug!("{}: body sits on the camera, no push direction", ev.target);
            continue;
        };
        forces.apply_linear_impulse(dir * pushable.force);
    }
}

pub fn toggle_float(
    keys: Option<Res<ButtonInput<KeyCode>>>,
    gravity: Option<ResMut<Gravity>>,
    mut rng: ResMut<SceneRng>,
    scene: SceneQuery,
    mut faults: MessageWriter<BehaviorFault>,
    mut q_floats: Query<(Entity, &ForceFloat, &mut FloatState)>,
    mut q_bodies: Query<Forces>,
) {
    let (Some(keys), Some(mut gravity)) = (keys, gravity) else {
        return;
    };

    for (e, float, mut state) in &mut q_floats {
        if !keys.just_released(float.key) {
            continue;
        }

        if state.floating {
            if gravity.0 == Vec3::ZERO {
                gravity.0 = state.saved.take().unwrap_or(gravity.0);
            } else {
                state.saved = None;
                report(&mut faults, Some(e), BehaviorError::GravityContended { observed: gravity.0 });
            }
            state.floating = false;
            continue;
        }

        state.saved = Some(gravity.0);
        gravity.0 = Vec3::ZERO;
        state.floating = true;

        let f = float.force;
        for target in scene.select_all(&float.selector) {
            let Ok(mut forces) = q_bodies.get_mut(target) else {
                continue;
            };
            let impulse = Vec3::new(
                0.25 * f * rng.unit(),
                1.0 * f * rng.unit() + 1.5,
                0.25 * f * rng.unit(),
            );
            forces.apply_linear_impulse(impulse);
        }
        debug!("{e}: floating `{}`", float.selector);
    }
}
