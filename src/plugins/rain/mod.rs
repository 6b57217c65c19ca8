//! Rain of entities: periodically drop entities from the sky and recycle the fallen ones.
//!
//! ```text
//!   RainPhase:  Idle --attach--> Spawning --spawned >= max_count--> Capped (terminal)
//!
//!   every `interval`   (EntityRain entity)  spawn one drop, or cap
//!   every `lifetime`   (each drop)          y <= recycle height ? reset : no-op
//! ```
//!
//! The cap counts every drop ever spawned, not the live ones: once capped the rain never
//! resumes, even if drops are despawned later.
//!
//! Each drop owns its recycle timer as a component, so the timer dies with the drop. When the
//! rain itself is removed, its drops lose their timers too.

use std::time::Duration;

use avian3d::prelude::LinearVelocity;
use bevy::prelude::*;

use crate::common::error::{BehaviorError, BehaviorResult};
use crate::common::rng::SceneRng;
use crate::common::state::SceneState;
use crate::common::tunables::Tunables;
use crate::plugins::scene::attributes::{parse_f32, parse_props};
use crate::plugins::scene::{self, Attribute, Declared, LoadContext, SceneSet, TagName};

/// Shortest accepted period; zero-length timers would fire on every frame without bound.
const MIN_PERIOD: Duration = Duration::from_millis(1);

#[derive(Component, Debug, Clone, PartialEq)]
#[require(RainState)]
pub struct EntityRain {
    pub tag: String,
    /// `"name|value"` attribute entries declared on every drop.
    pub components: Vec<String>,
    pub max_count: usize,
    pub interval: Duration,
    pub lifetime: Duration,
}

impl Default for EntityRain {
    fn default() -> Self {
        Self {
            tag: "box".into(),
            components: vec![
                "dynamic-body".into(),
                "force-pushable".into(),
                "color|#39BB82".into(),
            ],
            max_count: 10,
            interval: Duration::from_millis(1000),
            lifetime: Duration::from_millis(10_000),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum RainPhase {
    #[default]
    Idle,
    Spawning,
    Capped,
}

#[derive(Component, Debug, Default)]
pub struct RainState {
    pub phase: RainPhase,
    timer: Option<Timer>,
    pub spawned: Vec<Entity>,
}

/// Marks a drop and the rain it came from.
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq)]
pub struct RainDrop {
    pub source: Entity,
}

/// Per-drop recycle check timer.
#[derive(Component, Debug, Deref, DerefMut)]
pub struct Recycler(pub Timer);

pub fn plugin(app: &mut App) {
    scene::register_attribute(app, "rain-of-entities", apply_rain);

    app.add_systems(
        Update,
        (rain_spawn, recycle_fallen, cancel_orphaned_recyclers)
            .in_set(SceneSet::React)
            .run_if(in_state(SceneState::Running)),
    );
}

fn parse_millis(value: &str) -> BehaviorResult<Duration> {
    let ms = parse_f32("rain-of-entities", value)?;
    if !(ms >= 0.0 && ms.is_finite()) {
        return Err(BehaviorError::invalid_attribute("rain-of-entities", format!("bad duration `{value}`")));
    }
    Ok(Duration::from_secs_f32(ms / 1000.0))
}

fn apply_rain(entity: &mut EntityCommands, _: &mut LoadContext, value: &str) -> BehaviorResult<()> {
    let mut rain = EntityRain::default();
    for (key, v) in parse_props("rain-of-entities", value)? {
        match key {
            "tagName" => rain.tag = v.to_owned(),
            "components" => {
                rain.components = v
                    .split(',')
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .map(str::to_owned)
                    .collect();
            }
            "maxCount" => {
                rain.max_count = v.parse().map_err(|e: std::num::ParseIntError| {
                    BehaviorError::invalid_attribute("rain-of-entities", e.to_string())
                })?;
            }
            "interval" => rain.interval = parse_millis(v)?,
            "lifetime" => rain.lifetime = parse_millis(v)?,
            _ => {}
        }
    }
    entity.insert(rain);
    Ok(())
}

/// Random drop point: X/Z in `[-half, half]`, Y at the drop height.
pub fn drop_point(rng: &mut SceneRng, tunables: &Tunables) -> Vec3 {
    let half = tunables.drop_half_extent;
    Vec3::new(rng.symmetric(half), tunables.drop_height, rng.symmetric(half))
}

pub fn rain_spawn(
    mut commands: Commands,
    time: Res<Time>,
    tunables: Res<Tunables>,
    mut rng: ResMut<SceneRng>,
    mut q: Query<(Entity, &EntityRain, &mut RainState)>,
) {
    for (e, rain, mut state) in &mut q {
        let state = &mut *state;
        match state.phase {
            RainPhase::Capped => continue,
            RainPhase::Idle => {
                let period = rain.interval.max(MIN_PERIOD);
                state.timer = Some(Timer::new(period, TimerMode::Repeating));
                state.phase = RainPhase::Spawning;
                continue;
            }
            RainPhase::Spawning => {}
        }

        let Some(timer) = state.timer.as_mut() else {
            continue;
        };
        timer.tick(time.delta());

        for _ in 0..timer.times_finished_this_tick() {
            if state.spawned.len() >= rain.max_count {
                state.timer = None;
                state.phase = RainPhase::Capped;
                debug!("{e}: rain capped at {} entities", state.spawned.len());
                break;
            }

            let declared = Declared(rain.components.iter().map(|s| Attribute::parse_entry(s)).collect());
            let drop = commands
                .spawn((
                    Name::new("RainDrop"),
                    TagName(rain.tag.clone()),
                    declared,
                    Transform::from_translation(drop_point(&mut rng, &tunables)),
                    Visibility::default(),
                    RainDrop { source: e },
                    Recycler(Timer::new(rain.lifetime.max(MIN_PERIOD), TimerMode::Repeating)),
                ))
                .id();
            state.spawned.push(drop);
        }
    }
}

/// Reset drops that have fallen to the recycle height.
pub fn recycle_fallen(
    time: Res<Time>,
    tunables: Res<Tunables>,
    mut rng: ResMut<SceneRng>,
    mut q: Query<(&mut Recycler, &mut Transform, Option<&mut LinearVelocity>)>,
) {
    for (mut recycler, mut tf, vel) in &mut q {
        recycler.tick(time.delta());
        if !recycler.just_finished() {
            continue;
        }
        if tf.translation.y > tunables.recycle_height {
            continue;
        }

        tf.translation = drop_point(&mut rng, &tunables);
        if let Some(mut vel) = vel {
            vel.0 = Vec3::ZERO;
        }
    }
}

/// Stop recycling drops whose rain has been removed or despawned.
pub fn cancel_orphaned_recyclers(
    mut commands: Commands,
    mut removed: RemovedComponents<EntityRain>,
    q: Query<(Entity, &RainDrop), With<Recycler>>,
) {
    let gone: Vec<Entity> = removed.read().collect();
    if gone.is_empty() {
        return;
    }

    for (drop, origin) in &q {
        if gone.contains(&origin.source) {
            commands.entity(drop).remove::<Recycler>();
        }
    }
}
