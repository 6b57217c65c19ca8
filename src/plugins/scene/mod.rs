//! Scene vocabulary shared by every behavior.
//!
//! The behaviors are configured the way a declarative scene is written: an entity carries a
//! list of `name="value"` attributes (`Declared`), optionally pulling in named bundles
//! (`mixin`). The loader turns those attributes into components once, marks the entity
//! `Loaded`, and announces it with a `SceneEvent`.
//!
//! ```text
//!   Update
//!   ┌──────────────────────────────────────────────────────────────────┐
//!   │ SceneSet::Input   raw input -> SceneEvent (click listeners, keys)│
//!   │ SceneSet::React   behaviors consume SceneEvents, spawn entities  │
//!   │ SceneSet::Load    Declared -> components, insert Loaded          │
//!   │ SceneSet::Settle  post-load fixups (inherited rotation, euler)   │
//!   └──────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Entities built directly from components (no `Declared`) count as loaded.

pub mod attributes;
pub mod geometry;
pub mod loader;
pub mod selector;

use bevy::prelude::*;

use crate::common::error::BehaviorError;

pub use attributes::{Attribute, AttributeApplier, AttributeRegistry, Declared, LoadContext};
pub use geometry::Geometry;
pub use loader::MixinRegistry;
pub use selector::{SceneQuery, Selector};

#[derive(SystemSet, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SceneSet {
    Input,
    React,
    Load,
    Settle,
}

// -----------------------------------------------------------------------------
// Components
// -----------------------------------------------------------------------------

/// Unique element id (`id` attribute, `#id` selectors).
#[derive(Component, Debug, Clone, PartialEq, Eq)]
pub struct ElementId(pub String);

/// `class` attribute, `.class` selectors.
#[derive(Component, Debug, Clone, Default, PartialEq, Eq)]
pub struct Classes(pub Vec<String>);

impl Classes {
    pub fn parse(value: &str) -> Self {
        Self(value.split_whitespace().map(str::to_owned).collect())
    }

    #[inline]
    pub fn contains(&self, class: &str) -> bool {
        self.0.iter().any(|c| c == class)
    }
}

/// Element tag the entity was created as (`box`, `sphere`, `entity`, ...).
#[derive(Component, Debug, Clone, PartialEq, Eq)]
pub struct TagName(pub String);

/// Rotation in degrees, applied to `Transform` in Y-X-Z order.
///
/// Kept separately from `Transform::rotation` so rotations compose additively.
#[derive(Component, Debug, Clone, Copy, Default, PartialEq)]
pub struct EulerRotation(pub Vec3);

impl EulerRotation {
    pub fn to_quat(self) -> Quat {
        let r = self.0;
        Quat::from_euler(
            EulerRot::YXZ,
            r.y.to_radians(),
            r.x.to_radians(),
            r.z.to_radians(),
        )
    }
}

/// Marker: declared attributes have been applied.
#[derive(Component, Debug, Clone, Copy)]
pub struct Loaded;

/// Marker for the scene's viewpoint. The first one found is "the camera".
#[derive(Component, Debug, Clone, Copy, Default)]
pub struct SceneCamera;

/// Flat surface colour (`color` attribute).
#[derive(Component, Debug, Clone, Copy, PartialEq)]
pub struct Tint(pub Color);

// -----------------------------------------------------------------------------
// Messages
// -----------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SceneEventKind {
    Click,
    Loaded,
    /// A collision probe's ray struck the target.
    ColliderHit { source: Entity },
    /// A link started its exit animation.
    Href,
    AnimationEnd,
    Custom(String),
}

impl SceneEventKind {
    pub fn name(&self) -> &str {
        match self {
            Self::Click => "click",
            Self::Loaded => "loaded",
            Self::ColliderHit { .. } => "collider-hit",
            Self::Href => "href",
            Self::AnimationEnd => "animationend",
            Self::Custom(name) => name,
        }
    }
}

/// An event dispatched to a single entity.
#[derive(Message, Debug, Clone, PartialEq)]
pub struct SceneEvent {
    pub target: Entity,
    pub kind: SceneEventKind,
}

impl SceneEvent {
    #[inline]
    pub fn new(target: Entity, kind: SceneEventKind) -> Self {
        Self { target, kind }
    }
}

/// A reported, non-fatal behavior failure.
#[derive(Message, Debug, Clone, PartialEq)]
pub struct BehaviorFault {
    pub entity: Option<Entity>,
    pub error: BehaviorError,
}

/// Log and publish a fault.
pub fn report(faults: &mut MessageWriter<BehaviorFault>, entity: Option<Entity>, error: BehaviorError) {
    match entity {
        Some(e) => warn!("{e}: {error}"),
        None => warn!("{error}"),
    }
    faults.write(BehaviorFault { entity, error });
}

// -----------------------------------------------------------------------------
// Plugin wiring
// -----------------------------------------------------------------------------

pub fn plugin(app: &mut App) {
    app.add_message::<SceneEvent>()
        .add_message::<BehaviorFault>()
        .init_resource::<MixinRegistry>();

    app.world_mut()
        .get_resource_or_init::<AttributeRegistry>()
        .register_builtins();

    app.configure_sets(
        Update,
        (SceneSet::Input, SceneSet::React, SceneSet::Load, SceneSet::Settle).chain(),
    );

    app.add_systems(Update, loader::load_declared_entities.in_set(SceneSet::Load))
        .add_systems(Update, sync_euler_rotation.in_set(SceneSet::Settle));
}

/// Register an attribute applier from a feature plugin.
pub fn register_attribute(app: &mut App, name: &'static str, applier: AttributeApplier) {
    app.world_mut()
        .get_resource_or_init::<AttributeRegistry>()
        .register(name, applier);
}

pub fn sync_euler_rotation(mut q: Query<(&EulerRotation, &mut Transform), Changed<EulerRotation>>) {
    for (euler, mut tf) in &mut q {
        tf.rotation = euler.to_quat();
    }
}

#[cfg(test)]
mod tests;
