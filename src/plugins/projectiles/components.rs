use bevy::prelude::*;

use crate::plugins::scene::Selector;

/// Constant motion along the entity's local Y axis.
#[derive(Component, Debug, Clone, Copy, PartialEq)]
pub struct Projectile {
    /// Scene units per frame; negative moves along local -Y.
    pub speed: f32,
}

impl Default for Projectile {
    fn default() -> Self {
        Self { speed: -0.4 }
    }
}

/// Per-frame ray probe from the entity's bottom cap through its top cap.
#[derive(Component, Debug, Clone, PartialEq)]
#[require(ProbeTargets)]
pub struct CollisionProbe {
    pub target: Selector,
    /// Hits closer than this (world units) are ignored.
    pub near: f32,
    pub far: f32,
}

impl CollisionProbe {
    pub fn new(target: Selector) -> Self {
        Self {
            target,
            near: 1.0,
            far: f32::INFINITY,
        }
    }
}

/// Targets captured once, when the probe attaches. Never refreshed.
#[derive(Component, Debug, Clone, Default, PartialEq, Eq)]
pub struct ProbeTargets {
    pub attached: bool,
    pub targets: Vec<Entity>,
}
