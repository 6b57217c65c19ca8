//! Collision layers.

use avian3d::prelude::*;

#[derive(PhysicsLayer, Default, Clone, Copy, Debug, PartialEq, Eq)]
pub enum Layer {
    #[default]
    Default,
    Ground,
    Body,
}

/// Layers for a `dynamic-body`.
#[inline]
pub fn body_layers() -> CollisionLayers {
    CollisionLayers::new(Layer::Body, [Layer::Ground, Layer::Body])
}

/// Layers for a `static-body`.
#[inline]
pub fn ground_layers() -> CollisionLayers {
    CollisionLayers::new(Layer::Ground, [Layer::Body])
}
