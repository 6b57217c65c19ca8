//! Primitive geometry: vertex layout and ray tests.
//!
//! Vertices are ordered bottom cap to top cap. The first vertex is the centre of the bottom
//! cap and the last vertex is the centre of the top cap, so `end_caps()` spans the shape's
//! local Y extent.

use avian3d::prelude::{Collider, Position, Rotation};
use bevy::prelude::*;

use crate::common::error::{BehaviorError, BehaviorResult};

use super::attributes::{parse_f32, parse_props};

/// Ring resolution used for round primitives.
const SEGMENTS: usize = 8;

/// Longest local-space ray handed to the shape cast.
const MAX_RAY_LENGTH: f32 = 1.0e6;

#[derive(Component, Debug, Clone, Copy, PartialEq)]
pub enum Geometry {
    Box { width: f32, height: f32, depth: f32 },
    Sphere { radius: f32 },
    Cylinder { radius: f32, height: f32 },
}

impl Default for Geometry {
    fn default() -> Self {
        Self::Box { width: 1.0, height: 1.0, depth: 1.0 }
    }
}

impl Geometry {
    /// Default geometry for a primitive tag; `None` for plain entities.
    pub fn for_tag(tag: &str) -> Option<Self> {
        match tag {
            "box" => Some(Self::default()),
            "sphere" => Some(Self::Sphere { radius: 1.0 }),
            "cylinder" => Some(Self::Cylinder { radius: 1.0, height: 1.0 }),
            _ => None,
        }
    }

    /// Parse `"primitive: cylinder; radius: 0.1; height: 0.5"`.
    ///
    /// Dimensions that are not given keep the primitive's defaults.
    pub fn parse(value: &str) -> BehaviorResult<Self> {
        let props = parse_props("geometry", value)?;
        let primitive = props
            .iter()
            .find(|(k, _)| *k == "primitive")
            .map(|(_, v)| *v)
            .unwrap_or("box");

        let mut geometry = Self::for_tag(primitive).ok_or_else(|| {
            BehaviorError::invalid_attribute("geometry", format!("unknown primitive `{primitive}`"))
        })?;

        for (key, raw) in props.into_iter().filter(|(k, _)| *k != "primitive") {
            let v = parse_f32("geometry", raw)?;
            if v < 0.0 {
                return Err(BehaviorError::invalid_attribute("geometry", format!("negative {key}")));
            }
            match (&mut geometry, key) {
                (Self::Box { width, .. }, "width") => *width = v,
                (Self::Box { height, .. }, "height") => *height = v,
                (Self::Box { depth, .. }, "depth") => *depth = v,
                (Self::Sphere { radius }, "radius") => *radius = v,
                (Self::Cylinder { radius, .. }, "radius") => *radius = v,
                (Self::Cylinder { height, .. }, "height") => *height = v,
                _ => {
                    return Err(BehaviorError::invalid_attribute(
                        "geometry",
                        format!("`{key}` does not apply to {primitive}"),
                    ));
                }
            }
        }

        Ok(geometry)
    }

    pub fn half_extents(&self) -> Vec3 {
        match *self {
            Self::Box { width, height, depth } => Vec3::new(width, height, depth) * 0.5,
            Self::Sphere { radius } => Vec3::splat(radius),
            Self::Cylinder { radius, height } => Vec3::new(radius, height * 0.5, radius),
        }
    }

    /// Local-space vertices, bottom cap centre first and top cap centre last.
    pub fn vertices(&self) -> Vec<Vec3> {
        let half = self.half_extents();
        let mut out = Vec::with_capacity(2 + SEGMENTS * 2);
        out.push(Vec3::new(0.0, -half.y, 0.0));

        match *self {
            Self::Box { .. } => {
                for y in [-half.y, half.y] {
                    out.extend([
                        Vec3::new(-half.x, y, -half.z),
                        Vec3::new(half.x, y, -half.z),
                        Vec3::new(half.x, y, half.z),
                        Vec3::new(-half.x, y, half.z),
                    ]);
                }
            }
            Self::Sphere { radius } => out.extend(ring(radius, 0.0)),
            Self::Cylinder { radius, .. } => {
                out.extend(ring(radius, -half.y));
                out.extend(ring(radius, half.y));
            }
        }

        out.push(Vec3::new(0.0, half.y, 0.0));
        out
    }

    /// First and last vertex.
    pub fn end_caps(&self) -> (Vec3, Vec3) {
        let vertices = self.vertices();
        match (vertices.first(), vertices.last()) {
            (Some(&first), Some(&last)) => (first, last),
            _ => (Vec3::ZERO, Vec3::ZERO),
        }
    }

    /// World-space distance from `origin` to where the ray enters this shape.
    ///
    /// The ray is moved into the shape's local space so rotation and non-uniform scale are
    /// honoured, then cast against the exact collider shape. An origin inside the shape hits at
    /// distance 0.
    pub fn ray_hit_distance(&self, world: &GlobalTransform, origin: Vec3, direction: Dir3) -> Option<f32> {
        let inv = world.affine().inverse();
        let local_origin = inv.transform_point3(origin);
        let local_dir = Dir3::new(inv.transform_vector3(*direction)).ok()?;

        let (t, _normal) = self.collider().cast_ray(
            Position::default(),
            Rotation::default(),
            local_origin,
            *local_dir,
            MAX_RAY_LENGTH,
            true,
        )?;

        let local_hit = local_origin + *local_dir * t;
        Some(world.transform_point(local_hit).distance(origin))
    }

    pub fn collider(&self) -> Collider {
        match *self {
            Self::Box { width, height, depth } => Collider::cuboid(width, height, depth),
            Self::Sphere { radius } => Collider::sphere(radius),
            Self::Cylinder { radius, height } => Collider::cylinder(radius, height),
        }
    }

    /// Mesh primitive for rendering.
    pub fn mesh(&self) -> Mesh {
        match *self {
            Self::Box { width, height, depth } => Cuboid::new(width, height, depth).into(),
            Self::Sphere { radius } => Sphere::new(radius).into(),
            Self::Cylinder { radius, height } => Cylinder::new(radius, height).into(),
        }
    }
}

fn ring(radius: f32, y: f32) -> impl Iterator<Item = Vec3> {
    (0..SEGMENTS).map(move |i| {
        let a = i as f32 / SEGMENTS as f32 * std::f32::consts::TAU;
        Vec3::new(radius * a.cos(), y, radius * a.sin())
    })
}
