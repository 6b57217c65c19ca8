//! Declared attributes and the registry that turns them into components.
//!
//! Attribute values use the usual scene syntax:
//! - vectors: `"1 2 3"`
//! - property lists: `"speed: -0.4; target: .enemy"`
//! - bundle entries: `"name|value"` (value optional)

use std::collections::HashMap;

use avian3d::prelude::*;
use bevy::color::Srgba;
use bevy::prelude::*;

use crate::common::error::{BehaviorError, BehaviorResult};
use crate::common::layers::{body_layers, ground_layers};

use super::{Classes, ElementId, EulerRotation, Geometry, Tint};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
    pub name: String,
    pub value: String,
}

impl Attribute {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }

    /// Parse a `"name|value"` bundle entry. A missing value is the empty string.
    pub fn parse_entry(entry: &str) -> Self {
        let mut parts = entry.splitn(2, '|');
        let name = parts.next().unwrap_or_default().trim();
        let value = parts.next().unwrap_or_default().trim();
        Self::new(name, value)
    }
}

/// Attributes declared on an entity, in declaration order.
///
/// Stays on the entity after loading so `[attr]` selectors keep matching.
#[derive(Component, Debug, Clone, Default, PartialEq)]
pub struct Declared(pub Vec<Attribute>);

impl Declared {
    pub fn from_pairs<'a>(pairs: impl IntoIterator<Item = (&'a str, &'a str)>) -> Self {
        Self(pairs.into_iter().map(|(n, v)| Attribute::new(n, v)).collect())
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.0
            .iter()
            .rev()
            .find(|a| a.name == name)
            .map(|a| a.value.as_str())
    }

    #[inline]
    pub fn has(&self, name: &str) -> bool {
        self.0.iter().any(|a| a.name == name)
    }

    pub fn push(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.0.push(Attribute::new(name, value));
    }
}

/// State gathered while applying one entity's attributes.
///
/// Pose, geometry and body attributes depend on each other, so they are collected here and
/// inserted together once every attribute has been seen.
#[derive(Debug, Clone, Default)]
pub struct LoadContext {
    pub transform: Transform,
    pub rotation: Option<Vec3>,
    pub geometry: Option<Geometry>,
    pub body: Option<RigidBody>,
}

impl LoadContext {
    pub fn new(transform: Transform, geometry: Option<Geometry>) -> Self {
        Self {
            transform,
            geometry,
            ..default()
        }
    }

    /// Insert the collected pose, geometry and physics body.
    pub fn finish(self, entity: &mut EntityCommands) {
        let mut transform = self.transform;
        if let Some(rotation) = self.rotation {
            let euler = EulerRotation(rotation);
            transform.rotation = euler.to_quat();
            entity.insert(euler);
        }
        entity.insert(transform);

        if let Some(geometry) = self.geometry {
            entity.insert(geometry);
        }

        if let Some(body) = self.body {
            let collider = self.geometry.unwrap_or_default().collider();
            let layers = match body {
                RigidBody::Static => ground_layers(),
                _ => body_layers(),
            };
            entity.insert((body, collider, layers, LinearVelocity::ZERO));
        }
    }
}

pub type AttributeApplier = fn(&mut EntityCommands, &mut LoadContext, &str) -> BehaviorResult<()>;

/// Attribute name -> applier. Names without an applier are plain attributes.
#[derive(Resource, Default)]
pub struct AttributeRegistry {
    appliers: HashMap<&'static str, AttributeApplier>,
}

impl AttributeRegistry {
    pub fn register(&mut self, name: &'static str, applier: AttributeApplier) {
        self.appliers.insert(name, applier);
    }

    pub fn get(&self, name: &str) -> Option<AttributeApplier> {
        self.appliers.get(name).copied()
    }

    pub fn register_builtins(&mut self) {
        self.register("position", apply_position);
        self.register("rotation", apply_rotation);
        self.register("scale", apply_scale);
        self.register("geometry", apply_geometry);
        self.register("color", apply_color);
        self.register("id", apply_id);
        self.register("class", apply_class);
        self.register("dynamic-body", apply_dynamic_body);
        self.register("static-body", apply_static_body);
    }
}

// -----------------------------------------------------------------------------
// Value parsing
// -----------------------------------------------------------------------------

pub fn parse_f32(name: &str, value: &str) -> BehaviorResult<f32> {
    value
        .trim()
        .parse::<f32>()
        .map_err(|e| BehaviorError::invalid_attribute(name, e.to_string()))
}

pub fn parse_vec3(name: &str, value: &str) -> BehaviorResult<Vec3> {
    let parts: Vec<&str> = value.split_whitespace().collect();
    let [x, y, z] = parts.as_slice() else {
        return Err(BehaviorError::invalid_attribute(
            name,
            format!("expected three numbers, got `{value}`"),
        ));
    };
    Ok(Vec3::new(parse_f32(name, x)?, parse_f32(name, y)?, parse_f32(name, z)?))
}

/// Parse `"key: value; key: value"` into ordered pairs.
pub fn parse_props<'a>(name: &str, value: &'a str) -> BehaviorResult<Vec<(&'a str, &'a str)>> {
    value
        .split(';')
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .map(|p| {
            p.split_once(':')
                .map(|(k, v)| (k.trim(), v.trim()))
                .ok_or_else(|| BehaviorError::invalid_attribute(name, format!("expected `key: value`, got `{p}`")))
        })
        .collect()
}

/// Look up a single property from a property list, or treat a bare value as that property.
pub fn prop_or_bare<'a>(name: &str, value: &'a str, key: &str) -> BehaviorResult<Option<&'a str>> {
    if value.trim().is_empty() {
        return Ok(None);
    }
    if !value.contains(':') {
        return Ok(Some(value.trim()));
    }
    Ok(parse_props(name, value)?
        .into_iter()
        .find(|(k, _)| *k == key)
        .map(|(_, v)| v))
}

pub fn parse_color(name: &str, value: &str) -> BehaviorResult<Color> {
    Srgba::hex(value.trim())
        .map(Color::from)
        .map_err(|e| BehaviorError::invalid_attribute(name, e.to_string()))
}

// -----------------------------------------------------------------------------
// Built-in appliers
// -----------------------------------------------------------------------------

fn apply_position(_: &mut EntityCommands, ctx: &mut LoadContext, value: &str) -> BehaviorResult<()> {
    ctx.transform.translation = parse_vec3("position", value)?;
    Ok(())
}

fn apply_rotation(_: &mut EntityCommands, ctx: &mut LoadContext, value: &str) -> BehaviorResult<()> {
    ctx.rotation = Some(parse_vec3("rotation", value)?);
    Ok(())
}

fn apply_scale(_: &mut EntityCommands, ctx: &mut LoadContext, value: &str) -> BehaviorResult<()> {
    ctx.transform.scale = parse_vec3("scale", value)?;
    Ok(())
}

fn apply_geometry(_: &mut EntityCommands, ctx: &mut LoadContext, value: &str) -> BehaviorResult<()> {
    ctx.geometry = Some(Geometry::parse(value)?);
    Ok(())
}

fn apply_color(entity: &mut EntityCommands, _: &mut LoadContext, value: &str) -> BehaviorResult<()> {
    entity.insert(Tint(parse_color("color", value)?));
    Ok(())
}

fn apply_id(entity: &mut EntityCommands, _: &mut LoadContext, value: &str) -> BehaviorResult<()> {
    let id = value.trim();
    if id.is_empty() {
        return Err(BehaviorError::invalid_attribute("id", "empty id"));
    }
    entity.insert(ElementId(id.to_owned()));
    Ok(())
}

fn apply_class(entity: &mut EntityCommands, _: &mut LoadContext, value: &str) -> BehaviorResult<()> {
    entity.insert(Classes::parse(value));
    Ok(())
}

fn apply_dynamic_body(_: &mut EntityCommands, ctx: &mut LoadContext, _: &str) -> BehaviorResult<()> {
    ctx.body = Some(RigidBody::Dynamic);
    Ok(())
}

fn apply_static_body(_: &mut EntityCommands, ctx: &mut LoadContext, _: &str) -> BehaviorResult<()> {
    ctx.body = Some(RigidBody::Static);
    Ok(())
}
