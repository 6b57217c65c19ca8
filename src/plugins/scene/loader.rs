//! Attribute loader: `Declared` -> components.
//!
//! Load order for one entity:
//! 1. tag defaults (geometry for primitive tags)
//! 2. attributes of every mixin named by `mixin`, in order
//! 3. the entity's own attributes
//!
//! A later attribute with the same name replaces an earlier one.

use std::collections::HashMap;

use bevy::prelude::*;

use crate::common::error::BehaviorError;

use super::attributes::{Attribute, AttributeRegistry, Declared, LoadContext};
use super::{report, BehaviorFault, Geometry, Loaded, SceneEvent, SceneEventKind, TagName};

/// Named attribute bundles.
#[derive(Resource, Debug, Default, Clone)]
pub struct MixinRegistry {
    mixins: HashMap<String, Vec<Attribute>>,
}

impl MixinRegistry {
    /// Define (or redefine) a mixin from `(name, value)` pairs.
    pub fn define<'a>(&mut self, name: impl Into<String>, attrs: impl IntoIterator<Item = (&'a str, &'a str)>) {
        let attrs = attrs.into_iter().map(|(n, v)| Attribute::new(n, v)).collect();
        self.mixins.insert(name.into(), attrs);
    }

    pub fn get(&self, name: &str) -> Option<&[Attribute]> {
        self.mixins.get(name).map(Vec::as_slice)
    }

    /// Expand `mixin` references and apply override order.
    ///
    /// Unknown mixin names are returned as errors; the rest of the attributes still resolve.
    pub fn resolve(&self, declared: &[Attribute]) -> (Vec<Attribute>, Vec<BehaviorError>) {
        let mut out: Vec<Attribute> = Vec::with_capacity(declared.len());
        let mut errors = Vec::new();

        let mixin_names = declared
            .iter()
            .filter(|a| a.name == "mixin")
            .flat_map(|a| a.value.split_whitespace());

        for name in mixin_names {
            match self.get(name) {
                Some(attrs) => attrs.iter().for_each(|a| upsert(&mut out, a)),
                None => errors.push(BehaviorError::UnknownMixin(name.to_owned())),
            }
        }

        declared
            .iter()
            .filter(|a| a.name != "mixin")
            .for_each(|a| upsert(&mut out, a));

        (out, errors)
    }
}

fn upsert(out: &mut Vec<Attribute>, attr: &Attribute) {
    match out.iter_mut().find(|a| a.name == attr.name) {
        Some(slot) => slot.value.clone_from(&attr.value),
        None => out.push(attr.clone()),
    }
}

pub fn load_declared_entities(
    mut commands: Commands,
    mixins: Res<MixinRegistry>,
    registry: Res<AttributeRegistry>,
    q: Query<(Entity, &Declared, Option<&TagName>, Option<&Transform>), Without<Loaded>>,
    mut events: MessageWriter<SceneEvent>,
    mut faults: MessageWriter<BehaviorFault>,
) {
    for (e, declared, tag, tf) in &q {
        let (attrs, errors) = mixins.resolve(&declared.0);
        for err in errors {
            report(&mut faults, Some(e), err);
        }

        let geometry = tag.and_then(|t| Geometry::for_tag(&t.0));
        let mut ctx = LoadContext::new(tf.copied().unwrap_or_default(), geometry);
        let mut entity = commands.entity(e);

        for attr in &attrs {
            let Some(apply) = registry.get(&attr.name) else {
                continue;
            };
            if let Err(err) = apply(&mut entity, &mut ctx, &attr.value) {
                report(&mut faults, Some(e), err);
            }
        }

        ctx.finish(&mut entity);
        entity.insert(Loaded);
        events.write(SceneEvent::new(e, SceneEventKind::Loaded));
    }
}
