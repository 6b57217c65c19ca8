//! Element selectors.
//!
//! Supported subset: comma-separated compound selectors, each an optional tag followed by any
//! number of `#id`, `.class`, `[attr]` and `[attr=value]` parts. Combinators are rejected.
//!
//! Matching reads the loaded components (`ElementId`, `Classes`, `TagName`) and falls back to
//! declared `id` / `class` attributes, so entities declared this frame are already selectable.

use bevy::ecs::system::SystemParam;
use bevy::prelude::*;

use crate::common::error::{BehaviorError, BehaviorResult};

use super::{Classes, Declared, ElementId, TagName};

#[derive(Debug, Clone, PartialEq, Eq)]
enum Part {
    Id(String),
    Class(String),
    Attr { name: String, value: Option<String> },
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct Compound {
    tag: Option<String>,
    parts: Vec<Part>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selector {
    source: String,
    alternatives: Vec<Compound>,
}

impl std::fmt::Display for Selector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.source)
    }
}

#[inline]
fn is_ident(c: char) -> bool {
    c.is_alphanumeric() || c == '-' || c == '_'
}

impl Selector {
    pub fn parse(source: &str) -> BehaviorResult<Self> {
        let fail = |reason: &str| BehaviorError::InvalidSelector {
            selector: source.to_owned(),
            reason: reason.to_owned(),
        };

        let alternatives = source
            .split(',')
            .map(|alt| parse_compound(alt.trim()).map_err(|r| fail(r)))
            .collect::<BehaviorResult<Vec<_>>>()?;

        Ok(Self {
            source: source.trim().to_owned(),
            alternatives,
        })
    }

    /// `[name]`
    pub fn attribute(name: &str) -> Self {
        Self {
            source: format!("[{name}]"),
            alternatives: vec![Compound {
                tag: None,
                parts: vec![Part::Attr { name: name.to_owned(), value: None }],
            }],
        }
    }

    /// Does a node with these properties match?
    pub fn matches(&self, node: &NodeView) -> bool {
        self.alternatives.iter().any(|c| c.matches(node))
    }
}

fn take_ident(chars: &mut std::iter::Peekable<std::str::Chars>) -> String {
    let mut out = String::new();
    while let Some(&c) = chars.peek() {
        if !is_ident(c) {
            break;
        }
        out.push(c);
        chars.next();
    }
    out
}

fn parse_compound(src: &str) -> Result<Compound, &'static str> {
    if src.is_empty() {
        return Err("empty selector");
    }

    let mut chars = src.chars().peekable();
    let mut compound = Compound::default();

    if chars.peek().is_some_and(|&c| is_ident(c)) {
        compound.tag = Some(take_ident(&mut chars));
    }

    while let Some(c) = chars.next() {
        match c {
            '#' | '.' => {
                let ident = take_ident(&mut chars);
                if ident.is_empty() {
                    return Err("expected a name after `#` or `.`");
                }
                compound.parts.push(if c == '#' { Part::Id(ident) } else { Part::Class(ident) });
            }
            '[' => {
                let name = take_ident(&mut chars);
                if name.is_empty() {
                    return Err("expected an attribute name");
                }
                let value = match chars.next() {
                    Some(']') => None,
                    Some('=') => {
                        let mut raw = String::new();
                        loop {
                            match chars.next() {
                                Some(']') => break,
                                Some(c) => raw.push(c),
                                None => return Err("unterminated attribute selector"),
                            }
                        }
                        Some(raw.trim().trim_matches(|c| c == '"' || c == '\'').to_owned())
                    }
                    _ => return Err("unterminated attribute selector"),
                };
                compound.parts.push(Part::Attr { name, value });
            }
            c if c.is_whitespace() || c == '>' || c == '+' || c == '~' => {
                return Err("combinators are not supported");
            }
            _ => return Err("unexpected character"),
        }
    }

    Ok(compound)
}

impl Compound {
    fn matches(&self, node: &NodeView) -> bool {
        if let Some(tag) = &self.tag {
            if node.tag != Some(tag.as_str()) {
                return false;
            }
        }

        self.parts.iter().all(|part| match part {
            Part::Id(id) => node.id() == Some(id.as_str()),
            Part::Class(class) => node.has_class(class),
            Part::Attr { name, value } => match (node.declared, value) {
                (Some(d), None) => d.has(name),
                (Some(d), Some(v)) => d.get(name) == Some(v.as_str()),
                (None, _) => false,
            },
        })
    }
}

/// Borrowed view of the selectable properties of one entity.
#[derive(Debug, Clone, Copy, Default)]
pub struct NodeView<'a> {
    pub id: Option<&'a ElementId>,
    pub classes: Option<&'a Classes>,
    pub tag: Option<&'a str>,
    pub declared: Option<&'a Declared>,
}

impl NodeView<'_> {
    fn id(&self) -> Option<&str> {
        self.id
            .map(|i| i.0.as_str())
            .or_else(|| self.declared.and_then(|d| d.get("id")))
    }

    fn has_class(&self, class: &str) -> bool {
        if let Some(classes) = self.classes {
            return classes.contains(class);
        }
        self.declared
            .and_then(|d| d.get("class"))
            .is_some_and(|v| v.split_whitespace().any(|c| c == class))
    }
}

/// Selector queries over the scene.
///
/// Results are ordered by entity, which follows creation order for entities spawned in one
/// session.
#[derive(SystemParam)]
pub struct SceneQuery<'w, 's> {
    nodes: Query<
        'w,
        's,
        (
            Entity,
            Option<&'static ElementId>,
            Option<&'static Classes>,
            Option<&'static TagName>,
            Option<&'static Declared>,
        ),
    >,
}

impl SceneQuery<'_, '_> {
    pub fn select_all(&self, selector: &Selector) -> Vec<Entity> {
        let mut out: Vec<Entity> = self
            .nodes
            .iter()
            .filter(|(_, id, classes, tag, declared)| {
                selector.matches(&NodeView {
                    id: *id,
                    classes: *classes,
                    tag: tag.map(|t| t.0.as_str()),
                    declared: *declared,
                })
            })
            .map(|(e, ..)| e)
            .collect();
        out.sort();
        out
    }

    pub fn select_first(&self, selector: &Selector) -> Option<Entity> {
        self.select_all(selector).into_iter().next()
    }

    #[inline]
    pub fn contains(&self, entity: Entity) -> bool {
        self.nodes.contains(entity)
    }

    pub fn by_id(&self, id: &str) -> Option<Entity> {
        let selector = Selector {
            source: format!("#{id}"),
            alternatives: vec![Compound {
                tag: None,
                parts: vec![Part::Id(id.to_owned())],
            }],
        };
        self.select_first(&selector)
    }
}
