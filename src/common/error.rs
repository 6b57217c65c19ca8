//! Behavior error types.
//!
//! No behavior panics or propagates a failure to the host schedule. Systems report a
//! `BehaviorError` through `BehaviorFault` messages and a `warn!` line instead.

use bevy::prelude::*;
use thiserror::Error;

/// Errors raised while configuring or running a behavior.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum BehaviorError {
    /// A `mixin` attribute named a bundle that is not registered.
    #[error("unknown mixin: {0}")]
    UnknownMixin(String),

    /// An attribute value could not be parsed.
    #[error("invalid value for attribute `{name}`: {reason}")]
    InvalidAttribute { name: String, reason: String },

    /// A selector string could not be parsed.
    #[error("invalid selector `{selector}`: {reason}")]
    InvalidSelector { selector: String, reason: String },

    /// A selector matched no entity.
    #[error("`{0}` does not point to a valid entity")]
    UnresolvedSelector(String),

    /// `force-pushable` has no camera to push away from.
    #[error("no scene camera to push from")]
    MissingPushReference,

    #[error("no scene camera to move")]
    MissingCamera,

    #[error("anchor `{0}` is not defined")]
    MissingAnchor(String),

    #[error("exit animation `{0}` is not defined")]
    MissingAnimation(String),

    /// Gravity was changed by another writer while floating was active.
    #[error("gravity changed to {observed:?} while floating; not restoring")]
    GravityContended { observed: Vec3 },

    #[error("invalid configuration: {0}")]
    Config(String),
}

impl BehaviorError {
    pub fn invalid_attribute(name: &str, reason: impl Into<String>) -> Self {
        Self::InvalidAttribute {
            name: name.to_owned(),
            reason: reason.into(),
        }
    }
}

/// Result type for behavior parsing and configuration.
pub type BehaviorResult<T> = Result<T, BehaviorError>;
