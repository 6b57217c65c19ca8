//! Tunable scene constants.
//!
//! Defaults match the behavior presets; a TOML file can override any subset of them.

use std::path::Path;

use bevy::prelude::*;
use serde::Deserialize;

use super::error::BehaviorError;

#[derive(Resource, Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct Tunables {
    /// Drop points are sampled in `[-half, half]` on X and Z.
    pub drop_half_extent: f32,
    pub drop_height: f32,
    /// Rain drops at or below this height are recycled.
    pub recycle_height: f32,
    pub gravity: [f32; 3],
    /// Fixed seed for `SceneRng`; entropy when absent.
    pub seed: Option<u64>,
    pub clear_color: [f32; 3],
}

impl Default for Tunables {
    fn default() -> Self {
        Self {
            drop_half_extent: 5.0,
            drop_height: 10.0,
            recycle_height: 0.0,
            gravity: [0.0, -9.81, 0.0],
            seed: None,
            clear_color: [0.05, 0.05, 0.07],
        }
    }
}

impl Tunables {
    pub fn from_toml_str(src: &str) -> Result<Self, BehaviorError> {
        toml::from_str(src).map_err(|e| BehaviorError::Config(e.to_string()))
    }

    /// Read tunables from `path`, falling back to defaults when the file is missing or invalid.
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        let Ok(src) = std::fs::read_to_string(path) else {
            debug!("No tunables at {}, using defaults", path.display());
            return Self::default();
        };

        match Self::from_toml_str(&src) {
            Ok(t) => {
                info!("Loaded tunables from {}", path.display());
                t
            }
            Err(e) => {
                warn!("Ignoring {}: {e}", path.display());
                Self::default()
            }
        }
    }

    #[inline]
    pub fn gravity(&self) -> Vec3 {
        Vec3::from_array(self.gravity)
    }

    #[inline]
    pub fn clear_color(&self) -> Color {
        let [r, g, b] = self.clear_color;
        Color::srgb(r, g, b)
    }
}
