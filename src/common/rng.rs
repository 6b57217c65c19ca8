//! Scene-wide random source.

use bevy::prelude::*;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

#[derive(Resource, Debug)]
pub struct SceneRng(pub StdRng);

impl SceneRng {
    pub fn new(seed: Option<u64>) -> Self {
        match seed {
            Some(s) => Self(StdRng::seed_from_u64(s)),
            None => Self(StdRng::from_entropy()),
        }
    }

    /// Uniform sample in `[0, 1)`.
    #[inline]
    pub fn unit(&mut self) -> f32 {
        self.0.gen_range(0.0..1.0)
    }

    /// Uniform sample in `[-half, half]`.
    #[inline]
    pub fn symmetric(&mut self, half: f32) -> f32 {
        if half <= 0.0 {
            return 0.0;
        }
        self.0.gen_range(-half..=half)
    }
}
