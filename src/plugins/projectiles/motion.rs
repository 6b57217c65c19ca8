//! Projectile motion.

use bevy::prelude::*;

use super::components::Projectile;

/// Translate every projectile along its own Y axis by `speed`.
pub fn move_projectiles(mut q: Query<(&Projectile, &mut Transform)>) {
    for (p, mut tf) in &mut q {
        let step = tf.rotation * Vec3::Y * p.speed;
        tf.translation += step;
    }
}
