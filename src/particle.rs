//! The particle entity: per-agent kinematic and visual state.
//!
//! Particles integrate their own velocity, bounce off the field walls, and
//! react to the pointer: a held press attracts them, a hovering pointer
//! pushes them away. Proximity to the pointer also swells the rendered size
//! up to three times the base size.

use glam::{Vec2, Vec3};
use rand::Rng;
use std::f32::consts::TAU;

use crate::input::Pointer;
use crate::theme::{ParticleShape, ThemeStyle};

/// Distance within which the pointer exerts force on a particle.
pub const INTERACTION_RADIUS: f32 = 200.0;

/// Size multiplier at zero pointer distance (full force).
pub const MAX_SIZE_FACTOR: f32 = 3.0;

const ATTRACT_STRENGTH: f32 = 2.5;
const REPEL_STRENGTH: f32 = 2.0;
const DAMPING: f32 = 0.95;
const SIZE_DECAY: f32 = 0.1;
const SPAWN_SPEED: f32 = 0.5;
const MAX_SPIN: f32 = 0.05;

/// A single agent in the particle field.
#[derive(Debug, Clone)]
pub struct Particle {
    pub position: Vec2,
    pub velocity: Vec2,
    /// Rotation angle in radians.
    pub angle: f32,
    /// Angular velocity per tick.
    pub spin: f32,
    /// Current rendered size; relaxes toward `base_size`.
    pub size: f32,
    pub base_size: f32,
    pub color: Vec3,
    pub shape: ParticleShape,
}

impl Particle {
    /// Spawn a particle at a uniformly random position within the bounds,
    /// styled by the given theme policy.
    pub fn spawn(rng: &mut impl Rng, width: f32, height: f32, style: &ThemeStyle) -> Self {
        let velocity = Vec2::new(
            rng.gen_range(-SPAWN_SPEED..SPAWN_SPEED),
            rng.gen_range(-SPAWN_SPEED..SPAWN_SPEED),
        ) * style.speed;
        let base_size = style.sample_size(rng);

        Self {
            position: Vec2::new(rng.gen_range(0.0..width), rng.gen_range(0.0..height)),
            velocity,
            angle: rng.gen_range(0.0..TAU),
            spin: rng.gen_range(-MAX_SPIN..MAX_SPIN),
            size: base_size,
            base_size,
            color: style.sample_color(rng),
            shape: style.shape,
        }
    }

    /// Advance the particle by one tick.
    ///
    /// Integrates velocity and spin, reflects off the walls (velocity sign
    /// flip only, no position clamp), applies the pointer force, updates the
    /// rendered size, and damps the velocity.
    pub fn step(&mut self, width: f32, height: f32, pointer: &Pointer) {
        self.position += self.velocity;
        self.angle += self.spin;

        // Wall bounce
        if self.position.x < 0.0 || self.position.x > width {
            self.velocity.x = -self.velocity.x;
        }
        if self.position.y < 0.0 || self.position.y > height {
            self.velocity.y = -self.velocity.y;
        }

        let delta = pointer.position - self.position;
        let dist = delta.length();

        if dist < INTERACTION_RADIUS {
            let force = (INTERACTION_RADIUS - dist) / INTERACTION_RADIUS;

            // A particle sitting exactly under the pointer has no defined
            // force direction; it still swells to full size.
            if dist > f32::EPSILON {
                let (direction, strength) = if pointer.pressed {
                    (1.0, ATTRACT_STRENGTH)
                } else {
                    (-1.0, REPEL_STRENGTH)
                };
                self.velocity += delta / dist * force * direction * strength;
            }

            self.size = self.base_size * (1.0 + force * (MAX_SIZE_FACTOR - 1.0));
        } else if self.size > self.base_size {
            self.size = (self.size - SIZE_DECAY).max(self.base_size);
        }

        self.velocity *= DAMPING;
    }
}
