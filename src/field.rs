//! The particle field: owns the population and advances it each frame.
//!
//! The field holds the live particle collection, the canvas bounds, and the
//! random source feeding particle generation. Theme changes replace the
//! whole population atomically; resizes only update the bounds and let the
//! wall bounce pull strays back in over the following ticks.

use glam::{Vec2, Vec3};
use rand::rngs::SmallRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};

use crate::input::Pointer;
use crate::particle::Particle;
use crate::theme::Theme;

/// Distance within which a particle gets a connection line to the pointer.
///
/// Particle-to-particle connections are deliberately not drawn; connecting
/// only toward the pointer keeps the pass linear in the population size.
pub const CONNECTION_RADIUS: f32 = 150.0;

/// Two-tier population policy: fewer particles on narrow (mobile-class)
/// viewports to bound CPU cost, more on wider ones.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PopulationTiers {
    pub narrow: usize,
    pub wide: usize,
    /// Width in pixels below which the narrow tier applies.
    pub threshold: f32,
}

impl Default for PopulationTiers {
    fn default() -> Self {
        Self {
            narrow: 400,
            wide: 1200,
            threshold: 768.0,
        }
    }
}

impl PopulationTiers {
    /// Population count for a viewport of the given width.
    pub fn count_for(&self, width: f32) -> usize {
        if width < self.threshold {
            self.narrow
        } else {
            self.wide
        }
    }
}

/// A line segment from a particle to the pointer, drawn in the particle's
/// color with alpha falling off toward the connection radius.
#[derive(Debug, Clone, Copy)]
pub struct Connection {
    pub from: Vec2,
    pub to: Vec2,
    pub color: Vec3,
    pub alpha: f32,
}

/// Aggregate owning and stepping the particle population.
pub struct ParticleField {
    particles: Vec<Particle>,
    width: f32,
    height: f32,
    theme: Theme,
    tiers: PopulationTiers,
    rng: SmallRng,
}

impl ParticleField {
    /// Create a field and spawn its initial population.
    pub fn new(width: f32, height: f32, theme: Theme, tiers: PopulationTiers) -> Self {
        Self::with_rng(SmallRng::from_entropy(), width, height, theme, tiers)
    }

    /// Create a field with an explicit random source, for deterministic
    /// population generation.
    pub fn with_rng(
        rng: SmallRng,
        width: f32,
        height: f32,
        theme: Theme,
        tiers: PopulationTiers,
    ) -> Self {
        let mut field = Self {
            particles: Vec::new(),
            // Minimized windows report zero-sized viewports; spawn bounds
            // must stay non-empty
            width: width.max(1.0),
            height: height.max(1.0),
            theme,
            tiers,
            rng,
        };
        field.repopulate();
        field
    }

    /// Discard every particle and regenerate under the current theme, with
    /// the count re-derived from the current width.
    fn repopulate(&mut self) {
        let style = self.theme.style();
        let count = self.tiers.count_for(self.width);
        self.particles = (0..count)
            .map(|_| Particle::spawn(&mut self.rng, self.width, self.height, &style))
            .collect();
    }

    /// Update the bounds only. Existing particles re-bound against the new
    /// walls starting next tick; the population is not reallocated.
    pub fn resize(&mut self, width: f32, height: f32) {
        self.width = width.max(1.0);
        self.height = height.max(1.0);
    }

    /// Atomic full-population replacement under the new theme's policy.
    pub fn set_theme(&mut self, theme: Theme) {
        self.theme = theme;
        self.repopulate();
    }

    pub fn theme(&self) -> Theme {
        self.theme
    }

    pub fn size(&self) -> (f32, f32) {
        (self.width, self.height)
    }

    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    /// Advance every particle by one tick against the current pointer state.
    pub fn step(&mut self, pointer: &Pointer) {
        for particle in &mut self.particles {
            particle.step(self.width, self.height, pointer);
        }
    }

    /// Collect the pointer-connection segments for this frame.
    pub fn connections(&self, pointer: &Pointer) -> Vec<Connection> {
        self.particles
            .iter()
            .filter_map(|p| {
                let dist = p.position.distance(pointer.position);
                (dist < CONNECTION_RADIUS).then(|| Connection {
                    from: p.position,
                    to: pointer.position,
                    color: p.color,
                    alpha: 1.0 - dist / CONNECTION_RADIUS,
                })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::theme::ParticleShape;

    fn seeded_field(width: f32, theme: Theme) -> ParticleField {
        ParticleField::with_rng(
            SmallRng::seed_from_u64(42),
            width,
            600.0,
            theme,
            PopulationTiers::default(),
        )
    }

    #[test]
    fn test_population_tiers() {
        let tiers = PopulationTiers::default();
        assert_eq!(tiers.count_for(767.0), 400);
        assert_eq!(tiers.count_for(768.0), 1200);
        assert_eq!(tiers.count_for(1920.0), 1200);

        assert_eq!(seeded_field(320.0, Theme::Default).particles().len(), 400);
        assert_eq!(seeded_field(1280.0, Theme::Default).particles().len(), 1200);
    }

    #[test]
    fn test_initial_population_matches_policy() {
        let field = seeded_field(1280.0, Theme::Fire);
        let style = Theme::Fire.style();
        for p in field.particles() {
            assert_eq!(p.shape, ParticleShape::Square);
            assert!(style.size.contains(&p.base_size));
        }
    }

    #[test]
    fn test_theme_change_is_atomic() {
        let mut field = seeded_field(1280.0, Theme::Default);
        field.set_theme(Theme::Love);

        assert_eq!(field.theme(), Theme::Love);
        assert_eq!(field.particles().len(), 1200);
        let style = Theme::Love.style();
        for p in field.particles() {
            assert_eq!(p.shape, ParticleShape::Heart);
            assert!(style.size.contains(&p.base_size));
        }
    }

    #[test]
    fn test_resize_keeps_population() {
        let mut field = seeded_field(1280.0, Theme::Default);
        field.resize(320.0, 240.0);

        // Bounds change, particles do not
        assert_eq!(field.size(), (320.0, 240.0));
        assert_eq!(field.particles().len(), 1200);

        // But the next retheme re-derives the tier from the new width
        field.set_theme(Theme::Nature);
        assert_eq!(field.particles().len(), 400);
    }

    #[test]
    fn test_connections_gated_by_radius() {
        let mut field = seeded_field(1280.0, Theme::Default);
        let pointer = Pointer {
            position: Vec2::new(640.0, 300.0),
            pressed: false,
        };

        let connections = field.connections(&pointer);
        assert_eq!(
            connections.len(),
            field
                .particles()
                .iter()
                .filter(|p| p.position.distance(pointer.position) < CONNECTION_RADIUS)
                .count()
        );
        for c in &connections {
            assert!(c.alpha > 0.0 && c.alpha <= 1.0);
            assert_eq!(c.to, pointer.position);
        }

        // Pointer far off-surface connects to nothing
        field.step(&Pointer::new());
        assert!(field.connections(&Pointer::new()).is_empty());
    }

    #[test]
    fn test_step_advances_all_particles() {
        let mut field = seeded_field(320.0, Theme::Default);
        let before: Vec<Vec2> = field.particles().iter().map(|p| p.position).collect();
        field.step(&Pointer::new());
        let moved = field
            .particles()
            .iter()
            .zip(&before)
            .filter(|(p, b)| p.position != **b)
            .count();
        // Essentially every particle has nonzero velocity
        assert!(moved > before.len() * 9 / 10);
    }
}
