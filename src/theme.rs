//! Theme catalog: visual style presets for the particle population.
//!
//! A [`Theme`] maps to a [`ThemeStyle`] describing how particles under that
//! theme are generated: which hue band colors are drawn from, the base size
//! range, the rendered shape, and a velocity multiplier. Every color and size
//! draw is an independent random sample, so no two particles look identical
//! even under the same theme.

use std::fmt;
use std::ops::Range;

use glam::Vec3;
use rand::Rng;

/// Visual style preset applied to the whole particle population.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Theme {
    /// Cool blue/cyan network.
    #[default]
    Default,
    /// Red/orange squares, twice the drift speed.
    Fire,
    /// Violet stars.
    Galaxy,
    /// Green discs.
    Nature,
    /// Pink hearts.
    Love,
}

impl Theme {
    /// All themes, in selection order.
    pub const ALL: [Theme; 5] = [
        Theme::Default,
        Theme::Fire,
        Theme::Galaxy,
        Theme::Nature,
        Theme::Love,
    ];

    /// The generation policy for this theme.
    pub fn style(self) -> ThemeStyle {
        match self {
            Theme::Fire => ThemeStyle {
                hue: 10.0..50.0,
                saturation: 1.0,
                lightness: 0.6,
                size: 2.0..6.0,
                shape: ParticleShape::Square,
                speed: 2.0,
            },
            Theme::Galaxy => ThemeStyle {
                hue: 240.0..300.0,
                saturation: 0.8,
                lightness: 0.7,
                size: 1.0..4.0,
                shape: ParticleShape::Star,
                speed: 1.0,
            },
            Theme::Nature => ThemeStyle {
                hue: 90.0..150.0,
                saturation: 0.7,
                lightness: 0.5,
                size: 2.0..7.0,
                shape: ParticleShape::Circle,
                speed: 1.0,
            },
            Theme::Love => ThemeStyle {
                hue: 320.0..360.0,
                saturation: 0.9,
                lightness: 0.6,
                size: 2.0..8.0,
                shape: ParticleShape::Heart,
                speed: 1.0,
            },
            Theme::Default => ThemeStyle {
                hue: 180.0..240.0,
                saturation: 0.7,
                lightness: 0.5,
                size: 1.0..4.0,
                shape: ParticleShape::Circle,
                speed: 1.0,
            },
        }
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Theme::Default => write!(f, "default"),
            Theme::Fire => write!(f, "fire"),
            Theme::Galaxy => write!(f, "galaxy"),
            Theme::Nature => write!(f, "nature"),
            Theme::Love => write!(f, "love"),
        }
    }
}

/// Particle shape for rendering.
///
/// The shape is purely cosmetic; wall and pointer distance checks use the
/// particle's center point, not the shape extent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ParticleShape {
    /// Disc of the particle's current size.
    #[default]
    Circle,
    /// Axis-aligned square of side 2x size, rotated by the particle angle.
    Square,
    /// Symmetric heart outline scaled by size.
    Heart,
    /// 5-point star alternating outer radius 1.5x and inner radius 0.7x size.
    Star,
}

impl ParticleShape {
    /// Index used to select the shape branch in the fragment shader.
    pub(crate) fn index(self) -> u32 {
        match self {
            ParticleShape::Circle => 0,
            ParticleShape::Square => 1,
            ParticleShape::Heart => 2,
            ParticleShape::Star => 3,
        }
    }
}

/// Generation policy for particles under one theme.
///
/// `hue` is in degrees, `saturation`/`lightness` in 0.0-1.0.
#[derive(Debug, Clone, PartialEq)]
pub struct ThemeStyle {
    pub hue: Range<f32>,
    pub saturation: f32,
    pub lightness: f32,
    pub size: Range<f32>,
    pub shape: ParticleShape,
    pub speed: f32,
}

impl ThemeStyle {
    /// Draw a random color from this style's hue band.
    pub fn sample_color(&self, rng: &mut impl Rng) -> Vec3 {
        hsl_to_rgb(rng.gen_range(self.hue.clone()), self.saturation, self.lightness)
    }

    /// Draw a random base size from this style's size range.
    pub fn sample_size(&self, rng: &mut impl Rng) -> f32 {
        rng.gen_range(self.size.clone())
    }
}

/// Convert HSL to RGB.
///
/// * `h` - hue in degrees (wraps)
/// * `s` - saturation, 0.0 (gray) to 1.0 (vivid)
/// * `l` - lightness, 0.0 (black) to 1.0 (white)
pub fn hsl_to_rgb(h: f32, s: f32, l: f32) -> Vec3 {
    let c = (1.0 - (2.0 * l - 1.0).abs()) * s;
    let hp = h.rem_euclid(360.0) / 60.0;
    let x = c * (1.0 - (hp % 2.0 - 1.0).abs());
    let m = l - c / 2.0;

    let (r, g, b) = match hp as u32 % 6 {
        0 => (c, x, 0.0),
        1 => (x, c, 0.0),
        2 => (0.0, c, x),
        3 => (0.0, x, c),
        4 => (x, 0.0, c),
        _ => (c, 0.0, x),
    };

    Vec3::new(r + m, g + m, b + m)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::SmallRng;
    use rand::SeedableRng;

    /// Recover the hue in degrees from an RGB color.
    fn rgb_hue(c: Vec3) -> f32 {
        let max = c.x.max(c.y).max(c.z);
        let min = c.x.min(c.y).min(c.z);
        let d = max - min;
        if d < 1e-6 {
            return 0.0;
        }
        let h = if max == c.x {
            ((c.y - c.z) / d).rem_euclid(6.0)
        } else if max == c.y {
            (c.z - c.x) / d + 2.0
        } else {
            (c.x - c.y) / d + 4.0
        };
        h * 60.0
    }

    #[test]
    fn test_policy_table() {
        assert_eq!(Theme::Default.style().shape, ParticleShape::Circle);
        assert_eq!(Theme::Fire.style().shape, ParticleShape::Square);
        assert_eq!(Theme::Galaxy.style().shape, ParticleShape::Star);
        assert_eq!(Theme::Nature.style().shape, ParticleShape::Circle);
        assert_eq!(Theme::Love.style().shape, ParticleShape::Heart);

        assert_eq!(Theme::Fire.style().speed, 2.0);
        for theme in [Theme::Default, Theme::Galaxy, Theme::Nature, Theme::Love] {
            assert_eq!(theme.style().speed, 1.0);
        }

        assert_eq!(Theme::Default.style().size, 1.0..4.0);
        assert_eq!(Theme::Fire.style().size, 2.0..6.0);
        assert_eq!(Theme::Galaxy.style().size, 1.0..4.0);
        assert_eq!(Theme::Nature.style().size, 2.0..7.0);
        assert_eq!(Theme::Love.style().size, 2.0..8.0);
    }

    #[test]
    fn test_hsl_to_rgb_primaries() {
        let red = hsl_to_rgb(0.0, 1.0, 0.5);
        assert!((red.x - 1.0).abs() < 0.001);
        assert!(red.y < 0.001);
        assert!(red.z < 0.001);

        let blue = hsl_to_rgb(240.0, 1.0, 0.5);
        assert!(blue.x < 0.001);
        assert!(blue.y < 0.001);
        assert!((blue.z - 1.0).abs() < 0.001);

        // Full lightness is white regardless of hue
        let white = hsl_to_rgb(123.0, 1.0, 1.0);
        assert!((white.x - 1.0).abs() < 0.001);
        assert!((white.y - 1.0).abs() < 0.001);
        assert!((white.z - 1.0).abs() < 0.001);
    }

    #[test]
    fn test_sample_color_stays_in_hue_band() {
        let mut rng = SmallRng::seed_from_u64(7);
        for theme in Theme::ALL {
            let style = theme.style();
            for _ in 0..200 {
                let hue = rgb_hue(style.sample_color(&mut rng));
                assert!(
                    hue >= style.hue.start - 0.5 && hue < style.hue.end + 0.5,
                    "{theme}: hue {hue} outside {:?}",
                    style.hue
                );
            }
        }
    }

    #[test]
    fn test_sample_size_stays_in_range() {
        let mut rng = SmallRng::seed_from_u64(7);
        for theme in Theme::ALL {
            let style = theme.style();
            for _ in 0..200 {
                let size = style.sample_size(&mut rng);
                assert!(style.size.contains(&size));
            }
        }
    }
}
