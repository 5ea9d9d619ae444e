//! # flowfield
//!
//! An interactive, theme-driven 2D particle field. A few hundred to a
//! couple thousand particles drift inside the window, bounce off its walls,
//! and react to the pointer: hovering repels them gently, pressing and
//! holding pulls them in. Motion trails accumulate on a persistent render
//! target instead of clearing each frame.
//!
//! The population's look is controlled by a [`Theme`](theme::Theme): each
//! theme fixes a hue band, a size range, a shape (circle, square, heart or
//! star) and a drift speed. Themes are switched manually or through a
//! [`GestureCommand`](command::GestureCommand) produced by an external
//! image-understanding service behind the
//! [`GestureClassifier`](vision::GestureClassifier) capability.
//!
//! ## Quick Start
//!
//! ```ignore
//! use flowfield::prelude::*;
//!
//! fn main() -> flowfield::Result<()> {
//!     env_logger::init();
//!     App::new(Config::load()?).run()
//! }
//! ```
//!
//! ## Core Concepts
//!
//! * [`ParticleField`](field::ParticleField) owns the population and steps
//!   it once per frame. Theme changes replace every particle atomically;
//!   resizes only update the bounds.
//! * Rendering goes through an instanced quad pipeline; the theme's shape is
//!   cut out of each quad in the fragment shader.
//! * Gesture classification runs off-thread and is total: failures degrade
//!   to a no-change command instead of faulting the loop.

pub mod app;
pub mod capture;
pub mod command;
pub mod config;
pub mod error;
pub mod field;
pub mod gpu;
pub mod input;
pub mod particle;
pub mod theme;
pub mod time;
pub mod vision;

pub use error::{FlowError, Result};

/// Convenient re-exports for common usage.
pub mod prelude {
    pub use crate::app::App;
    pub use crate::capture::{FrameSource, TestPatternSource};
    pub use crate::command::{GestureCommand, VisionResponse};
    pub use crate::config::Config;
    pub use crate::error::{FlowError, Result};
    pub use crate::field::{ParticleField, PopulationTiers};
    pub use crate::input::Pointer;
    pub use crate::particle::Particle;
    pub use crate::theme::{ParticleShape, Theme};
    pub use crate::time::Time;
    pub use crate::vision::{GeminiClassifier, GestureClassifier, ScriptedClassifier};
}
