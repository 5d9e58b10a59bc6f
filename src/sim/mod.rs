//! Per-frame simulation module
//!
//! All gameplay logic lives here. This module must stay free of rendering and
//! platform dependencies:
//! - One tick per animation frame, fixed per-tick tuning
//! - Wall-clock time is passed in, never read
//! - Stable iteration order (level data order)

pub mod camera;
pub mod collision;
pub mod health;
pub mod level;
pub mod rect;
pub mod state;
pub mod tick;

pub use camera::Camera;
pub use collision::{Resolution, landed_on_top, resolve_solid};
pub use health::{DamageChannel, Health, HealthEvent};
pub use level::{LevelData, LevelError, Surface, SurfaceKind, TutorialText};
pub use rect::Rect;
pub use state::{GameEvent, GameState, LevelSnapshot, Player};
pub use tick::{InputState, tick};
