//! Side Scroller - A browser 2D platformer
//!
//! Core modules:
//! - `sim`: Per-frame simulation (movement, collisions, health, camera)
//! - `session`: Level session control (pause, restart, timing, completion)
//! - `progress`: Level-unlock records and the unlock view
//! - `persistence`: REST client for the level-unlock service
//! - `platform`: Browser/native platform abstraction
//! - `renderer`: WebGPU rendering pipeline

pub mod persistence;
pub mod platform;
pub mod progress;
pub mod renderer;
pub mod session;
pub mod settings;
pub mod sim;

pub use progress::{LevelRecord, LevelStore, UnlockView};
pub use session::{Session, SessionPhase};
pub use settings::{KeyLayout, Settings};

/// Game configuration constants
pub mod consts {
    /// Player spawn point (top-left corner, world units)
    pub const SPAWN_X: f32 = 100.0;
    pub const SPAWN_Y: f32 = 400.0;

    /// Player box
    pub const PLAYER_WIDTH: f32 = 40.0;
    pub const PLAYER_HEIGHT: f32 = 40.0;

    /// Horizontal speed (units per tick, no inertia)
    pub const PLAYER_SPEED: f32 = 7.0;
    /// Downward acceleration (units per tick²)
    pub const GRAVITY: f32 = 0.8;
    /// Vertical velocity set on jump (negative is up)
    pub const JUMP_IMPULSE: f32 = -15.0;
    /// Vertical velocity after stomping an enemy
    pub const STOMP_BOUNCE: f32 = -12.0;

    /// Horizontal push-out must beat vertical by more than this
    pub const RESOLVE_EPSILON: f32 = 0.1;

    /// Distance below the level's base height that counts as the void
    pub const VOID_MARGIN: f32 = 100.0;

    /// Health
    pub const MAX_HEALTH: u8 = 3;
    pub const VOID_DAMAGE: u8 = MAX_HEALTH;
    pub const CONTACT_DAMAGE: u8 = 1;

    /// Minimum time between damage-channel polls (ms)
    pub const HEALTH_POLL_INTERVAL_MS: f64 = 100.0;
    /// Invulnerability after a non-fatal hit (ms)
    pub const INVULNERABILITY_MS: f64 = 1000.0;
    /// Opacity toggle period while invulnerable (ms)
    pub const FLASH_INTERVAL_MS: f64 = 100.0;

    /// Camera keeps the player this far down the view (fraction of height)
    pub const CAMERA_VERTICAL_BIAS: f32 = 0.60;

    /// Tutorial level number and the last playable level
    pub const TUTORIAL_LEVEL: u32 = 0;
    pub const LAST_LEVEL: u32 = 3;
}
