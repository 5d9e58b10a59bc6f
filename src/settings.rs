//! Player preferences
//!
//! Persisted in LocalStorage, separately from level progress (which lives in
//! the unlock service).

use serde::{Deserialize, Serialize};

use crate::persistence::api::DEFAULT_BASE_URL;
use crate::platform::storage;

/// Movement key bindings. Space always jumps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum KeyLayout {
    /// A / D to move
    #[default]
    Wasd,
    /// Left / Right arrows to move
    Arrows,
}

impl KeyLayout {
    pub fn as_str(&self) -> &'static str {
        match self {
            KeyLayout::Wasd => "WASD",
            KeyLayout::Arrows => "Arrows",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "wasd" => Some(KeyLayout::Wasd),
            "arrows" | "arrow" => Some(KeyLayout::Arrows),
            _ => None,
        }
    }

    /// The other layout, for the settings toggle
    pub fn toggled(&self) -> Self {
        match self {
            KeyLayout::Wasd => KeyLayout::Arrows,
            KeyLayout::Arrows => KeyLayout::Wasd,
        }
    }
}

/// Game settings/preferences
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub key_layout: KeyLayout,
    /// Flash the player while invulnerable
    pub hit_flash: bool,
    /// Show the level timer in the HUD
    pub show_timer: bool,
    /// Base URL of the level-unlock service
    pub api_base_url: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            key_layout: KeyLayout::Wasd,
            hit_flash: true,
            show_timer: true,
            api_base_url: DEFAULT_BASE_URL.to_string(),
        }
    }
}

impl Settings {
    /// LocalStorage key
    const STORAGE_KEY: &'static str = "side_scroller_settings";

    /// Load settings, falling back to defaults when nothing usable is stored
    pub fn load() -> Self {
        match storage::load_json(Self::STORAGE_KEY) {
            Some(settings) => {
                log::info!("Loaded settings from LocalStorage");
                settings
            }
            None => {
                log::info!("Using default settings");
                Self::default()
            }
        }
    }

    pub fn save(&self) {
        if storage::save_json(Self::STORAGE_KEY, self) {
            log::info!("Settings saved");
        }
    }
}
