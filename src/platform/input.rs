//! Keyboard mapping
//!
//! Uses `KeyboardEvent.code` (physical key) so the layout works the same on
//! every keyboard language.

use crate::settings::KeyLayout;
use crate::sim::tick::{Action, InputState};

/// Game action bound to a physical key code under `layout`
pub fn action_for_code(code: &str, layout: KeyLayout) -> Option<Action> {
    match (layout, code) {
        (_, "Space") => Some(Action::Jump),
        (KeyLayout::Wasd, "KeyA") => Some(Action::Left),
        (KeyLayout::Wasd, "KeyD") => Some(Action::Right),
        (KeyLayout::Wasd, "KeyW") => Some(Action::Jump),
        (KeyLayout::Arrows, "ArrowLeft") => Some(Action::Left),
        (KeyLayout::Arrows, "ArrowRight") => Some(Action::Right),
        (KeyLayout::Arrows, "ArrowUp") => Some(Action::Jump),
        _ => None,
    }
}

/// Label for the movement keys of `layout`
pub fn move_keys_label(layout: KeyLayout) -> &'static str {
    match layout {
        KeyLayout::Wasd => "A / D",
        KeyLayout::Arrows => "\u{2190} / \u{2192}",
    }
}

/// Replace `{move}` in level hint text with the active layout's keys
pub fn expand_key_hints(text: &str, layout: KeyLayout) -> String {
    text.replace("{move}", move_keys_label(layout))
}

/// Key that toggles the pause menu
pub fn is_pause_code(code: &str) -> bool {
    matches!(code, "Escape" | "KeyP")
}

/// Apply a key event to the held-key state. Returns whether the key is bound,
/// so the caller can suppress browser scrolling for it.
pub fn handle_key(input: &mut InputState, code: &str, pressed: bool, layout: KeyLayout) -> bool {
    match action_for_code(code, layout) {
        Some(action) => {
            input.set(action, pressed);
            true
        }
        None => false,
    }
}
