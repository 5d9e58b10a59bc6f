//! Camera that follows the player
//!
//! Recomputed from scratch every tick. There is no smoothing and nothing is
//! carried between ticks.

use serde::{Deserialize, Serialize};

use super::rect::Rect;
use crate::consts::CAMERA_VERTICAL_BIAS;

/// View rectangle in world units
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Camera {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Camera {
    /// Camera sized to the level's base dimensions, centered horizontally on
    /// `target` and placing its center `CAMERA_VERTICAL_BIAS` of the way down.
    pub fn follow(target: &Rect, base_width: f32, base_height: f32) -> Self {
        let center = target.center();
        Self {
            x: center.x - base_width / 2.0,
            y: center.y - base_height * CAMERA_VERTICAL_BIAS,
            width: base_width,
            height: base_height,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_follow_centers_horizontally() {
        let player = Rect::new(100.0, 400.0, 40.0, 40.0);
        let camera = Camera::follow(&player, 800.0, 500.0);
        assert_eq!(camera.width, 800.0);
        assert_eq!(camera.height, 500.0);
        assert!((camera.x + camera.width / 2.0 - 120.0).abs() < 1e-4);
    }

    #[test]
    fn test_follow_biases_player_low() {
        let player = Rect::new(0.0, 0.0, 40.0, 40.0);
        let camera = Camera::follow(&player, 800.0, 500.0);
        // Player center sits 60% of the way down the view
        let offset = player.center().y - camera.y;
        assert!((offset - 300.0).abs() < 1e-4);
    }
}
