//! Collision predicates and push-out resolution for axis-aligned boxes
//!
//! The engine moves first and resolves afterwards, so everything here works
//! on the already-integrated player rectangle plus the previous tick's
//! bottom edge.

use glam::Vec2;

use super::rect::Rect;
use crate::consts::RESOLVE_EPSILON;

/// Discrete one-tick landing test shared by stomps and platforms.
///
/// The player's bottom edge was at or above `top` last tick, is at or below it
/// now, and the player is not moving up.
#[inline]
pub fn landed_on_top(prev_bottom: f32, bottom: f32, top: f32, vel_y: f32) -> bool {
    prev_bottom <= top && bottom >= top && vel_y >= 0.0
}

/// How a blocking surface pushes the player out
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Resolution {
    /// Hit a side; player x is moved to `x` and horizontal velocity stops
    Wall { x: f32 },
    /// Landed on top; player y is moved to `y`, grounded
    Land { y: f32 },
    /// Hit the underside; player y is moved to `y` and vertical velocity stops
    Ceiling { y: f32 },
}

/// Resolve the player against a ground/solid surface.
///
/// Contact is tested one velocity step ahead of `player`. The push-out axis is
/// the one with the smaller overlap, and the horizontal axis only wins if it is
/// smaller by more than [`RESOLVE_EPSILON`]; near-equal overlaps resolve
/// vertically so grid-aligned corners read as floor, not wall.
pub fn resolve_solid(player: &Rect, vel: Vec2, surface: &Rect) -> Option<Resolution> {
    // Contact is predicted from the next step, so a fast fall past a ground
    // edge can leave the player inside its side until the next tick.
    if !player.translated(vel).intersects(surface) {
        return None;
    }

    let from_left = player.right() - surface.left();
    let from_right = surface.right() - player.left();
    let from_top = player.bottom() - surface.top();
    let from_below = surface.bottom() - player.top();

    let min_x = from_left.min(from_right);
    let min_y = from_top.min(from_below);

    let resolution = if min_x + RESOLVE_EPSILON < min_y {
        if from_left < from_right {
            Resolution::Wall {
                x: surface.left() - player.width,
            }
        } else {
            Resolution::Wall {
                x: surface.right(),
            }
        }
    } else if from_top < from_below {
        Resolution::Land {
            y: surface.top() - player.height,
        }
    } else {
        Resolution::Ceiling {
            y: surface.bottom(),
        }
    };
    Some(resolution)
}

#[cfg(test)]
mod tests {
    use super::*;

    const GROUND: Rect = Rect::new(0.0, 450.0, 800.0, 50.0);

    #[test]
    fn test_landed_on_top() {
        assert!(landed_on_top(440.0, 445.0, 440.0, 5.0));
        assert!(landed_on_top(439.0, 441.0, 440.0, 0.0));
        // Moving up through it
        assert!(!landed_on_top(440.0, 445.0, 440.0, -1.0));
        // Was already below the top
        assert!(!landed_on_top(441.0, 445.0, 440.0, 5.0));
        // Has not reached it yet
        assert!(!landed_on_top(430.0, 439.0, 440.0, 5.0));
    }

    #[test]
    fn test_resting_player_lands() {
        // Gravity pulled the player 0.8 into the ground this tick
        let player = Rect::new(100.0, 410.8, 40.0, 40.0);
        let res = resolve_solid(&player, Vec2::new(0.0, 0.8), &GROUND);
        assert_eq!(res, Some(Resolution::Land { y: 410.0 }));
    }

    #[test]
    fn test_no_contact_returns_none() {
        let player = Rect::new(100.0, 300.0, 40.0, 40.0);
        assert_eq!(resolve_solid(&player, Vec2::new(0.0, 5.0), &GROUND), None);
    }

    #[test]
    fn test_lookahead_catches_contact_before_overlap() {
        // 5 above the ground, falling 10 per tick
        let player = Rect::new(100.0, 405.0, 40.0, 40.0);
        let res = resolve_solid(&player, Vec2::new(0.0, 10.0), &GROUND);
        assert_eq!(res, Some(Resolution::Land { y: 410.0 }));
    }

    #[test]
    fn test_wall_from_left() {
        let wall = Rect::new(600.0, 300.0, 100.0, 60.0);
        // Walked 7 into the wall's left side at mid height
        let player = Rect::new(567.0, 310.0, 40.0, 40.0);
        let res = resolve_solid(&player, Vec2::new(7.0, 0.8), &wall);
        assert_eq!(res, Some(Resolution::Wall { x: 560.0 }));
    }

    #[test]
    fn test_wall_from_right() {
        let wall = Rect::new(600.0, 300.0, 100.0, 60.0);
        let player = Rect::new(693.0, 310.0, 40.0, 40.0);
        let res = resolve_solid(&player, Vec2::new(-7.0, 0.8), &wall);
        assert_eq!(res, Some(Resolution::Wall { x: 700.0 }));
    }

    #[test]
    fn test_ceiling_from_below() {
        let block = Rect::new(600.0, 300.0, 100.0, 60.0);
        // Jumped up into the underside
        let player = Rect::new(630.0, 355.0, 40.0, 40.0);
        let res = resolve_solid(&player, Vec2::new(0.0, -14.2), &block);
        assert_eq!(res, Some(Resolution::Ceiling { y: 360.0 }));
    }

    #[test]
    fn test_near_tie_prefers_vertical() {
        // Corner overlap: x overlap 5.0, y overlap 5.05 -> within epsilon
        let block = Rect::new(600.0, 300.0, 100.0, 60.0);
        let player = Rect::new(565.0, 265.05, 40.0, 40.0);
        let res = resolve_solid(&player, Vec2::new(1.0, 1.0), &block);
        assert!(matches!(res, Some(Resolution::Land { .. })));
    }

    #[test]
    fn test_clear_horizontal_win() {
        // x overlap 2, y overlap 10 -> wall
        let block = Rect::new(600.0, 300.0, 100.0, 60.0);
        let player = Rect::new(562.0, 270.0, 40.0, 40.0);
        let res = resolve_solid(&player, Vec2::new(1.0, 1.0), &block);
        assert_eq!(res, Some(Resolution::Wall { x: 560.0 }));
    }
}
