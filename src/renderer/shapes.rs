//! Shape generation for 2D primitives
//!
//! Everything is emitted in world units; the pipeline maps to clip space.

use super::vertex::{Vertex, colors, parse_hex_color};
use crate::consts::{FLASH_INTERVAL_MS, INVULNERABILITY_MS};
use crate::sim::{GameState, Rect, SurfaceKind};

/// Two triangles covering `rect`
pub fn rect(rect: &Rect, color: [f32; 4]) -> [Vertex; 6] {
    let (l, t, r, b) = (rect.left(), rect.top(), rect.right(), rect.bottom());
    [
        Vertex::new(l, t, color),
        Vertex::new(l, b, color),
        Vertex::new(r, t, color),
        Vertex::new(r, t, color),
        Vertex::new(l, b, color),
        Vertex::new(r, b, color),
    ]
}

/// Upward-pointing triangle filling the spike's box
pub fn spike(rect: &Rect, color: [f32; 4]) -> [Vertex; 3] {
    [
        Vertex::new(rect.x + rect.width / 2.0, rect.top(), color),
        Vertex::new(rect.left(), rect.bottom(), color),
        Vertex::new(rect.right(), rect.bottom(), color),
    ]
}

/// Player opacity. While invulnerable it alternates between 0.3 and 1.0
/// every flash interval, counted from the moment of the hit.
pub fn player_alpha(now_ms: f64, invulnerable_until: f64, hit_flash: bool) -> f32 {
    if !hit_flash || now_ms >= invulnerable_until {
        return 1.0;
    }
    let since_hit = now_ms - (invulnerable_until - INVULNERABILITY_MS);
    let cycle = (since_hit / FLASH_INTERVAL_MS).floor() as i64;
    if cycle % 2 == 0 { 0.3 } else { 1.0 }
}

fn surface_color(kind: SurfaceKind, hint: Option<&str>) -> [f32; 4] {
    hint.and_then(parse_hex_color).unwrap_or(match kind {
        SurfaceKind::Ground => colors::GROUND,
        SurfaceKind::Solid => colors::SOLID,
        SurfaceKind::Platform => colors::PLATFORM,
    })
}

/// Whole scene in draw order: surfaces, enemies, spikes, goal, player
pub fn world_vertices(state: &GameState, now_ms: f64, hit_flash: bool) -> Vec<Vertex> {
    let quads = state.surfaces.len() + state.enemies.len() + 2;
    let mut vertices = Vec::with_capacity(quads * 6 + state.spikes.len() * 3);

    for surface in &state.surfaces {
        let color = surface_color(surface.kind, surface.color.as_deref());
        vertices.extend(rect(&surface.rect, color));
    }
    for enemy in &state.enemies {
        vertices.extend(rect(enemy, colors::ENEMY));
    }
    for s in &state.spikes {
        vertices.extend(spike(s, colors::SPIKE));
    }
    if let Some(goal) = &state.goal {
        vertices.extend(rect(goal, colors::GOAL));
    }

    let mut player_color = colors::PLAYER;
    player_color[3] = player_alpha(now_ms, state.health.invulnerable_until, hit_flash);
    vertices.extend(rect(&state.player.rect(), player_color));

    vertices
}
