//! Per-frame simulation tick
//!
//! Advances the game by one animation frame. The order of the passes is part
//! of the game's behavior: enemy and spike contacts are judged on the moved
//! position before surfaces push the player back out.

use super::collision::{Resolution, landed_on_top, resolve_solid};
use super::health::HealthEvent;
use super::level::{Surface, SurfaceKind};
use super::state::{GameEvent, GameState, Player};
use crate::consts::*;

/// Game actions bound to keys
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Left,
    Right,
    Jump,
}

/// Held state of the movement keys, sampled once per tick
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InputState {
    pub left: bool,
    pub right: bool,
    pub jump: bool,
}

impl InputState {
    /// Key down sets, key up clears. Repeats are idempotent.
    pub fn set(&mut self, action: Action, pressed: bool) {
        match action {
            Action::Left => self.left = pressed,
            Action::Right => self.right = pressed,
            Action::Jump => self.jump = pressed,
        }
    }

    /// Release everything (focus loss, level change)
    pub fn clear(&mut self) {
        *self = Self::default();
    }
}

/// Advance the game state by one tick at wall-clock time `now_ms`
pub fn tick(state: &mut GameState, input: &InputState, now_ms: f64) -> Vec<GameEvent> {
    let mut events = Vec::new();
    state.time_ticks += 1;

    // Falling out of the world only signals damage; the poll below applies it
    if state.in_void() {
        state.health.post_damage(VOID_DAMAGE);
    }

    if state.reached_goal() {
        events.push(GameEvent::LevelComplete);
        return events;
    }

    match state.health.poll(now_ms) {
        Some(HealthEvent::Hurt { remaining }) => {
            events.push(GameEvent::PlayerHurt { health: remaining });
        }
        Some(HealthEvent::Ignored { .. }) => events.push(GameEvent::HitIgnored),
        Some(HealthEvent::Died) => {
            state.respawn();
            log::info!("Player died, level reset");
            events.push(GameEvent::PlayerDied);
        }
        None => {}
    }

    let prev_bottom = state.player.bottom();

    apply_input(&mut state.player, input);

    // Semi-implicit Euler, then resolve
    state.player.vel.y += GRAVITY;
    state.player.pos += state.player.vel;

    let stomped = enemy_pass(state, prev_bottom, now_ms, &mut events);
    spike_pass(state, now_ms, &mut events);
    let on_surface = surface_pass(&mut state.player, &state.surfaces, prev_bottom);

    if !on_surface && !stomped {
        state.player.jumping = true;
    }

    state.update_camera();
    events
}

/// Direct velocity assignment from held keys; left wins over right
fn apply_input(player: &mut Player, input: &InputState) {
    player.vel.x = if input.left {
        -PLAYER_SPEED
    } else if input.right {
        PLAYER_SPEED
    } else {
        0.0
    };

    if input.jump && !player.jumping {
        player.vel.y = JUMP_IMPULSE;
        player.jumping = true;
    }
}

/// Stomp or get hurt by enemies. Scans in reverse so removal is safe; the
/// first stomp ends the scan. Returns whether an enemy was stomped.
fn enemy_pass(
    state: &mut GameState,
    prev_bottom: f32,
    now_ms: f64,
    events: &mut Vec<GameEvent>,
) -> bool {
    for i in (0..state.enemies.len()).rev() {
        let enemy = state.enemies[i];
        let player = &mut state.player;
        if !player.rect().intersects(&enemy) {
            continue;
        }

        if landed_on_top(prev_bottom, player.bottom(), enemy.top(), player.vel.y) {
            player.pos.y = enemy.top() - player.size.y;
            player.vel.y = STOMP_BOUNCE;
            player.jumping = false;
            state.enemies.remove(i);
            log::info!("Enemy defeated");
            events.push(GameEvent::EnemyDefeated);
            return true;
        }

        if state.health.post_gated(CONTACT_DAMAGE, now_ms) {
            events.push(GameEvent::DamagePosted {
                amount: CONTACT_DAMAGE,
            });
        }
    }
    false
}

/// Spikes hurt from any direction
fn spike_pass(state: &mut GameState, now_ms: f64, events: &mut Vec<GameEvent>) {
    let player = state.player.rect();
    for spike in &state.spikes {
        if player.intersects(spike) && state.health.post_gated(CONTACT_DAMAGE, now_ms) {
            events.push(GameEvent::DamagePosted {
                amount: CONTACT_DAMAGE,
            });
        }
    }
}

/// Resolve against every surface in order. Returns whether the player ended
/// up standing on something.
fn surface_pass(player: &mut Player, surfaces: &[Surface], prev_bottom: f32) -> bool {
    let mut on_surface = false;

    for surface in surfaces {
        let s = &surface.rect;
        match surface.kind {
            SurfaceKind::Platform => {
                if !player.rect().overlaps_horizontally(s) {
                    continue;
                }
                if landed_on_top(prev_bottom, player.bottom(), s.top(), player.vel.y) {
                    player.pos.y = s.top() - player.size.y;
                    player.vel.y = 0.0;
                    player.jumping = false;
                    on_surface = true;
                }
            }
            SurfaceKind::Ground | SurfaceKind::Solid => {
                match resolve_solid(&player.rect(), player.vel, s) {
                    Some(Resolution::Wall { x }) => {
                        player.pos.x = x;
                        player.vel.x = 0.0;
                    }
                    Some(Resolution::Land { y }) => {
                        player.pos.y = y;
                        player.vel.y = 0.0;
                        player.jumping = false;
                        on_surface = true;
                    }
                    Some(Resolution::Ceiling { y }) => {
                        player.pos.y = y;
                        player.vel.y = 0.0;
                    }
                    None => {}
                }
            }
        }
    }
    on_surface
}
