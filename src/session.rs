//! Level session control
//!
//! A `Session` is created when a level loads and dropped when the player
//! leaves it. It owns the simulation state and everything the game loop
//! needs around it: pause state, the pause-exclusive level timer, and the
//! level-complete flow.

use crate::consts::{LAST_LEVEL, TUTORIAL_LEVEL};
use crate::sim::{GameEvent, GameState, InputState, LevelData, LevelError, tick};

/// Where the session is in its lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    Playing,
    /// Update is skipped; drawing continues
    Paused,
    /// Goal reached; the final time is frozen
    Complete,
}

/// One live level
#[derive(Debug, Clone)]
pub struct Session {
    level_number: u32,
    pub state: GameState,
    phase: SessionPhase,
    /// Level start, shifted forward by every completed pause
    started_at: f64,
    paused_at: Option<f64>,
    final_time: Option<f64>,
}

impl Session {
    /// Start a session on already-validated level data
    pub fn new(level_number: u32, level: LevelData, now_ms: f64) -> Self {
        log::info!("Loaded level {} ({})", level_number, level.name);
        Self {
            level_number,
            state: GameState::new(level),
            phase: SessionPhase::Playing,
            started_at: now_ms,
            paused_at: None,
            final_time: None,
        }
    }

    /// Start a session on one of the built-in levels
    pub fn load_builtin(level_number: u32, now_ms: f64) -> Result<Self, LevelError> {
        let level = LevelData::builtin(level_number)?;
        Ok(Self::new(level_number, level, now_ms))
    }

    pub fn level_number(&self) -> u32 {
        self.level_number
    }

    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    pub fn is_paused(&self) -> bool {
        self.phase == SessionPhase::Paused
    }

    pub fn is_complete(&self) -> bool {
        self.phase == SessionPhase::Complete
    }

    /// Run one animation frame. Only a playing session updates.
    pub fn frame(&mut self, input: &InputState, now_ms: f64) -> Vec<GameEvent> {
        if self.phase != SessionPhase::Playing {
            return Vec::new();
        }

        let events = tick(&mut self.state, input, now_ms);
        if events.contains(&GameEvent::LevelComplete) {
            let time = self.elapsed_ms(now_ms);
            self.final_time = Some(time);
            self.phase = SessionPhase::Complete;
            log::info!(
                "Level {} completed in {} ({} ticks)",
                self.level_number,
                format_time(time),
                self.state.time_ticks
            );
        }
        events
    }

    pub fn pause(&mut self, now_ms: f64) {
        if self.phase == SessionPhase::Playing {
            self.phase = SessionPhase::Paused;
            self.paused_at = Some(now_ms);
        }
    }

    /// Resume and push the start time forward by the paused duration
    pub fn resume(&mut self, now_ms: f64) {
        if self.phase == SessionPhase::Paused {
            self.phase = SessionPhase::Playing;
            if let Some(paused_at) = self.paused_at.take() {
                self.started_at += now_ms - paused_at;
            }
        }
    }

    /// Resume, then put player, health, enemies and spikes back to their
    /// loaded state. The level timer keeps running.
    pub fn restart(&mut self, now_ms: f64) {
        self.resume(now_ms);
        self.state.reset();
        log::info!("Level {} restarted", self.level_number);
    }

    /// Time spent playing, excluding pauses
    pub fn elapsed_ms(&self, now_ms: f64) -> f64 {
        if let Some(time) = self.final_time {
            return time;
        }
        let end = self.paused_at.unwrap_or(now_ms);
        (end - self.started_at).max(0.0)
    }

    /// Level to unlock when this one is completed. The tutorial and the last
    /// level unlock nothing.
    pub fn unlock_target(&self) -> Option<u32> {
        unlock_target(self.level_number)
    }

    /// Level to load after this one, or `None` to go back to the menu
    pub fn next_level(&self) -> Option<u32> {
        let next = self.level_number + 1;
        (next <= LAST_LEVEL).then_some(next)
    }
}

/// Level unlocked by completing `level_number`
pub fn unlock_target(level_number: u32) -> Option<u32> {
    if level_number == TUTORIAL_LEVEL || level_number >= LAST_LEVEL {
        None
    } else {
        Some(level_number + 1)
    }
}

/// Format milliseconds as `m:ss`
pub fn format_time(ms: f64) -> String {
    let total_secs = (ms.max(0.0) / 1000.0).floor() as u64;
    format!("{}:{:02}", total_secs / 60, total_secs % 60)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::{MAX_HEALTH, SPAWN_X, SPAWN_Y};
    use crate::sim::Rect;
    use glam::Vec2;

    fn session_at(now: f64) -> Session {
        Session::load_builtin(1, now).unwrap()
    }

    #[test]
    fn test_format_time() {
        assert_eq!(format_time(0.0), "0:00");
        assert_eq!(format_time(999.0), "0:00");
        assert_eq!(format_time(61_500.0), "1:01");
        assert_eq!(format_time(600_000.0), "10:00");
        assert_eq!(format_time(-5.0), "0:00");
    }

    #[test]
    fn test_elapsed_excludes_pauses() {
        let mut session = session_at(1000.0);
        assert_eq!(session.elapsed_ms(3000.0), 2000.0);

        session.pause(3000.0);
        // Frozen while paused
        assert_eq!(session.elapsed_ms(10_000.0), 2000.0);

        session.resume(10_000.0);
        assert_eq!(session.elapsed_ms(11_000.0), 3000.0);
    }

    #[test]
    fn test_paused_frames_do_not_update() {
        let mut session = session_at(0.0);
        session.pause(0.0);
        let before = session.state.player.pos;
        let events = session.frame(&InputState::default(), 16.0);
        assert!(events.is_empty());
        assert_eq!(session.state.player.pos, before);
        assert_eq!(session.state.time_ticks, 0);
    }

    #[test]
    fn test_double_pause_keeps_first_timestamp() {
        let mut session = session_at(0.0);
        session.pause(1000.0);
        session.pause(2000.0);
        session.resume(3000.0);
        assert_eq!(session.elapsed_ms(3000.0), 1000.0);
    }

    #[test]
    fn test_restart_resets_level_and_resumes() {
        let mut session = session_at(0.0);
        let enemies = session.state.enemies.clone();
        session.state.enemies.clear();
        session.state.player.pos = Vec2::new(500.0, 100.0);
        session.state.health.current = 1;
        session.pause(500.0);

        session.restart(1500.0);

        assert_eq!(session.phase(), SessionPhase::Playing);
        assert_eq!(session.state.enemies, enemies);
        assert_eq!(session.state.player.pos, Vec2::new(SPAWN_X, SPAWN_Y));
        assert_eq!(session.state.health.current, MAX_HEALTH);
        assert_eq!(session.elapsed_ms(1500.0), 500.0);
    }

    #[test]
    fn test_goal_completes_session() {
        let mut session = session_at(0.0);
        let goal = session.state.goal.unwrap();
        session.state.player.pos = Vec2::new(goal.x, goal.y);

        let events = session.frame(&InputState::default(), 65_000.0);
        assert!(events.contains(&GameEvent::LevelComplete));
        assert!(session.is_complete());
        assert_eq!(session.elapsed_ms(90_000.0), 65_000.0);

        // No more updates
        assert!(session.frame(&InputState::default(), 66_000.0).is_empty());
        session.pause(67_000.0);
        assert!(session.is_complete());
    }

    #[test]
    fn test_restart_after_death_matches_fresh_snapshot() {
        let level = LevelData {
            name: "snap".into(),
            base_width: 800.0,
            base_height: 500.0,
            surfaces: vec![crate::sim::Surface::new(
                Rect::new(-200.0, 450.0, 1400.0, 50.0),
                crate::sim::SurfaceKind::Ground,
            )],
            enemies: vec![Rect::new(300.0, 410.0, 40.0, 40.0)],
            spikes: vec![Rect::new(500.0, 430.0, 30.0, 20.0)],
            goal: None,
            tutorial_texts: Vec::new(),
        };
        let mut session = Session::new(2, level, 0.0);
        let snapshot = session.state.snapshot().clone();

        // Fall into the void: next frame kills and restores
        session.state.enemies.clear();
        session.state.spikes.clear();
        session.state.player.pos = Vec2::new(2000.0, 900.0);
        let events = session.frame(&InputState::default(), 16.0);
        assert!(events.contains(&GameEvent::PlayerDied));
        assert_eq!(session.state.enemies, snapshot.enemies);
        assert_eq!(session.state.spikes, snapshot.spikes);
    }

    #[test]
    fn test_unlock_targets() {
        assert_eq!(unlock_target(0), None);
        assert_eq!(unlock_target(1), Some(2));
        assert_eq!(unlock_target(2), Some(3));
        assert_eq!(unlock_target(3), None);
    }

    #[test]
    fn test_next_level() {
        assert_eq!(Session::load_builtin(0, 0.0).unwrap().next_level(), Some(1));
        assert_eq!(Session::load_builtin(2, 0.0).unwrap().next_level(), Some(3));
        assert_eq!(Session::load_builtin(3, 0.0).unwrap().next_level(), None);
    }

    #[test]
    fn test_unknown_level_fails_to_load() {
        assert!(Session::load_builtin(9, 0.0).is_err());
    }
}
