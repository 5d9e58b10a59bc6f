//! Health, damage and invulnerability
//!
//! Collision passes never touch health directly. They post into a
//! single-slot [`DamageChannel`]; [`Health::poll`] drains it at a bounded
//! rate so several contacts in adjacent frames count as one hit.

use serde::{Deserialize, Serialize};

use crate::consts::{HEALTH_POLL_INTERVAL_MS, INVULNERABILITY_MS, MAX_HEALTH};

/// Depth-1 damage mailbox. A later post within the same poll window
/// overwrites the earlier one.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DamageChannel {
    pending: Option<u8>,
}

impl DamageChannel {
    /// Overwrite the slot with `amount`
    pub fn post(&mut self, amount: u8) {
        self.pending = Some(amount);
    }

    /// Drain the slot
    pub fn take(&mut self) -> Option<u8> {
        self.pending.take()
    }

    pub fn has_pending(&self) -> bool {
        self.pending.is_some()
    }

    pub fn clear(&mut self) {
        self.pending = None;
    }
}

/// Result of a poll that consumed pending damage
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HealthEvent {
    /// Non-fatal damage applied; invulnerability started
    Hurt { remaining: u8 },
    /// Damage dropped because the player is invulnerable
    Ignored { amount: u8 },
    /// Health reached zero and was restored; caller must respawn
    Died,
}

/// Player health with the damage channel and timers that gate it
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Health {
    pub current: u8,
    /// Timestamp (ms) until which non-fatal damage is dropped
    pub invulnerable_until: f64,
    /// Timestamp (ms) of the last channel poll
    last_poll: Option<f64>,
    pub channel: DamageChannel,
}

impl Default for Health {
    fn default() -> Self {
        Self::new()
    }
}

impl Health {
    pub fn new() -> Self {
        Self {
            current: MAX_HEALTH,
            invulnerable_until: 0.0,
            last_poll: None,
            channel: DamageChannel::default(),
        }
    }

    /// Whether non-fatal damage is currently being dropped
    pub fn is_invulnerable(&self, now_ms: f64) -> bool {
        now_ms < self.invulnerable_until
    }

    /// Post damage regardless of invulnerability (void falls)
    pub fn post_damage(&mut self, amount: u8) {
        self.channel.post(amount);
    }

    /// Post damage only when not invulnerable. Returns whether it was posted.
    pub fn post_gated(&mut self, amount: u8, now_ms: f64) -> bool {
        if self.is_invulnerable(now_ms) {
            return false;
        }
        self.channel.post(amount);
        true
    }

    /// Drain the channel if the poll interval has elapsed.
    ///
    /// Damage is applied when it is fatal or when invulnerability has expired;
    /// otherwise it is consumed and dropped. A fatal hit restores full health
    /// and clears invulnerability before returning [`HealthEvent::Died`].
    pub fn poll(&mut self, now_ms: f64) -> Option<HealthEvent> {
        if let Some(last) = self.last_poll {
            if now_ms - last < HEALTH_POLL_INTERVAL_MS {
                return None;
            }
        }
        self.last_poll = Some(now_ms);

        let amount = self.channel.take()?;
        if amount == 0 {
            return None;
        }

        let fatal = amount >= self.current;
        if !fatal && self.is_invulnerable(now_ms) {
            log::debug!("Dropped {} damage while invulnerable", amount);
            return Some(HealthEvent::Ignored { amount });
        }

        self.current = self.current.saturating_sub(amount);
        log::debug!("Player took {} damage, health {}", amount, self.current);

        if self.current == 0 {
            self.restore();
            Some(HealthEvent::Died)
        } else {
            self.invulnerable_until = now_ms + INVULNERABILITY_MS;
            Some(HealthEvent::Hurt {
                remaining: self.current,
            })
        }
    }

    /// Full health, no invulnerability, empty channel. Poll pacing is kept.
    pub fn restore(&mut self) {
        self.current = MAX_HEALTH;
        self.invulnerable_until = 0.0;
        self.channel.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_channel_overwrites_and_drains() {
        let mut channel = DamageChannel::default();
        assert!(!channel.has_pending());

        channel.post(1);
        channel.post(3);
        assert!(channel.has_pending());
        assert_eq!(channel.take(), Some(3));
        assert_eq!(channel.take(), None);
    }

    #[test]
    fn test_nonfatal_hit_grants_invulnerability() {
        let mut health = Health::new();
        health.post_damage(1);
        assert_eq!(health.poll(1000.0), Some(HealthEvent::Hurt { remaining: 2 }));
        assert!(health.is_invulnerable(1500.0));
        assert!(!health.is_invulnerable(2000.0));
    }

    #[test]
    fn test_second_hit_inside_window_is_dropped() {
        let mut health = Health::new();
        health.post_damage(1);
        health.poll(1000.0);

        health.post_damage(1);
        assert_eq!(health.poll(1500.0), Some(HealthEvent::Ignored { amount: 1 }));
        assert_eq!(health.current, 2);
        // Consumed, not retried
        assert!(!health.channel.has_pending());
        assert_eq!(health.poll(2100.0), None);
        assert_eq!(health.current, 2);
    }

    #[test]
    fn test_hit_after_window_applies() {
        let mut health = Health::new();
        health.post_damage(1);
        health.poll(1000.0);

        health.post_damage(1);
        assert_eq!(health.poll(2000.0), Some(HealthEvent::Hurt { remaining: 1 }));
    }

    #[test]
    fn test_fatal_damage_ignores_invulnerability() {
        let mut health = Health::new();
        health.post_damage(1);
        health.poll(1000.0);
        health.post_damage(1);
        health.poll(2000.0);
        assert_eq!(health.current, 1);

        // Inside the window, but fatal
        health.post_damage(1);
        assert_eq!(health.poll(2200.0), Some(HealthEvent::Died));
        assert_eq!(health.current, MAX_HEALTH);
        assert!(!health.is_invulnerable(2200.0));
    }

    #[test]
    fn test_void_damage_is_always_fatal() {
        let mut health = Health::new();
        health.post_damage(crate::consts::VOID_DAMAGE);
        assert_eq!(health.poll(0.0), Some(HealthEvent::Died));
        assert_eq!(health.current, MAX_HEALTH);
    }

    #[test]
    fn test_poll_is_throttled() {
        let mut health = Health::new();
        assert_eq!(health.poll(1000.0), None);

        health.post_damage(1);
        // Too soon after the previous poll
        assert_eq!(health.poll(1050.0), None);
        assert!(health.channel.has_pending());

        assert_eq!(health.poll(1100.0), Some(HealthEvent::Hurt { remaining: 2 }));
    }

    #[test]
    fn test_gated_post_respects_window() {
        let mut health = Health::new();
        assert!(health.post_gated(1, 0.0));
        health.poll(0.0);

        assert!(!health.post_gated(1, 500.0));
        assert!(!health.channel.has_pending());
        assert!(health.post_gated(1, 1000.0));
    }

    #[test]
    fn test_zero_damage_is_noop() {
        let mut health = Health::new();
        health.post_damage(0);
        assert_eq!(health.poll(0.0), None);
        assert_eq!(health.current, MAX_HEALTH);
    }
}
