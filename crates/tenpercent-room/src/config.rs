//! Game configuration and the room lifecycle phase.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use tenpercent_protocol::{AllowedTimers, LooseNumber};
use tracing::warn;

// ---------------------------------------------------------------------------
// GameConfig
// ---------------------------------------------------------------------------

/// Rules shared by every room on a server.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    /// Round durations (seconds) a player may pick.
    pub allowed_timers: Vec<f64>,

    /// Round duration of a freshly created room. Must be in `allowed_timers`.
    pub default_timer: f64,

    /// Players needed before a room counts down.
    pub min_players: usize,

    /// Display names are truncated to this many characters.
    pub max_name_len: usize,

    /// Bet used when a player declares nothing usable.
    pub default_bet: f64,

    /// Lowest accepted bet.
    pub min_bet: f64,

    /// Highest accepted bet.
    pub max_bet: f64,

    /// Countdown cadence.
    pub tick_interval: Duration,

    /// Publish every n-th countdown step. The final zero is always sent.
    pub tick_emit_every: u32,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            allowed_timers: Self::DEFAULT_TIMERS.to_vec(),
            default_timer: 10.0,
            min_players: 2,
            max_name_len: 40,
            default_bet: 5.0,
            min_bet: 1.0,
            max_bet: 10.0,
            tick_interval: Duration::from_millis(100),
            tick_emit_every: 1,
        }
    }
}

impl GameConfig {
    /// Durations offered when none are configured.
    pub const DEFAULT_TIMERS: [f64; 4] = [0.1, 1.0, 10.0, 60.0];

    /// How close a requested timer must be to an allowed value.
    pub const TIMER_TOLERANCE: f64 = 1e-6;

    /// Repairs out-of-range values so the config is safe to use.
    ///
    /// Called by the game actor on spawn. Rules:
    /// - non-finite or non-positive timers are dropped; an empty list
    ///   falls back to [`Self::DEFAULT_TIMERS`].
    /// - `default_timer` not in the list becomes the first allowed value.
    /// - `min_players` is at least 2 (a round needs a loser and a winner).
    /// - `min_bet ≤ max_bet`, both positive; `default_bet` clamped into range.
    /// - `max_name_len` and `tick_emit_every` are at least 1.
    pub fn validated(mut self) -> Self {
        self.allowed_timers.retain(|t| t.is_finite() && *t > 0.0);
        if self.allowed_timers.is_empty() {
            warn!("no usable round timers configured, using defaults");
            self.allowed_timers = Self::DEFAULT_TIMERS.to_vec();
        }
        if self.match_timer(self.default_timer).is_none() {
            warn!(
                default_timer = self.default_timer,
                "default timer is not an allowed value, using the first allowed timer"
            );
            self.default_timer = self.allowed_timers[0];
        }
        if self.min_players < 2 {
            warn!(min_players = self.min_players, "min_players below 2, clamping");
            self.min_players = 2;
        }
        if !(self.min_bet.is_finite() && self.min_bet > 0.0) {
            self.min_bet = 1.0;
        }
        if !(self.max_bet.is_finite() && self.max_bet >= self.min_bet) {
            warn!(
                min_bet = self.min_bet,
                max_bet = self.max_bet,
                "bet range is inverted or invalid, collapsing to min_bet"
            );
            self.max_bet = self.min_bet;
        }
        if !self.default_bet.is_finite() {
            self.default_bet = self.min_bet;
        }
        self.default_bet = self.default_bet.clamp(self.min_bet, self.max_bet);
        self.max_name_len = self.max_name_len.max(1);
        self.tick_emit_every = self.tick_emit_every.max(1);
        self
    }

    /// The allowed value `requested` refers to, if any.
    pub fn match_timer(&self, requested: f64) -> Option<f64> {
        if !requested.is_finite() {
            return None;
        }
        self.allowed_timers
            .iter()
            .copied()
            .find(|allowed| (allowed - requested).abs() < Self::TIMER_TOLERANCE)
    }

    /// Coerces a declared bet: non-numbers become `default_bet`, everything
    /// is clamped to `[min_bet, max_bet]`.
    pub fn sanitize_bet(&self, raw: LooseNumber) -> f64 {
        raw.finite()
            .unwrap_or(self.default_bet)
            .clamp(self.min_bet, self.max_bet)
    }

    /// Like [`sanitize_bet`](Self::sanitize_bet), but a starting bet of
    /// zero also counts as "not given".
    pub fn sanitize_starting_bet(&self, raw: LooseNumber) -> f64 {
        match raw.finite() {
            Some(bet) if bet != 0.0 => bet.clamp(self.min_bet, self.max_bet),
            _ => self.default_bet,
        }
    }

    /// Truncates a display name to `max_name_len` characters.
    pub fn truncate_name(&self, name: &str) -> String {
        name.chars().take(self.max_name_len).collect()
    }

    /// The `allowedTimers` payload for a room currently set to `current`.
    pub fn allowed_timers_payload(&self, current: f64) -> AllowedTimers {
        AllowedTimers {
            options: self.allowed_timers.clone(),
            current,
        }
    }
}

// ---------------------------------------------------------------------------
// RoomPhase
// ---------------------------------------------------------------------------

/// Where a room is in its round loop.
///
/// ```text
/// Paused ──(≥ min players)──→ CountingDown ──(expiry: resolve)──┐
///   ↑                              │                            │
///   └────────(< min players)───────┘←──(still ≥ min players)────┘
/// ```
///
/// There is no terminal phase: rooms live as long as the process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RoomPhase {
    /// Not enough players, or never started.
    Paused,
    /// A countdown is running; it resolves a round when it hits zero.
    CountingDown,
}

impl RoomPhase {
    /// Returns `true` while a countdown is active.
    pub fn is_counting_down(&self) -> bool {
        matches!(self, Self::CountingDown)
    }
}

impl std::fmt::Display for RoomPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Paused => write!(f, "Paused"),
            Self::CountingDown => write!(f, "CountingDown"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = GameConfig::default();
        assert_eq!(config.allowed_timers, vec![0.1, 1.0, 10.0, 60.0]);
        assert_eq!(config.default_timer, 10.0);
        assert_eq!(config.min_players, 2);
        assert_eq!(config.max_name_len, 40);
        assert_eq!(config.tick_interval, Duration::from_millis(100));
    }

    #[test]
    fn test_match_timer_uses_tolerance() {
        let config = GameConfig::default();
        assert_eq!(config.match_timer(0.1000000001), Some(0.1));
        assert_eq!(config.match_timer(60.0), Some(60.0));
        assert_eq!(config.match_timer(5.0), None);
        assert_eq!(config.match_timer(f64::NAN), None);
        assert_eq!(config.match_timer(f64::INFINITY), None);
    }

    #[test]
    fn test_sanitize_bet_clamps_and_defaults() {
        let config = GameConfig::default();
        assert_eq!(config.sanitize_bet(LooseNumber(Some(7.5))), 7.5);
        assert_eq!(config.sanitize_bet(LooseNumber(Some(-3.0))), 1.0);
        assert_eq!(config.sanitize_bet(LooseNumber(Some(1e300))), 10.0);
        assert_eq!(config.sanitize_bet(LooseNumber(Some(f64::INFINITY))), 5.0);
        assert_eq!(config.sanitize_bet(LooseNumber(Some(f64::NAN))), 5.0);
        assert_eq!(config.sanitize_bet(LooseNumber(None)), 5.0);
    }

    #[test]
    fn test_starting_bet_zero_means_default() {
        let config = GameConfig::default();
        assert_eq!(config.sanitize_starting_bet(LooseNumber(Some(0.0))), 5.0);
        assert_eq!(config.sanitize_starting_bet(LooseNumber(Some(0.5))), 1.0);
        assert_eq!(config.sanitize_starting_bet(LooseNumber(Some(3.0))), 3.0);
    }

    #[test]
    fn test_truncate_name_counts_chars() {
        let config = GameConfig { max_name_len: 3, ..GameConfig::default() };
        assert_eq!(config.truncate_name("héllo"), "hél");
        assert_eq!(config.truncate_name("ab"), "ab");
    }

    #[test]
    fn test_validated_repairs_config() {
        let config = GameConfig {
            allowed_timers: vec![f64::NAN, -1.0],
            default_timer: 7.0,
            min_players: 1,
            min_bet: 4.0,
            max_bet: 2.0,
            default_bet: 9.0,
            tick_emit_every: 0,
            ..GameConfig::default()
        }
        .validated();
        assert_eq!(config.allowed_timers, GameConfig::DEFAULT_TIMERS.to_vec());
        assert_eq!(config.default_timer, 0.1);
        assert_eq!(config.min_players, 2);
        assert_eq!(config.max_bet, 4.0);
        assert_eq!(config.default_bet, 4.0);
        assert_eq!(config.tick_emit_every, 1);
    }

    #[test]
    fn test_room_phase_display() {
        assert_eq!(RoomPhase::Paused.to_string(), "Paused");
        assert!(RoomPhase::CountingDown.is_counting_down());
        assert!(!RoomPhase::Paused.is_counting_down());
    }
}
