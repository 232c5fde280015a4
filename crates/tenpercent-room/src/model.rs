//! Room and player state.

use std::collections::BTreeMap;

use tenpercent_protocol::{PlayerId, PlayerView, PlayersSnapshot, RoomId, RoundOutcome};
use tenpercent_tick::Countdown;

use crate::RoomPhase;

/// A seated player.
#[derive(Debug, Clone, PartialEq)]
pub struct Player {
    /// Display name, already truncated.
    pub name: String,
    /// Cumulative net result. Never reset while the player stays seated.
    pub balance: f64,
    /// Bet used by every round until changed. Kept secret.
    pub declared_bet: f64,
    /// This player's side of the last resolved round.
    pub last_result: Option<RoundOutcome>,
}

impl Player {
    /// A freshly seated player with a zero balance.
    pub fn new(name: String, declared_bet: f64) -> Self {
        Self {
            name,
            balance: 0.0,
            declared_bet,
            last_result: None,
        }
    }

    /// What other clients may see.
    pub fn view(&self) -> PlayerView {
        PlayerView {
            name: self.name.clone(),
            balance: self.balance,
            last_result: self.last_result,
        }
    }
}

/// One game table: its players, round duration, and round loop state.
///
/// Fields are crate-private; outside the crate a room is read-only and
/// every mutation goes through [`Lobby`](crate::Lobby).
#[derive(Debug)]
pub struct Room {
    pub(crate) id: RoomId,
    pub(crate) players: BTreeMap<PlayerId, Player>,
    pub(crate) round_timer_secs: f64,
    pub(crate) round_counter: u64,
    pub(crate) countdown: Option<Countdown>,
}

impl Room {
    pub(crate) fn new(id: RoomId, round_timer_secs: f64) -> Self {
        Self {
            id,
            players: BTreeMap::new(),
            round_timer_secs,
            round_counter: 0,
            countdown: None,
        }
    }

    /// The room's identifier.
    pub fn id(&self) -> &RoomId {
        &self.id
    }

    /// Seated players, ordered by id.
    pub fn players(&self) -> &BTreeMap<PlayerId, Player> {
        &self.players
    }

    /// One seated player.
    pub fn player(&self, player_id: PlayerId) -> Option<&Player> {
        self.players.get(&player_id)
    }

    /// Whether `player_id` is seated here.
    pub fn contains(&self, player_id: PlayerId) -> bool {
        self.players.contains_key(&player_id)
    }

    /// Number of seated players.
    pub fn player_count(&self) -> usize {
        self.players.len()
    }

    /// Duration the next countdown will start from.
    pub fn round_timer_secs(&self) -> f64 {
        self.round_timer_secs
    }

    /// Rounds resolved so far.
    pub fn round_counter(&self) -> u64 {
        self.round_counter
    }

    /// Current lifecycle phase.
    pub fn phase(&self) -> RoomPhase {
        if self.countdown.is_some() {
            RoomPhase::CountingDown
        } else {
            RoomPhase::Paused
        }
    }

    /// Seconds left in the active countdown.
    pub fn countdown_remaining(&self) -> Option<f64> {
        self.countdown.as_ref().map(Countdown::remaining)
    }

    /// Public view of every player.
    pub fn snapshot(&self) -> PlayersSnapshot {
        self.players
            .iter()
            .map(|(id, player)| (*id, player.view()))
            .collect()
    }

    /// Seats a player, replacing any existing seat for the same id.
    pub(crate) fn seat(&mut self, player_id: PlayerId, player: Player) {
        self.players.insert(player_id, player);
    }

    /// Removes a player. Returns `false` if they weren't seated.
    pub(crate) fn unseat(&mut self, player_id: PlayerId) -> bool {
        self.players.remove(&player_id).is_some()
    }

    pub(crate) fn player_mut(&mut self, player_id: PlayerId) -> Option<&mut Player> {
        self.players.get_mut(&player_id)
    }
}
